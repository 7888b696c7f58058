/// 32-bit seed replicated across every lane of the default key.
pub const KEY_SEED: u32 = 0xDEAD_BEEF;

/// Key width in bytes: one 256-bit vector.
pub const KEY_BYTES: usize = 32;

/// A 256-bit XOR pattern.
///
/// Aligned to 32 bytes so SIMD paths can load it with a single aligned
/// load. Byte `i` of the output stream is XORed with byte `i % KEY_BYTES`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(32))]
pub struct Key([u8; KEY_BYTES]);

impl Key {
    /// Replicate a 32-bit value across all eight lanes.
    ///
    /// Lanes are stored little-endian, the same layout a 32-bit broadcast
    /// produces in an x86_64 or aarch64 vector register, so `0xDEADBEEF`
    /// yields the byte pattern `EF BE AD DE` repeated.
    pub const fn splat(seed: u32) -> Self {
        let lane = seed.to_le_bytes();
        let mut bytes = [0u8; KEY_BYTES];
        let mut i = 0;
        while i < KEY_BYTES {
            bytes[i] = lane[i & 3];
            i += 1;
        }
        Key(bytes)
    }

    /// Use an arbitrary 32-byte pattern.
    pub const fn from_bytes(bytes: [u8; KEY_BYTES]) -> Self {
        Key(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }

    /// The key as seen from stream offset `phase`: byte `j` of the result
    /// is byte `(phase + j) % KEY_BYTES` of `self`.
    #[inline]
    pub fn rotated(&self, phase: usize) -> Key {
        let mut out = self.0;
        out.rotate_left(phase % KEY_BYTES);
        Key(out)
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::splat(KEY_SEED)
    }
}
