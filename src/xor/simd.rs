//! In-place XOR kernels.
//!
//! The dispatcher picks the widest path available at runtime:
//! - AVX2 (256-bit, one key per register) - x86_64 with runtime detection
//! - SSE2 (2 x 128-bit) - x86_64 baseline
//! - NEON (2 x 128-bit) - aarch64 baseline
//! - u64 words - everything else
//!
//! Every path walks whole 32-byte lanes of the input and finishes the
//! sub-lane tail byte by byte, so no byte past `data.len()` is touched.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use super::key::{KEY_BYTES, Key};

/// XOR `data` in place against `key`, where `data[0]` sits at stream
/// offset `phase` (only `phase % KEY_BYTES` matters).
#[inline]
pub fn xor_in_place(data: &mut [u8], key: &Key, phase: usize) {
    if data.is_empty() {
        return;
    }
    // Lanes are KEY_BYTES wide, so after rotating once the same pattern
    // lines up with every lane in the slice.
    let pattern = key.rotated(phase);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { xor_avx2(data, &pattern) };
        } else {
            unsafe { xor_sse2(data, &pattern) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        unsafe { xor_neon(data, &pattern) };
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        xor_words(data, &pattern);
    }
}

/// Scalar tail: fewer than KEY_BYTES bytes, starting at the pattern's origin.
#[inline(always)]
fn xor_tail(tail: &mut [u8], pattern: &Key) {
    debug_assert!(tail.len() < KEY_BYTES);
    for (b, k) in tail.iter_mut().zip(pattern.as_bytes()) {
        *b ^= *k;
    }
}

/// Portable path: four u64 XORs per lane.
#[cfg(any(test, not(any(target_arch = "x86_64", target_arch = "aarch64"))))]
pub(crate) fn xor_words(data: &mut [u8], pattern: &Key) {
    let key = pattern.as_bytes();
    let mut words = [0u64; KEY_BYTES / 8];
    for (w, src) in words.iter_mut().zip(key.chunks_exact(8)) {
        let mut b = [0u8; 8];
        b.copy_from_slice(src);
        *w = u64::from_ne_bytes(b);
    }

    let mut lanes = data.chunks_exact_mut(KEY_BYTES);
    for lane in &mut lanes {
        for (part, w) in lane.chunks_exact_mut(8).zip(words.iter()) {
            let mut b = [0u8; 8];
            b.copy_from_slice(part);
            part.copy_from_slice(&(u64::from_ne_bytes(b) ^ w).to_ne_bytes());
        }
    }
    xor_tail(lanes.into_remainder(), pattern);
}

/// AVX2: one register holds the whole key. Unrolled 4x (128 bytes).
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn xor_avx2(data: &mut [u8], pattern: &Key) {
    unsafe {
        // Key is repr(align(32)), so the aligned load is valid.
        let key = _mm256_load_si256(pattern.as_bytes().as_ptr() as *const __m256i);

        let mut blocks = data.chunks_exact_mut(4 * KEY_BYTES);
        for block in &mut blocks {
            let p = block.as_mut_ptr() as *mut __m256i;
            let v0 = _mm256_loadu_si256(p);
            let v1 = _mm256_loadu_si256(p.add(1));
            let v2 = _mm256_loadu_si256(p.add(2));
            let v3 = _mm256_loadu_si256(p.add(3));
            _mm256_storeu_si256(p, _mm256_xor_si256(v0, key));
            _mm256_storeu_si256(p.add(1), _mm256_xor_si256(v1, key));
            _mm256_storeu_si256(p.add(2), _mm256_xor_si256(v2, key));
            _mm256_storeu_si256(p.add(3), _mm256_xor_si256(v3, key));
        }

        let mut lanes = blocks.into_remainder().chunks_exact_mut(KEY_BYTES);
        for lane in &mut lanes {
            let p = lane.as_mut_ptr() as *mut __m256i;
            _mm256_storeu_si256(p, _mm256_xor_si256(_mm256_loadu_si256(p), key));
        }
        xor_tail(lanes.into_remainder(), pattern);
    }
}

/// SSE2: the key is split across two 128-bit registers.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn xor_sse2(data: &mut [u8], pattern: &Key) {
    unsafe {
        let kp = pattern.as_bytes().as_ptr() as *const __m128i;
        let lo = _mm_load_si128(kp);
        let hi = _mm_load_si128(kp.add(1));

        let mut lanes = data.chunks_exact_mut(KEY_BYTES);
        for lane in &mut lanes {
            let p = lane.as_mut_ptr() as *mut __m128i;
            let v0 = _mm_loadu_si128(p);
            let v1 = _mm_loadu_si128(p.add(1));
            _mm_storeu_si128(p, _mm_xor_si128(v0, lo));
            _mm_storeu_si128(p.add(1), _mm_xor_si128(v1, hi));
        }
        xor_tail(lanes.into_remainder(), pattern);
    }
}

/// NEON: the key is split across two 128-bit registers.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn xor_neon(data: &mut [u8], pattern: &Key) {
    unsafe {
        let kp = pattern.as_bytes().as_ptr();
        let lo = vld1q_u8(kp);
        let hi = vld1q_u8(kp.add(16));

        let mut lanes = data.chunks_exact_mut(KEY_BYTES);
        for lane in &mut lanes {
            let p = lane.as_mut_ptr();
            let v0 = vld1q_u8(p);
            let v1 = vld1q_u8(p.add(16));
            vst1q_u8(p, veorq_u8(v0, lo));
            vst1q_u8(p.add(16), veorq_u8(v1, hi));
        }
        xor_tail(lanes.into_remainder(), pattern);
    }
}
