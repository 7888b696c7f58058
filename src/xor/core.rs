use std::fmt;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use crate::common::io::read_full;

use super::key::{KEY_BYTES, Key};
use super::simd::xor_in_place;

/// Chunk size in bytes. Overridable at build time with `FXOR_BUFFSIZE`.
pub const BUFFSIZE: usize = parse_usize(env!("FXOR_BUFFSIZE"));

const _: () = assert!(
    BUFFSIZE > 0 && BUFFSIZE % KEY_BYTES == 0,
    "Buffer size should be a multiple of 32 (simd register size)"
);

/// Decimal parse usable in const context. Overflow is a compile error
/// when evaluated for `BUFFSIZE`.
pub(crate) const fn parse_usize(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut n = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let d = bytes[i];
        assert!(d.is_ascii_digit(), "FXOR_BUFFSIZE must be decimal");
        n = match n.checked_mul(10) {
            Some(v) => match v.checked_add((d - b'0') as usize) {
                Some(v) => v,
                None => panic!("FXOR_BUFFSIZE overflows usize"),
            },
            None => panic!("FXOR_BUFFSIZE overflows usize"),
        };
        i += 1;
    }
    n
}

const MIB: f64 = 1024.0 * 1024.0;

/// One vector-width lane. The buffer is a slice of these so its start is
/// 32-byte aligned and its length is a whole number of lanes.
#[derive(Clone, Copy)]
#[repr(C, align(32))]
struct Lane([u8; KEY_BYTES]);

/// Reusable aligned chunk buffer.
struct AlignedBuf {
    lanes: Box<[Lane]>,
}

impl AlignedBuf {
    fn new(lanes: usize) -> Self {
        Self {
            lanes: vec![Lane([0; KEY_BYTES]); lanes.max(1)].into_boxed_slice(),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.lanes.len() * KEY_BYTES
    }

    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        // SAFETY: Lane is repr(C) over [u8; 32] with size == align == 32,
        // so the slice is len contiguous initialized bytes with no padding.
        unsafe { std::slice::from_raw_parts_mut(self.lanes.as_mut_ptr() as *mut u8, len) }
    }
}

/// Failure of a transform run, tagged with the side that failed.
/// Output written before the failure is left as is.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("read error")]
    Read(#[source] io::Error),
    #[error("write error")]
    Write(#[source] io::Error),
}

impl TransformError {
    pub fn io_error(&self) -> &io::Error {
        match self {
            TransformError::Read(e) | TransformError::Write(e) => e,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.io_error().kind()
    }
}

impl From<TransformError> for io::Error {
    fn from(e: TransformError) -> Self {
        match e {
            TransformError::Read(e) | TransformError::Write(e) => e,
        }
    }
}

/// Totals for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Bytes read, transformed, and written.
    pub total_bytes: u64,
    /// Read/transform/write cycles that moved at least one byte.
    pub chunks: u64,
    /// Wall clock from the first read to the final flush.
    pub elapsed: Duration,
}

impl RunStats {
    /// Average throughput in MiB/s. Zero for an empty run or a zero duration.
    pub fn throughput_mib_s(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.total_bytes == 0 || secs == 0.0 {
            return 0.0;
        }
        self.total_bytes as f64 / secs / MIB
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {} us", self.elapsed.as_micros())?;
        writeln!(f, "Data: {} bytes", self.total_bytes)?;
        writeln!(f, "Average speed: {:.2} MBps", self.throughput_mib_s())
    }
}

/// Streams bytes through an XOR against a fixed repeating key.
///
/// Owns one aligned buffer for its whole lifetime; each call to
/// [`run`](Self::run) reuses it and starts the key at stream offset zero,
/// so running twice over the same input gives the same output.
pub struct StreamTransformer {
    key: Key,
    buf: AlignedBuf,
}

impl StreamTransformer {
    /// Transformer with the default `BUFFSIZE` chunk.
    pub fn new(key: Key) -> Self {
        Self::with_lanes(key, BUFFSIZE / KEY_BYTES)
    }

    /// Transformer with a chunk of `lanes * 32` bytes (at least one lane).
    pub fn with_lanes(key: Key, lanes: usize) -> Self {
        Self {
            key,
            buf: AlignedBuf::new(lanes),
        }
    }

    /// Chunk capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Transform `input` into `output` until EOF.
    ///
    /// Exactly as many bytes are written as were read. Each chunk is filled
    /// as far as the reader allows before it is transformed, and only the
    /// filled prefix is XORed and written.
    pub fn run(
        &mut self,
        input: &mut impl Read,
        output: &mut impl Write,
    ) -> Result<RunStats, TransformError> {
        let mut stats = RunStats::default();
        let buf = self.buf.bytes_mut();
        let start = Instant::now();

        loop {
            let n = read_full(input, buf).map_err(TransformError::Read)?;
            if n == 0 {
                break;
            }
            let chunk = &mut buf[..n];
            let phase = (stats.total_bytes % KEY_BYTES as u64) as usize;
            xor_in_place(chunk, &self.key, phase);
            output.write_all(chunk).map_err(TransformError::Write)?;
            stats.total_bytes += n as u64;
            stats.chunks += 1;
        }
        output.flush().map_err(TransformError::Write)?;

        stats.elapsed = start.elapsed();
        Ok(stats)
    }
}

/// Transform a whole in-memory buffer, starting at key offset zero.
pub fn transform_in_place(data: &mut [u8], key: &Key) {
    xor_in_place(data, key, 0);
}
