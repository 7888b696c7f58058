mod core;
mod key;
mod simd;


pub use self::core::{BUFFSIZE, RunStats, StreamTransformer, TransformError, transform_in_place};
pub use self::key::{KEY_BYTES, KEY_SEED, Key};
pub use self::simd::xor_in_place;
