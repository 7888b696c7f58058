use std::env;

/// Default chunk size: 8192 vectors of 32 bytes (256KB).
const DEFAULT_BUFFSIZE: usize = 8192 * 32;

/// Width of one AVX2 register in bytes. The buffer must hold whole vectors.
const VECTOR_BYTES: usize = 32;

fn main() {
    println!("cargo:rerun-if-env-changed=FXOR_BUFFSIZE");

    let buffsize = match env::var("FXOR_BUFFSIZE") {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(n) => n,
            Err(_) => panic!("FXOR_BUFFSIZE must be a positive integer, got {:?}", raw),
        },
        Err(_) => DEFAULT_BUFFSIZE,
    };

    if buffsize == 0 || buffsize % VECTOR_BYTES != 0 {
        panic!(
            "FXOR_BUFFSIZE must be a non-zero multiple of {} (simd register size), got {}",
            VECTOR_BYTES, buffsize
        );
    }

    println!("cargo:rustc-env=FXOR_BUFFSIZE={}", buffsize);
}
