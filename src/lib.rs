/// Use mimalloc as the global allocator for all binaries.
/// The transform loop allocates its buffer once, but clap and the
/// report formatting still go through the allocator at startup.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod xor;
