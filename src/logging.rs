//! Internal diagnostics, kept strictly separate from the mandated stdout trace.
//!
//! A `RUST_LOG`-controlled `env_logger` writing to stderr, so `RUST_LOG=debug` can surface pager
//! and file-loading diagnostics without touching the trace on stdout.

#[cold]
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
