//! Log setup. The interactive game owns the terminal, so its logs go to a
//! file; headless runs log to stderr.

use std::{fs::File, io, path::Path, sync::Mutex};

use tracing_subscriber::EnvFilter;

/// `level` wins over `RUST_LOG`; both fall back to `info`.
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    let from_env = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| from_env()),
        None => from_env(),
    }
}

pub fn init_file_logging(path: &Path, level: Option<&str>) -> io::Result<()> {
    let file = File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

pub fn init_stderr_logging(level: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(io::stderr)
        .try_init();
}
