//! Shared tracing initialization.
//!
//! One-shot CLI commands log to stderr. The `daemon` command appends to
//! `{data_dir}/digest.log` so scheduled runs leave a trail.

use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::storage::path_utils;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_stderr_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Append to `log_path`, falling back to stderr when the file cannot be opened.
pub fn init_file_tracing(log_path: &Path) {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    // Append mode: several runs share the same file.
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open {}: {}, logging to stderr", log_path.display(), e);
            init_stderr_tracing();
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .try_init();
}

/// `init_file_tracing` on the default `{data_dir}/digest.log`.
pub fn init_daemon_tracing() {
    init_file_tracing(&path_utils::log_path());
}
