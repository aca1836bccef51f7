// src/logging.rs

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tracing::Level;

/// Sends all diagnostics to `<dir>/<name>.log` so stdout stays reserved for
/// the report. Falls back to warnings on stderr when the file can't be made.
pub fn init(dir: &Path, name: &str) {
    let path = dir.join(format!("{name}.log"));
    let file = fs::create_dir_all(dir).and_then(|_| File::options().create(true).append(true).open(&path));

    match file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::WARN)
                .with_writer(std::io::stderr)
                .init();
            tracing::warn!("cannot open log file {}: {}", path.display(), e);
        }
    }
}
