use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Route `tracing` output to a log file; the TUI owns the terminal.
///
/// `RUST_LOG` takes precedence over `log.filter`. When the configured file
/// cannot be opened the log goes to the temp dir instead. Returns the file in use.
pub fn init(settings: &LogSettings) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let preferred = settings.file.clone().unwrap_or_else(default_log_path);
    let fallback = std::env::temp_dir().join("spindle").join("spindle.log");
    let (path, log_file) = open_with_fallback(preferred, fallback)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter.as_str()));

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    Ok(path)
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn open_with_fallback(preferred: PathBuf, fallback: PathBuf) -> std::io::Result<(PathBuf, File)> {
    match open_log(&preferred) {
        Ok(file) => Ok((preferred, file)),
        Err(e) => {
            eprintln!(
                "spindle: cannot open log file {}: {e}; using {}",
                preferred.display(),
                fallback.display()
            );
            let file = open_log(&fallback)?;
            Ok((fallback, file))
        }
    }
}
