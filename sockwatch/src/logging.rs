//! File logging. The TUI owns stdout, so traces go to `sockwatch.log` in the
//! config dir, and only when a filter is supplied.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn init_file_logging(filter: &str, dir: &Path) -> anyhow::Result<PathBuf> {
    let filter = EnvFilter::try_new(filter)?;
    fs::create_dir_all(dir)?;
    let path = dir.join("sockwatch.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing subscriber: {e}"))?;
    Ok(path)
}
