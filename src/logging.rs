use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,osd_episodes=debug";

/// Directory holding the rolling log files.
pub fn log_dir() -> Option<PathBuf> {
  ProjectDirs::from("", "", "osd-episodes").map(|dirs| dirs.data_dir().join("logs"))
}

/// Install the global subscriber writing to a daily rolling file. Keep the
/// returned guard alive for as long as logs should be flushed.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir().context("No home directory for log files")?;
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
  let appender = tracing_appender::rolling::daily(&dir, "osd-episodes.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
  let subscriber = tracing_subscriber::fmt()
    .with_writer(writer)
    .with_target(true)
    .with_level(true)
    .with_ansi(false)
    .with_env_filter(filter)
    .finish();
  tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")?;
  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_filter_parses() {
    assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
  }
}
