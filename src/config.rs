use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Harness preferences stored in `prefs.toml`.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub server_url: Option<String>,
  pub api_token: Option<String>,
  /// Skips the `/Users/Me` lookup when set.
  pub user_id: Option<String>,
}

impl Config {
  pub fn path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "osd-episodes").map(|dirs| dirs.config_dir().join("prefs.toml"))
  }

  pub fn load() -> Self {
    if let Some(path) = Self::path()
      && let Ok(content) = std::fs::read_to_string(path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(path) = Self::path()
      && let Some(dir) = path.parent()
      && std::fs::create_dir_all(dir).is_ok()
      && let Ok(content) = toml::to_string(self)
    {
      let _ = std::fs::write(path, content);
    }
  }

  /// Command-line values win over stored ones.
  pub fn merged(mut self, server_url: Option<String>, api_token: Option<String>, user_id: Option<String>) -> Self {
    self.server_url = server_url.or(self.server_url);
    self.api_token = api_token.or(self.api_token);
    self.user_id = user_id.or(self.user_id);
    self
  }

  /// Server URL and token, both required to talk to a live server.
  pub fn credentials(&self) -> Result<(&str, &str)> {
    let url = self.server_url.as_deref().context("No server URL; pass --server or set server_url in prefs.toml")?;
    let token = self.api_token.as_deref().context("No API token; pass --token or set api_token in prefs.toml")?;
    Ok((url, token))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_prefs_file() {
    let config: Config = toml::from_str("server_url = \"http://media.local:8096\"\napi_token = \"abc\"\n").unwrap();
    assert_eq!(config.server_url.as_deref(), Some("http://media.local:8096"));
    assert_eq!(config.user_id, None);
    assert_eq!(config.credentials().unwrap(), ("http://media.local:8096", "abc"));
  }

  #[test]
  fn arguments_override_stored_values() {
    let stored = Config { server_url: Some("http://old".into()), api_token: Some("t".into()), user_id: None };
    let merged = stored.merged(Some("http://new".into()), None, Some("u1".into()));
    assert_eq!(merged.server_url.as_deref(), Some("http://new"));
    assert_eq!(merged.api_token.as_deref(), Some("t"));
    assert_eq!(merged.user_id.as_deref(), Some("u1"));
  }

  #[test]
  fn missing_token_is_reported() {
    let config = Config { server_url: Some("http://x".into()), ..Config::default() };
    assert!(config.credentials().is_err());
  }
}
