use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, info};

use crate::model::{Item, ItemId, ItemsResult};

/// Fields the panel needs for display.
pub const EPISODE_FIELDS: &[&str] = &["Overview", "PrimaryImageAspectRatio", "ParentId", "IndexNumber", "ParentIndexNumber"];

/// Items-by-parent query, mirroring the host API's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsQuery {
  pub parent_id: ItemId,
  pub include_item_types: Vec<String>,
  pub recursive: bool,
  pub sort_by: Vec<String>,
  pub ascending: bool,
  pub fields: Vec<String>,
}

impl ItemsQuery {
  /// Every episode below `series_id`, ordered by season then episode ordinal.
  pub fn series_episodes(series_id: &ItemId) -> Self {
    Self {
      parent_id: series_id.clone(),
      include_item_types: vec!["Episode".to_string()],
      recursive: true,
      sort_by: vec!["ParentIndexNumber".to_string(), "IndexNumber".to_string()],
      ascending: true,
      fields: EPISODE_FIELDS.iter().map(|f| f.to_string()).collect(),
    }
  }

  pub fn to_params(&self) -> Vec<(&'static str, String)> {
    vec![
      ("ParentId", self.parent_id.to_string()),
      ("IncludeItemTypes", self.include_item_types.join(",")),
      ("Recursive", self.recursive.to_string()),
      ("SortBy", self.sort_by.join(",")),
      ("SortOrder", (if self.ascending { "Ascending" } else { "Descending" }).to_string()),
      ("Fields", self.fields.join(",")),
    ]
  }
}

/// The host's data-access client.
#[async_trait]
pub trait LibraryClient: Send + Sync {
  /// False until the host client has finished bootstrapping.
  fn is_ready(&self) -> bool {
    true
  }

  async fn current_user_id(&self) -> Result<String>;

  async fn item(&self, user_id: &str, id: &ItemId) -> Result<Item>;

  async fn items(&self, user_id: &str, query: &ItemsQuery) -> Result<Vec<Item>>;

  /// Server/session identifier used in deep-link routes.
  fn server_id(&self) -> Option<String>;

  fn app_version(&self) -> Option<String> {
    None
  }
}

/// Poll until the client reports ready.
pub async fn wait_until_ready(client: &dyn LibraryClient, poll: Duration) {
  while !client.is_ready() {
    tokio::time::sleep(poll).await;
  }
}

/// Compare dotted version strings numerically. Missing components count as
/// zero and a missing version sorts lowest.
pub fn compare_versions(a: Option<&str>, b: Option<&str>) -> Ordering {
  let (a, b) = match (a, b) {
    (None, _) => return Ordering::Less,
    (_, None) => return Ordering::Greater,
    (Some(a), Some(b)) => (a, b),
  };
  let parse = |s: &str| -> Vec<u64> { s.split('.').map(|p| p.trim().parse().unwrap_or(0)).collect() };
  let (va, vb) = (parse(a), parse(b));
  for i in 0..va.len().max(vb.len()) {
    let ord = va.get(i).copied().unwrap_or(0).cmp(&vb.get(i).copied().unwrap_or(0));
    if ord != Ordering::Equal {
      return ord;
    }
  }
  Ordering::Equal
}

// --- HTTP client ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDto {
  id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PublicSystemInfo {
  id: Option<String>,
  version: Option<String>,
}

/// [`LibraryClient`] speaking the media server's REST API directly.
pub struct HttpLibraryClient {
  http: Client,
  base_url: String,
  token: String,
  user_id: Option<String>,
  server_id: Option<String>,
  version: Option<String>,
}

impl HttpLibraryClient {
  /// Build a client and fetch the server's public identity.
  pub async fn connect(base_url: &str, token: &str, user_id: Option<String>) -> Result<Self> {
    let http = Client::builder().timeout(Duration::from_secs(15)).build().context("Failed to build HTTP client")?;
    let mut client = Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      token: token.to_string(),
      user_id,
      server_id: None,
      version: None,
    };
    let info: PublicSystemInfo = client.get_json("/System/Info/Public", &[]).await?;
    info!(server_id = ?info.id, version = ?info.version, "client: connected");
    client.server_id = info.id;
    client.version = info.version;
    Ok(client)
  }

  async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
    let url = Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
      .with_context(|| format!("Invalid server URL {}", self.base_url))?;
    debug!(url = %url, "client: GET");
    let response = self
      .http
      .get(url.clone())
      .header("X-Emby-Token", &self.token)
      .send()
      .await
      .with_context(|| format!("Request to {} failed", url))?;
    let status = response.status();
    if !status.is_success() {
      return Err(anyhow!("{} returned {}", url, status));
    }
    response.json::<T>().await.with_context(|| format!("Failed to decode response from {}", url))
  }
}

#[async_trait]
impl LibraryClient for HttpLibraryClient {
  async fn current_user_id(&self) -> Result<String> {
    if let Some(ref id) = self.user_id {
      return Ok(id.clone());
    }
    let user: UserDto = self.get_json("/Users/Me", &[]).await.context("Failed to look up current user")?;
    Ok(user.id)
  }

  async fn item(&self, user_id: &str, id: &ItemId) -> Result<Item> {
    self.get_json(&format!("/Users/{}/Items/{}", user_id, id), &[]).await
  }

  async fn items(&self, user_id: &str, query: &ItemsQuery) -> Result<Vec<Item>> {
    let result: ItemsResult = self.get_json(&format!("/Users/{}/Items", user_id), &query.to_params()).await?;
    Ok(result.items)
  }

  fn server_id(&self) -> Option<String> {
    self.server_id.clone()
  }

  fn app_version(&self) -> Option<String> {
    self.version.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- compare_versions ---

  #[test]
  fn versions_compare_numerically() {
    assert_eq!(compare_versions(Some("10.10.0"), Some("10.9.11")), Ordering::Greater);
    assert_eq!(compare_versions(Some("10.8"), Some("10.8.0")), Ordering::Equal);
    assert_eq!(compare_versions(Some("10.10.3"), Some("10.10.0")), Ordering::Greater);
    assert_eq!(compare_versions(Some("9"), Some("10.0")), Ordering::Less);
  }

  #[test]
  fn missing_version_sorts_lowest() {
    assert_eq!(compare_versions(None, Some("10.10.0")), Ordering::Less);
    assert_eq!(compare_versions(Some("1.0"), None), Ordering::Greater);
  }

  // --- ItemsQuery ---

  #[test]
  fn series_query_params() {
    let query = ItemsQuery::series_episodes(&ItemId::new("s1"));
    let params = query.to_params();
    let get = |k: &str| params.iter().find(|(name, _)| *name == k).map(|(_, v)| v.as_str());
    assert_eq!(get("ParentId"), Some("s1"));
    assert_eq!(get("IncludeItemTypes"), Some("Episode"));
    assert_eq!(get("Recursive"), Some("true"));
    assert_eq!(get("SortBy"), Some("ParentIndexNumber,IndexNumber"));
    assert_eq!(get("SortOrder"), Some("Ascending"));
    assert_eq!(get("Fields"), Some("Overview,PrimaryImageAspectRatio,ParentId,IndexNumber,ParentIndexNumber"));
  }
}
