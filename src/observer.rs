use serde::Deserialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::model::ItemId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaybackInfo {
  media_sources: Vec<MediaSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MediaSource {
  id: ItemId,
}

/// Passive tap on the host's "playback info" responses.
///
/// Sole writer of the current item id; everyone else reads it through a
/// [`CurrentItem`].
pub struct PlaybackObserver {
  endpoint: String,
  tx: watch::Sender<Option<ItemId>>,
}

impl PlaybackObserver {
  pub fn new(endpoint: &str) -> Self {
    let (tx, _) = watch::channel(None);
    Self { endpoint: endpoint.to_string(), tx }
  }

  pub fn current(&self) -> CurrentItem {
    CurrentItem { rx: self.tx.subscribe() }
  }

  /// Whether `url`'s path ends with the playback-info endpoint. Query
  /// strings and fragments are ignored.
  pub fn is_playback_info(&self, url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/').ends_with(&self.endpoint)
  }

  /// Feed one completed request. Publishes and returns the extracted id when
  /// `url` targets the endpoint and `body` parses; otherwise the previous id
  /// is kept.
  pub fn observe(&self, url: &str, body: &str) -> Option<ItemId> {
    if !self.is_playback_info(url) {
      return None;
    }
    let info: PlaybackInfo = match serde_json::from_str(body) {
      Ok(info) => info,
      Err(e) => {
        warn!(err = %e, url, "observer: malformed playback info, keeping previous item");
        return None;
      }
    };
    let Some(source) = info.media_sources.into_iter().next() else {
      warn!(url, "observer: playback info without media sources, keeping previous item");
      return None;
    };
    info!(item = %source.id, "observer: current item");
    self.tx.send_replace(Some(source.id.clone()));
    Some(source.id)
  }
}

/// Read side of the current item id.
#[derive(Debug, Clone)]
pub struct CurrentItem {
  rx: watch::Receiver<Option<ItemId>>,
}

impl CurrentItem {
  pub fn get(&self) -> Option<ItemId> {
    self.rx.borrow().clone()
  }

  /// Wait until an id has been observed, up to `timeout`.
  pub async fn wait_for_first(&self, timeout: Duration) -> Option<ItemId> {
    let mut rx = self.rx.clone();
    match tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await {
      Ok(Ok(id)) => id.clone(),
      _ => self.get(),
    }
  }
}
