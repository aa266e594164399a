use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::changes::{Debounced, PageChange};
use crate::client::LibraryClient;
use crate::constants::constants;
use crate::host::{ElementRef, HostPage, Node};
use crate::model::ItemId;
use crate::observer::CurrentItem;

/// Whether the entry point is currently mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
  Inactive,
  Active,
}

/// Result of one detector pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
  /// This pass inserted the entry point.
  Mounted,
  AlreadyMounted,
  /// No playback surface; stale entry-point nodes were cleared.
  Unmounted { removed: usize },
  NoCurrentItem,
  NotEpisode,
  ClassificationFailed,
  AnchorMissing,
  /// Another pass inserted the entry point while this one was suspended.
  LostRace,
  InsertFailed,
}

/// Last classified item, so repeated passes for the same item skip the fetch.
#[derive(Debug, Default)]
struct MountCache {
  last_item: Option<ItemId>,
  is_episode: Option<bool>,
}

/// Decides whether the entry point belongs on the page and keeps exactly
/// zero or one of it mounted.
///
/// `evaluate` may run concurrently with itself (tick and mutation wake-ups
/// interleave at the metadata fetch). The presence check is repeated right
/// before insertion so overlapping passes never mount twice.
pub struct Detector {
  host: Arc<dyn HostPage>,
  client: Arc<dyn LibraryClient>,
  current: CurrentItem,
  cache: Mutex<MountCache>,
}

impl Detector {
  pub fn new(host: Arc<dyn HostPage>, client: Arc<dyn LibraryClient>, current: CurrentItem) -> Self {
    Self { host, client, current, cache: Mutex::new(MountCache::default()) }
  }

  fn cache(&self) -> std::sync::MutexGuard<'_, MountCache> {
    self.cache.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// A media element and its on-screen display both exist.
  pub fn is_playback_page(&self) -> bool {
    let c = constants();
    self.host.exists(&c.media_selector) && self.host.exists(&c.osd_container_selector)
  }

  fn entry_point_nodes(&self) -> Vec<ElementRef> {
    let c = constants();
    let mut nodes = self.host.by_id(&c.entry_point_container_id);
    nodes.extend(self.host.by_id(&c.entry_point_button_id));
    nodes
  }

  pub fn state(&self) -> MountState {
    if self.entry_point_nodes().is_empty() { MountState::Inactive } else { MountState::Active }
  }

  /// The last visible settings button.
  fn anchor(&self) -> Option<ElementRef> {
    self.host.query_all(&constants().settings_anchor_selector).into_iter().rev().find(|el| self.host.is_visible(*el))
  }

  /// Keep the first container if something left several behind.
  fn prune_duplicates(&self) {
    let containers = self.host.by_id(&constants().entry_point_container_id);
    if containers.len() > 1 {
      info!(count = containers.len(), "detector: pruning duplicate entry points");
      for extra in &containers[1..] {
        self.host.remove(*extra);
      }
    }
  }

  fn unmount(&self) -> usize {
    let removed = self.entry_point_nodes().into_iter().filter(|el| self.host.remove(*el)).count();
    *self.cache() = MountCache::default();
    if removed > 0 {
      info!(removed, "detector: left playback, entry point removed");
    }
    removed
  }

  async fn classify(&self, id: &ItemId) -> Result<bool> {
    let user = self.client.current_user_id().await?;
    let item = self.client.item(&user, id).await?;
    Ok(item.is_episode())
  }

  /// Cached classification for `id`, fetching it when the item changed or
  /// the previous fetch never completed.
  async fn is_episode(&self, id: &ItemId) -> Option<bool> {
    {
      let mut cache = self.cache();
      if cache.last_item.as_ref() == Some(id)
        && let Some(known) = cache.is_episode
      {
        return Some(known);
      }
      cache.last_item = Some(id.clone());
      cache.is_episode = None;
    }
    match self.classify(id).await {
      Ok(is_episode) => {
        debug!(item = %id, is_episode, "detector: classified current item");
        let mut cache = self.cache();
        if cache.last_item.as_ref() == Some(id) {
          cache.is_episode = Some(is_episode);
        }
        Some(is_episode)
      }
      Err(e) => {
        warn!(item = %id, err = %e, "detector: failed to classify current item");
        None
      }
    }
  }

  /// One pass of the mount/unmount decision.
  pub async fn evaluate(&self) -> Evaluation {
    if !self.is_playback_page() {
      return Evaluation::Unmounted { removed: self.unmount() };
    }
    self.prune_duplicates();
    if !self.entry_point_nodes().is_empty() {
      return Evaluation::AlreadyMounted;
    }
    let Some(item) = self.current.get() else {
      return Evaluation::NoCurrentItem;
    };
    match self.is_episode(&item).await {
      None => return Evaluation::ClassificationFailed,
      Some(false) => return Evaluation::NotEpisode,
      Some(true) => {}
    }
    let Some(anchor) = self.anchor() else {
      return Evaluation::AnchorMissing;
    };
    if !self.entry_point_nodes().is_empty() {
      debug!("detector: entry point appeared during evaluation");
      return Evaluation::LostRace;
    }
    match self.host.insert_before(anchor, entry_point()) {
      Ok(_) => {
        info!(item = %item, "detector: entry point mounted");
        Evaluation::Mounted
      }
      Err(e) => {
        warn!(err = %e, "detector: failed to mount entry point");
        Evaluation::InsertFailed
      }
    }
  }

  /// Evaluate on every tick and after every relevant burst of page changes.
  /// Returns when the change source closes.
  pub async fn run(&self, mut changes: Debounced<PageChange>) {
    let c = constants();
    let watched = [c.media_selector.as_str(), c.osd_container_selector.as_str(), c.settings_anchor_selector.as_str()];
    let mut ticker = tokio::time::interval(c.check_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      tokio::select! {
        _ = ticker.tick() => {
          self.evaluate().await;
        }
        burst = changes.next() => {
          let Some(burst) = burst else { break };
          if burst.iter().any(|change| change.is_relevant(&watched)) {
            debug!(changes = burst.len(), "detector: relevant page change");
            self.evaluate().await;
          }
        }
      }
    }
    debug!("detector: change source closed");
  }
}

/// Container and button that open the episode panel.
fn entry_point() -> Node {
  let c = constants();
  Node::new("div").id(&c.entry_point_container_id).child(
    Node::new("button")
      .id(&c.entry_point_button_id)
      .class("paper-icon-button-light")
      .attr("is", "paper-icon-button-light")
      .attr("title", "Episodes")
      .child(Node::new("span").class("xlargePaperIconButton material-icons").text("format_list_bulleted")),
  )
}
