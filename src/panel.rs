//! Season-tabbed episode panel.
//!
//! Rendering and interaction only. The panel never starts a transition
//! itself; selecting another episode closes it and hands the id back to the
//! caller as [`PanelOutcome::Play`].

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::constants::constants;
use crate::host::{ElementRef, HostPage, ListenerHandle, ListenerKind, Node};
use crate::model::{Item, ItemId, SeasonGroups};

const PANEL_CSS: &str = "\
.osd-episodes-panel { position: fixed; inset: 0; z-index: 999999; display: flex; align-items: center; justify-content: center; background: rgba(0, 0, 0, 0.6); }
.osd-episodes-panel .panel-content { width: min(720px, 92vw); max-height: 80vh; display: flex; flex-direction: column; background: #202020; border-radius: 8px; overflow: hidden; }
.osd-episodes-panel .panel-header { display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; }
.osd-episodes-panel .season-tabs { display: flex; gap: 8px; overflow-x: auto; padding: 0 16px 8px; }
.osd-episodes-panel .season-tab.active { border-bottom: 2px solid #00a4db; }
.osd-episodes-panel .episode-list { overflow-y: auto; padding: 8px 16px 16px; }
.osd-episodes-panel .episode-item { padding: 8px; border-radius: 4px; cursor: pointer; }
.osd-episodes-panel .episode-item.current { background: rgba(0, 164, 219, 0.25); cursor: default; }
.osd-episodes-panel .episode-overview { display: -webkit-box; -webkit-line-clamp: 2; -webkit-box-orient: vertical; overflow: hidden; opacity: 0.7; }
";

/// What to show.
#[derive(Debug, Clone)]
pub struct PanelSpec {
  pub id: String,
  pub title: String,
  pub groups: SeasonGroups,
  pub current: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
  SelectSeason(u32),
  SelectItem(ItemId),
  CloseButton,
  KeyDown(String),
  /// Document-level click on `target`.
  DocumentClick(ElementRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
  Stay,
  Closed,
  /// The panel closed because another episode was picked.
  Play(ItemId),
}

/// Season containing `current`, or the smallest season when it is in none.
pub fn active_season(groups: &SeasonGroups, current: Option<&ItemId>) -> Option<u32> {
  current.and_then(|id| groups.season_of(id)).or_else(|| groups.seasons().next())
}

/// Width-aware truncation, appending "…" when the text does not fit.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
  if s.width() <= max_width {
    return s.to_string();
  }
  let mut width = 0;
  let mut out = String::new();
  for c in s.chars() {
    let w = c.width().unwrap_or(0);
    if width + w + 1 > max_width {
      break;
    }
    width += w;
    out.push(c);
  }
  out.push('…');
  out
}

pub struct Panel {
  host: Arc<dyn HostPage>,
  spec: PanelSpec,
  root: ElementRef,
  content: ElementRef,
  list: ElementRef,
  style: Option<ElementRef>,
  tabs: Vec<(u32, ElementRef)>,
  items: Vec<(ItemId, ElementRef)>,
  listeners: Vec<ListenerHandle>,
  active: u32,
  opened_at: Instant,
  closed: bool,
}

impl Panel {
  /// Mount the panel. Returns `None` when an element with the panel's id is
  /// already on the page.
  pub fn open(host: Arc<dyn HostPage>, spec: PanelSpec) -> Result<Option<Panel>> {
    if !host.by_id(&spec.id).is_empty() {
      debug!(id = %spec.id, "panel: already open");
      return Ok(None);
    }
    let active = active_season(&spec.groups, spec.current.as_ref()).context("No seasons to show")?;

    let style = host
      .append_to_head(Node::new("style").id(&format!("{}-style", spec.id)).text(PANEL_CSS))
      .context("Failed to inject panel styles")?;

    let tabs = spec.groups.seasons().map(|season| {
      Node::new("button")
        .class(if season == active { "season-tab active" } else { "season-tab" })
        .attr("data-season", &season.to_string())
        .text(format!("Season {}", season))
    });
    let title = truncate_to_width(&spec.title, constants().panel_title_width);
    let root = Node::new("div").id(&spec.id).class("osd-episodes-panel").child(
      Node::new("div")
        .class("panel-content")
        .child(
          Node::new("div")
            .class("panel-header")
            .child(Node::new("h3").class("panel-title").attr("title", &spec.title).text(title))
            .child(Node::new("button").class("panel-close").attr("title", "Close").text("×")),
        )
        .child(Node::new("div").class("season-tabs").children(tabs))
        .child(Node::new("div").class("episode-list")),
    );
    let root = match host.append_to_body(root) {
      Ok(root) => root,
      Err(e) => {
        host.remove(style);
        return Err(e.context("Failed to mount panel"));
      }
    };

    let scoped = |selector: &str| host.query_all(&format!("#{} {}", spec.id, selector));
    let mounted = scoped(".panel-content").into_iter().next().zip(scoped(".episode-list").into_iter().next());
    let Some((content, list)) = mounted else {
      host.remove(root);
      host.remove(style);
      bail!("Panel markup missing after mount");
    };
    let tabs = spec.groups.seasons().zip(scoped(".season-tab")).collect();
    let listeners = vec![host.listen(ListenerKind::Keydown), host.listen(ListenerKind::Click)];

    let mut panel = Panel {
      host,
      spec,
      root,
      content,
      list,
      style: Some(style),
      tabs,
      items: Vec::new(),
      listeners,
      active,
      opened_at: Instant::now(),
      closed: false,
    };
    if let Err(e) = panel.render_list() {
      panel.close();
      return Err(e);
    }
    panel.scroll_active_tab();
    debug!(id = %panel.spec.id, season = active, "panel: opened");
    Ok(Some(panel))
  }

  pub fn is_open(&self) -> bool {
    !self.closed
  }

  pub fn active(&self) -> u32 {
    self.active
  }

  pub fn content(&self) -> ElementRef {
    self.content
  }

  pub fn item_element(&self, id: &ItemId) -> Option<ElementRef> {
    self.items.iter().find(|(item, _)| item == id).map(|(_, el)| *el)
  }

  pub fn tab_element(&self, season: u32) -> Option<ElementRef> {
    self.tabs.iter().find(|(s, _)| *s == season).map(|(_, el)| *el)
  }

  pub fn handle(&mut self, event: PanelEvent) -> PanelOutcome {
    if self.closed {
      return PanelOutcome::Closed;
    }
    match event {
      PanelEvent::SelectSeason(season) => {
        if season != self.active && self.tab_element(season).is_some() {
          self.select_season(season);
        }
        PanelOutcome::Stay
      }
      PanelEvent::SelectItem(id) => {
        if self.spec.current.as_ref() == Some(&id) {
          debug!(item = %id, "panel: current episode selected, ignoring");
          return PanelOutcome::Stay;
        }
        if self.spec.groups.season_of(&id).is_none() {
          return PanelOutcome::Stay;
        }
        self.close();
        PanelOutcome::Play(id)
      }
      PanelEvent::CloseButton => {
        self.close();
        PanelOutcome::Closed
      }
      PanelEvent::KeyDown(key) if key == "Escape" => {
        self.close();
        PanelOutcome::Closed
      }
      PanelEvent::KeyDown(_) => PanelOutcome::Stay,
      PanelEvent::DocumentClick(target) => {
        let armed = self.opened_at.elapsed() >= Duration::from_millis(constants().outside_click_arm_ms);
        if !armed || self.host.contains(self.content, target) {
          return PanelOutcome::Stay;
        }
        self.close();
        PanelOutcome::Closed
      }
    }
  }

  /// Detach listeners and remove the panel and its styles. Returns false
  /// when already closed.
  pub fn close(&mut self) -> bool {
    if self.closed {
      return false;
    }
    self.closed = true;
    for handle in self.listeners.drain(..) {
      self.host.unlisten(handle);
    }
    self.host.remove(self.root);
    if let Some(style) = self.style.take() {
      self.host.remove(style);
    }
    debug!(id = %self.spec.id, "panel: closed");
    true
  }

  fn select_season(&mut self, season: u32) {
    for (s, tab) in &self.tabs {
      self.host.toggle_class(*tab, "active", *s == season);
    }
    self.active = season;
    if let Err(e) = self.render_list() {
      debug!(err = %e, "panel: failed to render season");
    }
    self.scroll_active_tab();
  }

  fn scroll_active_tab(&self) {
    if let Some(tab) = self.tab_element(self.active) {
      self.host.scroll_into_view(tab);
    }
  }

  fn render_list(&mut self) -> Result<()> {
    let episodes = self.spec.groups.episodes(self.active);
    let current = self.spec.current.as_ref();
    let nodes = episodes.iter().map(|item| episode_node(item, current == Some(&item.id))).collect();
    let elements = self.host.replace_children(self.list, nodes)?;
    self.items = episodes.iter().map(|item| item.id.clone()).zip(elements).collect();
    if let Some(el) = current.and_then(|id| self.item_element(id)) {
      self.host.scroll_into_view(el);
    }
    Ok(())
  }
}

fn episode_node(item: &Item, is_current: bool) -> Node {
  let mut node = Node::new("div")
    .class(if is_current { "episode-item current" } else { "episode-item" })
    .attr("data-id", item.id.as_str())
    .child(Node::new("div").class("episode-label").text(item.label()))
    .child(Node::new("div").class("episode-name").text(item.display_name()));
  if let Some(runtime) = item.runtime() {
    node = node.child(Node::new("div").class("episode-runtime").text(runtime));
  }
  if let Some(overview) = item.overview.as_deref().filter(|o| !o.is_empty()) {
    node = node.child(Node::new("div").class("episode-overview").text(overview));
  }
  node
}
