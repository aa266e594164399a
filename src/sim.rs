//! In-memory stand-ins for the host application.
//!
//! `SimPage` is a small DOM with just enough selector support for the host
//! contract (tag, `#id`, `.class`, `[attr]`, `[attr=value]` and descendant
//! combinators). The harness binary drives the full agent against it and the
//! unit tests use it as the fake host page.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::iter::Peekable;
use std::str::Chars;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::client::{ItemsQuery, LibraryClient};
use crate::feedback::{Feedback, ToastKind};
use crate::host::{Activator, ElementRef, HostPage, ListenerHandle, ListenerKind, Node, PlaybackManager};
use crate::model::{Item, ItemId, ItemKind};

// --- Selectors ---

#[derive(Debug, Default, PartialEq)]
struct Compound {
  tag: Option<String>,
  id: Option<String>,
  classes: Vec<String>,
  attrs: Vec<(String, Option<String>)>,
}

fn split_descendants(selector: &str) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut depth = 0usize;
  let mut start = None;
  for (i, c) in selector.char_indices() {
    match c {
      '[' => depth += 1,
      ']' => depth = depth.saturating_sub(1),
      c if c.is_whitespace() && depth == 0 => {
        if let Some(s) = start.take() {
          parts.push(&selector[s..i]);
        }
        continue;
      }
      _ => {}
    }
    if start.is_none() {
      start = Some(i);
    }
  }
  if let Some(s) = start {
    parts.push(&selector[s..]);
  }
  parts
}

fn ident(chars: &mut Peekable<Chars<'_>>) -> String {
  let mut buf = String::new();
  while let Some(&c) = chars.peek() {
    if matches!(c, '.' | '#' | '[') {
      break;
    }
    buf.push(c);
    chars.next();
  }
  buf
}

fn parse_compound(s: &str) -> Compound {
  let mut out = Compound::default();
  let mut chars = s.chars().peekable();
  while let Some(&c) = chars.peek() {
    match c {
      '.' => {
        chars.next();
        out.classes.push(ident(&mut chars));
      }
      '#' => {
        chars.next();
        out.id = Some(ident(&mut chars));
      }
      '[' => {
        chars.next();
        let body: String = chars.by_ref().take_while(|c| *c != ']').collect();
        match body.split_once('=') {
          Some((name, value)) => {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            out.attrs.push((name.trim().to_string(), Some(value.to_string())));
          }
          None => out.attrs.push((body.trim().to_string(), None)),
        }
      }
      _ => {
        let tag = ident(&mut chars);
        if tag != "*" {
          out.tag = Some(tag.to_lowercase());
        }
      }
    }
  }
  out
}

// --- Page ---

#[derive(Debug, Clone)]
struct SimNode {
  tag: String,
  id: Option<String>,
  classes: Vec<String>,
  attrs: BTreeMap<String, String>,
  style: BTreeMap<String, String>,
  text: Option<String>,
  parent: Option<u64>,
  children: Vec<u64>,
  hidden: bool,
  disabled: bool,
}

impl SimNode {
  fn matches(&self, c: &Compound) -> bool {
    c.tag.as_ref().is_none_or(|t| *t == self.tag)
      && c.id.as_ref().is_none_or(|id| self.id.as_ref() == Some(id))
      && c.classes.iter().all(|class| self.classes.contains(class))
      && c.attrs.iter().all(|(name, value)| match (self.attr(name), value) {
        (Some(actual), Some(expected)) => actual == *expected,
        (Some(_), None) => true,
        (None, _) => false,
      })
  }

  fn attr(&self, name: &str) -> Option<String> {
    match name {
      "id" => self.id.clone(),
      "class" => Some(self.classes.join(" ")),
      _ => self.attrs.get(name).cloned(),
    }
  }

  fn renders(&self) -> bool {
    !self.hidden && self.style.get("display").is_none_or(|d| d != "none")
  }
}

struct SimState {
  nodes: HashMap<u64, SimNode>,
  next_key: u64,
  root: u64,
  head: u64,
  body: u64,
  title: String,
  route_log: Vec<(Instant, String)>,
  listeners: BTreeMap<u64, ListenerKind>,
  next_listener: u64,
  alerts: Vec<String>,
  scrolled: Vec<ElementRef>,
  removals: usize,
}

impl SimState {
  fn alloc(&mut self, parent: Option<u64>, node: &Node) -> u64 {
    let key = self.next_key;
    self.next_key += 1;
    let sim = SimNode {
      tag: node.tag.to_lowercase(),
      id: node.id.clone(),
      classes: node.classes.clone(),
      attrs: node.attrs.iter().cloned().collect(),
      style: node.style.iter().cloned().collect(),
      text: node.text.clone(),
      parent,
      children: Vec::new(),
      hidden: false,
      disabled: node.get_attr("disabled").is_some(),
    };
    self.nodes.insert(key, sim);
    for child in &node.children {
      let child_key = self.alloc(Some(key), child);
      if let Some(n) = self.nodes.get_mut(&key) {
        n.children.push(child_key);
      }
    }
    key
  }

  fn attach(&mut self, parent: u64, index: Option<usize>, node: &Node) -> Result<u64> {
    if !self.nodes.contains_key(&parent) {
      return Err(anyhow!("parent element {} is detached", parent));
    }
    let key = self.alloc(Some(parent), node);
    if let Some(p) = self.nodes.get_mut(&parent) {
      match index {
        Some(i) => p.children.insert(i.min(p.children.len()), key),
        None => p.children.push(key),
      }
    }
    Ok(key)
  }

  fn detach(&mut self, key: u64) -> bool {
    let Some(node) = self.nodes.remove(&key) else { return false };
    if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
      parent.children.retain(|c| *c != key);
    }
    for child in node.children {
      self.detach(child);
    }
    true
  }

  fn document_order(&self) -> Vec<u64> {
    let mut out = Vec::new();
    let mut stack = vec![self.root];
    while let Some(key) = stack.pop() {
      out.push(key);
      if let Some(node) = self.nodes.get(&key) {
        stack.extend(node.children.iter().rev());
      }
    }
    out
  }

  fn matches_chain(&self, key: u64, chain: &[Compound]) -> bool {
    let Some((last, ancestors)) = chain.split_last() else { return false };
    let Some(node) = self.nodes.get(&key) else { return false };
    if !node.matches(last) {
      return false;
    }
    let mut remaining = ancestors;
    let mut cursor = node.parent;
    while let Some((want, rest)) = remaining.split_last() {
      let Some(parent_key) = cursor else { return false };
      let Some(parent) = self.nodes.get(&parent_key) else { return false };
      if parent.matches(want) {
        remaining = rest;
      }
      cursor = parent.parent;
    }
    true
  }

  fn ancestors_and_self(&self, key: u64) -> Vec<&SimNode> {
    let mut out = Vec::new();
    let mut cursor = Some(key);
    while let Some(k) = cursor {
      let Some(node) = self.nodes.get(&k) else { break };
      out.push(node);
      cursor = node.parent;
    }
    out
  }

  fn to_node(&self, key: u64) -> Option<Node> {
    let n = self.nodes.get(&key)?;
    Some(Node {
      tag: n.tag.clone(),
      id: n.id.clone(),
      classes: n.classes.clone(),
      attrs: n.attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
      style: n.style.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
      text: n.text.clone(),
      children: n.children.iter().filter_map(|c| self.to_node(*c)).collect(),
    })
  }
}

/// In-memory host page.
pub struct SimPage {
  state: Mutex<SimState>,
  route: watch::Sender<String>,
}

impl Default for SimPage {
  fn default() -> Self {
    Self::new()
  }
}

impl SimPage {
  pub fn new() -> Self {
    let mut state = SimState {
      nodes: HashMap::new(),
      next_key: 1,
      root: 0,
      head: 0,
      body: 0,
      title: "Home".to_string(),
      route_log: Vec::new(),
      listeners: BTreeMap::new(),
      next_listener: 1,
      alerts: Vec::new(),
      scrolled: Vec::new(),
      removals: 0,
    };
    state.root = state.alloc(None, &Node::new("html"));
    state.head = state.attach(state.root, None, &Node::new("head")).unwrap_or_default();
    state.body = state.attach(state.root, None, &Node::new("body")).unwrap_or_default();
    let (route, _) = watch::channel("#/home".to_string());
    Self { state: Mutex::new(state), route }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn body(&self) -> ElementRef {
    ElementRef(self.lock().body)
  }

  pub fn head(&self) -> ElementRef {
    ElementRef(self.lock().head)
  }

  /// Append `node` under `parent`.
  pub fn add(&self, parent: ElementRef, node: Node) -> Result<ElementRef> {
    self.lock().attach(parent.0, None, &node).map(ElementRef)
  }

  pub fn set_hidden(&self, el: ElementRef, hidden: bool) {
    if let Some(n) = self.lock().nodes.get_mut(&el.0) {
      n.hidden = hidden;
    }
  }

  pub fn set_disabled(&self, el: ElementRef, disabled: bool) {
    if let Some(n) = self.lock().nodes.get_mut(&el.0) {
      n.disabled = disabled;
    }
  }

  pub fn text_of(&self, el: ElementRef) -> Option<String> {
    self.lock().nodes.get(&el.0).and_then(|n| n.text.clone())
  }

  pub fn attr_of(&self, el: ElementRef, name: &str) -> Option<String> {
    self.lock().nodes.get(&el.0).and_then(|n| n.attr(name))
  }

  pub fn has_class(&self, el: ElementRef, class: &str) -> bool {
    self.lock().nodes.get(&el.0).is_some_and(|n| n.classes.iter().any(|c| c == class))
  }

  pub fn is_attached(&self, el: ElementRef) -> bool {
    self.lock().nodes.contains_key(&el.0)
  }

  pub fn children_of(&self, el: ElementRef) -> Vec<ElementRef> {
    self.lock().nodes.get(&el.0).map(|n| n.children.iter().copied().map(ElementRef).collect()).unwrap_or_default()
  }

  pub fn watch_route(&self) -> watch::Receiver<String> {
    self.route.subscribe()
  }

  /// Every route set through [`HostPage::set_route`], with the virtual time it happened.
  pub fn route_log(&self) -> Vec<(Instant, String)> {
    self.lock().route_log.clone()
  }

  pub fn listener_count(&self, kind: ListenerKind) -> usize {
    self.lock().listeners.values().filter(|k| **k == kind).count()
  }

  pub fn alerts(&self) -> Vec<String> {
    self.lock().alerts.clone()
  }

  pub fn scrolled(&self) -> Vec<ElementRef> {
    self.lock().scrolled.clone()
  }

  /// Number of successful [`HostPage::remove`] calls.
  pub fn removals(&self) -> usize {
    self.lock().removals
  }

  /// Build a typical playback page: player, on-screen display with a
  /// settings button, and the main content region.
  pub fn with_playback_surface(&self) -> Result<PlaybackSurface> {
    let body = self.body();
    let main = self.add(body, Node::new("div").class("mainAnimatedPage").child(Node::new("div").class("home")))?;
    let player = self.add(body, Node::new("div").class("htmlvideoplayer").child(Node::new("video")))?;
    let osd = self.add(body, Node::new("div").attr("data-type", "video-osd"))?;
    let buttons = self.add(osd, Node::new("div").class("buttons"))?;
    self.add(buttons, Node::new("button").class("btnPause pause"))?;
    let settings = self.add(buttons, Node::new("button").class("btnVideoOsdSettings"))?;
    Ok(PlaybackSurface { main, player, osd, settings })
  }

  /// Remove the player and its on-screen display, as when leaving playback.
  pub fn leave_playback(&self, surface: &PlaybackSurface) {
    self.remove(surface.player);
    self.remove(surface.osd);
  }
}

/// Handles into the page built by [`SimPage::with_playback_surface`].
#[derive(Debug, Clone, Copy)]
pub struct PlaybackSurface {
  pub main: ElementRef,
  pub player: ElementRef,
  pub osd: ElementRef,
  pub settings: ElementRef,
}

impl HostPage for SimPage {
  fn query_all(&self, selector: &str) -> Vec<ElementRef> {
    let chain: Vec<Compound> = split_descendants(selector).into_iter().map(parse_compound).collect();
    if chain.is_empty() {
      return Vec::new();
    }
    let state = self.lock();
    state.document_order().into_iter().filter(|k| state.matches_chain(*k, &chain)).map(ElementRef).collect()
  }

  fn contains(&self, ancestor: ElementRef, el: ElementRef) -> bool {
    let state = self.lock();
    let mut cursor = Some(el.0);
    while let Some(k) = cursor {
      if k == ancestor.0 {
        return true;
      }
      cursor = state.nodes.get(&k).and_then(|n| n.parent);
    }
    false
  }

  fn is_visible(&self, el: ElementRef) -> bool {
    let state = self.lock();
    let chain = state.ancestors_and_self(el.0);
    let attached = chain.last().is_some_and(|top| top.tag == "html");
    attached
      && chain.iter().all(|n| n.renders())
      && chain.first().is_some_and(|n| n.style.get("visibility").is_none_or(|v| v != "hidden"))
  }

  fn is_enabled(&self, el: ElementRef) -> bool {
    self.lock().nodes.get(&el.0).is_some_and(|n| !n.disabled)
  }

  fn insert_before(&self, anchor: ElementRef, node: Node) -> Result<ElementRef> {
    let mut state = self.lock();
    let parent = state.nodes.get(&anchor.0).and_then(|n| n.parent).ok_or_else(|| anyhow!("anchor has no parent"))?;
    let index = state.nodes.get(&parent).and_then(|p| p.children.iter().position(|c| *c == anchor.0));
    state.attach(parent, index, &node).map(ElementRef)
  }

  fn append_to_body(&self, node: Node) -> Result<ElementRef> {
    let mut state = self.lock();
    let body = state.body;
    state.attach(body, None, &node).map(ElementRef)
  }

  fn append_to_head(&self, node: Node) -> Result<ElementRef> {
    let mut state = self.lock();
    let head = state.head;
    state.attach(head, None, &node).map(ElementRef)
  }

  fn replace_children(&self, parent: ElementRef, nodes: Vec<Node>) -> Result<Vec<ElementRef>> {
    let mut state = self.lock();
    let old = state.nodes.get(&parent.0).map(|n| n.children.clone()).ok_or_else(|| anyhow!("parent is detached"))?;
    for child in old {
      state.detach(child);
    }
    nodes.iter().map(|n| state.attach(parent.0, None, n).map(ElementRef)).collect()
  }

  fn remove(&self, el: ElementRef) -> bool {
    let mut state = self.lock();
    let removed = state.detach(el.0);
    if removed {
      state.removals += 1;
    }
    removed
  }

  fn clone_subtree(&self, el: ElementRef) -> Option<Node> {
    self.lock().to_node(el.0)
  }

  fn style(&self, el: ElementRef, prop: &str) -> Option<String> {
    self.lock().nodes.get(&el.0).and_then(|n| n.style.get(prop).cloned())
  }

  fn set_style(&self, el: ElementRef, prop: &str, value: Option<&str>) {
    if let Some(n) = self.lock().nodes.get_mut(&el.0) {
      match value {
        Some(v) => {
          n.style.insert(prop.to_string(), v.to_string());
        }
        None => {
          n.style.remove(prop);
        }
      }
    }
  }

  fn toggle_class(&self, el: ElementRef, class: &str, on: bool) {
    if let Some(n) = self.lock().nodes.get_mut(&el.0) {
      n.classes.retain(|c| c != class);
      if on {
        n.classes.push(class.to_string());
      }
    }
  }

  fn set_text(&self, el: ElementRef, text: &str) {
    if let Some(n) = self.lock().nodes.get_mut(&el.0) {
      n.text = Some(text.to_string());
    }
  }

  fn scroll_into_view(&self, el: ElementRef) {
    self.lock().scrolled.push(el);
  }

  fn route(&self) -> String {
    self.route.borrow().clone()
  }

  fn set_route(&self, route: &str) {
    self.lock().route_log.push((Instant::now(), route.to_string()));
    self.route.send_replace(route.to_string());
  }

  fn title(&self) -> String {
    self.lock().title.clone()
  }

  fn set_title(&self, title: &str) {
    self.lock().title = title.to_string();
  }

  fn listen(&self, kind: ListenerKind) -> ListenerHandle {
    let mut state = self.lock();
    let key = state.next_listener;
    state.next_listener += 1;
    state.listeners.insert(key, kind);
    ListenerHandle(key)
  }

  fn unlisten(&self, handle: ListenerHandle) -> bool {
    self.lock().listeners.remove(&handle.0).is_some()
  }

  fn alert(&self, message: &str) {
    self.lock().alerts.push(message.to_string());
  }
}

/// Mimic the host's detail view: whenever the route moves to an item's
/// detail page, render a play button after `render_delay`; tear it down when
/// the route moves elsewhere.
pub fn spawn_detail_view(page: Arc<SimPage>, render_delay: Duration) -> JoinHandle<()> {
  let mut routes = page.watch_route();
  tokio::spawn(async move {
    let mut detail: Option<ElementRef> = None;
    while routes.changed().await.is_ok() {
      let route = routes.borrow_and_update().clone();
      if let Some(el) = detail.take() {
        page.remove(el);
      }
      if route.contains("details") {
        tokio::time::sleep(render_delay).await;
        let view = Node::new("div")
          .class("itemDetailPage")
          .child(Node::new("button").class("btnPlay detailButton").attr("title", "Play"));
        detail = page.append_to_body(view).ok();
      }
    }
  })
}

// --- Activation and playback ---

type ActivationHook = Box<dyn FnMut(ElementRef) -> Result<()> + Send>;

/// [`Activator`] that records every activation and optionally runs a hook.
#[derive(Default)]
pub struct RecordingActivator {
  calls: Mutex<Vec<ElementRef>>,
  hook: Mutex<Option<ActivationHook>>,
}

impl RecordingActivator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_hook(hook: impl FnMut(ElementRef) -> Result<()> + Send + 'static) -> Self {
    Self { calls: Mutex::new(Vec::new()), hook: Mutex::new(Some(Box::new(hook) as ActivationHook)) }
  }

  pub fn calls(&self) -> Vec<ElementRef> {
    self.calls.lock().map(|c| c.clone()).unwrap_or_default()
  }
}

impl Activator for RecordingActivator {
  fn activate(&self, el: ElementRef) -> Result<()> {
    if let Ok(mut calls) = self.calls.lock() {
      calls.push(el);
    }
    let mut hook = self.hook.lock().map_err(|_| anyhow!("activation hook poisoned"))?;
    match hook.as_mut() {
      Some(hook) => hook(el),
      None => Ok(()),
    }
  }
}

/// [`PlaybackManager`] whose answer is set by the test or harness.
#[derive(Default)]
pub struct SimPlayback {
  playing: Mutex<Option<ItemId>>,
}

impl SimPlayback {
  pub fn set(&self, id: Option<ItemId>) {
    if let Ok(mut playing) = self.playing.lock() {
      *playing = id;
    }
  }
}

impl PlaybackManager for SimPlayback {
  fn now_playing(&self) -> Option<ItemId> {
    self.playing.lock().ok().and_then(|p| p.clone())
  }
}

// --- Library ---

/// [`LibraryClient`] over a fixed item list.
pub struct StaticLibrary {
  items: Vec<Item>,
  server_id: Option<String>,
  version: Option<String>,
  ready: AtomicBool,
  offline: AtomicBool,
  item_fetches: AtomicUsize,
}

impl StaticLibrary {
  pub fn new(items: Vec<Item>) -> Self {
    Self {
      items,
      server_id: Some("sim-server".to_string()),
      version: Some("10.10.7".to_string()),
      ready: AtomicBool::new(true),
      offline: AtomicBool::new(false),
      item_fetches: AtomicUsize::new(0),
    }
  }

  /// A two-season series `s1` with episodes `ep1`..`ep12` and one film `movie1`.
  pub fn demo() -> Self {
    let mut items: Vec<Item> = (1..=12)
      .map(|n| {
        let season = if n <= 6 { 1 } else { 2 };
        let index = if n <= 6 { n } else { n - 6 };
        Item {
          id: ItemId::new(format!("ep{}", n)),
          name: Some(format!("Chapter {}", n)),
          overview: Some(format!("Synopsis of chapter {}.", n)),
          index_number: Some(index),
          parent_index_number: Some(season),
          series_id: Some(ItemId::new("s1")),
          series_name: Some("The Long Road".to_string()),
          run_time_ticks: Some(u64::from(20 + n) * 600_000_000),
          primary_image_aspect_ratio: Some(1.777),
          kind: ItemKind::Episode,
        }
      })
      .collect();
    items.push(Item {
      id: ItemId::new("movie1"),
      name: Some("Standalone".to_string()),
      overview: None,
      index_number: None,
      parent_index_number: None,
      series_id: None,
      series_name: None,
      run_time_ticks: Some(95 * 600_000_000),
      primary_image_aspect_ratio: None,
      kind: ItemKind::Other("Movie".to_string()),
    });
    Self::new(items)
  }

  pub fn without_server_id(mut self) -> Self {
    self.server_id = None;
    self
  }

  pub fn set_ready(&self, ready: bool) {
    self.ready.store(ready, Ordering::SeqCst);
  }

  /// Make every request fail as a network error would.
  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  /// Number of item-by-id fetches served so far.
  pub fn item_fetches(&self) -> usize {
    self.item_fetches.load(Ordering::SeqCst)
  }

  fn check_online(&self) -> Result<()> {
    if self.offline.load(Ordering::SeqCst) { Err(anyhow!("network unreachable")) } else { Ok(()) }
  }
}

#[async_trait]
impl LibraryClient for StaticLibrary {
  fn is_ready(&self) -> bool {
    self.ready.load(Ordering::SeqCst)
  }

  async fn current_user_id(&self) -> Result<String> {
    self.check_online()?;
    Ok("sim-user".to_string())
  }

  async fn item(&self, _user_id: &str, id: &ItemId) -> Result<Item> {
    self.item_fetches.fetch_add(1, Ordering::SeqCst);
    // Yield like a real request would, so overlapping callers interleave.
    tokio::task::yield_now().await;
    self.check_online()?;
    self.items.iter().find(|i| &i.id == id).cloned().ok_or_else(|| anyhow!("item {} not found", id))
  }

  async fn items(&self, _user_id: &str, query: &ItemsQuery) -> Result<Vec<Item>> {
    self.check_online()?;
    let mut found: Vec<Item> = self
      .items
      .iter()
      .filter(|i| i.series_id.as_ref() == Some(&query.parent_id))
      .filter(|i| query.include_item_types.is_empty() || i.is_episode())
      .cloned()
      .collect();
    found.sort_by_key(|i| (i.parent_index_number, i.index_number));
    Ok(found)
  }

  fn server_id(&self) -> Option<String> {
    self.server_id.clone()
  }

  fn app_version(&self) -> Option<String> {
    self.version.clone()
  }
}

// --- Feedback ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
  ShowVeil(String),
  UpdateVeil(String),
  HideVeil,
  Toast(String, ToastKind),
  Alert(String),
}

/// [`Feedback`] that only records what it was asked to show.
#[derive(Default)]
pub struct RecordingFeedback {
  events: Mutex<Vec<FeedbackEvent>>,
}

impl RecordingFeedback {
  pub fn events(&self) -> Vec<FeedbackEvent> {
    self.events.lock().map(|e| e.clone()).unwrap_or_default()
  }

  /// Whether the veil is up after replaying every recorded event.
  pub fn veil_visible(&self) -> bool {
    self.events().iter().fold(false, |up, e| match e {
      FeedbackEvent::ShowVeil(_) => true,
      FeedbackEvent::HideVeil => false,
      _ => up,
    })
  }

  fn push(&self, event: FeedbackEvent) {
    if let Ok(mut events) = self.events.lock() {
      events.push(event);
    }
  }
}

impl Feedback for RecordingFeedback {
  fn show_veil(&self, message: &str) {
    self.push(FeedbackEvent::ShowVeil(message.to_string()));
  }

  fn update_veil(&self, message: &str) {
    self.push(FeedbackEvent::UpdateVeil(message.to_string()));
  }

  fn hide_veil(&self) {
    self.push(FeedbackEvent::HideVeil);
  }

  fn toast(&self, message: &str, kind: ToastKind) {
    self.push(FeedbackEvent::Toast(message.to_string(), kind));
  }

  fn alert(&self, message: &str) {
    self.push(FeedbackEvent::Alert(message.to_string()));
  }
}
