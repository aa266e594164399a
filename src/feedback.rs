//! Loading veil, toasts and the failure dialog.
//!
//! Pure observer of controller outcomes: nothing here feeds back into the
//! transition state machine.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::constants;
use crate::host::{ElementRef, HostPage, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Info,
  Success,
  Error,
}

impl ToastKind {
  pub fn label(self) -> &'static str {
    match self {
      ToastKind::Info => "info",
      ToastKind::Success => "success",
      ToastKind::Error => "error",
    }
  }

  fn background(self) -> &'static str {
    match self {
      ToastKind::Info => "linear-gradient(135deg, #2196F3, #1976D2)",
      ToastKind::Success => "linear-gradient(130deg, #a95bc2, #00a4db)",
      ToastKind::Error => "linear-gradient(135deg, #f44336, #d32f2f)",
    }
  }
}

/// Surface for reporting transition progress to the viewer.
pub trait Feedback: Send + Sync {
  /// Show the blocking loading veil. Reuses an existing veil if one is up.
  fn show_veil(&self, message: &str);

  fn update_veil(&self, message: &str);

  fn hide_veil(&self);

  fn toast(&self, message: &str, kind: ToastKind);

  /// Blocking dialog with diagnostic text.
  fn alert(&self, message: &str);
}

/// [`Feedback`] rendered into the host page.
pub struct DomFeedback {
  host: Arc<dyn HostPage>,
}

impl DomFeedback {
  pub fn new(host: Arc<dyn HostPage>) -> Self {
    Self { host }
  }

  fn spinner(&self) -> Node {
    let cloned = self.host.query(&constants().spinner_selector).and_then(|el| self.host.clone_subtree(el));
    let spinner = match cloned {
      Some(node) => {
        node.class("mdlSpinnerActive").style("opacity", "1").style("visibility", "visible").style("display", "block")
      }
      None => fallback_spinner(),
    };
    spinner.style("width", "60px").style("height", "60px")
  }

  /// Fade `el` out, then detach it once the transition has played. With no
  /// delay the fade starts before this returns.
  fn fade_and_remove(&self, el: ElementRef, after: Duration) {
    if after.is_zero() {
      self.host.set_style(el, "opacity", Some("0"));
    }
    let host = Arc::clone(&self.host);
    let fade = constants().fade();
    tokio::spawn(async move {
      if !after.is_zero() {
        tokio::time::sleep(after).await;
        host.set_style(el, "opacity", Some("0"));
      }
      tokio::time::sleep(fade).await;
      host.remove(el);
    });
  }
}

/// Four-layer spinner markup used when the host has none to clone.
fn fallback_spinner() -> Node {
  let circle = || Node::new("div").class("mdl-spinner__circle");
  let layers = (1..=4).map(|i| {
    Node::new("div")
      .class(&format!("mdl-spinner__layer mdl-spinner__layer-{}", i))
      .child(Node::new("div").class("mdl-spinner__circle-clipper mdl-spinner__left").child(circle()))
      .child(Node::new("div").class("mdl-spinner__gap-patch").child(circle()))
      .child(Node::new("div").class("mdl-spinner__circle-clipper mdl-spinner__right").child(circle()))
  });
  Node::new("div").class("docspinner mdl-spinner mdlSpinnerActive").attr("dir", "ltr").children(layers)
}

impl Feedback for DomFeedback {
  fn show_veil(&self, message: &str) {
    let id = &constants().loading_overlay_id;
    let (fading, live): (Vec<_>, Vec<_>) =
      self.host.by_id(id).into_iter().partition(|el| self.host.style(*el, "opacity").as_deref() == Some("0"));
    // A veil still fading out belongs to the previous session.
    for el in fading {
      self.host.remove(el);
    }
    if !live.is_empty() {
      self.update_veil(message);
      return;
    }
    let veil = Node::new("div")
      .id(id)
      .style("position", "fixed")
      .style("inset", "0")
      .style("background", "rgba(0, 0, 0, 0.9)")
      .style("z-index", "9999999")
      .style("display", "flex")
      .style("flex-direction", "column")
      .style("justify-content", "center")
      .style("align-items", "center")
      .style("transition", "opacity 0.3s ease")
      .child(self.spinner())
      .child(
        Node::new("div")
          .class("veil-text")
          .child(Node::new("div").class("loading-text").text(message))
          .child(Node::new("div").class("loading-subtext").text("Please wait")),
      );
    if let Err(e) = self.host.append_to_body(veil) {
      warn!(err = %e, "feedback: failed to mount loading veil");
    }
  }

  fn update_veil(&self, message: &str) {
    let selector = format!("#{} .loading-text", constants().loading_overlay_id);
    if let Some(text) = self.host.query(&selector) {
      self.host.set_text(text, message);
    }
  }

  fn hide_veil(&self) {
    for veil in self.host.by_id(&constants().loading_overlay_id) {
      self.fade_and_remove(veil, Duration::ZERO);
    }
  }

  fn toast(&self, message: &str, kind: ToastKind) {
    debug!(kind = kind.label(), message, "feedback: toast");
    let toast = Node::new("div")
      .class(&format!("osd-episodes-toast toast-{}", kind.label()))
      .style("position", "fixed")
      .style("top", "20px")
      .style("right", "20px")
      .style("z-index", "9999999")
      .style("max-width", "300px")
      .style("background", kind.background())
      .style("transition", "all 0.3s ease")
      .text(message);
    match self.host.append_to_body(toast) {
      Ok(el) => self.fade_and_remove(el, Duration::from_millis(constants().toast_duration_ms)),
      Err(e) => warn!(err = %e, "feedback: failed to show toast"),
    }
  }

  fn alert(&self, message: &str) {
    self.host.alert(message);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sim::SimPage;

  fn setup() -> (Arc<SimPage>, DomFeedback) {
    let page = Arc::new(SimPage::new());
    let feedback = DomFeedback::new(page.clone());
    (page, feedback)
  }

  #[tokio::test(start_paused = true)]
  async fn veil_is_single_and_updates_text() {
    let (page, feedback) = setup();
    feedback.show_veil("Switching episode…");
    feedback.show_veil("Retrying episode switch (2/3)…");
    let veils = page.by_id(&constants().loading_overlay_id);
    assert_eq!(veils.len(), 1);
    let text = page.query("#episodeLoadingOverlay .loading-text").unwrap();
    assert_eq!(page.text_of(text).as_deref(), Some("Retrying episode switch (2/3)…"));
  }

  #[tokio::test(start_paused = true)]
  async fn veil_fades_then_detaches() {
    let (page, feedback) = setup();
    feedback.show_veil("Switching episode…");
    feedback.hide_veil();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let veil = page.by_id(&constants().loading_overlay_id)[0];
    assert_eq!(page.style(veil, "opacity").as_deref(), Some("0"));
    tokio::time::sleep(constants().fade()).await;
    assert!(page.by_id(&constants().loading_overlay_id).is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn veil_shown_during_fade_survives_it() {
    let (page, feedback) = setup();
    feedback.show_veil("Switching episode…");
    feedback.hide_veil();
    feedback.show_veil("Switching episode…");
    tokio::time::sleep(constants().fade() + Duration::from_millis(50)).await;
    let veils = page.by_id(&constants().loading_overlay_id);
    assert_eq!(veils.len(), 1);
    assert_ne!(page.style(veils[0], "opacity").as_deref(), Some("0"));
    let text = page.query("#episodeLoadingOverlay .loading-text").unwrap();
    assert_eq!(page.text_of(text).as_deref(), Some("Switching episode…"));
  }

  #[tokio::test(start_paused = true)]
  async fn veil_clones_host_spinner_when_present() {
    let (page, feedback) = setup();
    let body = page.body();
    page.add(body, Node::new("div").class("docspinner mdl-spinner").attr("data-origin", "host")).unwrap();
    feedback.show_veil("Switching episode…");
    let spinner = page.query("#episodeLoadingOverlay .mdl-spinner").unwrap();
    assert_eq!(page.attr_of(spinner, "data-origin").as_deref(), Some("host"));
    assert_eq!(page.style(spinner, "width").as_deref(), Some("60px"));
  }

  #[tokio::test(start_paused = true)]
  async fn veil_falls_back_to_built_spinner() {
    let (page, feedback) = setup();
    feedback.show_veil("Switching episode…");
    assert_eq!(page.query_all("#episodeLoadingOverlay .mdl-spinner__layer").len(), 4);
  }

  #[tokio::test(start_paused = true)]
  async fn toast_expires_after_duration_and_fade() {
    let (page, feedback) = setup();
    feedback.toast("Episode switched", ToastKind::Success);
    assert_eq!(page.query_all(".toast-success").len(), 1);
    tokio::time::sleep(Duration::from_millis(constants().toast_duration_ms + 10)).await;
    assert_eq!(page.query_all(".toast-success").len(), 1);
    tokio::time::sleep(constants().fade()).await;
    assert!(page.query_all(".toast-success").is_empty());
  }

  #[test]
  fn alert_reaches_host_dialog() {
    let (page, feedback) = setup();
    feedback.alert("Episode switch failed");
    assert_eq!(page.alerts(), vec!["Episode switch failed".to_string()]);
  }
}
