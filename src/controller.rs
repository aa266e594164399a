//! Episode transition state machine.
//!
//! One session per user selection: navigate to the target's detail view,
//! wait for the host's play control, activate it and verify that playback
//! moved to the target. Attempts are retried with a fixed backoff; the loading
//! veil stays up for the whole session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::client::{LibraryClient, wait_until_ready};
use crate::constants::constants;
use crate::feedback::{Feedback, ToastKind};
use crate::host::{Activator, ElementRef, HostPage, PlaybackManager};
use crate::model::ItemId;
use crate::observer::CurrentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Navigating,
  AwaitingPlayAffordance,
  Activating,
  VerifyingOutcome,
  Succeeded,
  Failed,
}

/// Why one attempt failed. Every variant is retried until attempts run out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
  #[error("server information unavailable, cannot build the detail route")]
  MissingServerId,
  #[error("no play control appeared on the detail view")]
  NoPlayControl,
  #[error("activating the play control failed: {0}")]
  ActivationFailed(String),
  #[error("the play control was activated but the episode did not switch")]
  NotSwitched,
}

impl TransitionError {
  /// Dialog headline. `attempts` is the number of attempts that ran.
  pub fn headline(&self, attempts: u32) -> String {
    match self {
      TransitionError::MissingServerId => "Cannot reach the server".to_string(),
      TransitionError::NoPlayControl if attempts > 1 => {
        format!("Play control still missing after several attempts ({} retries)", attempts - 1)
      }
      TransitionError::NoPlayControl => "Play control not found".to_string(),
      TransitionError::ActivationFailed(_) => "Could not press the play control".to_string(),
      TransitionError::NotSwitched => "Play control did not respond".to_string(),
    }
  }

  pub fn suggestion(&self) -> &'static str {
    match self {
      TransitionError::MissingServerId => "Check your network connection.",
      TransitionError::NoPlayControl => "The page may not have loaded correctly; refresh it and try again.",
      TransitionError::ActivationFailed(_) => "Check that the episode still exists, or try again later.",
      TransitionError::NotSwitched => "Try pressing the play button manually, or refresh the page.",
    }
  }

  /// Full text of the terminal failure dialog.
  pub fn dialog(&self, attempts: u32) -> String {
    let mut text = format!(
      "{}\n\nSuggestion: {}\n\nOther things to try:\n1. Refresh the page and try again\n2. Check your network connection\n3. Confirm you can access this episode",
      self.headline(attempts),
      self.suggestion()
    );
    if attempts > 1 {
      text.push_str(&format!("\n\nAttempts made: {}", attempts));
    }
    text
  }
}

/// How a successful switch was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
  /// The playing id matched the target.
  Confirmed,
  /// The id could not be confirmed but a playback surface was showing.
  Assumed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
  /// The target was already playing; nothing was navigated.
  AlreadyPlaying,
  Switched { attempts: u32, verification: Verification },
  Failed { error: TransitionError, attempts: u32 },
  /// Another session was in flight; this request touched nothing.
  Busy,
}

#[derive(Debug, Clone)]
pub struct Timings {
  pub max_attempts: u32,
  pub backoff: Duration,
  pub affordance_initial_delay: Duration,
  pub affordance_poll_limit: u32,
  pub affordance_poll_interval: Duration,
  pub verify_settle: Duration,
  pub success_linger: Duration,
  pub client_ready_poll: Duration,
}

impl Default for Timings {
  fn default() -> Self {
    let c = constants();
    Self {
      max_attempts: c.max_attempts.max(1),
      backoff: Duration::from_millis(c.attempt_backoff_ms),
      affordance_initial_delay: Duration::from_millis(c.affordance_initial_delay_ms),
      affordance_poll_limit: c.affordance_poll_limit,
      affordance_poll_interval: Duration::from_millis(c.affordance_poll_interval_ms),
      verify_settle: Duration::from_millis(c.verify_settle_ms),
      success_linger: Duration::from_millis(c.success_linger_ms),
      client_ready_poll: Duration::from_millis(c.client_ready_poll_ms),
    }
  }
}

#[derive(Debug)]
struct Session {
  target: ItemId,
  attempt: u32,
  last_error: Option<TransitionError>,
  resolved: bool,
}

impl Session {
  fn new(target: ItemId) -> Self {
    Self { target, attempt: 0, last_error: None, resolved: false }
  }

  fn resolve(&mut self) {
    debug_assert!(!self.resolved, "session resolved twice");
    self.resolved = true;
  }
}

/// Clears the in-flight flag when the session ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::SeqCst);
  }
}

/// Deep-link route to `item`'s detail view.
pub fn detail_route(item: &ItemId, server_id: &str) -> String {
  format!("#/details?id={}&context=home&serverId={}", item, server_id)
}

/// First visible and enabled control matching `selectors`, scanning them in
/// order.
pub fn find_play_control(host: &dyn HostPage, selectors: &[String]) -> Option<ElementRef> {
  selectors
    .iter()
    .find_map(|selector| host.query_all(selector).into_iter().find(|el| host.is_visible(*el) && host.is_enabled(*el)))
}

pub struct TransitionController {
  host: Arc<dyn HostPage>,
  client: Arc<dyn LibraryClient>,
  activator: Arc<dyn Activator>,
  playback: Option<Arc<dyn PlaybackManager>>,
  current: CurrentItem,
  feedback: Arc<dyn Feedback>,
  timings: Timings,
  in_flight: AtomicBool,
  phase: Mutex<Phase>,
}

impl TransitionController {
  pub fn new(
    host: Arc<dyn HostPage>,
    client: Arc<dyn LibraryClient>,
    activator: Arc<dyn Activator>,
    current: CurrentItem,
    feedback: Arc<dyn Feedback>,
  ) -> Self {
    Self {
      host,
      client,
      activator,
      playback: None,
      current,
      feedback,
      timings: Timings::default(),
      in_flight: AtomicBool::new(false),
      phase: Mutex::new(Phase::Idle),
    }
  }

  pub fn with_playback_manager(mut self, playback: Arc<dyn PlaybackManager>) -> Self {
    self.playback = Some(playback);
    self
  }

  pub fn with_timings(mut self, timings: Timings) -> Self {
    self.timings = timings;
    self
  }

  pub fn phase(&self) -> Phase {
    *self.phase.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn is_busy(&self) -> bool {
    self.in_flight.load(Ordering::SeqCst)
  }

  fn set_phase(&self, phase: Phase) {
    debug!(?phase, "controller: phase");
    *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
  }

  fn try_begin(&self) -> Option<InFlight<'_>> {
    let acquired = self.in_flight.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok();
    acquired.then(|| InFlight(&self.in_flight))
  }

  fn is_playing(&self, target: &ItemId) -> bool {
    self.current.get().as_ref() == Some(target)
      || self.playback.as_ref().and_then(|p| p.now_playing()).as_ref() == Some(target)
  }

  /// Switch playback to `target`.
  pub async fn play(&self, target: ItemId) -> TransitionOutcome {
    let Some(_ticket) = self.try_begin() else {
      warn!(item = %target, "controller: switch already in progress, ignoring request");
      return TransitionOutcome::Busy;
    };
    if self.is_playing(&target) {
      info!(item = %target, "controller: already playing");
      return TransitionOutcome::AlreadyPlaying;
    }

    let max = self.timings.max_attempts;
    let mut session = Session::new(target);
    info!(item = %session.target, "controller: switching episode");
    self.feedback.show_veil("Switching episode…");

    let mut verification = None;
    while session.attempt < max {
      session.attempt += 1;
      if session.attempt > 1 {
        self.feedback.update_veil(&format!("Retrying episode switch ({}/{})…", session.attempt, max));
      }
      match self.attempt(&session.target, session.attempt).await {
        Ok(v) => {
          verification = Some(v);
          break;
        }
        Err(e) => {
          warn!(attempt = session.attempt, err = %e, "controller: attempt failed");
          session.last_error = Some(e);
          if session.attempt < max {
            tokio::time::sleep(self.timings.backoff).await;
          }
        }
      }
    }
    session.resolve();

    let outcome = match (verification, session.last_error.take()) {
      (Some(verification), _) => {
        self.set_phase(Phase::Succeeded);
        info!(item = %session.target, attempts = session.attempt, ?verification, "controller: episode switched");
        tokio::time::sleep(self.timings.success_linger).await;
        self.feedback.hide_veil();
        self.feedback.toast("Episode switched", ToastKind::Success);
        TransitionOutcome::Switched { attempts: session.attempt, verification }
      }
      (None, error) => {
        let error = error.unwrap_or(TransitionError::NotSwitched);
        self.set_phase(Phase::Failed);
        error!(item = %session.target, attempts = session.attempt, err = %error, "controller: episode switch failed");
        self.feedback.hide_veil();
        self.feedback.alert(&error.dialog(session.attempt));
        self.feedback.toast(&format!("Episode switch failed: {}", error.headline(session.attempt)), ToastKind::Error);
        TransitionOutcome::Failed { error, attempts: session.attempt }
      }
    };
    self.set_phase(Phase::Idle);
    outcome
  }

  async fn attempt(&self, target: &ItemId, attempt: u32) -> Result<Verification, TransitionError> {
    wait_until_ready(self.client.as_ref(), self.timings.client_ready_poll).await;
    if attempt > 1 && self.is_playing(target) {
      return Ok(Verification::Confirmed);
    }

    self.set_phase(Phase::Navigating);
    let server_id = self.client.server_id().filter(|s| !s.is_empty()).ok_or(TransitionError::MissingServerId)?;
    let saved_route = self.host.route();
    let saved_title = self.host.title();
    for overlay in self.host.by_id(&constants().interfering_overlay_id) {
      self.host.remove(overlay);
      debug!("controller: removed interfering overlay");
    }
    let main = self.main_content();
    let original_display = main.and_then(|m| self.host.style(m, "display"));
    let restore_main = || {
      if let Some(m) = main {
        self.host.set_style(m, "display", original_display.as_deref());
      }
    };
    if let Some(m) = main {
      self.host.set_style(m, "display", Some("none"));
    }
    let route = detail_route(target, &server_id);
    debug!(attempt, route = %route, "controller: navigating");
    self.host.set_route(&route);

    self.set_phase(Phase::AwaitingPlayAffordance);
    let Some(control) = self.await_play_control().await else {
      restore_main();
      self.host.set_route(&saved_route);
      self.host.set_title(&saved_title);
      return Err(TransitionError::NoPlayControl);
    };

    self.set_phase(Phase::Activating);
    if self.host.route().contains("details") {
      restore_main();
    }
    self.activator.activate(control).map_err(|e| TransitionError::ActivationFailed(format!("{:#}", e)))?;

    self.set_phase(Phase::VerifyingOutcome);
    tokio::time::sleep(self.timings.verify_settle).await;
    self.verify(target)
  }

  fn main_content(&self) -> Option<ElementRef> {
    constants().main_content_selectors.iter().find_map(|s| self.host.query(s))
  }

  async fn await_play_control(&self) -> Option<ElementRef> {
    tokio::time::sleep(self.timings.affordance_initial_delay).await;
    let selectors = &constants().play_affordance_selectors;
    for probe in 0..=self.timings.affordance_poll_limit {
      if let Some(control) = find_play_control(self.host.as_ref(), selectors) {
        debug!(probe, "controller: play control found");
        return Some(control);
      }
      if probe < self.timings.affordance_poll_limit {
        tokio::time::sleep(self.timings.affordance_poll_interval).await;
      }
    }
    None
  }

  fn verify(&self, target: &ItemId) -> Result<Verification, TransitionError> {
    let playing = self.playback.as_ref().and_then(|p| p.now_playing()).or_else(|| self.current.get());
    if playing.as_ref() == Some(target) {
      return Ok(Verification::Confirmed);
    }
    if self.host.route().contains("video") || self.host.exists(&constants().media_selector) {
      warn!(item = %target, playing = ?playing, "controller: playing id unconfirmed, assuming switch from playback surface");
      return Ok(Verification::Assumed);
    }
    Err(TransitionError::NotSwitched)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::observer::PlaybackObserver;
  use crate::sim::{FeedbackEvent, RecordingActivator, RecordingFeedback, SimPage, SimPlayback, StaticLibrary, spawn_detail_view};
  use tokio::time::Instant;

  const RENDER_DELAY: Duration = Duration::from_millis(300);

  struct Fixture {
    page: Arc<SimPage>,
    observer: Arc<PlaybackObserver>,
    feedback: Arc<RecordingFeedback>,
    activator: Arc<RecordingActivator>,
    controller: Arc<TransitionController>,
  }

  fn info_body(id: &str) -> String {
    format!(r#"{{"MediaSources":[{{"Id":"{}"}}]}}"#, id)
  }

  /// Page without a media element, so the lenient check cannot pass.
  fn detail_only_page() -> Arc<SimPage> {
    let page = Arc::new(SimPage::new());
    page.add(page.body(), crate::host::Node::new("div").class("mainAnimatedPage")).unwrap();
    page
  }

  fn fixture(
    page: Arc<SimPage>,
    library: StaticLibrary,
    activator: impl FnOnce(&Arc<PlaybackObserver>) -> RecordingActivator,
  ) -> Fixture {
    let observer = Arc::new(PlaybackObserver::new("PlaybackInfo"));
    let feedback = Arc::new(RecordingFeedback::default());
    let activator = Arc::new(activator(&observer));
    let controller = Arc::new(TransitionController::new(
      page.clone(),
      Arc::new(library),
      activator.clone(),
      observer.current(),
      feedback.clone(),
    ));
    Fixture { page, observer, feedback, activator, controller }
  }

  /// Activation publishes `id` through the observer, as the host's request would.
  fn switching_to(id: &'static str) -> impl FnOnce(&Arc<PlaybackObserver>) -> RecordingActivator {
    move |observer| {
      let observer = observer.clone();
      RecordingActivator::with_hook(move |_| {
        observer.observe(&format!("/Items/{}/PlaybackInfo", id), &info_body(id));
        Ok(())
      })
    }
  }

  fn recording(_: &Arc<PlaybackObserver>) -> RecordingActivator {
    RecordingActivator::new()
  }

  #[test]
  fn route_and_dialog_text() {
    assert_eq!(detail_route(&ItemId::new("ep6"), "sid"), "#/details?id=ep6&context=home&serverId=sid");
    let dialog = TransitionError::NoPlayControl.dialog(3);
    assert!(dialog.starts_with("Play control still missing after several attempts (2 retries)"));
    assert!(dialog.contains("Attempts made: 3"));
    assert!(!TransitionError::MissingServerId.dialog(1).contains("Attempts made"));
  }

  #[test]
  fn play_control_prefers_specific_visible_enabled() {
    let page = SimPage::new();
    let body = page.body();
    let generic = page.add(body, crate::host::Node::new("button").class("btnPlay")).unwrap();
    let resume = page
      .add(body, crate::host::Node::new("button").class("btnPlay").attr("data-action", "resume"))
      .unwrap();
    let selectors = &constants().play_affordance_selectors;
    assert_eq!(find_play_control(&page, selectors), Some(resume));
    page.set_disabled(resume, true);
    assert_eq!(find_play_control(&page, selectors), Some(generic));
    page.set_hidden(generic, true);
    assert_eq!(find_play_control(&page, selectors), None);
  }

  #[tokio::test(start_paused = true)]
  async fn already_playing_skips_navigation() {
    let f = fixture(detail_only_page(), StaticLibrary::demo(), recording);
    f.observer.observe("/Items/ep5/PlaybackInfo", &info_body("ep5"));
    assert_eq!(f.controller.play(ItemId::new("ep5")).await, TransitionOutcome::AlreadyPlaying);
    assert!(f.page.route_log().is_empty());
    assert!(f.feedback.events().is_empty());
    assert!(f.activator.calls().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn switches_from_ep5_to_ep6() {
    let page = Arc::new(SimPage::new());
    let surface = page.with_playback_surface().unwrap();
    let f = fixture(page, StaticLibrary::demo(), switching_to("ep6"));
    f.observer.observe("/Items/ep5/PlaybackInfo", &info_body("ep5"));
    let _view = spawn_detail_view(f.page.clone(), RENDER_DELAY);

    let outcome = f.controller.play(ItemId::new("ep6")).await;
    assert_eq!(outcome, TransitionOutcome::Switched { attempts: 1, verification: Verification::Confirmed });
    let routes: Vec<_> = f.page.route_log().into_iter().map(|(_, r)| r).collect();
    assert_eq!(routes, vec!["#/details?id=ep6&context=home&serverId=sim-server".to_string()]);
    assert_eq!(f.activator.calls().len(), 1);
    assert_eq!(f.page.style(surface.main, "display"), None);
    assert_eq!(f.observer.current().get(), Some(ItemId::new("ep6")));
    let events = f.feedback.events();
    assert_eq!(events.first(), Some(&FeedbackEvent::ShowVeil("Switching episode…".to_string())));
    assert!(events.contains(&FeedbackEvent::Toast("Episode switched".to_string(), ToastKind::Success)));
    assert!(!f.feedback.veil_visible());
    assert_eq!(f.controller.phase(), Phase::Idle);
  }

  #[tokio::test(start_paused = true)]
  async fn missing_play_control_exhausts_attempts() {
    let page = detail_only_page();
    let main = page.query(".mainAnimatedPage").unwrap();
    page.set_title("Playing ep5");
    let f = fixture(page, StaticLibrary::demo(), recording);
    let started = Instant::now();

    let outcome = f.controller.play(ItemId::new("ep6")).await;
    assert_eq!(outcome, TransitionOutcome::Failed { error: TransitionError::NoPlayControl, attempts: 3 });

    // 1s initial delay plus 35 polls at 200ms per attempt, 1s backoff between attempts.
    let log = f.page.route_log();
    let offsets: Vec<_> = log.iter().map(|(at, r)| (at.duration_since(started).as_millis(), r.as_str())).collect();
    let detail = "#/details?id=ep6&context=home&serverId=sim-server";
    assert_eq!(
      offsets,
      vec![
        (0, detail),
        (8000, "#/home"),
        (9000, detail),
        (17000, "#/home"),
        (18000, detail),
        (26000, "#/home"),
      ]
    );
    assert_eq!(f.page.route(), "#/home");
    assert_eq!(f.page.title(), "Playing ep5");
    assert_eq!(f.page.style(main, "display"), None);
    assert!(f.activator.calls().is_empty());
    assert!(!f.feedback.veil_visible());
    let events = f.feedback.events();
    assert!(events.contains(&FeedbackEvent::UpdateVeil("Retrying episode switch (2/3)…".to_string())));
    assert!(events.contains(&FeedbackEvent::UpdateVeil("Retrying episode switch (3/3)…".to_string())));
    assert!(matches!(events.iter().rev().nth(1), Some(FeedbackEvent::Alert(text)) if text.contains("Attempts made: 3")));
    assert!(matches!(events.last(), Some(FeedbackEvent::Toast(_, ToastKind::Error))));
  }

  #[tokio::test(start_paused = true)]
  async fn custom_timings_bound_a_single_attempt() {
    let page = detail_only_page();
    let observer = Arc::new(PlaybackObserver::new("PlaybackInfo"));
    let feedback = Arc::new(RecordingFeedback::default());
    let timings = Timings {
      max_attempts: 1,
      affordance_initial_delay: Duration::from_millis(100),
      affordance_poll_limit: 5,
      affordance_poll_interval: Duration::from_millis(50),
      ..Timings::default()
    };
    let controller = TransitionController::new(
      page.clone(),
      Arc::new(StaticLibrary::demo()),
      Arc::new(RecordingActivator::new()),
      observer.current(),
      feedback.clone(),
    )
    .with_timings(timings);
    let started = Instant::now();

    let outcome = controller.play(ItemId::new("ep6")).await;
    assert_eq!(outcome, TransitionOutcome::Failed { error: TransitionError::NoPlayControl, attempts: 1 });
    let offsets: Vec<_> = page.route_log().iter().map(|(at, _)| at.duration_since(started).as_millis()).collect();
    assert_eq!(offsets, vec![0, 350]);
    assert!(!feedback.events().iter().any(|e| matches!(e, FeedbackEvent::UpdateVeil(_))));
  }

  #[tokio::test(start_paused = true)]
  async fn missing_server_id_fails_every_attempt() {
    let f = fixture(detail_only_page(), StaticLibrary::demo().without_server_id(), recording);
    let outcome = f.controller.play(ItemId::new("ep6")).await;
    assert_eq!(outcome, TransitionOutcome::Failed { error: TransitionError::MissingServerId, attempts: 3 });
    assert!(f.page.route_log().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn activation_error_is_retried() {
    let mut first = true;
    let activator = RecordingActivator::with_hook(move |_| {
      if std::mem::take(&mut first) { Err(anyhow::anyhow!("control detached")) } else { Ok(()) }
    });
    let page = Arc::new(SimPage::new());
    page.with_playback_surface().unwrap();
    let f = fixture(page, StaticLibrary::demo(), move |_| activator);
    let _view = spawn_detail_view(f.page.clone(), RENDER_DELAY);

    let outcome = f.controller.play(ItemId::new("ep6")).await;
    // The playing id never changes, but the player is still on the page.
    assert_eq!(outcome, TransitionOutcome::Switched { attempts: 2, verification: Verification::Assumed });
    assert_eq!(f.activator.calls().len(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn unconfirmed_switch_without_player_fails() {
    let f = fixture(detail_only_page(), StaticLibrary::demo(), recording);
    let _view = spawn_detail_view(f.page.clone(), RENDER_DELAY);
    let outcome = f.controller.play(ItemId::new("ep6")).await;
    assert_eq!(outcome, TransitionOutcome::Failed { error: TransitionError::NotSwitched, attempts: 3 });
    assert_eq!(f.activator.calls().len(), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn playback_manager_is_preferred_for_verification() {
    let page = detail_only_page();
    let observer = Arc::new(PlaybackObserver::new("PlaybackInfo"));
    let playback = Arc::new(SimPlayback::default());
    let hook_playback = playback.clone();
    let activator = Arc::new(RecordingActivator::with_hook(move |_| {
      hook_playback.set(Some(ItemId::new("ep6")));
      Ok(())
    }));
    let feedback = Arc::new(RecordingFeedback::default());
    let controller =
      TransitionController::new(page.clone(), Arc::new(StaticLibrary::demo()), activator, observer.current(), feedback)
        .with_playback_manager(playback);
    let _view = spawn_detail_view(page.clone(), RENDER_DELAY);
    let outcome = controller.play(ItemId::new("ep6")).await;
    assert_eq!(outcome, TransitionOutcome::Switched { attempts: 1, verification: Verification::Confirmed });
  }

  #[tokio::test(start_paused = true)]
  async fn interfering_overlay_is_removed_before_navigation() {
    let page = detail_only_page();
    page.add(page.body(), crate::host::Node::new("div").id("danmakuCtr")).unwrap();
    let f = fixture(page, StaticLibrary::demo(), recording);
    let _view = spawn_detail_view(f.page.clone(), RENDER_DELAY);
    f.controller.play(ItemId::new("ep6")).await;
    assert!(f.page.by_id("danmakuCtr").is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn overlapping_request_is_rejected() {
    let f = fixture(detail_only_page(), StaticLibrary::demo(), recording);
    let first = {
      let controller = f.controller.clone();
      tokio::spawn(async move { controller.play(ItemId::new("ep6")).await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(f.controller.is_busy());
    assert_eq!(f.controller.phase(), Phase::AwaitingPlayAffordance);
    let routes_before = f.page.route_log().len();
    assert_eq!(f.controller.play(ItemId::new("ep7")).await, TransitionOutcome::Busy);
    assert_eq!(f.page.route_log().len(), routes_before);
    assert!(matches!(first.await.unwrap(), TransitionOutcome::Failed { .. }));
    assert!(!f.controller.is_busy());
  }
}
