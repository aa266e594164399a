//! Wires the observer, detector, panel and controller to one host page.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::changes::{Debounced, PageChange};
use crate::client::{LibraryClient, compare_versions, wait_until_ready};
use crate::constants::constants;
use crate::controller::{TransitionController, TransitionOutcome};
use crate::detector::Detector;
use crate::feedback::Feedback;
use crate::host::{Activator, HostPage, PlaybackManager};
use crate::model::ItemId;
use crate::observer::{CurrentItem, PlaybackObserver};
use crate::panel::{Panel, PanelEvent, PanelOutcome, PanelSpec};
use crate::resolver::{Resolution, resolve_context};

const NO_CURRENT_ITEM: &str = "Unable to get the current playback information.";
const LOAD_FAILED: &str = "Unable to load the episode list. Check your network connection and try again.";

/// User interaction routed from the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
  EntryPointClicked,
  Panel(PanelEvent),
}

pub struct Agent {
  host: Arc<dyn HostPage>,
  client: Arc<dyn LibraryClient>,
  observer: PlaybackObserver,
  detector: Detector,
  controller: TransitionController,
  feedback: Arc<dyn Feedback>,
  panel: Mutex<Option<Panel>>,
}

impl Agent {
  pub fn new(
    host: Arc<dyn HostPage>,
    client: Arc<dyn LibraryClient>,
    activator: Arc<dyn Activator>,
    feedback: Arc<dyn Feedback>,
  ) -> Self {
    let observer = PlaybackObserver::new(&constants().playback_info_endpoint);
    let detector = Detector::new(host.clone(), client.clone(), observer.current());
    let controller =
      TransitionController::new(host.clone(), client.clone(), activator, observer.current(), feedback.clone());
    Self { host, client, observer, detector, controller, feedback, panel: Mutex::new(None) }
  }

  pub fn with_playback_manager(mut self, playback: Arc<dyn PlaybackManager>) -> Self {
    self.controller = self.controller.with_playback_manager(playback);
    self
  }

  pub fn current(&self) -> CurrentItem {
    self.observer.current()
  }

  pub fn detector(&self) -> &Detector {
    &self.detector
  }

  pub fn controller(&self) -> &TransitionController {
    &self.controller
  }

  pub fn panel_open(&self) -> bool {
    self.panel.lock().unwrap_or_else(|e| e.into_inner()).as_ref().is_some_and(Panel::is_open)
  }

  /// Feed one completed host request to the playback observer.
  pub fn on_response(&self, url: &str, body: &str) -> Option<ItemId> {
    self.observer.observe(url, body)
  }

  /// Resolve the current series and mount the panel. Returns false when
  /// nothing was shown; the viewer has been told why.
  pub async fn open_panel(&self) -> bool {
    if self.panel_open() {
      debug!("agent: panel already open");
      return false;
    }
    let Some(current) = self.observer.current().get() else {
      warn!("agent: no current item to list episodes for");
      self.feedback.alert(NO_CURRENT_ITEM);
      return false;
    };
    let context = match resolve_context(self.client.as_ref(), &current).await {
      Ok(Resolution::Resolved(context)) => context,
      Ok(other) => {
        info!(item = %current, resolution = ?other, "agent: nothing to list");
        self.feedback.alert(other.user_message().unwrap_or(NO_CURRENT_ITEM));
        return false;
      }
      Err(e) => {
        error!(item = %current, err = %format!("{:#}", e), "agent: failed to resolve series");
        self.feedback.alert(LOAD_FAILED);
        return false;
      }
    };
    let spec = PanelSpec {
      id: constants().panel_id.clone(),
      title: context.title(),
      groups: context.groups(),
      current: Some(current),
    };
    let mut slot = self.panel.lock().unwrap_or_else(|e| e.into_inner());
    if slot.as_ref().is_some_and(Panel::is_open) {
      return false;
    }
    match Panel::open(self.host.clone(), spec) {
      Ok(Some(panel)) => {
        *slot = Some(panel);
        true
      }
      Ok(None) => false,
      Err(e) => {
        error!(err = %format!("{:#}", e), "agent: failed to open panel");
        false
      }
    }
  }

  /// Dispatch one interaction. Returns the transition outcome when the
  /// event started one.
  pub async fn handle(&self, event: UiEvent) -> Option<TransitionOutcome> {
    match event {
      UiEvent::EntryPointClicked => {
        self.open_panel().await;
        None
      }
      UiEvent::Panel(event) => {
        let outcome = {
          let mut slot = self.panel.lock().unwrap_or_else(|e| e.into_inner());
          let panel = slot.as_mut()?;
          let outcome = panel.handle(event);
          if !panel.is_open() {
            *slot = None;
          }
          outcome
        };
        match outcome {
          PanelOutcome::Play(target) => Some(self.controller.play(target).await),
          PanelOutcome::Stay | PanelOutcome::Closed => None,
        }
      }
    }
  }

  /// Wait for the host player, the data client and the first item id, then
  /// drive the detector and the interaction loop until both sources close.
  pub async fn run(
    self: Arc<Self>,
    mut changes: mpsc::UnboundedReceiver<PageChange>,
    events: mpsc::UnboundedReceiver<UiEvent>,
  ) {
    let c = constants();
    while !self.host.exists(&c.player_ready_selector) {
      if changes.recv().await.is_none() {
        debug!("agent: page closed before the player appeared");
        return;
      }
    }
    info!("agent: player present");
    wait_until_ready(self.client.as_ref(), Duration::from_millis(c.client_ready_poll_ms)).await;

    let version = self.client.app_version();
    if compare_versions(version.as_deref(), Some(&c.modern_client_version)) != Ordering::Less {
      let wait = Duration::from_millis(c.item_id_wait_interval_ms) * c.item_id_wait_limit;
      match self.observer.current().wait_for_first(wait).await {
        Some(id) => debug!(item = %id, "agent: first item observed"),
        None => warn!(?wait, "agent: no item observed yet, continuing"),
      }
    }

    tokio::time::sleep(Duration::from_millis(c.initial_evaluation_delay_ms)).await;
    let first = self.detector.evaluate().await;
    debug!(?first, "agent: initial evaluation");

    let debounced = Debounced::new(changes, c.mutation_debounce());
    tokio::join!(self.detector.run(debounced), self.dispatch(events));
    info!("agent: stopped");
  }

  async fn dispatch(&self, mut events: mpsc::UnboundedReceiver<UiEvent>) {
    while let Some(event) = events.recv().await {
      if let Some(outcome) = self.handle(event).await {
        debug!(?outcome, "agent: transition finished");
      }
    }
  }
}
