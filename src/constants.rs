//! Tunables loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so the in-page agent never
//! touches the filesystem. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// Selector lists, element ids, poll intervals and retry counts.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Host DOM contract
  pub settings_anchor_selector: String,
  pub osd_container_selector: String,
  pub media_selector: String,
  pub player_ready_selector: String,
  pub spinner_selector: String,
  pub main_content_selectors: Vec<String>,
  /// Most specific first; the first visible and enabled match wins.
  pub play_affordance_selectors: Vec<String>,
  pub interfering_overlay_id: String,

  // Injected element ids
  pub entry_point_container_id: String,
  pub entry_point_button_id: String,
  pub panel_id: String,
  pub loading_overlay_id: String,

  // Observation tap
  pub playback_info_endpoint: String,
  pub modern_client_version: String,
  pub item_id_wait_limit: u32,
  pub item_id_wait_interval_ms: u64,
  pub client_ready_poll_ms: u64,

  // Detector cadence
  pub check_interval_ms: u64,
  pub mutation_debounce_ms: u64,
  pub initial_evaluation_delay_ms: u64,

  // Transition controller
  pub max_attempts: u32,
  pub attempt_backoff_ms: u64,
  pub affordance_initial_delay_ms: u64,
  pub affordance_poll_limit: u32,
  pub affordance_poll_interval_ms: u64,
  pub verify_settle_ms: u64,
  pub success_linger_ms: u64,

  // Feedback and panel
  pub toast_duration_ms: u64,
  pub fade_ms: u64,
  pub outside_click_arm_ms: u64,
  pub panel_title_width: usize,
}

impl Constants {
  pub fn check_interval(&self) -> Duration {
    Duration::from_millis(self.check_interval_ms)
  }

  pub fn mutation_debounce(&self) -> Duration {
    Duration::from_millis(self.mutation_debounce_ms)
  }

  pub fn fade(&self) -> Duration {
    Duration::from_millis(self.fade_ms)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed every test fails on first access.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
