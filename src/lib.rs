//! In-player episode navigation for a web media client.
//!
//! While an episode plays, an entry point is mounted next to the player's
//! settings button. It opens a season-tabbed panel of the series; picking
//! another episode navigates to its detail view, presses the host's own play
//! control and verifies the switch, retrying a bounded number of times.

pub mod agent;
pub mod changes;
pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod detector;
pub mod feedback;
pub mod host;
pub mod logging;
pub mod model;
pub mod observer;
pub mod panel;
pub mod resolver;
pub mod sim;
