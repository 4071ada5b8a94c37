//! Terminal shipment tracker.
//!
//! A single tracking widget takes a tracking ID, posts it to the tracking
//! service and renders the latest status and event. The same widget backs
//! the interactive TUI and the one-shot `--once` lookup.

pub mod app;
pub mod config;
pub mod logging;
pub mod tracking;
pub mod ui;
