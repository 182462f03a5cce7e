//! District air-quality monitor.
//!
//! Polls per-district PM2.5 and temperature fields from a ThingSpeak-style
//! telemetry API, classifies each reading into a display category and keeps
//! a board of per-district display targets up to date.

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod districts;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod poller;
pub mod refresh;
pub mod verify;
pub mod widgets;
