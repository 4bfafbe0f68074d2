//! Weather-station display firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod liveness;
pub mod pins;
pub mod radio;
pub mod scheduler;
pub mod sensors;
pub mod station;
pub mod stats;
pub mod units;
pub mod upload;
pub mod view;

// Adapters compile on every target; the platform-specific halves are
// guarded by cfg attributes inside.
pub mod adapters;
