//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the station display:
//! frame routing, rollover housekeeping, upload throttling, and the
//! lifecycle around them.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
