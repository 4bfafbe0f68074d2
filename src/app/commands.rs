//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (touch input,
//! serial console, shutdown hook) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::units::UnitSystem;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Flip the dashboard between metric and imperial.
    ToggleUnits,

    /// Show the dashboard in a specific unit system.
    SetUnits(UnitSystem),

    /// Persist the six frozen history days immediately.
    FlushHistory,
}
