//! Radio link: payload decoding, the frame mailbox and the transceiver
//! driver that feeds it.

pub mod codec;
pub mod inbox;
pub mod nrf24;

pub use codec::{Field, Frame, FrameKind, Reading, StatusReading};
pub use inbox::RadioInbox;
