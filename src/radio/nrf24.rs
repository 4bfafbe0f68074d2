//! nRF24L01+ receive-side driver.
//!
//! Configures the transceiver as a primary receiver on pipe 1 with
//! auto-ack, dynamic payload lengths and ack payloads, 250 kbps, high PA
//! level.  Written against the `embedded_hal` 1.0 [`SpiDevice`] and
//! [`OutputPin`] traits so the register traffic can be exercised on the
//! host.
//!
//! The IRQ line is not used: [`Nrf24::receive`] polls `FIFO_STATUS`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::app::ports::RadioError;
use crate::radio::codec::{KeepAlive, MAX_FRAME_LEN};
use crate::radio::inbox::RawFrame;

// ── Commands ──────────────────────────────────────────────────

const R_REGISTER: u8 = 0x00;
const W_REGISTER: u8 = 0x20;
const R_RX_PAYLOAD: u8 = 0x61;
const R_RX_PL_WID: u8 = 0x60;
const W_ACK_PAYLOAD: u8 = 0xA8;
const FLUSH_TX: u8 = 0xE1;
const FLUSH_RX: u8 = 0xE2;

// ── Registers ─────────────────────────────────────────────────

pub const REG_CONFIG: u8 = 0x00;
pub const REG_EN_AA: u8 = 0x01;
pub const REG_EN_RXADDR: u8 = 0x02;
pub const REG_SETUP_AW: u8 = 0x03;
pub const REG_SETUP_RETR: u8 = 0x04;
pub const REG_RF_CH: u8 = 0x05;
pub const REG_RF_SETUP: u8 = 0x06;
pub const REG_STATUS: u8 = 0x07;
pub const REG_RX_ADDR_P1: u8 = 0x0B;
pub const REG_FIFO_STATUS: u8 = 0x17;
pub const REG_DYNPD: u8 = 0x1C;
pub const REG_FEATURE: u8 = 0x1D;

/// EN_CRC | CRCO | PWR_UP | PRIM_RX.
const CONFIG_RX: u8 = 0x0F;
/// RF_DR_LOW (250 kbps) | RF_PWR = high.
const RF_SETUP_250K_HIGH: u8 = 0x24;
/// EN_DPL | EN_ACK_PAY.
const FEATURE_DPL_ACK: u8 = 0x06;
/// RX_DR | TX_DS | MAX_RT, write-1-to-clear.
const STATUS_CLEAR: u8 = 0x70;
const FIFO_RX_EMPTY: u8 = 0x01;

/// Channel shared with the outdoor sender.
pub const RF_CHANNEL: u8 = 76;
/// The pipe the outdoor unit transmits to.
pub const READ_PIPE: u8 = 1;

/// Receive-only nRF24L01+ on a shared SPI bus.
pub struct Nrf24<SPI, CE> {
    spi: SPI,
    ce: CE,
}

impl<SPI: SpiDevice, CE: OutputPin> Nrf24<SPI, CE> {
    pub fn new(spi: SPI, ce: CE) -> Self {
        Self { spi, ce }
    }

    /// Program the link parameters, open pipe 1 at `address` (5 bytes,
    /// least significant first on the wire) and start listening.
    pub fn start_listening(&mut self, address: u64) -> Result<(), RadioError> {
        self.ce.set_low().map_err(|_| RadioError::Bus)?;

        self.write_register(REG_SETUP_AW, 0x03)?;
        self.write_register(REG_SETUP_RETR, 0x5F)?;
        self.write_register(REG_RF_CH, RF_CHANNEL)?;
        self.write_register(REG_RF_SETUP, RF_SETUP_250K_HIGH)?;
        self.write_register(REG_EN_AA, 0x3F)?;
        self.write_register(REG_EN_RXADDR, 1 << READ_PIPE)?;
        self.write_registers(REG_RX_ADDR_P1, &address.to_le_bytes()[..5])?;
        self.write_register(REG_FEATURE, FEATURE_DPL_ACK)?;
        self.write_register(REG_DYNPD, 0x3F)?;
        self.write_register(REG_STATUS, STATUS_CLEAR)?;
        self.command(FLUSH_RX)?;
        self.command(FLUSH_TX)?;
        self.write_register(REG_CONFIG, CONFIG_RX)?;

        // Sanity check: a floating bus reads back 0x00 or 0xFF.
        if self.read_register(REG_RF_CH)? != RF_CHANNEL {
            return Err(RadioError::Bus);
        }

        self.ce.set_high().map_err(|_| RadioError::Bus)
    }

    /// Pop one payload from the RX FIFO, if any.
    ///
    /// A reported width above 32 bytes means a corrupt packet; the FIFO is
    /// flushed and nothing is returned.
    pub fn receive(&mut self) -> Result<Option<RawFrame>, RadioError> {
        if self.read_register(REG_FIFO_STATUS)? & FIFO_RX_EMPTY != 0 {
            return Ok(None);
        }

        let mut width = [0u8; 1];
        self.read(R_RX_PL_WID, &mut width)?;
        let width = usize::from(width[0]);
        if width > MAX_FRAME_LEN {
            self.command(FLUSH_RX)?;
            self.write_register(REG_STATUS, STATUS_CLEAR)?;
            return Ok(None);
        }

        let mut buf = [0u8; MAX_FRAME_LEN];
        self.read(R_RX_PAYLOAD, &mut buf[..width])?;
        self.write_register(REG_STATUS, STATUS_CLEAR)?;

        let mut frame = RawFrame::new();
        // Cannot fail: width <= capacity.
        let _ = frame.extend_from_slice(&buf[..width]);
        Ok(Some(frame))
    }

    /// Replace any pending ack payload on pipe 1 with `payload`.
    pub fn load_ack(&mut self, payload: &KeepAlive) -> Result<(), RadioError> {
        self.command(FLUSH_TX)?;
        self.spi
            .transaction(&mut [
                Operation::Write(&[W_ACK_PAYLOAD | READ_PIPE]),
                Operation::Write(payload.as_bytes()),
            ])
            .map_err(|_| RadioError::Bus)
    }

    pub fn read_register(&mut self, reg: u8) -> Result<u8, RadioError> {
        let mut value = [0u8; 1];
        self.read(R_REGISTER | reg, &mut value)?;
        Ok(value[0])
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), RadioError> {
        self.write_registers(reg, &[value])
    }

    fn write_registers(&mut self, reg: u8, values: &[u8]) -> Result<(), RadioError> {
        self.spi
            .transaction(&mut [Operation::Write(&[W_REGISTER | reg]), Operation::Write(values)])
            .map_err(|_| RadioError::Bus)
    }

    fn read(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), RadioError> {
        self.spi
            .transaction(&mut [Operation::Write(&[cmd]), Operation::Read(buf)])
            .map_err(|_| RadioError::Bus)
    }

    fn command(&mut self, cmd: u8) -> Result<(), RadioError> {
        self.spi.write(&[cmd]).map_err(|_| RadioError::Bus)
    }
}
