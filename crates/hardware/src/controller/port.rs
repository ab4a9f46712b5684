//! Client-facing port signals.
//!
//! [`ClientPort`] is what the client drives into the controller for one tick, [`ClientResponse`]
//! what it gets back. [`TickOutput`] bundles the response with the device pins and any refresh
//! deadline report for that tick.

use crate::common::constants::BYTE_ENABLE_ALL;
use crate::common::{DeadlineRisk, Tick, WordAddr};
use crate::sdram::DevicePins;

/// Client request signals for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientPort {
    /// Submit a read.
    pub read: bool,
    /// Submit a write, or present the next beat of an accepted write burst.
    pub write: bool,
    /// Word address.
    pub address: WordAddr,
    /// Word to write.
    pub writedata: u16,
    /// Per-byte write enable.
    pub byteenable: u8,
    /// Words in the transaction.
    pub burstcount: u16,
}

impl ClientPort {
    /// No request.
    pub const fn idle() -> Self {
        Self {
            read: false,
            write: false,
            address: WordAddr(0),
            writedata: 0,
            byteenable: BYTE_ENABLE_ALL,
            burstcount: 1,
        }
    }

    /// Single-word read of `address`.
    pub const fn read(address: WordAddr) -> Self {
        Self {
            read: true,
            address,
            ..Self::idle()
        }
    }

    /// Single-word write of `data` to `address` with both byte lanes enabled.
    pub const fn write(address: WordAddr, data: u16) -> Self {
        Self {
            write: true,
            address,
            writedata: data,
            ..Self::idle()
        }
    }

    /// A write beat carrying only data; address and burst count are ignored for beats.
    pub const fn beat(data: u16) -> Self {
        Self::write(WordAddr(0), data)
    }

    /// Replaces the byte enable.
    #[must_use]
    pub const fn with_byteenable(mut self, byteenable: u8) -> Self {
        self.byteenable = byteenable;
        self
    }

    /// Replaces the burst count.
    #[must_use]
    pub const fn with_burstcount(mut self, burstcount: u16) -> Self {
        self.burstcount = burstcount;
        self
    }

    /// Returns `true` when `read` or `write` is asserted.
    pub const fn is_request(&self) -> bool {
        self.read || self.write
    }
}

impl Default for ClientPort {
    fn default() -> Self {
        Self::idle()
    }
}

/// Controller outputs towards the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientResponse {
    /// A new request cannot be accepted this tick.
    pub waitrequest: bool,
    /// Returned word; meaningful only while `readdatavalid`.
    pub readdata: u16,
    /// `readdata` carries a read result this tick.
    pub readdatavalid: bool,
}

/// Everything the controller produced in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutput {
    /// Tick this output belongs to.
    pub tick: Tick,
    /// Pins driven towards the device.
    pub pins: DevicePins,
    /// Response towards the client.
    pub client: ClientResponse,
    /// The client's request (or write beat) was taken this tick.
    pub accepted: bool,
    /// Set on the tick a late refresh crosses the configured slack.
    pub deadline_risk: Option<DeadlineRisk>,
}
