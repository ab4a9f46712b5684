//! Device-side pin bundle.
//!
//! One [`DevicePins`] value is what the controller drives towards the SDRAM for a single tick:
//! the decoded command, bank select, multiplexed address, the tri-stated DQ bus and DQM.

use super::command::{Command, ControlLines};
use crate::common::constants::{A10, BYTE_LANE_MASK};

/// Controller-driven device signals for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DevicePins {
    /// Command selected on RAS#/CAS#/WE#.
    pub command: Command,
    /// Bank select (BA).
    pub bank: u8,
    /// Multiplexed row/column address (A).
    pub addr: u16,
    /// Controller drive on DQ. `None` means the output enable is low (high impedance).
    pub dq: Option<u16>,
    /// Data mask, one bit per byte lane. A set bit masks that lane.
    pub dqm: u8,
}

impl DevicePins {
    /// A NOP with the DQ bus released and no lanes masked.
    pub const fn nop() -> Self {
        Self {
            command: Command::Nop,
            bank: 0,
            addr: 0,
            dq: None,
            dqm: 0,
        }
    }

    /// ACTIVATE `row` in `bank`.
    pub const fn activate(bank: u8, row: u16) -> Self {
        Self {
            command: Command::Activate,
            bank,
            addr: row,
            ..Self::nop()
        }
    }

    /// READ `column` of the open row in `bank`.
    pub const fn read(bank: u8, column: u16) -> Self {
        Self {
            command: Command::Read,
            bank,
            addr: column & !A10,
            ..Self::nop()
        }
    }

    /// WRITE `data` to `column` of the open row in `bank`, honoring `byte_enable`.
    ///
    /// DQM is the inverse of the byte enable: a lane the client did not enable is masked.
    pub const fn write(bank: u8, column: u16, data: u16, byte_enable: u8) -> Self {
        Self {
            command: Command::Write,
            bank,
            addr: column & !A10,
            dq: Some(data),
            dqm: !byte_enable & BYTE_LANE_MASK,
        }
    }

    /// PRECHARGE of a single bank.
    pub const fn precharge(bank: u8) -> Self {
        Self {
            command: Command::Precharge,
            bank,
            ..Self::nop()
        }
    }

    /// PRECHARGE of every bank (A10 high).
    pub const fn precharge_all() -> Self {
        Self {
            command: Command::Precharge,
            addr: A10,
            ..Self::nop()
        }
    }

    /// AUTO REFRESH.
    pub const fn auto_refresh() -> Self {
        Self {
            command: Command::AutoRefresh,
            ..Self::nop()
        }
    }

    /// MODE SET with the given register word on the address pins.
    pub const fn mode_set(word: u16) -> Self {
        Self {
            command: Command::ModeSet,
            addr: word,
            ..Self::nop()
        }
    }

    /// RAS#/CAS#/WE# levels for this tick.
    pub const fn control_lines(&self) -> ControlLines {
        self.command.encode()
    }

    /// Returns `true` for a PRECHARGE that closes every bank.
    pub const fn is_precharge_all(&self) -> bool {
        matches!(self.command, Command::Precharge) && self.addr & A10 != 0
    }
}

impl Default for DevicePins {
    fn default() -> Self {
        Self::nop()
    }
}
