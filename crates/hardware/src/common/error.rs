//! Controller error taxonomy.
//!
//! This module defines every way a tick can fail. It provides:
//! 1. **Protocol Violations:** Client-side contract breaches (caller bugs).
//! 2. **Timing Violations:** Device command preconditions broken by the controller itself.
//! 3. **Pipeline Errors:** Misuse of the write-data FIFO.
//! 4. **Deadline Risk:** A reported, non-fatal condition for late refreshes.
//!
//! None of these are retried. Every accepted transaction completes deterministically, so any
//! error returned here is a fatal contract breach that the caller or test harness must surface.

use std::fmt;

use thiserror::Error;

use super::data::Tick;
use crate::sdram::command::Command;

/// A client broke the memory-mapped port contract.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// `read` and `write` were asserted in the same tick.
    #[error("read and write asserted in the same tick")]
    ReadAndWrite,

    /// The requested burst count is outside what the active profile supports.
    #[error("burst count {count} not supported (profile allows 1..={max})")]
    UnsupportedBurst {
        /// Requested number of words.
        count: u16,
        /// Largest burst the profile accepts.
        max: u16,
    },

    /// The burst would run past the last column of the row.
    #[error("burst of {count} words from column {column:#x} crosses the end of the row")]
    BurstCrossesRow {
        /// Starting column.
        column: u16,
        /// Requested number of words.
        count: u16,
    },

    /// The word address has bits set above the device geometry.
    #[error("address {address:#x} does not fit in {width} bits")]
    AddressOutOfRange {
        /// Raw client address.
        address: u32,
        /// Client address width for the geometry.
        width: u32,
    },

    /// The byte-enable selects lanes the data bus does not have.
    #[error("byte enable {0:#04b} selects lanes the bus does not have")]
    InvalidByteEnable(u8),

    /// `read` was asserted while beats of an accepted write burst were still owed.
    #[error("read asserted while write burst data is still owed")]
    ReadDuringWriteBurst,
}

/// A device command was about to break a datasheet precondition.
///
/// The sequencer's own timers make these unreachable; they exist so a broken invariant is
/// reported instead of silently corrupting the simulated array.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TimingViolation {
    /// A command other than NOP was issued before the power-on delay elapsed.
    #[error("{command:?} issued at tick {now} during the power-on delay (ends at tick {ready_at})")]
    BeforePowerOn {
        /// Offending command.
        command: Command,
        /// Tick the command was issued.
        now: Tick,
        /// First tick after the power-on delay.
        ready_at: Tick,
    },

    /// A bank command was issued before the MODE SET that ends initialization.
    #[error("{command:?} issued before device initialization completed")]
    NotInitialized {
        /// Offending command.
        command: Command,
    },

    /// ACTIVATE targeted a bank that still has an open row.
    #[error("ACTIVATE to bank {bank} which already has row {row:#x} open")]
    BankAlreadyActive {
        /// Target bank.
        bank: u8,
        /// Row currently open in that bank.
        row: u16,
    },

    /// A column command targeted a bank with no open row.
    #[error("{command:?} to bank {bank} which has no open row")]
    BankNotActive {
        /// Offending command.
        command: Command,
        /// Target bank.
        bank: u8,
    },

    /// A column command targeted a row other than the one that is open.
    #[error("{command:?} to bank {bank} row {requested:#x} but row {open:#x} is open")]
    RowMismatch {
        /// Offending command.
        command: Command,
        /// Target bank.
        bank: u8,
        /// Row currently open.
        open: u16,
        /// Row the command expected.
        requested: u16,
    },

    /// The command came before the bank's minimum separation elapsed.
    #[error("{command:?} to bank {bank} at tick {now}, earliest legal tick is {ready_at}")]
    TooEarly {
        /// Offending command.
        command: Command,
        /// Target bank.
        bank: u8,
        /// Tick the command was issued.
        now: Tick,
        /// First tick the command would have been legal.
        ready_at: Tick,
    },

    /// An all-bank command found a bank with an open row.
    #[error("{command:?} requires every bank to be idle, bank {bank} is active")]
    BanksNotIdle {
        /// Offending command.
        command: Command,
        /// First active bank found.
        bank: u8,
    },

    /// The bank index is outside the device geometry.
    #[error("bank index {0} out of range")]
    NoSuchBank(u8),
}

/// The write-data pipeline was driven outside its contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Submit attempted while the "not full" flag was low.
    #[error("write-data pipeline full ({occupancy} of {capacity} slots)")]
    Full {
        /// Words currently buffered.
        occupancy: usize,
        /// Physical slot count.
        capacity: usize,
    },

    /// Consume attempted while the data-ready flag was low.
    #[error("write-data pipeline has no word ready")]
    NotReady,

    /// Two submits in the same tick.
    #[error("more than one submit in a single tick")]
    DoubleSubmit,

    /// Two consumes in the same tick.
    #[error("more than one consume in a single tick")]
    DoubleConsume,
}

/// Any fatal failure of a controller tick.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// Caller misuse of the client port.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// Internal invariant breach on the device side.
    #[error("timing violation: {0}")]
    Timing(#[from] TimingViolation),

    /// Internal invariant breach in the write-data pipeline.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A read was due back on DQ but the device did not drive the bus.
    #[error("no data on DQ at tick {tick} for an outstanding read")]
    MissingReadData {
        /// Tick the data was expected.
        tick: Tick,
    },

    /// Controller and device drove DQ in the same tick.
    #[error("DQ bus conflict at tick {tick}")]
    BusConflict {
        /// Tick of the conflict.
        tick: Tick,
    },
}

impl ControllerError {
    /// Returns `true` when the error is the client's fault rather than a broken internal invariant.
    pub const fn is_caller_misuse(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}

/// A refresh has been overdue for longer than the configured slack.
///
/// Reported once per late refresh. The design has no recovery path: the controller only refreshes
/// from `Idle`, so a client that keeps it busy can starve refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeadlineRisk {
    /// Tick at which the refresh timer reached zero.
    pub due_since: Tick,
    /// Ticks elapsed since then.
    pub overdue: u64,
}

impl fmt::Display for DeadlineRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "refresh due since tick {} still pending after {} ticks",
            self.due_since, self.overdue
        )
    }
}
