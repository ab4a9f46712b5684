//! Per-bank state and command precondition checks.
//!
//! The sequencer's countdown timers are what actually keep commands legal. [`BankTracker`]
//! re-checks every issued command against the datasheet separations and reports a
//! [`TimingViolation`] instead of letting a broken invariant reach the device. It tracks:
//! 1. **Open Rows:** Which bank has which row activated.
//! 2. **Separations:** tRCD, tRAS, tWR, tRP, tRC and tMRD as absolute "earliest tick" marks.
//! 3. **Initialization:** The power-on delay and the MODE SET that unlocks bank commands.

use crate::common::{Tick, TimingViolation};
use crate::controller::timing::DeviceTimingProfile;
use crate::sdram::Command;

/// Lifetime state of one bank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BankState {
    /// A row is open.
    pub active: bool,
    /// Row opened by the last ACTIVATE; meaningful only while `active`.
    pub open_row: u16,
    /// Earliest tick the next command may target this bank.
    ///
    /// While active this gates READ/WRITE (tRCD); while idle it gates ACTIVATE/REFRESH (tRP, tRC).
    pub earliest_next_command_tick: Tick,
    /// Earliest tick PRECHARGE may close the open row (tRAS, tWR).
    pub earliest_precharge_tick: Tick,
    /// Tick of the last ACTIVATE, for tRC.
    pub last_activate_tick: Option<Tick>,
}

/// Shadow of every bank's state, owned by the sequencer.
#[derive(Clone, Debug)]
pub struct BankTracker {
    banks: Vec<BankState>,
    timing: DeviceTimingProfile,
    initialized: bool,
}

impl BankTracker {
    /// Creates a tracker for `banks` banks, all idle, device uninitialized.
    pub fn new(banks: usize, timing: DeviceTimingProfile) -> Self {
        Self {
            banks: vec![BankState::default(); banks],
            timing,
            initialized: false,
        }
    }

    /// State of one bank.
    pub fn bank(&self, bank: u8) -> Option<&BankState> {
        self.banks.get(bank as usize)
    }

    /// All bank states, indexed by bank number.
    pub fn banks(&self) -> &[BankState] {
        &self.banks
    }

    /// `true` once MODE SET has been issued.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// `true` when no bank has an open row.
    pub fn all_idle(&self) -> bool {
        self.banks.iter().all(|b| !b.active)
    }

    /// Records an ACTIVATE of `row` in `bank` at `now`.
    ///
    /// # Errors
    ///
    /// Fails if the device is uninitialized, the bank already has an open row, or tRP/tRC has
    /// not elapsed.
    pub fn activate(&mut self, bank: u8, row: u16, now: Tick) -> Result<(), TimingViolation> {
        let command = Command::Activate;
        self.check_initialized(command)?;
        let t_rcd = self.timing.t_rcd as Tick;
        let t_ras = self.timing.t_ras as Tick;
        let state = self.bank_mut(bank)?;
        if state.active {
            return Err(TimingViolation::BankAlreadyActive {
                bank,
                row: state.open_row,
            });
        }
        check_ready(command, bank, now, state.earliest_next_command_tick)?;

        *state = BankState {
            active: true,
            open_row: row,
            earliest_next_command_tick: now + t_rcd,
            earliest_precharge_tick: now + t_ras,
            last_activate_tick: Some(now),
        };
        Ok(())
    }

    /// Records a READ from `row` in `bank` at `now`.
    ///
    /// # Errors
    ///
    /// Fails if the bank is not open on `row` or tRCD has not elapsed.
    pub fn read(&mut self, bank: u8, row: u16, now: Tick) -> Result<(), TimingViolation> {
        let state = self.column_access(Command::Read, bank, row, now)?;
        state.earliest_precharge_tick = state.earliest_precharge_tick.max(now + 1);
        Ok(())
    }

    /// Records a WRITE into `row` in `bank` at `now`.
    ///
    /// # Errors
    ///
    /// Fails if the bank is not open on `row` or tRCD has not elapsed.
    pub fn write(&mut self, bank: u8, row: u16, now: Tick) -> Result<(), TimingViolation> {
        let t_wr = self.timing.t_wr as Tick;
        let state = self.column_access(Command::Write, bank, row, now)?;
        state.earliest_precharge_tick = state.earliest_precharge_tick.max(now + t_wr);
        Ok(())
    }

    /// Records a single-bank PRECHARGE at `now`.
    ///
    /// Precharging an idle bank only restarts tRP.
    ///
    /// # Errors
    ///
    /// Fails if tRAS or tWR has not elapsed for the open row.
    pub fn precharge(&mut self, bank: u8, now: Tick) -> Result<(), TimingViolation> {
        self.check_powered(Command::Precharge, now)?;
        let timing = self.timing;
        let state = self.bank_mut(bank)?;
        close_bank(state, bank, now, &timing)
    }

    /// Records a PRECHARGE of every bank at `now`.
    ///
    /// # Errors
    ///
    /// Fails if any open row has not satisfied tRAS or tWR.
    pub fn precharge_all(&mut self, now: Tick) -> Result<(), TimingViolation> {
        self.check_powered(Command::Precharge, now)?;
        let timing = self.timing;
        for (index, state) in self.banks.iter_mut().enumerate() {
            close_bank(state, index as u8, now, &timing)?;
        }
        Ok(())
    }

    /// Records an AUTO REFRESH at `now`; every bank is busy for tRC afterwards.
    ///
    /// # Errors
    ///
    /// Fails if any bank is open or still inside tRP/tRC.
    pub fn refresh(&mut self, now: Tick) -> Result<(), TimingViolation> {
        let command = Command::AutoRefresh;
        self.check_powered(command, now)?;
        self.check_all_ready(command, now)?;
        let busy_until = now + self.timing.t_rc as Tick;
        for state in &mut self.banks {
            state.earliest_next_command_tick = busy_until;
        }
        Ok(())
    }

    /// Records a MODE SET at `now`, completing initialization.
    ///
    /// # Errors
    ///
    /// Fails if any bank is open or still inside tRP/tRC.
    pub fn mode_set(&mut self, now: Tick) -> Result<(), TimingViolation> {
        let command = Command::ModeSet;
        self.check_powered(command, now)?;
        self.check_all_ready(command, now)?;
        let ready = now + self.timing.t_mrd as Tick;
        for state in &mut self.banks {
            state.earliest_next_command_tick = state.earliest_next_command_tick.max(ready);
        }
        self.initialized = true;
        Ok(())
    }

    fn column_access(
        &mut self,
        command: Command,
        bank: u8,
        row: u16,
        now: Tick,
    ) -> Result<&mut BankState, TimingViolation> {
        self.check_initialized(command)?;
        let state = self.bank_mut(bank)?;
        if !state.active {
            return Err(TimingViolation::BankNotActive { command, bank });
        }
        if state.open_row != row {
            return Err(TimingViolation::RowMismatch {
                command,
                bank,
                open: state.open_row,
                requested: row,
            });
        }
        check_ready(command, bank, now, state.earliest_next_command_tick)?;
        Ok(state)
    }

    fn check_all_ready(&self, command: Command, now: Tick) -> Result<(), TimingViolation> {
        for (index, state) in self.banks.iter().enumerate() {
            let bank = index as u8;
            if state.active {
                return Err(TimingViolation::BanksNotIdle { command, bank });
            }
            check_ready(command, bank, now, state.earliest_next_command_tick)?;
        }
        Ok(())
    }

    fn check_initialized(&self, command: Command) -> Result<(), TimingViolation> {
        if self.initialized {
            Ok(())
        } else {
            Err(TimingViolation::NotInitialized { command })
        }
    }

    fn check_powered(&self, command: Command, now: Tick) -> Result<(), TimingViolation> {
        let ready_at = self.timing.power_on_delay as Tick;
        if now < ready_at {
            Err(TimingViolation::BeforePowerOn {
                command,
                now,
                ready_at,
            })
        } else {
            Ok(())
        }
    }

    fn bank_mut(&mut self, bank: u8) -> Result<&mut BankState, TimingViolation> {
        self.banks
            .get_mut(bank as usize)
            .ok_or(TimingViolation::NoSuchBank(bank))
    }
}

fn check_ready(command: Command, bank: u8, now: Tick, ready_at: Tick) -> Result<(), TimingViolation> {
    if now < ready_at {
        Err(TimingViolation::TooEarly {
            command,
            bank,
            now,
            ready_at,
        })
    } else {
        Ok(())
    }
}

fn close_bank(
    state: &mut BankState,
    bank: u8,
    now: Tick,
    timing: &DeviceTimingProfile,
) -> Result<(), TimingViolation> {
    let after_rp = now + timing.t_rp as Tick;
    if !state.active {
        state.earliest_next_command_tick = state.earliest_next_command_tick.max(after_rp);
        return Ok(());
    }
    check_ready(Command::Precharge, bank, now, state.earliest_precharge_tick)?;

    let after_rc = state
        .last_activate_tick
        .map_or(0, |t| t + timing.t_rc as Tick);
    state.active = false;
    state.earliest_next_command_tick = after_rp.max(after_rc);
    Ok(())
}
