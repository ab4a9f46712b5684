//! Command sequencer state machine.
//!
//! The sequencer turns client requests into device commands, one command per tick. It provides:
//! 1. **Initialization:** Power-on wait, PRECHARGE-all, two AUTO REFRESH, MODE SET.
//! 2. **Transactions:** ACTIVATE, one READ/WRITE per word, then an explicit PRECHARGE.
//! 3. **Refresh:** AUTO REFRESH from `Idle` whenever the scheduler reports it due.
//! 4. **Backpressure:** A Moore `waitrequest` derived from the registered state only.
//!
//! Every tick reads the registers committed at the previous edge and builds a `next` copy; the
//! copy replaces the current registers only when the tick succeeds. A tick that fails leaves
//! the controller exactly as it was and drives nothing towards the device.
//!
//! Countdown convention: a command that must be followed by `d` cycles of separation loads the
//! timer with `d - 1`. Timed states act on the tick the timer is found at zero, which is exactly
//! `d` ticks after the command. Settling states (`InitSetMode`, `Refresh`, `Precharge`) instead
//! fall through to `Idle` on that tick, so `Idle` can accept a request the moment the device is
//! ready.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info};

use crate::common::constants::BYTE_LANE_MASK;
use crate::common::{
    AccessKind, ControllerError, DeviceAddr, Geometry, ProtocolViolation, Tick,
};
use crate::config::{Config, ConfigError};
use crate::controller::banks::BankTracker;
use crate::controller::pipeline::{WriteDataPipeline, WriteWord};
use crate::controller::port::{ClientPort, ClientResponse, TickOutput};
use crate::controller::refresh::RefreshScheduler;
use crate::controller::timing::DeviceTimingProfile;
use crate::sdram::{Command, DevicePins, ModeRegister};
use crate::stats::ControllerStats;

/// Sequencer FSM state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SequencerState {
    /// NOPs until the power-on delay has elapsed.
    InitPowerOn,
    /// PRECHARGE-all issued, waiting tRP.
    InitPrecharge,
    /// First AUTO REFRESH issued, waiting tRC.
    InitRefresh1,
    /// Second AUTO REFRESH issued, waiting tRC.
    InitRefresh2,
    /// MODE SET issued, waiting tMRD.
    InitSetMode,
    /// Ready for a request or a refresh.
    Idle,
    /// AUTO REFRESH issued, waiting tRC.
    Refresh,
    /// Row opened, waiting tRCD (and, for writes, the first data word).
    Active,
    /// Issuing READ commands for the burst, then waiting to precharge.
    Read,
    /// Issuing WRITE commands for the burst, then waiting to precharge.
    Write,
    /// PRECHARGE issued, waiting for the bank to become ready again.
    Precharge,
}

impl SequencerState {
    /// Returns `true` for the reset sequence states.
    pub const fn is_initializing(self) -> bool {
        matches!(
            self,
            Self::InitPowerOn
                | Self::InitPrecharge
                | Self::InitRefresh1
                | Self::InitRefresh2
                | Self::InitSetMode
        )
    }

    const fn is_timed(self) -> bool {
        !matches!(self, Self::Idle | Self::Read | Self::Write)
    }

    const fn is_settling(self) -> bool {
        matches!(self, Self::InitSetMode | Self::Refresh | Self::Precharge)
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The request being served, captured when it was accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Read or write.
    pub kind: AccessKind,
    /// Bank, row and starting column.
    pub addr: DeviceAddr,
    /// Words in the transaction.
    pub burst_length: u16,
    /// Column commands issued so far.
    pub issued: u16,
}

impl PendingTransaction {
    /// Returns `true` once every column command of the burst has been issued.
    pub const fn is_complete(&self) -> bool {
        self.issued >= self.burst_length
    }
}

/// Registered sequencer state, advanced atomically once per tick.
#[derive(Clone, Debug)]
struct Registers {
    state: SequencerState,
    timer: u32,
    pending: Option<PendingTransaction>,
    /// Write beats still owed by the client for the accepted burst.
    beats_pending: u16,
    /// Ticks on which read data is due back on DQ, oldest first.
    read_returns: VecDeque<Tick>,
}

/// Result of one FSM evaluation.
struct Step {
    pins: DevicePins,
    write_stall: bool,
}

impl Step {
    const fn issue(pins: DevicePins) -> Self {
        Self {
            pins,
            write_stall: false,
        }
    }

    const fn nop() -> Self {
        Self::issue(DevicePins::nop())
    }
}

/// The SDR SDRAM command sequencer.
///
/// Owns the bank state, the write-data pipeline and the refresh scheduler. Drive it with
/// [`tick`](Self::tick) once per clock cycle.
#[derive(Clone, Debug)]
pub struct CommandSequencer {
    timing: DeviceTimingProfile,
    geometry: Geometry,
    max_burst: u16,
    mode_word: u16,
    current: Registers,
    banks: BankTracker,
    pipeline: WriteDataPipeline,
    refresh: RefreshScheduler,
    now: Tick,
    /// Counters for everything the sequencer has done.
    pub stats: ControllerStats,
}

impl CommandSequencer {
    /// Creates a sequencer in `InitPowerOn` at tick zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration fails validation.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let timing = DeviceTimingProfile::from_config(&config.timing);
        let geometry = config.geometry();
        let mode_word = ModeRegister::single_word(timing.cas_latency as u8).encode();

        Ok(Self {
            timing,
            geometry,
            max_burst: config.max_burst(),
            mode_word,
            current: Registers {
                state: SequencerState::InitPowerOn,
                timer: timing.power_on_delay,
                pending: None,
                beats_pending: 0,
                read_returns: VecDeque::with_capacity(timing.cas_latency as usize + 1),
            },
            banks: BankTracker::new(geometry.banks(), timing),
            pipeline: WriteDataPipeline::new(config.controller.pipeline_depth),
            refresh: RefreshScheduler::new(timing.refresh_interval, timing.refresh_slack),
            now: 0,
            stats: ControllerStats::default(),
        })
    }

    /// Current FSM state.
    pub fn state(&self) -> SequencerState {
        self.current.state
    }

    /// The next tick to be evaluated.
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Timing profile in force.
    pub const fn timing(&self) -> &DeviceTimingProfile {
        &self.timing
    }

    /// Address split in force.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Largest burst the client may request.
    pub const fn max_burst(&self) -> u16 {
        self.max_burst
    }

    /// Word programmed by MODE SET.
    pub const fn mode_word(&self) -> u16 {
        self.mode_word
    }

    /// Bank state.
    pub const fn banks(&self) -> &BankTracker {
        &self.banks
    }

    /// Write-data pipeline.
    pub const fn pipeline(&self) -> &WriteDataPipeline {
        &self.pipeline
    }

    /// Refresh scheduler.
    pub const fn refresh(&self) -> &RefreshScheduler {
        &self.refresh
    }

    /// Transaction in flight, if any.
    pub fn pending(&self) -> Option<&PendingTransaction> {
        self.current.pending.as_ref()
    }

    /// Write beats the client still owes for the accepted burst.
    pub fn beats_pending(&self) -> u16 {
        self.current.beats_pending
    }

    /// Returns `true` once the reset sequence has finished.
    pub fn is_initialized(&self) -> bool {
        !self.current.state.is_initializing()
    }

    /// Backpressure for the coming tick.
    ///
    /// During the beat phase of a write burst it is low while the pipeline can take a word.
    /// Otherwise it is low only in `Idle` with no refresh due.
    pub fn waitrequest(&self) -> bool {
        if self.current.beats_pending > 0 {
            return !self.pipeline.can_submit();
        }
        self.current.state != SequencerState::Idle || self.refresh.due()
    }

    /// Evaluates one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `port` - Client signals for this tick.
    /// * `dq_in` - Value the device drives on DQ this tick, if any.
    ///
    /// # Returns
    ///
    /// The device pins and client response for this tick.
    ///
    /// # Errors
    ///
    /// A [`ProtocolViolation`] when the client breaks the port contract; the tick is rejected and
    /// the sequencer does not advance. Any other error is a broken internal invariant and is
    /// fatal.
    pub fn tick(&mut self, port: &ClientPort, dq_in: Option<u16>) -> Result<TickOutput, ControllerError> {
        let now = self.now;
        let waitrequest = self.waitrequest();
        self.check_request(port)?;

        let mut next = self.current.clone();
        let mut client = ClientResponse {
            waitrequest,
            ..ClientResponse::default()
        };
        if next.read_returns.front() == Some(&now) {
            let _ = next.read_returns.pop_front();
            client.readdata = dq_in.ok_or(ControllerError::MissingReadData { tick: now })?;
            client.readdatavalid = true;
        }

        let accepted = !waitrequest && port.is_request();
        let beat = accepted && self.current.beats_pending > 0;
        let step = match self.step(&mut next, port, accepted && !beat, beat, now) {
            Ok(step) => step,
            Err(e) => {
                self.pipeline.discard_staged();
                return Err(e);
            }
        };

        let pins = step.pins;
        let deadline_risk = if pins.command == Command::AutoRefresh {
            self.refresh.reload(now);
            None
        } else {
            self.refresh.tick(now)
        };

        if pins.command != Command::Nop {
            debug!(
                tick = now,
                command = %pins.command,
                bank = pins.bank,
                addr = format_args!("{:#x}", pins.addr),
                state = %self.current.state,
                "sdram command"
            );
        }
        if self.current.state.is_initializing() && next.state == SequencerState::Idle {
            info!(ready_at = now + 1, "sdram initialization complete");
            self.stats.init_done_tick = Some(now + 1);
        }

        self.record(&step, &client, port, accepted, beat, deadline_risk.is_some());
        self.current = next;
        self.pipeline.clock();
        self.now += 1;

        Ok(TickOutput {
            tick: now,
            pins,
            client,
            accepted,
            deadline_risk,
        })
    }

    /// Rejects a client request that breaks the port contract, without touching any state.
    fn check_request(&self, port: &ClientPort) -> Result<(), ProtocolViolation> {
        if port.read && port.write {
            return Err(ProtocolViolation::ReadAndWrite);
        }
        if self.current.beats_pending > 0 {
            if port.read {
                return Err(ProtocolViolation::ReadDuringWriteBurst);
            }
            if port.write {
                check_byteenable(port.byteenable)?;
            }
            return Ok(());
        }
        if !port.is_request() {
            return Ok(());
        }
        if port.write {
            check_byteenable(port.byteenable)?;
        }
        if port.burstcount == 0 || port.burstcount > self.max_burst {
            return Err(ProtocolViolation::UnsupportedBurst {
                count: port.burstcount,
                max: self.max_burst,
            });
        }
        let addr = self.geometry.split(port.address)?;
        if u32::from(addr.column) + u32::from(port.burstcount) > self.geometry.columns() {
            return Err(ProtocolViolation::BurstCrossesRow {
                column: addr.column,
                count: port.burstcount,
            });
        }
        Ok(())
    }

    fn step(
        &mut self,
        next: &mut Registers,
        port: &ClientPort,
        accept: bool,
        beat: bool,
        now: Tick,
    ) -> Result<Step, ControllerError> {
        if beat {
            self.pipeline.submit(WriteWord {
                byte_enable: port.byteenable,
                data: port.writedata,
            })?;
            next.beats_pending -= 1;
        }

        let state = self.current.state;
        if state.is_timed() && next.timer > 0 {
            next.timer -= 1;
            if state.is_settling() && next.timer == 0 {
                next.state = SequencerState::Idle;
            }
            return Ok(Step::nop());
        }

        let t = self.timing;
        let pins = match state {
            SequencerState::InitPowerOn => {
                self.banks.precharge_all(now)?;
                enter(next, SequencerState::InitPrecharge, t.t_rp);
                DevicePins::precharge_all()
            }
            SequencerState::InitPrecharge => {
                self.banks.refresh(now)?;
                enter(next, SequencerState::InitRefresh1, t.t_rc);
                DevicePins::auto_refresh()
            }
            SequencerState::InitRefresh1 => {
                self.banks.refresh(now)?;
                enter(next, SequencerState::InitRefresh2, t.t_rc);
                DevicePins::auto_refresh()
            }
            SequencerState::InitRefresh2 => {
                self.banks.mode_set(now)?;
                enter(next, SequencerState::InitSetMode, t.t_mrd);
                DevicePins::mode_set(self.mode_word)
            }
            SequencerState::InitSetMode | SequencerState::Refresh | SequencerState::Precharge => {
                next.state = SequencerState::Idle;
                DevicePins::nop()
            }
            SequencerState::Idle => {
                if self.refresh.due() {
                    self.banks.refresh(now)?;
                    enter(next, SequencerState::Refresh, t.t_rc);
                    DevicePins::auto_refresh()
                } else if accept {
                    self.accept(next, port, now)?
                } else {
                    DevicePins::nop()
                }
            }
            SequencerState::Active | SequencerState::Read | SequencerState::Write => {
                return self.column_step(next, now);
            }
        };
        Ok(Step::issue(pins))
    }

    /// Captures the request and opens its row.
    fn accept(&mut self, next: &mut Registers, port: &ClientPort, now: Tick) -> Result<DevicePins, ControllerError> {
        let addr = self.geometry.split(port.address)?;
        let kind = if port.write {
            AccessKind::Write
        } else {
            AccessKind::Read
        };
        if kind.is_write() {
            self.pipeline.submit(WriteWord {
                byte_enable: port.byteenable,
                data: port.writedata,
            })?;
            next.beats_pending = port.burstcount - 1;
        }
        self.banks.activate(addr.bank, addr.row, now)?;

        next.pending = Some(PendingTransaction {
            kind,
            addr,
            burst_length: port.burstcount,
            issued: 0,
        });
        enter(next, SequencerState::Active, self.timing.t_rcd);
        Ok(DevicePins::activate(addr.bank, addr.row))
    }

    /// Issues the next column command of the burst, or closes the row once the burst is done.
    fn column_step(&mut self, next: &mut Registers, now: Tick) -> Result<Step, ControllerError> {
        let Some(mut txn) = next.pending else {
            next.state = SequencerState::Idle;
            return Ok(Step::nop());
        };
        let DeviceAddr { bank, row, .. } = txn.addr;

        if txn.is_complete() {
            let earliest = self
                .banks
                .bank(bank)
                .map_or(now, |b| b.earliest_precharge_tick);
            if now < earliest {
                return Ok(Step::nop());
            }
            self.banks.precharge(bank, now)?;
            let ready = self
                .banks
                .bank(bank)
                .map_or(now, |b| b.earliest_next_command_tick);
            let delay = (ready.saturating_sub(now) as u32).max(self.timing.t_rp);
            next.pending = None;
            enter(next, SequencerState::Precharge, delay);
            return Ok(Step::issue(DevicePins::precharge(bank)));
        }

        let column = txn.addr.with_column_offset(txn.issued).column;
        let pins = match txn.kind {
            AccessKind::Read => {
                self.banks.read(bank, row, now)?;
                next.read_returns.push_back(now + Tick::from(self.timing.cas_latency));
                next.state = SequencerState::Read;
                DevicePins::read(bank, column)
            }
            AccessKind::Write => {
                if !self.pipeline.data_ready() {
                    return Ok(Step {
                        pins: DevicePins::nop(),
                        write_stall: true,
                    });
                }
                self.banks.write(bank, row, now)?;
                let word = self.pipeline.consume()?;
                next.state = SequencerState::Write;
                DevicePins::write(bank, column, word.data, word.byte_enable)
            }
        };
        txn.issued += 1;
        next.pending = Some(txn);
        Ok(Step::issue(pins))
    }

    fn record(
        &mut self,
        step: &Step,
        client: &ClientResponse,
        port: &ClientPort,
        accepted: bool,
        beat: bool,
        deadline_risk: bool,
    ) {
        let stats = &mut self.stats;
        stats.ticks += 1;
        stats.record_command(step.pins.command);
        if client.waitrequest {
            stats.waitrequest_ticks += 1;
        }
        if client.readdatavalid {
            stats.words_read += 1;
        }
        if step.write_stall {
            stats.write_stall_ticks += 1;
        }
        if accepted {
            if port.write {
                stats.words_written += 1;
            }
            if !beat {
                if port.write {
                    stats.writes_accepted += 1;
                } else {
                    stats.reads_accepted += 1;
                }
            }
        }
        if step.pins.command == Command::AutoRefresh && !self.current.state.is_initializing() {
            stats.refreshes += 1;
        }
        stats.max_refresh_gap = self.refresh.max_gap();
        if deadline_risk {
            stats.deadline_risks += 1;
        }
    }
}

/// Loads the countdown for a command needing `delay` cycles of separation.
fn enter(next: &mut Registers, state: SequencerState, delay: u32) {
    next.timer = delay.saturating_sub(1);
    next.state = if state.is_settling() && next.timer == 0 {
        SequencerState::Idle
    } else {
        state
    };
}

fn check_byteenable(byteenable: u8) -> Result<(), ProtocolViolation> {
    if byteenable & !BYTE_LANE_MASK != 0 {
        Err(ProtocolViolation::InvalidByteEnable(byteenable))
    } else {
        Ok(())
    }
}
