//! Simulator: owns the controller and the device side-by-side.
//!
//! Each tick the device's DQ drive is sampled first, the controller evaluates against it, and
//! the device then latches the controller's pins at the closing clock edge.

use crate::common::{ControllerError, Tick};
use crate::config::{Config, ConfigError};
use crate::controller::{ClientPort, CommandSequencer, TickOutput};
use crate::sdram::SdramDevice;

/// Top-level simulator: command sequencer + attached device.
#[derive(Debug)]
pub struct Simulator<D: SdramDevice> {
    /// The controller under simulation.
    pub controller: CommandSequencer,
    /// The device on the other side of the pins.
    pub device: D,
}

impl<D: SdramDevice> Simulator<D> {
    /// Creates a simulator at tick zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration fails validation.
    pub fn new(config: &Config, device: D) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: CommandSequencer::new(config)?,
            device,
        })
    }

    /// Advances controller and device by one clock cycle.
    ///
    /// # Errors
    ///
    /// Propagates controller errors. Returns [`ControllerError::BusConflict`] if the controller
    /// and the device both drove DQ; in that case the device is not clocked.
    pub fn tick(&mut self, port: &ClientPort) -> Result<TickOutput, ControllerError> {
        let dq_in = self.device.drive();
        let out = self.controller.tick(port, dq_in)?;
        if out.pins.dq.is_some() && dq_in.is_some() {
            return Err(ControllerError::BusConflict { tick: out.tick });
        }
        self.device.clock(&out.pins);
        Ok(out)
    }

    /// Runs `ticks` cycles with no client request.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error.
    pub fn run_idle(&mut self, ticks: u64) -> Result<(), ControllerError> {
        let idle = ClientPort::idle();
        for _ in 0..ticks {
            let _ = self.tick(&idle)?;
        }
        Ok(())
    }

    /// Runs idle cycles until the reset sequence has finished.
    ///
    /// # Returns
    ///
    /// The first tick at which the controller can accept requests.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error.
    pub fn run_until_initialized(&mut self) -> Result<Tick, ControllerError> {
        let idle = ClientPort::idle();
        while !self.controller.is_initialized() {
            let _ = self.tick(&idle)?;
        }
        Ok(self.controller.now())
    }

    /// The next tick to be evaluated.
    pub const fn now(&self) -> Tick {
        self.controller.now()
    }
}
