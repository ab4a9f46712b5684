//! Device seam between the controller and an SDRAM model.
//!
//! This module defines the `SdramDevice` trait implemented by anything that sits on the
//! device side of the pins. It provides:
//! 1. **Drive:** What the device puts on DQ during the current tick.
//! 2. **Clock:** Latching the controller's pins at the rising edge that ends the tick.
//!
//! Implementors must be `Send` so a simulator can be moved onto a worker thread.

use super::pins::DevicePins;

/// Anything attached to the device side of the controller.
pub trait SdramDevice: Send {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Value the device drives on DQ during the current tick, or `None` when its output is off.
    fn drive(&self) -> Option<u16>;

    /// Latches `pins` at the clock edge that ends the current tick and advances one cycle.
    fn clock(&mut self, pins: &DevicePins);
}

/// A device slot with nothing attached: DQ floats and every command is ignored.
///
/// Useful for soaking the command sequencer (initialization and refresh cadence) without
/// client traffic.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatingBus;

impl SdramDevice for FloatingBus {
    fn name(&self) -> &str {
        "floating"
    }

    fn drive(&self) -> Option<u16> {
        None
    }

    fn clock(&mut self, _pins: &DevicePins) {}
}
