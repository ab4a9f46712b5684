//! Device-level SDRAM protocol.
//!
//! This module describes the controller's view of the chip:
//! 1. **Command:** The RAS#/CAS#/WE# command set and the mode register word.
//! 2. **Pins:** The per-tick bundle of command, bank, address, DQ and DQM.
//! 3. **Device:** The trait an SDRAM model implements to be clocked alongside the controller.

/// Command set, control-line encoding and mode register.
pub mod command;

/// Device trait and the floating-bus placeholder.
pub mod device;

/// Controller-driven pin bundle.
pub mod pins;

pub use command::{Command, ControlLines, ModeRegister};
pub use device::{FloatingBus, SdramDevice};
pub use pins::DevicePins;
