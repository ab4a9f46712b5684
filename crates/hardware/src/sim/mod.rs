//! Simulation harness.
//!
//! Pairs the controller with a device model behind the [`SdramDevice`](crate::sdram::SdramDevice)
//! seam and advances both one tick at a time.

/// Controller plus device, clocked together.
pub mod simulator;

pub use self::simulator::Simulator;
