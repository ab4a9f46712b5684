//! SDR SDRAM controller model.
//!
//! This crate implements a cycle-accurate command-sequencing controller for an SDR SDRAM with
//! the following:
//! 1. **Controller:** Command sequencer FSM, write-data pipeline, refresh scheduler, bank state.
//! 2. **Device Protocol:** RAS#/CAS#/WE# command encoding, mode register, and the pin bundle.
//! 3. **Simulation:** A harness that clocks the controller against any `SdramDevice`.
//! 4. **Support:** Configuration, error taxonomy, and statistics.

/// Common types and constants (addresses, geometry, ticks, errors).
pub mod common;
/// Controller configuration (defaults, sections, validation).
pub mod config;
/// Controller core (sequencer, banks, write pipeline, refresh, port signals).
pub mod controller;
/// Device protocol (commands, pins, device trait).
pub mod sdram;
/// Simulation harness.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// The controller; construct with `CommandSequencer::new` and drive with `tick`.
pub use crate::controller::CommandSequencer;
/// Controller plus device clocked together.
pub use crate::sim::Simulator;
