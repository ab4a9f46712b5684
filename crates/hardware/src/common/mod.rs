//! Common types and constants shared throughout the controller model.
//!
//! This module provides the building blocks used by every other component. It includes:
//! 1. **Address Types:** Client word addresses, device bank/row/column addresses, and the geometry split.
//! 2. **Constants:** Data-bus, address-pin, and client-protocol limits.
//! 3. **Data Types:** The tick counter and transaction direction.
//! 4. **Error Handling:** Protocol/timing violations, pipeline errors, and refresh deadline risk.

/// Client and device address types.
pub mod addr;

/// Bus and protocol constants.
pub mod constants;

/// Tick and transaction kind definitions.
pub mod data;

/// Error types and deadline reporting.
pub mod error;

pub use addr::{DeviceAddr, Geometry, WordAddr};
pub use data::{AccessKind, Tick};
pub use error::{ControllerError, DeadlineRisk, PipelineError, ProtocolViolation, TimingViolation};
