//! Controller core tests.
//!
//! The component tests drive `BankTracker`, `WriteDataPipeline` and `RefreshScheduler`
//! directly. The sequencer tests run full transactions against the mock device.

/// Bank state and timing precondition checks.
pub mod banks;


/// Write-data FIFO semantics, including the data-ready hold.
pub mod pipeline;
