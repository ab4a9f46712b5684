//! SDR SDRAM controller core.
//!
//! This module contains the command sequencer and the components it owns exclusively:
//! 1. **Sequencer:** The FSM that emits one device command per tick.
//! 2. **Banks:** Per-bank open-row state and timing precondition checks.
//! 3. **Pipeline:** The write-data FIFO between the client and the WRITE command.
//! 4. **Refresh:** The countdown that forces AUTO REFRESH from `Idle`.

/// Per-bank state and timing checks.
pub mod banks;

/// Write-data FIFO.
pub mod pipeline;

/// Client port signals and per-tick output.
pub mod port;

/// Refresh countdown and deadline tracking.
pub mod refresh;

/// Command sequencer FSM.
pub mod sequencer;

/// Immutable datasheet timing in cycles.
pub mod timing;

pub use self::banks::{BankState, BankTracker};
pub use self::pipeline::{WriteDataPipeline, WriteWord};
pub use self::port::{ClientPort, ClientResponse, TickOutput};
pub use self::refresh::RefreshScheduler;
pub use self::sequencer::{CommandSequencer, PendingTransaction, SequencerState};
pub use self::timing::DeviceTimingProfile;
