//! Transaction and time types.
//!
//! This module defines the small value types used throughout the controller:
//! 1. **Ticks:** The discrete clock-edge counter every timing constraint is measured in.
//! 2. **Access Kind:** Whether a client transaction reads or writes the device.

/// A discrete clock edge count since reset.
pub type Tick = u64;

/// Direction of a client transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Data flows from the device to the client.
    Read,

    /// Data flows from the client to the device.
    ///
    /// The payload travels through the write-data pipeline ahead of the WRITE command.
    Write,
}

impl AccessKind {
    /// Returns `true` for [`AccessKind::Write`].
    #[inline]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}
