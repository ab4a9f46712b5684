//! Global Controller Constants.
//!
//! This module defines constants shared by the controller, the device pins, and the client port. It includes:
//! 1. **Data Bus Constants:** Word width and byte-lane layout of the DQ bus.
//! 2. **Address Pin Constants:** Width of the multiplexed A bus and the special meaning of A10.
//! 3. **Client Constants:** Limits imposed by the memory-mapped client protocol.

/// Width of one SDRAM data word in bits.
pub const DATA_BITS: u32 = 16;

/// Number of byte lanes on the DQ bus (one DQM line per lane).
pub const BYTE_LANES: usize = 2;

/// Byte-enable value selecting every lane of a word.
pub const BYTE_ENABLE_ALL: u8 = 0b11;

/// Mask covering every valid byte-enable / DQM bit.
pub const BYTE_LANE_MASK: u8 = 0b11;

/// Number of multiplexed row/column address pins (A0..A12).
pub const ADDRESS_PINS: u32 = 13;

/// Address bit A10.
///
/// Selects "all banks" on PRECHARGE and auto-precharge on READ/WRITE.
pub const A10: u16 = 1 << 10;

/// Largest value the 8-bit `burstcount` client signal can carry.
pub const MAX_BURST_COUNT: u16 = 255;

/// Width of the client word address in bits for the reference geometry (2 + 13 + 10).
pub const CLIENT_ADDRESS_BITS: u32 = 25;
