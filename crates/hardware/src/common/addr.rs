//! Client word addresses and SDRAM device addresses.
//!
//! This module defines strong types for the two address spaces the controller translates between:
//! 1. **Client Space:** A flat word address as presented on the memory-mapped port.
//! 2. **Device Space:** The hierarchical bank/row/column triple the SDRAM understands.
//! 3. **Geometry:** The fixed bit split between the two, derived from the device organization.

use super::constants::CLIENT_ADDRESS_BITS;
use super::error::ProtocolViolation;

/// A word address on the client port.
///
/// One unit addresses one 16-bit word, not one byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordAddr(pub u32);

impl WordAddr {
    /// Creates a word address from its raw value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }
}

/// A decoded device address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceAddr {
    /// Bank select (BA1..BA0).
    pub bank: u8,
    /// Row presented with ACTIVATE.
    pub row: u16,
    /// Column presented with READ/WRITE.
    pub column: u16,
}

impl DeviceAddr {
    /// Returns the address `offset` columns further along the same row.
    ///
    /// The caller guarantees the result stays inside the row.
    #[inline]
    pub const fn with_column_offset(self, offset: u16) -> Self {
        Self {
            bank: self.bank,
            row: self.row,
            column: self.column + offset,
        }
    }
}

/// Bank/row/column bit widths of the attached device.
///
/// The client address is laid out most-significant first as `bank | row | column`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    bank_bits: u32,
    row_bits: u32,
    column_bits: u32,
}

impl Geometry {
    /// Creates a geometry from its field widths.
    ///
    /// # Arguments
    ///
    /// * `bank_bits` - Number of bank-select bits.
    /// * `row_bits` - Number of row address bits.
    /// * `column_bits` - Number of column address bits.
    pub const fn new(bank_bits: u32, row_bits: u32, column_bits: u32) -> Self {
        Self {
            bank_bits,
            row_bits,
            column_bits,
        }
    }

    /// Number of bank-select bits.
    pub const fn bank_bits(&self) -> u32 {
        self.bank_bits
    }

    /// Number of row address bits.
    pub const fn row_bits(&self) -> u32 {
        self.row_bits
    }

    /// Number of column address bits.
    pub const fn column_bits(&self) -> u32 {
        self.column_bits
    }

    /// Total width of a client word address.
    pub const fn address_bits(&self) -> u32 {
        self.bank_bits + self.row_bits + self.column_bits
    }

    /// Number of banks in the device.
    pub const fn banks(&self) -> usize {
        1 << self.bank_bits
    }

    /// Number of columns (words) per row.
    pub const fn columns(&self) -> u32 {
        1 << self.column_bits
    }

    /// Splits a client word address into its bank/row/column fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::AddressOutOfRange`] when the address has bits set above
    /// [`Geometry::address_bits`].
    pub fn split(&self, addr: WordAddr) -> Result<DeviceAddr, ProtocolViolation> {
        let raw = addr.val();
        let width = self.address_bits();
        if width < u32::BITS && raw >> width != 0 {
            return Err(ProtocolViolation::AddressOutOfRange {
                address: raw,
                width,
            });
        }

        let column = raw & mask(self.column_bits);
        let row = (raw >> self.column_bits) & mask(self.row_bits);
        let bank = (raw >> (self.column_bits + self.row_bits)) & mask(self.bank_bits);

        Ok(DeviceAddr {
            bank: bank as u8,
            row: row as u16,
            column: column as u16,
        })
    }

    /// Packs a device address back into a client word address.
    pub const fn join(&self, addr: DeviceAddr) -> WordAddr {
        let bank = (addr.bank as u32) << (self.row_bits + self.column_bits);
        let row = (addr.row as u32) << self.column_bits;
        WordAddr(bank | row | addr.column as u32)
    }
}

impl Default for Geometry {
    /// 4 banks x 8192 rows x 1024 columns of 16-bit words (64 MiB).
    fn default() -> Self {
        let geometry = Self::new(2, 13, 10);
        debug_assert!(geometry.address_bits() == CLIENT_ADDRESS_BITS);
        geometry
    }
}

const fn mask(bits: u32) -> u32 {
    if bits >= u32::BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}
