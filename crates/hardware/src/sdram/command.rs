//! SDRAM command set and control-line encoding.
//!
//! Commands are selected by the RAS#/CAS#/WE# lines while CS# is low. This module provides:
//! 1. **Command Set:** The eight commands an SDR SDRAM decodes.
//! 2. **Encoding:** A total mapping between commands and the three active-low control lines.
//! 3. **Mode Register:** The address word programmed by MODE SET.

use std::fmt;

/// A device-level command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// No operation; the device keeps executing whatever is in flight.
    Nop,
    /// Terminates a read or write burst.
    BurstStop,
    /// Column read from the open row.
    Read,
    /// Column write into the open row.
    Write,
    /// Opens a row in one bank.
    Activate,
    /// Closes the open row of one bank, or of every bank when A10 is set.
    Precharge,
    /// CBR refresh of the next internal row in every bank.
    AutoRefresh,
    /// Loads the mode register from the address pins.
    ModeSet,
}

/// Active-low command lines. `true` is electrically high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControlLines {
    /// Row address strobe (RAS#).
    pub ras_n: bool,
    /// Column address strobe (CAS#).
    pub cas_n: bool,
    /// Write enable (WE#).
    pub we_n: bool,
}

impl Command {
    /// Every command, in control-line order (`RAS#,CAS#,WE#` = 111 down to 000).
    pub const ALL: [Self; 8] = [
        Self::Nop,
        Self::BurstStop,
        Self::Read,
        Self::Write,
        Self::Activate,
        Self::Precharge,
        Self::AutoRefresh,
        Self::ModeSet,
    ];

    /// Encodes the command onto RAS#/CAS#/WE#.
    pub const fn encode(self) -> ControlLines {
        let (ras_n, cas_n, we_n) = match self {
            Self::Nop => (true, true, true),
            Self::BurstStop => (true, true, false),
            Self::Read => (true, false, true),
            Self::Write => (true, false, false),
            Self::Activate => (false, true, true),
            Self::Precharge => (false, true, false),
            Self::AutoRefresh => (false, false, true),
            Self::ModeSet => (false, false, false),
        };
        ControlLines { ras_n, cas_n, we_n }
    }

    /// Decodes RAS#/CAS#/WE# into a command. Every line combination is a valid command.
    pub const fn decode(lines: ControlLines) -> Self {
        match (lines.ras_n, lines.cas_n, lines.we_n) {
            (true, true, true) => Self::Nop,
            (true, true, false) => Self::BurstStop,
            (true, false, true) => Self::Read,
            (true, false, false) => Self::Write,
            (false, true, true) => Self::Activate,
            (false, true, false) => Self::Precharge,
            (false, false, true) => Self::AutoRefresh,
            (false, false, false) => Self::ModeSet,
        }
    }

    /// Returns `true` for READ and WRITE.
    pub const fn is_column(self) -> bool {
        matches!(self, Self::Read | Self::Write)
    }

    /// Datasheet mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::BurstStop => "BST",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Activate => "ACT",
            Self::Precharge => "PRE",
            Self::AutoRefresh => "REF",
            Self::ModeSet => "MRS",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Contents of the mode register.
///
/// Layout of the MODE SET address word:
/// * `A2..A0` - burst length (`000` = 1, `001` = 2, `010` = 4, `011` = 8, `111` = full page)
/// * `A3` - burst type (`0` = sequential, `1` = interleaved)
/// * `A6..A4` - CAS latency
/// * `A9` - write burst mode (`0` = programmed length, `1` = single location)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeRegister {
    /// Encoded burst length field (`A2..A0`).
    pub burst_length_code: u8,
    /// `true` selects interleaved bursts.
    pub interleaved: bool,
    /// CAS latency in cycles.
    pub cas_latency: u8,
    /// `true` makes every write a single-location access.
    pub single_location_write: bool,
}

impl ModeRegister {
    /// Mode used by the controller: burst length 1, sequential, programmed write bursts.
    ///
    /// Multi-word client bursts are issued as one column command per tick, so the device
    /// never needs a programmed burst longer than one word.
    pub const fn single_word(cas_latency: u8) -> Self {
        Self {
            burst_length_code: 0b000,
            interleaved: false,
            cas_latency,
            single_location_write: false,
        }
    }

    /// Packs the register into the address word driven during MODE SET.
    pub const fn encode(self) -> u16 {
        (self.burst_length_code as u16 & 0b111)
            | ((self.interleaved as u16) << 3)
            | ((self.cas_latency as u16 & 0b111) << 4)
            | ((self.single_location_write as u16) << 9)
    }

    /// Unpacks the address word driven during MODE SET.
    pub const fn decode(word: u16) -> Self {
        Self {
            burst_length_code: (word & 0b111) as u8,
            interleaved: word & (1 << 3) != 0,
            cas_latency: ((word >> 4) & 0b111) as u8,
            single_location_write: word & (1 << 9) != 0,
        }
    }

    /// Programmed burst length in words, or `None` for reserved codes and full-page bursts.
    pub const fn burst_length(self) -> Option<u16> {
        match self.burst_length_code {
            0b000 => Some(1),
            0b001 => Some(2),
            0b010 => Some(4),
            0b011 => Some(8),
            _ => None,
        }
    }
}
