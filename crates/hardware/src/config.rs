//! Configuration system for the SDRAM controller model.
//!
//! This module defines all configuration structures used to parameterize the controller. It provides:
//! 1. **Defaults:** The reference device profile (166 MHz part, 4 banks x 8192 rows x 1024 columns).
//! 2. **Structures:** Timing, geometry, and controller sections, each with per-field serde defaults.
//! 3. **Validation:** Rejection of profiles the sequencer cannot honor (zero delays, undersized FIFO).
//!
//! Configuration is supplied as JSON; use `Config::default()` for the reference profile.

use std::path::Path;
use std::{fs, io};

use serde::Deserialize;
use thiserror::Error;

use crate::common::Geometry;
use crate::common::constants::{ADDRESS_PINS, MAX_BURST_COUNT};

/// Default configuration constants.
///
/// These values come from the reference device datasheet at a 6 ns clock.
mod defaults {
    /// Clock period in picoseconds (166 MHz, rounded to 6 ns).
    pub const CLOCK_PERIOD_PS: u32 = 6_000;

    /// Power-on delay in cycles (102 us at 6 ns).
    ///
    /// Only NOPs may be issued until this many cycles have elapsed after reset.
    pub const POWER_ON_DELAY: u32 = 17_000;

    /// CAS latency in cycles.
    pub const CAS_LATENCY: u32 = 3;

    /// ACTIVATE to READ/WRITE delay (tRCD) in cycles.
    pub const T_RCD: u32 = 3;

    /// ACTIVATE to ACTIVATE / REFRESH to REFRESH row cycle time (tRC) in cycles.
    pub const T_RC: u32 = 10;

    /// PRECHARGE to ACTIVATE delay (tRP) in cycles.
    pub const T_RP: u32 = 3;

    /// MODE SET to next command delay (tMRD) in cycles.
    pub const T_MRD: u32 = 2;

    /// ACTIVATE to PRECHARGE minimum (tRAS) in cycles.
    pub const T_RAS: u32 = 7;

    /// Last write data to PRECHARGE (tWR) in cycles.
    pub const T_WR: u32 = 2;

    /// Cycles between scheduled AUTO REFRESH commands.
    ///
    /// 8192 refreshes per 64 ms at 6 ns is one per 1302 cycles; the reload value leaves margin
    /// for a refresh that has to wait for an in-flight transaction.
    pub const REFRESH_INTERVAL: u32 = 780;

    /// Overdue cycles tolerated before a refresh deadline risk is reported.
    pub const REFRESH_SLACK: u32 = 500;

    /// Bank-select bits.
    pub const BANK_BITS: u32 = 2;

    /// Row address bits.
    pub const ROW_BITS: u32 = 13;

    /// Column address bits.
    pub const COLUMN_BITS: u32 = 10;

    /// Write-data pipeline slot count.
    pub const PIPELINE_DEPTH: usize = 8;

    /// Largest client burst accepted by the extended profile.
    pub const MAX_BURST: u16 = 128;
}

/// Client burst support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BurstProfile {
    /// Single-word transactions only (`burstcount` must be 1).
    #[default]
    Baseline,
    /// Multi-word transactions streamed through the write-data pipeline.
    Extended,
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),

    /// The JSON did not match the configuration schema.
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The values parse but describe a profile the controller cannot run.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use sdrsim_core::config::{BurstProfile, Config};
///
/// let json = r#"{
///     "timing": { "power_on_delay": 100, "refresh_interval": 400 },
///     "controller": { "profile": "Extended", "max_burst": 16 }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.timing.power_on_delay, 100);
/// assert_eq!(config.timing.cas_latency, 3);
/// assert_eq!(config.controller.profile, BurstProfile::Extended);
/// assert_eq!(config.max_burst(), 16);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Device timing parameters
    #[serde(default)]
    pub timing: TimingConfig,
    /// Device organization
    #[serde(default)]
    pub geometry: GeometryConfig,
    /// Controller options
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and [`ConfigError::Invalid`] when
    /// validation fails.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`Config::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Device geometry described by the `geometry` section.
    pub const fn geometry(&self) -> Geometry {
        Geometry::new(
            self.geometry.bank_bits,
            self.geometry.row_bits,
            self.geometry.column_bits,
        )
    }

    /// Largest client burst the active profile accepts.
    pub const fn max_burst(&self) -> u16 {
        match self.controller.profile {
            BurstProfile::Baseline => 1,
            BurstProfile::Extended => self.controller.max_burst,
        }
    }

    /// Checks that the sequencer can honor the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        let nonzero = [
            ("clock_period_ps", t.clock_period_ps),
            ("t_rcd", t.t_rcd),
            ("t_rc", t.t_rc),
            ("t_rp", t.t_rp),
            ("t_mrd", t.t_mrd),
            ("t_ras", t.t_ras),
            ("t_wr", t.t_wr),
            ("refresh_interval", t.refresh_interval),
        ];
        if let Some((name, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(format!("timing.{name} must be at least one cycle")));
        }
        if !(1..=3).contains(&t.cas_latency) {
            return Err(invalid(format!(
                "timing.cas_latency {} outside the supported 1..=3",
                t.cas_latency
            )));
        }
        if t.refresh_interval <= t.t_rc {
            return Err(invalid(format!(
                "timing.refresh_interval {} must exceed t_rc {}",
                t.refresh_interval, t.t_rc
            )));
        }

        let g = &self.geometry;
        if g.bank_bits == 0 || g.bank_bits > 2 {
            return Err(invalid(format!("geometry.bank_bits {} outside 1..=2", g.bank_bits)));
        }
        if g.row_bits == 0 || g.row_bits > ADDRESS_PINS {
            return Err(invalid(format!(
                "geometry.row_bits {} outside 1..={ADDRESS_PINS}",
                g.row_bits
            )));
        }
        // A10 is reserved for auto-precharge during column commands.
        if g.column_bits == 0 || g.column_bits > 10 {
            return Err(invalid(format!(
                "geometry.column_bits {} outside 1..=10",
                g.column_bits
            )));
        }

        let c = &self.controller;
        let min_depth = t.t_rcd as usize + 2;
        if c.pipeline_depth < min_depth {
            return Err(invalid(format!(
                "controller.pipeline_depth {} below t_rcd + 2 = {min_depth}",
                c.pipeline_depth
            )));
        }
        if c.max_burst == 0 || c.max_burst > MAX_BURST_COUNT {
            return Err(invalid(format!(
                "controller.max_burst {} outside 1..={MAX_BURST_COUNT}",
                c.max_burst
            )));
        }
        if u32::from(c.max_burst) > self.geometry().columns() {
            return Err(invalid(format!(
                "controller.max_burst {} longer than a row",
                c.max_burst
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

/// Device timing parameters, in clock cycles unless noted.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Clock period in picoseconds (reporting only)
    #[serde(default = "TimingConfig::default_clock_period_ps")]
    pub clock_period_ps: u32,

    /// NOP cycles after reset before the first command
    #[serde(default = "TimingConfig::default_power_on_delay")]
    pub power_on_delay: u32,

    /// READ to first data (CAS latency)
    #[serde(default = "TimingConfig::default_cas_latency")]
    pub cas_latency: u32,

    /// ACTIVATE to READ/WRITE
    #[serde(default = "TimingConfig::default_t_rcd")]
    pub t_rcd: u32,

    /// Row cycle time (ACTIVATE/REFRESH to ACTIVATE/REFRESH)
    #[serde(default = "TimingConfig::default_t_rc")]
    pub t_rc: u32,

    /// PRECHARGE to ACTIVATE
    #[serde(default = "TimingConfig::default_t_rp")]
    pub t_rp: u32,

    /// MODE SET to next command
    #[serde(default = "TimingConfig::default_t_mrd")]
    pub t_mrd: u32,

    /// ACTIVATE to PRECHARGE minimum
    #[serde(default = "TimingConfig::default_t_ras")]
    pub t_ras: u32,

    /// Last WRITE to PRECHARGE
    #[serde(default = "TimingConfig::default_t_wr")]
    pub t_wr: u32,

    /// Refresh timer reload value
    #[serde(default = "TimingConfig::default_refresh_interval")]
    pub refresh_interval: u32,

    /// Overdue cycles before a deadline risk is reported
    #[serde(default = "TimingConfig::default_refresh_slack")]
    pub refresh_slack: u32,
}

impl TimingConfig {
    fn default_clock_period_ps() -> u32 {
        defaults::CLOCK_PERIOD_PS
    }

    fn default_power_on_delay() -> u32 {
        defaults::POWER_ON_DELAY
    }

    fn default_cas_latency() -> u32 {
        defaults::CAS_LATENCY
    }

    fn default_t_rcd() -> u32 {
        defaults::T_RCD
    }

    fn default_t_rc() -> u32 {
        defaults::T_RC
    }

    fn default_t_rp() -> u32 {
        defaults::T_RP
    }

    fn default_t_mrd() -> u32 {
        defaults::T_MRD
    }

    fn default_t_ras() -> u32 {
        defaults::T_RAS
    }

    fn default_t_wr() -> u32 {
        defaults::T_WR
    }

    fn default_refresh_interval() -> u32 {
        defaults::REFRESH_INTERVAL
    }

    fn default_refresh_slack() -> u32 {
        defaults::REFRESH_SLACK
    }
}

impl Default for TimingConfig {
    /// The reference 166 MHz profile.
    fn default() -> Self {
        Self {
            clock_period_ps: defaults::CLOCK_PERIOD_PS,
            power_on_delay: defaults::POWER_ON_DELAY,
            cas_latency: defaults::CAS_LATENCY,
            t_rcd: defaults::T_RCD,
            t_rc: defaults::T_RC,
            t_rp: defaults::T_RP,
            t_mrd: defaults::T_MRD,
            t_ras: defaults::T_RAS,
            t_wr: defaults::T_WR,
            refresh_interval: defaults::REFRESH_INTERVAL,
            refresh_slack: defaults::REFRESH_SLACK,
        }
    }
}

/// Device organization.
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    /// Bank-select bits
    #[serde(default = "GeometryConfig::default_bank_bits")]
    pub bank_bits: u32,

    /// Row address bits
    #[serde(default = "GeometryConfig::default_row_bits")]
    pub row_bits: u32,

    /// Column address bits
    #[serde(default = "GeometryConfig::default_column_bits")]
    pub column_bits: u32,
}

impl GeometryConfig {
    fn default_bank_bits() -> u32 {
        defaults::BANK_BITS
    }

    fn default_row_bits() -> u32 {
        defaults::ROW_BITS
    }

    fn default_column_bits() -> u32 {
        defaults::COLUMN_BITS
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            bank_bits: defaults::BANK_BITS,
            row_bits: defaults::ROW_BITS,
            column_bits: defaults::COLUMN_BITS,
        }
    }
}

/// Controller options.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Client burst support
    #[serde(default)]
    pub profile: BurstProfile,

    /// Largest accepted burst under the extended profile
    #[serde(default = "ControllerConfig::default_max_burst")]
    pub max_burst: u16,

    /// Write-data pipeline slot count (one slot is never filled)
    #[serde(default = "ControllerConfig::default_pipeline_depth")]
    pub pipeline_depth: usize,
}

impl ControllerConfig {
    fn default_max_burst() -> u16 {
        defaults::MAX_BURST
    }

    fn default_pipeline_depth() -> usize {
        defaults::PIPELINE_DEPTH
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            profile: BurstProfile::default(),
            max_burst: defaults::MAX_BURST,
            pipeline_depth: defaults::PIPELINE_DEPTH,
        }
    }
}
