//! Immutable device timing profile.
//!
//! A [`DeviceTimingProfile`] is derived once from [`TimingConfig`] and never mutated. All
//! separations are in controller clock cycles.

use crate::common::Tick;
use crate::config::TimingConfig;

/// Datasheet timing, in cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceTimingProfile {
    /// Clock period in picoseconds.
    pub clock_period_ps: u32,
    /// NOP cycles required after reset.
    pub power_on_delay: u32,
    /// READ to first data.
    pub cas_latency: u32,
    /// ACTIVATE to READ/WRITE.
    pub t_rcd: u32,
    /// ACTIVATE/REFRESH to ACTIVATE/REFRESH.
    pub t_rc: u32,
    /// PRECHARGE to ACTIVATE.
    pub t_rp: u32,
    /// MODE SET to next command.
    pub t_mrd: u32,
    /// ACTIVATE to PRECHARGE.
    pub t_ras: u32,
    /// Last WRITE to PRECHARGE.
    pub t_wr: u32,
    /// Refresh timer reload value.
    pub refresh_interval: u32,
    /// Overdue cycles before a deadline risk is reported.
    pub refresh_slack: u32,
}

impl DeviceTimingProfile {
    /// Builds the profile from the `timing` configuration section.
    pub const fn from_config(config: &TimingConfig) -> Self {
        Self {
            clock_period_ps: config.clock_period_ps,
            power_on_delay: config.power_on_delay,
            cas_latency: config.cas_latency,
            t_rcd: config.t_rcd,
            t_rc: config.t_rc,
            t_rp: config.t_rp,
            t_mrd: config.t_mrd,
            t_ras: config.t_ras,
            t_wr: config.t_wr,
            refresh_interval: config.refresh_interval,
            refresh_slack: config.refresh_slack,
        }
    }

    /// Tick at which the reset sequence hands over to `Idle`.
    ///
    /// Power-on wait, PRECHARGE-all (tRP), two AUTO REFRESH (tRC each), MODE SET (tMRD).
    pub const fn init_ticks(&self) -> Tick {
        self.power_on_delay as Tick
            + self.t_rp as Tick
            + 2 * self.t_rc as Tick
            + self.t_mrd as Tick
    }

    /// Converts a cycle count to nanoseconds at this profile's clock.
    pub fn cycles_to_ns(&self, cycles: u64) -> f64 {
        cycles as f64 * f64::from(self.clock_period_ps) / 1000.0
    }
}

impl Default for DeviceTimingProfile {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}
