//! Refresh scheduler.
//!
//! A saturating countdown reloaded on every AUTO REFRESH. Its one output is the "refresh due"
//! flag read by the sequencer in `Idle`. On top of the bare timer it keeps the bookkeeping needed
//! to report a missed deadline: how long the refresh has been overdue and the longest gap seen
//! between two refreshes.

use tracing::warn;

use crate::common::{DeadlineRisk, Tick};

/// Countdown to the next required AUTO REFRESH.
#[derive(Clone, Debug)]
pub struct RefreshScheduler {
    interval: u32,
    slack: u32,
    remaining: u32,
    /// Tick the counter reached zero, while a refresh is outstanding.
    due_since: Option<Tick>,
    /// The current overdue stretch has already been reported.
    reported: bool,
    last_refresh: Option<Tick>,
    max_gap: u64,
}

impl RefreshScheduler {
    /// Creates a scheduler that is due `interval` ticks from now.
    ///
    /// # Arguments
    ///
    /// * `interval` - Reload value, in ticks.
    /// * `slack` - Overdue ticks tolerated before a [`DeadlineRisk`] is reported.
    pub fn new(interval: u32, slack: u32) -> Self {
        Self {
            interval,
            slack,
            remaining: interval,
            due_since: None,
            reported: false,
            last_refresh: None,
            max_gap: 0,
        }
    }

    /// Reload value in ticks.
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Ticks left, after the current one, before the refresh becomes due.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The "refresh due" flag.
    pub const fn due(&self) -> bool {
        self.remaining == 0
    }

    /// Longest observed distance between two consecutive refreshes.
    pub const fn max_gap(&self) -> u64 {
        self.max_gap
    }

    /// Tick of the most recent AUTO REFRESH.
    pub const fn last_refresh(&self) -> Option<Tick> {
        self.last_refresh
    }

    /// Ticks the outstanding refresh has been overdue, as of `now`.
    pub fn overdue(&self, now: Tick) -> u64 {
        self.due_since.map_or(0, |since| now.saturating_sub(since))
    }

    /// Reloads the counter; called on every AUTO REFRESH issued at `now`.
    pub fn reload(&mut self, now: Tick) {
        if let Some(prev) = self.last_refresh {
            self.max_gap = self.max_gap.max(now - prev);
        }
        self.last_refresh = Some(now);
        // Due again exactly `interval` ticks after this refresh.
        self.remaining = self.interval.saturating_sub(1);
        self.due_since = (self.remaining == 0).then_some(now + 1);
        self.reported = false;
    }

    /// Advances the counter by one tick ending at `now`.
    ///
    /// The counter stays parked until the first [`reload`](Self::reload), so the power-on wait
    /// does not count against the refresh deadline. Returns a [`DeadlineRisk`] the first time the
    /// outstanding refresh has been overdue for more than the configured slack.
    pub fn tick(&mut self, now: Tick) -> Option<DeadlineRisk> {
        if self.last_refresh.is_none() {
            return None;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.due_since = Some(now + 1);
            }
            return None;
        }

        let overdue = self.overdue(now);
        if self.reported || overdue <= u64::from(self.slack) {
            return None;
        }
        self.reported = true;
        let risk = DeadlineRisk {
            due_since: self.due_since.unwrap_or(now),
            overdue,
        };
        warn!(
            due_since = risk.due_since,
            overdue = risk.overdue,
            slack = self.slack,
            "refresh deadline at risk"
        );
        Some(risk)
    }
}
