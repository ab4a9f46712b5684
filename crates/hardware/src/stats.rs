//! Controller statistics collection and reporting.
//!
//! This module tracks what the controller did over a run. It provides:
//! 1. **Summary:** Ticks simulated, simulated time, and the tick initialization finished.
//! 2. **Commands:** Issue counts for every device command.
//! 3. **Client:** Accepted requests, words moved, backpressure and write-data stalls.
//! 4. **Refresh:** Refresh count, the longest gap between refreshes, and deadline risks.

use std::time::Instant;

use crate::common::Tick;
use crate::sdram::Command;

/// Controller statistics.
#[derive(Clone, Debug)]
pub struct ControllerStats {
    start_time: Instant,
    /// Ticks simulated.
    pub ticks: u64,
    /// Tick the sequencer first reached `Idle`.
    pub init_done_tick: Option<Tick>,

    /// NOP cycles.
    pub cmd_nop: u64,
    /// ACTIVATE commands.
    pub cmd_activate: u64,
    /// READ commands.
    pub cmd_read: u64,
    /// WRITE commands.
    pub cmd_write: u64,
    /// PRECHARGE commands (single bank and all banks).
    pub cmd_precharge: u64,
    /// AUTO REFRESH commands, including the two issued during initialization.
    pub cmd_auto_refresh: u64,
    /// MODE SET commands.
    pub cmd_mode_set: u64,
    /// BURST STOP commands.
    pub cmd_burst_stop: u64,

    /// Read transactions accepted.
    pub reads_accepted: u64,
    /// Write transactions accepted.
    pub writes_accepted: u64,
    /// Words returned with `readdatavalid`.
    pub words_read: u64,
    /// Write beats taken from the client, including the first word of each burst.
    pub words_written: u64,
    /// Ticks with `waitrequest` high.
    pub waitrequest_ticks: u64,
    /// Ticks a WRITE was due but the pipeline had no word ready.
    pub write_stall_ticks: u64,

    /// AUTO REFRESH commands issued after initialization.
    pub refreshes: u64,
    /// Longest distance between two consecutive AUTO REFRESH commands.
    pub max_refresh_gap: u64,
    /// Late refreshes reported as a deadline risk.
    pub deadline_risks: u64,
}

impl Default for ControllerStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            ticks: 0,
            init_done_tick: None,
            cmd_nop: 0,
            cmd_activate: 0,
            cmd_read: 0,
            cmd_write: 0,
            cmd_precharge: 0,
            cmd_auto_refresh: 0,
            cmd_mode_set: 0,
            cmd_burst_stop: 0,
            reads_accepted: 0,
            writes_accepted: 0,
            words_read: 0,
            words_written: 0,
            waitrequest_ticks: 0,
            write_stall_ticks: 0,
            refreshes: 0,
            max_refresh_gap: 0,
            deadline_risks: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "commands", "client", "refresh"];

impl ControllerStats {
    /// Counts one issued device command.
    pub fn record_command(&mut self, command: Command) {
        let counter = match command {
            Command::Nop => &mut self.cmd_nop,
            Command::BurstStop => &mut self.cmd_burst_stop,
            Command::Read => &mut self.cmd_read,
            Command::Write => &mut self.cmd_write,
            Command::Activate => &mut self.cmd_activate,
            Command::Precharge => &mut self.cmd_precharge,
            Command::AutoRefresh => &mut self.cmd_auto_refresh,
            Command::ModeSet => &mut self.cmd_mode_set,
        };
        *counter += 1;
    }

    /// Issue count for `command`.
    pub const fn command_count(&self, command: Command) -> u64 {
        match command {
            Command::Nop => self.cmd_nop,
            Command::BurstStop => self.cmd_burst_stop,
            Command::Read => self.cmd_read,
            Command::Write => self.cmd_write,
            Command::Activate => self.cmd_activate,
            Command::Precharge => self.cmd_precharge,
            Command::AutoRefresh => self.cmd_auto_refresh,
            Command::ModeSet => self.cmd_mode_set,
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Names from [`STATS_SECTIONS`], or empty for all.
    /// * `clock_period_ps` - Controller clock period, used for simulated-time figures.
    pub fn print_sections(&self, sections: &[String], clock_period_ps: u32) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let ticks = self.ticks.max(1) as f64;
        let pct = |n: u64| (n as f64 / ticks) * 100.0;
        let to_us = |cycles: u64| cycles as f64 * f64::from(clock_period_ps) / 1_000_000.0;

        if want("summary") {
            let khz = (self.ticks as f64 / seconds.max(f64::EPSILON)) / 1000.0;
            println!("\n==========================================================");
            println!("SDR SDRAM CONTROLLER STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {:.4} s", seconds);
            println!("sim_ticks                {}", self.ticks);
            println!("sim_time                 {:.3} us", to_us(self.ticks));
            println!("sim_freq                 {:.2} kHz", khz);
            match self.init_done_tick {
                Some(t) => println!("init_done                tick {} ({:.3} us)", t, to_us(t)),
                None => println!("init_done                pending"),
            }
            println!("----------------------------------------------------------");
        }
        if want("commands") {
            println!("DEVICE COMMANDS");
            for command in Command::ALL {
                let n = self.command_count(command);
                println!(
                    "  cmd.{:<18} {} ({:.2}%)",
                    command.mnemonic(),
                    n,
                    pct(n)
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("client") {
            println!("CLIENT PORT");
            println!("  req.read               {}", self.reads_accepted);
            println!("  req.write              {}", self.writes_accepted);
            println!("  words.read             {}", self.words_read);
            println!("  words.written          {}", self.words_written);
            println!(
                "  waitrequest            {} ({:.2}%)",
                self.waitrequest_ticks,
                pct(self.waitrequest_ticks)
            );
            println!(
                "  stalls.write_data      {} ({:.2}%)",
                self.write_stall_ticks,
                pct(self.write_stall_ticks)
            );
            println!("----------------------------------------------------------");
        }
        if want("refresh") {
            println!("REFRESH");
            println!("  refresh.count          {}", self.refreshes);
            println!(
                "  refresh.max_gap        {} ticks ({:.3} us)",
                self.max_refresh_gap,
                to_us(self.max_refresh_gap)
            );
            println!("  refresh.deadline_risk  {}", self.deadline_risks);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self, clock_period_ps: u32) {
        self.print_sections(&[], clock_period_ps);
    }
}
