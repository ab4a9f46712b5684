//! SDR SDRAM controller model CLI.
//!
//! This binary inspects and exercises the controller model. It performs:
//! 1. **Profile:** Print the timing profile, address split and mode-register word of a configuration.
//! 2. **Soak:** Run the controller with no client traffic and report initialization and refresh cadence.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sdrsim_core::config::Config;
use sdrsim_core::controller::DeviceTimingProfile;
use sdrsim_core::sdram::{FloatingBus, ModeRegister};
use sdrsim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "sdrsim",
    author,
    version,
    about = "Cycle-accurate SDR SDRAM controller model",
    long_about = "Inspect a controller configuration or soak the command sequencer.\n\nConfiguration is JSON (timing, geometry, controller sections); every field is optional.\n\nExamples:\n  sdrsim profile --config part.json\n  sdrsim soak --ticks 200000 --stats refresh"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every issued device command (sets the default filter to `debug`; RUST_LOG overrides).
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the derived timing profile, address split and mode-register word.
    Profile {
        /// JSON configuration file; built-in reference profile when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Run with no client traffic against a floating bus and print statistics.
    Soak {
        /// JSON configuration file; built-in reference profile when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ticks to simulate.
        #[arg(short, long, default_value_t = 100_000)]
        ticks: u64,

        /// Statistics sections to print (summary, commands, client, refresh); all when omitted.
        #[arg(long, num_args = 1..)]
        stats: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    match cli.command {
        Commands::Profile { config, json } => cmd_profile(&load_config(config), json),
        Commands::Soak {
            config,
            ticks,
            stats,
        } => cmd_soak(&load_config(config), ticks, &stats),
    }
}

fn init_tracing(trace: bool) {
    let default = if trace { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads and validates the configuration, exiting with code 2 on failure.
fn load_config(path: Option<PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match Config::from_file(&path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %path.display(), "{e}");
            process::exit(2);
        }
    }
}

/// Prints the timing profile, address split and mode-register word.
fn cmd_profile(config: &Config, as_json: bool) {
    let timing = DeviceTimingProfile::from_config(&config.timing);
    let geometry = config.geometry();
    let mode = ModeRegister::single_word(timing.cas_latency as u8);

    if as_json {
        let doc = json!({
            "timing": {
                "clock_period_ps": timing.clock_period_ps,
                "power_on_delay": timing.power_on_delay,
                "cas_latency": timing.cas_latency,
                "t_rcd": timing.t_rcd,
                "t_rc": timing.t_rc,
                "t_rp": timing.t_rp,
                "t_mrd": timing.t_mrd,
                "t_ras": timing.t_ras,
                "t_wr": timing.t_wr,
                "refresh_interval": timing.refresh_interval,
                "refresh_slack": timing.refresh_slack,
                "init_ticks": timing.init_ticks(),
            },
            "geometry": {
                "banks": geometry.banks(),
                "bank_bits": geometry.bank_bits(),
                "row_bits": geometry.row_bits(),
                "column_bits": geometry.column_bits(),
                "address_bits": geometry.address_bits(),
            },
            "controller": {
                "max_burst": config.max_burst(),
                "pipeline_depth": config.controller.pipeline_depth,
            },
            "mode_register": format!("{:#06x}", mode.encode()),
        });
        match serde_json::to_string_pretty(&doc) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        }
        return;
    }

    let ns = |cycles: u32| timing.cycles_to_ns(u64::from(cycles));
    println!("TIMING PROFILE");
    println!(
        "  clock                  {} ps ({:.1} MHz)",
        timing.clock_period_ps,
        1_000_000.0 / f64::from(timing.clock_period_ps)
    );
    println!(
        "  power_on_delay         {} cycles ({:.1} us)",
        timing.power_on_delay,
        ns(timing.power_on_delay) / 1000.0
    );
    for (name, cycles) in [
        ("cas_latency", timing.cas_latency),
        ("t_rcd", timing.t_rcd),
        ("t_rc", timing.t_rc),
        ("t_rp", timing.t_rp),
        ("t_mrd", timing.t_mrd),
        ("t_ras", timing.t_ras),
        ("t_wr", timing.t_wr),
        ("refresh_interval", timing.refresh_interval),
        ("refresh_slack", timing.refresh_slack),
    ] {
        println!("  {name:<22} {cycles} cycles ({:.1} ns)", ns(cycles));
    }
    println!("  init_ticks             {}", timing.init_ticks());
    println!("ADDRESS SPLIT");
    println!(
        "  bank/row/column        {}/{}/{} bits ({} banks, {}-bit word address)",
        geometry.bank_bits(),
        geometry.row_bits(),
        geometry.column_bits(),
        geometry.banks(),
        geometry.address_bits()
    );
    println!("CONTROLLER");
    println!("  profile                {:?}", config.controller.profile);
    println!("  max_burst              {}", config.max_burst());
    println!("  pipeline_depth         {}", config.controller.pipeline_depth);
    println!("  mode_register          {:#06x}", mode.encode());
}

/// Soaks the controller against a floating bus for `ticks` cycles and prints statistics.
fn cmd_soak(config: &Config, ticks: u64, sections: &[String]) {
    let mut sim = match Simulator::new(config, FloatingBus) {
        Ok(sim) => sim,
        Err(e) => {
            error!("{e}");
            process::exit(2);
        }
    };

    info!(ticks, "soak started");
    if let Err(e) = sim.run_idle(ticks) {
        error!(tick = sim.now(), "{e}");
        sim.controller
            .stats
            .print_sections(sections, config.timing.clock_period_ps);
        process::exit(1);
    }
    sim.controller
        .stats
        .print_sections(sections, config.timing.clock_period_ps);
}
