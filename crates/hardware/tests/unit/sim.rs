//! # Simulator Tests
//!
//! Tests for the controller/device pairing: clocking order, bus-conflict
//! detection, missing read data, and long idle soaks.

use pretty_assertions::assert_eq;

use sdrsim_core::Simulator;
use sdrsim_core::common::{ControllerError, WordAddr};
use sdrsim_core::config::ConfigError;
use sdrsim_core::controller::ClientPort;
use sdrsim_core::sdram::{Command, DevicePins, FloatingBus, SdramDevice};

use crate::common::harness::{TestContext, test_config};

/// A broken device that drives DQ on every cycle.
#[derive(Debug, Default)]
struct StuckDriver {
    clocked: u64,
}

impl SdramDevice for StuckDriver {
    fn name(&self) -> &str {
        "stuck-driver"
    }

    fn drive(&self) -> Option<u16> {
        Some(0xdead)
    }

    fn clock(&mut self, _pins: &DevicePins) {
        self.clocked += 1;
    }
}

#[test]
fn test_run_until_initialized_reports_ready_tick() {
    let mut sim = Simulator::new(&test_config(), FloatingBus).unwrap();
    assert_eq!(sim.run_until_initialized().unwrap(), 45);
    assert_eq!(sim.now(), 45);
    assert!(sim.controller.is_initialized());
}

#[test]
fn test_idle_soak_refreshes_on_schedule() {
    let mut sim = Simulator::new(&test_config(), FloatingBus).unwrap();
    sim.run_idle(5_000).unwrap();

    let stats = &sim.controller.stats;
    assert_eq!(stats.ticks, 5_000);
    assert_eq!(stats.refreshes, 6);
    assert_eq!(stats.command_count(Command::AutoRefresh), 8);
    assert_eq!(stats.max_refresh_gap, 780);
    assert_eq!(stats.deadline_risks, 0);
    assert_eq!(stats.init_done_tick, Some(45));
}

#[test]
fn test_device_sees_every_controller_command() {
    let mut ctx = TestContext::initialized(&test_config());
    let _ = ctx.write_word(0x55, 0x9999, 0b11);
    ctx.drain();
    let issued = ctx.ctrl().stats.cmd_activate
        + ctx.ctrl().stats.cmd_write
        + ctx.ctrl().stats.cmd_precharge
        + ctx.ctrl().stats.cmd_auto_refresh
        + ctx.ctrl().stats.cmd_mode_set;
    assert_eq!(ctx.device().log.len() as u64, issued);
}

#[test]
fn test_bus_conflict_is_detected() {
    let mut sim = Simulator::new(&test_config(), StuckDriver::default()).unwrap();
    let _ = sim.run_until_initialized().unwrap();

    let port = ClientPort::write(WordAddr(0x20), 0x1234);
    let first = sim.tick(&port).unwrap();
    assert!(first.accepted);
    assert_eq!(first.tick, 45);

    let idle = ClientPort::idle();
    let _ = sim.tick(&idle).unwrap();
    let _ = sim.tick(&idle).unwrap();
    let err = sim.tick(&idle).unwrap_err();
    assert_eq!(err, ControllerError::BusConflict { tick: 48 });
    assert!(!err.is_caller_misuse());
    // The device is not clocked on the conflicting tick.
    assert_eq!(sim.device.clocked, 48);
}

#[test]
fn test_floating_bus_read_reports_missing_data() {
    let mut sim = Simulator::new(&test_config(), FloatingBus).unwrap();
    let _ = sim.run_until_initialized().unwrap();

    assert!(sim.tick(&ClientPort::read(WordAddr(0x20))).unwrap().accepted);
    for _ in 46..51 {
        let out = sim.tick(&ClientPort::idle()).unwrap();
        assert!(!out.client.readdatavalid);
    }
    let err = sim.tick(&ClientPort::idle()).unwrap_err();
    assert_eq!(err, ControllerError::MissingReadData { tick: 51 });
    assert_eq!(sim.now(), 51);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = test_config();
    config.controller.pipeline_depth = 2;
    let err = Simulator::new(&config, FloatingBus).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_floating_bus_is_silent() {
    let mut bus = FloatingBus;
    assert_eq!(bus.name(), "floating");
    bus.clock(&DevicePins::auto_refresh());
    assert_eq!(bus.drive(), None);
}
