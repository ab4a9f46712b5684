use sdrsim_core::Simulator;
use sdrsim_core::common::{ControllerError, Tick, WordAddr};
use sdrsim_core::config::{BurstProfile, Config};
use sdrsim_core::controller::{ClientPort, CommandSequencer, DeviceTimingProfile, TickOutput};
use sdrsim_core::sdram::Command;

use crate::common::mocks::sdram::MockSdram;

/// Upper bound on ticks any helper waits before declaring the controller stuck.
const WAIT_LIMIT: u64 = 10_000;

/// Reference profile with a short power-on delay so tests reach `Idle` quickly.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.timing.power_on_delay = 20;
    config
}

/// [`test_config`] with multi-word bursts enabled.
pub fn extended_config() -> Config {
    let mut config = test_config();
    config.controller.profile = BurstProfile::Extended;
    config.controller.max_burst = 16;
    config
}

/// Result of a completed single-word read.
#[derive(Clone, Copy, Debug)]
pub struct ReadResult {
    pub accepted_at: Tick,
    pub valid_at: Tick,
    pub data: u16,
}

pub struct TestContext {
    pub sim: Simulator<MockSdram>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(&test_config())
    }
}

impl TestContext {
    pub fn new(config: &Config) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let timing = DeviceTimingProfile::from_config(&config.timing);
        let device = MockSdram::new(timing, config.geometry().banks());
        let sim = Simulator::new(config, device).expect("test config must validate");
        Self { sim }
    }

    /// A context that has already finished the reset sequence.
    pub fn initialized(config: &Config) -> Self {
        let mut ctx = Self::new(config);
        let _ = ctx.sim.run_until_initialized().expect("initialization");
        ctx
    }

    pub fn ctrl(&self) -> &CommandSequencer {
        &self.sim.controller
    }

    pub fn device(&self) -> &MockSdram {
        &self.sim.device
    }

    pub fn now(&self) -> Tick {
        self.sim.now()
    }

    pub fn try_step(&mut self, port: &ClientPort) -> Result<TickOutput, ControllerError> {
        self.sim.tick(port)
    }

    pub fn step(&mut self, port: &ClientPort) -> TickOutput {
        self.sim.tick(port).expect("tick failed")
    }

    pub fn idle(&mut self) -> TickOutput {
        self.step(&ClientPort::idle())
    }

    pub fn run_idle(&mut self, ticks: u64) -> Vec<TickOutput> {
        (0..ticks).map(|_| self.idle()).collect()
    }

    /// Ticks idle until `waitrequest` is low for the coming tick.
    pub fn wait_ready(&mut self) -> Tick {
        for _ in 0..WAIT_LIMIT {
            if !self.ctrl().waitrequest() {
                return self.now();
            }
            let _ = self.idle();
        }
        panic!("controller stuck with waitrequest high at tick {}", self.now());
    }

    /// Holds `port` every tick until the controller takes it; returns the accepting tick.
    pub fn submit(&mut self, port: &ClientPort) -> Tick {
        for _ in 0..WAIT_LIMIT {
            let out = self.step(port);
            if out.accepted {
                return out.tick;
            }
        }
        panic!("request never accepted: {port:?}");
    }

    pub fn write_word(&mut self, addr: u32, data: u16, byteenable: u8) -> Tick {
        let port = ClientPort::write(WordAddr(addr), data).with_byteenable(byteenable);
        self.submit(&port)
    }

    /// Submits a read and waits for its single data word.
    pub fn read_word(&mut self, addr: u32) -> ReadResult {
        let accepted_at = self.submit(&ClientPort::read(WordAddr(addr)));
        for _ in 0..WAIT_LIMIT {
            let out = self.idle();
            if out.client.readdatavalid {
                return ReadResult {
                    accepted_at,
                    valid_at: out.tick,
                    data: out.client.readdata,
                };
            }
        }
        panic!("read of {addr:#x} never returned data");
    }

    /// Ticks idle until no transaction is in flight and the controller is back in `Idle`.
    pub fn drain(&mut self) {
        let _ = self.wait_ready();
    }

    /// Non-NOP commands the device latched, with their ticks.
    pub fn commands(&self) -> Vec<(Tick, Command)> {
        self.device().commands().collect()
    }

    /// Ticks at which `command` was latched.
    pub fn ticks_of(&self, command: Command) -> Vec<Tick> {
        self.device()
            .commands()
            .filter(|(_, c)| *c == command)
            .map(|(t, _)| t)
            .collect()
    }
}
