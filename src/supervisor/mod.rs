mod liveness;
mod process;

pub use liveness::{LivenessReader, LivenessSender, NullSender};
#[cfg(test)]
pub use liveness::{memory_pair, MemoryReader, MemorySender};
#[cfg(unix)]
pub use liveness::{FifoReader, FifoSender};
pub use process::{ProgramLauncher, ProgramSpec, SpawnLauncher};

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::{IDLE_TIMEOUT_SECS, POLL_INTERVAL_SECS};

/// Where the supervisor is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// A display program is up and being watched
    Running,
    /// Mid-failover: the old program is gone, the next one is starting
    Switching,
}

/// Process-level control loop: keeps exactly one display program alive,
/// and rotates to the next one after a stretch with no liveness signals.
///
/// Presence of activity never forces a switch; only its sustained absence
/// does.
pub struct Supervisor<L: ProgramLauncher, R: LivenessReader> {
    launcher: L,
    reader: R,
    rotation: Vec<ProgramSpec>,
    current: usize,
    handle: Option<L::Handle>,
    phase: Phase,
    last_activity: Instant,
    timeout: Duration,
    poll_interval: Duration,
    switches: u64,
}

impl<L: ProgramLauncher, R: LivenessReader> Supervisor<L, R> {
    pub fn new(launcher: L, reader: R, rotation: Vec<ProgramSpec>) -> Self {
        assert!(!rotation.is_empty(), "rotation must list at least one program");
        Self {
            launcher,
            reader,
            rotation,
            current: 0,
            handle: None,
            phase: Phase::Running,
            last_activity: Instant::now(),
            timeout: Duration::from_secs(IDLE_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            switches: 0,
        }
    }

    /// Launch the first program of the rotation
    pub fn start(&mut self, now: Instant) -> Result<()> {
        let program = self.rotation[self.current].clone();
        self.handle = Some(self.launcher.launch(&program)?);
        self.last_activity = now;
        log::info!("supervisor running program 0 ({})", program.name);
        Ok(())
    }

    /// One poll cycle: drain the liveness channel, then switch if the idle
    /// timeout has elapsed. Split from `run` so the timeout law is testable
    /// with fabricated instants.
    pub fn step(&mut self, now: Instant) {
        if let Some(handle) = self.handle.as_mut() {
            if !self.launcher.is_alive(handle) {
                // the idle timeout will bring up the next program
                log::warn!(
                    "{} exited on its own",
                    self.rotation[self.current].name
                );
            }
        }

        if self.reader.drain() {
            log::debug!("activity signal received");
            self.last_activity = now;
        }

        let idle = now.duration_since(self.last_activity);
        log::trace!("{:?}, idle for {:.0?}", self.phase, idle);
        if idle > self.timeout {
            log::info!(
                "no activity for {:.0?}, rotating away from {}",
                idle,
                self.rotation[self.current].name
            );
            self.switch(now);
        }
    }

    /// Terminate the current program, advance the rotation, launch the
    /// next. Termination is synchronous; a failed launch is logged and
    /// left for the next timeout to retry.
    fn switch(&mut self, now: Instant) {
        self.phase = Phase::Switching;

        if let Some(mut handle) = self.handle.take() {
            if let Err(err) = self.launcher.terminate(&mut handle) {
                log::error!("terminating current program failed: {:#}", err);
            }
        }

        self.current = (self.current + 1) % self.rotation.len();
        let program = self.rotation[self.current].clone();
        match self.launcher.launch(&program) {
            Ok(handle) => {
                self.handle = Some(handle);
                log::info!(
                    "supervisor running program {} ({})",
                    self.current,
                    program.name
                );
            }
            Err(err) => {
                // fatal to this cycle only; the next timeout tries again
                log::error!("launching {} failed: {:#}", program.name, err);
            }
        }

        self.switches += 1;
        log::debug!("{} rotation switches so far", self.switches);
        self.last_activity = now;
        self.phase = Phase::Running;
    }

    /// Run forever, one bounded poll per cycle
    pub fn run(&mut self) -> Result<()> {
        self.start(Instant::now())?;
        loop {
            std::thread::sleep(self.poll_interval);
            self.step(Instant::now());
        }
    }
}
