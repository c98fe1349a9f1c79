use std::process::{Child, Command};

use anyhow::{Context, Result};

/// One launchable display program in the rotation.
#[derive(Clone, Debug)]
pub struct ProgramSpec {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
}

impl ProgramSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Capability to start and stop display programs. The supervisor only
/// talks to this trait; the concrete mechanism is swappable.
pub trait ProgramLauncher {
    type Handle;

    fn launch(&mut self, program: &ProgramSpec) -> Result<Self::Handle>;

    /// Stop the program and block until it has actually exited, so the
    /// next session never races it for the camera or the display.
    fn terminate(&mut self, handle: &mut Self::Handle) -> Result<()>;

    fn is_alive(&mut self, handle: &mut Self::Handle) -> bool;
}

/// Launcher over real OS processes.
pub struct SpawnLauncher;

impl ProgramLauncher for SpawnLauncher {
    type Handle = Child;

    fn launch(&mut self, program: &ProgramSpec) -> Result<Child> {
        let child = Command::new(&program.command)
            .args(&program.args)
            .spawn()
            .with_context(|| format!("launching {} ({})", program.name, program.command))?;
        log::info!("launched {} (pid {})", program.name, child.id());
        Ok(child)
    }

    fn terminate(&mut self, child: &mut Child) -> Result<()> {
        #[cfg(unix)]
        {
            // graceful first: SIGTERM, then reap
            let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
            if rc != 0 {
                log::warn!(
                    "SIGTERM to pid {} failed: {}",
                    child.id(),
                    std::io::Error::last_os_error()
                );
            }
        }
        #[cfg(not(unix))]
        {
            child.kill().context("killing display program")?;
        }

        let status = child.wait().context("waiting for display program to exit")?;
        log::info!("pid {} exited with {}", child.id(), status);
        Ok(())
    }

    fn is_alive(&mut self, child: &mut Child) -> bool {
        matches!(child.try_wait(), Ok(None))
    }
}
