#[cfg(test)]
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

/// Writer half of the liveness channel. Best-effort: a pulse that cannot
/// be delivered (no reader, full channel) is dropped silently.
pub trait LivenessSender {
    fn pulse(&mut self);
}

/// Reader half of the liveness channel. Non-blocking: returns true if at
/// least one pulse arrived since the last drain. No data is not an error.
pub trait LivenessReader {
    fn drain(&mut self) -> bool;
}

/// A sender that goes nowhere, for sessions run without a supervisor
#[allow(dead_code)]
pub struct NullSender;

impl LivenessSender for NullSender {
    fn pulse(&mut self) {}
}

fn record() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}\n", secs)
}

/// Liveness over a named pipe, the writer side. The FIFO is created by the
/// reader; the writer just opens it non-blocking per pulse so a missing or
/// readerless pipe costs nothing.
#[cfg(unix)]
pub struct FifoSender {
    path: PathBuf,
}

#[cfg(unix)]
impl FifoSender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(unix)]
impl LivenessSender for FifoSender {
    fn pulse(&mut self) {
        use std::os::unix::fs::OpenOptionsExt;

        // ENXIO here means nobody is listening, which is fine
        let opened = std::fs::OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path);
        match opened {
            Ok(mut pipe) => {
                if let Err(err) = pipe.write_all(record().as_bytes()) {
                    log::debug!("liveness pulse dropped: {}", err);
                }
            }
            Err(err) => {
                log::debug!("liveness channel closed ({}), pulse dropped", err);
            }
        }
    }
}

/// Liveness over a named pipe, the reader side. Creating the reader makes
/// the FIFO; dropping it removes the file.
#[cfg(unix)]
pub struct FifoReader {
    path: PathBuf,
    pipe: std::fs::File,
}

#[cfg(unix)]
impl FifoReader {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;
        use std::os::unix::fs::OpenOptionsExt;

        let path = path.into();
        let _ = std::fs::remove_file(&path);

        let cpath = CString::new(path.as_os_str().as_bytes())
            .context("liveness pipe path contains a NUL byte")?;
        // mkfifo, readable and writable by everyone like the wall sessions expect
        let rc = unsafe { libc::mkfifo(cpath.as_ptr(), 0o666) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("mkfifo {} failed", path.display()));
        }

        let pipe = std::fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .with_context(|| format!("opening liveness pipe {}", path.display()))?;

        log::info!("liveness pipe ready at {}", path.display());
        Ok(Self { path, pipe })
    }
}

#[cfg(unix)]
impl LivenessReader for FifoReader {
    fn drain(&mut self) -> bool {
        let mut buffer = [0u8; 1024];
        let mut seen = false;
        loop {
            match self.pipe.read(&mut buffer) {
                Ok(0) => break,
                Ok(_) => seen = true,
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => {
                    log::warn!("liveness read failed: {}", err);
                    break;
                }
            }
        }
        seen
    }
}

#[cfg(unix)]
impl Drop for FifoReader {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// In-process channel pair with a bounded queue, same drop-on-full
/// contract as the pipe
#[cfg(test)]
pub fn memory_pair(capacity: usize) -> (MemorySender, MemoryReader) {
    let queue = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));
    (
        MemorySender {
            queue: queue.clone(),
            capacity,
        },
        MemoryReader { queue },
    )
}

#[cfg(test)]
pub struct MemorySender {
    queue: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

#[cfg(test)]
pub struct MemoryReader {
    queue: Arc<Mutex<VecDeque<String>>>,
}

#[cfg(test)]
impl LivenessSender for MemorySender {
    fn pulse(&mut self) {
        let mut queue = match self.queue.lock() {
            Ok(queue) => queue,
            Err(_) => return,
        };
        if queue.len() >= self.capacity {
            // drop-on-full, same contract as the pipe
            return;
        }
        queue.push_back(record());
    }
}

#[cfg(test)]
impl LivenessReader for MemoryReader {
    fn drain(&mut self) -> bool {
        match self.queue.lock() {
            Ok(mut queue) => {
                let seen = !queue.is_empty();
                queue.clear();
                seen
            }
            Err(_) => false,
        }
    }
}
