use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::Rng;

use crate::config::{MOVEMENT_THRESHOLD, TICK_INTERVAL_MS};
use crate::simulation::{CellAutomaton, Frame, Grid, MotionMask};
use crate::supervisor::LivenessSender;

/// Capture collaborator: hands the session one frame per tick, already
/// reduced to the wall's cell resolution. `None` means no frame is
/// available right now; the session skips that tick.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Render collaborator: shown the grid read-only once per tick. The
/// session never waits on it.
pub trait WallRenderer {
    fn present(&mut self, grid: &Grid);
}

/// Renderer that discards everything, for headless runs and tests
pub struct NullRenderer;

impl WallRenderer for NullRenderer {
    fn present(&mut self, _grid: &Grid) {}
}

/// Terminal stand-in for the physical wall: one true-color block per cell
pub struct AnsiRenderer<W: Write> {
    out: W,
}

impl AnsiRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> WallRenderer for AnsiRenderer<W> {
    fn present(&mut self, grid: &Grid) {
        let mut buf = String::with_capacity((grid.width() * grid.height() * 20) as usize);
        buf.push_str("\x1b[H");
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let c = grid.cell(x, y).color;
                buf.push_str(&format!("\x1b[48;2;{};{};{}m  ", c.r, c.g, c.b));
            }
            buf.push_str("\x1b[0m\n");
        }
        if self.out.write_all(buf.as_bytes()).is_err() {
            log::warn!("renderer write failed, frame dropped");
        }
        let _ = self.out.flush();
    }
}

/// Stand-in capture source: a bright blob wandering over a dark frame,
/// enough to exercise every effect without a camera.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    x: u32,
    y: u32,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: width / 2,
            y: height / 2,
        }
    }

    fn step<R: Rng>(&mut self, rng: &mut R) {
        let dx: i64 = rng.gen_range(-1..=1);
        let dy: i64 = rng.gen_range(-1..=1);
        self.x = (self.x as i64 + dx).clamp(0, self.width as i64 - 1) as u32;
        self.y = (self.y as i64 + dy).clamp(0, self.height as i64 - 1) as u32;
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.step(&mut rand::thread_rng());
        let mut frame = Frame::dark(self.width, self.height);
        *frame.sample_mut(self.x, self.y) = 255;
        Some(frame)
    }
}

/// One running visual program: frame in, tick, liveness pulse out, render.
///
/// Owns the automaton and the frame pair; runs single-threaded, one tick
/// per arriving frame.
pub struct DisplaySession<S: FrameSource, R: WallRenderer> {
    source: S,
    renderer: R,
    automaton: CellAutomaton,
    liveness: Box<dyn LivenessSender>,
    prev_frame: Option<Frame>,
    threshold: u8,
    ticks: u64,
}

impl<S: FrameSource, R: WallRenderer> DisplaySession<S, R> {
    pub fn new(
        source: S,
        renderer: R,
        automaton: CellAutomaton,
        liveness: Box<dyn LivenessSender>,
    ) -> Self {
        Self {
            source,
            renderer,
            automaton,
            liveness,
            prev_frame: None,
            threshold: MOVEMENT_THRESHOLD,
            ticks: 0,
        }
    }

    /// Run one tick if a frame is available. Returns whether a tick ran.
    pub fn tick(&mut self) -> bool {
        let Some(frame) = self.source.next_frame() else {
            // input starvation: hold state, no mask update, not fatal
            log::warn!("no frame available, skipping tick");
            return false;
        };

        let mask = match &self.prev_frame {
            Some(prev) => MotionMask::between(prev, &frame, self.threshold),
            None => MotionMask::quiet(frame.width(), frame.height()),
        };

        let report = self.automaton.tick(&mask);
        if report.movement {
            log::debug!("movement detected");
            self.liveness.pulse();
        }

        self.renderer.present(self.automaton.grid());
        self.prev_frame = Some(frame);
        self.ticks += 1;
        true
    }

    /// Tick at the capture cadence until the process is told to stop
    pub fn run(&mut self) -> Result<()> {
        let interval = Duration::from_millis(TICK_INTERVAL_MS);
        log::info!(
            "display session up: {} effect, {}x{} wall",
            self.automaton.kind().name(),
            self.automaton.grid().width(),
            self.automaton.grid().height()
        );
        loop {
            let started = Instant::now();
            self.tick();
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}
