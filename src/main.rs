mod activity;
mod config;
mod session;
mod simulation;
mod supervisor;

use anyhow::{bail, Context, Result};

use crate::activity::{GestureSelector, Selection, Side};
use crate::config::{GRID_HEIGHT, GRID_WIDTH, LIVENESS_PIPE_PATH, TICK_INTERVAL_MS};
use crate::session::{AnsiRenderer, DisplaySession, FrameSource, SyntheticSource, WallRenderer};
use crate::simulation::{CellAutomaton, EffectKind, MotionMask};
use crate::supervisor::{ProgramSpec, SpawnLauncher, Supervisor};

fn main() -> Result<()> {
    env_logger::init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "supervisor".into());
    match mode.as_str() {
        "supervisor" => run_supervisor(),
        "flash" => run_session(EffectKind::Flash),
        "ripple" => run_session(EffectKind::Ripple),
        "falling" => run_session(EffectKind::Falling),
        "select" => run_selection(),
        other => {
            bail!(
                "unknown mode '{}' (expected supervisor, flash, ripple, falling or select)",
                other
            );
        }
    }
}

/// Watch the liveness pipe and rotate through the display programs on
/// idle timeout. Each program is this same executable in an effect mode.
fn run_supervisor() -> Result<()> {
    #[cfg(unix)]
    {
        let exe = std::env::current_exe().context("resolving own executable path")?;
        let exe = exe.to_string_lossy().into_owned();
        let rotation = vec![
            ProgramSpec::new("flash", &exe, &["flash"]),
            ProgramSpec::new("ripple", &exe, &["ripple"]),
            ProgramSpec::new("falling", &exe, &["falling"]),
        ];

        let reader = supervisor::FifoReader::create(LIVENESS_PIPE_PATH)?;
        log::info!("supervising {} programs", rotation.len());
        Supervisor::new(SpawnLauncher, reader, rotation).run()
    }
    #[cfg(not(unix))]
    {
        bail!("the supervisor needs a named pipe and only runs on unix");
    }
}

/// Run one display program until terminated by the supervisor (or ctrl-c)
fn run_session(kind: EffectKind) -> Result<()> {
    let automaton = CellAutomaton::new(GRID_WIDTH, GRID_HEIGHT, kind);
    let source = SyntheticSource::new(GRID_WIDTH, GRID_HEIGHT);
    let renderer = AnsiRenderer::stdout();

    #[cfg(unix)]
    let liveness: Box<dyn supervisor::LivenessSender> =
        Box::new(supervisor::FifoSender::new(LIVENESS_PIPE_PATH));
    #[cfg(not(unix))]
    let liveness: Box<dyn supervisor::LivenessSender> = Box::new(supervisor::NullSender);

    print!("\x1b[2J"); // clear once; the renderer homes the cursor per frame
    DisplaySession::new(source, renderer, automaton, liveness).run()
}

/// Run the debounced left/right gesture selection round and report it
fn run_selection() -> Result<()> {
    let mut automaton = CellAutomaton::new(GRID_WIDTH, GRID_HEIGHT, EffectKind::Flash);
    let mut source = SyntheticSource::new(GRID_WIDTH, GRID_HEIGHT);
    let mut selector = GestureSelector::default();
    let mut prev = None;

    print!("\x1b[2J");
    let mut renderer = AnsiRenderer::stdout();
    let interval = std::time::Duration::from_millis(TICK_INTERVAL_MS);

    loop {
        let Some(frame) = source.next_frame() else {
            log::warn!("no frame available, skipping tick");
            continue;
        };
        let mask = match &prev {
            Some(p) => MotionMask::between(p, &frame, config::MOVEMENT_THRESHOLD),
            None => MotionMask::quiet(frame.width(), frame.height()),
        };
        automaton.tick(&mask);
        renderer.present(automaton.grid());
        prev = Some(frame);

        if let Some(selection) = selector.observe(&mask) {
            let describe = |side: Option<Side>| match side {
                Some(Side::Left) => "left",
                Some(Side::Right) => "right",
                None => "none",
            };
            match selection {
                Selection::Winner(side) => {
                    log::info!("gesture selected: {}", describe(Some(side)));
                    println!("selected: {}", describe(Some(side)));
                }
                Selection::Expired(leader) => {
                    log::info!("selection deadline passed, leader: {}", describe(leader));
                    println!("selected: {}", describe(leader));
                }
            }
            return Ok(());
        }

        std::thread::sleep(interval);
    }
}
