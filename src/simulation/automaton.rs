use crate::simulation::falling::FallingSand;
use crate::simulation::flash::FlashDecay;
use crate::simulation::grid::Grid;
use crate::simulation::motion::MotionMask;
use crate::simulation::ripple::RippleField;

/// Which visual program a session runs. Exactly one per session,
/// chosen at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    Flash,
    Ripple,
    Falling,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Flash => "flash",
            EffectKind::Ripple => "ripple",
            EffectKind::Falling => "falling",
        }
    }
}

enum Effect {
    Flash(FlashDecay),
    Ripple(RippleField),
    Falling(FallingSand),
}

/// What one tick observed, for the session to act on.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickReport {
    /// True iff any cell of the motion mask was set this tick. At most one
    /// movement event is reported per tick no matter how many cells moved.
    pub movement: bool,
}

/// The cell-state engine: owns the grid and advances it one step per
/// arriving frame under the configured effect.
pub struct CellAutomaton {
    grid: Grid,
    effect: Effect,
    kind: EffectKind,
}

impl CellAutomaton {
    pub fn new(width: u32, height: u32, kind: EffectKind) -> Self {
        let grid = Grid::new(width, height);
        let effect = match kind {
            EffectKind::Flash => Effect::Flash(FlashDecay::default()),
            EffectKind::Ripple => Effect::Ripple(RippleField::default()),
            EffectKind::Falling => Effect::Falling(FallingSand::for_grid(&grid)),
        };
        Self { grid, effect, kind }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Advance one tick. Never fails: coordinates outside the grid are
    /// ignored by the mask and all other arithmetic is clamped.
    pub fn tick(&mut self, mask: &MotionMask) -> TickReport {
        match &mut self.effect {
            Effect::Flash(flash) => flash.apply(&mut self.grid, mask),
            Effect::Ripple(field) => {
                field.apply(&mut self.grid, mask, &mut rand::thread_rng())
            }
            Effect::Falling(sand) => sand.apply(&mut self.grid, mask),
        }
        TickReport {
            movement: mask.any(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FLASH_DURATION;
    use crate::simulation::cell::{ALERT_COLOR, BASE_COLOR};

    #[test]
    fn test_flash_end_to_end() {
        // 20x20 wall, motion at (5, 5) only: the cell flashes, holds for
        // the flash duration, and reverts with every other cell untouched.
        let mut automaton = CellAutomaton::new(20, 20, EffectKind::Flash);
        let mut mask = MotionMask::quiet(20, 20);
        mask.set(5, 5);

        let report = automaton.tick(&mask);
        assert!(report.movement);
        assert_eq!(automaton.grid().cell(5, 5).color, ALERT_COLOR);
        assert_eq!(automaton.grid().cell(5, 5).timer, FLASH_DURATION);

        let quiet = MotionMask::quiet(20, 20);
        for _ in 0..FLASH_DURATION {
            let report = automaton.tick(&quiet);
            assert!(!report.movement);
            for (x, y, cell) in automaton.grid().iter() {
                if (x, y) != (5, 5) {
                    assert_eq!(cell.color, BASE_COLOR);
                    assert_eq!(cell.timer, 0);
                }
            }
        }
        assert_eq!(automaton.grid().cell(5, 5).color, BASE_COLOR);
        assert_eq!(automaton.grid().cell(5, 5).timer, 0);
    }

    #[test]
    fn test_movement_reported_once_per_tick() {
        let mut automaton = CellAutomaton::new(20, 20, EffectKind::Flash);
        let mut mask = MotionMask::quiet(20, 20);
        mask.set(1, 1);
        mask.set(2, 2);
        mask.set(3, 3);
        // many moving cells still produce a single movement report
        let report = automaton.tick(&mask);
        assert!(report.movement);
    }

    #[test]
    fn test_quiet_ticks_decay_monotonically() {
        use crate::config::RIPPLE_DURATION;

        for kind in [EffectKind::Flash, EffectKind::Ripple, EffectKind::Falling] {
            let mut automaton = CellAutomaton::new(20, 20, kind);
            let mut mask = MotionMask::quiet(20, 20);
            mask.set(10, 10);
            automaton.tick(&mask);

            // let in-flight ripples expire so no timer resets remain pending
            let quiet = MotionMask::quiet(20, 20);
            for _ in 0..=RIPPLE_DURATION {
                automaton.tick(&quiet);
            }

            for _ in 0..100 {
                let before: Vec<u32> = automaton.grid().iter().map(|(_, _, c)| c.timer).collect();
                automaton.tick(&quiet);
                // a quiet tick only ever decays timers, for every effect
                let after: Vec<u32> = automaton.grid().iter().map(|(_, _, c)| c.timer).collect();
                for (b, a) in before.iter().zip(&after) {
                    assert!(a <= b, "{:?}: timer grew on a quiet tick", kind);
                }
            }
        }
    }
}
