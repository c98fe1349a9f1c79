use crate::config::FLASH_DURATION;
use crate::simulation::cell::{Rgb, ALERT_COLOR, BASE_COLOR};
use crate::simulation::grid::Grid;
use crate::simulation::motion::MotionMask;

/// Flash-decay effect: cells that see motion jump to the alert color and
/// hold it for a fixed number of ticks, then fall back to the ambient color.
pub struct FlashDecay {
    alert: Rgb,
    base: Rgb,
    duration: u32,
}

impl FlashDecay {
    pub fn new(alert: Rgb, base: Rgb, duration: u32) -> Self {
        Self {
            alert,
            base,
            duration,
        }
    }

    /// Advance the grid one tick.
    ///
    /// A cell flashed this tick gets the full duration and is not decayed
    /// until the next tick, so a flash with duration D reverts exactly D
    /// ticks later. Re-flashing overwrites any in-progress decay.
    pub fn apply(&mut self, grid: &mut Grid, mask: &MotionMask) {
        for (x, y, cell) in grid.iter_mut() {
            if mask.is_set(x, y) {
                cell.color = self.alert;
                cell.timer = self.duration;
            } else if cell.timer > 0 {
                cell.timer -= 1;
                if cell.timer == 0 {
                    cell.color = self.base;
                }
            }
        }
    }
}

impl Default for FlashDecay {
    fn default() -> Self {
        Self::new(ALERT_COLOR, BASE_COLOR, FLASH_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_motion(width: u32, height: u32, x: u32, y: u32) -> MotionMask {
        let mut mask = MotionMask::quiet(width, height);
        mask.set(x, y);
        mask
    }

    #[test]
    fn test_motion_flashes_cell() {
        let mut grid = Grid::new(20, 20);
        let mut effect = FlashDecay::default();
        effect.apply(&mut grid, &single_motion(20, 20, 5, 5));
        assert_eq!(grid.cell(5, 5).color, ALERT_COLOR);
        assert_eq!(grid.cell(5, 5).timer, FLASH_DURATION);
    }

    #[test]
    fn test_flash_reverts_exactly_after_duration() {
        let mut grid = Grid::new(20, 20);
        let mut effect = FlashDecay::default();
        effect.apply(&mut grid, &single_motion(20, 20, 5, 5));

        let quiet = MotionMask::quiet(20, 20);
        for remaining in (1..=FLASH_DURATION).rev() {
            // still alert before the timer runs out
            assert_eq!(grid.cell(5, 5).color, ALERT_COLOR);
            assert_eq!(grid.cell(5, 5).timer, remaining);
            effect.apply(&mut grid, &quiet);
        }
        assert_eq!(grid.cell(5, 5).timer, 0);
        assert_eq!(grid.cell(5, 5).color, BASE_COLOR);
    }

    #[test]
    fn test_reflash_resets_decay() {
        let mut grid = Grid::new(20, 20);
        let mut effect = FlashDecay::default();
        let quiet = MotionMask::quiet(20, 20);

        effect.apply(&mut grid, &single_motion(20, 20, 3, 3));
        effect.apply(&mut grid, &quiet);
        effect.apply(&mut grid, &quiet);
        assert_eq!(grid.cell(3, 3).timer, FLASH_DURATION - 2);

        effect.apply(&mut grid, &single_motion(20, 20, 3, 3));
        assert_eq!(grid.cell(3, 3).timer, FLASH_DURATION);
    }

    #[test]
    fn test_quiet_ticks_only_decay() {
        let mut grid = Grid::new(20, 20);
        let mut effect = FlashDecay::default();
        effect.apply(&mut grid, &single_motion(20, 20, 0, 0));

        let quiet = MotionMask::quiet(20, 20);
        let mut last = grid.cell(0, 0).timer;
        for _ in 0..FLASH_DURATION + 5 {
            effect.apply(&mut grid, &quiet);
            let timer = grid.cell(0, 0).timer;
            assert!(timer <= last, "timer must never grow on a quiet tick");
            last = timer;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_untouched_cells_stay_idle() {
        let mut grid = Grid::new(20, 20);
        let mut effect = FlashDecay::default();
        effect.apply(&mut grid, &single_motion(20, 20, 5, 5));
        for (x, y, cell) in grid.iter() {
            if (x, y) != (5, 5) {
                assert_eq!(cell.color, BASE_COLOR);
                assert_eq!(cell.timer, 0);
            }
        }
    }
}
