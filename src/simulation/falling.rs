use crate::config::{MAX_ACCUMULATION_LINES, MAX_NEW_PARTICLES, SETTLE_DURATION};
use crate::simulation::cell::{Rgb, ALERT_COLOR, BASE_COLOR};
use crate::simulation::grid::Grid;
use crate::simulation::motion::MotionMask;

/// A cell's worth of color in free fall, waiting to land on the heap.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub x: u32,
    pub y: u32,
    pub color: Rgb,
    settle_frames: u32,
}

/// Timed occupancy of settled particles. A cell is occupied while its
/// settle timer is above zero.
pub struct AccumulationGrid {
    width: u32,
    height: u32,
    settle: Vec<u32>,
}

impl AccumulationGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            settle: vec![0; (width * height) as usize],
        }
    }

    pub fn occupied(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.settle[(y * self.width + x) as usize] > 0
    }

    fn settle_at(&mut self, x: u32, y: u32, duration: u32) {
        if x < self.width && y < self.height {
            self.settle[(y * self.width + x) as usize] = duration;
        }
    }

    fn clear_at(&mut self, x: u32, y: u32) {
        self.settle[(y * self.width + x) as usize] = 0;
    }

    /// Count down every occupied cell; cells reaching zero empty out
    fn expire(&mut self) {
        for timer in &mut self.settle {
            if *timer > 0 {
                *timer -= 1;
            }
        }
    }

    fn row_full(&self, y: u32) -> bool {
        (0..self.width).all(|x| self.occupied(x, y))
    }
}

/// Gravity effect: motion spawns colored particles that fall, pile up with
/// a settle timeout, and vanish row by row when a line fills completely.
pub struct FallingSand {
    particles: Vec<Particle>,
    heap: AccumulationGrid,
    settle_duration: u32,
    spawn_cap: usize,
    scan_rows: u32,
}

impl FallingSand {
    pub fn new(width: u32, height: u32, settle_duration: u32, spawn_cap: usize, scan_rows: u32) -> Self {
        Self {
            particles: Vec::new(),
            heap: AccumulationGrid::new(width, height),
            settle_duration,
            spawn_cap,
            scan_rows,
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(
            grid.width(),
            grid.height(),
            SETTLE_DURATION,
            MAX_NEW_PARTICLES,
            MAX_ACCUMULATION_LINES,
        )
    }

    /// Advance one tick: spawn from motion, let particles fall or settle,
    /// expire old accumulation, clear any full rows, repaint the grid.
    pub fn apply(&mut self, grid: &mut Grid, mask: &MotionMask) {
        self.spawn(mask);
        self.fall();
        self.heap.expire();
        self.clear_full_rows(grid.height());
        self.paint(grid);
    }

    fn spawn(&mut self, mask: &MotionMask) {
        let mut spawned = 0;
        for (x, y) in mask.active_cells() {
            if spawned >= self.spawn_cap {
                log::debug!("particle cap {} reached, dropping spawns", self.spawn_cap);
                break;
            }
            self.particles.push(Particle {
                x,
                y,
                color: ALERT_COLOR,
                settle_frames: self.settle_duration,
            });
            spawned += 1;
        }
    }

    fn fall(&mut self) {
        let heap = &mut self.heap;
        let bottom = heap.height - 1;
        for particle in &mut self.particles {
            if particle.y < bottom && !heap.occupied(particle.x, particle.y + 1) {
                particle.y += 1;
            } else {
                heap.settle_at(particle.x, particle.y, self.settle_duration);
                particle.settle_frames = 0;
            }
        }
        self.particles.retain(|p| p.settle_frames > 0);
    }

    fn clear_full_rows(&mut self, grid_height: u32) {
        let scan = self.scan_rows.min(grid_height);
        for y in grid_height - scan..grid_height {
            if self.heap.row_full(y) {
                log::info!("row {} filled, clearing line", y);
                for x in 0..self.heap.width {
                    self.heap.clear_at(x, y);
                }
            }
        }
    }

    /// Repaint the grid for the renderer: ambient base, settled heap, then
    /// in-flight particles on top.
    fn paint(&self, grid: &mut Grid) {
        grid.paint_all(BASE_COLOR);
        for y in 0..self.heap.height {
            for x in 0..self.heap.width {
                if self.heap.occupied(x, y) {
                    grid.cell_mut(x, y).color = ALERT_COLOR;
                }
            }
        }
        for particle in &self.particles {
            if grid.contains(particle.x, particle.y) {
                grid.cell_mut(particle.x, particle.y).color = particle.color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> MotionMask {
        MotionMask::quiet(20, 20)
    }

    fn single_motion(x: u32, y: u32) -> MotionMask {
        let mut mask = MotionMask::quiet(20, 20);
        mask.set(x, y);
        mask
    }

    #[test]
    fn test_motion_spawns_particle() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        sand.apply(&mut grid, &single_motion(4, 0));
        assert_eq!(sand.particles.len(), 1);
    }

    #[test]
    fn test_particle_falls_one_row_per_tick() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        sand.apply(&mut grid, &single_motion(4, 0));
        assert_eq!(sand.particles[0].y, 1);
        sand.apply(&mut grid, &quiet());
        assert_eq!(sand.particles[0].y, 2);
    }

    #[test]
    fn test_particle_settles_on_floor() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        sand.apply(&mut grid, &single_motion(4, 0));
        // 19 falls to reach the bottom row, one more tick to settle
        for _ in 0..19 {
            sand.apply(&mut grid, &quiet());
        }
        assert!(sand.particles.is_empty());
        assert!(sand.heap.occupied(4, 19));
    }

    #[test]
    fn test_particle_stacks_on_settled_cell() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        sand.heap.settle_at(4, 19, SETTLE_DURATION);
        sand.apply(&mut grid, &single_motion(4, 17));
        // lands at y=18 on top of the occupied floor cell, then settles
        sand.apply(&mut grid, &quiet());
        assert!(sand.particles.is_empty());
        assert!(sand.heap.occupied(4, 18));
    }

    #[test]
    fn test_spawn_cap_limits_burst() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::new(20, 20, SETTLE_DURATION, 10, MAX_ACCUMULATION_LINES);
        let mut mask = MotionMask::quiet(20, 20);
        for x in 0..20 {
            mask.set(x, 0);
        }
        sand.apply(&mut grid, &mask);
        assert_eq!(sand.particles.len(), 10);
    }

    #[test]
    fn test_settled_cell_expires() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::new(20, 20, 3, 10, MAX_ACCUMULATION_LINES);
        sand.heap.settle_at(0, 19, 3);
        sand.apply(&mut grid, &quiet());
        sand.apply(&mut grid, &quiet());
        assert!(sand.heap.occupied(0, 19));
        sand.apply(&mut grid, &quiet());
        assert!(!sand.heap.occupied(0, 19));
    }

    #[test]
    fn test_full_row_clears() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        for x in 0..20 {
            sand.heap.settle_at(x, 19, SETTLE_DURATION);
        }
        sand.apply(&mut grid, &quiet());
        for x in 0..20 {
            assert!(!sand.heap.occupied(x, 19));
        }
    }

    #[test]
    fn test_partial_row_does_not_clear() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        for x in 0..19 {
            sand.heap.settle_at(x, 19, SETTLE_DURATION);
        }
        sand.apply(&mut grid, &quiet());
        assert!(sand.heap.occupied(0, 19));
        assert!(!sand.heap.occupied(19, 19));
    }

    #[test]
    fn test_clear_scan_respects_row_range() {
        let mut grid = Grid::new(20, 20);
        // only the bottom two rows are scanned for clears
        let mut sand = FallingSand::new(20, 20, SETTLE_DURATION, 10, 2);
        for x in 0..20 {
            sand.heap.settle_at(x, 10, SETTLE_DURATION);
        }
        sand.apply(&mut grid, &quiet());
        assert!(sand.heap.occupied(0, 10), "row outside scan range must survive");
    }

    #[test]
    fn test_paint_shows_heap_and_particles() {
        let mut grid = Grid::new(20, 20);
        let mut sand = FallingSand::for_grid(&grid);
        sand.heap.settle_at(3, 19, SETTLE_DURATION);
        sand.apply(&mut grid, &single_motion(8, 0));
        assert_eq!(grid.cell(3, 19).color, ALERT_COLOR);
        assert_eq!(grid.cell(8, 1).color, ALERT_COLOR); // particle after one fall
        assert_eq!(grid.cell(0, 0).color, BASE_COLOR);
    }
}
