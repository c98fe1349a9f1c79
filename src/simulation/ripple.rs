use rand::Rng;

use crate::config::{MAX_RIPPLES, RIPPLE_DURATION};
use crate::simulation::cell::{ColorRamp, Rgb, BASE_COLOR};
use crate::simulation::grid::Grid;
use crate::simulation::motion::MotionMask;

/// An expanding circular wave originating from one motion event.
#[derive(Clone, Debug)]
struct Ripple {
    center: (u32, u32),
    radius: u32,
    ttl: u32,
    ramp: ColorRamp,
}

/// Ripple effect: motion spawns expanding rings that stamp cells with a
/// fading color gradient.
///
/// Ripples are kept in creation order and applied in order, so where two
/// ripples touch the same cell in the same tick the newest one wins.
pub struct RippleField {
    ripples: Vec<Ripple>,
    duration: u32,
    capacity: usize,
    base: Rgb,
}

impl RippleField {
    pub fn new(duration: u32, capacity: usize) -> Self {
        Self {
            ripples: Vec::new(),
            duration,
            capacity,
            base: BASE_COLOR,
        }
    }

    /// Advance the grid one tick: expand every live ripple, spawn new ones
    /// where motion happened (they cover only their center until the next
    /// tick), fade stamped cells.
    pub fn apply<R: Rng>(&mut self, grid: &mut Grid, mask: &MotionMask, rng: &mut R) {
        self.expand(grid);
        self.spawn(grid, mask, rng);
        self.fade(grid);
    }

    fn spawn<R: Rng>(&mut self, grid: &mut Grid, mask: &MotionMask, rng: &mut R) {
        for (x, y) in mask.active_cells() {
            if self.ripples.len() >= self.capacity {
                // backpressure: requests past the cap are dropped this tick
                log::debug!("ripple cap {} reached, dropping spawn", self.capacity);
                break;
            }
            let ripple = Ripple {
                center: (x, y),
                radius: 0,
                ttl: self.duration,
                ramp: ColorRamp::new(random_color(rng), random_color(rng)),
            };
            stamp(grid, &ripple);
            self.ripples.push(ripple);
        }
    }

    fn expand(&mut self, grid: &mut Grid) {
        for ripple in &mut self.ripples {
            ripple.radius += 1;
            ripple.ttl = ripple.ttl.saturating_sub(1);
            stamp(grid, ripple);
        }
        self.ripples.retain(|ripple| ripple.ttl > 0);
    }

    fn fade(&self, grid: &mut Grid) {
        for (_, _, cell) in grid.iter_mut() {
            if cell.timer > 0 {
                if let Some(ramp) = cell.ramp {
                    cell.color = ramp.at(cell.timer as f32 / self.duration as f32);
                }
                cell.timer -= 1;
            }
            // a cell stamped by a ripple's last tick lands here with timer 0
            if cell.timer == 0 && cell.ramp.is_some() {
                cell.color = self.base;
                cell.ramp = None;
            }
        }
    }
}

impl Default for RippleField {
    fn default() -> Self {
        Self::new(RIPPLE_DURATION, MAX_RIPPLES)
    }
}

/// Mark every cell within the ripple's radius with its remaining lifetime
/// and gradient. Later stamps overwrite earlier ones.
fn stamp(grid: &mut Grid, ripple: &Ripple) {
    let (cx, cy) = ripple.center;
    let r = ripple.radius as i64;
    // only the bounding square of the ring needs a distance check
    let (x0, y0) = grid.clamp(cx as i64 - r, cy as i64 - r);
    let (x1, y1) = grid.clamp(cx as i64 + r, cy as i64 + r);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = cx.abs_diff(x) as u64;
            let dy = cy.abs_diff(y) as u64;
            if dx * dx + dy * dy <= (r as u64) * (r as u64) {
                let cell = grid.cell_mut(x, y);
                cell.timer = ripple.ttl;
                cell.ramp = Some(ripple.ramp);
            }
        }
    }
}

fn random_color<R: Rng>(rng: &mut R) -> Rgb {
    Rgb::new(rng.gen(), rng.gen(), rng.gen())
}
