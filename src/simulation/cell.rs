/// RGB color of one wall cell, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Ambient color of an idle cell
pub const BASE_COLOR: Rgb = Rgb::new(0, 255, 0);

/// Color a cell flashes to on detected motion
pub const ALERT_COLOR: Rgb = Rgb::new(255, 0, 0);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend between two colors. `ratio` is clamped to [0, 1];
    /// 1.0 yields `from`, 0.0 yields `to`.
    pub fn lerp(from: Rgb, to: Rgb, ratio: f32) -> Rgb {
        let t = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 * t + b as f32 * (1.0 - t)).round() as u8;
        Rgb::new(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b))
    }
}

/// Start/end gradient a ripple leaves behind on the cells it touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorRamp {
    pub from: Rgb,
    pub to: Rgb,
}

impl ColorRamp {
    pub const fn new(from: Rgb, to: Rgb) -> Self {
        Self { from, to }
    }

    /// Color at the given fraction of remaining lifetime.
    pub fn at(&self, ratio: f32) -> Rgb {
        Rgb::lerp(self.from, self.to, ratio)
    }
}

/// One addressable unit of the wall.
///
/// `timer` counts down once per tick; at 0 the cell is idle and shows the
/// ambient base color. `ramp` is only set by the ripple effect, which fades
/// the cell along the gradient as the timer runs out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub color: Rgb,
    pub ramp: Option<ColorRamp>,
    pub timer: u32,
}

impl Cell {
    /// An idle cell showing the ambient color
    pub const fn idle() -> Self {
        Self {
            color: BASE_COLOR,
            ramp: None,
            timer: 0,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let from = Rgb::new(255, 0, 0);
        let to = Rgb::new(0, 255, 0);
        assert_eq!(Rgb::lerp(from, to, 1.0), from);
        assert_eq!(Rgb::lerp(from, to, 0.0), to);
    }

    #[test]
    fn test_lerp_midpoint() {
        let mid = Rgb::lerp(Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), 0.5);
        assert_eq!(mid, Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_lerp_clamps_ratio() {
        let from = Rgb::new(10, 20, 30);
        let to = Rgb::new(200, 100, 50);
        assert_eq!(Rgb::lerp(from, to, 2.0), from);
        assert_eq!(Rgb::lerp(from, to, -1.0), to);
    }

    #[test]
    fn test_idle_cell() {
        let cell = Cell::idle();
        assert_eq!(cell.color, BASE_COLOR);
        assert_eq!(cell.timer, 0);
        assert!(cell.ramp.is_none());
    }
}
