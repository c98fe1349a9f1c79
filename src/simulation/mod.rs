mod automaton;
mod cell;
mod falling;
mod flash;
mod grid;
mod motion;
mod ripple;

pub use automaton::{CellAutomaton, EffectKind, TickReport};
pub use cell::{Cell, ColorRamp, Rgb, ALERT_COLOR, BASE_COLOR};
pub use falling::FallingSand;
pub use flash::FlashDecay;
pub use grid::Grid;
pub use motion::{Frame, MotionMask};
pub use ripple::RippleField;
