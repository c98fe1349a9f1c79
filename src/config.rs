/// Wall dimensions in cells (20x20 matches the physical panel layout)
pub const GRID_WIDTH: u32 = 20;
pub const GRID_HEIGHT: u32 = 20;

/// Luminance delta (0-255) above which a cell counts as moving
pub const MOVEMENT_THRESHOLD: u8 = 30;

/// Tick pacing: the capture collaborator delivers ~15 fps
pub const TICK_INTERVAL_MS: u64 = 66;

// ============================================
// Flash-Decay Effect
// ============================================

/// Ticks a flashed cell stays on the alert color before decaying back
pub const FLASH_DURATION: u32 = 10;

// ============================================
// Ripple Effect
// ============================================

/// Ticks a ripple lives; also the denominator of the color blend
pub const RIPPLE_DURATION: u32 = 60;

/// Live ripples allowed at once; spawn requests beyond this are dropped
pub const MAX_RIPPLES: usize = 500;

// ============================================
// Falling-Accumulation Effect
// ============================================

/// Ticks a settled cell stays occupied before expiring
pub const SETTLE_DURATION: u32 = 300;

/// New particles allowed per tick (bounds burst cost under heavy motion)
pub const MAX_NEW_PARTICLES: usize = 10;

/// Bottom rows scanned for the full-row clear (the overflow relief valve)
pub const MAX_ACCUMULATION_LINES: u32 = 20;

// ============================================
// Activity / Gesture Selection
// ============================================

/// Moving cells a region needs in one tick for its counter to grow
pub const MIN_ACTIVE_CELLS: u32 = 10;

/// Ticks between qualifying-window checks
pub const CHECK_INTERVAL: u32 = 15;

/// Consecutive qualifying windows one side needs to win
pub const REQUIRED_CONSECUTIVE_DETECTIONS: u32 = 6;

/// Ticks before selection gives up and reports the current leader (~6s)
pub const SELECTION_DEADLINE_TICKS: u32 = 90;

// ============================================
// Supervisor
// ============================================

/// Seconds without a liveness signal before the rotation advances
pub const IDLE_TIMEOUT_SECS: u64 = 15;

/// Seconds between supervisor poll cycles
pub const POLL_INTERVAL_SECS: u64 = 1;

/// Default path of the liveness FIFO shared by sessions and supervisor
pub const LIVENESS_PIPE_PATH: &str = "/tmp/pixel-wall-activity";
