use crate::config::{
    CHECK_INTERVAL, MIN_ACTIVE_CELLS, REQUIRED_CONSECUTIVE_DETECTIONS, SELECTION_DEADLINE_TICKS,
};
use crate::simulation::MotionMask;

/// The two halves of the wall a viewer can gesture in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Hysteresis counters over per-region motion counts.
///
/// A region's counter grows by one on every tick its moving-cell count
/// exceeds the activity threshold, and shrinks by one otherwise, floored
/// at zero. Brief blips therefore never dominate a sustained gesture.
pub struct ActivityAggregator {
    min_active: u32,
    left: u32,
    right: u32,
}

impl ActivityAggregator {
    pub fn new(min_active: u32) -> Self {
        Self {
            min_active,
            left: 0,
            right: 0,
        }
    }

    /// Feed one tick's motion mask
    pub fn observe(&mut self, mask: &MotionMask) {
        let mid = mask.width() / 2;
        let left_count = mask.count_in(0, mid, 0, mask.height());
        let right_count = mask.count_in(mid, mask.width(), 0, mask.height());

        if left_count > self.min_active {
            self.left += 1;
        } else {
            self.left = self.left.saturating_sub(1);
        }
        if right_count > self.min_active {
            self.right += 1;
        } else {
            self.right = self.right.saturating_sub(1);
        }
    }

    pub fn counter(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Outcome of a finished selection round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Winner(Side),
    /// The deadline passed; the side leading on counters, if any
    Expired(Option<Side>),
}

/// Debounced two-choice selector over the aggregator.
///
/// Every `check_interval` ticks, a side whose counter reached the interval
/// length scores a qualifying window and zeroes the other side's streak.
/// A side wins after `required` consecutive windows; a deadline caps the
/// whole round.
pub struct GestureSelector {
    aggregator: ActivityAggregator,
    check_interval: u32,
    required: u32,
    deadline_ticks: u32,
    ticks: u32,
    left_windows: u32,
    right_windows: u32,
}

impl GestureSelector {
    pub fn new(check_interval: u32, required: u32, deadline_ticks: u32) -> Self {
        Self {
            aggregator: ActivityAggregator::new(MIN_ACTIVE_CELLS),
            check_interval,
            required,
            deadline_ticks,
            ticks: 0,
            left_windows: 0,
            right_windows: 0,
        }
    }

    /// Feed one tick; returns the selection once it is decided.
    pub fn observe(&mut self, mask: &MotionMask) -> Option<Selection> {
        self.aggregator.observe(mask);
        self.ticks += 1;

        if self.ticks % self.check_interval == 0 {
            let left = self.aggregator.counter(Side::Left);
            let right = self.aggregator.counter(Side::Right);
            log::debug!("selection window: left={} right={}", left, right);

            if left >= self.check_interval {
                self.left_windows += 1;
                self.right_windows = 0;
            } else if right >= self.check_interval {
                self.right_windows += 1;
                self.left_windows = 0;
            } else {
                self.left_windows = 0;
                self.right_windows = 0;
            }

            if self.left_windows >= self.required {
                return Some(Selection::Winner(Side::Left));
            }
            if self.right_windows >= self.required {
                return Some(Selection::Winner(Side::Right));
            }
        }

        if self.ticks >= self.deadline_ticks {
            return Some(Selection::Expired(self.leader()));
        }
        None
    }

    fn leader(&self) -> Option<Side> {
        let left = self.aggregator.counter(Side::Left);
        let right = self.aggregator.counter(Side::Right);
        if left > right {
            Some(Side::Left)
        } else if right > left {
            Some(Side::Right)
        } else {
            None
        }
    }
}

impl Default for GestureSelector {
    fn default() -> Self {
        Self::new(
            CHECK_INTERVAL,
            REQUIRED_CONSECUTIVE_DETECTIONS,
            SELECTION_DEADLINE_TICKS,
        )
    }
}
