//! Scheduler configuration: speed ladder, throttling arithmetic, fault policy.

use serde::{Deserialize, Serialize};

/// Host display refresh rate assumed by the throttling arithmetic, in frames
/// per second. The scheduler is frame-count based, not time based: on a faster
/// display the whole animation simply runs proportionally faster.
pub const HOST_REFRESH_RATE: u32 = 60;

/// Supported logical step rates, ascending. Configured speeds snap onto this
/// ladder so the skip factor stays a small integer.
pub const SPEED_LADDER: [u32; 4] = [10, 20, 30, 60];

/// Snap a requested speed onto the ladder.
///
/// Values below the floor clamp to the floor and values above the ceiling clamp
/// to the ceiling; anything in between snaps up to the next ladder entry, so a
/// request is never slowed down below what was asked for (25 -> 30).
pub fn snap_speed(requested: u32) -> u32 {
    for stage in SPEED_LADDER {
        if requested <= stage {
            return stage;
        }
    }
    SPEED_LADDER[SPEED_LADDER.len() - 1]
}

/// What to do when a hook or step function panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// Let the panic unwind into the host (the default)
    Propagate,
    /// Catch the panic, log it at warn level, and keep the schedule alive
    Isolate,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self::Propagate
    }
}

/// Effective scheduler configuration.
///
/// `speed` is kept snapped to [`SPEED_LADDER`] at all times, so it is only
/// writable through [`SchedulerConfig::set_speed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    speed: u32,
    /// Start stepping as soon as a step function is bound via `configure()`
    pub auto_run: bool,
    /// Restart the bound sequence after each completed pass
    pub looped: bool,
    /// Panic handling for user callbacks
    pub fault_policy: FaultPolicy,
}

impl SchedulerConfig {
    /// Target logical steps per second, snapped to the ladder.
    #[inline]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Set the target speed, snapping it onto the ladder.
    #[inline]
    pub fn set_speed(&mut self, requested: u32) {
        self.speed = snap_speed(requested);
    }

    /// Number of host frames per logical step: `ceil(60 / speed)`.
    #[inline]
    pub fn skip_factor(&self) -> u32 {
        (HOST_REFRESH_RATE + self.speed - 1) / self.speed
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            speed: 20,
            auto_run: false,
            looped: false,
            fault_policy: FaultPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_clamps_and_rounds_up() {
        assert_eq!(snap_speed(0), 10);
        assert_eq!(snap_speed(5), 10);
        assert_eq!(snap_speed(10), 10);
        assert_eq!(snap_speed(11), 20);
        assert_eq!(snap_speed(25), 30);
        assert_eq!(snap_speed(30), 30);
        assert_eq!(snap_speed(31), 60);
        assert_eq!(snap_speed(144), 60);
    }

    #[test]
    fn skip_factor_per_ladder_entry() {
        let mut cfg = SchedulerConfig::default();
        for (speed, expected) in [(10, 6), (20, 3), (30, 2), (60, 1)] {
            cfg.set_speed(speed);
            assert_eq!(cfg.skip_factor(), expected, "speed {speed}");
        }
    }

    #[test]
    fn default_speed_is_on_the_ladder() {
        let cfg = SchedulerConfig::default();
        assert!(SPEED_LADDER.contains(&cfg.speed()));
        assert_eq!(cfg.speed(), 20);
    }
}
