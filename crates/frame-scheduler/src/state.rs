use serde::{Deserialize, Serialize};

/// Lifecycle state of a frame scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulerState {
    /// Scheduler has not executed a logical step yet
    Initial,
    /// Scheduler is executing logical steps
    Running,
    /// Scheduler is spinning without executing logical steps
    Paused,
    /// Scheduler has finished, either by completing its sequence or by `stop()`
    Ended,
}

impl SchedulerState {
    /// Get the string token for this state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Ended => "end",
        }
    }

    /// Check if the scheduler is actively stepping
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Check if the scheduler has reached a terminal state
    #[inline]
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Check if `toggle()` has an effect from this state
    #[inline]
    pub fn can_toggle(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Check if `stop()` has an effect from this state
    #[inline]
    pub fn can_stop(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::Initial
    }
}

impl From<&str> for SchedulerState {
    fn from(s: &str) -> Self {
        match s {
            "initial" => Self::Initial,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "end" => Self::Ended,
            _ => Self::Initial,
        }
    }
}
