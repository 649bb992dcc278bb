//! Error types for the frame scheduler

use serde::{Deserialize, Serialize};

/// Error type for scheduler operations.
///
/// Misconfiguration (out-of-ladder speeds, unknown hook names, type-mismatched
/// JSON fields) is deliberately not an error: those inputs are ignored and logged
/// at warn level. The only fatal condition is a programmer-contract violation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SchedulerError {
    /// `run()` was called with no step function bound
    #[error("no step function bound; supply one via configure() or run_with()")]
    NoStepFunction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_message() {
        let err = SchedulerError::NoStepFunction;
        assert!(err.to_string().contains("no step function"));
    }

    #[test]
    fn serialization_round_trip() {
        let err = SchedulerError::NoStepFunction;
        let serialized = serde_json::to_string(&err).unwrap();
        let deserialized: SchedulerError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(err, deserialized);
    }
}
