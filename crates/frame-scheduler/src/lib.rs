//! Frame Scheduler Core
//!
//! A host-agnostic, frame-driven animation scheduler: a cooperative,
//! single-threaded state machine that executes a user step function at a
//! quantized sub-multiple of the display refresh rate, optionally iterating
//! over a bound data sequence, with lifecycle hooks for start, pause and
//! end-of-run. Hosts supply the per-frame callback mechanism through the
//! [`FrameSource`] trait; [`ManualFrameSource`] serves tests and headless
//! hosts.

pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod options;
pub mod scheduler;
pub mod state;

// Re-export common types for convenience
pub use config::{snap_speed, FaultPolicy, SchedulerConfig, HOST_REFRESH_RATE, SPEED_LADDER};
pub use error::SchedulerError;
pub use event::{Hook, HookTable, SchedulerEvent};
pub use frame::{FrameSource, ManualFrameSource, TickHandle};
pub use options::ScheduleOptions;
pub use scheduler::{FrameScheduler, ParseFn, StepContext, StepFn};
pub use state::SchedulerState;

/// Frame scheduler result type
pub type Result<T> = core::result::Result<T, SchedulerError>;
