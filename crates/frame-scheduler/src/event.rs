//! Lifecycle events and the hook table.
//!
//! End-of-run reporting is unified behind tagged [`SchedulerEvent`] values
//! delivered to the `"end"` slot: `SequenceBoundary { terminal }` once per
//! pass-end, and a distinct `Stopped` for a user-initiated `stop()`.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::config::FaultPolicy;

/// Discrete lifecycle signals dispatched to hooks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SchedulerEvent {
    /// `run()` accepted and the first frame was requested
    Started,
    /// Running -> Paused transition
    Paused,
    /// The cursor reached the end of the bound sequence.
    /// `terminal` is false when looping restarts the next pass.
    SequenceBoundary { terminal: bool },
    /// User-initiated `stop()`
    Stopped,
}

/// A registered hook callback.
pub type Hook = Box<dyn FnMut(&SchedulerEvent)>;

/// Fixed-slot hook registry: `"start"`, `"pause"`, `"end"`.
#[derive(Default)]
pub struct HookTable {
    on_start: Option<Hook>,
    on_pause: Option<Hook>,
    on_end: Option<Hook>,
}

impl HookTable {
    /// Register a hook under one of the fixed names. The camelCase spellings
    /// `onStart`/`onPause`/`onEnd` are accepted as well. Unknown names are
    /// ignored and return false.
    pub fn register(&mut self, name: &str, hook: Hook) -> bool {
        match name {
            "start" | "onStart" => self.on_start = Some(hook),
            "pause" | "onPause" => self.on_pause = Some(hook),
            "end" | "onEnd" => self.on_end = Some(hook),
            other => {
                log::warn!("ignoring hook registration for unknown name {other:?}");
                return false;
            }
        }
        true
    }

    /// Deliver an event to its slot, if registered.
    pub fn dispatch(&mut self, event: &SchedulerEvent, policy: FaultPolicy) {
        let slot = match event {
            SchedulerEvent::Started => &mut self.on_start,
            SchedulerEvent::Paused => &mut self.on_pause,
            SchedulerEvent::SequenceBoundary { .. } | SchedulerEvent::Stopped => &mut self.on_end,
        };
        if let Some(hook) = slot.as_mut() {
            call_guarded("hook", policy, || hook(event));
        }
    }

    /// Drop all registered hooks.
    pub fn clear(&mut self) {
        self.on_start = None;
        self.on_pause = None;
        self.on_end = None;
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookTable")
            .field("on_start", &self.on_start.is_some())
            .field("on_pause", &self.on_pause.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Run a user callback under the configured fault policy.
pub(crate) fn call_guarded<F: FnOnce()>(label: &str, policy: FaultPolicy, f: F) {
    match policy {
        FaultPolicy::Propagate => f(),
        FaultPolicy::Isolate => {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
                let message = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(|s| s.as_str()))
                    .unwrap_or("non-string panic payload");
                log::warn!("{label} panicked: {message}");
            }
        }
    }
}
