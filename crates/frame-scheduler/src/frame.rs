//! Frame-callback collaborator contract.
//!
//! The scheduler never blocks: between ticks it parks inside the host's
//! per-frame callback mechanism. Hosts expose that mechanism through
//! [`FrameSource`]; requesting arms one future invocation of
//! `FrameScheduler::tick`, cancelling disarms a request that has not fired yet.

use serde::{Deserialize, Serialize};

/// Opaque handle for one pending frame request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TickHandle(pub u64);

/// A host mechanism that can invoke a callback on the next display refresh.
///
/// Contract:
/// - `request` schedules exactly one future `tick()` invocation and returns a
///   handle identifying it.
/// - `cancel` prevents a pending invocation from firing. It must be idempotent:
///   cancelling an already-fired or already-cancelled handle is a no-op.
pub trait FrameSource {
    fn request(&mut self) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Deterministic frame source for tests and for hosts without a display loop.
///
/// Requests queue in FIFO order; the driver pops them with [`fire_next`] and
/// invokes `tick()` once per fired handle. [`outstanding`] counts requests that
/// have neither fired nor been cancelled, which is how tests verify the
/// no-dangling-callback invariant.
///
/// [`fire_next`]: ManualFrameSource::fire_next
/// [`outstanding`]: ManualFrameSource::outstanding
#[derive(Default, Debug)]
pub struct ManualFrameSource {
    next_handle: u64,
    pending: Vec<TickHandle>,
    fired: u64,
    cancelled: u64,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest pending request, marking it as fired.
    pub fn fire_next(&mut self) -> Option<TickHandle> {
        if self.pending.is_empty() {
            return None;
        }
        let handle = self.pending.remove(0);
        self.fired += 1;
        Some(handle)
    }

    /// Number of requests that have neither fired nor been cancelled.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Total requests fired so far.
    #[inline]
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Total requests cancelled before firing.
    #[inline]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameSource for ManualFrameSource {
    fn request(&mut self) -> TickHandle {
        let handle = TickHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(pos) = self.pending.iter().position(|h| *h == handle) {
            self.pending.remove(pos);
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fire_cancel() {
        let mut source = ManualFrameSource::new();
        let a = source.request();
        let b = source.request();
        assert_eq!(source.outstanding(), 2);

        assert_eq!(source.fire_next(), Some(a));
        assert_eq!(source.outstanding(), 1);

        source.cancel(b);
        assert_eq!(source.outstanding(), 0);
        assert_eq!(source.cancelled(), 1);
        assert_eq!(source.fire_next(), None);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut source = ManualFrameSource::new();
        let a = source.request();
        source.cancel(a);
        source.cancel(a);
        assert_eq!(source.cancelled(), 1);

        let b = source.request();
        assert_eq!(source.fire_next(), Some(b));
        source.cancel(b);
        assert_eq!(source.cancelled(), 1);
    }

    #[test]
    fn handles_are_unique() {
        let mut source = ManualFrameSource::new();
        let a = source.request();
        let b = source.request();
        assert_ne!(a, b);
    }
}
