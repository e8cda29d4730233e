//! Cooperative cancellation of layout passes

use crate::TimelineError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Progress of the frame loop, reported once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameProgress {
    /// Zero-based frame index within the pass
    pub frame: u32,
    /// Frame budget of the pass
    pub frames: u32,
    /// Simulation ticks run so far in the pass
    pub ticks: u32,
    /// Kinetic energy after the frame
    pub energy: f64,
}

#[derive(Debug, Default)]
struct PassState {
    cancel: AtomicBool,
    halt: AtomicBool,
    in_flight: AtomicBool,
    passes: AtomicU64,
    progress: Mutex<Option<FrameProgress>>,
}

/// Shared handle to a timeline's layout passes
///
/// Clones observe the same state and may be moved to other threads (signal
/// handlers, progress reporters).
#[derive(Debug, Clone, Default)]
pub struct PassHandle {
    state: Arc<PassState>,
}

impl PassHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the running pass at its next frame boundary
    pub fn cancel(&self) {
        self.state.cancel.store(true, Ordering::SeqCst);
    }

    /// Cancel the running pass and stop a replay before its next step
    pub fn halt(&self) {
        self.state.halt.store(true, Ordering::SeqCst);
        self.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancel.load(Ordering::SeqCst)
    }

    pub fn is_halted(&self) -> bool {
        self.state.halt.load(Ordering::SeqCst)
    }

    /// Whether a pass is in flight
    pub fn is_running(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Passes started so far
    pub fn passes(&self) -> u64 {
        self.state.passes.load(Ordering::SeqCst)
    }

    /// Last frame reported by the running (or last) pass
    pub fn progress(&self) -> Option<FrameProgress> {
        *self.state.progress.lock()
    }

    /// Clear a previous halt so the timeline can replay again
    pub fn resume(&self) {
        self.state.halt.store(false, Ordering::SeqCst);
    }

    /// Claim the in-flight slot for a new pass
    ///
    /// Any running pass is asked to stop first; if it still holds the slot
    /// the new pass is refused with [`TimelineError::Busy`].
    pub(crate) fn begin(&self) -> Result<PassGuard, TimelineError> {
        if self.is_running() {
            self.cancel();
        }
        if self
            .state
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TimelineError::Busy);
        }

        // a halt landing between the caller's check and here must still stop this pass
        self.state.cancel.store(false, Ordering::SeqCst);
        if self.is_halted() {
            self.cancel();
        }
        self.state.passes.fetch_add(1, Ordering::SeqCst);
        *self.state.progress.lock() = None;

        Ok(PassGuard {
            handle: self.clone(),
        })
    }

    pub(crate) fn report(&self, progress: FrameProgress) {
        *self.state.progress.lock() = Some(progress);
    }
}

/// Releases the in-flight slot when dropped
#[derive(Debug)]
pub(crate) struct PassGuard {
    handle: PassHandle,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.handle.state.in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_slot() {
        let handle = PassHandle::new();
        {
            let _guard = handle.begin().unwrap();
            assert!(handle.is_running());
        }
        assert!(!handle.is_running());
        assert_eq!(handle.passes(), 1);
    }

    #[test]
    fn test_second_pass_is_busy_and_cancels_first() {
        let handle = PassHandle::new();
        let _guard = handle.begin().unwrap();

        let err = handle.clone().begin().unwrap_err();
        assert_eq!(err, TimelineError::Busy);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_new_pass_clears_stale_cancel() {
        let handle = PassHandle::new();
        handle.cancel();
        let _guard = handle.begin().unwrap();
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_halt_persists_until_resume() {
        let handle = PassHandle::new();
        handle.halt();
        assert!(handle.is_halted());
        drop(handle.begin().unwrap());
        assert!(handle.is_halted());

        handle.resume();
        assert!(!handle.is_halted());
    }

    #[test]
    fn test_pass_begun_after_halt_starts_cancelled() {
        let handle = PassHandle::new();
        handle.halt();
        let guard = handle.begin().unwrap();
        assert!(handle.is_cancelled());
        drop(guard);

        handle.resume();
        let _guard = handle.begin().unwrap();
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let handle = PassHandle::new();
        let _guard = handle.begin().unwrap();

        let remote = handle.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(handle.is_cancelled());
    }
}
