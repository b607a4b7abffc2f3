#![forbid(unsafe_code)]

//! Late-reflow scheduling.
//!
//! Panel content may mount after the controller initializes. A scheduled
//! pass re-applies layout at three later points, each at most once:
//!
//! 1. the next animation frame,
//! 2. a zero-delay timer,
//! 3. the first content-mounted signal, if it arrives within
//!    [`MUTATION_WATCH_FRAMES`] animation frames.
//!
//! The host drives time: it calls the `on_*` hooks and asks
//! [`wants_animation_frame`](ReflowScheduler::wants_animation_frame) /
//! [`wants_timer`](ReflowScheduler::wants_timer) to decide whether to
//! request them. Every pass has a [`ReflowHandle`] for deterministic cancel.
//!
//! Scheduling a reason that is already pending re-arms that pass and returns
//! its handle, and at most [`MAX_PENDING_REFLOWS`] passes are kept (the
//! oldest is dropped), so a host that never ticks cannot grow the queue.

use serde::{Deserialize, Serialize};

/// Animation frames after which an unanswered content watch expires.
pub const MUTATION_WATCH_FRAMES: u8 = 2;

/// Upper bound on outstanding passes.
pub const MAX_PENDING_REFLOWS: usize = 8;

/// Handle to one scheduled pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReflowHandle(u64);

impl ReflowHandle {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct PendingReflow {
    handle: ReflowHandle,
    reason: String,
    frame_pending: bool,
    timer_pending: bool,
    watching: bool,
    frames_seen: u8,
}

impl PendingReflow {
    const fn is_live(&self) -> bool {
        self.frame_pending || self.timer_pending || self.watching
    }
}

/// Outstanding late-reflow passes.
#[derive(Debug, Clone, Default)]
pub struct ReflowScheduler {
    next_handle: u64,
    pending: Vec<PendingReflow>,
}

impl ReflowScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a pass, or re-arm the pending pass with the same reason.
    pub fn schedule(&mut self, reason: impl Into<String>) -> ReflowHandle {
        let reason = reason.into();
        if let Some(pass) = self.pending.iter_mut().find(|pass| pass.reason == reason) {
            pass.frame_pending = true;
            pass.timer_pending = true;
            pass.watching = true;
            pass.frames_seen = 0;
            tracing::debug!(handle = pass.handle.0, reason = %reason, "late reflow re-armed");
            return pass.handle;
        }
        if self.pending.len() >= MAX_PENDING_REFLOWS {
            let dropped = self.pending.remove(0);
            tracing::debug!(handle = dropped.handle.0, reason = %dropped.reason, "oldest late reflow dropped");
        }
        self.next_handle += 1;
        let handle = ReflowHandle(self.next_handle);
        tracing::debug!(handle = handle.0, reason = %reason, "late reflow scheduled");
        self.pending.push(PendingReflow {
            handle,
            reason,
            frame_pending: true,
            timer_pending: true,
            watching: true,
            frames_seen: 0,
        });
        handle
    }

    /// Cancel a pass. Returns whether it was still pending.
    pub fn cancel(&mut self, handle: ReflowHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pass| pass.handle != handle);
        let cancelled = self.pending.len() != before;
        if cancelled {
            tracing::debug!(handle = handle.0, "late reflow cancelled");
        }
        cancelled
    }

    /// Cancel every pass.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Animation-frame tick. Returns the passes that want layout now.
    pub fn on_animation_frame(&mut self) -> Vec<ReflowHandle> {
        let mut fired = Vec::new();
        for pass in &mut self.pending {
            if pass.frame_pending {
                pass.frame_pending = false;
                fired.push(pass.handle);
            }
            if pass.watching {
                pass.frames_seen = pass.frames_seen.saturating_add(1);
                if pass.frames_seen >= MUTATION_WATCH_FRAMES {
                    pass.watching = false;
                    tracing::debug!(handle = pass.handle.0, reason = %pass.reason, "content watch expired");
                }
            }
        }
        self.prune();
        fired
    }

    /// Zero-delay timer tick.
    pub fn on_timer(&mut self) -> Vec<ReflowHandle> {
        let mut fired = Vec::new();
        for pass in &mut self.pending {
            if pass.timer_pending {
                pass.timer_pending = false;
                fired.push(pass.handle);
            }
        }
        self.prune();
        fired
    }

    /// The container's children changed. Each watch fires once.
    pub fn on_content_mounted(&mut self) -> Vec<ReflowHandle> {
        let mut fired = Vec::new();
        for pass in &mut self.pending {
            if pass.watching {
                pass.watching = false;
                fired.push(pass.handle);
            }
        }
        self.prune();
        fired
    }

    #[must_use]
    pub fn is_pending(&self, handle: ReflowHandle) -> bool {
        self.pending.iter().any(|pass| pass.handle == handle)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the host should request an animation frame.
    #[must_use]
    pub fn wants_animation_frame(&self) -> bool {
        self.pending
            .iter()
            .any(|pass| pass.frame_pending || pass.watching)
    }

    /// Whether the host should arm a zero-delay timer.
    #[must_use]
    pub fn wants_timer(&self) -> bool {
        self.pending.iter().any(|pass| pass.timer_pending)
    }

    fn prune(&mut self) {
        self.pending.retain(PendingReflow::is_live);
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_PENDING_REFLOWS, ReflowScheduler};

    #[test]
    fn each_phase_fires_once() {
        let mut scheduler = ReflowScheduler::new();
        let handle = scheduler.schedule("init");
        assert_eq!(scheduler.on_animation_frame(), vec![handle]);
        assert!(scheduler.on_animation_frame().is_empty());
        assert_eq!(scheduler.on_timer(), vec![handle]);
        assert!(scheduler.on_timer().is_empty());
        // Two frames elapsed: the content watch expired.
        assert!(scheduler.on_content_mounted().is_empty());
        assert!(!scheduler.is_pending(handle));
    }

    #[test]
    fn content_watch_fires_once_then_disconnects() {
        let mut scheduler = ReflowScheduler::new();
        let handle = scheduler.schedule("init");
        assert_eq!(scheduler.on_content_mounted(), vec![handle]);
        assert!(scheduler.on_content_mounted().is_empty());
        assert!(scheduler.wants_timer());
        scheduler.on_animation_frame();
        scheduler.on_timer();
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!scheduler.wants_animation_frame());
    }

    #[test]
    fn same_reason_rearms_the_pending_pass() {
        let mut scheduler = ReflowScheduler::new();
        let first = scheduler.schedule("settings closed");
        assert_eq!(scheduler.on_animation_frame(), vec![first]);
        let again = scheduler.schedule("settings closed");
        assert_eq!(again, first);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.on_animation_frame(), vec![first]);
    }

    #[test]
    fn queue_is_bounded_without_ticks() {
        let mut scheduler = ReflowScheduler::new();
        let handles: Vec<_> = (0..100).map(|i| scheduler.schedule(format!("pass {i}"))).collect();
        assert_eq!(scheduler.pending_count(), MAX_PENDING_REFLOWS);
        assert!(!scheduler.is_pending(handles[0]));
        assert!(scheduler.is_pending(handles[99]));
        for _ in 0..100 {
            scheduler.schedule("init");
        }
        assert_eq!(scheduler.pending_count(), MAX_PENDING_REFLOWS);
    }

    #[test]
    fn cancel_is_deterministic() {
        let mut scheduler = ReflowScheduler::new();
        let first = scheduler.schedule("a");
        let second = scheduler.schedule("b");
        assert!(scheduler.cancel(first));
        assert!(!scheduler.cancel(first));
        assert_eq!(scheduler.on_timer(), vec![second]);
        assert_eq!(scheduler.cancel_all(), 1);
        assert!(!scheduler.wants_animation_frame());
    }
}
