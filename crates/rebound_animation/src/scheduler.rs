//! Frame scheduling
//!
//! Everything time-dependent in the engine goes through a [`FrameScheduler`]:
//! the start delay, and every per-frame tick after motion begins. Callbacks are
//! one-shot and fire from the host's frame loop on a single thread.
//!
//! Two schedulers are provided:
//! - [`ManualScheduler`] - a fake clock advanced explicitly (tests, offline rendering)
//! - [`FrameLoop`] - a monotonic `Instant` clock pumped once per display frame

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::thread;
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a pending frame callback
    pub struct CancelToken;
}

/// One-shot callback, invoked with the scheduler time of the frame that fired it
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// Default frame rate for both schedulers
pub const DEFAULT_FPS: u32 = 120;

/// Display-synchronized clock with cancellable one-shot callbacks
///
/// Implementations must guarantee that:
/// - a callback fires no earlier than `delay` after it was scheduled
/// - a callback scheduled while callbacks are firing waits for the next frame
/// - a cancelled callback never fires, even if it was already due
/// - cancelling a fired or already-cancelled token does nothing
pub trait FrameScheduler {
    /// Monotonic time since the scheduler was created
    fn now(&self) -> Duration;

    fn schedule_after(&self, delay: Duration, callback: FrameCallback) -> CancelToken;

    fn cancel(&self, token: CancelToken);
}

struct Pending {
    due: Duration,
    seq: u64,
    callback: FrameCallback,
}

/// Pending callbacks shared by both scheduler implementations
#[derive(Default)]
struct FrameQueue {
    pending: RefCell<SlotMap<CancelToken, Pending>>,
    next_seq: Cell<u64>,
}

impl FrameQueue {
    fn insert(&self, due: Duration, callback: FrameCallback) -> CancelToken {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.pending.borrow_mut().insert(Pending { due, seq, callback })
    }

    fn remove(&self, token: CancelToken) -> bool {
        self.pending.borrow_mut().remove(token).is_some()
    }

    fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Fire every callback that is due at `now` and was scheduled before this call
    ///
    /// Callbacks are taken out one at a time so that a callback cancelling a
    /// later one in the same frame is honoured. Returns the number fired.
    fn fire_due(&self, now: Duration) -> usize {
        let seq_limit = self.next_seq.get();
        let mut fired = 0;

        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let token = pending
                    .iter()
                    .filter(|(_, p)| p.due <= now && p.seq < seq_limit)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(token, _)| token);
                token.and_then(|token| pending.remove(token))
            };

            // The borrow is released before running the callback so it can
            // schedule or cancel freely.
            match next {
                Some(pending) => {
                    (pending.callback)(now);
                    fired += 1;
                }
                None => break,
            }
        }

        fired
    }
}

fn frame_interval_for(fps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
}

// ============================================================================
// Manual (fake clock) scheduler
// ============================================================================

/// Deterministic scheduler driven by explicit clock advances
///
/// ```ignore
/// let scheduler = Rc::new(ManualScheduler::new());
/// let controller = AnimationController::new(config, scheduler.clone());
/// controller.start();
/// scheduler.run_until_idle(1000);
/// ```
pub struct ManualScheduler {
    clock: Cell<Duration>,
    frame_interval: Duration,
    queue: FrameQueue,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::with_fps(DEFAULT_FPS)
    }

    pub fn with_fps(fps: u32) -> Self {
        Self::with_frame_interval(frame_interval_for(fps))
    }

    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self {
            clock: Cell::new(Duration::ZERO),
            frame_interval,
            queue: FrameQueue::default(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Move the clock forward by `dt` and fire whatever is due
    pub fn advance(&self, dt: Duration) -> usize {
        let now = self.clock.get() + dt;
        self.clock.set(now);
        self.queue.fire_due(now)
    }

    /// Advance by one frame interval
    pub fn advance_frame(&self) -> usize {
        self.advance(self.frame_interval)
    }

    /// Advance frame by frame until nothing is pending or `max_frames` have run
    ///
    /// Returns the number of frames advanced.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while self.pending() > 0 && frames < max_frames {
            self.advance_frame();
            frames += 1;
        }
        frames
    }

    /// Number of callbacks waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.clock.get()
    }

    fn schedule_after(&self, delay: Duration, callback: FrameCallback) -> CancelToken {
        self.queue.insert(self.clock.get() + delay, callback)
    }

    fn cancel(&self, token: CancelToken) {
        self.queue.remove(token);
    }
}

// ============================================================================
// Real-time frame loop
// ============================================================================

/// Scheduler backed by the monotonic system clock
///
/// Hosts with their own vsync call [`FrameLoop::pump`] once per frame.
/// Hosts without one can block in [`FrameLoop::run_until_idle`], which
/// sleeps out the remainder of each frame budget.
pub struct FrameLoop {
    epoch: Instant,
    frame_interval: Duration,
    queue: FrameQueue,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::with_fps(DEFAULT_FPS)
    }

    pub fn with_fps(fps: u32) -> Self {
        Self {
            epoch: Instant::now(),
            frame_interval: frame_interval_for(fps),
            queue: FrameQueue::default(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Fire every callback due at the current time
    pub fn pump(&self) -> usize {
        self.queue.fire_due(self.now())
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pump at the target frame rate until no callbacks remain
    ///
    /// Returns the number of frames pumped.
    pub fn run_until_idle(&self) -> usize {
        let mut frames = 0;

        while self.pending() > 0 {
            let start = Instant::now();
            self.pump();
            frames += 1;

            let elapsed = start.elapsed();
            if elapsed < self.frame_interval {
                thread::sleep(self.frame_interval - elapsed);
            }
        }

        tracing::debug!("FrameLoop idle after {} frames", frames);
        frames
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for FrameLoop {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn schedule_after(&self, delay: Duration, callback: FrameCallback) -> CancelToken {
        self.queue.insert(self.now() + delay, callback)
    }

    fn cancel(&self, token: CancelToken) {
        self.queue.remove(token);
    }
}
