//! Animation controller
//!
//! [`AnimationController`] runs one [`SpringConfig`] to completion. It selects
//! the strategy, waits out the start delay, ticks the strategy once per frame
//! through the injected [`FrameScheduler`], and reports progress to listeners.
//!
//! ```text
//! Idle --start()--> Delayed --delay elapsed--> Running --settled/elapsed--> Ended
//!   \--start() (no delay)-------------------->/   \--cancel()--> Cancelled --> Ended
//! ```
//!
//! Controllers are single-use: once `Ended`, `start()` does nothing. Create a
//! new controller for each run.
//!
//! Listeners run synchronously inside `start`/`cancel`/`end` or the frame
//! callback. The controller never holds a borrow of its own state while a
//! listener runs, so listeners may call back into it through a
//! [`ControllerHandle`]. State transitions are applied (and the next frame is
//! scheduled) before listeners are notified, so a panicking listener loses
//! only its own notifications. If an `on_cancel` listener panics the run is
//! left `Cancelled`; `end()` then moves it to `Ended` and fires `on_end`.

use slotmap::SlotMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::SpringConfig;
use crate::listener::{AnimationListener, ListenerId};
use crate::scheduler::{CancelToken, FrameScheduler};
use crate::strategy::{select, Animatable, AnimatedSample, Strategy, StrategyKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    Idle,
    /// Started, waiting out the start delay
    Delayed,
    Running,
    /// Cancelled; moves to `Ended` as soon as `on_cancel` listeners return
    Cancelled,
    Ended,
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimationState::Idle => "idle",
            AnimationState::Delayed => "delayed",
            AnimationState::Running => "running",
            AnimationState::Cancelled => "cancelled",
            AnimationState::Ended => "ended",
        };
        f.write_str(name)
    }
}

struct Run {
    state: AnimationState,
    strategy: Strategy,
    value: f32,
    started_at: Duration,
    last_frame: Duration,
    pending: Option<CancelToken>,
    /// Bumped by `cancel`/`end` so in-flight dispatch loops can stop early
    interrupts: u64,
}

impl Run {
    /// Tick the strategy up to `now`; schedules nothing
    fn step(&mut self, now: Duration) -> AnimatedSample {
        let dt = now.saturating_sub(self.last_frame);
        self.last_frame = now;
        let sample = self.strategy.tick(dt);
        self.value = sample.value;
        sample
    }
}

struct Shared {
    config: SpringConfig,
    kind: StrategyKind,
    scheduler: Rc<dyn FrameScheduler>,
    run: RefCell<Run>,
    listeners: RefCell<SlotMap<ListenerId, Rc<dyn AnimationListener>>>,
}

type FrameHandler = fn(&Rc<Shared>, Duration);

impl Shared {
    fn state(&self) -> AnimationState {
        self.run.borrow().state
    }

    fn value(&self) -> f32 {
        self.run.borrow().value
    }

    fn schedule(self: &Rc<Self>, delay: Duration, handler: FrameHandler) -> CancelToken {
        // The scheduler only holds a weak reference; dropping the controller
        // turns any callback still in flight into a no-op.
        let weak = Rc::downgrade(self);
        self.scheduler.schedule_after(
            delay,
            Box::new(move |now| {
                if let Some(shared) = weak.upgrade() {
                    handler(&shared, now);
                }
            }),
        )
    }

    fn start(self: &Rc<Self>) {
        let delay = self.config.start_delay();
        let now = {
            let mut run = self.run.borrow_mut();
            if run.state != AnimationState::Idle {
                tracing::debug!("start() ignored while {}", run.state);
                return;
            }

            let now = self.scheduler.now();
            run.started_at = now;

            if !delay.is_zero() {
                run.state = AnimationState::Delayed;
                run.pending = Some(self.schedule(delay, Shared::on_delay_elapsed));
                tracing::debug!("{} animation delayed by {:?}", self.kind, delay);
                return;
            }
            now
        };

        self.begin_motion(now, now);
    }

    fn on_delay_elapsed(self: &Rc<Self>, now: Duration) {
        let motion_start = {
            let mut run = self.run.borrow_mut();
            if run.state != AnimationState::Delayed {
                return;
            }
            run.pending = None;
            run.started_at + self.config.start_delay()
        };

        self.begin_motion(motion_start, now);
    }

    fn begin_motion(self: &Rc<Self>, motion_start: Duration, now: Duration) {
        let (sample, finished, generation) = {
            let mut run = self.run.borrow_mut();
            run.state = AnimationState::Running;
            run.strategy.start();
            run.last_frame = motion_start;

            let sample = run.step(now);
            let finished = self.settle_or_schedule(&mut run);
            (sample, finished, run.interrupts)
        };

        tracing::debug!(
            "{} animation running from {} to {}",
            self.kind,
            self.config.from(),
            self.config.to()
        );

        self.dispatch(generation, |listener| listener.on_start());
        self.deliver(sample, finished, generation);
    }

    fn on_frame(self: &Rc<Self>, now: Duration) {
        let (sample, finished, generation) = {
            let mut run = self.run.borrow_mut();
            if run.state != AnimationState::Running {
                return;
            }
            run.pending = None;

            let sample = run.step(now);
            let finished = self.settle_or_schedule(&mut run);
            (sample, finished, run.interrupts)
        };

        tracing::trace!(
            "frame at {:?}: value={} elapsed={:?}",
            now,
            sample.value,
            sample.elapsed
        );

        self.deliver(sample, finished, generation);
    }

    /// End the run if the strategy is done, otherwise book the next frame
    fn settle_or_schedule(self: &Rc<Self>, run: &mut Run) -> bool {
        if run.strategy.is_finished() {
            run.state = AnimationState::Ended;
            true
        } else {
            run.pending = Some(self.schedule(Duration::ZERO, Shared::on_frame));
            false
        }
    }

    fn deliver(&self, sample: AnimatedSample, finished: bool, generation: u64) {
        self.dispatch(generation, |listener| listener.on_update(sample.value));

        if finished {
            tracing::debug!(
                "{} animation ended at {} after {:?}",
                self.kind,
                sample.value,
                sample.elapsed
            );
            self.dispatch(generation, |listener| listener.on_end());
        }
    }

    fn cancel(&self) {
        let generation = {
            let mut run = self.run.borrow_mut();
            if !matches!(
                run.state,
                AnimationState::Delayed | AnimationState::Running
            ) {
                return;
            }

            if let Some(token) = run.pending.take() {
                self.scheduler.cancel(token);
            }
            run.strategy.cancel();
            run.state = AnimationState::Cancelled;
            run.interrupts += 1;
            run.interrupts
        };

        tracing::debug!("{} animation cancelled at {}", self.kind, self.value());
        self.dispatch(generation, |listener| listener.on_cancel());

        self.run.borrow_mut().state = AnimationState::Ended;
        self.dispatch(generation, |listener| listener.on_end());
    }

    fn end(&self) {
        let (generation, value, motion_began) = {
            let mut run = self.run.borrow_mut();
            let state = run.state;
            let motion_began = match state {
                AnimationState::Idle | AnimationState::Delayed => false,
                AnimationState::Running => true,
                AnimationState::Cancelled => {
                    run.state = AnimationState::Ended;
                    run.interrupts += 1;
                    let generation = run.interrupts;
                    drop(run);

                    // Finish a cancel whose on_cancel round did not complete
                    tracing::debug!("{} animation cancel completed by end()", self.kind);
                    self.dispatch(generation, |listener| listener.on_end());
                    return;
                }
                AnimationState::Ended => return,
            };

            if let Some(token) = run.pending.take() {
                self.scheduler.cancel(token);
            }
            run.strategy.finish();
            run.value = run.strategy.current_value();
            run.state = AnimationState::Ended;
            run.interrupts += 1;
            (run.interrupts, run.value, motion_began)
        };

        tracing::debug!("{} animation ended early at {}", self.kind, value);

        if !motion_began {
            self.dispatch(generation, |listener| listener.on_start());
        }
        self.dispatch(generation, |listener| listener.on_update(value));
        self.dispatch(generation, |listener| listener.on_end());
    }

    /// Notify every listener registered at call time
    ///
    /// Stops early if a listener cancels or ends the run, and skips listeners
    /// removed by an earlier listener in the same round.
    fn dispatch(&self, generation: u64, event: impl Fn(&dyn AnimationListener)) {
        let listeners: Vec<(ListenerId, Rc<dyn AnimationListener>)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, listener)| (id, Rc::clone(listener)))
            .collect();

        for (id, listener) in listeners {
            if self.run.borrow().interrupts != generation {
                break;
            }
            if !self.listeners.borrow().contains_key(id) {
                continue;
            }
            event(listener.as_ref());
        }
    }
}

/// Drives one spring animation run
pub struct AnimationController {
    shared: Rc<Shared>,
}

impl AnimationController {
    pub fn new(config: SpringConfig, scheduler: Rc<dyn FrameScheduler>) -> Self {
        let strategy = select(&config);
        let kind = strategy.kind();
        tracing::debug!("selected {} strategy", kind);

        Self {
            shared: Rc::new(Shared {
                config,
                kind,
                scheduler,
                run: RefCell::new(Run {
                    state: AnimationState::Idle,
                    value: strategy.current_value(),
                    strategy,
                    started_at: Duration::ZERO,
                    last_frame: Duration::ZERO,
                    pending: None,
                    interrupts: 0,
                }),
                listeners: RefCell::new(SlotMap::with_key()),
            }),
        }
    }

    pub fn config(&self) -> &SpringConfig {
        &self.shared.config
    }

    /// Which strategy the config selected
    pub fn strategy_kind(&self) -> StrategyKind {
        self.shared.kind
    }

    pub fn state(&self) -> AnimationState {
        self.shared.state()
    }

    /// Start the run. Ignored unless the controller is idle.
    pub fn start(&self) {
        self.shared.start();
    }

    /// Stop at the current value. Fires `on_cancel` then `on_end`.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Jump to `to` and finish. Fires `on_update(to)` then `on_end`.
    ///
    /// On a run left `Cancelled` it only fires `on_end`, keeping the value.
    pub fn end(&self) {
        self.shared.end();
    }

    /// True once motion has begun and until the run ends
    pub fn is_running(&self) -> bool {
        self.state() == AnimationState::Running
    }

    /// True from `start()` until the run ends, including the start delay
    pub fn is_started(&self) -> bool {
        matches!(
            self.state(),
            AnimationState::Delayed | AnimationState::Running
        )
    }

    pub fn current_value(&self) -> f32 {
        self.shared.value()
    }

    pub fn add_listener(&self, listener: impl AnimationListener + 'static) -> ListenerId {
        self.shared.listeners.borrow_mut().insert(Rc::new(listener))
    }

    /// Returns `false` if the listener was already removed
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.borrow_mut().remove(id).is_some()
    }

    /// A weak handle listeners can capture to control this animation
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }
}

impl Drop for AnimationController {
    fn drop(&mut self) {
        // Stop the frame loop silently; no listener events on drop
        if let Some(token) = self.shared.run.borrow_mut().pending.take() {
            self.shared.scheduler.cancel(token);
        }
    }
}

impl fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("strategy", &self.shared.kind)
            .field("state", &self.state())
            .field("value", &self.current_value())
            .finish()
    }
}

/// Weak handle to an [`AnimationController`]
///
/// Does not keep the controller alive. Every method is a no-op (or returns
/// `None`) once the controller has been dropped.
#[derive(Clone)]
pub struct ControllerHandle {
    shared: Weak<Shared>,
}

impl ControllerHandle {
    pub fn start(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.start();
        }
    }

    pub fn cancel(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.cancel();
        }
    }

    pub fn end(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.end();
        }
    }

    pub fn state(&self) -> Option<AnimationState> {
        self.shared.upgrade().map(|shared| shared.state())
    }

    pub fn is_running(&self) -> bool {
        self.state() == Some(AnimationState::Running)
    }

    pub fn current_value(&self) -> Option<f32> {
        self.shared.upgrade().map(|shared| shared.value())
    }

    /// Check if the controller is still alive
    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}
