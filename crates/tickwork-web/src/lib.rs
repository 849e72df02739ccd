#![forbid(unsafe_code)]

//! `tickwork-web` provides a host-driven [`Host`] implementation.
//!
//! Design goals:
//! - **Host-driven time**: the embedding environment (JS) forwards
//!   `requestAnimationFrame` and timer wakeups by calling
//!   [`WebHost::animation_frame`] and [`WebHost::advance`].
//! - **Deterministic time**: the embedder advances a monotonic clock explicitly,
//!   so the same call sequence always fires the same callbacks in the same order.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate intentionally does not bind to `wasm-bindgen`. It is the shape a
//! JS glue layer wraps, and it doubles as the scheduler's test host.

use core::time::Duration;
use std::cell::RefCell;

pub use tickwork_host::{
    ActivityCallback, ActivitySubscription, Host, HostHandle, TickCallback, Visibility,
};

/// Deterministic monotonic clock controlled by the embedder.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

struct PendingTimer {
    handle: HostHandle,
    deadline: Duration,
    callback: TickCallback,
}

struct WebHostState {
    clock: DeterministicClock,
    visibility: Visibility,
    frame_aligned: bool,
    background_timer_floor: Option<Duration>,
    next_handle: u64,
    frames: Vec<(HostHandle, TickCallback)>,
    timers: Vec<PendingTimer>,
    subscribers: Vec<(ActivitySubscription, ActivityCallback)>,
}

impl WebHostState {
    fn alloc(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Host whose frames, timers, and visibility are pushed by the embedder.
///
/// Share it as `Rc<WebHost>`; the scheduler holds an `Rc<dyn Host>` clone
/// while the embedder keeps its own handle to drive it.
pub struct WebHost {
    state: RefCell<WebHostState>,
}

impl WebHost {
    /// Create a foregrounded host at `t = 0` with frame-aligned callbacks available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(WebHostState {
                clock: DeterministicClock::new(),
                visibility: Visibility::Foreground,
                frame_aligned: true,
                background_timer_floor: None,
                next_handle: 0,
                frames: Vec::new(),
                timers: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Clamp timer delays to at least `floor` while backgrounded.
    ///
    /// Models browsers that throttle hidden tabs to roughly one timer per second.
    #[must_use]
    pub fn with_background_timer_floor(self, floor: Duration) -> Self {
        self.state.borrow_mut().background_timer_floor = Some(floor);
        self
    }

    /// Current monotonic time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().clock.now()
    }

    /// Number of frame callbacks waiting for the next animation frame.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Deadline of the earliest armed timer.
    #[must_use]
    pub fn next_timer_deadline(&self) -> Option<Duration> {
        self.state.borrow().timers.iter().map(|t| t.deadline).min()
    }

    /// Number of live activity subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Toggle availability of the frame-aligned primitive.
    pub fn set_frame_aligned_available(&self, available: bool) {
        self.state.borrow_mut().frame_aligned = available;
    }

    /// Record a visibility change and notify subscribers if it differs.
    pub fn set_visibility(&self, visibility: Visibility) {
        let subscribers: Vec<ActivityCallback> = {
            let mut state = self.state.borrow_mut();
            if state.visibility == visibility {
                return;
            }
            state.visibility = visibility;
            state.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(?visibility, subscribers = subscribers.len(), "visibility change");
        for callback in subscribers {
            callback(visibility);
        }
    }

    /// Deliver one animation frame.
    ///
    /// Runs every frame callback registered before this call, in registration
    /// order. Callbacks registered while the frame runs wait for the next one.
    /// Returns the number of callbacks run.
    pub fn animation_frame(&self) -> usize {
        let watermark = self.state.borrow().next_handle;
        let mut ran = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let idx = state
                    .frames
                    .iter()
                    .position(|(handle, _)| handle.0 <= watermark);
                let frame = idx.map(|idx| state.frames.remove(idx));
                frame
            };
            let Some((_handle, callback)) = next else {
                break;
            };
            #[cfg(feature = "tracing")]
            tracing::trace!(handle = _handle.0, "animation frame callback");
            callback();
            ran += 1;
        }
        ran
    }

    /// Advance the clock by `dt`, firing every timer that comes due.
    ///
    /// Timers fire in deadline order (ties by registration order) with the
    /// clock set to each timer's deadline. Timers armed during the advance
    /// whose deadline falls inside the window also fire. Returns the number
    /// of timers fired.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now().saturating_add(dt);
        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline <= target)
                    .min_by_key(|(_, t)| (t.deadline, t.handle))
                    .map(|(idx, _)| idx);
                let timer = due.map(|idx| state.timers.remove(idx));
                if let Some(timer) = &timer {
                    state.clock.set(timer.deadline);
                }
                timer
            };
            let Some(timer) = next else {
                break;
            };
            #[cfg(feature = "tracing")]
            tracing::trace!(handle = timer.handle.0, deadline_us = u64::try_from(timer.deadline.as_micros()).unwrap_or(u64::MAX), "timer fired");
            (timer.callback)();
            fired += 1;
        }
        self.state.borrow_mut().clock.set(target);
        fired
    }

    /// Advance straight to the earliest timer deadline and fire what is due.
    ///
    /// Returns `0` when no timer is armed.
    pub fn advance_to_next_timer(&self) -> usize {
        match self.next_timer_deadline() {
            Some(deadline) => self.advance(deadline.saturating_sub(self.now())),
            None => 0,
        }
    }

    /// Drive frames (while foregrounded) and timers until nothing is pending.
    ///
    /// Frame callbacks left pending while backgrounded are never delivered, as
    /// in a real hidden tab. Returns the number of steps taken, bounded by
    /// `max_steps`.
    pub fn run_until_idle(&self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps {
            let (frames, timers, foreground) = {
                let state = self.state.borrow();
                (
                    !state.frames.is_empty(),
                    !state.timers.is_empty(),
                    state.visibility.is_foreground(),
                )
            };
            if frames && foreground {
                self.animation_frame();
            } else if timers {
                self.advance_to_next_timer();
            } else {
                break;
            }
            steps += 1;
        }
        steps
    }
}

impl Default for WebHost {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WebHost")
            .field("now", &state.clock.now())
            .field("visibility", &state.visibility)
            .field("frame_aligned", &state.frame_aligned)
            .field("pending_frames", &state.frames.len())
            .field("pending_timers", &state.timers.len())
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

impl Host for WebHost {
    fn is_foregrounded(&self) -> bool {
        self.state.borrow().visibility.is_foreground()
    }

    fn frame_aligned_available(&self) -> bool {
        self.state.borrow().frame_aligned
    }

    fn schedule_frame_aligned(&self, callback: TickCallback) -> HostHandle {
        let mut state = self.state.borrow_mut();
        let handle = HostHandle(state.alloc());
        state.frames.push((handle, callback));
        handle
    }

    fn cancel_frame_aligned(&self, handle: HostHandle) {
        self.state.borrow_mut().frames.retain(|(h, _)| *h != handle);
    }

    fn schedule_delayed(&self, callback: TickCallback, delay: Duration) -> HostHandle {
        let mut state = self.state.borrow_mut();
        let delay = match state.background_timer_floor {
            Some(floor) if !state.visibility.is_foreground() => delay.max(floor),
            _ => delay,
        };
        let handle = HostHandle(state.alloc());
        let deadline = state.clock.now().saturating_add(delay);
        state.timers.push(PendingTimer {
            handle,
            deadline,
            callback,
        });
        handle
    }

    fn cancel_delayed(&self, handle: HostHandle) {
        self.state.borrow_mut().timers.retain(|t| t.handle != handle);
    }

    fn on_activity_change(&self, callback: ActivityCallback) -> ActivitySubscription {
        let mut state = self.state.borrow_mut();
        let subscription = ActivitySubscription(state.alloc());
        state.subscribers.push((subscription, callback));
        subscription
    }

    fn unsubscribe_activity(&self, subscription: ActivitySubscription) {
        self.state
            .borrow_mut()
            .subscribers
            .retain(|(s, _)| *s != subscription);
    }
}
