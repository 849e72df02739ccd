#![forbid(unsafe_code)]

//! Tick scheduling against the host.
//!
//! [`TickScheduler`] asks the host for the next invocation of the work
//! routine. While the host is foregrounded (and frame-aligned callbacks are
//! available and preferred) it uses a frame-aligned callback; otherwise it
//! arms the fixed-delay fallback timer.
//!
//! At most one tick is outstanding. Every request cancels the previous handle
//! first, and every armed tick carries a generation number so a callback that
//! slipped past cancellation is recognized as stale and ignored.
//!
//! Host activity changes can strand the outstanding tick on the wrong
//! primitive: a hidden host never delivers frames, and a visible one leaves a
//! tick idling on the slow fallback timer. [`TickScheduler::rearm_if_stale`]
//! moves the tick to whichever primitive the host now calls for.

use core::fmt;
use core::time::Duration;
use std::cell::Cell;
use std::rc::Rc;

use tickwork_host::{Host, HostHandle};

/// Which host primitive carries a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    /// Frame-aligned callback.
    FrameAligned,
    /// Fixed-delay fallback timer.
    Delayed,
}

/// The outstanding tick: host primitive, host handle, and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle {
    /// Primitive used.
    pub kind: TickKind,
    /// Handle returned by the host.
    pub host: HostHandle,
    /// Request counter; identifies this arming.
    pub generation: u64,
}

impl fmt::Display for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TickKind::FrameAligned => "frame",
            TickKind::Delayed => "timer",
        };
        write!(f, "{kind}{}@{}", self.host, self.generation)
    }
}

/// Requests ticks from the host and tracks the single outstanding one.
pub struct TickScheduler {
    host: Rc<dyn Host>,
    fallback_delay: Cell<Duration>,
    prefer_frame_aligned: Cell<bool>,
    armed: Cell<Option<TickHandle>>,
    generation: Cell<u64>,
}

impl TickScheduler {
    /// Create a scheduler for `host`.
    pub fn new(host: Rc<dyn Host>, fallback_delay: Duration, prefer_frame_aligned: bool) -> Self {
        Self {
            host,
            fallback_delay: Cell::new(fallback_delay),
            prefer_frame_aligned: Cell::new(prefer_frame_aligned),
            armed: Cell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Fallback timer delay.
    #[must_use]
    pub fn fallback_delay(&self) -> Duration {
        self.fallback_delay.get()
    }

    /// Change the fallback timer delay for future requests.
    pub fn set_fallback_delay(&self, delay: Duration) {
        self.fallback_delay.set(delay);
    }

    /// Whether frame-aligned callbacks are preferred while foregrounded.
    #[must_use]
    pub fn prefer_frame_aligned(&self) -> bool {
        self.prefer_frame_aligned.get()
    }

    /// Prefer (or stop preferring) frame-aligned callbacks.
    pub fn set_prefer_frame_aligned(&self, prefer: bool) {
        self.prefer_frame_aligned.set(prefer);
    }

    /// The outstanding tick, if any.
    #[must_use]
    pub fn armed(&self) -> Option<TickHandle> {
        self.armed.get()
    }

    /// `true` while a tick is outstanding.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.get().is_some()
    }

    /// Primitive the next request would use.
    #[must_use]
    pub fn choose_kind(&self) -> TickKind {
        if self.prefer_frame_aligned.get()
            && self.host.frame_aligned_available()
            && self.host.is_foregrounded()
        {
            TickKind::FrameAligned
        } else {
            TickKind::Delayed
        }
    }

    /// Arm a tick, cancelling any outstanding one first.
    ///
    /// `on_fire` receives the generation of the tick; pass it to
    /// [`TickScheduler::fire`] to claim the tick.
    pub fn request_tick<F>(&self, on_fire: F) -> TickHandle
    where
        F: FnOnce(u64) + 'static,
    {
        self.cancel();
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let kind = self.choose_kind();
        let callback = Box::new(move || on_fire(generation));
        let host = match kind {
            TickKind::FrameAligned => self.host.schedule_frame_aligned(callback),
            TickKind::Delayed => self
                .host
                .schedule_delayed(callback, self.fallback_delay.get()),
        };
        let handle = TickHandle {
            kind,
            host,
            generation,
        };
        self.armed.set(Some(handle));
        tracing::trace!(tick = %handle, "tick armed");
        handle
    }

    /// Claim a fired tick.
    ///
    /// Returns the handle when `generation` matches the outstanding tick and
    /// clears it; returns `None` for stale callbacks.
    pub fn fire(&self, generation: u64) -> Option<TickHandle> {
        match self.armed.get() {
            Some(handle) if handle.generation == generation => {
                self.armed.set(None);
                Some(handle)
            }
            _ => None,
        }
    }

    /// Cancel the outstanding tick, if any.
    pub fn cancel(&self) -> Option<TickHandle> {
        let handle = self.armed.take()?;
        match handle.kind {
            TickKind::FrameAligned => self.host.cancel_frame_aligned(handle.host),
            TickKind::Delayed => self.host.cancel_delayed(handle.host),
        }
        tracing::trace!(tick = %handle, "tick cancelled");
        Some(handle)
    }

    /// Re-arm the outstanding tick if it sits on the wrong primitive.
    ///
    /// A `Delayed` tick moves to the frame-aligned path once the host would
    /// accept one; a `FrameAligned` tick moves to the fallback timer once the
    /// host stops delivering frames. Returns the new handle when re-armed.
    pub fn rearm_if_stale<F>(&self, on_fire: F) -> Option<TickHandle>
    where
        F: FnOnce(u64) + 'static,
    {
        let armed = self.armed.get()?;
        if armed.kind == self.choose_kind() {
            return None;
        }
        Some(self.request_tick(on_fire))
    }
}

impl fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickScheduler")
            .field("fallback_delay", &self.fallback_delay.get())
            .field("prefer_frame_aligned", &self.prefer_frame_aligned.get())
            .field("armed", &self.armed.get())
            .field("generation", &self.generation.get())
            .finish()
    }
}
