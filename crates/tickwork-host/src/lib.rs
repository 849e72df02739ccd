#![forbid(unsafe_code)]
#![doc = "Host traits for tickwork: platform abstraction for tick scheduling and activity."]
#![doc = ""]
#![doc = "This crate defines the boundary between the tickwork runtime and the embedding"]
#![doc = "environment (a browser event loop via `tickwork-web`, a native event loop, or a"]
#![doc = "test double). The runtime never touches timers or visibility APIs directly; all"]
#![doc = "of it flows through [`Host`]."]

use core::fmt;
use core::time::Duration;
use std::rc::Rc;

/// Opaque handle for a scheduled host callback.
///
/// Handles are allocated by the host and are only meaningful to the host that
/// produced them. Cancelling a handle that already fired (or never existed)
/// must be a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostHandle(pub u64);

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for an activity-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivitySubscription(pub u64);

/// Whether the host is currently foregrounded.
///
/// Backgrounded hosts typically stop delivering frame-aligned callbacks and
/// collapse timer frequency to roughly once per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible and responsive; frame-aligned callbacks are delivered.
    #[default]
    Foreground,
    /// Hidden or inactive.
    Background,
}

impl Visibility {
    /// Map a boolean "is foregrounded" flag to a visibility value.
    #[must_use]
    pub const fn from_foreground(foreground: bool) -> Self {
        if foreground {
            Self::Foreground
        } else {
            Self::Background
        }
    }

    /// `true` for [`Visibility::Foreground`].
    #[must_use]
    pub const fn is_foreground(self) -> bool {
        matches!(self, Self::Foreground)
    }
}

/// One-shot callback invoked by the host for a frame or timer.
pub type TickCallback = Box<dyn FnOnce()>;

/// Callback invoked by the host whenever its visibility changes.
pub type ActivityCallback = Rc<dyn Fn(Visibility)>;

/// Scheduling and activity capabilities supplied by the embedding environment.
///
/// All methods take `&self`: hosts are shared (`Rc<dyn Host>`) between the
/// scheduler and the embedder, and implementations use interior mutability.
/// Everything runs on the single thread the host provides.
///
/// Implementations must invoke callbacks without holding internal borrows,
/// because a callback is free to re-enter the host (schedule another tick,
/// cancel one, or subscribe).
pub trait Host {
    /// Returns `true` while the host is visible and responsive.
    fn is_foregrounded(&self) -> bool;

    /// Whether the host offers a frame-aligned primitive at all.
    fn frame_aligned_available(&self) -> bool {
        true
    }

    /// Run `callback` aligned with the next rendered frame.
    fn schedule_frame_aligned(&self, callback: TickCallback) -> HostHandle;

    /// Cancel a pending frame-aligned callback.
    fn cancel_frame_aligned(&self, handle: HostHandle);

    /// Run `callback` once after `delay` has elapsed.
    fn schedule_delayed(&self, callback: TickCallback, delay: Duration) -> HostHandle;

    /// Cancel a pending delayed callback.
    fn cancel_delayed(&self, handle: HostHandle);

    /// Subscribe to visibility transitions.
    fn on_activity_change(&self, callback: ActivityCallback) -> ActivitySubscription;

    /// Drop a subscription created by [`Host::on_activity_change`].
    fn unsubscribe_activity(&self, subscription: ActivitySubscription);

    /// Current visibility derived from [`Host::is_foregrounded`].
    fn visibility(&self) -> Visibility {
        Visibility::from_foreground(self.is_foregrounded())
    }
}
