#![forbid(unsafe_code)]

//! Signals, snapshots, and listener registration.
//!
//! Listeners are registered per [`Signal`] and invoked synchronously, in
//! registration order, with an [`EventSnapshot`]: a fresh value built for each
//! emission, so nothing a listener does to it reaches scheduler internals.
//!
//! A listener answers with a [`Flow`]. An emission is prevented when **any**
//! listener returns [`Flow::PreventDefault`]; every listener still runs.
//! Closures may return `()` (continue), `bool` (`false` prevents, `true`
//! continues), or a `Flow` directly.
//!
//! The single-handler style (one replaceable callback per signal) is a thin
//! layer over the same registry: see [`EventBus::set_handler`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{JobExecutionError, SchedulerError};
use crate::job::{JobId, SharedData};
use crate::tick::TickHandle;

/// Scheduler lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// A run started.
    Start,
    /// A stop request was observed by a tick.
    Stop,
    /// A listener prevented `job` or `tick`; the run halted.
    Break,
    /// A job returned normally.
    Job,
    /// A batch finished.
    Tick,
    /// The queue drained.
    Complete,
    /// A job failed; the run halted.
    Error,
}

impl Signal {
    /// Every signal, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::Stop,
        Self::Break,
        Self::Job,
        Self::Tick,
        Self::Complete,
        Self::Error,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Break => "break",
            Self::Job => "job",
            Self::Tick => "tick",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Whether listeners of this signal can prevent the default action.
    #[must_use]
    pub const fn is_cancelable(self) -> bool {
        matches!(self, Self::Job | Self::Tick)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "break" => Ok(Self::Break),
            "job" => Ok(Self::Job),
            "tick" | "framerequest" | "frameRequest" => Ok(Self::Tick),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            other => Err(SchedulerError::InvalidSignal(other.to_string())),
        }
    }
}

/// A listener's verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    /// Let the scheduler proceed.
    #[default]
    Continue,
    /// Halt the run (honored for `job` and `tick`).
    PreventDefault,
}

impl Flow {
    /// `true` for [`Flow::PreventDefault`].
    #[must_use]
    pub const fn is_prevented(self) -> bool {
        matches!(self, Self::PreventDefault)
    }

    /// Combine two verdicts: prevented if either is.
    pub const fn merge(self, other: Self) -> Self {
        if self.is_prevented() || other.is_prevented() {
            Self::PreventDefault
        } else {
            Self::Continue
        }
    }
}

impl From<()> for Flow {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for Flow {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Self::Continue
        } else {
            Self::PreventDefault
        }
    }
}

/// Immutable view of the scheduler at one emission.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    /// Signal being emitted.
    pub signal: Signal,
    /// Whether the scheduler is running.
    pub busy: bool,
    /// Copy of the shared data mapping.
    pub data: SharedData,
    /// Most recent tick handle (outstanding or last fired).
    pub tick_handle: Option<TickHandle>,
    /// Jobs completed in the current run.
    pub jobs_complete: u64,
    /// Jobs appended since the last clear.
    pub jobs_count: u64,
    /// Job concerned (`job` and `error` signals).
    pub job: Option<JobId>,
    /// Failure being reported (`error` signal).
    pub error: Option<JobExecutionError>,
}

impl EventSnapshot {
    /// Name of the emitted signal.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        self.signal.as_str()
    }
}

/// Identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Registered listener callback.
pub type Listener = Rc<dyn Fn(&EventSnapshot) -> Flow>;

/// Wrap a closure returning `()`, `bool`, or `Flow` as a [`Listener`].
pub fn listener<F, R>(f: F) -> Listener
where
    F: Fn(&EventSnapshot) -> R + 'static,
    R: Into<Flow>,
{
    Rc::new(move |snapshot: &EventSnapshot| f(snapshot).into())
}

/// Per-signal listener registry.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<Signal, Vec<(ListenerId, Listener)>>,
    handlers: HashMap<Signal, ListenerId>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it runs after every listener registered before it.
    pub fn add(&mut self, signal: Signal, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.entry(signal).or_default().push((id, listener));
        id
    }

    /// Unregister a listener. Unknown ids are ignored; returns whether one was removed.
    pub fn remove(&mut self, signal: Signal, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&signal) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        if self.handlers.get(&signal) == Some(&id) {
            self.handlers.remove(&signal);
        }
        list.len() != before
    }

    /// Replace the single handler for `signal`.
    ///
    /// `None` reverts to the no-op handler. Listeners added with
    /// [`EventBus::add`] are unaffected.
    pub fn set_handler(&mut self, signal: Signal, handler: Option<Listener>) {
        if let Some(previous) = self.handlers.remove(&signal) {
            self.remove(signal, previous);
        }
        if let Some(handler) = handler {
            let id = self.add(signal, handler);
            self.handlers.insert(signal, id);
        }
    }

    /// `true` when a single handler is installed for `signal`.
    #[must_use]
    pub fn has_handler(&self, signal: Signal) -> bool {
        self.handlers.contains_key(&signal)
    }

    /// Number of listeners (handlers included) for `signal`.
    #[must_use]
    pub fn listener_count(&self, signal: Signal) -> usize {
        self.listeners.get(&signal).map_or(0, Vec::len)
    }

    /// Clone out the listeners for `signal`, in registration order.
    ///
    /// Emission works on this copy so listeners may register or remove
    /// listeners without disturbing the emission in progress.
    #[must_use]
    pub fn listeners(&self, signal: Signal) -> Vec<Listener> {
        self.listeners
            .get(&signal)
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&'static str, usize)> = Signal::ALL
            .iter()
            .map(|s| (s.as_str(), self.listener_count(*s)))
            .filter(|(_, n)| *n > 0)
            .collect();
        counts.sort_unstable();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Invoke every listener with `snapshot` and aggregate their verdicts.
pub fn dispatch(listeners: &[Listener], snapshot: &EventSnapshot) -> Flow {
    listeners
        .iter()
        .fold(Flow::Continue, |flow, l| flow.merge(l(snapshot)))
}
