#![forbid(unsafe_code)]

//! Tickwork Runtime
//!
//! An adaptive cooperative batch scheduler. Callers enqueue small jobs; the
//! scheduler runs them a few at a time on host-provided ticks so that the
//! host's event loop is never blocked for long.
//!
//! # Key Components
//!
//! - [`JobQueue`] - Jobs ordered by `(priority, insertion order)`, drained in
//!   weight-bounded batches
//! - [`ThrottleAdvisor`] - Per-tick budget, scaled up while the host is backgrounded
//! - [`TickScheduler`] - Frame-aligned or fallback-timer ticks, one outstanding at a time
//! - [`Scheduler`] - The lifecycle engine: start, stop, clear, destroy, and the tick routine
//! - [`EventBus`] - Per-signal listeners receiving immutable [`EventSnapshot`]s
//!
//! # How it fits in the system
//!
//! The runtime never touches timers or visibility directly. Everything goes
//! through the [`Host`] trait from `tickwork-host`; `tickwork-web` provides a
//! host-driven implementation used by browser embedders and by tests.
//!
//! # Logging
//!
//! Lifecycle transitions are logged with `tracing` at `debug`, batches at
//! `trace`, job failures at `warn`. Each tick runs inside a
//! `tickwork.tick` span. The library installs no subscriber.

pub mod config;
pub mod error;
pub mod event;
pub mod job;
pub mod queue;
pub mod scheduler;
pub mod throttle;
pub mod tick;

pub use config::SchedulerConfig;
#[cfg(feature = "policy-config")]
pub use config::ConfigError;
pub use error::{JobError, JobExecutionError, SchedulerError};
pub use event::{EventBus, EventSnapshot, Flow, Listener, ListenerId, Signal, listener};
pub use job::{Job, JobContext, JobId, QueuedJob, SharedData};
pub use queue::JobQueue;
pub use scheduler::{Scheduler, SchedulerState, SchedulerStats};
pub use throttle::ThrottleAdvisor;
pub use tick::{TickHandle, TickKind, TickScheduler};

pub use tickwork_host::{ActivitySubscription, Host, HostHandle, Visibility};
