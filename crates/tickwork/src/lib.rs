#![forbid(unsafe_code)]

//! Tickwork public facade crate.
//!
//! Re-exports the stable surface of the runtime and host crates and offers a
//! prelude for day-to-day usage.
//!
//! ```
//! use std::rc::Rc;
//! use tickwork::prelude::*;
//!
//! let host = Rc::new(WebHost::new());
//! let scheduler = Scheduler::new(host.clone());
//! scheduler.append(Job::new(|_| Ok(())).with_weight(0.5));
//! scheduler.start();
//! host.run_until_idle(4);
//! assert_eq!(scheduler.state(), SchedulerState::Idle);
//! ```

// --- Host re-exports -------------------------------------------------------

pub use tickwork_host::{
    ActivityCallback, ActivitySubscription, Host, HostHandle, TickCallback, Visibility,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tickwork_runtime::{
    EventSnapshot, Flow, Job, JobContext, JobError, JobExecutionError, JobId, ListenerId,
    Scheduler, SchedulerConfig, SchedulerError, SchedulerState, SchedulerStats, SharedData,
    Signal, TickHandle, TickKind, listener,
};

#[cfg(feature = "policy-config")]
pub use tickwork_runtime::ConfigError;

#[cfg(feature = "web")]
pub use tickwork_web::{DeterministicClock, WebHost};

/// Standard result type for tickwork APIs.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Common imports for embedding a scheduler.
pub mod prelude {
    pub use crate::{
        EventSnapshot, Flow, Host, Job, JobContext, JobError, JobId, Result, Scheduler,
        SchedulerConfig, SchedulerState, Signal, Visibility,
    };

    #[cfg(feature = "web")]
    pub use crate::WebHost;

    pub use crate::{host, runtime};
}

pub use tickwork_host as host;
pub use tickwork_runtime as runtime;
#[cfg(feature = "web")]
pub use tickwork_web as web;
