#![forbid(unsafe_code)]

//! Error types for the scheduler.
//!
//! Two kinds of failure exist:
//!
//! - [`SchedulerError`] is returned synchronously to the caller for API misuse
//!   that cannot be silently ignored (an unknown signal name).
//! - [`JobExecutionError`] is never returned to a caller. A failing job is
//!   caught at the tick boundary, recorded, and surfaced only through the
//!   `error` signal and [`Scheduler::last_error`](crate::Scheduler::last_error).

use std::fmt;
use std::rc::Rc;

use crate::job::JobId;

/// Errors returned by scheduler API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// A listener was registered under a name that is not a known signal.
    #[error("unknown signal `{0}` (expected one of: start, stop, break, job, tick, complete, error)")]
    InvalidSignal(String),
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

/// Failure reported by a job callable.
///
/// Any `std::error::Error` converts into a `JobError`, so job bodies can use
/// `?` freely. Plain messages go through [`JobError::msg`].
///
/// `JobError` deliberately does not implement `std::error::Error` itself;
/// that keeps the blanket `From` conversion coherent.
#[derive(Clone)]
pub struct JobError {
    inner: Rc<dyn std::error::Error + 'static>,
}

impl JobError {
    /// Build an error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(MessageError(message.into())),
        }
    }

    /// Borrow the underlying error.
    #[must_use]
    pub fn as_error(&self) -> &(dyn std::error::Error + 'static) {
        &*self.inner
    }
}

impl<E> From<E> for JobError
where
    E: std::error::Error + 'static,
{
    fn from(err: E) -> Self {
        Self {
            inner: Rc::new(err),
        }
    }
}

impl fmt::Debug for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

/// A job callable failed during a tick.
///
/// The failing job is put back at the head of the queue; restarting the
/// scheduler retries it first.
#[derive(Debug, Clone, thiserror::Error)]
#[error("job {job} failed: {cause}")]
pub struct JobExecutionError {
    job: JobId,
    cause: JobError,
}

impl JobExecutionError {
    pub(crate) fn new(job: JobId, cause: JobError) -> Self {
        Self { job, cause }
    }

    /// The job that failed.
    #[must_use]
    pub const fn job(&self) -> JobId {
        self.job
    }

    /// What the job reported.
    #[must_use]
    pub const fn cause(&self) -> &JobError {
        &self.cause
    }
}
