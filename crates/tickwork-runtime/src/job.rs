#![forbid(unsafe_code)]

//! Jobs: deferred callables plus scheduling metadata.
//!
//! A [`Job`] is built with a closure and optional arguments, weight, and
//! priority, then handed to [`Scheduler::append`](crate::Scheduler::append).
//! Once enqueued it is immutable; the only thing that can happen to it is
//! execution or removal.

use std::fmt;

use serde_json::Value;

use crate::error::JobError;
use crate::scheduler::Scheduler;

/// Mapping shared by every job and listener of one scheduler.
pub type SharedData = serde_json::Map<String, Value>;

/// Default weight: a job that consumes a whole unit of budget.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Default priority.
pub const DEFAULT_PRIORITY: i64 = 0;

/// Identity of an enqueued job.
///
/// Ids grow monotonically per scheduler and double as the insertion order
/// used to break priority ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Clamp a weight into `(0, 1]`.
///
/// Anything outside the range (including NaN and infinities) counts as a
/// whole unit.
#[must_use]
pub fn normalize_weight(weight: f64) -> f64 {
    if weight > 0.0 && weight <= 1.0 {
        weight
    } else {
        DEFAULT_WEIGHT
    }
}

type JobFn = dyn FnMut(&JobContext<'_>) -> Result<(), JobError>;

/// A unit of deferred work.
pub struct Job {
    callable: Box<JobFn>,
    args: Vec<Value>,
    weight: f64,
    priority: i64,
}

impl Job {
    /// Wrap a callable with default weight and priority and no arguments.
    pub fn new<F>(callable: F) -> Self
    where
        F: FnMut(&JobContext<'_>) -> Result<(), JobError> + 'static,
    {
        Self {
            callable: Box::new(callable),
            args: Vec::new(),
            weight: DEFAULT_WEIGHT,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Replace the argument list.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Append one argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the weight. Values outside `(0, 1]` clamp to `1`.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = normalize_weight(weight);
        self
    }

    /// Set the priority. Lower values run first.
    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Normalized weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Priority key.
    #[must_use]
    pub const fn priority(&self) -> i64 {
        self.priority
    }

    /// Arguments passed to the callable.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("args", &self.args)
            .field("weight", &self.weight)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// A job that has been assigned an id by a queue.
#[derive(Debug)]
pub struct QueuedJob {
    id: JobId,
    job: Job,
}

impl QueuedJob {
    pub(crate) fn new(id: JobId, job: Job) -> Self {
        Self { id, job }
    }

    /// Job identity.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Normalized weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.job.weight
    }

    /// Priority key.
    #[must_use]
    pub const fn priority(&self) -> i64 {
        self.job.priority
    }

    /// Sort key: `(priority, insertion order)`.
    #[must_use]
    pub const fn sort_key(&self) -> (i64, u64) {
        (self.job.priority, self.id.0)
    }

    /// Run the callable once.
    pub(crate) fn invoke(&mut self, scheduler: &Scheduler) -> Result<(), JobError> {
        let Job { callable, args, .. } = &mut self.job;
        let ctx = JobContext {
            id: self.id,
            args: args.as_slice(),
            scheduler,
        };
        callable(&ctx)
    }
}

/// What a running job can see.
pub struct JobContext<'a> {
    id: JobId,
    args: &'a [Value],
    scheduler: &'a Scheduler,
}

impl JobContext<'_> {
    /// The running job's id.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// All arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// Argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Handle to the scheduler running this job.
    ///
    /// Appending from inside a job is legal and affects the next batch.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        self.scheduler
    }

    /// Read the shared data mapping.
    pub fn with_data<R>(&self, f: impl FnOnce(&SharedData) -> R) -> R {
        self.scheduler.with_data(f)
    }

    /// Mutate the shared data mapping.
    pub fn with_data_mut<R>(&self, f: impl FnOnce(&mut SharedData) -> R) -> R {
        self.scheduler.with_data_mut(f)
    }
}
