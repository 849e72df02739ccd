#![forbid(unsafe_code)]

//! The lifecycle engine.
//!
//! [`Scheduler`] ties the pieces together: it owns the [`JobQueue`], asks the
//! [`ThrottleAdvisor`] for a budget on every tick, runs the drained batch,
//! emits signals through the [`EventBus`], and asks the [`TickScheduler`] for
//! the next tick.
//!
//! # State machine
//!
//! ```text
//!            start()                 queue empty after a tick
//!   Idle ───────────▶ Running ───────────────────────────────▶ Completed ─▶ Idle
//!    ▲                 │  │  │
//!    │   stop observed │  │  │ job fails
//!    └─────────────────┘  │  └──────────▶ ErrorHalted
//!                         │ job/tick listener prevents
//!                         └─────────────▶ Broken
//! ```
//!
//! `Broken` and `ErrorHalted` keep whatever is still queued; a later
//! [`Scheduler::start`] resumes from there. `Completed` is transient: the
//! `complete` listeners observe it, then the queue and counters are reset and
//! the scheduler settles in `Idle`.
//!
//! # Re-entrancy
//!
//! Jobs and listeners receive the scheduler and may call any method on it,
//! including `append`, `stop`, `clear`, and `start`. No internal borrow is held
//! while a job or listener runs. A `clear()` issued from inside a tick bumps an
//! epoch counter and the tick in progress unwinds silently.
//!
//! # Failure policy
//!
//! - A job returning `Err` halts the run in `ErrorHalted`. The failing job and
//!   the not-yet-run remainder of its batch go back to the front of the queue,
//!   in order, so the next `start()` retries the same job first. Restarting is
//!   always manual.
//! - A `break` discards the not-yet-run remainder of the batch.
//! - Panics from jobs or listeners are not caught.

use core::fmt;
use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tickwork_host::{ActivitySubscription, Host, Visibility};

use crate::config::SchedulerConfig;
use crate::error::{JobError, JobExecutionError, SchedulerError};
use crate::event::{self, EventBus, EventSnapshot, Flow, Listener, ListenerId, Signal};
use crate::job::{Job, JobContext, JobId, QueuedJob, SharedData};
use crate::queue::JobQueue;
use crate::throttle::ThrottleAdvisor;
use crate::tick::{TickHandle, TickScheduler};

/// Where the scheduler is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Not running. The queue may hold jobs.
    #[default]
    Idle,
    /// Ticks are being requested and batches executed.
    Running,
    /// A listener prevented a `job` or `tick` signal.
    Broken,
    /// A job failed; it waits at the head of the queue.
    ErrorHalted,
    /// The queue drained; visible to `complete` listeners only.
    Completed,
}

impl SchedulerState {
    /// Lowercase name used in logs and stats.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Broken => "broken",
            Self::ErrorHalted => "error_halted",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time counters for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerStats {
    /// Lifecycle state.
    pub state: SchedulerState,
    /// Whether the scheduler is running.
    pub busy: bool,
    /// Jobs waiting in the queue.
    pub queued: usize,
    /// Jobs appended since the last clear.
    pub jobs_count: u64,
    /// Jobs completed since the last clear.
    pub jobs_complete: u64,
    /// Ticks executed in the current run.
    pub ticks: u64,
    /// Budget the next tick would use.
    pub budget: f64,
    /// Current host visibility.
    pub visibility: Visibility,
    /// Outstanding or most recent tick.
    pub tick_handle: Option<TickHandle>,
}

struct Inner {
    host: Rc<dyn Host>,
    queue: RefCell<JobQueue>,
    throttle: RefCell<ThrottleAdvisor>,
    ticks: TickScheduler,
    bus: RefCell<EventBus>,
    data: RefCell<SharedData>,
    state: Cell<SchedulerState>,
    busy: Cell<bool>,
    epoch: Cell<u64>,
    ticks_run: Cell<u64>,
    last_tick: Cell<Option<TickHandle>>,
    last_error: RefCell<Option<JobExecutionError>>,
    activity: Cell<Option<ActivitySubscription>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.ticks.cancel();
        if let Some(subscription) = self.activity.take() {
            self.host.unsubscribe_activity(subscription);
        }
    }
}

/// Adaptive cooperative batch scheduler.
///
/// `Scheduler` is a cheap, clonable handle; clones drive the same scheduler.
/// Host callbacks hold only a weak reference, so dropping the last handle
/// cancels the outstanding tick and releases the activity subscription.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use tickwork_runtime::{Job, Scheduler};
/// use tickwork_web::WebHost;
///
/// let host = Rc::new(WebHost::new());
/// let scheduler = Scheduler::new(host.clone());
/// for n in 0..3 {
///     scheduler.append(Job::new(move |ctx| {
///         ctx.with_data_mut(|data| data.insert(format!("job{n}"), true.into()));
///         Ok(())
///     }));
/// }
/// scheduler.start();
/// host.run_until_idle(16);
/// assert_eq!(scheduler.data().len(), 3);
/// assert!(!scheduler.busy());
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    /// Create an idle scheduler with the default configuration.
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self::with_config(host, SchedulerConfig::default())
    }

    /// Create an idle scheduler with `config` (clamped).
    pub fn with_config(host: Rc<dyn Host>, config: SchedulerConfig) -> Self {
        let config = config.normalized();
        let ticks = TickScheduler::new(
            Rc::clone(&host),
            config.fallback_delay(),
            config.prefer_frame_aligned,
        );
        Self {
            inner: Rc::new(Inner {
                host,
                queue: RefCell::new(JobQueue::new()),
                throttle: RefCell::new(ThrottleAdvisor::from_config(&config)),
                ticks,
                bus: RefCell::new(EventBus::new()),
                data: RefCell::new(SharedData::new()),
                state: Cell::new(SchedulerState::Idle),
                busy: Cell::new(false),
                epoch: Cell::new(0),
                ticks_run: Cell::new(0),
                last_tick: Cell::new(None),
                last_error: RefCell::new(None),
                activity: Cell::new(None),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    /// Enqueue a job. Legal at any time, including from inside a job or
    /// listener; a running scheduler sees it on the next batch.
    pub fn append(&self, job: Job) -> JobId {
        let id = self.inner.queue.borrow_mut().append(job);
        tracing::trace!(job = %id, "job appended");
        id
    }

    /// Enqueue a closure with default weight and priority.
    pub fn append_fn<F>(&self, callable: F) -> JobId
    where
        F: FnMut(&JobContext<'_>) -> Result<(), JobError> + 'static,
    {
        self.append(Job::new(callable))
    }

    /// Id of the job the next batch starts with.
    #[must_use]
    pub fn peek_next(&self) -> Option<JobId> {
        self.inner.queue.borrow().peek().map(QueuedJob::id)
    }

    /// Jobs waiting in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// `true` when no job is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    /// Jobs appended since the last clear.
    #[must_use]
    pub fn jobs_count(&self) -> u64 {
        self.inner.queue.borrow().jobs_count()
    }

    /// Jobs that returned normally since the last clear.
    #[must_use]
    pub fn jobs_complete(&self) -> u64 {
        self.inner.queue.borrow().jobs_complete()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begin running. A no-op while already running.
    ///
    /// Clears the last error, emits `start`, and requests the first tick.
    pub fn start(&self) {
        let inner = &self.inner;
        if inner.busy.get() {
            return;
        }
        self.subscribe_activity();
        inner.busy.set(true);
        inner.state.set(SchedulerState::Running);
        inner.ticks_run.set(0);
        inner.last_error.replace(None);
        let epoch = inner.epoch.get();
        tracing::debug!(queued = self.len(), "scheduler started");
        let _ = self.emit(Signal::Start, None, None);
        if inner.epoch.get() != epoch {
            return;
        }
        self.request_tick();
    }

    /// Ask a running scheduler to halt.
    ///
    /// Cooperative: the tick in progress (or the next one) observes the
    /// request, emits `stop`, and settles in `Idle`. Queued jobs stay queued.
    pub fn stop(&self) {
        if self.inner.busy.replace(false) {
            tracing::debug!("stop requested");
        }
    }

    /// Cancel the outstanding tick, drop every job, and reset the counters.
    ///
    /// Never emits a signal. The scheduler settles in `Idle` and can be
    /// started again; shared data is kept.
    pub fn clear(&self) {
        let inner = &self.inner;
        inner.epoch.set(inner.epoch.get() + 1);
        inner.ticks.cancel();
        inner.queue.borrow_mut().clear();
        inner.busy.set(false);
        inner.state.set(SchedulerState::Idle);
        inner.ticks_run.set(0);
        inner.last_error.replace(None);
        tracing::debug!("scheduler cleared");
    }

    /// Stop, clear, and release the activity subscription.
    pub fn destroy(&self) {
        self.stop();
        self.clear();
        if let Some(subscription) = self.inner.activity.take() {
            self.inner.host.unsubscribe_activity(subscription);
        }
        tracing::debug!("scheduler destroyed");
    }

    /// Whether the scheduler is running.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.inner.busy.get()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.state.get()
    }

    /// Ticks executed in the current run.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.inner.ticks_run.get()
    }

    /// Failure that halted the last run, if it ended in `ErrorHalted`.
    #[must_use]
    pub fn last_error(&self) -> Option<JobExecutionError> {
        self.inner.last_error.borrow().clone()
    }

    /// Outstanding tick, or the most recent one.
    #[must_use]
    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.inner.last_tick.get()
    }

    /// `true` while a tick is armed with the host.
    #[must_use]
    pub fn tick_armed(&self) -> bool {
        self.inner.ticks.is_armed()
    }

    // ------------------------------------------------------------------
    // Shared data
    // ------------------------------------------------------------------

    /// Copy of the shared data mapping.
    #[must_use]
    pub fn data(&self) -> SharedData {
        self.inner.data.borrow().clone()
    }

    /// Read the shared data mapping in place.
    ///
    /// # Panics
    ///
    /// Panics if `f` re-enters [`Scheduler::with_data_mut`].
    pub fn with_data<R>(&self, f: impl FnOnce(&SharedData) -> R) -> R {
        f(&self.inner.data.borrow())
    }

    /// Mutate the shared data mapping in place.
    ///
    /// # Panics
    ///
    /// Panics if `f` re-enters [`Scheduler::with_data`] or `with_data_mut`.
    pub fn with_data_mut<R>(&self, f: impl FnOnce(&mut SharedData) -> R) -> R {
        f(&mut self.inner.data.borrow_mut())
    }

    // ------------------------------------------------------------------
    // Tuning
    // ------------------------------------------------------------------

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        let throttle = self.inner.throttle.borrow();
        let delay = self.inner.ticks.fallback_delay();
        SchedulerConfig {
            jobs_per_tick: throttle.jobs_per_tick(),
            inactive_multiplier: throttle.inactive_multiplier(),
            work_on_inactive: throttle.work_on_inactive(),
            fallback_delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            prefer_frame_aligned: self.inner.ticks.prefer_frame_aligned(),
        }
    }

    /// Base budget per tick, in weight units.
    #[must_use]
    pub fn jobs_per_tick(&self) -> f64 {
        self.inner.throttle.borrow().jobs_per_tick()
    }

    /// Set the base budget. Non-finite or non-positive values clamp to `1`.
    pub fn set_jobs_per_tick(&self, jobs_per_tick: f64) {
        self.inner.throttle.borrow_mut().set_jobs_per_tick(jobs_per_tick);
    }

    /// Budget multiplier while backgrounded.
    #[must_use]
    pub fn inactive_multiplier(&self) -> f64 {
        self.inner.throttle.borrow().inactive_multiplier()
    }

    /// Set the background multiplier. Values below `1` clamp to `1`.
    pub fn set_inactive_multiplier(&self, multiplier: f64) {
        self.inner
            .throttle
            .borrow_mut()
            .set_inactive_multiplier(multiplier);
    }

    /// Whether the background multiplier is applied.
    #[must_use]
    pub fn work_on_inactive(&self) -> bool {
        self.inner.throttle.borrow().work_on_inactive()
    }

    /// Enable or disable the background multiplier.
    pub fn set_work_on_inactive(&self, enabled: bool) {
        self.inner.throttle.borrow_mut().set_work_on_inactive(enabled);
    }

    /// Fallback timer delay.
    #[must_use]
    pub fn fallback_delay(&self) -> Duration {
        self.inner.ticks.fallback_delay()
    }

    /// Set the fallback timer delay for future ticks. Zero clamps to 1ms.
    pub fn set_fallback_delay(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let ms = SchedulerConfig::clamp_fallback_delay_ms(ms);
        self.inner.ticks.set_fallback_delay(Duration::from_millis(ms));
    }

    /// Prefer (or stop preferring) frame-aligned ticks while foregrounded.
    pub fn set_prefer_frame_aligned(&self, prefer: bool) {
        self.inner.ticks.set_prefer_frame_aligned(prefer);
    }

    /// Budget the next tick would use given current host visibility.
    #[must_use]
    pub fn budget(&self) -> f64 {
        self.inner
            .throttle
            .borrow()
            .budget(self.inner.host.visibility())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a listener by signal name.
    ///
    /// `"framerequest"` and `"frameRequest"` are accepted for `tick`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidSignal`] for unknown names.
    pub fn add_event_listener<F, R>(&self, name: &str, f: F) -> Result<ListenerId, SchedulerError>
    where
        F: Fn(&EventSnapshot) -> R + 'static,
        R: Into<Flow>,
    {
        let signal: Signal = name.parse()?;
        Ok(self.on(signal, f))
    }

    /// Unregister a listener by signal name. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidSignal`] for unknown names.
    pub fn remove_event_listener(&self, name: &str, id: ListenerId) -> Result<bool, SchedulerError> {
        let signal: Signal = name.parse()?;
        Ok(self.off(signal, id))
    }

    /// Register a listener for `signal`.
    ///
    /// The closure may return `()`, `bool` (`false` prevents), or [`Flow`].
    pub fn on<F, R>(&self, signal: Signal, f: F) -> ListenerId
    where
        F: Fn(&EventSnapshot) -> R + 'static,
        R: Into<Flow>,
    {
        self.inner.bus.borrow_mut().add(signal, event::listener(f))
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn off(&self, signal: Signal, id: ListenerId) -> bool {
        self.inner.bus.borrow_mut().remove(signal, id)
    }

    /// Replace the single handler for `signal`; `None` reverts to a no-op.
    pub fn set_handler(&self, signal: Signal, handler: Option<Listener>) {
        self.inner.bus.borrow_mut().set_handler(signal, handler);
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Snapshot of counters and state.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        let queue = self.inner.queue.borrow();
        SchedulerStats {
            state: self.state(),
            busy: self.busy(),
            queued: queue.len(),
            jobs_count: queue.jobs_count(),
            jobs_complete: queue.jobs_complete(),
            ticks: self.ticks(),
            budget: self.budget(),
            visibility: self.inner.host.visibility(),
            tick_handle: self.tick_handle(),
        }
    }

    /// Key/value diagnostics for debug overlays and logs.
    #[must_use]
    pub fn debug_stats(&self) -> Vec<(String, String)> {
        let stats = self.stats();
        let tick = stats
            .tick_handle
            .map_or_else(|| "none".to_string(), |h| h.to_string());
        vec![
            ("state".into(), stats.state.to_string()),
            ("busy".into(), stats.busy.to_string()),
            ("queued".into(), stats.queued.to_string()),
            ("jobs_count".into(), stats.jobs_count.to_string()),
            ("jobs_complete".into(), stats.jobs_complete.to_string()),
            ("ticks".into(), stats.ticks.to_string()),
            ("budget".into(), stats.budget.to_string()),
            (
                "visibility".into(),
                if stats.visibility.is_foreground() {
                    "foreground".into()
                } else {
                    "background".into()
                },
            ),
            ("tick".into(), tick),
        ]
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn request_tick(&self) {
        let weak = Rc::downgrade(&self.inner);
        let handle = self.inner.ticks.request_tick(move |generation| {
            if let Some(scheduler) = Self::from_weak(&weak) {
                scheduler.on_tick(generation);
            }
        });
        self.inner.last_tick.set(Some(handle));
    }

    fn subscribe_activity(&self) {
        if self.inner.activity.get().is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let subscription = self
            .inner
            .host
            .on_activity_change(Rc::new(move |visibility: Visibility| {
                if let Some(scheduler) = Self::from_weak(&weak) {
                    scheduler.on_activity_change(visibility);
                }
            }));
        self.inner.activity.set(Some(subscription));
    }

    fn on_activity_change(&self, visibility: Visibility) {
        tracing::trace!(?visibility, "host activity changed");
        let weak = Rc::downgrade(&self.inner);
        let rearmed = self.inner.ticks.rearm_if_stale(move |generation| {
            if let Some(scheduler) = Self::from_weak(&weak) {
                scheduler.on_tick(generation);
            }
        });
        if let Some(handle) = rearmed {
            self.inner.last_tick.set(Some(handle));
            tracing::debug!(tick = %handle, ?visibility, "tick re-armed for host activity");
        }
    }

    fn epoch_changed(&self, epoch: u64) -> bool {
        self.inner.epoch.get() != epoch
    }

    fn snapshot(
        &self,
        signal: Signal,
        job: Option<JobId>,
        error: Option<JobExecutionError>,
    ) -> EventSnapshot {
        let queue = self.inner.queue.borrow();
        EventSnapshot {
            signal,
            busy: self.inner.busy.get(),
            data: self.inner.data.borrow().clone(),
            tick_handle: self.inner.last_tick.get(),
            jobs_complete: queue.jobs_complete(),
            jobs_count: queue.jobs_count(),
            job,
            error,
        }
    }

    /// Emit `signal` to every listener; non-cancelable signals always continue.
    fn emit(&self, signal: Signal, job: Option<JobId>, error: Option<JobExecutionError>) -> Flow {
        let listeners = self.inner.bus.borrow().listeners(signal);
        if listeners.is_empty() {
            return Flow::Continue;
        }
        tracing::trace!(%signal, listeners = listeners.len(), "emit");
        let snapshot = self.snapshot(signal, job, error);
        let flow = event::dispatch(&listeners, &snapshot);
        if signal.is_cancelable() {
            flow
        } else {
            Flow::Continue
        }
    }

    fn halt_stopped(&self) {
        self.inner.ticks.cancel();
        self.inner.state.set(SchedulerState::Idle);
        tracing::debug!(queued = self.len(), "scheduler stopped");
        let _ = self.emit(Signal::Stop, None, None);
    }

    fn halt_broken(&self, discarded: usize) {
        self.inner.ticks.cancel();
        self.inner.busy.set(false);
        self.inner.state.set(SchedulerState::Broken);
        tracing::debug!(discarded, queued = self.len(), "run broken by listener");
        let _ = self.emit(Signal::Break, None, None);
    }

    fn halt_error(&self, failed: QueuedJob, cause: JobError, rest: VecDeque<QueuedJob>) {
        let id = failed.id();
        let error = JobExecutionError::new(id, cause);
        tracing::warn!(job = %id, error = %error.cause(), requeued = rest.len() + 1, "job failed");
        self.inner
            .queue
            .borrow_mut()
            .requeue_front_all(std::iter::once(failed).chain(rest));
        self.inner.ticks.cancel();
        self.inner.busy.set(false);
        self.inner.state.set(SchedulerState::ErrorHalted);
        self.inner.last_error.replace(Some(error.clone()));
        let _ = self.emit(Signal::Error, Some(id), Some(error));
    }

    fn complete(&self, epoch: u64) {
        let inner = &self.inner;
        inner.ticks.cancel();
        inner.busy.set(false);
        inner.state.set(SchedulerState::Completed);
        tracing::debug!(
            jobs_complete = self.jobs_complete(),
            ticks = self.ticks(),
            "run complete"
        );
        let _ = self.emit(Signal::Complete, None, None);
        if self.epoch_changed(epoch) || inner.busy.get() {
            return;
        }
        inner.queue.borrow_mut().clear();
        inner.state.set(SchedulerState::Idle);
    }

    fn on_tick(&self, generation: u64) {
        let Some(handle) = self.inner.ticks.fire(generation) else {
            tracing::trace!(generation, "stale tick ignored");
            return;
        };
        let span = tracing::debug_span!("tickwork.tick", tick = %handle);
        let _guard = span.enter();
        let inner = &self.inner;

        if !inner.busy.get() {
            self.halt_stopped();
            return;
        }

        let epoch = inner.epoch.get();
        inner.ticks_run.set(inner.ticks_run.get() + 1);
        let visibility = inner.host.visibility();
        let budget = inner.throttle.borrow().budget(visibility);
        let mut batch: VecDeque<QueuedJob> = inner.queue.borrow_mut().drain_batch(budget).into();
        tracing::trace!(budget, batch = batch.len(), ?visibility, "batch drained");

        while let Some(mut job) = batch.pop_front() {
            let result = job.invoke(self);
            if self.epoch_changed(epoch) {
                return;
            }
            match result {
                Ok(()) => {
                    inner.queue.borrow_mut().record_complete();
                    let flow = self.emit(Signal::Job, Some(job.id()), None);
                    if self.epoch_changed(epoch) {
                        return;
                    }
                    if flow.is_prevented() {
                        self.halt_broken(batch.len());
                        return;
                    }
                }
                Err(cause) => {
                    self.halt_error(job, cause, batch);
                    return;
                }
            }
        }

        if !inner.busy.get() {
            self.halt_stopped();
            return;
        }

        let flow = self.emit(Signal::Tick, None, None);
        if self.epoch_changed(epoch) {
            return;
        }
        if flow.is_prevented() {
            self.halt_broken(0);
            return;
        }

        if self.is_empty() {
            self.complete(epoch);
        } else if !inner.ticks.is_armed() {
            self.request_tick();
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state())
            .field("busy", &self.busy())
            .field("queued", &self.len())
            .field("jobs_count", &self.jobs_count())
            .field("jobs_complete", &self.jobs_complete())
            .field("ticks", &self.inner.ticks)
            .finish()
    }
}
