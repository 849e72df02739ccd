#![forbid(unsafe_code)]

//! Ordered job storage with weight-bounded batch draining.
//!
//! # Ordering
//!
//! Pending jobs are kept sorted ascending by `(priority, insertion order)`.
//! Insertion uses a binary search over the sorted run, so equal-priority jobs
//! keep their enqueue order without re-sorting the whole queue.
//!
//! The single exception is the retry lane: [`JobQueue::requeue_front`] places
//! a job ahead of everything else so that a failed job is attempted first on
//! the next run. Retry-lane jobs are always drained before the sorted run.
//!
//! # Batching
//!
//! [`JobQueue::drain_batch`] admits head jobs while their cumulative weight
//! stays within the budget. The head job is always admitted, even when its
//! weight alone exceeds the budget, so an oversized job can never starve.
//!
//! # Counters
//!
//! The queue also owns the run counters: `jobs_count` (every job appended
//! since the last clear) and `jobs_complete` (jobs that returned normally).

use std::collections::VecDeque;

use crate::job::{Job, JobId, QueuedJob};

/// Pending jobs plus run counters.
#[derive(Debug, Default)]
pub struct JobQueue {
    retry: VecDeque<QueuedJob>,
    pending: VecDeque<QueuedJob>,
    next_id: u64,
    jobs_count: u64,
    jobs_complete: u64,
}

impl JobQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.retry.len() + self.pending.len()
    }

    /// `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retry.is_empty() && self.pending.is_empty()
    }

    /// Total jobs appended since the last clear.
    #[must_use]
    pub const fn jobs_count(&self) -> u64 {
        self.jobs_count
    }

    /// Jobs that completed normally since the last clear.
    #[must_use]
    pub const fn jobs_complete(&self) -> u64 {
        self.jobs_complete
    }

    /// Enqueue a job, keeping the `(priority, insertion order)` sort.
    pub fn append(&mut self, job: Job) -> JobId {
        self.next_id += 1;
        let id = JobId(self.next_id);
        let priority = job.priority();
        // Ids are monotonic, so the new job sorts after every job of equal priority.
        let idx = self.pending.partition_point(|q| q.priority() <= priority);
        self.pending.insert(idx, QueuedJob::new(id, job));
        self.jobs_count += 1;
        id
    }

    /// The job that would be drained next.
    #[must_use]
    pub fn peek(&self) -> Option<&QueuedJob> {
        self.retry.front().or_else(|| self.pending.front())
    }

    /// Iterate queued jobs in drain order.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedJob> + '_ {
        self.retry.iter().chain(self.pending.iter())
    }

    /// Sum the weights of the first `n` jobs without removing them.
    #[must_use]
    pub fn peek_weight(&self, n: usize) -> f64 {
        self.iter().take(n).map(QueuedJob::weight).sum()
    }

    /// Remove and return the first `n` jobs.
    pub fn drain(&mut self, n: usize) -> Vec<QueuedJob> {
        let mut out = Vec::with_capacity(n.min(self.len()));
        while out.len() < n {
            match self.pop_front() {
                Some(job) => out.push(job),
                None => break,
            }
        }
        out
    }

    /// Remove the head jobs whose cumulative weight fits in `budget`.
    ///
    /// The head job is always taken when the queue is non-empty; after it,
    /// draining stops at the first job that would push the total past the
    /// budget.
    pub fn drain_batch(&mut self, budget: f64) -> Vec<QueuedJob> {
        let mut batch = Vec::new();
        let mut total = 0.0;
        while let Some(head) = self.peek() {
            let weight = head.weight();
            if !batch.is_empty() && total + weight > budget {
                break;
            }
            let Some(job) = self.pop_front() else {
                break;
            };
            total += weight;
            batch.push(job);
        }
        batch
    }

    /// Put a job back ahead of every other job.
    pub fn requeue_front(&mut self, job: QueuedJob) {
        self.retry.push_front(job);
    }

    /// Put jobs back at the front, preserving their relative order.
    pub fn requeue_front_all(&mut self, jobs: impl IntoIterator<Item = QueuedJob>) {
        let jobs: Vec<QueuedJob> = jobs.into_iter().collect();
        for job in jobs.into_iter().rev() {
            self.retry.push_front(job);
        }
    }

    /// Count one normally completed job.
    pub fn record_complete(&mut self) {
        self.jobs_complete += 1;
    }

    /// Drop every job and reset the counters.
    ///
    /// Job ids keep growing so that ids stay unique for the queue's lifetime.
    pub fn clear(&mut self) {
        self.retry.clear();
        self.pending.clear();
        self.jobs_count = 0;
        self.jobs_complete = 0;
    }

    fn pop_front(&mut self) -> Option<QueuedJob> {
        self.retry.pop_front().or_else(|| self.pending.pop_front())
    }
}
