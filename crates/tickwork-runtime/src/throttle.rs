#![forbid(unsafe_code)]

//! Per-tick execution budget.
//!
//! The budget is `jobs_per_tick * throttle_factor`. While the host is
//! foregrounded the factor is `1`. While it is backgrounded, hosts collapse
//! fallback timers to roughly one per second, so the factor becomes the
//! configured inactive multiplier and each (rarer) tick does proportionally
//! more work. Disabling `work_on_inactive` pins the factor to `1`.

use tickwork_host::Visibility;

use crate::config::SchedulerConfig;

/// Converts host activity into a batch budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleAdvisor {
    jobs_per_tick: f64,
    inactive_multiplier: f64,
    work_on_inactive: bool,
}

impl ThrottleAdvisor {
    /// Build from a (normalized) scheduler config.
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let config = config.clone().normalized();
        Self {
            jobs_per_tick: config.jobs_per_tick,
            inactive_multiplier: config.inactive_multiplier,
            work_on_inactive: config.work_on_inactive,
        }
    }

    /// Base budget per tick, in weight units.
    #[must_use]
    pub const fn jobs_per_tick(&self) -> f64 {
        self.jobs_per_tick
    }

    /// Multiplier applied while backgrounded.
    #[must_use]
    pub const fn inactive_multiplier(&self) -> f64 {
        self.inactive_multiplier
    }

    /// Whether the inactive multiplier is applied at all.
    #[must_use]
    pub const fn work_on_inactive(&self) -> bool {
        self.work_on_inactive
    }

    /// Set the base budget. Non-finite or non-positive values clamp to `1`.
    pub fn set_jobs_per_tick(&mut self, jobs_per_tick: f64) {
        self.jobs_per_tick = SchedulerConfig::clamp_jobs_per_tick(jobs_per_tick);
    }

    /// Set the inactive multiplier. Values below `1` clamp to `1`.
    pub fn set_inactive_multiplier(&mut self, multiplier: f64) {
        self.inactive_multiplier = SchedulerConfig::clamp_inactive_multiplier(multiplier);
    }

    /// Enable or disable the inactive multiplier.
    pub fn set_work_on_inactive(&mut self, enabled: bool) {
        self.work_on_inactive = enabled;
    }

    /// Factor applied to the base budget for the given visibility.
    #[must_use]
    pub fn throttle_factor(&self, visibility: Visibility) -> f64 {
        if visibility.is_foreground() || !self.work_on_inactive {
            1.0
        } else {
            self.inactive_multiplier
        }
    }

    /// Budget for one tick.
    #[must_use]
    pub fn budget(&self, visibility: Visibility) -> f64 {
        self.jobs_per_tick * self.throttle_factor(visibility)
    }
}

impl Default for ThrottleAdvisor {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}
