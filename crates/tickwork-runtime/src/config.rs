#![forbid(unsafe_code)]

//! Scheduler configuration.
//!
//! [`SchedulerConfig`] groups every tunable of the scheduler into one
//! validated struct. Builder setters clamp out-of-range values on the way in;
//! configs loaded from files keep raw values until [`SchedulerConfig::normalized`]
//! is applied, and [`SchedulerConfig::validate`] reports what would be clamped.
//!
//! # Loading
//!
//! With the `policy-config` feature the config can be read from TOML or JSON:
//!
//! ```toml
//! # tickwork.toml
//! jobs_per_tick = 4.0
//! inactive_multiplier = 40.0
//! work_on_inactive = true
//! fallback_delay_ms = 20
//! ```
//!
//! ```rust,ignore
//! let config = SchedulerConfig::from_toml_file("tickwork.toml")?;
//! let config = SchedulerConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use core::time::Duration;

/// Default base budget per tick.
pub const DEFAULT_JOBS_PER_TICK: f64 = 1.0;

/// Default budget multiplier while the host is backgrounded.
///
/// Backgrounded hosts fire fallback timers about once per second instead of
/// every 20ms, a ratio of 50.
pub const DEFAULT_INACTIVE_MULTIPLIER: f64 = 50.0;

/// Default fallback timer delay in milliseconds.
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 20;

/// Tunables for a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct SchedulerConfig {
    /// Weight units executed per tick while foregrounded. Default: 1.0.
    pub jobs_per_tick: f64,

    /// Budget multiplier while backgrounded. Default: 50.0.
    pub inactive_multiplier: f64,

    /// Apply `inactive_multiplier` while backgrounded. Default: true.
    pub work_on_inactive: bool,

    /// Delay of the fallback timer in milliseconds. Default: 20.
    pub fallback_delay_ms: u64,

    /// Use frame-aligned callbacks when the host is foregrounded. Default: true.
    ///
    /// When false every tick goes through the fallback timer.
    pub prefer_frame_aligned: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            jobs_per_tick: DEFAULT_JOBS_PER_TICK,
            inactive_multiplier: DEFAULT_INACTIVE_MULTIPLIER,
            work_on_inactive: true,
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
            prefer_frame_aligned: true,
        }
    }
}

impl SchedulerConfig {
    /// Clamp a base budget: non-finite or non-positive becomes the default.
    #[must_use]
    pub fn clamp_jobs_per_tick(value: f64) -> f64 {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            DEFAULT_JOBS_PER_TICK
        }
    }

    /// Clamp an inactive multiplier: non-finite or below `1` becomes `1`.
    #[must_use]
    pub fn clamp_inactive_multiplier(value: f64) -> f64 {
        if value.is_finite() && value >= 1.0 {
            value
        } else {
            1.0
        }
    }

    /// Clamp a fallback delay: zero becomes one millisecond.
    #[must_use]
    pub const fn clamp_fallback_delay_ms(value: u64) -> u64 {
        if value == 0 { 1 } else { value }
    }

    /// Set the base budget (clamped).
    #[must_use]
    pub fn with_jobs_per_tick(mut self, value: f64) -> Self {
        self.jobs_per_tick = Self::clamp_jobs_per_tick(value);
        self
    }

    /// Set the inactive multiplier (clamped).
    #[must_use]
    pub fn with_inactive_multiplier(mut self, value: f64) -> Self {
        self.inactive_multiplier = Self::clamp_inactive_multiplier(value);
        self
    }

    /// Enable or disable background compensation.
    #[must_use]
    pub fn with_work_on_inactive(mut self, enabled: bool) -> Self {
        self.work_on_inactive = enabled;
        self
    }

    /// Set the fallback timer delay (clamped).
    #[must_use]
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.fallback_delay_ms = Self::clamp_fallback_delay_ms(ms);
        self
    }

    /// Prefer frame-aligned callbacks while foregrounded.
    #[must_use]
    pub fn with_prefer_frame_aligned(mut self, prefer: bool) -> Self {
        self.prefer_frame_aligned = prefer;
        self
    }

    /// Fallback timer delay as a [`Duration`].
    #[must_use]
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(Self::clamp_fallback_delay_ms(self.fallback_delay_ms))
    }

    /// Apply every clamp.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            jobs_per_tick: Self::clamp_jobs_per_tick(self.jobs_per_tick),
            inactive_multiplier: Self::clamp_inactive_multiplier(self.inactive_multiplier),
            work_on_inactive: self.work_on_inactive,
            fallback_delay_ms: Self::clamp_fallback_delay_ms(self.fallback_delay_ms),
            prefer_frame_aligned: self.prefer_frame_aligned,
        }
    }

    /// Report raw values that [`normalized`](Self::normalized) would change.
    ///
    /// An empty list means the config is valid as-is.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.jobs_per_tick.is_finite() && self.jobs_per_tick > 0.0) {
            errors.push(format!(
                "jobs_per_tick must be finite and > 0, got {}",
                self.jobs_per_tick
            ));
        }
        if !(self.inactive_multiplier.is_finite() && self.inactive_multiplier >= 1.0) {
            errors.push(format!(
                "inactive_multiplier must be finite and >= 1, got {}",
                self.inactive_multiplier
            ));
        }
        if self.fallback_delay_ms == 0 {
            errors.push("fallback_delay_ms must be > 0".to_string());
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate, failing instead of clamping.
    #[cfg(feature = "policy-config")]
    pub fn strict(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a scheduler configuration.
#[cfg(feature = "policy-config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
