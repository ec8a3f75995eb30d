//! Autopilot configuration.

use adaptive_wait::WaitConfig;
use serde::{Deserialize, Serialize};

/// Tuning for one `Autopilot` instance.
///
/// Owned by the instance at construction time; there is no process-wide
/// configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotConfig {
    /// Hard ceiling on loop iterations.
    /// Default: 20
    pub max_steps: u32,

    /// Pause between iterations in milliseconds.
    /// Default: 500
    pub step_delay_ms: u64,

    /// Per-keystroke typing delay in milliseconds.
    /// Default: 30
    pub type_delay_ms: u64,

    /// Attempt recovery when a step fails.
    /// Default: true
    pub retry_on_error: bool,

    /// Consecutive failed steps tolerated before the run is blocked.
    /// Default: 2
    pub max_retries: u32,

    /// Use classifier-driven analysis: generic field scans, generated
    /// default values, and button diagnostics. When false, only explicit
    /// goal instructions produce fills.
    /// Default: true
    pub use_smart_analysis: bool,

    /// Wait for DOM/network stability after mutating actions instead of
    /// fixed sleeps.
    /// Default: true
    pub use_adaptive_wait: bool,

    /// Honor only explicit field instructions.
    /// Default: false
    pub strict_mode: bool,

    /// Allow a full page refresh as a last-resort recovery.
    /// Default: false
    pub allow_refresh: bool,

    /// Identical consecutive digests that count as stuck.
    /// Default: 3
    pub stuck_window: usize,

    /// Explore actions tolerated before the run fails.
    /// Default: 2
    pub max_explore_cycles: u32,

    /// Budgets for the adaptive waits.
    #[serde(default)]
    pub waits: WaitConfig,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            max_steps: 20,
            step_delay_ms: 500,
            type_delay_ms: 30,
            retry_on_error: true,
            max_retries: 2,
            use_smart_analysis: true,
            use_adaptive_wait: true,
            strict_mode: false,
            allow_refresh: false,
            stuck_window: 3,
            max_explore_cycles: 2,
            waits: WaitConfig::default(),
        }
    }
}

impl AutopilotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight budgets and no deliberate delays, for tests.
    pub fn minimal() -> Self {
        Self {
            max_steps: 12,
            step_delay_ms: 0,
            type_delay_ms: 0,
            max_retries: 1,
            waits: WaitConfig::fast(),
            ..Self::default()
        }
    }

    /// Builder: set max steps.
    pub fn max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Builder: set the pause between iterations.
    pub fn step_delay(mut self, ms: u64) -> Self {
        self.step_delay_ms = ms;
        self
    }

    /// Builder: toggle strict mode.
    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict_mode = enabled;
        self
    }

    /// Builder: opt in to page-refresh recovery.
    pub fn with_refresh(mut self) -> Self {
        self.allow_refresh = true;
        self
    }
}
