//! Adaptive waiting primitives.
//!
//! Four bounded, best-effort waits replace fixed sleeps: DOM-mutation
//! stability, network idle, value persistence, and interactable readiness,
//! plus a composite stable-state wait that demands both DOM stability and
//! network idle. Every wait resolves at its deadline at the latest; none
//! blocks indefinitely.

use std::sync::Arc;

use driver_bridge::{DriverError, PageDriver};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Failures while waiting. Timeouts are NOT errors: a wait that runs out
/// of budget reports `satisfied = false` instead.
#[derive(Debug, Error, Clone)]
pub enum WaitError {
    #[error("wait aborted by driver: {0}")]
    Driver(String),
}

impl From<DriverError> for WaitError {
    fn from(err: DriverError) -> Self {
        Self::Driver(err.to_string())
    }
}

/// What a wait observed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaitOutcome {
    /// The awaited condition held before the deadline.
    pub satisfied: bool,
    pub waited_ms: u64,
}

impl WaitOutcome {
    fn new(satisfied: bool, started: Instant) -> Self {
        Self {
            satisfied,
            waited_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Budgets for the individual waits, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    pub poll_interval_ms: u64,
    /// Quiet period with no DOM mutation that counts as "stable".
    pub dom_quiet_ms: u64,
    pub dom_timeout_ms: u64,
    /// Quiet period with zero in-flight requests that counts as "idle".
    pub network_quiet_ms: u64,
    pub network_timeout_ms: u64,
    pub value_timeout_ms: u64,
    pub interactable_timeout_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            dom_quiet_ms: 300,
            dom_timeout_ms: 5_000,
            network_quiet_ms: 500,
            network_timeout_ms: 10_000,
            value_timeout_ms: 2_000,
            interactable_timeout_ms: 5_000,
        }
    }
}

impl WaitConfig {
    /// Tight budgets for unit tests.
    pub fn fast() -> Self {
        Self {
            poll_interval_ms: 5,
            dom_quiet_ms: 15,
            dom_timeout_ms: 200,
            network_quiet_ms: 15,
            network_timeout_ms: 200,
            value_timeout_ms: 150,
            interactable_timeout_ms: 200,
        }
    }
}

/// Blocking primitives over the driver's observation counters.
pub struct AdaptiveWaiter {
    driver: Arc<dyn PageDriver>,
    config: WaitConfig,
}

impl AdaptiveWaiter {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            config: WaitConfig::default(),
        }
    }

    pub fn with_config(driver: Arc<dyn PageDriver>, config: WaitConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Wait until no DOM mutation has been observed for the quiet period,
    /// or the deadline passes.
    pub async fn wait_dom_stable(&self) -> Result<WaitOutcome, WaitError> {
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.dom_timeout_ms);
        let quiet = Duration::from_millis(self.config.dom_quiet_ms);

        let mut last_count = self.driver.dom_mutation_count().await?;
        let mut quiet_since = Instant::now();

        loop {
            if quiet_since.elapsed() >= quiet {
                return Ok(WaitOutcome::new(true, started));
            }
            if Instant::now() >= deadline {
                debug!("dom stability wait hit deadline");
                return Ok(WaitOutcome::new(false, started));
            }
            sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            let count = self.driver.dom_mutation_count().await?;
            if count != last_count {
                last_count = count;
                quiet_since = Instant::now();
            }
        }
    }

    /// Wait until no request has been in flight for the quiet period, or
    /// the deadline passes.
    pub async fn wait_network_idle(&self) -> Result<WaitOutcome, WaitError> {
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.network_timeout_ms);
        let quiet = Duration::from_millis(self.config.network_quiet_ms);

        let mut idle_since: Option<Instant> = None;
        loop {
            let inflight = self.driver.inflight_request_count().await?;
            match (inflight, idle_since) {
                (0, Some(since)) if since.elapsed() >= quiet => {
                    return Ok(WaitOutcome::new(true, started));
                }
                (0, None) => idle_since = Some(Instant::now()),
                (0, Some(_)) => {}
                (_, _) => idle_since = None,
            }
            if Instant::now() >= deadline {
                debug!("network idle wait hit deadline");
                return Ok(WaitOutcome::new(false, started));
            }
            sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }
    }

    /// Poll until the field's observed value equals `expected`.
    pub async fn wait_value_persisted(
        &self,
        selector: &str,
        expected: &str,
    ) -> Result<WaitOutcome, WaitError> {
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.value_timeout_ms);

        loop {
            let value = self.driver.read_value(selector).await?;
            if value.as_deref() == Some(expected) {
                return Ok(WaitOutcome::new(true, started));
            }
            if Instant::now() >= deadline {
                debug!(selector, "value persistence wait hit deadline");
                return Ok(WaitOutcome::new(false, started));
            }
            sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }
    }

    /// Poll until the element is visible, enabled, and has a non-zero
    /// bounding box.
    pub async fn wait_interactable(&self, selector: &str) -> Result<WaitOutcome, WaitError> {
        let started = Instant::now();
        let deadline = started + Duration::from_millis(self.config.interactable_timeout_ms);

        loop {
            let state = self.driver.element_state(selector).await?;
            if state.is_interactable() {
                return Ok(WaitOutcome::new(true, started));
            }
            if Instant::now() >= deadline {
                debug!(selector, "interactable wait hit deadline");
                return Ok(WaitOutcome::new(false, started));
            }
            sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        }
    }

    /// Composite: DOM stability and network idle concurrently. Succeeds
    /// only if both succeed.
    pub async fn wait_stable_state(&self) -> Result<WaitOutcome, WaitError> {
        let started = Instant::now();
        let (dom, network) = tokio::join!(self.wait_dom_stable(), self.wait_network_idle());
        let dom = dom?;
        let network = network?;
        Ok(WaitOutcome::new(
            dom.satisfied && network.satisfied,
            started,
        ))
    }
}
