//! Admission Controller
//!
//! Sliding-window rate limiting and concurrency ceilings, per client and
//! globally.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use super::window::ClientWindow;
use super::{AdmissionPermit, Decision, RejectReason, Rejection};

/// Advisory retry delay for concurrency rejections.
pub const CONCURRENCY_RETRY_AFTER_SECS: u64 = 5;

/// Global in-flight ceiling as a multiple of the per-client one.
pub const DEFAULT_GLOBAL_MULTIPLIER: usize = 2;

// == Limiter Config ==
/// Policy of one controller instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimiterConfig {
    /// Width of the sliding rate window in milliseconds
    pub window_ms: u64,
    /// Admissions allowed per client inside one window
    pub max_requests: usize,
    /// In-flight ceiling per client
    pub max_concurrent: usize,
    /// Global in-flight ceiling is `global_multiplier * max_concurrent`
    pub global_multiplier: usize,
}

impl LimiterConfig {
    pub fn new(window_ms: u64, max_requests: usize, max_concurrent: usize) -> Self {
        Self {
            window_ms,
            max_requests,
            max_concurrent,
            global_multiplier: DEFAULT_GLOBAL_MULTIPLIER,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn global_max_concurrent(&self) -> usize {
        self.max_concurrent.saturating_mul(self.global_multiplier)
    }

    /// Retry hint for rate rejections: the window in whole seconds, rounded up.
    pub fn rate_retry_after_secs(&self) -> u64 {
        self.window_ms.div_ceil(1000)
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::new(60_000, 100, 50)
    }
}

// == Limiter Status ==
/// Read-only snapshot for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimiterStatus {
    pub global_concurrent: usize,
    pub tracked_clients: usize,
    pub clients_with_in_flight: usize,
    pub config: LimiterConfig,
}

#[derive(Debug, Default)]
struct LimiterState {
    clients: HashMap<String, ClientWindow>,
    global_in_flight: usize,
    /// Bumped by `reset()` so permits from before a reset release as no-ops
    epoch: u64,
}

impl LimiterState {
    fn forget_if_idle(&mut self, client_id: &str) {
        if self.clients.get(client_id).is_some_and(ClientWindow::is_idle) {
            self.clients.remove(client_id);
        }
    }
}

// == Admission Controller ==
/// Shared admission state for one policy.
///
/// Cloning is cheap and every clone sees the same counters.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    name: Arc<str>,
    config: LimiterConfig,
    state: Arc<Mutex<LimiterState>>,
}

impl AdmissionController {
    // == Constructor ==
    /// Creates a controller; `name` only shows up in logs.
    ///
    /// # Panics
    /// If the window, request budget or concurrency ceiling is zero.
    pub fn new(name: impl Into<String>, config: LimiterConfig) -> Self {
        assert!(config.window_ms > 0, "limiter window must be greater than zero");
        assert!(config.max_requests > 0, "max_requests must be greater than zero");
        assert!(config.max_concurrent > 0, "max_concurrent must be greater than zero");

        Self {
            name: Arc::from(name.into()),
            config,
            state: Arc::new(Mutex::new(LimiterState::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    // == Admit ==
    /// Checks the rate window, then the concurrency ceilings.
    ///
    /// On `Allowed` the caller owes exactly one [`release`](Self::release).
    /// Prefer [`acquire`](Self::acquire), which ties the release to a guard.
    pub fn admit(&self, client_id: &str) -> Decision {
        self.admit_at(client_id, Instant::now())
    }

    /// [`admit`](Self::admit) against an explicit clock reading.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> Decision {
        self.evaluate(client_id, now).0
    }

    /// Runs both checks and reports the reset epoch the decision belongs to.
    fn evaluate(&self, client_id: &str, now: Instant) -> (Decision, u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let epoch = state.epoch;

        let recent = state
            .clients
            .get_mut(client_id)
            .map_or(0, |client| client.prune(now, self.config.window()));

        if recent >= self.config.max_requests {
            warn!(
                limiter = %self.name,
                client = client_id,
                recent,
                "Rejected: rate limit reached"
            );
            return (
                Decision::Rejected(Rejection {
                    reason: RejectReason::RateLimited,
                    retry_after_secs: self.config.rate_retry_after_secs(),
                }),
                epoch,
            );
        }

        let client_in_flight = state.clients.get(client_id).map_or(0, |c| c.in_flight);
        if client_in_flight >= self.config.max_concurrent
            || state.global_in_flight >= self.config.global_max_concurrent()
        {
            warn!(
                limiter = %self.name,
                client = client_id,
                client_in_flight,
                global_in_flight = state.global_in_flight,
                "Rejected: concurrency limit reached"
            );
            state.forget_if_idle(client_id);
            return (
                Decision::Rejected(Rejection {
                    reason: RejectReason::ConcurrencyLimited,
                    retry_after_secs: CONCURRENCY_RETRY_AFTER_SECS,
                }),
                epoch,
            );
        }

        let client = state.clients.entry(client_id.to_string()).or_default();
        client.in_flight += 1;
        client.record(now);
        state.global_in_flight += 1;

        debug!(
            limiter = %self.name,
            client = client_id,
            in_flight = client.in_flight,
            global_in_flight = state.global_in_flight,
            "Admitted"
        );
        (Decision::Allowed, epoch)
    }

    // == Acquire ==
    /// Scoped admission: the permit releases when dropped.
    pub fn acquire(&self, client_id: &str) -> Result<AdmissionPermit, Rejection> {
        self.acquire_at(client_id, Instant::now())
    }

    /// [`acquire`](Self::acquire) against an explicit clock reading.
    pub fn acquire_at(&self, client_id: &str, now: Instant) -> Result<AdmissionPermit, Rejection> {
        match self.evaluate(client_id, now) {
            (Decision::Allowed, epoch) => Ok(AdmissionPermit::new(self.clone(), client_id, epoch)),
            (Decision::Rejected(rejection), _) => Err(rejection),
        }
    }

    // == Release ==
    /// Gives back one in-flight slot for `client_id`.
    ///
    /// A release without a matching admission is ignored, so counters never
    /// go below zero and the global count stays equal to the per-client sum.
    pub fn release(&self, client_id: &str) {
        self.release_at(client_id, Instant::now());
    }

    /// [`release`](Self::release) against an explicit clock reading.
    pub fn release_at(&self, client_id: &str, now: Instant) {
        let mut guard = self.state.lock();
        self.release_locked(&mut guard, client_id, now);
    }

    /// Release on behalf of a permit issued in `epoch`.
    pub(crate) fn release_permit(&self, client_id: &str, epoch: u64) {
        let mut guard = self.state.lock();
        if guard.epoch != epoch {
            debug!(limiter = %self.name, client = client_id, "Permit outlived a reset");
            return;
        }
        self.release_locked(&mut guard, client_id, Instant::now());
    }

    fn release_locked(&self, state: &mut LimiterState, client_id: &str, now: Instant) {
        let Some(client) = state.clients.get_mut(client_id) else {
            return;
        };
        if client.in_flight == 0 {
            return;
        }

        client.in_flight -= 1;
        state.global_in_flight = state.global_in_flight.saturating_sub(1);
        client.prune(now, self.config.window());
        state.forget_if_idle(client_id);
    }

    // == Status ==
    pub fn status(&self) -> LimiterStatus {
        let state = self.state.lock();
        LimiterStatus {
            global_concurrent: state.global_in_flight,
            tracked_clients: state.clients.len(),
            clients_with_in_flight: state.clients.values().filter(|c| c.in_flight > 0).count(),
            config: self.config.clone(),
        }
    }

    /// In-flight count of one client.
    pub fn in_flight(&self, client_id: &str) -> usize {
        self.state
            .lock()
            .clients
            .get(client_id)
            .map_or(0, |client| client.in_flight)
    }

    // == Reset ==
    /// Forgets every client and zeroes the global counter.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.clients.clear();
        state.global_in_flight = 0;
        state.epoch += 1;
    }

    // == Sweep Idle ==
    /// Prunes every window and drops clients with nothing left to track.
    ///
    /// Returns the number of clients dropped.
    pub fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Instant::now())
    }

    /// [`sweep_idle`](Self::sweep_idle) against an explicit clock reading.
    pub fn sweep_idle_at(&self, now: Instant) -> usize {
        let window = self.config.window();
        let mut state = self.state.lock();
        let before = state.clients.len();
        state.clients.retain(|_, client| {
            client.prune(now, window);
            !client.is_idle()
        });
        before - state.clients.len()
    }
}
