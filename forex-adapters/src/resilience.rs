//! Transport decorators for retries and circuit breaking.
//!
//! Production wiring is `RetryTransport<CircuitBreakerTransport<ReqwestTransport>>`:
//! every retry attempt passes through the breaker, and an open breaker is
//! never retried.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use forex_types::{Transport, TransportError, TransportResponse};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────────────────────────────────────

/// Exponential backoff: attempt `n` waits `base_delay * 2^(n-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Retries transport errors and transient statuses (408, 429, 5xx).
pub struct RetryTransport<T: Transport> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

fn is_transient(result: &Result<TransportResponse, TransportError>) -> bool {
    match result {
        Ok(response) => matches!(response.status, 408 | 429 | 500..=599),
        Err(TransportError::CircuitOpen) => false,
        Err(_) => true,
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let mut attempt = 0;
        loop {
            let result = self.inner.get(url).await;
            if !is_transient(&result) || attempt >= self.policy.retries {
                return result;
            }

            attempt += 1;
            let delay = self.policy.delay_for(attempt);
            debug!(
                url,
                attempt,
                retries = self.policy.retries,
                ?delay,
                "Upstream attempt failed. Retrying..."
            );
            sleep(delay).await;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Circuit Breaker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive transport errors that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call is let through.
    pub open_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_started_at: Option<Instant>,
}

/// Counts consecutive transport errors. Non-success statuses are responses,
/// not failures, and reset the count.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::default()),
        }
    }

    pub fn state(&self) -> CircuitState {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.opened_at {
            None => CircuitState::Closed,
            Some(opened_at) if opened_at.elapsed() < self.config.open_duration => {
                CircuitState::Open
            }
            Some(_) => CircuitState::HalfOpen,
        }
    }

    /// Whether a call may go through right now.
    ///
    /// While half-open only one trial call is admitted per `open_duration`.
    fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(opened_at) = state.opened_at else {
            return true;
        };

        if opened_at.elapsed() < self.config.open_duration {
            return false;
        }

        let trial_pending = state
            .trial_started_at
            .is_some_and(|t| t.elapsed() < self.config.open_duration);
        if trial_pending {
            return false;
        }

        state.trial_started_at = Some(Instant::now());
        true
    }

    fn on_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.opened_at.is_some() {
            info!("Circuit closed after successful trial call");
        }
        *state = BreakerState::default();
    }

    fn on_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.opened_at.is_some() {
            warn!("Trial call failed, circuit re-opened");
            state.opened_at = Some(Instant::now());
            state.trial_started_at = None;
            return;
        }

        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.config.failure_threshold {
            warn!(
                failures = state.consecutive_failures,
                open_for = ?self.config.open_duration,
                "Circuit opened"
            );
            state.opened_at = Some(Instant::now());
        }
    }
}

/// Fails fast with `TransportError::CircuitOpen` while the breaker is open.
pub struct CircuitBreakerTransport<T: Transport> {
    inner: T,
    breaker: CircuitBreaker,
}

impl<T: Transport> CircuitBreakerTransport<T> {
    pub fn new(inner: T, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(config),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.breaker.state()
    }
}

#[async_trait]
impl<T: Transport> Transport for CircuitBreakerTransport<T> {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        if !self.breaker.try_acquire() {
            debug!(url, "Circuit open, request rejected");
            return Err(TransportError::CircuitOpen);
        }

        match self.inner.get(url).await {
            Ok(response) => {
                self.breaker.on_success();
                Ok(response)
            }
            Err(e) => {
                self.breaker.on_failure();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockTransport {
        call_count: AtomicUsize,
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    }

    impl MockTransport {
        fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, _url: &str) -> Result<TransportResponse, TransportError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(TransportResponse::new(200, "ok")))
        }
    }

    fn refused() -> Result<TransportResponse, TransportError> {
        Err(TransportError::Request("connection refused".into()))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let inner = Arc::new(MockTransport::new(vec![
            refused(),
            Ok(TransportResponse::new(503, "")),
            Ok(TransportResponse::new(200, "rates")),
        ]));
        let transport = RetryTransport::new(inner.clone(), RetryPolicy::default());

        let response = transport.get("http://upstream/latest").await.unwrap();

        assert_eq!(response.body, "rates");
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_with_last_result() {
        let inner = Arc::new(MockTransport::new(vec![
            refused(),
            refused(),
            Ok(TransportResponse::new(502, "bad gateway")),
        ]));
        let policy = RetryPolicy {
            retries: 2,
            base_delay: Duration::from_millis(100),
        };
        let transport = RetryTransport::new(inner.clone(), policy);

        let response = transport.get("http://upstream/latest").await.unwrap();

        assert_eq!(response.status, 502);
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_not_retried() {
        let inner = Arc::new(MockTransport::new(vec![Ok(TransportResponse::new(404, ""))]));
        let transport = RetryTransport::new(inner.clone(), RetryPolicy::default());

        let response = transport.get("http://upstream/latest").await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_is_not_retried() {
        let inner = Arc::new(MockTransport::new(vec![Err(TransportError::CircuitOpen)]));
        let transport = RetryTransport::new(inner.clone(), RetryPolicy::default());

        let result = transport.get("http://upstream/latest").await;

        assert!(matches!(result, Err(TransportError::CircuitOpen)));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_circuit_opens_after_threshold() {
        let inner = Arc::new(MockTransport::new(vec![refused(), refused()]));
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            open_duration: Duration::from_secs(30),
        };
        let transport = CircuitBreakerTransport::new(inner.clone(), config);

        assert!(transport.get("http://upstream").await.is_err());
        assert_eq!(transport.state(), CircuitState::Closed);
        assert!(transport.get("http://upstream").await.is_err());
        assert_eq!(transport.state(), CircuitState::Open);

        let result = transport.get("http://upstream").await;
        assert!(matches!(result, Err(TransportError::CircuitOpen)));
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_trial_closes_circuit() {
        let inner = Arc::new(MockTransport::new(vec![refused()]));
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            open_duration: Duration::from_secs(30),
        };
        let transport = CircuitBreakerTransport::new(inner.clone(), config);

        assert!(transport.get("http://upstream").await.is_err());
        assert_eq!(transport.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(transport.state(), CircuitState::HalfOpen);

        let response = transport.get("http://upstream").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_reopens_circuit() {
        let inner = Arc::new(MockTransport::new(vec![refused(), refused()]));
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            open_duration: Duration::from_secs(30),
        };
        let transport = CircuitBreakerTransport::new(inner.clone(), config);

        assert!(transport.get("http://upstream").await.is_err());
        tokio::time::advance(Duration::from_secs(31)).await;

        assert!(matches!(
            transport.get("http://upstream").await,
            Err(TransportError::Request(_))
        ));
        assert_eq!(transport.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_success_status_does_not_trip_breaker() {
        let inner = Arc::new(MockTransport::new(vec![
            Ok(TransportResponse::new(500, "")),
            Ok(TransportResponse::new(500, "")),
        ]));
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            open_duration: Duration::from_secs(30),
        };
        let transport = CircuitBreakerTransport::new(inner, config);

        transport.get("http://upstream").await.unwrap();
        transport.get("http://upstream").await.unwrap();

        assert_eq!(transport.state(), CircuitState::Closed);
    }
}
