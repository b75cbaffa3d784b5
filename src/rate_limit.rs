use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use log::warn;

use crate::error::FetchError;

pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitMode {
    Enforced,
    /// Tests and offline runs: every call is admitted immediately.
    Bypass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub mode: RateLimitMode,
    pub global_per_window: usize,
    pub endpoint_per_window: HashMap<String, usize>,
    pub default_endpoint_per_window: usize,
    pub min_delay: Option<Duration>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let mut endpoint_per_window = HashMap::new();
        endpoint_per_window.insert("player".to_string(), 30);
        Self {
            mode: RateLimitMode::Enforced,
            global_per_window: 60,
            endpoint_per_window,
            default_endpoint_per_window: 20,
            min_delay: None,
        }
    }
}

/// At most `limit` admissions in any trailing `window`, tracked as a queue of
/// admission timestamps (oldest at the front).
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    limit: usize,
    window: Duration,
    hits: VecDeque<Instant>,
}

impl SlidingWindow {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: VecDeque::with_capacity(limit),
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(front) = self.hits.front() {
            if now.saturating_duration_since(*front) >= self.window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn has_room(&mut self, now: Instant) -> bool {
        self.evict(now);
        self.hits.len() < self.limit
    }

    fn record(&mut self, now: Instant) {
        self.hits.push_back(now);
    }

    #[cfg(test)]
    fn try_acquire(&mut self, now: Instant) -> bool {
        if !self.has_room(now) {
            return false;
        }
        self.record(now);
        true
    }

    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.hits.len()
    }
}

#[derive(Debug)]
struct LimiterState {
    global: SlidingWindow,
    endpoints: HashMap<String, SlidingWindow>,
    last_admitted: Option<Instant>,
}

/// Global cap plus a per-endpoint cap, both sliding windows, and an optional
/// fixed spacing between admitted calls. Shared across fetch threads.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let global = SlidingWindow::new(config.global_per_window, WINDOW);
        Self {
            config,
            state: Mutex::new(LimiterState {
                global,
                endpoints: HashMap::new(),
                last_admitted: None,
            }),
        }
    }

    pub fn bypass() -> Self {
        Self::new(RateLimitConfig {
            mode: RateLimitMode::Bypass,
            ..RateLimitConfig::default()
        })
    }

    pub fn mode(&self) -> RateLimitMode {
        self.config.mode
    }

    /// Admits a call to `endpoint` at `now`, returning how long the caller must
    /// wait to honour the minimum delay. A rejected call is recorded nowhere.
    pub fn admit_at(&self, endpoint: &str, now: Instant) -> Result<Duration, FetchError> {
        if self.config.mode == RateLimitMode::Bypass {
            return Ok(Duration::ZERO);
        }

        let endpoint_limit = self
            .config
            .endpoint_per_window
            .get(endpoint)
            .copied()
            .unwrap_or(self.config.default_endpoint_per_window);

        let mut guard = self.state.lock().expect("rate limiter lock poisoned");
        let state = &mut *guard;

        if !state.global.has_room(now) {
            warn!("global rate limit reached ({} per window)", self.config.global_per_window);
            return Err(rejected("global", self.config.global_per_window));
        }
        let window = state
            .endpoints
            .entry(endpoint.to_string())
            .or_insert_with(|| SlidingWindow::new(endpoint_limit, WINDOW));
        if !window.has_room(now) {
            warn!("rate limit reached for endpoint {endpoint} ({endpoint_limit} per window)");
            return Err(rejected(endpoint, endpoint_limit));
        }

        let wait = match (self.config.min_delay, state.last_admitted) {
            (Some(delay), Some(last)) => (last + delay).saturating_duration_since(now),
            _ => Duration::ZERO,
        };
        let at = now + wait;
        state.global.record(at);
        window.record(at);
        state.last_admitted = Some(at);
        Ok(wait)
    }

    /// Blocking admission used by the HTTP client: rejects immediately when a
    /// window is full, otherwise sleeps out the minimum delay.
    pub fn acquire(&self, endpoint: &str) -> Result<(), FetchError> {
        let wait = self.admit_at(endpoint, Instant::now())?;
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        Ok(())
    }
}

fn rejected(scope: &str, limit: usize) -> FetchError {
    FetchError::RateLimited {
        scope: scope.to_string(),
        limit,
        window_secs: WINDOW.as_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(global: usize, player: usize) -> RateLimitConfig {
        let mut endpoint_per_window = HashMap::new();
        endpoint_per_window.insert("player".to_string(), player);
        RateLimitConfig {
            mode: RateLimitMode::Enforced,
            global_per_window: global,
            endpoint_per_window,
            default_endpoint_per_window: 5,
            min_delay: None,
        }
    }

    #[test]
    fn window_evicts_entries_older_than_window() {
        let start = Instant::now();
        let mut w = SlidingWindow::new(2, Duration::from_secs(60));
        assert!(w.try_acquire(start));
        assert!(w.try_acquire(start + Duration::from_secs(10)));
        assert!(!w.try_acquire(start + Duration::from_secs(59)));
        assert!(w.try_acquire(start + Duration::from_secs(60)));
        assert_eq!(w.in_flight(), 2);
        assert!(!w.try_acquire(start + Duration::from_secs(65)));
    }

    #[test]
    fn endpoint_cap_rejects_without_consuming_global() {
        let limiter = RateLimiter::new(config(10, 2));
        let now = Instant::now();
        assert!(limiter.admit_at("player", now).is_ok());
        assert!(limiter.admit_at("player", now).is_ok());
        let err = limiter.admit_at("player", now).unwrap_err();
        assert!(err.is_rate_limited());
        // Other endpoints still have room in the global window.
        for _ in 0..5 {
            assert!(limiter.admit_at("teams", now).is_ok());
        }
        let state = limiter.state.lock().unwrap();
        assert_eq!(state.global.in_flight(), 7);
    }

    #[test]
    fn global_cap_applies_across_endpoints() {
        let limiter = RateLimiter::new(config(3, 10));
        let now = Instant::now();
        assert!(limiter.admit_at("player", now).is_ok());
        assert!(limiter.admit_at("teams", now).is_ok());
        assert!(limiter.admit_at("player", now).is_ok());
        match limiter.admit_at("player", now) {
            Err(FetchError::RateLimited { scope, limit, .. }) => {
                assert_eq!(scope, "global");
                assert_eq!(limit, 3);
            }
            other => panic!("expected global rejection, got {other:?}"),
        }
        assert!(limiter.admit_at("player", now + WINDOW).is_ok());
    }

    #[test]
    fn min_delay_spaces_admissions() {
        let limiter = RateLimiter::new(RateLimitConfig {
            min_delay: Some(Duration::from_millis(500)),
            ..config(10, 10)
        });
        let now = Instant::now();
        assert_eq!(limiter.admit_at("player", now).unwrap(), Duration::ZERO);
        assert_eq!(
            limiter.admit_at("player", now + Duration::from_millis(200)).unwrap(),
            Duration::from_millis(300)
        );
        assert_eq!(
            limiter.admit_at("player", now + Duration::from_secs(5)).unwrap(),
            Duration::ZERO
        );
    }

    #[test]
    fn bypass_admits_everything() {
        let limiter = RateLimiter::bypass();
        let now = Instant::now();
        for _ in 0..1_000 {
            assert_eq!(limiter.admit_at("player", now).unwrap(), Duration::ZERO);
        }
        assert_eq!(limiter.mode(), RateLimitMode::Bypass);
    }
}
