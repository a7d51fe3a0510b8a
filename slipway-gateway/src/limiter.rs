//! Fixed-window per-client rate limiting.
//!
//! One record per client identity; a record is lazily replaced once its
//! window has expired. The map is the only cross-request state in the
//! gateway. It is guarded by a mutex held just for the read-modify-write so
//! two simultaneous requests can never both observe the last free slot, and
//! the lock is never held across provisioning or toolchain work.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::connect_info::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Sentinel identity when no address information is available. Fail-open:
/// anonymous clients share one window rather than being refused outright.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Window parameters for the limiter.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Window duration.
    pub window: Duration,
    /// Requests admitted per identity per window.
    pub max_requests: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self { window: Duration::from_secs(60), max_requests: 5 }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    /// Whether this request is admitted.
    pub allowed: bool,
    /// Slots left in the current window after this decision.
    pub remaining: u32,
    /// Whole seconds until the window resets, rounded up.
    pub reset_in_seconds: u64,
}

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    window_reset_at: Instant,
}

/// Fixed-window request limiter keyed by client identity.
///
/// Created once at process start and injected as a shared handle; entries
/// have no explicit teardown.
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: Mutex<HashMap<String, WindowRecord>>,
}

impl RateLimiter {
    /// Create a limiter with the given window parameters.
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        Self { config, windows: Mutex::new(HashMap::new()) }
    }

    /// Admit or reject one request for `identity`.
    ///
    /// Atomic per call: the counter read and increment happen under one
    /// lock acquisition.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned (a previous thread panicked
    /// while holding it).
    pub fn check(&self, identity: &str) -> RateDecision {
        let now = Instant::now();
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");

        let record = windows
            .entry(identity.to_owned())
            .or_insert(WindowRecord { count: 0, window_reset_at: now });

        // A fresh entry lands here too: its reset time is `now`.
        if now >= record.window_reset_at {
            record.count = 1;
            record.window_reset_at = now + self.config.window;
            return RateDecision {
                allowed: true,
                remaining: self.config.max_requests.saturating_sub(1),
                reset_in_seconds: self.config.window.as_secs(),
            };
        }

        let reset_in_seconds = ceil_seconds(record.window_reset_at.saturating_duration_since(now));
        if record.count >= self.config.max_requests {
            return RateDecision { allowed: false, remaining: 0, reset_in_seconds };
        }

        record.count += 1;
        RateDecision {
            allowed: true,
            remaining: self.config.max_requests - record.count,
            reset_in_seconds,
        }
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Rate-limit identity for the calling client.
///
/// Derived from the first `x-forwarded-for` entry, then `x-real-ip`, then
/// the peer address, then [`UNKNOWN_IDENTITY`].
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub String);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(forwarded) = header_str(parts, "x-forwarded-for") {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return Ok(Self(first.to_owned()));
                }
            }
        }

        if let Some(real_ip) = header_str(parts, "x-real-ip") {
            let real_ip = real_ip.trim();
            if !real_ip.is_empty() {
                return Ok(Self(real_ip.to_owned()));
            }
        }

        if let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(Self(peer.ip().to_string()));
        }

        Ok(Self(UNKNOWN_IDENTITY.to_owned()))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn limiter(window: Duration, max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig { window, max_requests })
    }

    #[test]
    fn admits_up_to_the_window_maximum() {
        let limiter = limiter(Duration::from_secs(60), 5);
        for expected_remaining in (0..5).rev() {
            let decision = limiter.check("203.0.113.7");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let sixth = limiter.check("203.0.113.7");
        assert!(!sixth.allowed, "sixth request in the window must be rejected");
        assert_eq!(sixth.remaining, 0);
        assert!(
            (1..=60).contains(&sixth.reset_in_seconds),
            "reset must be within the window: {}",
            sixth.reset_in_seconds
        );
    }

    #[test]
    fn identities_do_not_share_windows() {
        let limiter = limiter(Duration::from_secs(60), 1);
        assert!(limiter.check("a").allowed);
        assert!(limiter.check("b").allowed, "another identity must have its own window");
        assert!(!limiter.check("a").allowed);
    }

    #[test]
    fn window_expiry_resets_the_counter() {
        let limiter = limiter(Duration::from_millis(30), 2);
        assert!(limiter.check("client").allowed);
        assert!(limiter.check("client").allowed);
        assert!(!limiter.check("client").allowed);

        std::thread::sleep(Duration::from_millis(50));

        let after = limiter.check("client");
        assert!(after.allowed, "expired window must admit again");
        assert_eq!(after.remaining, 1, "counter must restart, not resume");
    }

    #[test]
    fn concurrent_requests_never_over_admit() {
        let max_requests = 5;
        let extra = 7;
        let limiter = Arc::new(limiter(Duration::from_secs(60), max_requests));

        let handles: Vec<_> = (0..max_requests + extra)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.check("same-client").allowed)
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(allowed) => u32::from(allowed),
                Err(e) => panic!("thread panicked: {e:?}"),
            })
            .sum::<u32>();

        assert_eq!(admitted, max_requests, "exactly the window maximum must be admitted");
    }

    #[test]
    fn ceil_seconds_rounds_up_partial_seconds() {
        assert_eq!(ceil_seconds(Duration::from_secs(3)), 3);
        assert_eq!(ceil_seconds(Duration::from_millis(3_001)), 4);
        assert_eq!(ceil_seconds(Duration::from_millis(1)), 1);
        assert_eq!(ceil_seconds(Duration::ZERO), 0);
    }
}
