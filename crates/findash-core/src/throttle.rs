//! Provider rate gating.
//!
//! Two layers: a local quota (`governor`) that paces outgoing calls below
//! the provider's documented limit, and a cooldown latch armed when the
//! provider itself answers with a rate-limit response. FMP enforces one
//! account-wide quota, so the gate is shared across tickers in a batch.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::config::ProviderPolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone)]
pub struct RateGate {
    limiter: Arc<DirectRateLimiter>,
    cooldown_until: Arc<Mutex<Option<Instant>>>,
    cooldown: Duration,
    pacing_delay: Duration,
}

impl RateGate {
    pub fn new(quota_window: Duration, quota_limit: u32, cooldown: Duration) -> Self {
        let safe_limit = quota_limit.max(1);
        let pacing_delay =
            Duration::from_secs_f64((quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001));

        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                safe_limit,
            ))),
            cooldown_until: Arc::new(Mutex::new(None)),
            cooldown,
            pacing_delay,
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.quota_window, policy.quota_limit, policy.cooldown)
    }

    /// Whether a call may be issued now. On `Err` the caller must wait the
    /// returned duration before asking again: either the remaining provider
    /// cooldown or one local pacing interval.
    pub fn check(&self) -> Result<(), Duration> {
        let mut until = self
            .cooldown_until
            .lock()
            .expect("rate gate cooldown mutex poisoned");
        if let Some(deadline) = *until {
            let now = Instant::now();
            if now < deadline {
                return Err(deadline - now);
            }
            *until = None;
        }
        drop(until);

        if self.limiter.check().is_ok() {
            Ok(())
        } else {
            Err(self.pacing_delay)
        }
    }

    /// Arm the cooldown latch after the provider reported a rate limit.
    pub fn note_rate_limited(&self) {
        let mut until = self
            .cooldown_until
            .lock()
            .expect("rate gate cooldown mutex poisoned");
        *until = Some(Instant::now() + self.cooldown);
    }

    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

fn quota_from_window(quota_window: Duration, safe_limit: u32) -> Quota {
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");
    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .expect("period is always greater than zero")
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_quota_buffers_excess_calls() {
        let gate = RateGate::new(Duration::from_secs(60), 2, Duration::from_secs(60));

        assert!(gate.check().is_ok());
        assert!(gate.check().is_ok());

        let wait = gate.check().expect_err("third call should be paced");
        assert_eq!(wait, Duration::from_secs(30));
    }

    #[test]
    fn cooldown_latch_blocks_until_deadline() {
        let gate = RateGate::new(Duration::from_secs(60), 100, Duration::from_millis(50));

        assert!(gate.check().is_ok());
        gate.note_rate_limited();

        let wait = gate.check().expect_err("gate should be cooling down");
        assert!(wait <= Duration::from_millis(50));

        std::thread::sleep(Duration::from_millis(60));
        assert!(gate.check().is_ok(), "latch should clear after cooldown");
    }
}
