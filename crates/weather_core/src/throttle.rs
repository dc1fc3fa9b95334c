//! Per-user admission control.
//!
//! Two independent policies: a cooldown gate (minimum spacing between
//! requests) and a sliding-window counter (at most N requests per
//! trailing window). Both are pure in-memory decisions — no network,
//! no cache, and denial is a value, not an error.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Outcome of a sliding-window admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    /// Denied; retry after roughly this many seconds.
    Denied { wait_secs: u64 },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }
}

/// Minimum-spacing gate: one admitted request per `rate_limit` per user.
///
/// A denied request does not refresh the timer; an admitted one does.
#[derive(Debug)]
pub struct CooldownGate {
    rate_limit: Duration,
    last_request: DashMap<u64, Instant>,
}

impl CooldownGate {
    /// `rate_limit_secs` is the minimum spacing in fractional seconds.
    pub fn new(rate_limit_secs: f64) -> Self {
        Self {
            rate_limit: Duration::from_secs_f64(rate_limit_secs.max(0.0)),
            last_request: DashMap::new(),
        }
    }

    /// Admit or deny a request arriving now.
    pub fn check(&self, user_id: u64) -> bool {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: u64, now: Instant) -> bool {
        match self.last_request.entry(user_id) {
            Entry::Occupied(mut seen) => {
                if now.duration_since(*seen.get()) < self.rate_limit {
                    false
                } else {
                    seen.insert(now);
                    true
                }
            }
            Entry::Vacant(first) => {
                first.insert(now);
                true
            }
        }
    }
}

/// Trailing-window counter: at most `max_requests` admitted requests per
/// `window` per user. Timestamps older than the window are pruned before
/// every check, so per-user state never exceeds `max_requests` entries.
#[derive(Debug)]
pub struct SlidingWindow {
    max_requests: usize,
    window: Duration,
    requests: DashMap<u64, Vec<Instant>>,
}

impl SlidingWindow {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests: max_requests.max(1) as usize,
            window: Duration::from_secs(window_secs.max(1)),
            requests: DashMap::new(),
        }
    }

    /// Admit or deny a request arriving now. A denial reports how long
    /// the user should wait before the oldest slot frees up.
    pub fn check(&self, user_id: u64) -> Decision {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: u64, now: Instant) -> Decision {
        let mut entry = self.requests.entry(user_id).or_default();
        let timestamps = entry.value_mut();

        timestamps.retain(|&t| now.duration_since(t) < self.window);

        if timestamps.len() < self.max_requests {
            timestamps.push(now);
            return Decision::Admitted;
        }

        let oldest = timestamps.iter().min().copied().unwrap_or(now);
        let wait = self.window.saturating_sub(now.duration_since(oldest));
        Decision::Denied {
            wait_secs: wait.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: u64 = 42;

    #[test]
    fn cooldown_denies_inside_the_limit() {
        let gate = CooldownGate::new(1.0);
        let t0 = Instant::now();

        assert!(gate.check_at(USER, t0));
        assert!(!gate.check_at(USER, t0 + Duration::from_millis(500)));
    }

    #[test]
    fn cooldown_admits_after_the_limit() {
        let gate = CooldownGate::new(1.0);
        let t0 = Instant::now();

        assert!(gate.check_at(USER, t0));
        assert!(gate.check_at(USER, t0 + Duration::from_millis(1500)));
    }

    #[test]
    fn cooldown_denial_does_not_refresh_the_timer() {
        let gate = CooldownGate::new(1.0);
        let t0 = Instant::now();

        assert!(gate.check_at(USER, t0));
        // Denied at 0.9s; the window is still measured from t0, so the
        // request at 1.1s is admitted.
        assert!(!gate.check_at(USER, t0 + Duration::from_millis(900)));
        assert!(gate.check_at(USER, t0 + Duration::from_millis(1100)));
    }

    #[test]
    fn cooldown_tracks_identities_independently() {
        let gate = CooldownGate::new(1.0);
        let t0 = Instant::now();

        assert!(gate.check_at(1, t0));
        assert!(gate.check_at(2, t0));
    }

    #[test]
    fn window_admits_up_to_the_limit_then_denies() {
        let window = SlidingWindow::new(3, 60);
        let t0 = Instant::now();

        assert!(window.check_at(USER, t0).is_admitted());
        assert!(window.check_at(USER, t0 + Duration::from_secs(3)).is_admitted());
        assert!(window.check_at(USER, t0 + Duration::from_secs(6)).is_admitted());

        match window.check_at(USER, t0 + Duration::from_secs(9)) {
            Decision::Denied { wait_secs } => {
                // 60s window minus the 9s since the oldest admitted slot.
                assert_eq!(wait_secs, 51);
            }
            Decision::Admitted => panic!("fourth request should be denied"),
        }
    }

    #[test]
    fn window_frees_slots_as_time_passes() {
        let window = SlidingWindow::new(2, 10);
        let t0 = Instant::now();

        assert!(window.check_at(USER, t0).is_admitted());
        assert!(window.check_at(USER, t0 + Duration::from_secs(1)).is_admitted());
        assert!(!window.check_at(USER, t0 + Duration::from_secs(2)).is_admitted());
        // t0's slot has aged out by t0+11.
        assert!(window.check_at(USER, t0 + Duration::from_secs(11)).is_admitted());
    }

    #[test]
    fn window_state_stays_bounded() {
        let window = SlidingWindow::new(3, 60);
        let t0 = Instant::now();

        for i in 0..20 {
            window.check_at(USER, t0 + Duration::from_secs(i));
        }

        let entry = window.requests.get(&USER).unwrap();
        assert!(entry.len() <= 3);
    }

    #[test]
    fn denied_requests_are_not_counted_against_the_window() {
        let window = SlidingWindow::new(1, 10);
        let t0 = Instant::now();

        assert!(window.check_at(USER, t0).is_admitted());
        // Hammering while denied must not extend the lockout.
        for i in 1..5 {
            assert!(!window.check_at(USER, t0 + Duration::from_secs(i)).is_admitted());
        }
        assert!(window.check_at(USER, t0 + Duration::from_secs(11)).is_admitted());
    }
}
