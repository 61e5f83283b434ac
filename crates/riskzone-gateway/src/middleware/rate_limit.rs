//! Per-origin admission control for the write path

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use riskzone_kernel::policy::RateLimitPolicy;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of [`AdmissionController::check_and_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    /// The origin used up its window; `retry_after` is the time left in it.
    Reject { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allow)
    }
}

/// Counting state of one origin
#[derive(Debug, Clone, Copy)]
struct RateBucket {
    /// Start of the current window
    window_start: Instant,
    /// Attempts admitted since `window_start`
    count: u64,
}

impl RateBucket {
    fn fresh(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 1,
        }
    }
}

/// Fixed-window write limiter keyed by client origin.
///
/// Each origin gets `max_requests` admissions per `window`. The window is
/// not aligned to wall-clock ticks: it starts at the first attempt after the
/// previous one expired. Rejected attempts are not counted.
///
/// The check and the update for one origin run under that key's map entry
/// guard, so concurrent attempts from one origin can never over-admit.
pub struct AdmissionController {
    buckets: DashMap<String, RateBucket>,
    max_requests: u64,
    window: Duration,
}

impl AdmissionController {
    /// Create a new controller.
    ///
    /// * `max_requests` - admissions per window
    /// * `window`       - window duration
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_policy(policy: &RateLimitPolicy) -> Self {
        Self::new(policy.max_requests, policy.window())
    }

    /// Decide whether `origin` may write at `now`, recording the attempt if so.
    pub fn check_and_record(&self, origin: &str, now: Instant) -> Admission {
        match self.buckets.entry(origin.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateBucket::fresh(now));
                Admission::Allow
            }
            Entry::Occupied(mut slot) => {
                let bucket = slot.get_mut();
                let elapsed = now.saturating_duration_since(bucket.window_start);
                if elapsed > self.window {
                    *bucket = RateBucket::fresh(now);
                    Admission::Allow
                } else if bucket.count >= self.max_requests {
                    Admission::Reject {
                        retry_after: self.window - elapsed,
                    }
                } else {
                    bucket.count += 1;
                    Admission::Allow
                }
            }
        }
    }

    /// Drop buckets whose window has expired, returning how many were removed.
    ///
    /// An expired bucket would be reset on its next attempt anyway, so removing
    /// it never changes an admission decision.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.buckets.retain(|_, bucket| {
            let live = now.saturating_duration_since(bucket.window_start) <= self.window;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Number of origins currently tracked.
    pub fn tracked_origins(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn allows_up_to_max_requests() {
        let ac = AdmissionController::new(3, MINUTE);
        let now = Instant::now();
        assert!(ac.check_and_record("client1", now).is_allowed());
        assert!(ac.check_and_record("client1", now).is_allowed());
        assert!(ac.check_and_record("client1", now).is_allowed());
        assert!(!ac.check_and_record("client1", now).is_allowed()); // 4th request denied
    }

    #[test]
    fn different_origins_are_independent() {
        let ac = AdmissionController::new(1, MINUTE);
        let now = Instant::now();
        assert!(ac.check_and_record("a", now).is_allowed());
        assert!(!ac.check_and_record("a", now).is_allowed());
        assert!(ac.check_and_record("b", now).is_allowed()); // different origin, fresh limit
    }

    #[test]
    fn hundred_twenty_first_attempt_in_window_is_rejected() {
        let ac = AdmissionController::new(120, MINUTE);
        let start = Instant::now();
        for i in 0..120 {
            let now = start + Duration::from_millis(i * 100);
            assert!(ac.check_and_record("10.0.0.1", now).is_allowed(), "attempt {}", i + 1);
        }
        let at = start + Duration::from_secs(30);
        assert_eq!(
            ac.check_and_record("10.0.0.1", at),
            Admission::Reject {
                retry_after: Duration::from_secs(30)
            }
        );
    }

    #[test]
    fn window_resets_only_after_strictly_exceeding_duration() {
        let ac = AdmissionController::new(1, MINUTE);
        let start = Instant::now();
        assert!(ac.check_and_record("o", start).is_allowed());
        // Exactly one window later is still inside the window.
        assert!(!ac.check_and_record("o", start + MINUTE).is_allowed());
        let later = start + Duration::from_secs(61);
        assert!(ac.check_and_record("o", later).is_allowed());
        // The new window is anchored at the first attempt after expiry.
        assert!(!ac.check_and_record("o", later + Duration::from_secs(59)).is_allowed());
        assert!(ac.check_and_record("o", later + Duration::from_secs(61)).is_allowed());
    }

    #[test]
    fn rejections_do_not_extend_the_count() {
        let ac = AdmissionController::new(2, MINUTE);
        let start = Instant::now();
        ac.check_and_record("o", start);
        ac.check_and_record("o", start);
        for _ in 0..50 {
            assert!(!ac.check_and_record("o", start + Duration::from_secs(1)).is_allowed());
        }
        assert!(ac.check_and_record("o", start + Duration::from_secs(61)).is_allowed());
    }

    #[test]
    fn sweep_removes_only_expired_buckets() {
        let ac = AdmissionController::new(5, MINUTE);
        let start = Instant::now();
        ac.check_and_record("old", start);
        ac.check_and_record("fresh", start + Duration::from_secs(30));
        assert_eq!(ac.tracked_origins(), 2);

        let removed = ac.sweep(start + Duration::from_secs(61));
        assert_eq!(removed, 1);
        assert_eq!(ac.tracked_origins(), 1);
        assert_eq!(ac.sweep(start + Duration::from_secs(61)), 0);
    }

    #[test]
    fn concurrent_attempts_never_over_admit() {
        let ac = Arc::new(AdmissionController::new(120, MINUTE));
        let now = Instant::now();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ac = Arc::clone(&ac);
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| ac.check_and_record("burst", now).is_allowed())
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 120);
    }
}
