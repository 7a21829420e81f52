//! Sliding-window rate-limit store.
//!
//! Per-fingerprint attempt windows in a thread-safe DashMap. All operations
//! take an explicit `now_ms` so the window arithmetic is testable with a
//! simulated clock; the middleware passes wall time.
//!
//! Invariants: an entry's count never exceeds the policy's `max_attempts`,
//! and `reset_ms` is always `started_ms + window_ms`.

use dashmap::DashMap;

use super::policy::RateLimitPolicy;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_ms: i64,
    reset_ms: i64,
}

impl Window {
    fn fresh(now_ms: i64, window_ms: i64) -> Self {
        Self {
            count: 0,
            started_ms: now_ms,
            reset_ms: now_ms + window_ms,
        }
    }

    fn expired(&self, now_ms: i64) -> bool {
        now_ms >= self.reset_ms
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Limited { retry_after_secs: u64 },
}

/// Thread-safe per-fingerprint window store for one policy.
///
/// Explicitly constructed and injected at the composition root; tests get
/// isolation from fresh instances.
pub struct RateLimitStore {
    policy: RateLimitPolicy,
    entries: DashMap<String, Window>,
}

impl RateLimitStore {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            entries: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Check and count one attempt for `key`.
    ///
    /// Starts a fresh window when none exists or the current one has
    /// expired. The entry is mutated under its shard lock, so two requests
    /// from the same fingerprint cannot race to a lost update.
    pub fn try_admit(&self, key: &str, now_ms: i64) -> Admission {
        let window_ms = self.policy.window_ms();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Window::fresh(now_ms, window_ms));

        if entry.expired(now_ms) {
            *entry = Window::fresh(now_ms, window_ms);
        }

        if entry.count >= self.policy.max_attempts {
            let remaining_ms = (entry.reset_ms - now_ms).max(0);
            // Round up, floor at 1: the client should never retry immediately
            let retry_after_secs = ((remaining_ms + 999) / 1000).max(1) as u64;
            return Admission::Limited { retry_after_secs };
        }

        entry.count += 1;
        Admission::Admitted
    }

    /// Give back one counted attempt, used by refund-on-success policies.
    /// A refund after the window rolled over is dropped.
    pub fn refund(&self, key: &str, now_ms: i64) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.expired(now_ms) && entry.count > 0 {
                entry.count -= 1;
            }
        }
    }

    /// Evict entries whose window has fully expired. Returns the number
    /// evicted. Bounds memory growth from abandoned fingerprints.
    pub fn sweep(&self, now_ms: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, window| !window.expired(now_ms));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn small_store() -> RateLimitStore {
        RateLimitStore::new(RateLimitPolicy {
            window_secs: 60,
            max_attempts: 5,
            message: "limited".to_string(),
            mode: super::super::policy::CountingMode::Always,
        })
    }

    #[test]
    fn test_sixth_attempt_rejected() {
        let store = small_store();
        let now = 1_000_000;
        for _ in 0..5 {
            assert_eq!(store.try_admit("fp", now), Admission::Admitted);
        }
        match store.try_admit("fp", now) {
            Admission::Limited { retry_after_secs } => assert!(retry_after_secs > 0),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_window_reset_after_expiry() {
        let store = small_store();
        let now = 1_000_000;
        for _ in 0..5 {
            store.try_admit("fp", now);
        }
        assert!(matches!(
            store.try_admit("fp", now),
            Admission::Limited { .. }
        ));

        // Simulated clock: one window later the same fingerprint is fresh
        let later = now + 60_000;
        assert_eq!(store.try_admit("fp", later), Admission::Admitted);
    }

    #[test]
    fn test_retry_after_tracks_remaining_window() {
        let store = small_store();
        let now = 1_000_000;
        for _ in 0..5 {
            store.try_admit("fp", now);
        }
        // 45s into the window, 15s remain
        match store.try_admit("fp", now + 45_000) {
            Admission::Limited { retry_after_secs } => assert_eq!(retry_after_secs, 15),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_refund_restores_capacity() {
        let store = small_store();
        let now = 1_000_000;
        for _ in 0..5 {
            assert_eq!(store.try_admit("fp", now), Admission::Admitted);
            store.refund("fp", now);
        }
        // Every attempt was refunded, so capacity is untouched
        assert_eq!(store.try_admit("fp", now), Admission::Admitted);
    }

    #[test]
    fn test_refund_after_rollover_is_dropped() {
        let store = small_store();
        let now = 1_000_000;
        store.try_admit("fp", now);

        // The window has expired; a late refund must not underflow it or
        // carry credit into the next window
        let later = now + 120_000;
        store.refund("fp", later);
        for _ in 0..5 {
            assert_eq!(store.try_admit("fp", later), Admission::Admitted);
        }
        assert!(matches!(
            store.try_admit("fp", later),
            Admission::Limited { .. }
        ));
    }

    #[test]
    fn test_independent_fingerprints() {
        let store = small_store();
        let now = 1_000_000;
        for _ in 0..5 {
            store.try_admit("fp-a", now);
        }
        assert!(matches!(
            store.try_admit("fp-a", now),
            Admission::Limited { .. }
        ));
        assert_eq!(store.try_admit("fp-b", now), Admission::Admitted);
    }

    #[test]
    fn test_sweep_evicts_only_expired() {
        let store = small_store();
        store.try_admit("old", 1_000_000);
        store.try_admit("new", 1_050_000);
        assert_eq!(store.len(), 2);

        // "old" expired at 1_060_000; "new" lives until 1_110_000
        let evicted = store.sweep(1_070_000);
        assert_eq!(evicted, 1);
        assert_eq!(store.len(), 1);

        let evicted = store.sweep(2_000_000);
        assert_eq!(evicted, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_admissions_never_exceed_max() {
        let store = Arc::new(small_store());
        let now = 1_000_000;

        let mut handles = vec![];
        for _ in 0..20 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                matches!(store.try_admit("fp", now), Admission::Admitted)
            }));
        }

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 5);
    }
}
