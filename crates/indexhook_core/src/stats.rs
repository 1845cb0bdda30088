//! Stage statistics.
//!
//! All counters are atomic and can be read while records are being
//! processed on other threads.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a [`TransformStage`](crate::TransformStage).
#[derive(Debug, Default)]
pub struct StageStats {
    /// Records that made it through every transform.
    records_processed: AtomicU64,
    /// Records rejected because a transform failed.
    records_failed: AtomicU64,
    /// Total transform invocations.
    invocations: AtomicU64,
    /// Invocations that replaced the field mapping.
    replacements: AtomicU64,
    /// Transform errors dropped under the fail-open policy.
    errors_skipped: AtomicU64,
}

impl StageStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_processed(&self) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.records_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_replacement(&self) {
        self.replacements.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_error(&self) {
        self.errors_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of records processed successfully.
    pub fn records_processed(&self) -> u64 {
        self.records_processed.load(Ordering::Relaxed)
    }

    /// Returns the number of records rejected by a failing transform.
    pub fn records_failed(&self) -> u64 {
        self.records_failed.load(Ordering::Relaxed)
    }

    /// Returns the number of transform invocations.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    /// Returns the number of field mapping replacements.
    pub fn replacements(&self) -> u64 {
        self.replacements.load(Ordering::Relaxed)
    }

    /// Returns the number of errors skipped under fail-open.
    pub fn errors_skipped(&self) -> u64 {
        self.errors_skipped.load(Ordering::Relaxed)
    }

    /// Creates a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records_processed: self.records_processed(),
            records_failed: self.records_failed(),
            invocations: self.invocations(),
            replacements: self.replacements(),
            errors_skipped: self.errors_skipped(),
        }
    }
}

/// A point-in-time snapshot of stage statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatsSnapshot {
    /// Records processed successfully.
    pub records_processed: u64,
    /// Records rejected by a failing transform.
    pub records_failed: u64,
    /// Transform invocations.
    pub invocations: u64,
    /// Field mapping replacements.
    pub replacements: u64,
    /// Errors skipped under fail-open.
    pub errors_skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn default_stats_are_zero() {
        let stats = StageStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn record_operations() {
        let stats = StageStats::new();
        stats.record_invocation();
        stats.record_invocation();
        stats.record_replacement();
        stats.record_processed();
        stats.record_failed();
        stats.record_skipped_error();

        let snap = stats.snapshot();
        assert_eq!(snap.invocations, 2);
        assert_eq!(snap.replacements, 1);
        assert_eq!(snap.records_processed, 1);
        assert_eq!(snap.records_failed, 1);
        assert_eq!(snap.errors_skipped, 1);
    }

    #[test]
    fn concurrent_updates() {
        let stats = Arc::new(StageStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_invocation();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.invocations(), 4000);
    }
}
