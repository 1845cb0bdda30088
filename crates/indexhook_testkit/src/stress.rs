//! Stress runs for the transform stage.
//!
//! These verify behavior under heavy load and concurrent registration.

use crate::fixtures::{scenarios, EXTERNAL_INDEX};
use indexhook_core::{
    from_fn, IndexRecord, IndexTransform, IndexWriter, IndexingPipeline, Priority, TransformStage,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total records attempted.
    pub total_ops: usize,
    /// Records processed successfully.
    pub successful_ops: usize,
    /// Records that failed.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Records per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let secs = duration.as_secs_f64();
        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second: if secs > 0.0 { total as f64 / secs } else { 0.0 },
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Records: {} ok, {} failed", self.successful_ops, self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} records/sec", self.ops_per_second);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of records to process.
    pub operations: usize,
    /// Number of processing threads.
    pub threads: usize,
    /// Register/unregister cycles performed while processing.
    pub churn: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            churn: 1_000,
        }
    }
}

fn tally(results: impl IntoIterator<Item = bool>, start: Instant) -> StressTestResult {
    let (mut ok, mut failed) = (0, 0);
    for success in results {
        if success {
            ok += 1;
        } else {
            failed += 1;
        }
    }
    StressTestResult::new(ok, failed, start.elapsed())
}

/// Processes `config.operations` records on one thread.
pub fn stress_sequential_processing(
    stage: &TransformStage,
    config: &StressConfig,
) -> StressTestResult {
    let records = scenarios::wide_batch(config.operations);
    let start = Instant::now();
    tally(
        records
            .into_iter()
            .map(|record| stage.process(EXTERNAL_INDEX, record).is_ok()),
        start,
    )
}

/// Processes records on `config.threads` threads sharing one stage.
pub fn stress_concurrent_processing(
    stage: Arc<TransformStage>,
    config: &StressConfig,
) -> StressTestResult {
    let per_thread = config.operations / config.threads.max(1);
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let stage = Arc::clone(&stage);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            thread::spawn(move || {
                for record in scenarios::wide_batch(per_thread) {
                    let counter = match stage.process(EXTERNAL_INDEX, record) {
                        Ok(_) => &successful,
                        Err(_) => &failed,
                    };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Processes records concurrently while another thread keeps registering
/// and unregistering a no-op transform on the same index.
///
/// Returns the processing result and the number of churn cycles completed.
pub fn stress_registration_churn(
    stage: Arc<TransformStage>,
    config: &StressConfig,
) -> (StressTestResult, usize) {
    let done = Arc::new(AtomicBool::new(false));
    let churner = {
        let stage = Arc::clone(&stage);
        let done = Arc::clone(&done);
        let cycles = config.churn;
        thread::spawn(move || {
            let noop: Arc<dyn IndexTransform> =
                Arc::new(from_fn("churn", |_: &IndexRecord| Ok(None)));
            let mut completed = 0;
            while completed < cycles {
                let id = stage.register_shared(EXTERNAL_INDEX, Arc::clone(&noop), Priority::First);
                assert!(stage.unregister(id), "fresh registration must be removable");
                completed += 1;
                if done.load(Ordering::Relaxed) {
                    break;
                }
            }
            completed
        })
    };

    let result = stress_concurrent_processing(stage, config);
    done.store(true, Ordering::Relaxed);
    let completed = churner.join().expect("Churn thread panicked");
    (result, completed)
}

/// Indexes `config.operations` records through a pipeline in one batch.
pub fn stress_pipeline_batch<W: IndexWriter>(
    pipeline: &IndexingPipeline<W>,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();
    let outcome = pipeline.index_batch(EXTERNAL_INDEX, scenarios::wide_batch(config.operations));
    let failed = config.operations - outcome.persisted;
    StressTestResult::new(outcome.persisted, failed, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_content_store, standard_stage};
    use indexhook_core::{CombinedFieldTransform, MemoryIndex, SearchPathTransform, COMBINED_FIELD};

    fn small() -> StressConfig {
        StressConfig {
            operations: 400,
            threads: 4,
            churn: 200,
        }
    }

    #[test]
    fn test_sequential_processing() {
        let stage = TransformStage::new();
        stage.register(EXTERNAL_INDEX, SearchPathTransform::new(["content"]));
        stage.register(EXTERNAL_INDEX, CombinedFieldTransform::new(["content"]));
        let result = stress_sequential_processing(&stage, &small());
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 400);
    }

    #[test]
    fn test_concurrent_processing() {
        let store = sample_content_store();
        let stage = standard_stage(Arc::clone(&store));
        let result = stress_concurrent_processing(Arc::clone(&stage), &small());

        // wide_batch ids are not in the store, so breadcrumb lookups fail closed.
        assert_eq!(result.successful_ops, 0);
        assert_eq!(result.failed_ops, 400);
        assert_eq!(store.live_scopes(), 0);
        assert_eq!(store.scopes_opened(), store.scopes_released());
    }

    #[test]
    fn test_registration_churn() {
        let stage = Arc::new(TransformStage::new());
        stage.register(EXTERNAL_INDEX, CombinedFieldTransform::new(["content"]));

        let (result, cycles) = stress_registration_churn(Arc::clone(&stage), &small());
        assert_eq!(result.failed_ops, 0);
        assert!(cycles > 0);
        assert_eq!(stage.subscription_count(EXTERNAL_INDEX), 1);
    }

    #[test]
    fn test_pipeline_batch() {
        let stage = Arc::new(TransformStage::new());
        stage.register(EXTERNAL_INDEX, CombinedFieldTransform::new(["content"]));
        let pipeline = IndexingPipeline::new(stage, MemoryIndex::new());

        let result = stress_pipeline_batch(&pipeline, &small());
        assert_eq!(result.successful_ops, 400);
        let hits = pipeline
            .writer()
            .search_field(EXTERNAL_INDEX, COMBINED_FIELD, "page");
        assert_eq!(hits.len(), 400);
    }
}
