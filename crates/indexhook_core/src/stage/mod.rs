//! The index-value transformation stage.
//!
//! [`TransformStage`] is the extension point an indexer calls once per
//! record, per index, right before the record is written. Any number of
//! independently registered [`IndexTransform`]s may enrich the record.
//!
//! # Guarantees
//!
//! - Transforms run synchronously in registration order.
//! - Each transform sees the record as left by the previous one.
//! - The stage never mutates a field mapping in place; a transform's
//!   returned [`Fields`](crate::Fields) replaces the mapping.
//! - Under [`FailurePolicy::FailClosed`] the first error aborts the record.
//! - Registration may change concurrently with processing. A `process`
//!   call works on the list as it was when the call started.
//!
//! # Usage
//!
//! ```rust
//! use indexhook_core::{CombinedFieldTransform, Fields, IndexRecord, TransformStage};
//!
//! let stage = TransformStage::new();
//! let handle = stage.register("external", CombinedFieldTransform::new(["content"]));
//!
//! let record = IndexRecord::new(
//!     "1066",
//!     "content",
//!     Fields::new().with("title", ["Home"]).with("body", ["Welcome"]),
//! );
//! let record = stage.process("external", record).unwrap();
//! assert_eq!(
//!     record.fields().first("combinedField").and_then(|v| v.as_text()),
//!     Some("Home\nWelcome")
//! );
//!
//! stage.unregister(handle);
//! ```

mod registry;
mod transform;

pub use transform::{
    from_fn, FailOpen, FnTransform, ForCategories, IndexTransform, TransformResult,
};

use crate::config::{FailurePolicy, StageConfig};
use crate::error::{CoreError, CoreResult};
use crate::record::IndexRecord;
use crate::stats::StageStats;
use crate::types::{IndexName, Priority, SubscriptionId};
use registry::Registry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs registered transforms over records bound for a search index.
pub struct TransformStage {
    config: StageConfig,
    registry: Registry,
    stats: StageStats,
}

impl TransformStage {
    /// Creates a stage with the default (fail-closed) configuration.
    pub fn new() -> Self {
        Self::with_config(StageConfig::default())
    }

    /// Creates a stage with the given configuration.
    pub fn with_config(config: StageConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            stats: StageStats::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Returns the statistics counters.
    pub fn stats(&self) -> &StageStats {
        &self.stats
    }

    /// Appends a transform to an index's invocation list.
    ///
    /// Registering the same transform twice runs it twice.
    pub fn register<T>(&self, index: impl Into<IndexName>, transform: T) -> SubscriptionId
    where
        T: IndexTransform + 'static,
    {
        self.register_with(index, transform, Priority::Append)
    }

    /// Registers a transform at the given position.
    pub fn register_with<T>(
        &self,
        index: impl Into<IndexName>,
        transform: T,
        priority: Priority,
    ) -> SubscriptionId
    where
        T: IndexTransform + 'static,
    {
        self.register_shared(index, Arc::new(transform), priority)
    }

    /// Registers a transform that is shared with other owners.
    pub fn register_shared(
        &self,
        index: impl Into<IndexName>,
        transform: Arc<dyn IndexTransform>,
        priority: Priority,
    ) -> SubscriptionId {
        let index = index.into();
        let name = transform.name().to_string();
        let id = self.registry.add(index.clone(), transform, priority);
        debug!(%index, transform = %name, subscription = %id, ?priority, "registered transform");
        id
    }

    /// Removes a registration.
    ///
    /// Returns `true` if something was removed. Unknown or already removed
    /// handles are ignored.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            debug!(subscription = %id, "unregistered transform");
        }
        removed
    }

    /// Removes every registration, e.g. at shutdown.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Returns the number of transforms registered for an index.
    pub fn subscription_count(&self, index: &str) -> usize {
        self.registry.len(index)
    }

    /// Returns the indexes that have at least one transform, sorted.
    pub fn indexes(&self) -> Vec<IndexName> {
        self.registry.indexes()
    }

    /// Runs the index's transforms over `record` and returns the result.
    ///
    /// With no transforms registered for `index` the record is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::FailClosed`] returns
    /// [`CoreError::CallbackFailure`] for the first failing transform; the
    /// record must then not be persisted.
    pub fn process(&self, index: &str, mut record: IndexRecord) -> CoreResult<IndexRecord> {
        let Some((index, chain)) = self.registry.snapshot(index) else {
            self.stats.record_processed();
            return Ok(record);
        };

        for registration in chain.iter() {
            let transform = &registration.transform;
            self.stats.record_invocation();
            if self.config.trace_invocations {
                debug!(
                    %index,
                    transform = transform.name(),
                    record_id = record.id(),
                    category = record.category(),
                    "invoking transform"
                );
            }

            match transform.transform(&record) {
                Ok(Some(fields)) => {
                    self.stats.record_replacement();
                    record.set_fields(fields);
                }
                Ok(None) => {}
                Err(source) => match self.config.failure_policy {
                    FailurePolicy::FailClosed => {
                        self.stats.record_failed();
                        return Err(CoreError::callback_failure(
                            index,
                            transform.name(),
                            record.id(),
                            source,
                        ));
                    }
                    FailurePolicy::FailOpen => {
                        self.stats.record_skipped_error();
                        warn!(
                            %index,
                            transform = transform.name(),
                            record_id = record.id(),
                            error = %source,
                            "transform failed, continuing without its changes"
                        );
                    }
                },
            }
        }

        self.stats.record_processed();
        Ok(record)
    }
}

impl Default for TransformStage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransformStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformStage")
            .field("config", &self.config)
            .field("indexes", &self.indexes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, Fields};
    use parking_lot::Mutex;
    use std::thread;

    fn record() -> IndexRecord {
        IndexRecord::new("1234", "content", Fields::new().with("title", ["Home"]))
    }

    /// Appends its own name to the `trail` field.
    fn append_trail(name: &'static str) -> impl IndexTransform {
        from_fn(name, move |record: &IndexRecord| {
            let mut fields = record.fields().clone();
            fields.push_value("trail", name);
            Ok(Some(fields))
        })
    }

    fn trail(record: &IndexRecord) -> Vec<String> {
        record
            .fields()
            .get("trail")
            .unwrap_or(&[])
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn no_transforms_passes_through() {
        let stage = TransformStage::new();
        let input = record();
        let shared = Arc::clone(input.shared_fields());

        let output = stage.process("external", input).unwrap();
        assert!(Arc::ptr_eq(&shared, output.shared_fields()));
        assert_eq!(stage.stats().records_processed(), 1);
    }

    #[test]
    fn non_matching_category_is_pointer_equal() {
        let stage = TransformStage::new();
        stage.register("external", ForCategories::new(["media"], append_trail("a")));

        let input = record();
        let shared = Arc::clone(input.shared_fields());
        let output = stage.process("external", input).unwrap();

        assert!(Arc::ptr_eq(&shared, output.shared_fields()));
        assert_eq!(stage.stats().replacements(), 0);
    }

    #[test]
    fn transforms_chain_in_registration_order() {
        let stage = TransformStage::new();
        stage.register("external", append_trail("c1"));
        stage.register(
            "external",
            from_fn("c2", |record: &IndexRecord| {
                let seen = record.fields().contains("trail");
                let mut fields = record.fields().clone();
                fields.push_value("c2_saw_c1", seen);
                fields.push_value("trail", "c2");
                Ok(Some(fields))
            }),
        );

        let output = stage.process("external", record()).unwrap();
        assert_eq!(trail(&output), vec!["c1", "c2"]);
        assert_eq!(
            output.fields().get("c2_saw_c1"),
            Some(&[FieldValue::Bool(true)][..])
        );
    }

    #[test]
    fn first_priority_runs_before_existing() {
        let stage = TransformStage::new();
        stage.register("external", append_trail("late"));
        stage.register_with("external", append_trail("early"), Priority::First);

        let output = stage.process("external", record()).unwrap();
        assert_eq!(trail(&output), vec!["early", "late"]);
    }

    #[test]
    fn duplicate_registration_runs_twice() {
        let stage = TransformStage::new();
        let shared: Arc<dyn IndexTransform> = Arc::new(append_trail("dup"));
        stage.register_shared("external", Arc::clone(&shared), Priority::Append);
        stage.register_shared("external", shared, Priority::Append);

        let output = stage.process("external", record()).unwrap();
        assert_eq!(trail(&output), vec!["dup", "dup"]);
    }

    #[test]
    fn transforms_are_scoped_to_their_index() {
        let stage = TransformStage::new();
        stage.register("internal", append_trail("internal-only"));

        let output = stage.process("external", record()).unwrap();
        assert!(trail(&output).is_empty());
        assert_eq!(stage.indexes(), vec![IndexName::new("internal")]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let stage = TransformStage::new();
        let id = stage.register("external", append_trail("a"));

        assert!(stage.unregister(id));
        assert!(!stage.unregister(id));
        assert!(!stage.unregister(SubscriptionId::new(4242)));
        assert_eq!(stage.subscription_count("external"), 0);

        let output = stage.process("external", record()).unwrap();
        assert!(trail(&output).is_empty());
    }

    #[test]
    fn fail_closed_aborts_chain() {
        let stage = TransformStage::new();
        let ran_after = Arc::new(Mutex::new(false));
        stage.register(
            "external",
            from_fn("broken", |_: &IndexRecord| Err("computed field unavailable".into())),
        );
        let flag = Arc::clone(&ran_after);
        stage.register(
            "external",
            from_fn("after", move |_: &IndexRecord| {
                *flag.lock() = true;
                Ok(None)
            }),
        );

        let err = stage.process("external", record()).unwrap_err();
        match err {
            CoreError::CallbackFailure {
                index,
                transform,
                record_id,
                ..
            } => {
                assert_eq!(index.as_str(), "external");
                assert_eq!(transform, "broken");
                assert_eq!(record_id, "1234");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!*ran_after.lock());
        assert_eq!(stage.stats().records_failed(), 1);
        assert_eq!(stage.stats().records_processed(), 0);
    }

    #[test]
    fn fail_open_policy_continues() {
        let stage =
            TransformStage::with_config(StageConfig::new().failure_policy(FailurePolicy::FailOpen));
        stage.register("external", append_trail("a"));
        stage.register("external", from_fn("broken", |_: &IndexRecord| Err("nope".into())));
        stage.register("external", append_trail("b"));

        let output = stage.process("external", record()).unwrap();
        assert_eq!(trail(&output), vec!["a", "b"]);
        assert_eq!(stage.stats().errors_skipped(), 1);
    }

    #[test]
    fn transform_may_unregister_during_processing() {
        let stage = Arc::new(TransformStage::new());
        let weak = Arc::downgrade(&stage);
        let target = stage.register("external", append_trail("target"));
        stage.register_with(
            "external",
            from_fn("remover", move |_: &IndexRecord| {
                if let Some(stage) = weak.upgrade() {
                    stage.unregister(target);
                }
                Ok(None)
            }),
            Priority::First,
        );

        // The running call keeps its snapshot; the next call sees the removal.
        let first = stage.process("external", record()).unwrap();
        assert_eq!(trail(&first), vec!["target"]);
        let second = stage.process("external", record()).unwrap();
        assert!(trail(&second).is_empty());
    }

    #[test]
    fn concurrent_process_and_register() {
        let stage = Arc::new(TransformStage::new());
        stage.register("external", append_trail("base"));

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let stage = Arc::clone(&stage);
                thread::spawn(move || {
                    for n in 0..100 {
                        let rec = IndexRecord::new(format!("{i}-{n}"), "content", Fields::new());
                        let out = stage.process("external", rec).unwrap();
                        assert_eq!(trail(&out).first().map(String::as_str), Some("base"));
                    }
                })
            })
            .collect();

        let registrar = {
            let stage = Arc::clone(&stage);
            thread::spawn(move || {
                for _ in 0..100 {
                    let id = stage.register("external", append_trail("extra"));
                    stage.unregister(id);
                }
            })
        };

        for w in workers {
            w.join().unwrap();
        }
        registrar.join().unwrap();
        assert_eq!(stage.subscription_count("external"), 1);
        assert_eq!(stage.stats().records_processed(), 400);
    }
}
