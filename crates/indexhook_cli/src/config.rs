//! Transform configuration files.
//!
//! ```json
//! {
//!   "failure_policy": "fail_closed",
//!   "indexes": {
//!     "external": [
//!       { "kind": "search_path", "categories": ["content"] },
//!       { "kind": "breadcrumb", "categories": ["content"] },
//!       { "kind": "combined", "categories": ["content"] }
//!     ]
//!   }
//! }
//! ```
//!
//! Transforms are registered in file order, per index.

use crate::error::{CliError, CliResult};
use indexhook_core::{
    BreadcrumbTransform, CombinedFieldTransform, ContentStore, FailOpen, FailurePolicy,
    IndexTransform, Priority, SearchPathTransform, StageConfig, TransformStage,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Root of a transform configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Stage-wide failure policy.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Transforms per index name, in registration order.
    #[serde(default)]
    pub indexes: BTreeMap<String, Vec<TransformSpec>>,
}

/// One configured transform.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformSpec {
    /// A combined text field.
    Combined {
        /// Categories to apply to (empty = all).
        #[serde(default)]
        categories: Vec<String>,
        /// Target field name.
        target: Option<String>,
        /// Restrict the combined text to these fields.
        sources: Option<Vec<String>>,
        /// Ignore errors from this transform.
        #[serde(default)]
        fail_open: bool,
    },

    /// The tokenized ancestry path.
    SearchPath {
        /// Categories to apply to (empty = all).
        #[serde(default)]
        categories: Vec<String>,
        /// Field holding the raw path.
        source: Option<String>,
        /// Target field name.
        target: Option<String>,
        /// Path delimiter.
        delimiter: Option<char>,
        /// Ignore errors from this transform.
        #[serde(default)]
        fail_open: bool,
    },

    /// Ancestor names from the content store.
    Breadcrumb {
        /// Categories to apply to (empty = all).
        #[serde(default)]
        categories: Vec<String>,
        /// Target field name.
        target: Option<String>,
        /// Whether the record's own name ends the breadcrumb.
        include_self: Option<bool>,
        /// Ignore errors from this transform.
        #[serde(default)]
        fail_open: bool,
    },
}

fn shared<T: IndexTransform + 'static>(transform: T, fail_open: bool) -> Arc<dyn IndexTransform> {
    if fail_open {
        Arc::new(FailOpen::new(transform))
    } else {
        Arc::new(transform)
    }
}

impl TransformSpec {
    /// Returns the configured kind, as written in the file.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Combined { .. } => "combined",
            Self::SearchPath { .. } => "search_path",
            Self::Breadcrumb { .. } => "breadcrumb",
        }
    }

    /// Builds the transform. Breadcrumbs need a content store.
    pub fn build(
        &self,
        store: Option<&Arc<dyn ContentStore>>,
    ) -> CliResult<Arc<dyn IndexTransform>> {
        let built = match self {
            Self::Combined {
                categories,
                target,
                sources,
                fail_open,
            } => {
                let mut t = CombinedFieldTransform::new(categories.iter().cloned());
                if let Some(target) = target {
                    t = t.with_target(target.clone());
                }
                if let Some(sources) = sources {
                    t = t.with_sources(sources.iter().cloned());
                }
                shared(t, *fail_open)
            }
            Self::SearchPath {
                categories,
                source,
                target,
                delimiter,
                fail_open,
            } => {
                let mut t = SearchPathTransform::new(categories.iter().cloned());
                if let Some(source) = source {
                    t = t.with_source(source.clone());
                }
                if let Some(target) = target {
                    t = t.with_target(target.clone());
                }
                if let Some(delimiter) = delimiter {
                    t = t.with_delimiter(*delimiter);
                }
                shared(t, *fail_open)
            }
            Self::Breadcrumb {
                categories,
                target,
                include_self,
                fail_open,
            } => {
                let store = store.ok_or_else(|| {
                    CliError::config("breadcrumb transform requires --content")
                })?;
                let mut t = BreadcrumbTransform::new(Arc::clone(store), categories.iter().cloned());
                if let Some(target) = target {
                    t = t.with_target(target.clone());
                }
                if let Some(include) = include_self {
                    t = t.include_self(*include);
                }
                shared(t, *fail_open)
            }
        };
        Ok(built)
    }
}

impl TransformConfig {
    /// Loads a config file.
    pub fn load(path: &Path) -> CliResult<Self> {
        crate::input::read_json(path)
    }

    /// Returns true if any index uses a breadcrumb transform.
    pub fn needs_content(&self) -> bool {
        self.indexes
            .values()
            .flatten()
            .any(|spec| matches!(spec, TransformSpec::Breadcrumb { .. }))
    }

    /// Builds a stage with every configured transform registered.
    pub fn build_stage(
        &self,
        store: Option<Arc<dyn ContentStore>>,
        trace_invocations: bool,
    ) -> CliResult<TransformStage> {
        let stage = TransformStage::with_config(
            StageConfig::new()
                .failure_policy(self.failure_policy)
                .trace_invocations(trace_invocations),
        );
        for (index, specs) in &self.indexes {
            if index.is_empty() {
                return Err(CliError::config("index name must not be empty"));
            }
            for spec in specs {
                let transform = spec.build(store.as_ref())?;
                tracing::debug!(index = %index, kind = spec.kind(), "registering transform");
                stage.register_shared(index.as_str(), transform, Priority::Append);
            }
        }
        Ok(stage)
    }
}
