//! Stage configuration.

/// What the stage does when a transform returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailurePolicy {
    /// Abort the record and surface the error to the indexer.
    ///
    /// A record missing computed fields is never written.
    #[default]
    FailClosed,
    /// Log the error, drop that transform's contribution and continue.
    FailOpen,
}

/// Configuration for a [`TransformStage`](crate::TransformStage).
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    /// Policy applied to transform errors.
    pub failure_policy: FailurePolicy,

    /// Whether to log each transform invocation at debug level.
    pub trace_invocations: bool,
}

impl StageConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets whether to trace each transform invocation.
    #[must_use]
    pub const fn trace_invocations(mut self, value: bool) -> Self {
        self.trace_invocations = value;
        self
    }
}
