//! # IndexHook Testkit
//!
//! Test utilities for IndexHook.
//!
//! This crate provides:
//! - Sample content trees, records and a fully wired stage
//! - Temporary JSON fixture files for command-line tests
//! - Property-based test generators using proptest
//! - Concurrent stress runs against a shared stage
//!
//! ## Usage
//!
//! ```rust
//! use indexhook_testkit::prelude::*;
//!
//! with_test_pipeline(|pipeline| {
//!     let outcome = pipeline.index_batch(EXTERNAL_INDEX, sample_records());
//!     assert!(outcome.is_complete());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
