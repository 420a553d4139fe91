//! Structural Schema Validators
//!
//! Answers "does this document conform to version V's shape?" for every
//! historical schema version.
//!
//! # Architecture
//!
//! ```text
//! Value ──▶ SchemaRegistry ──▶ SchemaDefinition(version) ──▶ walker + ErrorSink
//!                                                       └──▶ SchemaViolations
//! ```
//!
//! Each version is a [`SchemaDefinition`]: a requirement set interpreted by a
//! shared document walker. Definitions live in a [`SchemaRegistry`] keyed by
//! version - explicitly constructed by the caller, never ambient global
//! state - and validation order/coverage derives from those keys.
//!
//! # Contract
//!
//! Documents are loosely typed (`serde_json::Value` from user uploads), so
//! every field access is defensive. A malformed-but-parseable document
//! produces a [`SchemaViolations`] value carrying a non-empty ordered list of
//! human-readable, path-prefixed error strings. A non-object root is a
//! precondition violation and panics; callers classify documents before
//! validating.

#![warn(unreachable_pub)]

mod registry;
mod rules;
mod sink;

pub use registry::{SchemaDefinition, SchemaError, SchemaRegistry, SchemaViolations};
pub use rules::Requirements;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
