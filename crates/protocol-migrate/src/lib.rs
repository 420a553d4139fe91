//! Protocol Schema Migration
//!
//! Upgrades a protocol document from any historical schema version to the
//! current one through an ordered chain of pure transformations.
//!
//! # Architecture
//!
//! ```text
//! Value ──▶ resolve(source, target) ──▶ MigrationPath ──▶ MigrationRunner ──▶ MigrationReport
//!               │                                              │
//!          StepRegistry (version → MigrationStep)         SchemaRegistry (checkpoints)
//! ```
//!
//! Steps are registered against the version they *produce* and are keyed in a
//! [`StepRegistry`] - order derives from the version keys, never from
//! registration order. The runner applies a resolved path strictly
//! sequentially (steps are not commutative), re-tags `schemaVersion` after
//! each step, and validates against the produced version's schema per the
//! configured [`Strictness`].

#![warn(unreachable_pub)]

mod registry;
mod resolve;
mod runner;
mod step;

pub mod steps;

pub use registry::StepRegistry;
pub use resolve::{can_upgrade, resolve, MigrationPath, ResolveError};
pub use runner::{MigrateError, MigrationReport, MigrationRunner, Strictness};
pub use step::{MigrationStep, StepError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
