//! Protocol Upgrade Engine
//!
//! The trusted boundary between uploaded protocol documents and the rest of
//! the application: classify the declared version, migrate to the current
//! schema, validate at every boundary, lint, and hand back a typed document.
//!
//! # Architecture
//!
//! ```text
//! Value ──▶ VersionId ──▶ resolve ──▶ MigrationRunner ──▶ lint ──▶ Protocol
//!              │             │              │                │
//!           classify    StepRegistry   SchemaRegistry   LintFinding[]
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use protocol_engine::ProtocolEngine;
//!
//! let engine = ProtocolEngine::new();
//! let upgraded = engine.upgrade(document)?;
//! println!("applied steps: {:?}", upgraded.applied);
//! for finding in &upgraded.findings {
//!     println!("{finding}");
//! }
//! ```
//!
//! The engine is synchronous and owns no shared state: construct one per
//! configuration and call it from as many threads as you like.

#![warn(unreachable_pub)]

mod engine;

pub use engine::{ProtocolEngine, UpgradeError, Upgraded};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the upgrade engine
    pub use crate::engine::{ProtocolEngine, UpgradeError, Upgraded};
    pub use protocol_lint::{LintFinding, Severity};
    pub use protocol_migrate::{MigrateError, MigrationRunner, ResolveError, StepRegistry, Strictness};
    pub use protocol_model::{Protocol, VersionId, CURRENT_VERSION};
    pub use protocol_schema::SchemaRegistry;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
