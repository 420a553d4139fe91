//! Interview Protocol Document Model
//!
//! Version identifiers and document types for interview protocols.
//!
//! # Core Concepts
//!
//! - [`VersionId`]: Schema version as declared by a document - an integer or
//!   the legacy `"1.0.0"` sentinel
//! - [`Protocol`]: Typed model of the current schema version's shape
//! - [`Codebook`]: The variable/type registry for node, edge, and ego entities
//! - [`value`]: Defensive accessors over loosely-typed (`serde_json::Value`)
//!   documents, used by migration steps and validators
//!
//! Historical document shapes (versions older than [`CURRENT_VERSION`]) are
//! deliberately not modelled as types: migration operates on raw JSON values
//! and only the final, validated document is decoded into [`Protocol`].

#![warn(unreachable_pub)]

mod codebook;
mod filter;
mod protocol;
mod version;

pub mod value;

pub use codebook::{
    AssetDefinition, Codebook, EntityTypeDefinition, OptionDefinition, VariableDefinition,
    VariableType,
};
pub use filter::{Filter, FilterRule, Join, RuleEntity, RuleOperator, RuleOptions, SkipAction, SkipLogic};
pub use protocol::{Prompt, Protocol, Stage, StageType};
pub use version::{VersionError, VersionId, CURRENT_VERSION, LEGACY_SENTINEL, OLDEST_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
