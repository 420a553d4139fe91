//! The migration step contract

use serde_json::Value;

/// A pure transformation from one schema version's shape to the next.
///
/// Each step is registered against the version it *produces*: a step with
/// `target() == 5` turns a version-4-shaped document into a version-5-shaped
/// one, and only that - no step may skip a version. Steps must preserve every
/// field outside their delta (structural copy, not destructive rebuild) and
/// may assume the resolver never hands them a document at or past their
/// target version.
pub trait MigrationStep: Send + Sync {
    /// The schema version this step produces.
    fn target(&self) -> u32;

    /// Human-readable description of the transformation. Informational
    /// only - never behavior-affecting.
    fn notes(&self) -> &str;

    /// Transform a document from the previous version's shape.
    ///
    /// # Errors
    /// Returns [`StepError`] when the document cannot be transformed at all
    /// (e.g. a non-object root). Shape complaints about the *result* belong
    /// to the runner's schema checkpoints, not to the step.
    fn apply(&self, document: Value) -> Result<Value, StepError>;
}

/// A step could not transform the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// The document root is not a JSON object.
    #[error("document root must be an object to migrate")]
    NotAnObject,

    /// Step-specific failure.
    #[error("{0}")]
    Failed(String),
}
