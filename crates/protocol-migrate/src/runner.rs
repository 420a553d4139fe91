//! The migration runner
//!
//! Applies a resolved path strictly sequentially - each step's output is the
//! next step's input, and steps are not commutative, so there is nothing to
//! parallelize. After each step the document's `schemaVersion` is re-tagged
//! to the produced version and, per the configured [`Strictness`], checked
//! against that version's schema before the next step runs.

use serde_json::Value;

use protocol_schema::{SchemaError, SchemaRegistry, SchemaViolations};

use crate::resolve::MigrationPath;
use crate::step::StepError;

/// How aggressively the runner validates intermediate documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Validate after every step. A corrupt intermediate document aborts
    /// the run at the step that produced it.
    #[default]
    EveryStep,
    /// Validate only the final document. Cheaper; a mid-chain defect is
    /// attributed to the last step instead of the one that introduced it.
    FinalOnly,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// The migrated document, tagged with the target version.
    pub document: Value,
    /// Produced versions of the applied steps, in application order. Empty
    /// when the document was already at the target version.
    pub applied: Vec<u32>,
}

/// A run aborted - no partial document is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MigrateError {
    /// A step could not transform the document.
    #[error("migration step to version {version} failed: {source}")]
    StepFailed {
        /// The version the failing step produces.
        version: u32,
        /// What the step reported.
        #[source]
        source: StepError,
    },

    /// A migrated document failed its schema checkpoint.
    #[error("document failed validation after migrating to version {version}")]
    CheckpointFailed {
        /// The version whose schema rejected the document.
        version: u32,
        /// The validator's full report.
        violations: SchemaViolations,
    },

    /// The schema registry cannot check a version the path produces.
    #[error("no schema registered for checkpoint version {0}")]
    MissingSchema(u32),

    /// The document root stopped being an object mid-run.
    #[error("document root must be an object")]
    NotAnObject,
}

/// Applies migration paths with schema checkpoints.
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    schemas: SchemaRegistry,
    strictness: Strictness,
}

impl Default for MigrationRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationRunner {
    /// Runner with the default schema registry, validating every step.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(SchemaRegistry::with_defaults(), Strictness::default())
    }

    /// Runner with explicit parts.
    #[must_use]
    pub fn with_parts(schemas: SchemaRegistry, strictness: Strictness) -> Self {
        Self {
            schemas,
            strictness,
        }
    }

    /// The configured strictness.
    #[inline]
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// The schema registry used for checkpoints.
    #[inline]
    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Apply `path` to `document`.
    ///
    /// The final document is always validated against the path's target
    /// version before being reported - including for the empty path, so an
    /// already-current document still gets checked.
    ///
    /// # Errors
    /// Aborts on the first step failure or checkpoint violation, reporting
    /// the produced version at which the run stopped. The input document is
    /// consumed either way; migration never yields partial output.
    pub fn run(
        &self,
        document: Value,
        path: &MigrationPath<'_>,
    ) -> Result<MigrationReport, MigrateError> {
        let mut document = document;
        let mut applied = Vec::with_capacity(path.len());

        for step in path.iter() {
            let version = step.target();
            tracing::debug!(version, notes = step.notes(), "applying migration step");

            document = step
                .apply(document)
                .map_err(|source| MigrateError::StepFailed { version, source })?;
            retag(&mut document, version)?;
            applied.push(version);

            if self.strictness == Strictness::EveryStep {
                self.checkpoint(version, &document)?;
            }
        }

        // Under EveryStep the last iteration already validated the final
        // document; the empty path and FinalOnly mode still owe one check.
        if path.is_empty() || self.strictness == Strictness::FinalOnly {
            self.checkpoint(path.target().rank(), &document)?;
        }

        Ok(MigrationReport { document, applied })
    }

    fn checkpoint(&self, version: u32, document: &Value) -> Result<(), MigrateError> {
        self.schemas
            .validate(version, document)
            .map_err(|error| match error {
                SchemaError::Unregistered(version) => MigrateError::MissingSchema(version),
                SchemaError::Violations(violations) => MigrateError::CheckpointFailed {
                    version,
                    violations,
                },
            })
    }
}

fn retag(document: &mut Value, version: u32) -> Result<(), MigrateError> {
    let root = document.as_object_mut().ok_or(MigrateError::NotAnObject)?;
    root.insert("schemaVersion".to_string(), Value::from(version));
    Ok(())
}
