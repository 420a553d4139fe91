//! The upgrade engine

use serde_json::Value;

use protocol_lint::{lint, LintFinding, Severity};
use protocol_migrate::{can_upgrade, resolve, MigrateError, MigrationRunner, ResolveError, StepRegistry};
use protocol_model::{Protocol, VersionError, VersionId, CURRENT_VERSION};

/// Upgrades uploaded protocol documents to the current schema version.
///
/// Construct once per configuration and share freely - the registries are
/// immutable after construction and every call owns its own document.
#[derive(Debug)]
pub struct ProtocolEngine {
    steps: StepRegistry,
    runner: MigrationRunner,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    /// Engine with the built-in step and schema registries, validating
    /// after every step.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(StepRegistry::with_defaults(), MigrationRunner::new())
    }

    /// Engine with explicitly constructed parts.
    ///
    /// The caller owns the registries' lifecycle; the engine adds nothing
    /// ambient.
    #[must_use]
    pub fn with_parts(steps: StepRegistry, runner: MigrationRunner) -> Self {
        Self { steps, runner }
    }

    /// The version every upgrade targets.
    #[inline]
    #[must_use]
    pub fn target(&self) -> VersionId {
        VersionId::Numbered(CURRENT_VERSION)
    }

    /// Cheap probe: would [`ProtocolEngine::upgrade`] find a migration path
    /// for this document?
    ///
    /// Reads only the declared `schemaVersion` and attempts path resolution
    /// - no migration work is done. A document with a missing or malformed
    /// version declaration is not upgradable.
    #[must_use]
    pub fn can_upgrade(&self, document: &Value) -> bool {
        VersionId::from_document(document)
            .is_ok_and(|source| can_upgrade(&self.steps, source, self.target()))
    }

    /// Upgrade a document to the current schema version.
    ///
    /// Classifies the declared version, resolves the step chain, runs it
    /// with schema checkpoints, lints the result, and decodes the typed
    /// model. Lint findings do not fail the upgrade - they ride along in
    /// the report for the importing user to act on.
    ///
    /// # Errors
    /// - [`UpgradeError::Version`]: missing/malformed `schemaVersion`
    /// - [`UpgradeError::UnknownVersion`]: a version outside the registry
    /// - [`UpgradeError::NoPath`]: downgrade or unbridgeable gap
    /// - [`UpgradeError::Migration`]: a step or checkpoint failed; carries
    ///   the offending version and the validator's messages verbatim
    /// - [`UpgradeError::Decode`]: the migrated, validated document did not
    ///   fit the typed model - a defect in this toolkit, not the document
    pub fn upgrade(&self, document: Value) -> Result<Upgraded, UpgradeError> {
        let source = VersionId::from_document(&document)?;
        let path = resolve(&self.steps, source, self.target())?;
        tracing::debug!(%source, steps = path.len(), "resolved migration path");

        let report = self.runner.run(document, &path)?;

        let findings = lint(&report.document);
        if !findings.is_empty() {
            tracing::warn!(count = findings.len(), "lint findings on migrated document");
        }

        let protocol = Protocol::from_document(report.document.clone())?;

        Ok(Upgraded {
            document: report.document,
            protocol,
            applied: report.applied,
            findings,
        })
    }
}

/// A successful upgrade.
#[derive(Debug, Clone, PartialEq)]
pub struct Upgraded {
    /// The migrated document, as persisted.
    pub document: Value,
    /// The typed view of the same document.
    pub protocol: Protocol,
    /// Produced versions of the applied steps, in order. Empty when the
    /// document was already current.
    pub applied: Vec<u32>,
    /// Lint findings, charset errors first. Surface these prominently to
    /// the importing user.
    pub findings: Vec<LintFinding>,
}

impl Upgraded {
    /// Whether the lints found nothing at all.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Error-severity findings (name charset violations).
    pub fn errors(&self) -> impl Iterator<Item = &LintFinding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
    }

    /// Warning-severity findings (unresolved references).
    pub fn warnings(&self) -> impl Iterator<Item = &LintFinding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }
}

/// Why an upgrade was refused. Never partial: the document either upgrades
/// completely or the caller gets one of these.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    /// The document's `schemaVersion` is missing or malformed.
    #[error("cannot read document version: {0}")]
    Version(#[from] VersionError),

    /// The declared version is outside the known set. Fatal - nothing was
    /// attempted.
    #[error("unknown schema version {0}")]
    UnknownVersion(VersionId),

    /// No path to the current version (downgrade or registry gap).
    #[error("cannot upgrade: {0}")]
    NoPath(ResolveError),

    /// Migration ran and aborted; carries the offending step/version.
    #[error(transparent)]
    Migration(#[from] MigrateError),

    /// The migrated document did not decode into the typed model.
    #[error("migrated document failed to decode into the typed model: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ResolveError> for UpgradeError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::UnknownVersion(version) => Self::UnknownVersion(version),
            other => Self::NoPath(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn probe_accepts_every_known_version() {
        let engine = ProtocolEngine::new();
        for version in 1..=CURRENT_VERSION {
            let document = json!({ "schemaVersion": version });
            assert!(engine.can_upgrade(&document), "version {version} should probe true");
        }
        assert!(engine.can_upgrade(&json!({ "schemaVersion": "1.0.0" })));
    }

    #[test]
    fn probe_rejects_unknown_missing_and_malformed() {
        let engine = ProtocolEngine::new();
        assert!(!engine.can_upgrade(&json!({ "schemaVersion": 99 })));
        assert!(!engine.can_upgrade(&json!({ "schemaVersion": CURRENT_VERSION + 1 })));
        assert!(!engine.can_upgrade(&json!({ "name": "no version" })));
        assert!(!engine.can_upgrade(&json!({ "schemaVersion": "2.0.0" })));
    }

    #[test]
    fn missing_version_is_a_version_error() {
        let engine = ProtocolEngine::new();
        let error = engine.upgrade(json!({ "name": "no version" })).unwrap_err();
        assert!(matches!(
            error,
            UpgradeError::Version(VersionError::Missing)
        ));
    }

    #[test]
    fn unknown_version_is_fatal_before_any_step() {
        let engine = ProtocolEngine::new();
        let error = engine
            .upgrade(json!({ "schemaVersion": 99, "stages": [] }))
            .unwrap_err();
        assert!(matches!(
            error,
            UpgradeError::UnknownVersion(VersionId::Numbered(99))
        ));
    }
}
