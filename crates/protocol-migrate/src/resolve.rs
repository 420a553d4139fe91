//! Migration path resolution

use protocol_model::VersionId;

use crate::registry::StepRegistry;
use crate::step::MigrationStep;

/// The ordered steps taking a document from one version to another.
///
/// Borrowed from the registry that resolved it; the path is a plan, not an
/// owner.
pub struct MigrationPath<'r> {
    source: VersionId,
    target: VersionId,
    steps: Vec<&'r dyn MigrationStep>,
}

impl std::fmt::Debug for MigrationPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationPath")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("steps", &self.step_targets())
            .finish()
    }
}

impl<'r> MigrationPath<'r> {
    /// The version the document starts at.
    #[inline]
    #[must_use]
    pub fn source(&self) -> VersionId {
        self.source
    }

    /// The version the document ends at.
    #[inline]
    #[must_use]
    pub fn target(&self) -> VersionId {
        self.target
    }

    /// Steps in application order.
    pub fn iter(&self) -> impl Iterator<Item = &'r dyn MigrationStep> + '_ {
        self.steps.iter().copied()
    }

    /// Produced versions in application order.
    #[must_use]
    pub fn step_targets(&self) -> Vec<u32> {
        self.steps.iter().map(|step| step.target()).collect()
    }

    /// Number of steps.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the document is already at the target version.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Why no migration path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A version outside the registry's chain was requested.
    #[error("unknown schema version {0}")]
    UnknownVersion(VersionId),

    /// Downgrades are not supported.
    #[error("no migration path from version {from} down to {target}")]
    Downgrade {
        /// Declared document version.
        from: VersionId,
        /// Requested target version.
        target: VersionId,
    },

    /// The registry has a hole in the chain between source and target.
    #[error("no registered step produces version {0}")]
    Gap(u32),
}

/// Compute the ordered steps from `source` up to `target`.
///
/// Every step whose produced version lies in `(source, target]` is returned
/// in strictly ascending version order - derived from the registry's keys,
/// so a registry hole surfaces as [`ResolveError::Gap`] instead of a path
/// that silently skips a version. Equal source and target resolve to the
/// empty path.
///
/// # Errors
/// - [`ResolveError::UnknownVersion`] when either end is outside the chain
/// - [`ResolveError::Downgrade`] when `source` is newer than `target`
/// - [`ResolveError::Gap`] when an intermediate step is missing
pub fn resolve<'r>(
    registry: &'r StepRegistry,
    source: VersionId,
    target: VersionId,
) -> Result<MigrationPath<'r>, ResolveError> {
    if !registry.is_known_rank(source.rank()) {
        return Err(ResolveError::UnknownVersion(source));
    }
    if !registry.is_known_rank(target.rank()) {
        return Err(ResolveError::UnknownVersion(target));
    }
    if source.rank() > target.rank() {
        return Err(ResolveError::Downgrade { from: source, target });
    }

    let mut steps = Vec::new();
    for version in (source.rank() + 1)..=target.rank() {
        let step = registry.get(version).ok_or(ResolveError::Gap(version))?;
        steps.push(step);
    }

    Ok(MigrationPath {
        source,
        target,
        steps,
    })
}

/// Cheap probe: can a document at `source` be upgraded to `target`?
///
/// Attempts resolution and discards the path - the single source of truth
/// for upgradability, used to disable upgrade affordances in advance.
#[must_use]
pub fn can_upgrade(registry: &StepRegistry, source: VersionId, target: VersionId) -> bool {
    resolve(registry, source, target).is_ok()
}
