//! Step registry keyed by produced version

use std::collections::BTreeMap;

use protocol_model::{CURRENT_VERSION, OLDEST_VERSION};

use crate::step::MigrationStep;
use crate::steps;

/// Registry of migration steps keyed by the version each step produces.
///
/// The `BTreeMap` keys define migration order - registration order is
/// irrelevant, and there is nothing to keep sorted by hand. Version
/// [`OLDEST_VERSION`] is the implicit base of the chain: it has no step
/// because nothing migrates *to* it.
pub struct StepRegistry {
    steps: BTreeMap<u32, Box<dyn MigrationStep>>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("targets", &self.targets())
            .finish()
    }
}

impl StepRegistry {
    /// Create an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: BTreeMap::new(),
        }
    }

    /// Registry with the built-in steps for every supported transition.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(steps::RenameVariableRegistry);
        registry.register(steps::IntroduceAssetManifest);
        registry.register(steps::FilterExpressionTrees);
        registry.register(steps::ObjectOptions);
        registry.register(steps::PromptIdentifiers);
        registry.register(steps::RetireDisplayVariable);
        registry.register(steps::StageIdentifiers);
        registry
    }

    /// Register a step under the version it produces, replacing any
    /// existing step for that version.
    pub fn register<S: MigrationStep + 'static>(&mut self, step: S) {
        self.steps.insert(step.target(), Box::new(step));
    }

    /// The step producing `version`, if registered.
    #[inline]
    #[must_use]
    pub fn get(&self, version: u32) -> Option<&dyn MigrationStep> {
        self.steps.get(&version).map(AsRef::as_ref)
    }

    /// Whether a step producing `version` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, version: u32) -> bool {
        self.steps.contains_key(&version)
    }

    /// Whether `rank` is a version the chain knows about - the implicit
    /// base or any step target.
    #[inline]
    #[must_use]
    pub fn is_known_rank(&self, rank: u32) -> bool {
        rank == OLDEST_VERSION || self.steps.contains_key(&rank)
    }

    /// Produced versions in ascending order.
    #[must_use]
    pub fn targets(&self) -> Vec<u32> {
        self.steps.keys().copied().collect()
    }

    /// Number of registered steps.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepError;
    use serde_json::Value;

    #[test]
    fn defaults_cover_every_transition() {
        let registry = StepRegistry::with_defaults();
        assert_eq!(
            registry.targets(),
            ((OLDEST_VERSION + 1)..=CURRENT_VERSION).collect::<Vec<_>>()
        );
        assert_eq!(registry.len(), (CURRENT_VERSION - OLDEST_VERSION) as usize);
    }

    #[test]
    fn base_version_is_known_but_has_no_step() {
        let registry = StepRegistry::with_defaults();
        assert!(registry.is_known_rank(OLDEST_VERSION));
        assert!(!registry.contains(OLDEST_VERSION));
        assert!(registry.is_known_rank(CURRENT_VERSION));
        assert!(!registry.is_known_rank(CURRENT_VERSION + 1));
        assert!(!registry.is_known_rank(0));
    }

    #[test]
    fn registration_order_does_not_matter() {
        struct Noop(u32);
        impl MigrationStep for Noop {
            fn target(&self) -> u32 {
                self.0
            }
            fn notes(&self) -> &str {
                "noop"
            }
            fn apply(&self, document: Value) -> Result<Value, StepError> {
                Ok(document)
            }
        }

        let mut registry = StepRegistry::new();
        registry.register(Noop(4));
        registry.register(Noop(2));
        registry.register(Noop(3));
        assert_eq!(registry.targets(), vec![2, 3, 4]);
    }

    #[test]
    fn notes_are_informational() {
        let registry = StepRegistry::with_defaults();
        for version in registry.targets() {
            let step = registry.get(version).unwrap();
            assert!(!step.notes().is_empty(), "step {version} has empty notes");
        }
    }
}
