//! Schema definitions and the version-keyed registry

use std::collections::BTreeMap;

use serde_json::Value;

use protocol_model::{CURRENT_VERSION, OLDEST_VERSION};

use crate::rules::{check_document, Requirements};
use crate::sink::ErrorSink;

/// The structural validator for one schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDefinition {
    version: u32,
    requires: Requirements,
}

impl SchemaDefinition {
    /// Definition for a version, with that version's standard requirements.
    #[inline]
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            requires: Requirements::for_version(version),
        }
    }

    /// Definition with an explicit requirement set, for callers extending
    /// the registry with custom versions.
    #[inline]
    #[must_use]
    pub fn with_requirements(version: u32, requires: Requirements) -> Self {
        Self { version, requires }
    }

    /// The version this definition describes.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The requirement set interpreted by the walker.
    #[inline]
    #[must_use]
    pub fn requirements(&self) -> Requirements {
        self.requires
    }

    /// Check a document against this version's shape.
    ///
    /// # Errors
    /// Returns [`SchemaViolations`] carrying a non-empty, document-ordered
    /// list of human-readable messages when the document does not conform.
    ///
    /// # Panics
    /// Panics if the document root is not a JSON object (precondition
    /// violation - callers parse uploads into objects before validating).
    pub fn validate(&self, document: &Value) -> Result<(), SchemaViolations> {
        let mut sink = ErrorSink::new();
        check_document(document, self.requires, &mut sink);
        if sink.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolations {
                version: self.version,
                errors: sink.into_errors(),
            })
        }
    }
}

/// Structural non-conformance, with every problem found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document does not conform to schema version {version} ({n} problems)", n = .errors.len())]
pub struct SchemaViolations {
    /// The version the document was checked against.
    pub version: u32,
    /// Human-readable, path-prefixed messages in document order. Never empty.
    pub errors: Vec<String>,
}

/// Validation through the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No definition registered for the requested version.
    #[error("no schema registered for version {0}")]
    Unregistered(u32),

    /// The document was checked and does not conform.
    #[error(transparent)]
    Violations(#[from] SchemaViolations),
}

/// Registry of schema definitions keyed by version.
///
/// Keys, not registration order, define which versions exist - iteration is
/// always ascending. Construct explicitly ([`SchemaRegistry::with_defaults`])
/// and pass where needed; there is no ambient singleton.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<u32, SchemaDefinition>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering every supported version,
    /// [`OLDEST_VERSION`]..=[`CURRENT_VERSION`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for version in OLDEST_VERSION..=CURRENT_VERSION {
            registry.register(SchemaDefinition::new(version));
        }
        registry
    }

    /// Register a definition, replacing any existing one for that version.
    pub fn register(&mut self, schema: SchemaDefinition) {
        self.schemas.insert(schema.version(), schema);
    }

    /// Definition for a version, if registered.
    #[inline]
    #[must_use]
    pub fn get(&self, version: u32) -> Option<&SchemaDefinition> {
        self.schemas.get(&version)
    }

    /// Whether a version is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, version: u32) -> bool {
        self.schemas.contains_key(&version)
    }

    /// Registered versions in ascending order.
    #[must_use]
    pub fn versions(&self) -> Vec<u32> {
        self.schemas.keys().copied().collect()
    }

    /// Number of registered versions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate a document against a registered version.
    ///
    /// # Errors
    /// - [`SchemaError::Unregistered`] when the version has no definition
    /// - [`SchemaError::Violations`] when the document does not conform
    ///
    /// # Panics
    /// Panics if the document root is not a JSON object, as
    /// [`SchemaDefinition::validate`] does.
    pub fn validate(&self, version: u32, document: &Value) -> Result<(), SchemaError> {
        let schema = self
            .get(version)
            .ok_or(SchemaError::Unregistered(version))?;
        schema.validate(document)?;
        Ok(())
    }
}
