//! Version 2: the variable registry becomes the codebook

use serde_json::{Map, Value};

use crate::step::{MigrationStep, StepError};

/// Renames the top-level `variableRegistry` mapping to `codebook`, creating
/// an empty codebook when the document had neither.
///
/// Version 2 also starts requiring a document `name`; that is a validation
/// concern - a nameless document fails the version-2 checkpoint with a
/// message the importing user can act on, rather than being given an
/// invented name here.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameVariableRegistry;

impl MigrationStep for RenameVariableRegistry {
    fn target(&self) -> u32 {
        2
    }

    fn notes(&self) -> &str {
        "'variableRegistry' was renamed 'codebook'"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        let root = document.as_object_mut().ok_or(StepError::NotAnObject)?;

        if let Some(registry) = root.remove("variableRegistry") {
            // An existing 'codebook' key on a version-1 document would be
            // authoring debris; the registry is the authoritative source.
            root.insert("codebook".to_string(), registry);
        } else if !root.contains_key("codebook") {
            root.insert("codebook".to_string(), Value::Object(Map::new()));
        }

        Ok(document)
    }
}
