//! Version 5: option lists become labelled objects

use serde_json::{Map, Value};

use protocol_model::value;

use crate::step::{MigrationStep, StepError};

/// Wraps scalar entries of variable `options` arrays into
/// `{ label, value }` objects. Entries that are already objects pass through
/// untouched, so re-running the delta on mixed authoring output is safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectOptions;

impl MigrationStep for ObjectOptions {
    fn target(&self) -> u32 {
        5
    }

    fn notes(&self) -> &str {
        "scalar option lists became {label, value} objects"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        if !document.is_object() {
            return Err(StepError::NotAnObject);
        }

        value::for_each_variable_definition_mut(&mut document, |variable| {
            let Some(options) = variable.get_mut("options").and_then(Value::as_array_mut) else {
                return;
            };
            for option in options {
                if option.is_object() {
                    continue;
                }
                let label = match option {
                    Value::String(text) => text.clone(),
                    ref other => other.to_string(),
                };
                let scalar = option.take();

                let mut wrapped = Map::new();
                wrapped.insert("label".to_string(), Value::String(label));
                wrapped.insert("value".to_string(), scalar);
                *option = Value::Object(wrapped);
            }
        });

        Ok(document)
    }
}
