//! Version 6: prompt identifiers and icon variants

use serde_json::Value;
use uuid::Uuid;

use protocol_model::value;

use crate::step::{MigrationStep, StepError};

/// Gives every prompt a stable `id` (generated where missing) and renames
/// the codebook entity field `iconName` to `iconVariant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptIdentifiers;

impl MigrationStep for PromptIdentifiers {
    fn target(&self) -> u32 {
        6
    }

    fn notes(&self) -> &str {
        "prompts gained stable ids; 'iconName' was renamed 'iconVariant'"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        if !document.is_object() {
            return Err(StepError::NotAnObject);
        }

        value::for_each_stage_mut(&mut document, |stage| {
            let Some(prompts) = stage.get_mut("prompts").and_then(Value::as_array_mut) else {
                return;
            };
            for prompt in prompts {
                let Some(prompt) = prompt.as_object_mut() else {
                    continue;
                };
                let has_id = prompt
                    .get("id")
                    .and_then(Value::as_str)
                    .is_some_and(|id| !id.is_empty());
                if !has_id {
                    prompt.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
                }
            }
        });

        value::for_each_entity_definition_mut(&mut document, |entity| {
            if let Some(icon) = entity.remove("iconName") {
                // A definition carrying both keys keeps the newer one.
                entity.entry("iconVariant".to_string()).or_insert(icon);
            }
        });

        Ok(document)
    }
}
