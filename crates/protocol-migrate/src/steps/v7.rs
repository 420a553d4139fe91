//! Version 7: display variables retired

use serde_json::Value;

use protocol_model::value;

use crate::step::{MigrationStep, StepError};

/// Removes the entity-level `displayVariable` field. The variable it pointed
/// at stays in the codebook; interview surfaces now derive display names
/// from variable metadata instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetireDisplayVariable;

impl MigrationStep for RetireDisplayVariable {
    fn target(&self) -> u32 {
        7
    }

    fn notes(&self) -> &str {
        "entity-level 'displayVariable' was retired"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        if !document.is_object() {
            return Err(StepError::NotAnObject);
        }

        value::for_each_entity_definition_mut(&mut document, |entity| {
            entity.remove("displayVariable");
        });

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn display_variable_is_removed_everywhere() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "Information" } ],
            "codebook": {
                "node": { "person": { "displayVariable": "1f3-aa", "variables": { "1f3-aa": { "name": "nickname", "type": "text" } } } },
                "edge": { "friend": { "displayVariable": "2b4-bb" } },
                "ego": { "displayVariable": "3c5-cc" }
            }
        });

        let migrated = RetireDisplayVariable.apply(document).unwrap();
        assert!(migrated["codebook"]["node"]["person"].get("displayVariable").is_none());
        assert!(migrated["codebook"]["edge"]["friend"].get("displayVariable").is_none());
        assert!(migrated["codebook"]["ego"].get("displayVariable").is_none());
        // The referenced variable itself survives.
        assert_eq!(
            migrated["codebook"]["node"]["person"]["variables"]["1f3-aa"]["name"],
            json!("nickname")
        );
    }

    #[test]
    fn documents_without_display_variables_are_unchanged() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "Information" } ],
            "codebook": { "node": { "person": {} } }
        });
        let migrated = RetireDisplayVariable.apply(document.clone()).unwrap();
        assert_eq!(migrated, document);
    }
}
