//! Version 8: stage identifiers

use serde_json::Value;
use uuid::Uuid;

use protocol_model::value;

use crate::step::{MigrationStep, StepError};

/// Gives every stage a stable `id`, generated where missing. Interview
/// sessions and resume bookmarks reference stages by id from this version on.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageIdentifiers;

impl MigrationStep for StageIdentifiers {
    fn target(&self) -> u32 {
        8
    }

    fn notes(&self) -> &str {
        "stages gained stable ids"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        if !document.is_object() {
            return Err(StepError::NotAnObject);
        }

        value::for_each_stage_mut(&mut document, |stage| {
            let has_id = stage
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.is_empty());
            if !has_id {
                stage.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
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
    fn missing_ids_are_generated_existing_ids_kept() {
        let document = json!({
            "name": "study",
            "stages": [
                { "type": "NameGenerator" },
                { "id": "st-kept", "type": "Sociogram" },
                { "id": "", "type": "Information" }
            ],
            "codebook": {}
        });

        let migrated = StageIdentifiers.apply(document).unwrap();
        let stages = migrated["stages"].as_array().unwrap();
        assert!(stages[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(stages[1]["id"], json!("st-kept"));
        assert!(stages[2]["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn generated_ids_are_unique_per_stage() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "A" }, { "type": "B" } ],
            "codebook": {}
        });
        let migrated = StageIdentifiers.apply(document).unwrap();
        let stages = migrated["stages"].as_array().unwrap();
        assert_ne!(stages[0]["id"], stages[1]["id"]);
    }

    #[test]
    fn stage_config_is_preserved() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "Sociogram", "background": { "concentricCircles": 4 } } ],
            "codebook": {}
        });
        let migrated = StageIdentifiers.apply(document).unwrap();
        assert_eq!(
            migrated["stages"][0]["background"],
            json!({ "concentricCircles": 4 })
        );
    }
}
