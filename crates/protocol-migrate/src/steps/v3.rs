//! Version 3: asset manifest and named variables

use serde_json::{Map, Value};

use protocol_model::value;

use crate::step::{MigrationStep, StepError};

/// Turns the `externalData` mapping (asset id → `{ url }`) into the
/// `assetManifest` (asset id → `{ id, type, source }`) and renames the
/// variable display field `label` to `name`.
///
/// Historical `externalData` entries were all network rosters, so migrated
/// assets are tagged `"network"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntroduceAssetManifest;

impl MigrationStep for IntroduceAssetManifest {
    fn target(&self) -> u32 {
        3
    }

    fn notes(&self) -> &str {
        "'externalData' became the 'assetManifest'; variables gained an export 'name'"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        {
            let root = document.as_object_mut().ok_or(StepError::NotAnObject)?;
            match root.remove("externalData") {
                Some(Value::Object(entries)) => {
                    let manifest = build_manifest(entries);
                    root.insert("assetManifest".to_string(), Value::Object(manifest));
                }
                // Malformed external data stays put for the version-3
                // checkpoint to report.
                Some(other) => {
                    root.insert("externalData".to_string(), other);
                }
                None => {}
            }
        }

        value::for_each_variable_definition_mut(&mut document, |variable| {
            if !variable.contains_key("name") {
                if let Some(label) = variable.remove("label") {
                    variable.insert("name".to_string(), label);
                }
            }
        });

        Ok(document)
    }
}

fn build_manifest(entries: Map<String, Value>) -> Map<String, Value> {
    let mut manifest = Map::new();
    for (id, entry) in entries {
        let source = entry
            .as_object()
            .and_then(|entry| entry.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut asset = Map::new();
        asset.insert("id".to_string(), Value::String(id.clone()));
        asset.insert("type".to_string(), Value::String("network".to_string()));
        asset.insert("source".to_string(), Value::String(source));
        manifest.insert(id, Value::Object(asset));
    }
    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn external_data_becomes_asset_manifest() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "NameGenerator" } ],
            "codebook": {},
            "externalData": {
                "roster-1": { "url": "roster.csv" }
            }
        });

        let migrated = IntroduceAssetManifest.apply(document).unwrap();
        assert!(migrated.get("externalData").is_none());
        assert_eq!(
            migrated["assetManifest"],
            json!({
                "roster-1": { "id": "roster-1", "type": "network", "source": "roster.csv" }
            })
        );
    }

    #[test]
    fn variable_labels_become_names() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "NameGenerator" } ],
            "codebook": {
                "node": {
                    "person": {
                        "variables": {
                            "1f3-aa": { "label": "age", "type": "number" },
                            "2b4-bb": { "name": "already-named", "label": "stale", "type": "text" }
                        }
                    }
                },
                "ego": {
                    "variables": {
                        "3c5-cc": { "label": "mood", "type": "text" }
                    }
                }
            }
        });

        let migrated = IntroduceAssetManifest.apply(document).unwrap();
        let person = &migrated["codebook"]["node"]["person"]["variables"];
        assert_eq!(person["1f3-aa"]["name"], json!("age"));
        assert!(person["1f3-aa"].get("label").is_none());
        // An explicit name wins over a lingering label.
        assert_eq!(person["2b4-bb"]["name"], json!("already-named"));
        assert_eq!(migrated["codebook"]["ego"]["variables"]["3c5-cc"]["name"], json!("mood"));
    }

    #[test]
    fn malformed_external_data_is_left_for_validation() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "NameGenerator" } ],
            "codebook": {},
            "externalData": "not-a-mapping"
        });

        let migrated = IntroduceAssetManifest.apply(document).unwrap();
        assert_eq!(migrated["externalData"], json!("not-a-mapping"));
        assert!(migrated.get("assetManifest").is_none());
    }

    #[test]
    fn entry_without_url_gets_empty_source() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "NameGenerator" } ],
            "codebook": {},
            "externalData": { "broken": {} }
        });

        let migrated = IntroduceAssetManifest.apply(document).unwrap();
        assert_eq!(migrated["assetManifest"]["broken"]["source"], json!(""));
    }

    #[test]
    fn preserves_unrelated_fields() {
        let document = json!({
            "name": "study",
            "stages": [ { "type": "Sociogram", "background": { "concentricCircles": 3 } } ],
            "codebook": { "node": { "person": { "color": "node-color-seq-1" } } }
        });

        let migrated = IntroduceAssetManifest.apply(document.clone()).unwrap();
        assert_eq!(migrated["stages"], document["stages"]);
        assert_eq!(
            migrated["codebook"]["node"]["person"]["color"],
            document["codebook"]["node"]["person"]["color"]
        );
    }
}
