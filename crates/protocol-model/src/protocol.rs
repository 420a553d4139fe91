//! Typed model of the current schema version
//!
//! [`Protocol`] decodes a document that has already been migrated to
//! [`crate::CURRENT_VERSION`] and structurally validated. The model is
//! tolerant by construction: stage-type-specific configuration that this
//! toolkit does not interpret is preserved verbatim through flattened maps,
//! never dropped.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codebook::{AssetDefinition, Codebook};
use crate::filter::{Filter, SkipLogic};

/// A complete interview protocol at the current schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    /// Protocol title shown to researchers and participants.
    pub name: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared schema version; always [`crate::CURRENT_VERSION`] after a
    /// successful upgrade.
    pub schema_version: u32,
    /// Last authoring change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Ordered interview screens.
    pub stages: Vec<Stage>,
    /// The variable/type registry.
    #[serde(default)]
    pub codebook: Codebook,
    /// External assets keyed by asset id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_manifest: Option<IndexMap<String, AssetDefinition>>,
}

impl Protocol {
    /// Decode a migrated, validated document.
    ///
    /// # Errors
    /// Returns the underlying serde error when the document does not match
    /// the current version's shape. Structural validation should have run
    /// first; a failure here after validation passed indicates a defect in
    /// the validator or this model, not in the document.
    pub fn from_document(document: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(document)
    }
}

/// One interview screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Stable stage identifier.
    pub id: String,
    /// Interaction pattern of the screen.
    #[serde(rename = "type")]
    pub stage_type: StageType,
    /// Menu label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether and when the stage is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_logic: Option<SkipLogic>,
    /// Network filter applied before the stage runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// Prompts shown within the stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<Prompt>,
    /// Stage-type-specific configuration (panels, form fields, layouts, …)
    /// preserved without interpretation.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

/// Interaction patterns a stage may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageType {
    NameGenerator,
    NameGeneratorQuickAdd,
    NameGeneratorRoster,
    Sociogram,
    DyadCensus,
    TieStrengthCensus,
    FamilyTreeCensus,
    OrdinalBin,
    CategoricalBin,
    Narrative,
    Information,
    EgoForm,
    AlterForm,
    AlterEdgeForm,
    /// Stage types this toolkit does not model.
    #[serde(other)]
    Other,
}

/// One prompt inside a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Stable prompt identifier.
    pub id: String,
    /// Prompt text shown to the participant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Codebook variable the prompt writes, for binning/form prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Prompt-specific configuration preserved without interpretation.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn current_document() -> Value {
        json!({
            "name": "Friendship study",
            "description": "Pilot wave",
            "schemaVersion": 8,
            "lastModified": "2024-03-01T12:00:00Z",
            "stages": [
                {
                    "id": "st-1",
                    "type": "NameGenerator",
                    "label": "Who do you know?",
                    "subject": { "entity": "node", "type": "person" },
                    "prompts": [
                        { "id": "p-1", "text": "Name people you trust." }
                    ]
                },
                {
                    "id": "st-2",
                    "type": "Sociogram",
                    "skipLogic": {
                        "action": "SKIP",
                        "filter": {
                            "join": "OR",
                            "rules": [
                                {
                                    "id": "r-1",
                                    "type": "alter",
                                    "options": { "operator": "NOT_EXISTS", "attribute": "1f3-aa" }
                                }
                            ]
                        }
                    }
                }
            ],
            "codebook": {
                "node": {
                    "person": {
                        "name": "Person",
                        "variables": {
                            "1f3-aa": { "name": "age", "type": "number" }
                        }
                    }
                }
            },
            "assetManifest": {
                "roster-1": { "id": "roster-1", "type": "network", "source": "roster.csv" }
            }
        })
    }

    #[test]
    fn decodes_current_document() {
        let protocol = Protocol::from_document(current_document()).unwrap();
        assert_eq!(protocol.schema_version, 8);
        assert_eq!(protocol.stages.len(), 2);
        assert_eq!(protocol.stages[0].stage_type, StageType::NameGenerator);
        assert!(protocol.stages[1].skip_logic.is_some());
        assert!(protocol.codebook.node.contains_key("person"));
        let manifest = protocol.asset_manifest.as_ref().unwrap();
        assert_eq!(manifest["roster-1"].asset_type, "network");
    }

    #[test]
    fn unmodelled_stage_config_round_trips() {
        let protocol = Protocol::from_document(current_document()).unwrap();
        let subject = protocol.stages[0].config.get("subject").unwrap();
        assert_eq!(subject, &json!({ "entity": "node", "type": "person" }));

        let wire = serde_json::to_value(&protocol).unwrap();
        assert_eq!(
            wire["stages"][0]["subject"],
            json!({ "entity": "node", "type": "person" })
        );
    }

    #[test]
    fn unknown_stage_type_falls_back() {
        let stage: Stage = serde_json::from_value(json!({
            "id": "st-9",
            "type": "HolographicCensus"
        }))
        .unwrap();
        assert_eq!(stage.stage_type, StageType::Other);
    }

    #[test]
    fn missing_stage_id_is_a_decode_error() {
        let result = Protocol::from_document(json!({
            "name": "x",
            "schemaVersion": 8,
            "stages": [ { "type": "Information" } ],
            "codebook": {}
        }));
        assert!(result.is_err());
    }
}
