//! Codebook: the variable/type registry
//!
//! The codebook defines what attributes nodes, edges, and ego may carry.
//! Partition maps preserve authoring order (`IndexMap`) so that re-serialized
//! documents diff cleanly against their source.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The variable/type registry of a protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    /// Node types keyed by entity-type id.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub node: IndexMap<String, EntityTypeDefinition>,
    /// Edge types keyed by entity-type id.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub edge: IndexMap<String, EntityTypeDefinition>,
    /// The single ego definition, when the protocol collects ego data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ego: Option<EntityTypeDefinition>,
}

/// One entity type (a node type, edge type, or ego).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeDefinition {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display color token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Icon variant shown in interview screens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_variant: Option<String>,
    /// Variable definitions keyed by variable UUID.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, VariableDefinition>,
}

/// One variable an entity may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    /// Export name of the variable.
    pub name: String,
    /// Value domain.
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    /// Validation rules, kept loosely typed - their shape varies per
    /// variable type and interview surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Value>,
    /// Option list for categorical/ordinal variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionDefinition>>,
}

/// Value domains a variable may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// True/false.
    Boolean,
    /// Ordered option set.
    Ordinal,
    /// Unordered option set.
    Categorical,
    /// Continuous slider value.
    Scalar,
    /// Date or datetime.
    Datetime,
    /// Sociogram layout coordinates.
    Layout,
    /// Geospatial coordinates.
    Location,
    /// Types this toolkit does not model.
    #[serde(other)]
    Other,
}

/// One selectable option of a categorical/ordinal variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDefinition {
    /// Label shown to the participant.
    pub label: String,
    /// Recorded value.
    pub value: Value,
}

/// One entry of the asset manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDefinition {
    /// Asset id, also the manifest key.
    pub id: String,
    /// Asset kind (e.g. `network`, `image`, `video`).
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Where the asset content lives.
    pub source: String,
}
