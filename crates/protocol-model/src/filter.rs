//! Skip logic and filter expression trees
//!
//! A stage may carry `skipLogic` (controlling whether the stage is shown at
//! all) and/or a `filter` (restricting which network entities it operates
//! on). Both share the same boolean expression tree over codebook variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happens when a skip-logic filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkipAction {
    /// Show the stage when the filter matches.
    Show,
    /// Skip the stage when the filter matches.
    Skip,
}

/// Stage-level skip logic: an action gated on a filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipLogic {
    /// Whether a match shows or skips the stage.
    pub action: SkipAction,
    /// The gating expression.
    pub filter: Filter,
}

/// Boolean combinator joining a filter's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Join {
    /// All rules must match.
    And,
    /// Any rule may match.
    Or,
}

/// A boolean filter expression over codebook variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// How the rules combine.
    pub join: Join,
    /// The individual predicates.
    #[serde(default)]
    pub rules: Vec<FilterRule>,
}

/// Which network entity a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEntity {
    /// A named node (an "alter" in interview terms).
    Alter,
    /// The interview subject.
    Ego,
    /// A tie between alters.
    Edge,
}

impl RuleEntity {
    /// The codebook partition holding this entity's variable definitions.
    #[inline]
    #[must_use]
    pub fn codebook_partition(&self) -> &'static str {
        match self {
            Self::Alter => "node",
            Self::Ego => "ego",
            Self::Edge => "edge",
        }
    }
}

/// One predicate inside a filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Stable rule identifier.
    pub id: String,
    /// Entity the rule inspects.
    #[serde(rename = "type")]
    pub entity: RuleEntity,
    /// The comparison itself.
    pub options: RuleOptions,
}

/// The comparison carried by a filter rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOptions {
    /// Entity-type key inside the codebook partition, when the rule is
    /// scoped to one type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Codebook variable id the rule reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Comparison operator.
    pub operator: RuleOperator,
    /// Comparison operand, absent for existence checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Comparison operators available to filter rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleOperator {
    Exists,
    NotExists,
    Exactly,
    Not,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Includes,
    Excludes,
    /// Operators this toolkit does not model; preserved for forward
    /// compatibility, serialized back as the literal `"UNKNOWN"`.
    #[serde(other)]
    Unknown,
}
