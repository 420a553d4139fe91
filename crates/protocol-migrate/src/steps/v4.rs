//! Version 4: skip logic moves into filter expression trees

use serde_json::{Map, Value};
use uuid::Uuid;

use protocol_model::value;

use crate::step::{MigrationStep, StepError};

/// Rewrites the flat legacy skip-logic shape
/// `{ action, operator, variable, value }` into the expression-tree shape
/// `{ action, filter: { join, rules: [...] } }`, and gives stage-level
/// `filter` fields the same treatment.
///
/// Legacy rules carried no entity scope, so migrated rules default to
/// inspecting alters; researchers re-scope them in the authoring tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterExpressionTrees;

impl MigrationStep for FilterExpressionTrees {
    fn target(&self) -> u32 {
        4
    }

    fn notes(&self) -> &str {
        "flat skip-logic rules moved into filter expression trees"
    }

    fn apply(&self, mut document: Value) -> Result<Value, StepError> {
        if !document.is_object() {
            return Err(StepError::NotAnObject);
        }

        value::for_each_stage_mut(&mut document, |stage| {
            if let Some(skip) = stage.get_mut("skipLogic").and_then(Value::as_object_mut) {
                rewrite_skip_logic(skip);
            }
            if let Some(filter) = stage.get_mut("filter") {
                rewrite_stage_filter(filter);
            }
        });

        Ok(document)
    }
}

fn is_flat(map: &Map<String, Value>) -> bool {
    map.contains_key("operator") || map.contains_key("variable")
}

fn rewrite_skip_logic(skip: &mut Map<String, Value>) {
    if !is_flat(skip) {
        return;
    }

    let rule = flat_rule(skip);
    let mut filter = Map::new();
    filter.insert("join".to_string(), Value::String("AND".to_string()));
    filter.insert("rules".to_string(), Value::Array(vec![rule]));
    skip.insert("filter".to_string(), Value::Object(filter));

    if !skip.contains_key("action") {
        skip.insert("action".to_string(), Value::String("SKIP".to_string()));
    }
}

fn rewrite_stage_filter(filter: &mut Value) {
    let Some(map) = filter.as_object_mut() else {
        return;
    };
    if !is_flat(map) {
        return;
    }

    let rule = flat_rule(map);
    map.remove("action");
    map.insert("join".to_string(), Value::String("AND".to_string()));
    map.insert("rules".to_string(), Value::Array(vec![rule]));
}

/// Drains the flat comparison keys out of `map` and builds the equivalent
/// filter rule.
fn flat_rule(map: &mut Map<String, Value>) -> Value {
    let mut options = Map::new();
    if let Some(variable) = map.remove("variable") {
        options.insert("attribute".to_string(), variable);
    }
    let operator = map
        .remove("operator")
        .unwrap_or_else(|| Value::String("EXISTS".to_string()));
    options.insert("operator".to_string(), operator);
    if let Some(value) = map.remove("value") {
        options.insert("value".to_string(), value);
    }

    let mut rule = Map::new();
    rule.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    rule.insert("type".to_string(), Value::String("alter".to_string()));
    rule.insert("options".to_string(), Value::Object(options));
    Value::Object(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document_with_flat_skip_logic() -> Value {
        json!({
            "name": "study",
            "stages": [
                {
                    "type": "Sociogram",
                    "skipLogic": {
                        "action": "SHOW",
                        "operator": "GREATER_THAN",
                        "variable": "1f3-aa",
                        "value": 2
                    }
                },
                { "type": "Information" }
            ],
            "codebook": {}
        })
    }

    #[test]
    fn flat_skip_logic_becomes_a_tree() {
        let migrated = FilterExpressionTrees
            .apply(document_with_flat_skip_logic())
            .unwrap();

        let skip = &migrated["stages"][0]["skipLogic"];
        assert_eq!(skip["action"], json!("SHOW"));
        for flat_key in ["operator", "variable", "value"] {
            assert!(skip.get(flat_key).is_none(), "flat key '{flat_key}' survived");
        }

        let filter = &skip["filter"];
        assert_eq!(filter["join"], json!("AND"));
        let rules = filter["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0]["type"], json!("alter"));
        assert_eq!(rules[0]["options"]["attribute"], json!("1f3-aa"));
        assert_eq!(rules[0]["options"]["operator"], json!("GREATER_THAN"));
        assert_eq!(rules[0]["options"]["value"], json!(2));
        assert!(rules[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn missing_action_defaults_to_skip() {
        let document = json!({
            "name": "study",
            "stages": [ {
                "type": "Sociogram",
                "skipLogic": { "operator": "EXISTS", "variable": "1f3-aa" }
            } ],
            "codebook": {}
        });

        let migrated = FilterExpressionTrees.apply(document).unwrap();
        assert_eq!(migrated["stages"][0]["skipLogic"]["action"], json!("SKIP"));
    }

    #[test]
    fn stage_filter_is_rewritten_without_action() {
        let document = json!({
            "name": "study",
            "stages": [ {
                "type": "NameGenerator",
                "filter": { "operator": "NOT_EXISTS", "variable": "2b4-bb" }
            } ],
            "codebook": {}
        });

        let migrated = FilterExpressionTrees.apply(document).unwrap();
        let filter = &migrated["stages"][0]["filter"];
        assert_eq!(filter["join"], json!("AND"));
        assert!(filter.get("action").is_none());
        assert_eq!(
            filter["rules"][0]["options"]["operator"],
            json!("NOT_EXISTS")
        );
    }

    #[test]
    fn tree_shaped_skip_logic_is_untouched() {
        let document = json!({
            "name": "study",
            "stages": [ {
                "type": "Sociogram",
                "skipLogic": {
                    "action": "SKIP",
                    "filter": { "join": "OR", "rules": [] }
                }
            } ],
            "codebook": {}
        });

        let migrated = FilterExpressionTrees.apply(document.clone()).unwrap();
        assert_eq!(migrated["stages"][0]["skipLogic"], document["stages"][0]["skipLogic"]);
    }

    #[test]
    fn stages_without_logic_are_preserved() {
        let migrated = FilterExpressionTrees
            .apply(document_with_flat_skip_logic())
            .unwrap();
        assert_eq!(migrated["stages"][1], json!({ "type": "Information" }));
    }
}
