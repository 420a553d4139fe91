//! Codebook reference resolution
//!
//! Stage configuration points into the codebook by variable UUID: filter
//! rules read attributes, binning prompts write variables, form fields edit
//! them. A dangling reference does not corrupt the document - the stage just
//! cannot run - so findings here are warnings addressed in the authoring
//! tool, not upgrade blockers.

use std::collections::HashSet;

use serde_json::Value;

use protocol_model::value;

use crate::finding::LintFinding;

/// Variable ids defined per codebook partition.
#[derive(Debug, Default)]
struct DefinedVariables {
    node: HashSet<String>,
    edge: HashSet<String>,
    ego: HashSet<String>,
}

impl DefinedVariables {
    fn collect(document: &Value) -> Self {
        let mut defined = Self::default();
        let Some(codebook) = value::codebook(document) else {
            return defined;
        };

        for (partition, bucket) in [("node", &mut defined.node), ("edge", &mut defined.edge)] {
            if let Some(types) = codebook.get(partition).and_then(Value::as_object) {
                for definition in types.values() {
                    collect_variable_ids(definition, bucket);
                }
            }
        }
        if let Some(ego) = codebook.get("ego") {
            collect_variable_ids(ego, &mut defined.ego);
        }
        defined
    }

    fn contains(&self, partition: &str, id: &str) -> bool {
        match partition {
            "node" => self.node.contains(id),
            "edge" => self.edge.contains(id),
            "ego" => self.ego.contains(id),
            _ => false,
        }
    }
}

fn collect_variable_ids(entity: &Value, bucket: &mut HashSet<String>) {
    if let Some(variables) = entity.get("variables").and_then(Value::as_object) {
        bucket.extend(variables.keys().cloned());
    }
}

/// The codebook partition a rule/subject entity name maps to.
fn partition_for(entity: &str) -> &'static str {
    match entity {
        "ego" => "ego",
        "edge" => "edge",
        // Rules say "alter", stage subjects say "node"; both live in the
        // node partition.
        _ => "node",
    }
}

/// Check that every variable referenced from stage configuration resolves
/// to a codebook entry in the matching partition.
#[must_use]
pub fn check_references(document: &Value) -> Vec<LintFinding> {
    let defined = DefinedVariables::collect(document);
    let mut findings = Vec::new();

    let Some(stages) = value::stages(document) else {
        return findings;
    };

    for (index, stage) in stages.iter().enumerate() {
        let Some(stage) = stage.as_object() else {
            continue;
        };
        let stage_path = format!("stages[{index}]");
        let subject_partition = stage
            .get("subject")
            .and_then(|subject| subject.get("entity"))
            .and_then(Value::as_str)
            .map_or("node", partition_for);

        if let Some(filter) = stage.get("skipLogic").and_then(|skip| skip.get("filter")) {
            check_filter(
                filter,
                &format!("{stage_path}.skipLogic.filter"),
                &defined,
                &mut findings,
            );
        }
        if let Some(filter) = stage.get("filter") {
            check_filter(filter, &format!("{stage_path}.filter"), &defined, &mut findings);
        }

        if let Some(prompts) = stage.get("prompts").and_then(Value::as_array) {
            for (prompt_index, prompt) in prompts.iter().enumerate() {
                let Some(variable) = prompt.get("variable").and_then(Value::as_str) else {
                    continue;
                };
                if !defined.contains(subject_partition, variable) {
                    findings.push(unresolved(
                        format!("{stage_path}.prompts[{prompt_index}]"),
                        variable,
                        subject_partition,
                    ));
                }
            }
        }

        if let Some(fields) = stage
            .get("form")
            .and_then(|form| form.get("fields"))
            .and_then(Value::as_array)
        {
            for (field_index, field) in fields.iter().enumerate() {
                let Some(variable) = field.get("variable").and_then(Value::as_str) else {
                    continue;
                };
                if !defined.contains(subject_partition, variable) {
                    findings.push(unresolved(
                        format!("{stage_path}.form.fields[{field_index}]"),
                        variable,
                        subject_partition,
                    ));
                }
            }
        }
    }

    findings
}

fn check_filter(
    filter: &Value,
    path: &str,
    defined: &DefinedVariables,
    findings: &mut Vec<LintFinding>,
) {
    let Some(rules) = filter.get("rules").and_then(Value::as_array) else {
        return;
    };
    for (index, rule) in rules.iter().enumerate() {
        let partition = rule
            .get("type")
            .and_then(Value::as_str)
            .map_or("node", partition_for);
        let Some(attribute) = rule
            .get("options")
            .and_then(|options| options.get("attribute"))
            .and_then(Value::as_str)
        else {
            // Type-only rules (e.g. bare existence checks) reference no
            // variable.
            continue;
        };
        if !defined.contains(partition, attribute) {
            findings.push(unresolved(
                format!("{path}.rules[{index}]"),
                attribute,
                partition,
            ));
        }
    }
}

fn unresolved(path: String, variable: &str, partition: &str) -> LintFinding {
    LintFinding::warning(
        path,
        format!("variable \"{variable}\" is not defined in the {partition} codebook"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn codebook() -> Value {
        json!({
            "node": {
                "person": {
                    "variables": {
                        "1f3-aa": { "name": "nickname", "type": "text" }
                    }
                }
            },
            "edge": {
                "friend": {
                    "variables": {
                        "2b4-bb": { "name": "strength", "type": "ordinal" }
                    }
                }
            },
            "ego": {
                "variables": {
                    "3c5-cc": { "name": "mood", "type": "text" }
                }
            }
        })
    }

    fn with_skip_rule(rule: Value) -> Value {
        json!({
            "stages": [ {
                "id": "st-1",
                "type": "Sociogram",
                "skipLogic": {
                    "action": "SKIP",
                    "filter": { "join": "AND", "rules": [rule] }
                }
            } ],
            "codebook": codebook()
        })
    }

    #[test]
    fn resolved_references_produce_nothing() {
        let document = with_skip_rule(json!({
            "id": "r-1",
            "type": "alter",
            "options": { "attribute": "1f3-aa", "operator": "EXISTS" }
        }));
        assert!(check_references(&document).is_empty());
    }

    #[test]
    fn unresolved_rule_attribute_is_named() {
        let document = with_skip_rule(json!({
            "id": "r-1",
            "type": "alter",
            "options": { "attribute": "xyz", "operator": "EXISTS" }
        }));
        let findings = check_references(&document);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("\"xyz\""));
        assert_eq!(findings[0].path, "stages[0].skipLogic.filter.rules[0]");
    }

    #[test]
    fn rule_entity_scopes_the_lookup() {
        // "3c5-cc" exists, but only on ego - an alter rule must not see it.
        let document = with_skip_rule(json!({
            "id": "r-1",
            "type": "alter",
            "options": { "attribute": "3c5-cc", "operator": "EXISTS" }
        }));
        let findings = check_references(&document);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("node codebook"));

        let document = with_skip_rule(json!({
            "id": "r-1",
            "type": "ego",
            "options": { "attribute": "3c5-cc", "operator": "EXISTS" }
        }));
        assert!(check_references(&document).is_empty());
    }

    #[test]
    fn type_only_rules_reference_nothing() {
        let document = with_skip_rule(json!({
            "id": "r-1",
            "type": "alter",
            "options": { "type": "person", "operator": "EXISTS" }
        }));
        assert!(check_references(&document).is_empty());
    }

    #[test]
    fn prompt_variables_use_the_stage_subject() {
        let document = json!({
            "stages": [ {
                "id": "st-1",
                "type": "OrdinalBin",
                "subject": { "entity": "edge", "type": "friend" },
                "prompts": [
                    { "id": "p-1", "variable": "2b4-bb" },
                    { "id": "p-2", "variable": "missing-id" }
                ]
            } ],
            "codebook": codebook()
        });
        let findings = check_references(&document);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("\"missing-id\""));
        assert!(findings[0].message.contains("edge codebook"));
        assert_eq!(findings[0].path, "stages[0].prompts[1]");
    }

    #[test]
    fn form_fields_are_checked() {
        let document = json!({
            "stages": [ {
                "id": "st-1",
                "type": "EgoForm",
                "subject": { "entity": "ego" },
                "form": {
                    "fields": [
                        { "variable": "3c5-cc" },
                        { "variable": "nope" }
                    ]
                }
            } ],
            "codebook": codebook()
        });
        let findings = check_references(&document);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "stages[0].form.fields[1]");
    }

    #[test]
    fn stage_level_filters_are_checked() {
        let document = json!({
            "stages": [ {
                "id": "st-1",
                "type": "NameGenerator",
                "filter": {
                    "join": "AND",
                    "rules": [ {
                        "id": "r-1",
                        "type": "edge",
                        "options": { "attribute": "gone", "operator": "EXISTS" }
                    } ]
                }
            } ],
            "codebook": codebook()
        });
        let findings = check_references(&document);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "stages[0].filter.rules[0]");
        assert!(findings[0].message.contains("edge codebook"));
    }

    #[test]
    fn documents_without_stages_are_clean() {
        assert!(check_references(&json!({ "codebook": codebook() })).is_empty());
    }
}
