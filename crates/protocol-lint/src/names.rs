//! Name charset validation
//!
//! Protocol exports feed XML-based interchange formats, which restrict the
//! identifiers they can carry. Every exported identifier - entity-type keys,
//! variable names, and string option values - must match
//! `^[A-Za-z0-9._:-]+$`. Display labels are human-facing text and are not
//! constrained.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use protocol_model::value;

use crate::finding::LintFinding;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._:-]+$").expect("static pattern compiles"));

/// The allowed character class, for messages.
const ALLOWED: &str = "letters, digits, and '. - : _'";

fn is_exportable(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Check every exported identifier in the codebook.
///
/// Findings are errors: a violating name makes exported interview data
/// unreadable by interchange tooling. Names are reported, never corrected.
#[must_use]
pub fn check_names(document: &Value) -> Vec<LintFinding> {
    let mut findings = Vec::new();
    let Some(codebook) = value::codebook(document) else {
        return findings;
    };

    for partition in ["node", "edge"] {
        let Some(types) = codebook.get(partition).and_then(Value::as_object) else {
            continue;
        };
        for (type_key, definition) in types {
            let path = format!("codebook.{partition}.{type_key}");
            if !is_exportable(type_key) {
                findings.push(LintFinding::error(
                    path.clone(),
                    format!("entity type key \"{type_key}\" is outside the allowed set ({ALLOWED})"),
                ));
            }
            check_entity(definition, &path, &mut findings);
        }
    }
    if let Some(ego) = codebook.get("ego") {
        check_entity(ego, "codebook.ego", &mut findings);
    }

    findings
}

fn check_entity(entity: &Value, path: &str, findings: &mut Vec<LintFinding>) {
    let Some(variables) = entity.get("variables").and_then(Value::as_object) else {
        return;
    };
    for (id, definition) in variables {
        let variable_path = format!("{path}.variables.{id}");

        if let Some(name) = definition.get("name").and_then(Value::as_str) {
            if !is_exportable(name) {
                findings.push(LintFinding::error(
                    variable_path.clone(),
                    format!("variable name \"{name}\" is outside the allowed set ({ALLOWED})"),
                ));
            }
        }

        let Some(options) = definition.get("options").and_then(Value::as_array) else {
            continue;
        };
        for (index, option) in options.iter().enumerate() {
            let Some(value) = option.get("value").and_then(Value::as_str) else {
                continue;
            };
            if !is_exportable(value) {
                findings.push(LintFinding::error(
                    format!("{variable_path}.options[{index}]"),
                    format!("option value \"{value}\" is outside the allowed set ({ALLOWED})"),
                ));
            }
        }
    }
}
