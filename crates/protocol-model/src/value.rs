//! Defensive accessors over loosely-typed protocol documents
//!
//! Migration steps and structural validators operate on `serde_json::Value`
//! because historical documents arrive from user uploads - no field access
//! may assume presence or type. These helpers centralise the option-chained
//! lookups so call sites stay readable.

use serde_json::{Map, Value};

/// The document's `stages` array, when present and array-shaped.
#[inline]
#[must_use]
pub fn stages(document: &Value) -> Option<&Vec<Value>> {
    document.get("stages")?.as_array()
}

/// Mutable view of the document's `stages` array.
#[inline]
pub fn stages_mut(document: &mut Value) -> Option<&mut Vec<Value>> {
    document.get_mut("stages")?.as_array_mut()
}

/// The document's `codebook` mapping, when present and object-shaped.
#[inline]
#[must_use]
pub fn codebook(document: &Value) -> Option<&Map<String, Value>> {
    document.get("codebook")?.as_object()
}

/// Mutable view of the document's `codebook` mapping.
#[inline]
pub fn codebook_mut(document: &mut Value) -> Option<&mut Map<String, Value>> {
    document.get_mut("codebook")?.as_object_mut()
}

/// Visit every object-shaped stage mutably.
pub fn for_each_stage_mut<F>(document: &mut Value, mut visit: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    if let Some(stages) = stages_mut(document) {
        for stage in stages {
            if let Some(stage) = stage.as_object_mut() {
                visit(stage);
            }
        }
    }
}

/// Visit every entity-type definition in the codebook mutably.
///
/// Covers both keyed partitions (`node`, `edge`) and the single `ego`
/// definition. Non-object entries are skipped, not reported - shape
/// complaints belong to the structural validators.
pub fn for_each_entity_definition_mut<F>(document: &mut Value, mut visit: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    let Some(codebook) = codebook_mut(document) else {
        return;
    };
    for partition in ["node", "edge"] {
        if let Some(types) = codebook.get_mut(partition).and_then(Value::as_object_mut) {
            for definition in types.values_mut() {
                if let Some(definition) = definition.as_object_mut() {
                    visit(definition);
                }
            }
        }
    }
    if let Some(ego) = codebook.get_mut("ego").and_then(Value::as_object_mut) {
        visit(ego);
    }
}

/// Visit every variable definition in the codebook mutably.
pub fn for_each_variable_definition_mut<F>(document: &mut Value, mut visit: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    for_each_entity_definition_mut(document, |entity| {
        if let Some(variables) = entity.get_mut("variables").and_then(Value::as_object_mut) {
            for definition in variables.values_mut() {
                if let Some(definition) = definition.as_object_mut() {
                    visit(definition);
                }
            }
        }
    });
}
