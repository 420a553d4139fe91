//! Per-version structural requirements and the shared document walker
//!
//! Versions accrete requirements: a version-6 document must satisfy
//! everything version 5 demanded plus the version-6 delta. Each version's
//! demands are captured as a [`Requirements`] value and interpreted by one
//! walker, so a new schema version is a new requirement flag, not a new
//! validator implementation.

use serde_json::{Map, Value};

use crate::sink::ErrorSink;

/// The structural demands of one schema version.
///
/// Flags are cumulative by construction - see [`Requirements::for_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    /// A document-level display name is mandatory (v2+).
    pub named_document: bool,
    /// `codebook` replaces `variableRegistry` (v2+).
    pub codebook_key: bool,
    /// `assetManifest` replaces `externalData` (v3+).
    pub asset_manifest: bool,
    /// Variable definitions carry an export `name` (v3+).
    pub named_variables: bool,
    /// Skip logic and filters use the expression-tree shape (v4+).
    pub filter_trees: bool,
    /// Categorical/ordinal options are `{label, value}` objects (v5+).
    pub object_options: bool,
    /// Prompts carry ids (v6+).
    pub prompt_ids: bool,
    /// `iconName` was renamed `iconVariant` (v6+).
    pub no_icon_name: bool,
    /// Entity-level `displayVariable` was retired (v7+).
    pub no_display_variable: bool,
    /// Stages carry ids (v8+).
    pub stage_ids: bool,
}

impl Requirements {
    /// The requirement set of a schema version.
    #[must_use]
    pub fn for_version(version: u32) -> Self {
        Self {
            named_document: version >= 2,
            codebook_key: version >= 2,
            asset_manifest: version >= 3,
            named_variables: version >= 3,
            filter_trees: version >= 4,
            object_options: version >= 5,
            prompt_ids: version >= 6,
            no_icon_name: version >= 6,
            no_display_variable: version >= 7,
            stage_ids: version >= 8,
        }
    }
}

/// Walk a document against a requirement set, reporting every problem.
///
/// # Panics
/// Panics if the document root is not a JSON object. Callers parse uploads
/// into values before validating; a non-object root is a caller bug, not a
/// document problem.
pub(crate) fn check_document(document: &Value, requires: Requirements, sink: &mut ErrorSink) {
    let root = document
        .as_object()
        .expect("protocol document root must be a JSON object");

    check_name(root, requires, sink);
    check_stages(root, requires, sink);
    check_registry_keys(root, requires, sink);
    check_asset_manifest(root, requires, sink);
}

fn check_name(root: &Map<String, Value>, requires: Requirements, sink: &mut ErrorSink) {
    match root.get("name") {
        Some(Value::String(name)) if !name.is_empty() => {}
        Some(Value::String(_)) => sink.report("'name' must not be empty"),
        Some(_) => sink.report("'name' must be a string"),
        None if requires.named_document => sink.report("missing required string 'name'"),
        None => {}
    }
}

fn check_stages(root: &Map<String, Value>, requires: Requirements, sink: &mut ErrorSink) {
    match root.get("stages") {
        None => sink.report("missing required array 'stages'"),
        Some(Value::Array(stages)) => {
            if stages.is_empty() {
                sink.report("'stages' must contain at least one stage");
            }
            for (index, stage) in stages.iter().enumerate() {
                sink.at(format!("stages[{index}]"), |sink| {
                    check_stage(stage, requires, sink);
                });
            }
        }
        Some(_) => sink.report("'stages' must be an array"),
    }
}

fn check_stage(stage: &Value, requires: Requirements, sink: &mut ErrorSink) {
    let Some(stage) = stage.as_object() else {
        sink.report("stage must be an object");
        return;
    };

    match stage.get("type") {
        Some(Value::String(kind)) if !kind.is_empty() => {}
        Some(_) => sink.report("'type' must be a string"),
        None => sink.report("missing required string 'type'"),
    }

    if requires.stage_ids {
        match stage.get("id") {
            Some(Value::String(id)) if !id.is_empty() => {}
            Some(_) => sink.report("'id' must be a non-empty string"),
            None => sink.report("missing required string 'id'"),
        }
    }

    if let Some(skip) = stage.get("skipLogic") {
        sink.at("skipLogic", |sink| check_skip_logic(skip, requires, sink));
    }

    if requires.filter_trees {
        if let Some(filter) = stage.get("filter") {
            sink.at("filter", |sink| check_filter(filter, sink));
        }
    }

    if let Some(prompts) = stage.get("prompts") {
        check_prompts(prompts, requires, sink);
    }
}

fn check_prompts(prompts: &Value, requires: Requirements, sink: &mut ErrorSink) {
    let Some(prompts) = prompts.as_array() else {
        sink.report("'prompts' must be an array");
        return;
    };
    for (index, prompt) in prompts.iter().enumerate() {
        sink.at(format!("prompts[{index}]"), |sink| {
            let Some(prompt) = prompt.as_object() else {
                sink.report("prompt must be an object");
                return;
            };
            if requires.prompt_ids {
                match prompt.get("id") {
                    Some(Value::String(id)) if !id.is_empty() => {}
                    Some(_) => sink.report("'id' must be a non-empty string"),
                    None => sink.report("missing required string 'id'"),
                }
            }
        });
    }
}

fn check_skip_logic(skip: &Value, requires: Requirements, sink: &mut ErrorSink) {
    let Some(skip) = skip.as_object() else {
        sink.report("'skipLogic' must be an object");
        return;
    };
    // Before v4 the flat legacy shape is the accepted form.
    if !requires.filter_trees {
        return;
    }

    for legacy_key in ["operator", "variable", "value"] {
        if skip.contains_key(legacy_key) {
            sink.report(format!(
                "legacy flat key '{legacy_key}' is not allowed; rules moved into 'filter'"
            ));
        }
    }

    match skip.get("action").and_then(Value::as_str) {
        Some("SHOW" | "SKIP") => {}
        Some(other) => sink.report(format!("'action' must be \"SHOW\" or \"SKIP\", got \"{other}\"")),
        None => sink.report("missing required string 'action'"),
    }

    match skip.get("filter") {
        Some(filter) => sink.at("filter", |sink| check_filter(filter, sink)),
        None => sink.report("missing required object 'filter'"),
    }
}

fn check_filter(filter: &Value, sink: &mut ErrorSink) {
    let Some(filter) = filter.as_object() else {
        sink.report("filter must be an object");
        return;
    };

    match filter.get("join").and_then(Value::as_str) {
        Some("AND" | "OR") => {}
        Some(other) => sink.report(format!("'join' must be \"AND\" or \"OR\", got \"{other}\"")),
        None => sink.report("missing required string 'join'"),
    }

    match filter.get("rules") {
        None => sink.report("missing required array 'rules'"),
        Some(Value::Array(rules)) => {
            for (index, rule) in rules.iter().enumerate() {
                sink.at(format!("rules[{index}]"), |sink| check_rule(rule, sink));
            }
        }
        Some(_) => sink.report("'rules' must be an array"),
    }
}

fn check_rule(rule: &Value, sink: &mut ErrorSink) {
    let Some(rule) = rule.as_object() else {
        sink.report("rule must be an object");
        return;
    };
    match rule.get("options") {
        Some(Value::Object(_)) => {}
        Some(_) => sink.report("'options' must be an object"),
        None => sink.report("missing required object 'options'"),
    }
}

fn check_asset_manifest(root: &Map<String, Value>, requires: Requirements, sink: &mut ErrorSink) {
    if !requires.asset_manifest {
        // Free-form 'externalData' is the pre-v3 shape.
        return;
    }

    if root.contains_key("externalData") {
        sink.report("'externalData' was replaced by 'assetManifest'");
    }

    let Some(manifest) = root.get("assetManifest") else {
        return;
    };
    sink.at("assetManifest", |sink| {
        let Some(manifest) = manifest.as_object() else {
            sink.report("'assetManifest' must be an object");
            return;
        };
        for (id, asset) in manifest {
            sink.at(id.clone(), |sink| {
                let Some(asset) = asset.as_object() else {
                    sink.report("asset must be an object");
                    return;
                };
                for key in ["id", "type", "source"] {
                    match asset.get(key) {
                        Some(Value::String(text)) if !text.is_empty() => {}
                        Some(Value::String(_)) => {
                            sink.report(format!("'{key}' must not be empty"));
                        }
                        Some(_) => sink.report(format!("'{key}' must be a string")),
                        None => sink.report(format!("missing required string '{key}'")),
                    }
                }
            });
        }
    });
}

fn check_registry_keys(root: &Map<String, Value>, requires: Requirements, sink: &mut ErrorSink) {
    if requires.codebook_key {
        if root.contains_key("variableRegistry") {
            sink.report("'variableRegistry' was replaced by 'codebook'");
        }
        match root.get("codebook") {
            Some(Value::Object(codebook)) => {
                sink.at("codebook", |sink| check_codebook(codebook, requires, sink));
            }
            Some(_) => sink.report("'codebook' must be an object"),
            None => sink.report("missing required object 'codebook'"),
        }
    } else {
        // v1: either spelling is fine, but whichever is present must be
        // object-shaped.
        for key in ["variableRegistry", "codebook"] {
            if let Some(registry) = root.get(key) {
                match registry.as_object() {
                    Some(map) => sink.at(key, |sink| check_codebook(map, requires, sink)),
                    None => sink.report(format!("'{key}' must be an object")),
                }
            }
        }
    }
}

fn check_codebook(codebook: &Map<String, Value>, requires: Requirements, sink: &mut ErrorSink) {
    for partition in ["node", "edge"] {
        if let Some(types) = codebook.get(partition) {
            sink.at(partition, |sink| {
                let Some(types) = types.as_object() else {
                    sink.report("partition must be an object");
                    return;
                };
                for (key, definition) in types {
                    sink.at(key.clone(), |sink| check_entity(definition, requires, sink));
                }
            });
        }
    }
    if let Some(ego) = codebook.get("ego") {
        sink.at("ego", |sink| check_entity(ego, requires, sink));
    }
}

fn check_entity(entity: &Value, requires: Requirements, sink: &mut ErrorSink) {
    let Some(entity) = entity.as_object() else {
        sink.report("entity definition must be an object");
        return;
    };

    if requires.no_icon_name && entity.contains_key("iconName") {
        sink.report("'iconName' was renamed to 'iconVariant'");
    }
    if requires.no_display_variable && entity.contains_key("displayVariable") {
        sink.report("'displayVariable' is no longer supported");
    }

    if let Some(variables) = entity.get("variables") {
        sink.at("variables", |sink| {
            let Some(variables) = variables.as_object() else {
                sink.report("'variables' must be an object");
                return;
            };
            for (id, definition) in variables {
                sink.at(id.clone(), |sink| check_variable(definition, requires, sink));
            }
        });
    }
}

fn check_variable(variable: &Value, requires: Requirements, sink: &mut ErrorSink) {
    let Some(variable) = variable.as_object() else {
        sink.report("variable definition must be an object");
        return;
    };

    if requires.named_variables {
        match variable.get("name") {
            Some(Value::String(name)) if !name.is_empty() => {}
            Some(_) => sink.report("'name' must be a string"),
            None => sink.report("missing required string 'name'"),
        }
    }

    if let Some(options) = variable.get("options") {
        sink.at("options", |sink| {
            let Some(options) = options.as_array() else {
                sink.report("'options' must be an array");
                return;
            };
            if requires.object_options {
                for (index, option) in options.iter().enumerate() {
                    match option.as_object() {
                        Some(option) if option.contains_key("label") && option.contains_key("value") => {}
                        Some(_) => sink.report(format!(
                            "options[{index}] must carry both 'label' and 'value'"
                        )),
                        None => sink.report(format!(
                            "options[{index}] must be an object with 'label' and 'value'"
                        )),
                    }
                }
            }
        });
    }
}
