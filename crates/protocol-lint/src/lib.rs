//! Logic / External-data Validators
//!
//! Semantic checks that run strictly after structural migration succeeds:
//!
//! - **Name charset** ([`check_names`]): entity-type keys, variable names,
//!   and string option values must stay inside the character class that
//!   XML-based interchange formats accept. Violations are errors - exported
//!   data would be unreadable - but are reported, never silently corrected.
//! - **Reference resolution** ([`check_references`]): variable ids used in
//!   skip logic, filters, prompts, and form fields must resolve to codebook
//!   entries in the matching partition. An unresolved reference blocks use
//!   of the stage at interview time, not the upgrade itself, so these are
//!   warnings.
//!
//! Findings are ordered values ([`LintFinding`]); nothing here throws.

#![warn(unreachable_pub)]

mod finding;
mod names;
mod references;

pub use finding::{LintFinding, Severity};
pub use names::check_names;
pub use references::check_references;

use serde_json::Value;

/// Run every lint over a migrated document, in document order per lint.
///
/// Charset findings come first: they are errors, and callers that only show
/// the first few findings should lead with them.
#[must_use]
pub fn lint(document: &Value) -> Vec<LintFinding> {
    let mut findings = check_names(document);
    findings.extend(check_references(document));
    findings
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lint_orders_errors_before_warnings() {
        let document = json!({
            "stages": [ {
                "id": "st-1",
                "type": "Sociogram",
                "skipLogic": {
                    "action": "SKIP",
                    "filter": {
                        "join": "AND",
                        "rules": [ {
                            "id": "r-1",
                            "type": "alter",
                            "options": { "attribute": "xyz", "operator": "EXISTS" }
                        } ]
                    }
                }
            } ],
            "codebook": {
                "node": {
                    "person": {
                        "variables": {
                            "1f3-aa": { "name": "my var", "type": "text" }
                        }
                    }
                }
            }
        });

        let findings = lint(&document);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[1].severity, Severity::Warning);
    }

    #[test]
    fn clean_document_has_no_findings() {
        let document = json!({
            "stages": [ { "id": "st-1", "type": "Information" } ],
            "codebook": {
                "node": {
                    "person": {
                        "variables": { "1f3-aa": { "name": "age", "type": "number" } }
                    }
                }
            }
        });
        assert!(lint(&document).is_empty());
    }
}
