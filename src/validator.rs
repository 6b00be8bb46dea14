//! Quick structural lint for generated chart text.
//!
//! These are substring checks, not a YAML parser: text that carries every
//! marker passes even if it is not valid YAML.

use serde::{Deserialize, Serialize};

pub const SUMMARY_VALID: &str = "YAML structure is valid";

/// Outcome shown in the validation area of the YAML panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub summary: String,
}

impl ValidationReport {
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
            summary: summary.into(),
        }
    }

    /// A failure carrying a single message as its only issue
    pub fn failure(summary: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            issues: vec![issue.into()],
            summary: summary.into(),
        }
    }
}

struct Check {
    passes: fn(&str) -> bool,
    issue: &'static str,
}

const CHECKS: &[Check] = &[
    Check {
        passes: |text| text.contains("apiVersion:"),
        issue: "Missing apiVersion field",
    },
    Check {
        passes: |text| text.contains("kind:"),
        issue: "Missing kind field",
    },
    Check {
        passes: |text| text.contains("metadata:"),
        issue: "Missing metadata field",
    },
    Check {
        passes: |text| text.contains("{{") && text.contains("}}"),
        issue: "No Helm templating detected - consider adding {{ .Values.* }} syntax",
    },
];

pub fn validate(text: &str) -> ValidationReport {
    let issues: Vec<String> = CHECKS
        .iter()
        .filter(|check| !(check.passes)(text))
        .map(|check| check.issue.to_owned())
        .collect();

    let summary = if issues.is_empty() {
        SUMMARY_VALID.to_owned()
    } else {
        format!("Found {} issue(s)", issues.len())
    };

    ValidationReport {
        is_valid: issues.is_empty(),
        issues,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {{ .Values.name }}\n";

    #[test]
    fn all_markers_present_is_valid() {
        let report = validate(COMPLETE);
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.summary, SUMMARY_VALID);
    }

    #[test]
    fn missing_kind_is_the_only_issue() {
        let text = COMPLETE.replace("kind: Deployment\n", "");
        let report = validate(&text);
        assert!(!report.is_valid);
        assert_eq!(report.issues, vec!["Missing kind field".to_owned()]);
        assert_eq!(report.summary, "Found 1 issue(s)");
    }

    #[test]
    fn templating_needs_both_delimiters() {
        let text = "apiVersion: v1\nkind: Service\nmetadata:\n  name: {{ broken\n";
        let report = validate(text);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].starts_with("No Helm templating detected"));
    }

    #[test]
    fn empty_text_reports_every_issue_in_order() {
        let report = validate("");
        assert_eq!(
            report.issues,
            vec![
                "Missing apiVersion field",
                "Missing kind field",
                "Missing metadata field",
                "No Helm templating detected - consider adding {{ .Values.* }} syntax",
            ]
        );
        assert_eq!(report.summary, "Found 4 issue(s)");
    }

    #[test]
    fn markers_alone_pass_even_when_not_yaml() {
        assert!(validate("apiVersion: kind: metadata: {{ }}").is_valid);
    }
}
