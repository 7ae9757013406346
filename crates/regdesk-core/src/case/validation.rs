//! Fixture validation for regulatory cases.
//!
//! Summaries are expected to carry a score within 0..=100 and non-empty
//! list sections. Nothing in the model enforces that, so loaders call
//! [`validate_cases`] and decide whether to warn or refuse.

use super::model::{ExecutiveSummary, RegulatoryCase};
use std::collections::HashSet;
use std::fmt;

/// A single problem found in fixture data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureIssue {
    pub case_id: String,
    pub field: &'static str,
    pub problem: String,
}

impl fmt::Display for FixtureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.case_id, self.field, self.problem)
    }
}

/// Checks every case and returns all issues found, in case order.
pub fn validate_cases(cases: &[RegulatoryCase]) -> Vec<FixtureIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for case in cases {
        if !seen.insert(case.id.as_str()) {
            issues.push(FixtureIssue {
                case_id: case.id.clone(),
                field: "id",
                problem: "is duplicated".to_string(),
            });
        }
        if let Some(summary) = &case.summary {
            validate_summary(&case.id, summary, &mut issues);
        }
    }

    issues
}

fn validate_summary(case_id: &str, summary: &ExecutiveSummary, issues: &mut Vec<FixtureIssue>) {
    let score = summary.compliance_status.score;
    if !(0.0..=100.0).contains(&score) {
        issues.push(FixtureIssue {
            case_id: case_id.to_string(),
            field: "compliance_status.score",
            problem: format!("is {score} (expected 0-100)"),
        });
    }

    let lists: [(&'static str, &[String]); 7] = [
        ("key_findings", &summary.key_findings),
        ("risk_assessment.factors", &summary.risk_assessment.factors),
        ("risk_assessment.mitigation", &summary.risk_assessment.mitigation),
        ("recommendations.immediate", &summary.recommendations.immediate),
        ("recommendations.short_term", &summary.recommendations.short_term),
        ("recommendations.long_term", &summary.recommendations.long_term),
        ("next_steps", &summary.next_steps),
    ];

    for (field, items) in lists {
        if items.is_empty() {
            issues.push(FixtureIssue {
                case_id: case_id.to_string(),
                field,
                problem: "is empty".to_string(),
            });
        }
    }
}
