//! Regulatory case domain model.
//!
//! Cases are fixture data: they are loaded once at startup and never
//! mutated afterwards.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Processing state of a regulatory case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CaseStatus {
    Processing,
    Analyzed,
    PendingReview,
}

/// Business priority of a regulatory case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Overall compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplianceLevel {
    Compliant,
    NonCompliant,
    PartiallyCompliant,
}

/// Assessed risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// A regulatory case record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryCase {
    /// Unique case identifier (e.g. `case-001`)
    pub id: String,
    /// Display name
    pub name: String,
    /// When the case was opened (local time, no zone)
    pub created_at: NaiveDateTime,
    /// Number of source documents attached to the case
    pub documents_count: u32,
    pub status: CaseStatus,
    /// Free-form category label (e.g. "Capital Requirements")
    pub category: String,
    pub priority: Priority,
    /// Analysis output, absent until the case has been analyzed
    #[serde(default)]
    pub summary: Option<ExecutiveSummary>,
}

impl RegulatoryCase {
    /// Whether an executive summary is attached.
    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }
}

/// Analysis results for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overview: String,
    pub key_findings: Vec<String>,
    pub compliance_status: ComplianceStatus,
    pub risk_assessment: RiskAssessment,
    pub impact_analysis: ImpactAnalysis,
    pub recommendations: Recommendations,
    pub next_steps: Vec<String>,
    pub estimated_cost: String,
    pub implementation_timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceStatus {
    pub overall: ComplianceLevel,
    /// Compliance score, expected within 0..=100. Fixtures may carry
    /// anything numeric, so range checks happen in `validate_cases`.
    pub score: f64,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub mitigation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub business: String,
    pub operational: String,
    pub financial: String,
    pub timeline: String,
}

/// Recommended actions grouped by horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}
