//! Regulatory case domain module.
//!
//! # Module Structure
//!
//! - `model`: `RegulatoryCase`, `ExecutiveSummary` and their enumerations
//! - `repository`: read-only lookup trait (`CaseRepository`)
//! - `registry`: in-memory implementation (`InMemoryCaseRegistry`)
//! - `validation`: load-time checks for fixture invariants

mod model;
mod registry;
mod repository;
mod validation;

pub use model::{
    CaseStatus, ComplianceLevel, ComplianceStatus, ExecutiveSummary, ImpactAnalysis, Priority,
    Recommendations, RegulatoryCase, RiskAssessment, RiskLevel,
};
pub use registry::InMemoryCaseRegistry;
pub use repository::CaseRepository;
pub use validation::{FixtureIssue, validate_cases};
