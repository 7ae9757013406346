//! System prompt construction for case-grounded chat.
//!
//! The prompt is plain text assembled from the case record. It is rebuilt
//! on every turn, so it always reflects the registry as it is at call time.

use crate::case::{CaseRepository, ExecutiveSummary, RegulatoryCase};
use std::fmt::Write;

/// Prompt used when the case is unknown or has no executive summary.
pub const GENERIC_SYSTEM_PROMPT: &str = "You are a regulatory compliance assistant for UBS. You help analyze regulatory documents and provide insights about compliance requirements, implementation strategies, and risk assessments. Please provide accurate, professional responses based on banking regulations and compliance best practices.";

const INSTRUCTIONS: &str = "You should:
1. Answer questions specifically about this regulatory case and its implications for UBS
2. Provide detailed explanations about compliance requirements, risks, and implementation strategies
3. Reference the specific findings, recommendations, and data from this case
4. Offer practical advice for regulatory compliance and risk management
5. Maintain a professional, banking industry-appropriate tone
6. If asked about topics outside this case, politely redirect to case-specific information or general regulatory guidance

Always base your responses on the case data provided above and general regulatory compliance best practices for Swiss banking institutions.";

/// Builds the system prompt for `case_id`.
///
/// Never fails: an unknown case, or one that has not been analyzed yet,
/// yields [`GENERIC_SYSTEM_PROMPT`].
pub fn build_system_prompt(cases: &dyn CaseRepository, case_id: &str) -> String {
    match cases.find_by_id(case_id) {
        Some(case) if case.summary.is_some() => render_case_prompt(&case),
        _ => GENERIC_SYSTEM_PROMPT.to_string(),
    }
}

/// Greeting seeded as the first assistant message of a new chat.
pub fn welcome_message(case_name: &str) -> String {
    format!(
        "Hello! I'm your AI assistant for the regulatory case \"{case_name}\". I have \
         comprehensive knowledge about this case including its compliance status, risk \
         assessment, impact analysis, and implementation recommendations. How can I help you \
         today?"
    )
}

fn render_case_prompt(case: &RegulatoryCase) -> String {
    let Some(summary) = &case.summary else {
        return GENERIC_SYSTEM_PROMPT.to_string();
    };

    let mut out = String::with_capacity(4096);
    // Writing to a String cannot fail.
    let _ = write_case_prompt(&mut out, case, summary);
    out
}

fn write_case_prompt(
    out: &mut String,
    case: &RegulatoryCase,
    summary: &ExecutiveSummary,
) -> std::fmt::Result {
    writeln!(
        out,
        "You are a specialized regulatory compliance assistant for UBS, with deep knowledge \
         about the regulatory case \"{}\" ({}).",
        case.name, case.category
    )?;
    writeln!(out)?;

    writeln!(out, "CASE CONTEXT:")?;
    writeln!(out, "- Case Name: {}", case.name)?;
    writeln!(out, "- Category: {}", case.category)?;
    writeln!(out, "- Priority: {}", case.priority)?;
    writeln!(out, "- Status: {}", case.status)?;
    writeln!(out, "- Documents: {} regulatory documents analyzed", case.documents_count)?;
    writeln!(out, "- Created: {}", case.created_at.format("%-m/%-d/%Y"))?;
    writeln!(out)?;

    writeln!(out, "EXECUTIVE SUMMARY:")?;
    writeln!(out, "{}", summary.overview)?;
    writeln!(out)?;

    let findings: Vec<String> = summary
        .key_findings
        .iter()
        .enumerate()
        .map(|(index, finding)| format!("{}. {}", index + 1, finding))
        .collect();
    writeln!(out, "KEY FINDINGS:")?;
    writeln!(out, "{}", findings.join("\n"))?;
    writeln!(out)?;

    let status = &summary.compliance_status;
    writeln!(out, "COMPLIANCE STATUS:")?;
    writeln!(out, "- Overall Status: {}", status.overall)?;
    writeln!(out, "- Compliance Score: {}%", status.score)?;
    writeln!(out, "- Details: {}", status.details)?;
    writeln!(out)?;

    let risk = &summary.risk_assessment;
    writeln!(out, "RISK ASSESSMENT:")?;
    writeln!(out, "- Risk Level: {}", risk.level)?;
    writeln!(out, "- Key Risk Factors: {}", risk.factors.join(", "))?;
    writeln!(out, "- Mitigation Strategies: {}", risk.mitigation.join(", "))?;
    writeln!(out)?;

    let impact = &summary.impact_analysis;
    writeln!(out, "IMPACT ANALYSIS:")?;
    writeln!(out, "- Business Impact: {}", impact.business)?;
    writeln!(out, "- Operational Impact: {}", impact.operational)?;
    writeln!(out, "- Financial Impact: {}", impact.financial)?;
    writeln!(out, "- Timeline Impact: {}", impact.timeline)?;
    writeln!(out)?;

    let recs = &summary.recommendations;
    writeln!(out, "RECOMMENDATIONS:")?;
    writeln!(out, "- Immediate Actions: {}", recs.immediate.join(", "))?;
    writeln!(out, "- Short-term Actions: {}", recs.short_term.join(", "))?;
    writeln!(out, "- Long-term Actions: {}", recs.long_term.join(", "))?;
    writeln!(out)?;

    writeln!(out, "IMPLEMENTATION:")?;
    writeln!(out, "- Estimated Cost: {}", summary.estimated_cost)?;
    writeln!(out, "- Timeline: {}", summary.implementation_timeline)?;
    writeln!(out, "- Next Steps: {}", summary.next_steps.join(", "))?;
    writeln!(out)?;

    out.write_str(INSTRUCTIONS)
}
