use super::find_case;
use crate::AppContext;
use anyhow::Result;
use colored::Colorize;
use regdesk_core::case::{ExecutiveSummary, RegulatoryCase};
use std::fmt::Write;

pub fn run(ctx: &AppContext, case_id: &str) -> Result<()> {
    let case = find_case(&ctx.cases, case_id)?;

    println!("{}", format!("{} ({})", case.name, case.id).bright_magenta().bold());
    println!("{}", case_details(&case).bright_black());
    println!();

    match &case.summary {
        Some(summary) => print!("{}", render_summary(summary)),
        None => println!("{}", "No executive summary yet.".yellow()),
    }
    Ok(())
}

fn case_details(case: &RegulatoryCase) -> String {
    format!(
        "{} | {} priority | {} | {} documents | created {}",
        case.category,
        case.priority,
        case.status,
        case.documents_count,
        case.created_at.format("%Y-%m-%d %H:%M")
    )
}

fn render_summary(summary: &ExecutiveSummary) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_summary(&mut out, summary);
    out
}

fn write_summary(out: &mut String, s: &ExecutiveSummary) -> std::fmt::Result {
    writeln!(out, "Overview")?;
    writeln!(out, "  {}", s.overview)?;

    writeln!(out, "\nKey Findings")?;
    for (i, finding) in s.key_findings.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, finding)?;
    }

    let status = &s.compliance_status;
    writeln!(out, "\nCompliance: {} ({}%)", status.overall, status.score)?;
    writeln!(out, "  {}", status.details)?;

    writeln!(out, "\nRisk: {}", s.risk_assessment.level)?;
    bullets(out, "Factors", &s.risk_assessment.factors)?;
    bullets(out, "Mitigation", &s.risk_assessment.mitigation)?;

    writeln!(out, "\nImpact")?;
    writeln!(out, "  Business: {}", s.impact_analysis.business)?;
    writeln!(out, "  Operational: {}", s.impact_analysis.operational)?;
    writeln!(out, "  Financial: {}", s.impact_analysis.financial)?;
    writeln!(out, "  Timeline: {}", s.impact_analysis.timeline)?;

    writeln!(out, "\nRecommendations")?;
    bullets(out, "Immediate", &s.recommendations.immediate)?;
    bullets(out, "Short term", &s.recommendations.short_term)?;
    bullets(out, "Long term", &s.recommendations.long_term)?;

    writeln!(out)?;
    bullets(out, "Next Steps", &s.next_steps)?;
    writeln!(out, "\nEstimated Cost: {}", s.estimated_cost)?;
    writeln!(out, "Implementation Timeline: {}", s.implementation_timeline)
}

fn bullets(out: &mut String, title: &str, items: &[String]) -> std::fmt::Result {
    writeln!(out, "  {title}:")?;
    for item in items {
        writeln!(out, "    - {item}")?;
    }
    Ok(())
}
