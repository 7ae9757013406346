use crate::AppContext;
use anyhow::Result;
use colored::Colorize;
use regdesk_core::case::{CaseRepository, RegulatoryCase};

pub fn run(ctx: &AppContext, json: bool) -> Result<()> {
    let cases = ctx.cases.list_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
        return Ok(());
    }

    if cases.is_empty() {
        println!("{}", "No cases loaded.".bright_black());
        return Ok(());
    }

    println!("{}", header_line().bold());
    for case in &cases {
        println!("{}", case_line(case));
    }
    Ok(())
}

fn header_line() -> String {
    format!("{:<10} {:<14} {:<8} {:<24} {}", "ID", "STATUS", "PRIORITY", "CATEGORY", "NAME")
}

fn case_line(case: &RegulatoryCase) -> String {
    format!(
        "{:<10} {:<14} {:<8} {:<24} {}",
        case.id,
        case.status.to_string(),
        case.priority.to_string(),
        case.category,
        case.name
    )
}
