use crate::AppContext;
use anyhow::Result;
use colored::Colorize;
use regdesk_core::case::CaseRepository;
use regdesk_core::prompt::build_system_prompt;

pub fn run(ctx: &AppContext, case_id: &str) -> Result<()> {
    if ctx.cases.find_by_id(case_id).is_none() {
        eprintln!("{}", format!("Unknown case '{case_id}', showing the generic prompt.").yellow());
    }
    println!("{}", build_system_prompt(&ctx.cases, case_id));
    Ok(())
}
