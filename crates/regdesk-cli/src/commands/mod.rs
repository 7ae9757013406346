pub mod cases;
pub mod chat;
pub mod prompt;
pub mod show;

use anyhow::{Result, bail};
use regdesk_core::case::{CaseRepository, RegulatoryCase};

/// Looks up a case or fails with a message naming the known ids.
pub fn find_case(cases: &dyn CaseRepository, case_id: &str) -> Result<RegulatoryCase> {
    if let Some(case) = cases.find_by_id(case_id) {
        return Ok(case);
    }

    let known: Vec<String> = cases.list_all().into_iter().map(|c| c.id).collect();
    bail!("Unknown case '{case_id}'. Known cases: {}", known.join(", "))
}
