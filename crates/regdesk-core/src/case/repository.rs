//! Case repository trait.

use super::model::RegulatoryCase;

/// Read-only access to regulatory cases.
///
/// Lookups are synchronous: cases are fixture data held in memory. The
/// trait exists so the prompt builder and session store can be pointed at
/// a test registry, and so a dynamic registry can be slotted in later
/// without touching their callers.
pub trait CaseRepository: Send + Sync {
    /// Finds a case by its ID.
    ///
    /// Returns `None` if no case has that identifier.
    fn find_by_id(&self, case_id: &str) -> Option<RegulatoryCase>;

    /// Lists all cases in registry order.
    fn list_all(&self) -> Vec<RegulatoryCase>;
}
