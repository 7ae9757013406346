use super::model::RegulatoryCase;
use super::repository::CaseRepository;

/// A fixed, in-memory list of regulatory cases.
///
/// Built once at startup; lookups clone the stored record so callers can
/// never mutate the registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseRegistry {
    cases: Vec<RegulatoryCase>,
}

impl InMemoryCaseRegistry {
    /// Creates a registry holding `cases` in the given order.
    pub fn new(cases: Vec<RegulatoryCase>) -> Self {
        Self { cases }
    }

    /// Number of registered cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl CaseRepository for InMemoryCaseRegistry {
    fn find_by_id(&self, case_id: &str) -> Option<RegulatoryCase> {
        self.cases.iter().find(|c| c.id == case_id).cloned()
    }

    fn list_all(&self) -> Vec<RegulatoryCase> {
        self.cases.clone()
    }
}
