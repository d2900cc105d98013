//! Template catalog.
//!
//! A [`Catalog`] is a validated, immutable set of [`MilestoneTemplate`]s
//! keyed by id. Construction rejects duplicate ids, unordered durations,
//! dangling or self predecessors, and cycles, collecting every problem.
//!
//! The standard library covers both phases of powered-land development
//! (site control through energization) and is available through
//! [`Catalog::standard`].

mod standard;

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{LeadTimeTable, MilestoneTemplate, Phase, Scenario, Workstream};
use crate::validation::validate_catalog;

/// Validated template library.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    templates: BTreeMap<String, MilestoneTemplate>,
}

impl Catalog {
    /// Builds a catalog, validating the template set as a whole.
    pub fn new(templates: Vec<MilestoneTemplate>) -> Result<Self> {
        validate_catalog(&templates).map_err(Error::InvalidCatalog)?;
        let templates = templates
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        Ok(Self { templates })
    }

    /// The standard powered-land library.
    pub fn standard() -> Self {
        let templates = standard::templates()
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&MilestoneTemplate> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Templates in lexical id order.
    pub fn iter(&self) -> impl Iterator<Item = &MilestoneTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates belonging to a workstream.
    pub fn in_workstream(&self, workstream: Workstream) -> impl Iterator<Item = &MilestoneTemplate> {
        self.iter().filter(move |t| t.workstream == workstream)
    }

    /// Templates belonging to a phase.
    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &MilestoneTemplate> {
        self.iter().filter(move |t| t.phase == phase)
    }

    /// Ids of templates that list `id` as a predecessor.
    pub fn successors_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |t| t.predecessors.iter().any(|p| p == id))
            .map(|t| t.id.as_str())
    }
}

/// Default category lead times for the standard library.
pub fn standard_lead_times() -> LeadTimeTable {
    standard::lead_times()
}

/// Predefined what-if scenarios for the standard library.
pub fn standard_scenarios() -> Vec<Scenario> {
    standard::scenarios()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadTimeCategory, Owner};

    #[test]
    fn test_standard_catalog_is_valid() {
        let templates = standard::templates();
        assert_eq!(templates.len(), 68);
        assert!(validate_catalog(&templates).is_ok());
        assert_eq!(Catalog::standard().len(), 68);
    }

    #[test]
    fn test_standard_lead_times_are_ordered() {
        let table = standard_lead_times();
        assert!(table.check().is_ok());
        assert_eq!(table.len(), 16);
    }

    #[test]
    fn test_standard_scenarios_reference_catalog() {
        let catalog = Catalog::standard();
        let scenarios = standard_scenarios();
        assert_eq!(scenarios.len(), 5);
        for s in &scenarios {
            for o in s.overrides() {
                assert!(catalog.contains(&o.milestone_id), "{}", o.milestone_id);
            }
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let catalog = Catalog::standard();
        let eq02 = catalog.get("POST-EQ-02").unwrap();
        assert_eq!(eq02.lead_time_category, Some(LeadTimeCategory::Transformer));
        assert_eq!(eq02.owner, Owner::Vendor);

        assert_eq!(catalog.in_workstream(Workstream::OnSiteGeneration).count(), 6);
        assert!(catalog.in_workstream(Workstream::OnSiteGeneration).all(|t| t.skippable));

        let mut succ: Vec<&str> = catalog.successors_of("POST-EQ-01").collect();
        succ.sort();
        assert_eq!(succ, vec!["POST-EQ-02"]);
    }

    #[test]
    fn test_new_rejects_invalid() {
        let mut templates = standard::templates();
        templates[1].predecessors.push("MISSING".into());
        let err = Catalog::new(templates).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(ref errs) if !errs.is_empty()));
    }
}
