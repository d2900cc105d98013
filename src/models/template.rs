//! Milestone template model.
//!
//! A template is the reusable, catalog-level definition of a milestone:
//! who owns it, how long it usually takes, and what it waits on. Templates
//! are immutable once loaded into a [`Catalog`](crate::catalog::Catalog).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LeadTime, LeadTimeCategory};

/// A milestone definition shared across projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneTemplate {
    /// Stable key, unique within the catalog (e.g. `POST-EQ-02`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Workstream the milestone belongs to; drives project toggles.
    pub workstream: Workstream,
    /// Before or after the land transaction closes.
    pub phase: Phase,
    /// Responsible party.
    pub owner: Owner,
    /// How much the owner controls the timing.
    #[serde(default)]
    pub control: ControlLevel,
    /// Static duration range (weeks).
    pub duration: LeadTime,
    /// Template ids that must finish before this one starts.
    #[serde(default)]
    pub predecessors: Vec<String>,
    /// Category used to look up a dynamic duration instead of `duration`.
    #[serde(default)]
    pub lead_time_category: Option<LeadTimeCategory>,
    /// Whether a project may skip this milestone entirely.
    #[serde(default)]
    pub skippable: bool,
    /// Known ways to pull the milestone in.
    #[serde(default)]
    pub acceleration_options: Vec<String>,
}

impl MilestoneTemplate {
    /// Creates a template with a zero-week duration and no predecessors.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        workstream: Workstream,
        phase: Phase,
        owner: Owner,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            workstream,
            phase,
            owner,
            control: ControlLevel::default(),
            duration: LeadTime::fixed(0),
            predecessors: Vec::new(),
            lead_time_category: None,
            skippable: false,
            acceleration_options: Vec::new(),
        }
    }

    /// Sets the static duration range.
    pub fn with_duration(mut self, min: u32, typical: u32, max: u32) -> Self {
        self.duration = LeadTime::new(min, typical, max);
        self
    }

    /// Sets a fixed duration (min = typical = max).
    pub fn with_fixed_duration(mut self, weeks: u32) -> Self {
        self.duration = LeadTime::fixed(weeks);
        self
    }

    /// Adds a predecessor template id.
    pub fn with_predecessor(mut self, predecessor_id: impl Into<String>) -> Self {
        self.predecessors.push(predecessor_id.into());
        self
    }

    /// Adds several predecessor ids.
    pub fn with_predecessors<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessors.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the control level.
    pub fn with_control(mut self, control: ControlLevel) -> Self {
        self.control = control;
        self
    }

    /// Routes duration lookup through the given lead-time category.
    pub fn with_lead_time_category(mut self, category: LeadTimeCategory) -> Self {
        self.lead_time_category = Some(category);
        self
    }

    /// Marks the milestone as skippable.
    pub fn skippable(mut self) -> Self {
        self.skippable = true;
        self
    }

    /// Adds an acceleration option.
    pub fn with_acceleration_option(mut self, option: impl Into<String>) -> Self {
        self.acceleration_options.push(option.into());
        self
    }

    /// Whether the template has no predecessors.
    pub fn is_root(&self) -> bool {
        self.predecessors.is_empty()
    }
}

/// Workstream category of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workstream {
    SiteControl,
    PowerStudy,
    Interconnection,
    Zoning,
    Environmental,
    Water,
    Marketing,
    Transaction,
    EquipmentProcurement,
    OnSiteGeneration,
    UtilityConstruction,
    Financing,
    BuildingConstruction,
    Energization,
}

impl Workstream {
    /// All workstreams in catalog order.
    pub const ALL: [Self; 14] = [
        Self::SiteControl,
        Self::PowerStudy,
        Self::Interconnection,
        Self::Zoning,
        Self::Environmental,
        Self::Water,
        Self::Marketing,
        Self::Transaction,
        Self::EquipmentProcurement,
        Self::OnSiteGeneration,
        Self::UtilityConstruction,
        Self::Financing,
        Self::BuildingConstruction,
        Self::Energization,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::SiteControl => "Site Control",
            Self::PowerStudy => "Power Studies",
            Self::Interconnection => "Interconnection",
            Self::Zoning => "Zoning & Permitting",
            Self::Environmental => "Environmental",
            Self::Water => "Water",
            Self::Marketing => "Marketing / End User",
            Self::Transaction => "Transaction",
            Self::EquipmentProcurement => "Equipment Procurement",
            Self::OnSiteGeneration => "On-Site Generation",
            Self::UtilityConstruction => "Utility Construction",
            Self::Financing => "Financing",
            Self::BuildingConstruction => "Building Construction",
            Self::Energization => "Energization",
        }
    }
}

impl fmt::Display for Workstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Development phase relative to the land transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreTransaction,
    PostTransaction,
}

/// Party responsible for a milestone.
///
/// `Seller` and `Buyer` are the two sides of the land transaction; the rest
/// are third parties whose timing the project mostly cannot control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Owner {
    Seller,
    Buyer,
    Utility,
    Shared,
    GridOperator,
    County,
    Municipal,
    State,
    Federal,
    Vendor,
    Contractor,
    Lender,
    EndUser,
    Consultant,
    GasUtility,
    EnergyServiceProvider,
}

impl Owner {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Seller => "Seller",
            Self::Buyer => "Buyer",
            Self::Utility => "Utility",
            Self::Shared => "Shared",
            Self::GridOperator => "ISO/RTO",
            Self::County => "County",
            Self::Municipal => "Municipal",
            Self::State => "State",
            Self::Federal => "Federal",
            Self::Vendor => "Vendor",
            Self::Contractor => "Contractor",
            Self::Lender => "Lender",
            Self::EndUser => "End User",
            Self::Consultant => "Consultant",
            Self::GasUtility => "Gas Utility",
            Self::EnergyServiceProvider => "EaaS Provider",
        }
    }

    /// Whether this is one of the two transaction parties.
    pub fn is_transaction_party(self) -> bool {
        matches!(self, Self::Seller | Self::Buyer)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much control the owner has over a milestone's timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlLevel {
    /// The owner sets the pace.
    Full,
    /// The owner can influence but not dictate timing.
    Partial,
    /// Timing is set by someone else (utility, agency, vendor).
    #[default]
    External,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_builder() {
        let t = MilestoneTemplate::new(
            "POST-EQ-02",
            "Transformer Manufacturing",
            Workstream::EquipmentProcurement,
            Phase::PostTransaction,
            Owner::Vendor,
        )
        .with_duration(130, 156, 260)
        .with_predecessor("POST-EQ-01")
        .with_lead_time_category(LeadTimeCategory::Transformer)
        .with_acceleration_option("Pre-order with utility");

        assert_eq!(t.id, "POST-EQ-02");
        assert_eq!(t.duration, LeadTime::new(130, 156, 260));
        assert_eq!(t.predecessors, vec!["POST-EQ-01"]);
        assert_eq!(t.lead_time_category, Some(LeadTimeCategory::Transformer));
        assert_eq!(t.control, ControlLevel::External);
        assert!(!t.skippable);
        assert!(!t.is_root());
    }

    #[test]
    fn test_workstream_serde_names() {
        let json = serde_json::to_string(&Workstream::OnSiteGeneration).unwrap();
        assert_eq!(json, "\"on-site-generation\"");
        let ws: Workstream = serde_json::from_str("\"equipment-procurement\"").unwrap();
        assert_eq!(ws, Workstream::EquipmentProcurement);
        assert!(serde_json::from_str::<Workstream>("\"fiber\"").is_err());
    }

    #[test]
    fn test_owner_parties() {
        assert!(Owner::Seller.is_transaction_party());
        assert!(Owner::Buyer.is_transaction_party());
        assert!(!Owner::Utility.is_transaction_party());
        assert_eq!(Owner::GridOperator.to_string(), "ISO/RTO");
    }
}
