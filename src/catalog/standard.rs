//! Standard milestone library, default lead times, and what-if scenarios
//! for powered-land development.

use crate::models::{
    ControlLevel, GridOperator, LeadTime, LeadTimeCategory, LeadTimeKey, LeadTimeTable,
    MilestoneTemplate, Owner, Phase, Scenario, VoltageClass, Workstream,
};

use ControlLevel::{External, Full, Partial};
use LeadTimeCategory as Cat;
use Workstream as Ws;

fn pre(
    id: &str,
    name: &str,
    workstream: Workstream,
    owner: Owner,
    control: ControlLevel,
    (min, typical, max): (u32, u32, u32),
    predecessors: &[&str],
) -> MilestoneTemplate {
    MilestoneTemplate::new(id, name, workstream, Phase::PreTransaction, owner)
        .with_control(control)
        .with_duration(min, typical, max)
        .with_predecessors(predecessors.iter().copied())
}

fn post(
    id: &str,
    name: &str,
    workstream: Workstream,
    owner: Owner,
    control: ControlLevel,
    (min, typical, max): (u32, u32, u32),
    predecessors: &[&str],
) -> MilestoneTemplate {
    MilestoneTemplate::new(id, name, workstream, Phase::PostTransaction, owner)
        .with_control(control)
        .with_duration(min, typical, max)
        .with_predecessors(predecessors.iter().copied())
}

/// The 68 standard templates.
pub fn templates() -> Vec<MilestoneTemplate> {
    let mut all = Vec::with_capacity(68);
    all.extend(site_control());
    all.extend(power_study());
    all.extend(entitlements());
    all.extend(marketing_and_transaction());
    all.extend(equipment());
    all.extend(on_site_generation());
    all.extend(utility_construction());
    all.extend(financing());
    all.extend(building_construction());
    all
}

fn site_control() -> Vec<MilestoneTemplate> {
    vec![
        pre("PS-SC-01", "Site Identified", Ws::SiteControl, Owner::Seller, Full, (0, 0, 0), &[])
            .with_description("Candidate site identified"),
        pre("PS-SC-02", "Land Option/LOI Executed", Ws::SiteControl, Owner::Seller, Partial, (2, 4, 8), &["PS-SC-01"])
            .with_description("Option or letter of intent signed with the landowner"),
        pre("PS-SC-03", "Land Under Contract (PSA)", Ws::SiteControl, Owner::Seller, Partial, (4, 8, 16), &["PS-SC-02"])
            .with_description("Purchase and sale agreement signed"),
        pre("PS-SC-04", "Title Commitment", Ws::SiteControl, Owner::Consultant, Partial, (2, 4, 8), &["PS-SC-03"]),
        pre("PS-SC-05", "Survey Complete (ALTA)", Ws::SiteControl, Owner::Consultant, Partial, (2, 4, 8), &["PS-SC-03"]),
    ]
}

fn power_study() -> Vec<MilestoneTemplate> {
    vec![
        pre("PS-PWR-01", "Pre-Application Meeting", Ws::PowerStudy, Owner::Seller, Partial, (2, 4, 8), &["PS-SC-02"]),
        pre("PS-PWR-02", "Interconnection Application Filed", Ws::PowerStudy, Owner::Seller, Full, (1, 2, 4), &["PS-PWR-01"]),
        pre("PS-PWR-03", "Queue Position Assigned", Ws::PowerStudy, Owner::Utility, External, (2, 4, 12), &["PS-PWR-02"]),
        pre("PS-PWR-04", "Screening Study Complete", Ws::PowerStudy, Owner::Utility, External, (8, 12, 20), &["PS-PWR-03"])
            .with_lead_time_category(Cat::ScreeningStudy),
        pre("PS-PWR-05", "System Impact Study Complete", Ws::PowerStudy, Owner::Utility, External, (16, 36, 78), &["PS-PWR-04"])
            .with_lead_time_category(Cat::SystemImpactStudy)
            .with_description("Grid impact analysis; duration depends on the grid operator"),
        pre("PS-PWR-06", "Facilities Study Complete", Ws::PowerStudy, Owner::Utility, External, (12, 24, 40), &["PS-PWR-05"])
            .with_lead_time_category(Cat::FacilitiesStudy),
        pre("PS-PWR-07", "IA/FA Draft Received", Ws::Interconnection, Owner::Utility, External, (4, 8, 16), &["PS-PWR-06"]),
        pre("PS-PWR-08", "IA/FA Negotiation Complete", Ws::Interconnection, Owner::Seller, Partial, (4, 12, 26), &["PS-PWR-07"])
            .with_acceleration_option("Engage legal early")
            .with_acceleration_option("Pre-negotiate standard terms"),
        pre("PS-PWR-09", "IA/FA Executed", Ws::Interconnection, Owner::Seller, Partial, (1, 2, 4), &["PS-PWR-08"])
            .with_description("Interconnection agreement fully executed"),
        pre("PS-PWR-10", "Interconnection Security Posted", Ws::Interconnection, Owner::Seller, Full, (1, 2, 4), &["PS-PWR-09"]),
    ]
}

fn entitlements() -> Vec<MilestoneTemplate> {
    vec![
        pre("PS-ZN-01", "Zoning Due Diligence", Ws::Zoning, Owner::Seller, Full, (1, 2, 4), &["PS-SC-01"]),
        pre("PS-ZN-02", "Pre-Application Meeting (County)", Ws::Zoning, Owner::Seller, Partial, (2, 4, 8), &["PS-ZN-01"]),
        pre("PS-ZN-03", "Zoning Application Filed", Ws::Zoning, Owner::Seller, Full, (2, 4, 8), &["PS-ZN-02"]),
        pre("PS-ZN-04", "Staff Review Complete", Ws::Zoning, Owner::County, External, (4, 12, 20), &["PS-ZN-03"]),
        pre("PS-ZN-05", "Planning Commission Approval", Ws::Zoning, Owner::County, External, (1, 4, 8), &["PS-ZN-04"]),
        pre("PS-ZN-06", "Final Zoning Approval", Ws::Zoning, Owner::County, External, (2, 4, 8), &["PS-ZN-05"])
            .with_description("Approval effective after the appeal period"),
        pre("PS-ENV-01", "Phase I ESA Complete", Ws::Environmental, Owner::Consultant, Partial, (4, 6, 10), &["PS-SC-02"]),
        pre("PS-ENV-02", "Wetlands Delineation", Ws::Environmental, Owner::Consultant, Partial, (4, 8, 16), &["PS-SC-02"])
            .skippable(),
        pre("PS-ENV-03", "Geotech Study Complete", Ws::Environmental, Owner::Consultant, Partial, (4, 8, 12), &["PS-SC-03"]),
        pre("PS-WTR-01", "Water Availability Confirmed", Ws::Water, Owner::Seller, Partial, (2, 4, 8), &["PS-SC-02"]),
        pre("PS-WTR-02", "Will-Serve Letter Received", Ws::Water, Owner::Municipal, External, (2, 6, 16), &["PS-WTR-01"]),
        pre("PS-FIN-01", "Security Financing Term Sheet", Ws::Financing, Owner::Lender, Partial, (4, 8, 16), &["PS-PWR-06"])
            .skippable()
            .with_description("Financing for the interconnection security deposit"),
        pre("PS-FIN-02", "Security Financing Closed", Ws::Financing, Owner::Lender, Partial, (4, 8, 12), &["PS-FIN-01"])
            .skippable(),
    ]
}

fn marketing_and_transaction() -> Vec<MilestoneTemplate> {
    vec![
        pre("PS-MKT-01", "Marketing Materials Prepared", Ws::Marketing, Owner::Seller, Full, (2, 4, 8), &["PS-PWR-04"]),
        pre("PS-MKT-02", "Buyer/End User Identified", Ws::Marketing, Owner::Seller, Partial, (12, 26, 52), &["PS-MKT-01"]),
        pre("PS-MKT-03", "Buyer LOI Executed", Ws::Marketing, Owner::Seller, Partial, (4, 12, 26), &["PS-MKT-02"]),
        pre("PS-TXN-01", "Buyer Due Diligence", Ws::Transaction, Owner::Buyer, Partial, (8, 12, 20), &["PS-MKT-03"]),
        pre("PS-TXN-02", "PSA Negotiation (Buyer)", Ws::Transaction, Owner::Seller, Partial, (4, 8, 16), &["PS-MKT-03"]),
        pre(
            "PS-TXN-03",
            "Transaction Closed",
            Ws::Transaction,
            Owner::Seller,
            Partial,
            (1, 2, 4),
            &["PS-TXN-01", "PS-TXN-02", "PS-PWR-09", "PS-ZN-06"],
        )
        .with_description("Sale of the powered land closes"),
    ]
}

fn equipment() -> Vec<MilestoneTemplate> {
    vec![
        post("POST-EQ-01", "Transformer PO Issued", Ws::EquipmentProcurement, Owner::Buyer, Full, (2, 4, 8), &["PS-TXN-03"])
            .with_acceleration_option("Customer-funded early procurement")
            .with_acceleration_option("Pre-order with utility"),
        post("POST-EQ-02", "Transformer Manufacturing", Ws::EquipmentProcurement, Owner::Vendor, External, (130, 156, 260), &["POST-EQ-01"])
            .with_lead_time_category(Cat::Transformer)
            .with_description("Lead time depends on interconnection voltage"),
        post("POST-EQ-03", "Transformer Delivered", Ws::EquipmentProcurement, Owner::Vendor, External, (2, 4, 8), &["POST-EQ-02"]),
        post("POST-EQ-04", "Breakers PO Issued", Ws::EquipmentProcurement, Owner::Buyer, Full, (2, 4, 8), &["PS-TXN-03"])
            .with_acceleration_option("Customer conveys breakers to utility"),
        post("POST-EQ-05", "Breakers Manufacturing", Ws::EquipmentProcurement, Owner::Vendor, External, (130, 156, 208), &["POST-EQ-04"])
            .with_lead_time_category(Cat::HvBreakers),
        post("POST-EQ-06", "Breakers Delivered", Ws::EquipmentProcurement, Owner::Vendor, External, (2, 4, 8), &["POST-EQ-05"]),
        post("POST-EQ-07", "Switchgear PO Issued", Ws::EquipmentProcurement, Owner::Buyer, Full, (2, 4, 8), &["PS-TXN-03"]),
        post("POST-EQ-08", "Switchgear Delivered", Ws::EquipmentProcurement, Owner::Vendor, External, (52, 78, 130), &["POST-EQ-07"])
            .with_lead_time_category(Cat::Switchgear),
    ]
}

fn on_site_generation() -> Vec<MilestoneTemplate> {
    vec![
        post("POST-BTM-01", "BTM Strategy Finalized", Ws::OnSiteGeneration, Owner::Buyer, Full, (4, 8, 16), &["PS-TXN-03"])
            .with_description("Utility, service provider, or self-owned generation"),
        post("POST-BTM-02", "Gas Turbine PO Issued", Ws::OnSiteGeneration, Owner::Buyer, Full, (2, 4, 8), &["POST-BTM-01"]),
        post("POST-BTM-03", "Gas Turbine Manufacturing", Ws::OnSiteGeneration, Owner::Vendor, External, (156, 182, 208), &["POST-BTM-02"])
            .with_lead_time_category(Cat::GasTurbine),
        post("POST-BTM-04", "Gas Turbine Delivered", Ws::OnSiteGeneration, Owner::Vendor, External, (2, 4, 8), &["POST-BTM-03"]),
        post("POST-BTM-05", "Gas Service Agreement", Ws::OnSiteGeneration, Owner::GasUtility, Partial, (8, 16, 26), &["POST-BTM-01"]),
        post("POST-BTM-06", "Gas Pipeline Construction", Ws::OnSiteGeneration, Owner::GasUtility, External, (12, 26, 52), &["POST-BTM-05"]),
    ]
    .into_iter()
    .map(MilestoneTemplate::skippable)
    .collect()
}

fn utility_construction() -> Vec<MilestoneTemplate> {
    vec![
        post("POST-UTL-01", "Utility Engineering Start", Ws::UtilityConstruction, Owner::Utility, External, (0, 0, 0), &["PS-PWR-10"]),
        post("POST-UTL-02", "Utility Engineering IFC", Ws::UtilityConstruction, Owner::Utility, External, (16, 26, 40), &["POST-UTL-01"]),
        post("POST-UTL-03", "Substation Construction Start", Ws::UtilityConstruction, Owner::Utility, External, (0, 0, 0), &["POST-UTL-02"]),
        post("POST-UTL-04", "Substation Foundation Complete", Ws::UtilityConstruction, Owner::Utility, External, (12, 20, 30), &["POST-UTL-03"]),
        post(
            "POST-UTL-05",
            "Equipment Installation",
            Ws::UtilityConstruction,
            Owner::Utility,
            External,
            (8, 16, 26),
            &["POST-UTL-04", "POST-EQ-03", "POST-EQ-06"],
        ),
        post("POST-UTL-06", "Transmission Line Complete", Ws::UtilityConstruction, Owner::Utility, External, (0, 0, 104), &["POST-UTL-02"])
            .skippable()
            .with_description("Only when a line extension is required"),
        post(
            "POST-UTL-07",
            "Substation Mechanical Complete",
            Ws::UtilityConstruction,
            Owner::Utility,
            External,
            (4, 8, 12),
            &["POST-UTL-05", "POST-UTL-06"],
        ),
        post("POST-UTL-08", "Commissioning & Testing", Ws::UtilityConstruction, Owner::Utility, External, (4, 8, 12), &["POST-UTL-07"]),
        post(
            "POST-UTL-09",
            "Energization",
            Ws::Energization,
            Owner::Utility,
            External,
            (0, 1, 2),
            &["POST-UTL-08", "POST-CON-06", "POST-BTM-04", "POST-BTM-06"],
        )
        .with_description("Site energized; project complete"),
    ]
}

fn financing() -> Vec<MilestoneTemplate> {
    vec![
        post("POST-FIN-01", "Construction Lender RFP", Ws::Financing, Owner::Buyer, Full, (2, 4, 8), &["PS-TXN-03"]),
        post("POST-FIN-02", "Lender Selected / Term Sheet", Ws::Financing, Owner::Buyer, Partial, (4, 8, 16), &["POST-FIN-01"]),
        post("POST-FIN-03", "Lender Due Diligence", Ws::Financing, Owner::Lender, Partial, (8, 16, 26), &["POST-FIN-02"]),
        post("POST-FIN-04", "Credit Approval", Ws::Financing, Owner::Lender, External, (2, 4, 8), &["POST-FIN-03"]),
        post("POST-FIN-05", "Construction Financing Closed", Ws::Financing, Owner::Lender, Partial, (4, 8, 16), &["POST-FIN-04"]),
    ]
}

fn building_construction() -> Vec<MilestoneTemplate> {
    vec![
        post("POST-CON-01", "A/E Selection", Ws::BuildingConstruction, Owner::Buyer, Full, (4, 8, 16), &["PS-TXN-03"]),
        post("POST-CON-02", "Construction Documents Complete", Ws::BuildingConstruction, Owner::Consultant, Partial, (20, 32, 52), &["POST-CON-01"]),
        post("POST-CON-03", "Building Permit Issued", Ws::BuildingConstruction, Owner::County, External, (4, 12, 20), &["POST-CON-02", "PS-ZN-06"]),
        post("POST-CON-04", "GC Selection / NTP", Ws::BuildingConstruction, Owner::Buyer, Full, (8, 12, 20), &["POST-CON-02", "POST-FIN-05"]),
        post("POST-CON-05", "Building Construction", Ws::BuildingConstruction, Owner::Contractor, Partial, (52, 78, 104), &["POST-CON-03", "POST-CON-04"]),
        post("POST-CON-06", "Customer Facility Ready", Ws::BuildingConstruction, Owner::Buyer, Partial, (4, 8, 16), &["POST-CON-05"]),
    ]
}

/// Default category lead times (weeks).
pub fn lead_times() -> LeadTimeTable {
    let transformer = [
        (VoltageClass::Kv500, LeadTime::new(130, 182, 260)),
        (VoltageClass::Kv345, LeadTime::new(130, 156, 234)),
        (VoltageClass::Kv230, LeadTime::new(104, 130, 208)),
        (VoltageClass::Kv138, LeadTime::new(78, 104, 182)),
        (VoltageClass::Kv69, LeadTime::new(52, 78, 130)),
    ];
    let impact_study = [
        (GridOperator::Pjm, LeadTime::new(26, 52, 78)),
        (GridOperator::Ercot, LeadTime::new(12, 26, 52)),
        (GridOperator::Spp, LeadTime::new(16, 36, 52)),
        (GridOperator::Miso, LeadTime::new(20, 40, 65)),
    ];

    let mut table = LeadTimeTable::new()
        .with_entry(LeadTimeKey::category(Cat::HvBreakers), LeadTime::new(130, 156, 208))
        .with_entry(LeadTimeKey::category(Cat::MvBreakers), LeadTime::new(52, 78, 130))
        .with_entry(LeadTimeKey::category(Cat::Switchgear), LeadTime::new(52, 78, 130))
        .with_entry(LeadTimeKey::category(Cat::GasTurbine), LeadTime::new(156, 182, 208))
        .with_entry(LeadTimeKey::category(Cat::ReciprocatingEngine), LeadTime::new(52, 78, 130))
        .with_entry(LeadTimeKey::category(Cat::FacilitiesStudy), LeadTime::new(12, 24, 40))
        .with_entry(LeadTimeKey::category(Cat::ScreeningStudy), LeadTime::new(8, 12, 20));
    for (voltage, lt) in transformer {
        table.insert(LeadTimeKey::voltage(Cat::Transformer, voltage), lt);
    }
    for (operator, lt) in impact_study {
        table.insert(LeadTimeKey::operator(Cat::SystemImpactStudy, operator), lt);
    }
    table
}

/// Predefined what-if scenarios.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::builder("customer-conveys-breakers", "Customer Conveys Breakers")
            .description("Customer procures HV breakers and conveys them to the utility")
            .owner("POST-EQ-04", Owner::Buyer)
            .duration("POST-EQ-05", 104)
            .build(),
        Scenario::builder("utility-fast-track", "Utility Fast-Track Studies")
            .description("Utility agrees to expedited study processing")
            .duration("PS-PWR-04", 8)
            .duration("PS-PWR-05", 26)
            .duration("PS-PWR-06", 16)
            .build(),
        Scenario::builder("early-transformer", "Early Transformer Procurement")
            .description("Customer funds the transformer order as soon as the IA is executed")
            .duration("POST-EQ-01", 0)
            .predecessors("POST-EQ-01", ["PS-PWR-09"])
            .build(),
        Scenario::builder("bridge-power", "Bridge Power (Temporary Generation)")
            .description("Temporary generation shortens the on-site generation lead time")
            .duration("POST-BTM-03", 52)
            .build(),
        Scenario::builder("eaas-provider", "EaaS BTM Provider")
            .description("A third-party energy service provider handles on-site generation")
            .owner("POST-BTM-01", Owner::EnergyServiceProvider)
            .owner("POST-BTM-02", Owner::EnergyServiceProvider)
            .owner("POST-BTM-03", Owner::EnergyServiceProvider)
            .build(),
    ]
}
