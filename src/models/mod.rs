//! Scheduling domain models.
//!
//! Provides the data types for milestone-network scheduling: reusable
//! templates, per-project instances and configuration, lead-time tables,
//! what-if scenarios, and schedule outputs.
//!
//! # Domain Mappings
//!
//! | u-critpath | Meaning |
//! |------------|---------|
//! | MilestoneTemplate | Catalog-level milestone definition |
//! | MilestoneInstance | Milestone state within one project |
//! | LeadTime | min/typical/max duration in weeks |
//! | ScheduleResult | Earliest/latest dates, slack, critical path |

mod instance;
mod lead_time;
mod project;
mod scenario;
mod schedule;
mod template;

pub use instance::{MilestoneInstance, MilestoneStatus};
pub use lead_time::{
    GridOperator, LeadTime, LeadTimeCategory, LeadTimeKey, LeadTimeTable, Qualifier,
    QualifierKind, VoltageClass,
};
pub use project::{Project, ProjectConfiguration, SavedProject};
pub use scenario::{DurationOverride, Override, OverrideChange, Scenario, ScenarioBuilder};
pub use schedule::{
    date_at, weeks_between, MilestoneShift, NodeTiming, ScheduleDiff, ScheduleResult, Week,
};
pub use template::{ControlLevel, MilestoneTemplate, Owner, Phase, Workstream};
