//! Schedule summary metrics (KPIs).
//!
//! Computes headline indicators from a completed timing pass.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total weeks | project_finish - project_start |
//! | Critical count | Milestones with zero slack |
//! | Primary driver | Longest milestone on the critical path |
//! | Critical weeks by owner | Critical-path duration per responsible party |
//! | Average slack | Mean slack over all milestones |
//! | Target margin | target week - project_finish |
//!
//! # Reference
//! PMI (2021), "PMBOK Guide", 7th ed., Schedule Performance Domain

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Owner, ScheduleResult, Week, Workstream};

/// Margin (weeks) at or above which a schedule is considered low risk.
pub const COMFORTABLE_MARGIN_WEEKS: Week = 26;

/// Risk grade from the margin to target energization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleRisk {
    /// At least six months of margin.
    Low,
    /// On time, with less than six months of margin.
    Medium,
    /// Finishes after the target.
    High,
    /// No target set.
    Unknown,
}

impl ScheduleRisk {
    /// Grades a margin in weeks.
    pub fn from_margin(margin: Option<Week>) -> Self {
        match margin {
            None => Self::Unknown,
            Some(m) if m >= COMFORTABLE_MARGIN_WEEKS => Self::Low,
            Some(m) if m >= 0 => Self::Medium,
            Some(_) => Self::High,
        }
    }
}

/// Schedule summary indicators.
///
/// All durations are in weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    pub total_weeks: Week,
    pub milestone_count: usize,
    /// Milestones with zero slack.
    pub critical_count: usize,
    /// Milestones with recorded actual dates.
    pub anchored_count: usize,
    /// Longest milestone on the critical path.
    pub primary_driver: Option<String>,
    pub primary_driver_weeks: u32,
    pub primary_driver_workstream: Option<Workstream>,
    /// Critical-path duration attributed to each responsible party.
    pub critical_weeks_by_owner: BTreeMap<Owner, u32>,
    /// Mean slack across all milestones.
    pub avg_slack_weeks: f64,
    /// Weeks between project finish and target; negative when late.
    pub target_margin_weeks: Option<Week>,
    pub risk: ScheduleRisk,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The computed schedule.
    /// * `target_finish` - Target energization week, if known.
    pub fn calculate(schedule: &ScheduleResult, target_finish: Option<Week>) -> Self {
        let mut primary: Option<(&str, u32, Workstream)> = None;
        let mut critical_weeks_by_owner: BTreeMap<Owner, u32> = BTreeMap::new();

        for id in &schedule.critical_path {
            let Some(t) = schedule.timing(id) else {
                continue;
            };
            *critical_weeks_by_owner.entry(t.owner).or_default() += t.effective_duration;

            // First on ties
            if primary.map_or(true, |(_, weeks, _)| t.effective_duration > weeks) {
                primary = Some((t.milestone_id.as_str(), t.effective_duration, t.workstream));
            }
        }

        let milestone_count = schedule.timings.len();
        let avg_slack_weeks = if milestone_count == 0 {
            0.0
        } else {
            let total: Week = schedule.timings.iter().map(|t| t.slack).sum();
            total as f64 / milestone_count as f64
        };

        let target_margin_weeks = target_finish.map(|target| target - schedule.project_finish);

        Self {
            total_weeks: schedule.total_weeks(),
            milestone_count,
            critical_count: schedule.timings.iter().filter(|t| t.is_critical).count(),
            anchored_count: schedule.timings.iter().filter(|t| t.anchored).count(),
            primary_driver: primary.map(|(id, _, _)| id.to_string()),
            primary_driver_weeks: primary.map_or(0, |(_, w, _)| w),
            primary_driver_workstream: primary.map(|(_, _, ws)| ws),
            critical_weeks_by_owner,
            avg_slack_weeks,
            target_margin_weeks,
            risk: ScheduleRisk::from_margin(target_margin_weeks),
        }
    }

    /// Whether the schedule finishes by the target.
    pub fn meets_target(&self) -> bool {
        self.target_margin_weeks.is_some_and(|m| m >= 0)
    }

    /// Critical-path weeks attributed to one owner.
    pub fn critical_weeks_for(&self, owner: Owner) -> u32 {
        self.critical_weeks_by_owner.get(&owner).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeTiming;

    fn timing(id: &str, es: Week, ef: Week, slack: Week, owner: Owner) -> NodeTiming {
        NodeTiming {
            milestone_id: id.into(),
            earliest_start: es,
            earliest_finish: ef,
            latest_start: es + slack,
            latest_finish: ef + slack,
            slack,
            is_critical: slack == 0,
            effective_duration: (ef - es) as u32,
            owner,
            workstream: Workstream::SiteControl,
            anchored: false,
        }
    }

    fn sample() -> ScheduleResult {
        ScheduleResult {
            timings: vec![
                timing("A", 0, 4, 0, Owner::Seller),
                timing("B", 4, 10, 0, Owner::Buyer),
                timing("C", 4, 6, 4, Owner::Utility),
            ],
            project_start: 0,
            project_finish: 10,
            critical_path: vec!["A".into(), "B".into()],
        }
    }

    #[test]
    fn test_kpi_basic() {
        let kpi = ScheduleKpi::calculate(&sample(), None);
        assert_eq!(kpi.total_weeks, 10);
        assert_eq!(kpi.milestone_count, 3);
        assert_eq!(kpi.critical_count, 2);
        assert_eq!(kpi.primary_driver.as_deref(), Some("B"));
        assert_eq!(kpi.primary_driver_weeks, 6);
        assert!((kpi.avg_slack_weeks - 4.0 / 3.0).abs() < 1e-10);
        assert_eq!(kpi.risk, ScheduleRisk::Unknown);
        assert!(!kpi.meets_target());
    }

    #[test]
    fn test_kpi_owner_split() {
        let kpi = ScheduleKpi::calculate(&sample(), None);
        assert_eq!(kpi.critical_weeks_for(Owner::Seller), 4);
        assert_eq!(kpi.critical_weeks_for(Owner::Buyer), 6);
        assert_eq!(kpi.critical_weeks_for(Owner::Utility), 0);
    }

    #[test]
    fn test_kpi_driver_tie_keeps_first() {
        let mut schedule = sample();
        schedule.timings[0] = timing("A", 0, 6, 0, Owner::Seller);
        let kpi = ScheduleKpi::calculate(&schedule, None);
        assert_eq!(kpi.primary_driver.as_deref(), Some("A"));
    }

    #[test]
    fn test_kpi_risk_grades() {
        assert_eq!(ScheduleKpi::calculate(&sample(), Some(40)).risk, ScheduleRisk::Low);
        assert_eq!(ScheduleKpi::calculate(&sample(), Some(36)).risk, ScheduleRisk::Low);
        assert_eq!(ScheduleKpi::calculate(&sample(), Some(35)).risk, ScheduleRisk::Medium);
        assert_eq!(ScheduleKpi::calculate(&sample(), Some(10)).risk, ScheduleRisk::Medium);

        let late = ScheduleKpi::calculate(&sample(), Some(8));
        assert_eq!(late.risk, ScheduleRisk::High);
        assert_eq!(late.target_margin_weeks, Some(-2));
        assert!(!late.meets_target());
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ScheduleKpi::calculate(&ScheduleResult::default(), Some(0));
        assert_eq!(kpi.total_weeks, 0);
        assert_eq!(kpi.primary_driver, None);
        assert!((kpi.avg_slack_weeks - 0.0).abs() < 1e-10);
        assert!(kpi.meets_target());
    }
}
