//! Schedule output types.
//!
//! Time is measured in whole weeks offset from a project start week. Calendar
//! dates are derived on demand with [`date_at`] when the project has a start
//! date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Owner, Workstream};

/// Week offset. Week 0 is the project start unless configured otherwise.
pub type Week = i64;

/// Calendar date of a week offset from `start`.
///
/// Returns `None` if the result overflows the calendar.
pub fn date_at(start: NaiveDate, week: Week) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::try_weeks(week)?)
}

/// Whole weeks from `start` to `date` (rounded toward negative infinity).
pub fn weeks_between(start: NaiveDate, date: NaiveDate) -> Week {
    (date - start).num_days().div_euclid(7)
}

/// Timing of a single milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTiming {
    pub milestone_id: String,
    pub earliest_start: Week,
    pub earliest_finish: Week,
    pub latest_start: Week,
    pub latest_finish: Week,
    /// Weeks the milestone can slip without moving the project finish.
    pub slack: Week,
    pub is_critical: bool,
    /// Typical duration after resolution (weeks).
    pub effective_duration: u32,
    pub owner: Owner,
    pub workstream: Workstream,
    /// Whether recorded actual dates pinned this milestone.
    pub anchored: bool,
}

impl NodeTiming {
    /// Weeks between earliest start and earliest finish.
    pub fn span(&self) -> Week {
        self.earliest_finish - self.earliest_start
    }
}

/// Result of a forward/backward timing pass over a dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Per-milestone timings, in topological order.
    pub timings: Vec<NodeTiming>,
    pub project_start: Week,
    pub project_finish: Week,
    /// Critical milestones, root to terminal.
    pub critical_path: Vec<String>,
}

impl ScheduleResult {
    /// Timing of a milestone by id.
    pub fn timing(&self, milestone_id: &str) -> Option<&NodeTiming> {
        self.timings.iter().find(|t| t.milestone_id == milestone_id)
    }

    /// Project duration in weeks.
    pub fn total_weeks(&self) -> Week {
        self.project_finish - self.project_start
    }

    /// Number of scheduled milestones.
    pub fn milestone_count(&self) -> usize {
        self.timings.len()
    }

    /// Whether the milestone lies on the reported critical path.
    pub fn is_on_critical_path(&self, milestone_id: &str) -> bool {
        self.critical_path.iter().any(|id| id == milestone_id)
    }

    /// Calendar finish date given a calendar start date.
    pub fn finish_date(&self, start_date: NaiveDate) -> Option<NaiveDate> {
        date_at(start_date, self.total_weeks())
    }

    /// Earliest finishes keyed by id.
    pub fn finishes(&self) -> BTreeMap<&str, Week> {
        self.timings
            .iter()
            .map(|t| (t.milestone_id.as_str(), t.earliest_finish))
            .collect()
    }
}

/// Change in a single milestone's earliest finish between two schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneShift {
    pub milestone_id: String,
    pub baseline_finish: Week,
    pub scenario_finish: Week,
}

impl MilestoneShift {
    /// Positive when the scenario finishes later.
    pub fn delta(&self) -> Week {
        self.scenario_finish - self.baseline_finish
    }
}

/// Comparison of a scenario schedule against its baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDiff {
    pub baseline_finish: Week,
    pub scenario_finish: Week,
    /// `scenario_finish - baseline_finish`; negative means earlier.
    pub finish_delta_weeks: Week,
    /// On the scenario's critical path but not the baseline's.
    pub joined_critical_path: Vec<String>,
    /// On the baseline's critical path but not the scenario's.
    pub left_critical_path: Vec<String>,
    /// Milestones present in both schedules whose finish moved.
    pub shifts: Vec<MilestoneShift>,
}

impl ScheduleDiff {
    /// Whether the scenario pulls the finish in.
    pub fn is_improvement(&self) -> bool {
        self.finish_delta_weeks < 0
    }

    /// Whether the critical path composition changed.
    pub fn critical_path_changed(&self) -> bool {
        !self.joined_critical_path.is_empty() || !self.left_critical_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_helpers() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(date_at(start, 2), NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(date_at(start, -1), NaiveDate::from_ymd_opt(2024, 12, 30));

        let later = NaiveDate::from_ymd_opt(2025, 1, 22).unwrap();
        assert_eq!(weeks_between(start, later), 2);
        let earlier = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(weeks_between(start, earlier), -1);
    }

    #[test]
    fn test_shift_delta() {
        let shift = MilestoneShift {
            milestone_id: "A".into(),
            baseline_finish: 10,
            scenario_finish: 7,
        };
        assert_eq!(shift.delta(), -3);
    }
}
