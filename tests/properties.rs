//! Timing-pass invariants over randomly generated milestone networks.

use proptest::prelude::*;
use u_critpath::catalog::Catalog;
use u_critpath::models::{
    LeadTimeTable, MilestoneTemplate, Owner, Phase, ProjectConfiguration, Workstream,
};
use u_critpath::{Engine, Error, Project, Scenario};

const MAX_NODES: usize = 12;

fn id(i: usize) -> String {
    format!("M{i:02}")
}

/// Node `i` depends on every `j < i` whose bit is set in `masks[i]`.
fn network(durations: &[u32], masks: &[u16]) -> (Engine, Project) {
    let templates = durations
        .iter()
        .zip(masks)
        .enumerate()
        .map(|(i, (&weeks, &mask))| {
            let preds = (0..i).filter(|j| mask & (1 << j) != 0).map(id);
            MilestoneTemplate::new(id(i), id(i), Workstream::SiteControl, Phase::PreTransaction, Owner::Seller)
                .with_fixed_duration(weeks)
                .with_predecessors(preds)
        })
        .collect();
    let engine = Engine::new(Catalog::new(templates).unwrap(), LeadTimeTable::new()).unwrap();
    let project = engine.initialize_project(ProjectConfiguration::new("prop")).unwrap();
    (engine, project)
}

fn networks() -> impl Strategy<Value = (Vec<u32>, Vec<u16>)> {
    (1..=MAX_NODES).prop_flat_map(|n| {
        (
            proptest::collection::vec(0u32..30, n),
            proptest::collection::vec(any::<u16>(), n),
        )
    })
}

proptest! {
    #[test]
    fn prop_timings_are_consistent((durations, masks) in networks()) {
        let (engine, project) = network(&durations, &masks);
        let result = engine.schedule(&project).unwrap();

        prop_assert_eq!(result.timings.len(), durations.len());
        for t in &result.timings {
            prop_assert!(t.slack >= 0, "{} has negative slack", t.milestone_id);
            prop_assert_eq!(t.slack, t.latest_start - t.earliest_start);
            prop_assert!(t.earliest_finish >= t.earliest_start);
            prop_assert_eq!(t.span(), i64::from(t.effective_duration));
            prop_assert!(t.latest_finish <= result.project_finish);
            prop_assert_eq!(t.is_critical, t.slack == 0);
        }
    }

    #[test]
    fn prop_successors_start_after_predecessors((durations, masks) in networks()) {
        let (engine, project) = network(&durations, &masks);
        let result = engine.schedule(&project).unwrap();

        for template in engine.catalog().iter() {
            let succ = result.timing(&template.id).unwrap();
            for pred in &template.predecessors {
                let pred = result.timing(pred).unwrap();
                prop_assert!(succ.earliest_start >= pred.earliest_finish);
                prop_assert!(pred.latest_finish <= succ.latest_start);
            }
        }
    }

    #[test]
    fn prop_critical_path_is_connected_chain((durations, masks) in networks()) {
        let (engine, project) = network(&durations, &masks);
        let result = engine.schedule(&project).unwrap();
        let path = &result.critical_path;

        prop_assert!(!path.is_empty());
        let first = engine.catalog().get(&path[0]).unwrap();
        prop_assert!(first.is_root());
        prop_assert_eq!(result.timing(&path[0]).unwrap().earliest_start, 0);

        let last = result.timing(path.last().unwrap()).unwrap();
        prop_assert_eq!(last.earliest_finish, result.project_finish);

        for id in path {
            prop_assert!(result.timing(id).unwrap().is_critical);
        }
        for pair in path.windows(2) {
            let next = engine.catalog().get(&pair[1]).unwrap();
            prop_assert!(next.predecessors.contains(&pair[0]));
        }
    }

    #[test]
    fn prop_schedule_is_deterministic((durations, masks) in networks()) {
        let (engine, project) = network(&durations, &masks);
        let first = engine.schedule(&project).unwrap();
        let second = engine.schedule(&project.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_scenario_leaves_baseline_untouched(
        (durations, masks) in networks(),
        weeks in 0u32..60,
    ) {
        let (engine, project) = network(&durations, &masks);
        let before = project.clone();
        let baseline = engine.schedule(&project).unwrap();

        let scenario = Scenario::builder("stretch", "Stretch").duration(id(0), weeks).build();
        let run = engine.apply_scenario(&project, &scenario).unwrap();

        prop_assert_eq!(&project, &before);
        prop_assert_eq!(engine.schedule(&project).unwrap(), baseline.clone());
        prop_assert_eq!(run.schedule.timing(&id(0)).unwrap().effective_duration, weeks);

        let diff = engine.diff(&baseline, &run.schedule);
        prop_assert_eq!(diff.finish_delta_weeks, run.schedule.project_finish - baseline.project_finish);
    }

    #[test]
    fn prop_longer_duration_never_shortens(
        (durations, masks) in networks(),
        extra in 1u32..20,
    ) {
        let (engine, project) = network(&durations, &masks);
        let baseline = engine.schedule(&project).unwrap();
        let last = durations.len() - 1;

        let scenario = Scenario::builder("slip", "Slip")
            .duration(id(last), durations[last] + extra)
            .build();
        let run = engine.apply_scenario(&project, &scenario).unwrap();
        prop_assert!(run.schedule.project_finish >= baseline.project_finish);
    }

    #[test]
    fn prop_non_critical_slip_within_slack_keeps_finish(
        (durations, masks) in networks(),
        pick in any::<usize>(),
        amount in any::<u32>(),
    ) {
        let (engine, project) = network(&durations, &masks);
        let baseline = engine.schedule(&project).unwrap();
        let k = pick % durations.len();
        let timing = baseline.timing(&id(k)).unwrap();
        if timing.is_critical {
            return Ok(());
        }
        let slack = u32::try_from(timing.slack).unwrap();

        let longer = durations[k] + amount % (slack + 1);
        let shorter = durations[k] - amount % (durations[k].min(slack - 1) + 1);
        for weeks in [longer, shorter] {
            let scenario = Scenario::builder("slip", "Slip").duration(id(k), weeks).build();
            let run = engine.apply_scenario(&project, &scenario).unwrap();
            prop_assert_eq!(run.schedule.project_finish, baseline.project_finish);
        }
    }

    #[test]
    fn prop_back_edge_always_cycles(
        (durations, masks) in networks(),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let n = durations.len();
        let (x, y) = (a % n, b % n);
        if x == y {
            return Ok(());
        }
        let (i, j) = (x.min(y), x.max(y));
        let (engine, project) = network(&durations, &masks);
        let preds_of = |k: usize| -> Vec<String> {
            (0..k).filter(|p| masks[k] & (1 << p) != 0).map(id).collect()
        };

        // make M_j depend on M_i, then close the loop from M_i back to M_j
        let mut forward = preds_of(j);
        if !forward.contains(&id(i)) {
            forward.push(id(i));
        }
        let mut back = preds_of(i);
        back.push(id(j));

        let scenario = Scenario::builder("loop", "Loop")
            .predecessors(id(j), forward)
            .predecessors(id(i), back)
            .build();
        let err = engine.apply_scenario(&project, &scenario).unwrap_err();

        let Error::ScenarioApplication { index, source, .. } = err else {
            panic!("expected scenario error");
        };
        prop_assert_eq!(index, Some(1));
        let is_cycle = matches!(*source, Error::CyclicDependency { .. });
        prop_assert!(is_cycle);
        let ids = source.milestone_ids();
        prop_assert!(ids.contains(&id(i).as_str()) && ids.contains(&id(j).as_str()));
    }
}

#[test]
fn test_back_edge_is_rejected_as_cycle() {
    // M00 -> M01 -> M02
    let (engine, project) = network(&[2, 3, 4], &[0, 0b01, 0b10]);
    let scenario = Scenario::builder("loop", "Loop").predecessors(id(0), [id(2)]).build();
    let err = engine.apply_scenario(&project, &scenario).unwrap_err();

    let Error::ScenarioApplication { index, source, .. } = err else {
        panic!("expected scenario error");
    };
    assert_eq!(index, Some(0));
    assert!(matches!(*source, Error::CyclicDependency { .. }));
    assert_eq!(source.milestone_ids(), ["M00", "M01", "M02"]);
}
