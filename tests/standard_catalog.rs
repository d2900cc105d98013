//! End-to-end schedules over the standard milestone library.

use u_critpath::catalog::standard_scenarios;
use u_critpath::models::{GridOperator, Owner, VoltageClass, Workstream};
use u_critpath::{
    CancellationToken, Engine, Error, Project, ProjectConfiguration, SavedProject, Scenario,
    ScheduleResult, UpdateRequest,
};

const BASE_PATH: [&str; 19] = [
    "PS-SC-01",
    "PS-SC-02",
    "PS-PWR-01",
    "PS-PWR-02",
    "PS-PWR-03",
    "PS-PWR-04",
    "PS-PWR-05",
    "PS-PWR-06",
    "PS-PWR-07",
    "PS-PWR-08",
    "PS-PWR-09",
    "PS-TXN-03",
    "POST-EQ-04",
    "POST-EQ-05",
    "POST-EQ-06",
    "POST-UTL-05",
    "POST-UTL-07",
    "POST-UTL-08",
    "POST-UTL-09",
];

fn project(engine: &Engine, config: ProjectConfiguration) -> Project {
    engine.initialize_project(config).unwrap()
}

fn schedule(config: ProjectConfiguration) -> ScheduleResult {
    let engine = Engine::standard();
    engine.schedule(&project(&engine, config)).unwrap()
}

fn scenario(id: &str) -> Scenario {
    standard_scenarios()
        .into_iter()
        .find(|s| s.id() == id)
        .unwrap()
}

#[test]
fn test_default_project() {
    let result = schedule(ProjectConfiguration::new("default"));
    assert_eq!(result.milestone_count(), 62);
    assert_eq!(result.project_start, 0);
    assert_eq!(result.project_finish, 307);
    assert_eq!(result.critical_path, BASE_PATH);
    assert_eq!(result.timing("PS-TXN-03").unwrap().earliest_finish, 110);
    assert_eq!(result.timing("POST-EQ-05").unwrap().earliest_finish, 270);
    assert_eq!(result.timing("PS-FIN-02").unwrap().slack, 205);
    assert!(result.timings.iter().all(|t| t.slack >= 0));
    assert_eq!(result.timings.iter().filter(|t| t.is_critical).count(), 19);
}

#[test]
fn test_primary_driver_is_hv_breakers() {
    let engine = Engine::standard();
    let project = project(&engine, ProjectConfiguration::new("default"));
    let result = engine.schedule(&project).unwrap();
    let kpi = engine.kpi(&project, &result);
    assert_eq!(kpi.primary_driver.as_deref(), Some("POST-EQ-05"));
    assert_eq!(kpi.primary_driver_weeks, 156);
    assert_eq!(kpi.primary_driver_workstream, Some(Workstream::EquipmentProcurement));
}

#[test]
fn test_equipment_off() {
    let result = schedule(ProjectConfiguration::new("no-eq").with_buyer_supplies_equipment(false));
    assert_eq!(result.milestone_count(), 54);
    assert_eq!(result.project_finish, 249);
    assert!(result.is_on_critical_path("POST-CON-06"));
    assert!(result.timing("POST-EQ-05").is_none());
}

#[test]
fn test_on_site_generation() {
    let result = schedule(ProjectConfiguration::new("btm").with_on_site_generation(true));
    assert_eq!(result.milestone_count(), 68);
    assert_eq!(result.project_finish, 309);
    assert!(result.is_on_critical_path("POST-BTM-03"));
    assert!(!result.is_on_critical_path("POST-EQ-05"));
}

#[test]
fn test_grid_operator_study_times() {
    let finish = |op| schedule(ProjectConfiguration::new("iso").with_grid_operator(op)).project_finish;
    assert_eq!(finish(GridOperator::Pjm), 323);
    assert_eq!(finish(GridOperator::Ercot), 297);
    assert_eq!(finish(GridOperator::Miso), 311);
}

#[test]
fn test_voltage_class_transformer_times() {
    let at_345 = schedule(ProjectConfiguration::new("kv").with_voltage_class(VoltageClass::Kv345));
    assert_eq!(at_345.project_finish, 307);
    assert!(at_345.is_on_critical_path("POST-EQ-02"));

    let at_500 = schedule(ProjectConfiguration::new("kv").with_voltage_class(VoltageClass::Kv500));
    assert_eq!(at_500.project_finish, 333);
}

#[test]
fn test_anchored_study_shifts_downstream() {
    let engine = Engine::standard();
    let base = project(&engine, ProjectConfiguration::new("anchored"));
    let outcome = engine
        .apply_update(&base, &UpdateRequest::actual_finish("PS-PWR-05", 70))
        .unwrap();

    assert_eq!(outcome.schedule.project_finish, 315);
    assert_eq!(outcome.schedule.critical_path[0], "PS-PWR-05");
    assert_eq!(outcome.schedule.critical_path.len(), 13);
    let anchored = outcome.schedule.timing("PS-PWR-05").unwrap();
    assert!(anchored.anchored);
    assert_eq!(anchored.earliest_finish, 70);

    // baseline untouched
    assert_eq!(engine.schedule(&base).unwrap().project_finish, 307);
}

#[test]
fn test_standard_scenarios() {
    let engine = Engine::standard();
    let base = project(&engine, ProjectConfiguration::new("what-if"));

    let breakers = engine.apply_scenario(&base, &scenario("customer-conveys-breakers")).unwrap();
    assert_eq!(breakers.schedule.project_finish, 255);
    assert!(breakers.schedule.is_on_critical_path("POST-EQ-02"));
    assert_eq!(breakers.schedule.timing("POST-EQ-04").unwrap().owner, Owner::Buyer);

    let fast = engine.apply_scenario(&base, &scenario("utility-fast-track")).unwrap();
    assert_eq!(fast.schedule.project_finish, 285);

    let early = engine.apply_scenario(&base, &scenario("early-transformer")).unwrap();
    assert_eq!(early.schedule.project_finish, 307);
}

#[test]
fn test_bridge_power_with_on_site_generation() {
    let engine = Engine::standard();
    let base = project(&engine, ProjectConfiguration::new("btm").with_on_site_generation(true));
    let run = engine.apply_scenario(&base, &scenario("bridge-power")).unwrap();
    assert_eq!(run.schedule.project_finish, 307);

    let d = engine.diff(&engine.schedule(&base).unwrap(), &run.schedule);
    assert_eq!(d.finish_delta_weeks, -2);
    assert!(d.is_improvement());
    assert!(d.left_critical_path.iter().any(|id| id == "POST-BTM-03"));
    assert!(d.joined_critical_path.iter().any(|id| id == "POST-EQ-05"));
}

#[test]
fn test_batch_comparison_matches_sequential() {
    let engine = Engine::standard();
    let base = project(&engine, ProjectConfiguration::new("batch"));
    let scenarios = standard_scenarios();

    let comparisons = engine
        .compare_scenarios(&base, &scenarios, &CancellationToken::new())
        .unwrap();
    assert_eq!(comparisons.len(), scenarios.len());
    for (scenario, comparison) in scenarios.iter().zip(&comparisons) {
        let comparison = comparison.as_ref().unwrap();
        let sequential = engine.apply_scenario(&base, scenario).unwrap();
        assert_eq!(comparison.run.scenario_id, scenario.id());
        assert_eq!(comparison.run.schedule, sequential.schedule);
    }

    let deltas: Vec<_> = comparisons
        .iter()
        .map(|c| c.as_ref().unwrap().diff.finish_delta_weeks)
        .collect();
    assert_eq!(deltas, [-52, -22, 0, 0, 0]);
}

#[test]
fn test_cancelled_batch() {
    let engine = Engine::standard();
    let base = project(&engine, ProjectConfiguration::new("batch"));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let runs = engine
        .evaluate_scenarios(&base, &standard_scenarios(), &cancel)
        .unwrap();
    assert!(runs.iter().all(|r| matches!(r, Err(Error::Cancelled { .. }))));
}

#[test]
fn test_saved_project_round_trip() {
    let engine = Engine::standard();
    let base = project(&engine, ProjectConfiguration::new("persisted"))
        .with_scenario(scenario("utility-fast-track"));
    let saved = engine.save(&base).unwrap();

    let json = serde_json::to_string(&saved).unwrap();
    let restored: SavedProject = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, saved);
    assert_eq!(engine.schedule(&restored.project).unwrap(), saved.schedule.unwrap());
}
