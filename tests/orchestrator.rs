mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{RecordingEnv, StubDatabase, make_backend};
use moviebench::backend::{MemoryBackend, QueryBackend};
use moviebench::bench::{BackendKind, BenchMode, Orchestrator, Scenario};
use moviebench::conf::BenchConfig;
use moviebench::core::{BenchError, Record};
use moviebench::observe::Observed;
use moviebench::testutil::sample_records;

fn bench_config(mode: BenchMode, trials: u32) -> BenchConfig {
    BenchConfig {
        trials,
        mode,
        fuzzy_keyword: "to".to_string(),
        exact_id: 7,
        range_low: 1990,
        range_high: 2000,
        ..BenchConfig::default()
    }
}

#[tokio::test]
async fn test_memory_vs_file_never_touches_environment() {
    let records = sample_records();
    let env = RecordingEnv::default();
    let (memory, _) = make_backend(BackendKind::Memory, &records);
    let (file, _dir) = make_backend(BackendKind::File, &records);

    let mut orchestrator = Orchestrator::new(
        bench_config(BenchMode::Single, 3),
        Box::new(env.clone()),
        vec![memory, file],
        records,
    );
    let report = orchestrator.run().await.unwrap();

    assert_eq!(env.prepares(), 0);
    assert_eq!(env.resets(), 0);
    assert_eq!(report.backends, vec![BackendKind::Memory, BackendKind::File]);
    assert_eq!(report.scenarios.len(), Scenario::ALL.len());
    for scenario in &report.scenarios {
        assert_eq!(scenario.trials.len(), 3);
        for (i, trial) in scenario.trials.iter().enumerate() {
            assert_eq!(trial.trial, i as u32 + 1);
            assert_eq!(trial.timings.len(), 2);
        }
    }
    assert!(orchestrator.sink().is_empty());
}

#[tokio::test]
async fn test_database_runs_reset_before_every_trial() {
    let records = sample_records();
    let env = RecordingEnv::default();
    let database = StubDatabase::new(Duration::from_millis(3));
    let calls = database.calls.clone();

    let backends: Vec<Box<dyn QueryBackend>> = vec![
        Box::new(database),
        Box::new(MemoryBackend::new(records.clone())),
    ];

    let mut orchestrator = Orchestrator::new(
        bench_config(BenchMode::DbVsMemory, 4),
        Box::new(env.clone()),
        backends,
        records,
    );
    let report = orchestrator.run().await.unwrap();

    assert_eq!(env.prepares(), Scenario::ALL.len());
    assert_eq!(env.resets(), Scenario::ALL.len() * 4);
    assert_eq!(calls.load(Ordering::SeqCst), Scenario::ALL.len() * 4);
    assert_eq!(report.mode, BenchMode::DbVsMemory);
    for scenario in &report.scenarios {
        for trial in &scenario.trials {
            assert_eq!(
                trial.timing(BackendKind::Database),
                Some(Duration::from_millis(3))
            );
            assert!(trial.timing(BackendKind::Memory).is_some());
            assert_eq!(trial.timing(BackendKind::File), None);
        }
    }
}

#[tokio::test]
async fn test_update_trials_start_from_pristine_records() {
    let records = vec![Record::new(1, "Road to Nowhere", "US", 1995, Some(101))];
    let backends: Vec<Box<dyn QueryBackend>> =
        vec![Box::new(MemoryBackend::new(records.clone()))];

    let mut orchestrator = Orchestrator::new(
        bench_config(BenchMode::Single, 3),
        Box::new(RecordingEnv::default()),
        backends,
        records,
    );
    let report = orchestrator.run_scenario(Scenario::Update).await.unwrap();

    assert_eq!(report.trials.len(), 3);
    // a repeated rewrite would have produced "Road tttooo Nowhere"
    assert_eq!(
        orchestrator.sink().latest(),
        Observed::Text(Some("Road ttoo Nowhere".to_string()))
    );
}

#[tokio::test]
async fn test_backend_failure_aborts_run() {
    let records = sample_records();
    let database = StubDatabase::failing();
    let calls = database.calls.clone();

    let backends: Vec<Box<dyn QueryBackend>> = vec![
        Box::new(database),
        Box::new(MemoryBackend::new(records.clone())),
    ];

    let mut orchestrator = Orchestrator::new(
        bench_config(BenchMode::DbVsMemory, 5),
        Box::new(RecordingEnv::default()),
        backends,
        records,
    );
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, BenchError::ConnectionError(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(orchestrator.sink().is_empty());
}

#[tokio::test]
async fn test_reset_failure_aborts_run() {
    let records = sample_records();
    let database = StubDatabase::new(Duration::from_millis(1));
    let calls = database.calls.clone();

    let mut orchestrator = Orchestrator::new(
        bench_config(BenchMode::DbVsMemory, 3),
        Box::new(RecordingEnv::failing_at(2)),
        vec![Box::new(database) as Box<dyn QueryBackend>],
        records,
    );
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, BenchError::ProcessExitError { code: 1, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_configured_scenarios_only() {
    let records = sample_records();
    let (memory, _) = make_backend(BackendKind::Memory, &records);
    let config = BenchConfig {
        scenarios: vec![Scenario::Exact, Scenario::Fuzzy],
        ..bench_config(BenchMode::Single, 2)
    };

    let mut orchestrator =
        Orchestrator::new(config, Box::new(RecordingEnv::default()), vec![memory], records);
    let report = orchestrator.run().await.unwrap();

    let ran: Vec<Scenario> = report.scenarios.iter().map(|s| s.scenario).collect();
    assert_eq!(ran, vec![Scenario::Exact, Scenario::Fuzzy]);
    assert_eq!(report.scenarios[0].label, "exact search (id = 7)");
}
