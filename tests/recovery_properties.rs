//! Recovery behaviour across many attempts: cooldown, selection and
//! configuration loading

mod common;

use common::{manual_clock, supervisor, RecordingRunner, ScriptedMemory};
use modelwatchdog::config::Inventory;
use modelwatchdog::recovery::{
    select_target, ControllerState, RecoveryOutcome, TriggerReason,
};
use modelwatchdog::WatchdogConfig;
use serde_json::json;
use std::io::Write;
use std::time::Duration;

fn inventory(value: serde_json::Value) -> Inventory {
    Inventory::from_config(&WatchdogConfig::from_value(value).unwrap()).unwrap()
}

#[tokio::test]
async fn test_at_most_one_attempt_per_cooldown_window() {
    let clock = manual_clock();
    let runner = RecordingRunner::new();
    let value = json!({
        "models": ["a", "b", "c"],
        "cooldown_sec": 60,
        "interval_sec": 5,
        "switch": { "command": ["switch", "{model}"] }
    });
    let mut sup = supervisor(value, runner.clone(), ScriptedMemory::steady(99.0), clock.clone());

    // Four minutes of overload, one tick every five seconds
    let mut attempts = Vec::new();
    for tick in 0..48u64 {
        let report = sup.tick().await;
        if report.recoveries.iter().any(|(_, outcome)| outcome.attempted()) {
            attempts.push(tick * 5);
        }
        clock.advance(Duration::from_secs(5));
    }

    assert_eq!(attempts, vec![0, 60, 120, 180]);
    assert_eq!(runner.calls_to("switch").len(), 4);
}

#[tokio::test]
async fn test_cooldown_reports_remaining_time() {
    let clock = manual_clock();
    let runner = RecordingRunner::new();
    let value = json!({ "models": ["a", "b"], "cooldown_sec": 60 });
    let mut sup = supervisor(value, runner, ScriptedMemory::steady(95.0), clock.clone());

    sup.tick().await;
    clock.advance(Duration::from_secs(45));
    let report = sup.tick().await;

    assert_eq!(
        report.recoveries[0].1,
        RecoveryOutcome::CoolingDown { remaining: Duration::from_secs(15) }
    );
    assert_eq!(
        sup.orchestrator().cooldown_remaining(sup.state()),
        Some(Duration::from_secs(15))
    );
}

#[tokio::test]
async fn test_profile_round_robin_on_health_failures() {
    let runner = RecordingRunner::new();
    runner.set_exit("health", 1);
    let value = json!({
        "profiles": [
            { "name": "p0", "models": ["a"] },
            { "name": "p1", "models": ["b"] },
            { "name": "p2", "models": ["c"] }
        ],
        "consecutive_health_fail_limit": 1,
        "cooldown_sec": 0,
        "health_check": { "command": ["health"] }
    });
    let mut sup = supervisor(value, runner, ScriptedMemory::steady(10.0), manual_clock());

    let mut visited = Vec::new();
    for _ in 0..3 {
        sup.tick().await;
        visited.push(sup.state().current_profile_index);
    }
    assert_eq!(visited, vec![1, 2, 0]);
}

#[test]
fn test_overload_picks_lightest_model_first_on_tie() {
    let inv = inventory(json!({
        "models": [
            { "name": "big", "ram_gb": 30 },
            { "name": "tiny-a", "ram_gb": 3 },
            { "name": "mid", "ram_gb": 10 },
            { "name": "tiny-b", "ram_gb": 3 }
        ]
    }));
    let state = ControllerState::new(&inv);

    assert_eq!(select_target(&inv, &state, TriggerReason::MemoryOverload, true), 1);
    assert_eq!(select_target(&inv, &state, TriggerReason::MemoryOverload, false), 1);
    assert_eq!(select_target(&inv, &state, TriggerReason::HealthCheckFailed, true), 1);

    let on_tiny = ControllerState { current_model_index: 1, ..state };
    // Already on the lightest: round-robin
    assert_eq!(select_target(&inv, &on_tiny, TriggerReason::MemoryOverload, true), 2);
}

#[test]
fn test_overload_downgrades_profile_strictly() {
    let inv = inventory(json!({
        "models": [
            { "name": "big", "ram_gb": 20 },
            { "name": "small", "ram_gb": 4 }
        ],
        "profiles": [
            { "name": "full", "models": ["big", "small"] },
            { "name": "unknown", "models": ["mystery"] },
            { "name": "lite", "models": ["small"] }
        ]
    }));
    let state = ControllerState::new(&inv);

    assert_eq!(inv.active_ram_gb(0), Some(24.0));
    assert_eq!(inv.active_ram_gb(1), None);
    assert_eq!(select_target(&inv, &state, TriggerReason::MemoryOverload, true), 2);

    let on_lite = ControllerState { current_profile_index: 2, ..state.clone() };
    assert_eq!(select_target(&inv, &on_lite, TriggerReason::MemoryOverload, true), 0);

    let on_unknown = ControllerState { current_profile_index: 1, ..state };
    assert_eq!(select_target(&inv, &on_unknown, TriggerReason::MemoryOverload, true), 2);
}

#[tokio::test]
async fn test_escalation_only_after_restart_failure() {
    let fallback = json!({
        "enabled": true,
        "command": ["fallback"]
    });

    for (failing, expect_fallback) in [("switch", false), ("restart", true)] {
        let runner = RecordingRunner::new();
        runner.set_exit(failing, 1);
        let value = json!({
            "models": ["a", "b"],
            "cooldown_sec": 0,
            "switch": { "command": ["switch", "{model}"] },
            "restart": { "command": ["restart"] },
            "emergency_fallback": fallback.clone()
        });
        let mut sup = supervisor(value, runner.clone(), ScriptedMemory::steady(95.0), manual_clock());

        let report = sup.tick().await;
        match &report.recoveries[0].1 {
            RecoveryOutcome::Failed { fallback_activated, .. } => {
                assert_eq!(*fallback_activated, expect_fallback, "{} failure", failing)
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(runner.calls_to("fallback").len(), usize::from(expect_fallback));
    }
}

#[test]
fn test_loading_twice_builds_identical_inventory() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        "{}",
        json!({
            "models": ["a", { "name": "b", "ram_gb": 8 }],
            "profiles": [{ "name": "solo", "models": ["b"] }],
            "initial_profile": "solo"
        })
    )
    .unwrap();

    let first = WatchdogConfig::load(file.path()).unwrap();
    let second = WatchdogConfig::load(file.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        Inventory::from_config(&first).unwrap(),
        Inventory::from_config(&second).unwrap()
    );
}

#[test]
fn test_toml_and_json_documents_agree() {
    let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        json_file,
        r#"{{"models": ["a", "b"], "cooldown_sec": 15, "restart": {{"command": ["systemctl", "restart", "ollama"]}}}}"#
    )
    .unwrap();

    let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        toml_file,
        "models = [\"a\", \"b\"]\ncooldown_sec = 15\n\n[restart]\ncommand = [\"systemctl\", \"restart\", \"ollama\"]\n"
    )
    .unwrap();

    assert_eq!(
        WatchdogConfig::load(json_file.path()).unwrap(),
        WatchdogConfig::load(toml_file.path()).unwrap()
    );
}
