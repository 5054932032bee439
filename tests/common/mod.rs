//! Deterministic fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use modelwatchdog::exec::{Clock, CommandOutput, CommandRunner, HttpClient, ManualClock};
use modelwatchdog::probes::MemoryProbe;
use modelwatchdog::{Capabilities, Supervisor, WatchdogConfig, WatchdogError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every command and fails programs set via `set_exit`
#[derive(Default)]
pub struct RecordingRunner {
    exit_codes: Mutex<HashMap<String, i32>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_exit(&self, program: &str, code: i32) {
        self.exit_codes.lock().unwrap().insert(program.to_string(), code);
    }

    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|argv| argv.first().map(|p| p == program).unwrap_or(false))
            .cloned()
            .collect()
    }

    /// Notification messages in delivery order
    pub fn notices(&self) -> Vec<String> {
        self.calls_to("notify")
            .into_iter()
            .map(|argv| argv[1].clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, argv: &[String], _limit: Duration) -> CommandOutput {
        self.calls.lock().unwrap().push(argv.to_vec());
        let code = argv
            .first()
            .and_then(|p| self.exit_codes.lock().unwrap().get(p).copied())
            .unwrap_or(0);
        if code == 0 {
            CommandOutput::ok()
        } else {
            CommandOutput::failed(code, "scripted failure")
        }
    }
}

/// Returns queued readings; `None` entries fail the probe. Repeats
/// `fallback` once the queue is empty.
pub struct ScriptedMemory {
    readings: Mutex<VecDeque<Option<f64>>>,
    fallback: f64,
}

impl ScriptedMemory {
    pub fn steady(percent: f64) -> Arc<Self> {
        Arc::new(Self {
            readings: Mutex::new(VecDeque::new()),
            fallback: percent,
        })
    }

    pub fn push(&self, reading: Option<f64>) {
        self.readings.lock().unwrap().push_back(reading);
    }
}

#[async_trait]
impl MemoryProbe for ScriptedMemory {
    async fn usage_percent(&self) -> modelwatchdog::Result<f64> {
        match self.readings.lock().unwrap().pop_front() {
            Some(Some(percent)) => Ok(percent),
            Some(None) => Err(WatchdogError::ProbeError(
                "Cannot determine memory usage on this system".to_string(),
            )),
            None => Ok(self.fallback),
        }
    }
}

/// HTTP fake: fixed status for reads, records webhook bodies
#[derive(Default)]
pub struct FakeHttp {
    pub posts: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn status(&self, _method: &str, _url: &str, _limit: Duration) -> modelwatchdog::Result<u16> {
        Ok(200)
    }

    async fn post_json(
        &self,
        _url: &str,
        body: &serde_json::Value,
        _limit: Duration,
    ) -> modelwatchdog::Result<u16> {
        self.posts.lock().unwrap().push(body.clone());
        Ok(200)
    }
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()))
}

/// Build a supervisor wired to fakes
pub fn supervisor(
    value: serde_json::Value,
    runner: Arc<dyn CommandRunner>,
    memory: Arc<dyn MemoryProbe>,
    clock: Arc<ManualClock>,
) -> Supervisor {
    let config = WatchdogConfig::from_value(value).unwrap();
    let clock: Arc<dyn Clock> = clock;
    let caps = Capabilities {
        runner,
        http: Arc::new(FakeHttp::default()),
        clock,
        memory,
    };
    Supervisor::new(&config, caps).unwrap()
}
