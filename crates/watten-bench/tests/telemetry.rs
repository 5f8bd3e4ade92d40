// Runs in its own test binary: the telemetry subscriber is process-global.

use std::fs;

use tempfile::tempdir;
use watten_bench::config::BenchmarkConfig;
use watten_bench::logging::{TELEMETRY_FILE, init_logging};
use watten_bench::tournament::MatchRunner;

#[test]
fn structured_run_writes_hand_events() {
    let dir = tempdir().expect("temp dir");
    let yaml = format!(
        r#"
run_id: "test_telemetry"
deals:
  seed: 99
  hands: 2
  swap_seats: true
agents:
  - name: "greedy"
    kind: "greedy"
  - name: "coin"
    kind: "random"
    params:
      seed: 3
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: true
  tracing_level: "info"
"#,
        jsonl = dir.path().join("hands.jsonl").display(),
        summary = dir.path().join("summary.md").display(),
    );
    let mut config: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    config.validate().expect("config validates");
    let outputs = config.resolved_outputs();

    let guard = init_logging(&config, &outputs)
        .expect("logging initializes")
        .expect("structured logging enabled");
    assert!(guard.installed, "telemetry subscriber not installed");
    assert_eq!(guard.telemetry_path, dir.path().join(TELEMETRY_FILE));

    let summary = MatchRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("match completes");
    assert_eq!(summary.telemetry_path.as_ref(), Some(&guard.telemetry_path));

    let telemetry_path = guard.telemetry_path.clone();
    drop(guard);

    let events: Vec<serde_json::Value> = fs::read_to_string(&telemetry_path)
        .expect("telemetry readable")
        .lines()
        .map(|line| serde_json::from_str(line).expect("telemetry line is JSON"))
        .collect();

    let header = events
        .iter()
        .find(|event| event["target"] == "watten_bench::run")
        .expect("run header logged");
    assert_eq!(header["run_id"], "test_telemetry");
    assert_eq!(header["hands"], 2);

    let hands: Vec<_> = events
        .iter()
        .filter(|event| event["target"] == "watten_bench::hand")
        .collect();
    assert_eq!(hands.len(), 4, "one hand event per deal and seating");
    for hand in hands {
        assert_eq!(hand["run_id"], "test_telemetry");
        assert!(hand["steps"].as_u64().is_some_and(|steps| steps >= 4));
    }
}
