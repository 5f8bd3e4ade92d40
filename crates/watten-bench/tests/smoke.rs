use std::fs;
use std::path::Path;

use watten_bench::config::BenchmarkConfig;
use watten_bench::tournament::MatchRunner;
use tempfile::tempdir;

fn load_config(output_dir: &Path, opponent: &str) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
deals:
  seed: 4242
  hands: 3
  swap_seats: true
agents:
  - name: "greedy"
    kind: "greedy"
{opponent}
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("hands.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

const RANDOM_OPPONENT: &str = r#"  - name: "coin"
    kind: "random"
    params:
      seed: 11"#;

const ROLLOUT_OPPONENT: &str = r#"  - name: "search"
    kind: "rollout"
    params:
      samples: 2
      seed: 5"#;

/// Run once and return the JSONL rows with wall-clock fields zeroed.
fn normalized_rows(dir: &Path, opponent: &str) -> Vec<serde_json::Value> {
    let config = load_config(dir, opponent);
    let outputs = config.resolved_outputs();
    let runner = MatchRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("match completes");

    assert_eq!(summary.hands_played, 3);
    assert_eq!(summary.seatings, 2);
    assert_eq!(summary.rows_written, 12);
    assert_eq!(summary.illegal_moves, 0);
    assert!(summary.summary_path.exists(), "summary markdown missing");
    assert!(summary.telemetry_path.is_none());

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    jsonl
        .lines()
        .map(|line| {
            let mut value: serde_json::Value =
                serde_json::from_str(line).expect("row decodes to JSON");
            if let Some(speed) = value.get_mut("speed_ms_turn") {
                *speed = serde_json::json!(0.0);
            }
            value
        })
        .collect()
}

#[test]
fn match_smoke_test_is_deterministic() {
    let first = tempdir().expect("temp dir");
    let second = tempdir().expect("temp dir");

    let a = normalized_rows(first.path(), RANDOM_OPPONENT);
    let b = normalized_rows(second.path(), RANDOM_OPPONENT);
    assert_eq!(a, b, "same seed should reproduce every row");
}

#[test]
fn rows_describe_complete_hands() {
    let dir = tempdir().expect("temp dir");
    let rows = normalized_rows(dir.path(), ROLLOUT_OPPONENT);

    for pair in rows.chunks(2) {
        let [first, second] = pair else {
            panic!("rows come in seat pairs");
        };
        assert_eq!(first["hand_id"], second["hand_id"]);
        assert_eq!(first["deal_seed"], second["deal_seed"]);
        assert_eq!(first["seat"], "first");
        assert_eq!(second["seat"], "second");

        // Each seat's gained points are the other's conceded points.
        assert_eq!(first["points_gained"], second["points_conceded"]);
        assert_eq!(second["points_gained"], first["points_conceded"]);

        // Five-card hands always produce a round winner with two tricks.
        let winners = pair.iter().filter(|row| row["won"] == true).count();
        assert_eq!(winners, 1);
        let winner = pair.iter().find(|row| row["won"] == true).unwrap();
        assert_eq!(winner["tricks"], 2);
    }

    // Swapped replays put each agent in each seat on the same deal.
    assert_eq!(rows[0]["bot"], "greedy");
    assert_eq!(rows[2]["bot"], "search");
    assert_eq!(rows[0]["deal_seed"], rows[2]["deal_seed"]);

    let summary = fs::read_to_string(dir.path().join("summary.md")).expect("summary readable");
    assert!(summary.contains("| greedy |"));
    assert!(summary.contains("| search |"));
}
