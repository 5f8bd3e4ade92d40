mod seating;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use watten_bot::bot::{BotKind, UnseenTracker};
use watten_bot::policy::{HeuristicPolicy, Policy, PolicyContext, RandomPolicy, RolloutPolicy};
use watten_core::game::env::WattenEnv;
use watten_core::model::card::Card;
use watten_core::model::player::Seat;

use crate::config::{AgentConfig, BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;

use seating::SeatOrders;

const DEFAULT_ROLLOUT_SAMPLES: u64 = 16;
const MAX_ROLLOUT_SAMPLES: u64 = 4_096;

/// Plays the configured agents against each other over seeded deals.
pub struct MatchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_orders: SeatOrders,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub hands_played: usize,
    pub seatings: usize,
    pub rows_written: usize,
    pub illegal_moves: u32,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl MatchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != 2 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            seat_orders: SeatOrders::new(config.deals.swap_seats),
            config,
            outputs,
            agents,
        })
    }

    /// Play every deal, streaming one JSONL row per seat and hand, then
    /// write the Markdown summary.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let orders = self.seat_orders.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.deals.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut illegal_moves = 0u32;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for hand_index in 0..self.config.deals.hands {
            let deal_seed = rng.next_u64();

            for (seating_index, order) in orders.iter().enumerate() {
                let outcome = self.play_hand(hand_index, seating_index, deal_seed, order)?;
                analytics.record_hand(&outcome)?;
                illegal_moves += outcome
                    .seat_results
                    .iter()
                    .map(|seat| seat.illegal_moves)
                    .sum::<u32>();
                rows_written += write_hand_rows(
                    &mut writer,
                    &self.config,
                    hand_index,
                    seating_index,
                    deal_seed,
                    &outcome,
                )?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.report_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            hands_played: self.config.deals.hands,
            seatings: orders.len(),
            rows_written,
            illegal_moves,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn hand_id(hand_index: usize, seating_index: usize) -> String {
    format!("H{hand_index:05}_S{seating_index}")
}

fn write_hand_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    hand_index: usize,
    seating_index: usize,
    deal_seed: u64,
    outcome: &HandOutcome,
) -> Result<usize, RunnerError> {
    let hand_id = hand_id(hand_index, seating_index);

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = HandLogRow {
            run_id: config.run_id.clone(),
            hand_id: hand_id.clone(),
            hand_index,
            seating_index,
            deal_seed,
            seat: seat_result.seat.to_string(),
            bot: seat_result.agent_name.clone(),
            seating: outcome.seating.clone(),
            points_conceded: seat_result.conceded,
            points_gained: seat_result.gained,
            tricks: seat_result.tricks,
            won: seat_result.won,
            illegal_moves: seat_result.illegal_moves,
            speed_ms_turn: seat_result.metrics.avg_ms_per_decision,
            decisions: seat_result.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

impl MatchRunner {
    fn play_hand(
        &self,
        hand_index: usize,
        seating_index: usize,
        deal_seed: u64,
        order: &[usize; 2],
    ) -> Result<HandOutcome, RunnerError> {
        let mut env = WattenEnv::new(deal_seed);
        let mut seats = build_seat_states(order, &self.agents, deal_seed)?;

        for seat in &mut seats {
            seat.tracker.reset_for_round(env.round(), seat.seat);
        }

        while !env.is_done() {
            let expected_seat = env.current_player();
            let seat_index = expected_seat.index();

            let card = {
                let round = env.round();
                let seat_state = &mut seats[seat_index];
                let ctx = PolicyContext::new(round, &seat_state.tracker);
                let start = Instant::now();
                let card = seat_state.policy.choose_play(&ctx);
                let elapsed_ms = seat_state.metrics.record(start.elapsed());

                if self.logging_enabled && tracing::enabled!(Level::INFO) {
                    event!(
                        target: "watten_bench::play",
                        Level::INFO,
                        run_id = %self.config.run_id,
                        hand_id = %hand_id(hand_index, seating_index),
                        seat = %expected_seat,
                        bot = %seat_state.agent_name,
                        card = %card,
                        table = ?round.table_card().map(|c| c.to_string()),
                        elapsed_ms
                    );
                }

                card
            };

            let card = if env.step(card.id()).outcome.is_illegal() {
                seats[seat_index].illegal_moves += 1;
                let fallback = self.recover_from_illegal(&mut env, expected_seat, card)?;
                event!(
                    target: "watten_bench::play",
                    Level::WARN,
                    run_id = %self.config.run_id,
                    hand_id = %hand_id(hand_index, seating_index),
                    seat = %expected_seat,
                    rejected = %card,
                    substituted = %fallback,
                    "policy chose an illegal card"
                );
                fallback
            } else {
                card
            };

            for seat in &mut seats {
                seat.tracker.note_card_played(card);
            }
        }

        let round = env.round();
        let points = round.points();
        let winner = round.winner();
        let seating = seats
            .iter()
            .map(|seat| SeatSnapshot {
                seat: seat.seat.to_string(),
                bot: seat.agent_name.clone(),
                kind: seat.kind.to_string(),
            })
            .collect();

        let mut seat_results = Vec::with_capacity(seats.len());
        for seat in seats {
            let metrics = seat.metrics.finalize();
            seat_results.push(SeatResult {
                agent_name: seat.agent_name,
                seat: seat.seat,
                conceded: points[seat.seat.index()],
                gained: points[seat.seat.other().index()],
                tricks: round.tricks_won(seat.seat),
                won: winner == Some(seat.seat),
                illegal_moves: seat.illegal_moves,
                metrics,
            });
        }

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "watten_bench::hand",
                Level::INFO,
                run_id = %self.config.run_id,
                hand_id = %hand_id(hand_index, seating_index),
                deal_seed,
                winner = ?winner.map(|seat| seat.to_string()),
                points = ?points,
                steps = env.step_count()
            );
        }

        Ok(HandOutcome {
            seating,
            seat_results,
            points,
            winner,
        })
    }

    /// Keep the hand moving after a rejected card by playing the first legal
    /// action in its place.
    fn recover_from_illegal(
        &self,
        env: &mut WattenEnv,
        seat: Seat,
        rejected: Card,
    ) -> Result<Card, RunnerError> {
        let fallback = env
            .legal_actions()
            .first()
            .copied()
            .and_then(Card::from_id)
            .ok_or_else(|| {
                RunnerError::game(format!("no legal card for {seat} after rejecting {rejected}"))
            })?;
        if env.step(fallback.id()).outcome.is_illegal() {
            return Err(RunnerError::game(format!(
                "substitute card {fallback} rejected for {seat}"
            )));
        }
        Ok(fallback)
    }
}

fn build_seat_states(
    order: &[usize; 2],
    agents: &[AgentBlueprint],
    deal_seed: u64,
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(order.len());
    for (seat_idx, agent_idx) in order.iter().enumerate() {
        let seat = Seat::from_index(seat_idx).ok_or_else(|| {
            RunnerError::game(format!("invalid seat index generated: {seat_idx}"))
        })?;
        let agent = agents.get(*agent_idx).ok_or(RunnerError::InvalidSeating {
            index: seat_idx,
            agent_index: *agent_idx,
        })?;
        seats.push(SeatState::new(seat, agent, deal_seed));
    }
    Ok(seats)
}

struct SeatState {
    seat: Seat,
    agent_name: String,
    kind: BotKind,
    policy: Box<dyn Policy>,
    tracker: UnseenTracker,
    metrics: DecisionMetrics,
    illegal_moves: u32,
}

impl SeatState {
    fn new(seat: Seat, agent: &AgentBlueprint, deal_seed: u64) -> Self {
        let policy = agent.spawn_policy(deal_seed);
        Self {
            seat,
            agent_name: agent.name.clone(),
            kind: policy.kind(),
            policy,
            tracker: UnseenTracker::new(),
            metrics: DecisionMetrics::default(),
            illegal_moves: 0,
        }
    }
}

pub struct HandOutcome {
    pub seating: Vec<SeatSnapshot>,
    pub seat_results: Vec<SeatResult>,
    pub points: [u32; 2],
    pub winner: Option<Seat>,
}

#[derive(Clone, Serialize)]
pub struct SeatSnapshot {
    pub seat: String,
    pub bot: String,
    pub kind: String,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: Seat,
    /// Points this seat conceded.
    pub conceded: u32,
    /// Points the opponent conceded.
    pub gained: u32,
    pub tricks: u8,
    pub won: bool,
    pub illegal_moves: u32,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct HandLogRow {
    run_id: String,
    hand_id: String,
    hand_index: usize,
    seating_index: usize,
    deal_seed: u64,
    seat: String,
    bot: String,
    seating: Vec<SeatSnapshot>,
    points_conceded: u32,
    points_gained: u32,
    tricks: u8,
    won: bool,
    illegal_moves: u32,
    speed_ms_turn: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("seating index {index} references invalid agent index {agent_index}")]
    InvalidSeating { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid parameter for agent '{name}': {message}")]
    InvalidParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Random { seed: u64 },
    Heuristic,
    Rollout { samples: usize, seed: u64 },
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let params = AgentParams::new(&config.name, &config.params)?;
        let implementation = match BotKind::from(config.kind) {
            BotKind::Random => AgentImplementation::Random {
                seed: params.u64("seed")?.unwrap_or(0),
            },
            BotKind::Heuristic => AgentImplementation::Heuristic,
            BotKind::Rollout => {
                let samples = params.u64("samples")?.unwrap_or(DEFAULT_ROLLOUT_SAMPLES);
                if samples == 0 || samples > MAX_ROLLOUT_SAMPLES {
                    return Err(params.invalid(format!(
                        "samples must be between 1 and {MAX_ROLLOUT_SAMPLES}, got {samples}"
                    )));
                }
                AgentImplementation::Rollout {
                    samples: samples as usize,
                    seed: params.u64("seed")?.unwrap_or(0),
                }
            }
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    /// Fresh policy for one hand. Seeded agents mix in the deal seed so a
    /// replayed deal sees the same decisions.
    fn spawn_policy(&self, deal_seed: u64) -> Box<dyn Policy> {
        match self.implementation {
            AgentImplementation::Random { seed } => {
                Box::new(RandomPolicy::new(seed ^ deal_seed))
            }
            AgentImplementation::Heuristic => Box::new(HeuristicPolicy::new()),
            AgentImplementation::Rollout { samples, seed } => {
                Box::new(RolloutPolicy::new(samples, seed ^ deal_seed))
            }
        }
    }
}

struct AgentParams<'a> {
    name: &'a str,
    mapping: Option<&'a serde_yaml::Mapping>,
}

impl<'a> AgentParams<'a> {
    fn new(name: &'a str, params: &'a serde_yaml::Value) -> Result<Self, AgentError> {
        if params.is_null() {
            return Ok(Self {
                name,
                mapping: None,
            });
        }
        let mapping = params.as_mapping().ok_or_else(|| AgentError::InvalidParam {
            name: name.to_string(),
            message: "expected mapping for agent params".to_string(),
        })?;
        Ok(Self {
            name,
            mapping: Some(mapping),
        })
    }

    fn u64(&self, key: &str) -> Result<Option<u64>, AgentError> {
        let Some(value) = self
            .mapping
            .and_then(|mapping| {
                mapping
                    .iter()
                    .find_map(|(k, v)| (k.as_str() == Some(key)).then_some(v))
            })
        else {
            return Ok(None);
        };
        value
            .as_u64()
            .map(Some)
            .ok_or_else(|| self.invalid(format!("{key} must be a non-negative integer")))
    }

    fn invalid(&self, message: String) -> AgentError {
        AgentError::InvalidParam {
            name: self.name.to_string(),
            message,
        }
    }
}
