use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{Binomial, DiscreteCDF};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, HandOutcome};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("sign test failed: {0}")]
    Stats(String),
}

pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    draws: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }

        Self {
            agents,
            agent_order: order,
            draws: 0,
        }
    }

    pub fn record_hand(&mut self, outcome: &HandOutcome) -> Result<(), AnalyticsError> {
        if outcome.winner.is_none() {
            self.draws += 1;
        }

        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;

            acc.record_hand(
                seat.conceded,
                seat.gained,
                seat.won,
                seat.illegal_moves,
                &seat.metrics,
            );
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut agents = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                agents.push(acc.into_report());
            }
        }

        let sign_test = match agents.as_slice() {
            [a, b] => Some(SignTest::between(a, b)?),
            _ => None,
        };

        Ok(AnalyticsSummary {
            agents,
            draws: self.draws,
            sign_test,
        })
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    hands: u32,
    wins: u32,
    total_conceded: u64,
    total_gained: u64,
    per_hand_margin: Vec<f64>,
    illegal_moves: u32,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            hands: 0,
            wins: 0,
            total_conceded: 0,
            total_gained: 0,
            per_hand_margin: Vec::new(),
            illegal_moves: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record_hand(
        &mut self,
        conceded: u32,
        gained: u32,
        won: bool,
        illegal_moves: u32,
        metrics: &DecisionSummary,
    ) {
        self.hands += 1;
        if won {
            self.wins += 1;
        }
        self.total_conceded += u64::from(conceded);
        self.total_gained += u64::from(gained);
        self.per_hand_margin
            .push(f64::from(gained) - f64::from(conceded));
        self.illegal_moves += illegal_moves;
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let hands = f64::from(self.hands.max(1));
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            avg_conceded: self.total_conceded as f64 / hands,
            avg_margin: self.per_hand_margin.iter().sum::<f64>() / hands,
            margin_ci95: confidence_interval(&self.per_hand_margin),
            name: self.name,
            kind: self.kind,
            hands: self.hands as usize,
            wins: self.wins as usize,
            illegal_moves: self.illegal_moves,
            average_ms_per_decision: avg_latency,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub hands: usize,
    pub wins: usize,
    pub avg_conceded: f64,
    /// Opponent's conceded points minus own, per hand.
    pub avg_margin: f64,
    pub margin_ci95: (f64, f64),
    pub illegal_moves: u32,
    pub average_ms_per_decision: f64,
}

impl AgentReport {
    pub fn win_rate(&self) -> f64 {
        if self.hands == 0 {
            0.0
        } else {
            self.wins as f64 / self.hands as f64
        }
    }
}

/// Two-sided binomial sign test on decisive hands: does one agent win more
/// often than a fair coin would allow?
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SignTest {
    pub decisive: u64,
    pub p_value: f64,
}

impl SignTest {
    fn between(a: &AgentReport, b: &AgentReport) -> Result<Self, AnalyticsError> {
        let (wins_a, wins_b) = (a.wins as u64, b.wins as u64);
        let decisive = wins_a + wins_b;
        if decisive == 0 {
            return Ok(Self {
                decisive,
                p_value: 1.0,
            });
        }

        let binomial =
            Binomial::new(0.5, decisive).map_err(|err| AnalyticsError::Stats(err.to_string()))?;
        let tail = binomial.cdf(wins_a.min(wins_b));
        Ok(Self {
            decisive,
            p_value: (2.0 * tail).clamp(0.0, 1.0),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub agents: Vec<AgentReport>,
    pub draws: usize,
    pub sign_test: Option<SignTest>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Match Summary\n\n");
        rows.push_str("| Agent | Kind | Hands | Win % | Avg conceded | Avg margin | 95% CI | Avg ms/decision | Illegal |\n");
        rows.push_str("|-------|------|-------|-------|--------------|------------|--------|-----------------|---------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {hands} | {win:.1}% | {conceded:.3} | {margin:+.3} | [{ci_low:.3}, {ci_high:.3}] | {latency:.2} | {illegal} |\n",
                name = agent.name,
                kind = agent.kind,
                hands = agent.hands,
                win = agent.win_rate() * 100.0,
                conceded = agent.avg_conceded,
                margin = agent.avg_margin,
                ci_low = agent.margin_ci95.0,
                ci_high = agent.margin_ci95.1,
                latency = agent.average_ms_per_decision,
                illegal = agent.illegal_moves,
            ));
        }

        rows.push_str(&format!("\nDrawn hands: {}\n", self.draws));
        if let Some(test) = self.sign_test {
            rows.push_str(&format!(
                "Sign test over {} decisive hands: p = {:.4}\n",
                test.decisive, test.p_value
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
