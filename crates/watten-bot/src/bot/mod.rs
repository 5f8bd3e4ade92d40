mod play;
mod tracker;

pub use play::PlayPlanner;
pub use tracker::UnseenTracker;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotKind {
    Random,
    #[default]
    Heuristic,
    Rollout,
}

impl BotKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" | "uniform" => Some(BotKind::Random),
            "heuristic" | "greedy" => Some(BotKind::Heuristic),
            "rollout" | "search" => Some(BotKind::Rollout),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotKind::Random => "random",
            BotKind::Heuristic => "heuristic",
            BotKind::Rollout => "rollout",
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
