#![deny(warnings)]
pub mod game;
pub mod model;

pub use game::env::{ACTION_COUNT, Step, StepInfo, StepOutcome, WattenEnv};
pub use game::observation::{OBSERVATION_LEN, Observation, ObservationBuilder};
pub use game::snapshot::RoundSnapshot;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "watten"
    }

    pub const fn variant() -> &'static str {
        "two-player, 32 cards"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "watten");
        assert_eq!(AppInfo::variant(), "two-player, 32 cards");
        assert!(!AppInfo::version().is_empty());
    }
}
