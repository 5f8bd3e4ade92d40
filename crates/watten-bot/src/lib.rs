pub mod bot;
pub mod policy;

pub use bot::{BotKind, UnseenTracker};
pub use policy::{HeuristicPolicy, Policy, PolicyContext, RandomPolicy, RolloutPolicy};
