mod heuristic;
mod random;
mod rollout;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;
pub use rollout::RolloutPolicy;

use crate::bot::{BotKind, UnseenTracker};
use watten_core::model::card::Card;
use watten_core::model::hand::Hand;
use watten_core::model::player::Seat;
use watten_core::model::round::RoundState;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub hand: &'a Hand,
    pub round: &'a RoundState,
    pub tracker: &'a UnseenTracker,
}

impl<'a> PolicyContext<'a> {
    /// Context for the seat due to act in `round`.
    pub fn new(round: &'a RoundState, tracker: &'a UnseenTracker) -> Self {
        let seat = round.current_player();
        Self {
            seat,
            hand: round.hand(seat),
            round,
            tracker,
        }
    }

    pub fn table_card(&self) -> Option<Card> {
        self.round.table_card()
    }

    pub fn legal_cards(&self) -> Vec<Card> {
        self.round.legal_cards()
    }
}

/// Interface shared by every bot that can sit at the table.
pub trait Policy: Send {
    /// Choose the card to play. Only called while the round is live and the
    /// context seat is due to act.
    fn choose_play(&mut self, ctx: &PolicyContext) -> Card;

    fn kind(&self) -> BotKind;
}
