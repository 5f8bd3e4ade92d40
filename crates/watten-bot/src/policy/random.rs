use super::{Policy, PolicyContext};
use crate::bot::BotKind;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use watten_core::model::card::Card;

/// Uniformly random legal card; a baseline opponent.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Card {
        let legal = ctx.legal_cards();
        match legal.choose(&mut self.rng) {
            Some(card) => *card,
            // Round is over; hand back anything, the env will reject it.
            None => ctx.hand.cards().first().copied().unwrap_or(Card::HERZ_KING),
        }
    }

    fn kind(&self) -> BotKind {
        BotKind::Random
    }
}
