use super::UnseenTracker;
use watten_core::model::card::Card;
use watten_core::model::trick::{TrickResult, resolve, strength};

/// Card-choice rules shared by the heuristic policy and the rollout
/// playouts.
pub struct PlayPlanner;

impl PlayPlanner {
    /// Strength a card carries when it opens a trick.
    pub fn lead_strength(card: Card) -> u8 {
        strength(card, card.suit)
    }

    /// True when no unseen card could take the trick if `card` is led.
    pub fn is_safe_lead(card: Card, tracker: &UnseenTracker) -> bool {
        tracker
            .unseen_cards()
            .into_iter()
            .all(|other| resolve(card, other) == TrickResult::LeadWins)
    }

    /// Lowest card that still takes the trick led with `lead`.
    pub fn cheapest_winner(lead: Card, legal: &[Card]) -> Option<Card> {
        legal
            .iter()
            .copied()
            .filter(|&card| resolve(lead, card) == TrickResult::FollowWins)
            .min_by_key(|&card| (strength(card, lead.suit), Self::lead_strength(card), card.id()))
    }

    /// Card worth the least when leading later on.
    pub fn weakest(legal: &[Card]) -> Option<Card> {
        legal
            .iter()
            .copied()
            .min_by_key(|&card| (Self::lead_strength(card), card.id()))
    }

    /// Follow: win as cheaply as possible, otherwise throw the weakest card.
    /// Lead: cash the weakest guaranteed winner, otherwise lead the weakest card.
    pub fn choose(
        table: Option<Card>,
        legal: &[Card],
        tracker: &UnseenTracker,
    ) -> Option<(Card, &'static str)> {
        match table {
            Some(lead) => Self::cheapest_winner(lead, legal)
                .map(|card| (card, "cheapest_winner"))
                .or_else(|| Self::weakest(legal).map(|card| (card, "discard_weakest"))),
            None => {
                let safe: Vec<Card> = legal
                    .iter()
                    .copied()
                    .filter(|&card| Self::is_safe_lead(card, tracker))
                    .collect();
                Self::weakest(&safe)
                    .map(|card| (card, "safe_lead"))
                    .or_else(|| Self::weakest(legal).map(|card| (card, "lead_weakest")))
            }
        }
    }
}
