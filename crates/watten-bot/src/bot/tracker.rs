use watten_core::model::card::{CARD_COUNT, Card};
use watten_core::model::player::Seat;
use watten_core::model::round::RoundState;

/// Cards a seat has not seen: everything outside its own hand that has not
/// been played face up. These are split between the opponent's hand and the
/// undealt remainder in some unknown way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseenTracker {
    unseen: [bool; CARD_COUNT],
}

impl Default for UnseenTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UnseenTracker {
    pub fn new() -> Self {
        Self {
            unseen: [true; CARD_COUNT],
        }
    }

    pub fn for_seat(round: &RoundState, seat: Seat) -> Self {
        let mut tracker = Self::new();
        tracker.reset_for_round(round, seat);
        tracker
    }

    /// Rebuild from what `seat` can see: its hand, the open trick and
    /// every completed trick.
    pub fn reset_for_round(&mut self, round: &RoundState, seat: Seat) {
        self.unseen = [true; CARD_COUNT];
        let visible = round
            .hand(seat)
            .iter()
            .copied()
            .chain(round.current_trick().cards())
            .chain(round.trick_history().iter().flat_map(|trick| trick.cards()));
        for card in visible {
            self.unseen[card.id()] = false;
        }
    }

    pub fn note_card_played(&mut self, card: Card) {
        self.unseen[card.id()] = false;
    }

    pub fn is_unseen(&self, card: Card) -> bool {
        self.unseen[card.id()]
    }

    pub fn unseen_count(&self) -> usize {
        self.unseen.iter().filter(|&&flag| flag).count()
    }

    /// Unseen cards in id order.
    pub fn unseen_cards(&self) -> Vec<Card> {
        self.unseen
            .iter()
            .enumerate()
            .filter(|(_, flag)| **flag)
            .filter_map(|(id, _)| Card::from_id(id))
            .collect()
    }
}
