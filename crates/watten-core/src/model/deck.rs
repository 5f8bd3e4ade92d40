use crate::model::card::{CARD_COUNT, Card};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 32 cards in action-index order.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(CARD_COUNT);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ALL.iter().copied() {
                cards.push(Card::new(suit, rank));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::Deck;
    use crate::model::card::{CARD_COUNT, Card};
    use std::collections::HashSet;

    #[test]
    fn standard_deck_has_32_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.cards().len(), CARD_COUNT);
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), CARD_COUNT);
    }

    #[test]
    fn standard_order_matches_card_ids() {
        for (position, card) in Deck::standard().cards().iter().enumerate() {
            assert_eq!(card.id(), position);
        }
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let shuffled: HashSet<Card> = Deck::shuffled_with_seed(9).cards().iter().copied().collect();
        let standard: HashSet<Card> = Deck::standard().cards().iter().copied().collect();
        assert_eq!(shuffled, standard);
    }
}
