use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Number of distinct cards, and therefore of actions.
pub const CARD_COUNT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const HERZ_KING: Card = Card::new(Suit::Herz, Rank::King);
    pub const SCHELLEN_SEVEN: Card = Card::new(Suit::Schellen, Rank::Seven);
    pub const EICHEL_SEVEN: Card = Card::new(Suit::Eichel, Rank::Seven);

    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Stable identity in `0..32`: suit-major, rank-minor.
    pub const fn id(self) -> usize {
        self.suit.index() * Rank::ALL.len() + self.rank.index()
    }

    pub const fn from_id(id: usize) -> Option<Self> {
        if id >= CARD_COUNT {
            return None;
        }
        let ranks = Rank::ALL.len();
        match (Suit::from_index(id / ranks), Rank::from_index(id % ranks)) {
            (Some(suit), Some(rank)) => Some(Card::new(suit, rank)),
            _ => None,
        }
    }

    /// Image asset stem used by presentation layers, e.g. `HK` or `S10`.
    pub fn asset_name(self) -> String {
        format!("{}{}", self.suit.letter(), self.rank.code())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card code '{}'", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let suit = chars
            .next()
            .and_then(Suit::from_letter)
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let rank = Rank::from_code(chars.as_str()).ok_or_else(|| ParseCardError(s.to_string()))?;
        Ok(Card::new(suit, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::{CARD_COUNT, Card, Rank, Suit};

    #[test]
    fn ids_are_suit_major() {
        assert_eq!(Card::new(Suit::Eichel, Rank::Ace).id(), 0);
        assert_eq!(Card::new(Suit::Eichel, Rank::Seven).id(), 7);
        assert_eq!(Card::new(Suit::Gruen, Rank::Ace).id(), 8);
        assert_eq!(Card::HERZ_KING.id(), 17);
        assert_eq!(Card::new(Suit::Schellen, Rank::Seven).id(), 31);
    }

    #[test]
    fn from_id_inverts_id() {
        for id in 0..CARD_COUNT {
            let card = Card::from_id(id).unwrap();
            assert_eq!(card.id(), id);
        }
        assert_eq!(Card::from_id(CARD_COUNT), None);
    }

    #[test]
    fn asset_names_follow_suit_letter_and_rank_code() {
        assert_eq!(Card::HERZ_KING.asset_name(), "HK");
        assert_eq!(Card::new(Suit::Schellen, Rank::Ten).asset_name(), "S10");
        assert_eq!(Card::new(Suit::Gruen, Rank::Unter).asset_name(), "GU");
        assert_eq!(Card::EICHEL_SEVEN.to_string(), "E7");
    }

    #[test]
    fn parses_codes() {
        assert_eq!("HK".parse::<Card>(), Ok(Card::HERZ_KING));
        assert_eq!("s10".parse::<Card>(), Ok(Card::new(Suit::Schellen, Rank::Ten)));
        assert!("X7".parse::<Card>().is_err());
        assert!("H".parse::<Card>().is_err());
    }
}
