use crate::model::card::Card;
use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Seat {
    First = 0,
    Second = 1,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::First => "first",
            Seat::Second => "second",
        };
        f.write_str(label)
    }
}

/// Per-player round state: the held cards and the tricks taken so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    hand: Hand,
    tricks_won: u8,
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hand(hand: Hand, tricks_won: u8) -> Self {
        Self { hand, tricks_won }
    }

    pub fn reset(&mut self) {
        self.hand.clear();
        self.tricks_won = 0;
    }

    pub fn deal_hand(&mut self, cards: Vec<Card>) {
        self.hand = Hand::with_cards(cards);
    }

    pub fn remove_from_hand(&mut self, card: Card) -> bool {
        self.hand.remove(card)
    }

    /// Uncapped; the round decides when enough tricks have been taken.
    pub fn increment_tricks(&mut self) {
        self.tricks_won = self.tricks_won.saturating_add(1);
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn tricks_won(&self) -> u8 {
        self.tricks_won
    }

    pub fn snapshot(&self) -> PlayerState {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: &PlayerState) {
        self.clone_from(snapshot);
    }
}
