use crate::model::card::Card;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};
use std::fmt;

const HERZ_KING_STRENGTH: u8 = 18;
const SCHELLEN_SEVEN_STRENGTH: u8 = 17;
const EICHEL_SEVEN_STRENGTH: u8 = 16;
const TRUMP_BONUS: u8 = 9;
const LED_SUIT_BONUS: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrickResult {
    LeadWins,
    FollowWins,
}

/// Strength of `card` when `led` is the suit of the card that opened the trick.
///
/// The three special cards outrank everything regardless of the led suit,
/// Herz is always trump, cards of the led suit follow, and anything else
/// scores zero and can never take the trick.
pub fn strength(card: Card, led: Suit) -> u8 {
    if card == Card::HERZ_KING {
        HERZ_KING_STRENGTH
    } else if card == Card::SCHELLEN_SEVEN {
        SCHELLEN_SEVEN_STRENGTH
    } else if card == Card::EICHEL_SEVEN {
        EICHEL_SEVEN_STRENGTH
    } else if card.suit.is_trump() {
        card.rank.base_strength() + TRUMP_BONUS
    } else if card.suit == led {
        card.rank.base_strength() + LED_SUIT_BONUS
    } else {
        0
    }
}

/// Both cards are scored against the lead card's suit; ties go to the lead.
pub fn resolve(lead: Card, follow: Card) -> TrickResult {
    let led = lead.suit;
    if strength(lead, led) >= strength(follow, led) {
        TrickResult::LeadWins
    } else {
        TrickResult::FollowWins
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    leader: Seat,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: Seat, actual: Seat },
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} seat to play next but got {actual}")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: Seat) -> Self {
        Self {
            leader,
            plays: Vec::with_capacity(2),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 2
    }

    pub fn lead_card(&self) -> Option<Card> {
        self.plays.first().map(|play| play.card)
    }

    pub fn follow_card(&self) -> Option<Card> {
        self.plays.get(1).map(|play| play.card)
    }

    pub fn expected_seat(&self) -> Option<Seat> {
        match self.plays.len() {
            0 => Some(self.leader),
            1 => Some(self.leader.other()),
            _ => None,
        }
    }

    /// True when the plays alternate seats starting from the leader.
    pub fn in_turn_order(&self) -> bool {
        self.plays
            .iter()
            .zip([self.leader, self.leader.other()])
            .all(|(play, seat)| play.seat == seat)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        let expected = self.expected_seat().ok_or(TrickError::TrickComplete)?;
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }
        self.plays.push(Play { seat, card });
        Ok(())
    }

    pub fn result(&self) -> Option<TrickResult> {
        match self.plays.as_slice() {
            [lead, follow] => Some(resolve(lead.card, follow.card)),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<Seat> {
        self.result().map(|result| match result {
            TrickResult::LeadWins => self.leader,
            TrickResult::FollowWins => self.leader.other(),
        })
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }
}
