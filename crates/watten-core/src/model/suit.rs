use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Eichel = 0,
    Gruen = 1,
    Herz = 2,
    Schellen = 3,
}

impl Suit {
    /// Canonical order; drives the suit-major half of the action index.
    pub const ALL: [Suit; 4] = [Suit::Eichel, Suit::Gruen, Suit::Herz, Suit::Schellen];

    /// The permanent trump suit.
    pub const TRUMP: Suit = Suit::Herz;

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Eichel),
            1 => Some(Suit::Gruen),
            2 => Some(Suit::Herz),
            3 => Some(Suit::Schellen),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_trump(self) -> bool {
        matches!(self, Suit::Herz)
    }

    pub const fn letter(self) -> char {
        match self {
            Suit::Eichel => 'E',
            Suit::Gruen => 'G',
            Suit::Herz => 'H',
            Suit::Schellen => 'S',
        }
    }

    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'E' | 'e' => Some(Suit::Eichel),
            'G' | 'g' => Some(Suit::Gruen),
            'H' | 'h' => Some(Suit::Herz),
            'S' | 's' => Some(Suit::Schellen),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
