use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Ace = 0,
    King = 1,
    Ober = 2,
    Unter = 3,
    Ten = 4,
    Nine = 5,
    Eight = 6,
    Seven = 7,
}

impl Rank {
    /// Canonical order; drives the rank-minor half of the action index.
    /// This is NOT the strength order, see [`Rank::base_strength`].
    pub const ALL: [Rank; 8] = [
        Rank::Ace,
        Rank::King,
        Rank::Ober,
        Rank::Unter,
        Rank::Ten,
        Rank::Nine,
        Rank::Eight,
        Rank::Seven,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Rank::Ace),
            1 => Some(Rank::King),
            2 => Some(Rank::Ober),
            3 => Some(Rank::Unter),
            4 => Some(Rank::Ten),
            5 => Some(Rank::Nine),
            6 => Some(Rank::Eight),
            7 => Some(Rank::Seven),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Strength before trump and led-suit adjustments:
    /// Seven < Eight < Nine < Ten < Unter < Ober < King < Ace.
    pub const fn base_strength(self) -> u8 {
        match self {
            Rank::Seven => 0,
            Rank::Eight => 1,
            Rank::Nine => 2,
            Rank::Ten => 3,
            Rank::Unter => 4,
            Rank::Ober => 5,
            Rank::King => 6,
            Rank::Ace => 7,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::King => "K",
            Rank::Ober => "O",
            Rank::Unter => "U",
            Rank::Ten => "10",
            Rank::Nine => "9",
            Rank::Eight => "8",
            Rank::Seven => "7",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Rank::ALL
            .iter()
            .copied()
            .find(|rank| rank.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn base_strength_is_independent_of_declaration_order() {
        let mut by_strength = Rank::ALL.to_vec();
        by_strength.sort_by_key(|rank| rank.base_strength());
        assert_eq!(
            by_strength,
            vec![
                Rank::Seven,
                Rank::Eight,
                Rank::Nine,
                Rank::Ten,
                Rank::Unter,
                Rank::Ober,
                Rank::King,
                Rank::Ace,
            ]
        );
    }

    #[test]
    fn from_index_maps() {
        assert_eq!(Rank::from_index(3), Some(Rank::Unter));
        assert_eq!(Rank::from_index(8), None);
    }

    #[test]
    fn codes_match_asset_names() {
        assert_eq!(Rank::Ober.to_string(), "O");
        assert_eq!(Rank::Ten.to_string(), "10");
        assert_eq!(Rank::from_code("10"), Some(Rank::Ten));
        assert_eq!(Rank::from_code("u"), Some(Rank::Unter));
        assert_eq!(Rank::from_code("J"), None);
    }
}
