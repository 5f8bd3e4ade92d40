use crate::model::card::{CARD_COUNT, Card};
use crate::model::player::Seat;
use crate::model::rank::Rank;
use crate::model::round::RoundState;
use crate::model::suit::Suit;

const SUITS: usize = Suit::ALL.len();
const RANKS: usize = Rank::ALL.len();
const HAND_CHANNEL: usize = 0;
const TABLE_CHANNEL: usize = 1;

/// Flat length of [`Observation::as_array`]: hand bits, table bits, trick bits.
pub const OBSERVATION_LEN: usize = CARD_COUNT * 2 + 4;

/// Fixed-shape view of the table from the acting player's seat.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// `[suit][rank][channel]`; channel 0 is "in my hand", channel 1 is
    /// "currently on the table".
    pub cards: [[[f32; 2]; RANKS]; SUITS],
    /// Two bits for my tricks, then two for the opponent's.
    pub tricks: [f32; 4],
}

impl Observation {
    pub fn card_channels(&self, card: Card) -> [f32; 2] {
        self.cards[card.suit.index()][card.rank.index()]
    }

    /// Flatten into the legacy vector layout: 32 hand bits by card id,
    /// 32 table bits by card id, then the four trick bits.
    pub fn as_array(&self) -> [f32; OBSERVATION_LEN] {
        let mut arr = [0.0f32; OBSERVATION_LEN];
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let card = Card::new(suit, rank);
                let [in_hand, on_table] = self.card_channels(card);
                arr[card.id()] = in_hand;
                arr[CARD_COUNT + card.id()] = on_table;
            }
        }
        arr[CARD_COUNT * 2..].copy_from_slice(&self.tricks);
        arr
    }
}

/// Builds observations from round state. Stateless; calling it never
/// touches the round.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationBuilder;

impl ObservationBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Observation for whichever seat is due to act.
    pub fn build(&self, round: &RoundState) -> Observation {
        self.build_for(round, round.current_player())
    }

    pub fn build_for(&self, round: &RoundState, seat: Seat) -> Observation {
        let mut cards = [[[0.0f32; 2]; RANKS]; SUITS];
        for card in round.hand(seat).iter() {
            cards[card.suit.index()][card.rank.index()][HAND_CHANNEL] = 1.0;
        }
        if let Some(card) = round.table_card() {
            cards[card.suit.index()][card.rank.index()][TABLE_CHANNEL] = 1.0;
        }

        let mine = encode_tricks(round.tricks_won(seat));
        let theirs = encode_tricks(round.tricks_won(seat.other()));
        Observation {
            cards,
            tricks: [mine[0], mine[1], theirs[0], theirs[1]],
        }
    }
}

/// 0 → (0,0), 1 → (1,0), 2 → (0,1), 3 → (1,1); higher counts saturate.
fn encode_tricks(tricks: u8) -> [f32; 2] {
    let tricks = tricks.min(3);
    [f32::from(tricks & 1), f32::from((tricks >> 1) & 1)]
}

#[cfg(test)]
mod tests {
    use super::{OBSERVATION_LEN, ObservationBuilder, encode_tricks};
    use crate::model::card::{CARD_COUNT, Card};
    use crate::model::hand::Hand;
    use crate::model::player::Seat;
    use crate::model::rank::Rank;
    use crate::model::round::RoundState;
    use crate::model::suit::Suit;

    fn round() -> RoundState {
        let first = Hand::with_cards(vec![Card::HERZ_KING, Card::new(Suit::Gruen, Rank::Ten)]);
        let second = Hand::with_cards(vec![
            Card::EICHEL_SEVEN,
            Card::new(Suit::Schellen, Rank::Ace),
        ]);
        RoundState::from_hands([first, second]).unwrap()
    }

    #[test]
    fn trick_bits_follow_two_bit_encoding() {
        assert_eq!(encode_tricks(0), [0.0, 0.0]);
        assert_eq!(encode_tricks(1), [1.0, 0.0]);
        assert_eq!(encode_tricks(2), [0.0, 1.0]);
        assert_eq!(encode_tricks(3), [1.0, 1.0]);
    }

    #[test]
    fn hand_channel_marks_only_my_cards() {
        let obs = ObservationBuilder::new().build(&round());
        assert_eq!(obs.card_channels(Card::HERZ_KING), [1.0, 0.0]);
        assert_eq!(obs.card_channels(Card::new(Suit::Gruen, Rank::Ten)), [1.0, 0.0]);
        assert_eq!(obs.card_channels(Card::EICHEL_SEVEN), [0.0, 0.0]);
        let held: f32 = obs.cards.iter().flatten().map(|c| c[0]).sum();
        assert_eq!(held, 2.0);
    }

    #[test]
    fn table_channel_marks_led_card_for_follower() {
        let mut round = round();
        round.play_card(Seat::First, Card::HERZ_KING).unwrap();
        let obs = ObservationBuilder::new().build(&round);
        assert_eq!(obs.card_channels(Card::HERZ_KING), [0.0, 1.0]);
        assert_eq!(obs.card_channels(Card::EICHEL_SEVEN), [1.0, 0.0]);
    }

    #[test]
    fn flat_layout_matches_card_ids() {
        let mut round = round();
        round.play_card(Seat::First, Card::HERZ_KING).unwrap();
        round.play_card(Seat::Second, Card::EICHEL_SEVEN).unwrap();

        let arr = ObservationBuilder::new().build(&round).as_array();
        assert_eq!(arr.len(), OBSERVATION_LEN);
        assert_eq!(arr[Card::new(Suit::Gruen, Rank::Ten).id()], 1.0);
        assert_eq!(arr[Card::HERZ_KING.id()], 0.0);
        assert!(arr[CARD_COUNT..CARD_COUNT * 2].iter().all(|&bit| bit == 0.0));
        assert_eq!(&arr[CARD_COUNT * 2..], &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn opponent_view_swaps_trick_bits() {
        let mut round = round();
        round.play_card(Seat::First, Card::HERZ_KING).unwrap();
        round.play_card(Seat::Second, Card::EICHEL_SEVEN).unwrap();
        let obs = ObservationBuilder::new().build_for(&round, Seat::Second);
        assert_eq!(obs.tricks, [0.0, 0.0, 1.0, 0.0]);
    }
}
