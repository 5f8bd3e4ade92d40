use crate::model::card::{CARD_COUNT, Card};
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{PlayerState, Seat};
use crate::model::trick::{Trick, TrickError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const HAND_SIZE: usize = 5;
pub const TRICKS_TO_WIN: u8 = 2;
/// Points conceded by the loser of every trick.
pub const TRICK_POINTS: u32 = 1;
/// Extra points conceded by the player who loses the round.
pub const ROUND_BONUS: u32 = 5;
const MAX_TRICKS: u8 = 3;

/// Table state for one deal.
///
/// The seat to act is derived from the open trick (its leader when empty,
/// otherwise the other seat) and points are replayed from the trick history,
/// so a snapshot can never disagree with itself about either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    deck: Vec<Card>,
    players: [PlayerState; 2],
    current_trick: Trick,
    trick_history: Vec<Trick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingLead,
    AwaitingFollow,
    RoundOver,
}

impl RoundState {
    /// Deals five cards to each seat from the end of `deck`, first seat first.
    pub fn deal(deck: Deck) -> Self {
        let mut remainder = deck.into_cards();
        let mut players: [PlayerState; 2] = Default::default();
        for player in players.iter_mut() {
            let split = remainder.len().saturating_sub(HAND_SIZE);
            player.deal_hand(remainder.split_off(split));
        }

        Self {
            deck: remainder,
            players,
            current_trick: Trick::new(Seat::First),
            trick_history: Vec::new(),
        }
    }

    /// Builds a fresh round around the given hands, first seat to lead. Every
    /// card not in a hand goes to the undealt remainder.
    pub fn from_hands(hands: [Hand; 2]) -> Result<Self, StateError> {
        let deck = Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| !hands.iter().any(|hand| hand.contains(*card)))
            .collect();
        let [first, second] = hands;
        Self::from_parts(
            deck,
            [PlayerState::with_hand(first, 0), PlayerState::with_hand(second, 0)],
            Trick::new(Seat::First),
            Vec::new(),
        )
    }

    pub fn from_parts(
        deck: Vec<Card>,
        players: [PlayerState; 2],
        current_trick: Trick,
        trick_history: Vec<Trick>,
    ) -> Result<Self, StateError> {
        let state = Self {
            deck,
            players,
            current_trick,
            trick_history,
        };
        state.validate()?;
        Ok(state)
    }

    pub fn deck_remainder(&self) -> &[Card] {
        &self.deck
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        &self.players[seat.index()]
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        self.players[seat.index()].hand()
    }

    pub fn tricks_won(&self, seat: Seat) -> u8 {
        self.players[seat.index()].tricks_won()
    }

    /// Points conceded so far by each seat, replayed from the trick history.
    pub fn points(&self) -> [u32; 2] {
        let mut tricks = [0u8; 2];
        let mut points = [0u32; 2];
        for winner in self.trick_history.iter().filter_map(Trick::winner) {
            tricks[winner.index()] += 1;
            let conceded = trick_points(tricks[winner.index()]);
            points[winner.other().index()] += conceded;
        }
        points
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn tricks_completed(&self) -> usize {
        self.trick_history.len()
    }

    pub fn current_player(&self) -> Seat {
        self.current_trick
            .expected_seat()
            .unwrap_or(self.current_trick.leader())
    }

    /// The card led into the open trick, if any.
    pub fn table_card(&self) -> Option<Card> {
        self.current_trick.lead_card()
    }

    /// Most recently completed trick as (lead, follow); presentation only.
    pub fn last_trick(&self) -> Option<(Card, Card)> {
        let trick = self.trick_history.last()?;
        Some((trick.lead_card()?, trick.follow_card()?))
    }

    pub fn is_over(&self) -> bool {
        self.players
            .iter()
            .any(|player| player.tricks_won() >= TRICKS_TO_WIN)
            || self.players.iter().all(|player| player.hand().is_empty())
    }

    pub fn phase(&self) -> RoundPhase {
        if self.is_over() {
            RoundPhase::RoundOver
        } else if self.current_trick.is_empty() {
            RoundPhase::AwaitingLead
        } else {
            RoundPhase::AwaitingFollow
        }
    }

    /// The seat that took more tricks, once the round is over.
    pub fn winner(&self) -> Option<Seat> {
        if !self.is_over() {
            return None;
        }
        let first = self.tricks_won(Seat::First);
        let second = self.tricks_won(Seat::Second);
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => Some(Seat::First),
            std::cmp::Ordering::Less => Some(Seat::Second),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn legal_cards(&self) -> Vec<Card> {
        if self.is_over() {
            return Vec::new();
        }
        self.hand(self.current_player()).cards().to_vec()
    }

    pub fn play_card(&mut self, seat: Seat, card: Card) -> Result<PlayOutcome, PlayError> {
        if self.is_over() {
            return Err(PlayError::RoundOver);
        }

        let expected = self.current_player();
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        if !self.players[seat.index()].hand().contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }

        self.current_trick.play(seat, card).map_err(PlayError::Trick)?;
        self.players[seat.index()].remove_from_hand(card);

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Led);
        }

        let Some(winner) = self.current_trick.winner() else {
            return Err(PlayError::Trick(TrickError::TrickComplete));
        };
        let loser = winner.other();

        self.players[winner.index()].increment_tricks();
        let mut points = [0u32; 2];
        points[loser.index()] = trick_points(self.players[winner.index()].tricks_won());

        let finished = std::mem::replace(&mut self.current_trick, Trick::new(winner));
        self.trick_history.push(finished);

        debug_assert!(self.validate().is_ok(), "round invariants broken after trick");

        Ok(PlayOutcome::TrickCompleted {
            winner,
            points,
            round_over: self.is_over(),
        })
    }

    /// Checks that every card is in exactly one place, that the trick
    /// counters agree with the trick history, and that the history is a
    /// sequence of plays the rules could have produced.
    pub fn validate(&self) -> Result<(), StateError> {
        for seat in Seat::BOTH {
            let player = self.player(seat);
            let dealt = player.hand().len()
                + self.trick_history.len()
                + self
                    .current_trick
                    .plays()
                    .iter()
                    .filter(|play| play.seat == seat)
                    .count();
            if dealt > HAND_SIZE {
                return Err(StateError::HandTooLarge { seat, size: dealt });
            }
            if player.tricks_won() > MAX_TRICKS {
                return Err(StateError::TricksExceeded {
                    seat,
                    tricks: player.tricks_won(),
                });
            }
            let recorded = self
                .trick_history
                .iter()
                .filter(|trick| trick.winner() == Some(seat))
                .count();
            if recorded != usize::from(player.tricks_won()) {
                return Err(StateError::TrickCountMismatch {
                    seat,
                    counted: player.tricks_won(),
                    recorded,
                });
            }
        }

        if self.current_trick.plays().len() >= 2 || !self.current_trick.in_turn_order() {
            return Err(StateError::UnresolvedTrick);
        }
        if self
            .trick_history
            .iter()
            .any(|trick| trick.plays().len() != 2 || !trick.in_turn_order())
        {
            return Err(StateError::IncompleteHistory);
        }
        self.validate_lead_order()?;
        self.validate_hand_balance()?;

        let mut seen = [false; CARD_COUNT];
        let located = self
            .players
            .iter()
            .flat_map(|player| player.hand().iter().copied())
            .chain(self.deck.iter().copied())
            .chain(self.current_trick.cards())
            .chain(self.trick_history.iter().flat_map(|trick| trick.cards()));
        for card in located {
            let slot = &mut seen[card.id()];
            if *slot {
                return Err(StateError::DuplicateCard(card));
            }
            *slot = true;
        }
        if let Some(missing) = seen.iter().position(|present| !present) {
            // position < CARD_COUNT, so from_id always succeeds here
            if let Some(card) = Card::from_id(missing) {
                return Err(StateError::MissingCard(card));
            }
        }

        Ok(())
    }

    /// Walks the history from the opening lead: each trick is led by the
    /// previous winner and nothing is played once a seat has two tricks.
    fn validate_lead_order(&self) -> Result<(), StateError> {
        let mut leader = Seat::First;
        let mut tricks = [0u8; 2];
        for trick in &self.trick_history {
            if tricks.iter().any(|&won| won >= TRICKS_TO_WIN) {
                return Err(StateError::PlayAfterRoundOver);
            }
            if trick.leader() != leader {
                return Err(StateError::WrongLeader {
                    expected: leader,
                    found: trick.leader(),
                });
            }
            if let Some(winner) = trick.winner() {
                tricks[winner.index()] += 1;
                leader = winner;
            }
        }

        if self.current_trick.leader() != leader {
            return Err(StateError::WrongLeader {
                expected: leader,
                found: self.current_trick.leader(),
            });
        }
        if !self.current_trick.is_empty() && tricks.iter().any(|&won| won >= TRICKS_TO_WIN) {
            return Err(StateError::PlayAfterRoundOver);
        }
        Ok(())
    }

    /// Both seats play one card per trick, so hands stay level except for
    /// the card the leader has already put on the table.
    fn validate_hand_balance(&self) -> Result<(), StateError> {
        let leader = self.current_trick.leader();
        let led = usize::from(!self.current_trick.is_empty());
        let leader_holds = self.hand(leader).len();
        let follower_holds = self.hand(leader.other()).len();
        if leader_holds + led != follower_holds {
            return Err(StateError::UnbalancedHands {
                first: self.hand(Seat::First).len(),
                second: self.hand(Seat::Second).len(),
            });
        }
        Ok(())
    }
}

/// Points the loser concedes for a trick that gave the winner `tricks_won`.
fn trick_points(tricks_won: u8) -> u32 {
    if tricks_won == TRICKS_TO_WIN {
        TRICK_POINTS + ROUND_BONUS
    } else {
        TRICK_POINTS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Led,
    TrickCompleted {
        winner: Seat,
        points: [u32; 2],
        round_over: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    RoundOver,
    CardNotInHand(Card),
    OutOfTurn { expected: Seat, actual: Seat },
    Trick(TrickError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::RoundOver => write!(f, "round is already over"),
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in the player's hand"),
            PlayError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} seat to play but got {actual}")
            }
            PlayError::Trick(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {}

/// A round state that breaks card conservation or its own counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    DuplicateCard(Card),
    MissingCard(Card),
    HandTooLarge { seat: Seat, size: usize },
    TricksExceeded { seat: Seat, tricks: u8 },
    TrickCountMismatch { seat: Seat, counted: u8, recorded: usize },
    UnresolvedTrick,
    IncompleteHistory,
    WrongLeader { expected: Seat, found: Seat },
    UnbalancedHands { first: usize, second: usize },
    PlayAfterRoundOver,
    Serialization(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::DuplicateCard(card) => write!(f, "{card} appears more than once"),
            StateError::MissingCard(card) => write!(f, "{card} is not accounted for"),
            StateError::HandTooLarge { seat, size } => {
                write!(f, "{seat} seat accounts for {size} dealt cards (max {HAND_SIZE})")
            }
            StateError::TricksExceeded { seat, tricks } => {
                write!(f, "{seat} seat has {tricks} tricks (max {MAX_TRICKS})")
            }
            StateError::TrickCountMismatch {
                seat,
                counted,
                recorded,
            } => write!(
                f,
                "{seat} seat counts {counted} tricks but history records {recorded}"
            ),
            StateError::UnresolvedTrick => write!(f, "open trick is full or out of turn order"),
            StateError::IncompleteHistory => {
                write!(f, "trick history contains a malformed trick")
            }
            StateError::WrongLeader { expected, found } => {
                write!(f, "trick led by {found} seat but {expected} seat had the lead")
            }
            StateError::UnbalancedHands { first, second } => write!(
                f,
                "hands of {first} and {second} cards cannot arise from alternating play"
            ),
            StateError::PlayAfterRoundOver => write!(f, "cards were played after the round ended"),
            StateError::Serialization(message) => write!(f, "invalid snapshot: {message}"),
        }
    }
}

impl std::error::Error for StateError {}
