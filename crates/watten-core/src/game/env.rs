use crate::game::observation::{Observation, ObservationBuilder};
use crate::game::snapshot::RoundSnapshot;
use crate::model::card::{CARD_COUNT, Card};
use crate::model::deck::Deck;
use crate::model::player::Seat;
use crate::model::round::{PlayOutcome, RoundPhase, RoundState, StateError};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Number of discrete actions; action `i` plays `Card::from_id(i)`.
pub const ACTION_COUNT: usize = CARD_COUNT;

/// Legacy sentinel reward for an illegal action.
pub const ILLEGAL_MOVE_REWARD: f32 = -1.0;

/// What a single step did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A card was led; nothing is resolved yet.
    NoEvent,
    /// The action did not name a card the acting player holds, or the round
    /// was already over. The round is untouched.
    IllegalMove,
    /// The follow card completed a trick. `points` are conceded per seat.
    TrickResolved { winner: Seat, points: [u32; 2] },
}

impl StepOutcome {
    /// Variable-length reward as older consumers expect it: empty after a
    /// lead, `[-1]` for an illegal move, one entry per seat after a trick.
    pub fn reward(&self) -> Vec<f32> {
        match self {
            StepOutcome::NoEvent => Vec::new(),
            StepOutcome::IllegalMove => vec![ILLEGAL_MOVE_REWARD],
            StepOutcome::TrickResolved { points, .. } => {
                points.iter().map(|&p| p as f32).collect()
            }
        }
    }

    pub fn is_illegal(&self) -> bool {
        matches!(self, StepOutcome::IllegalMove)
    }
}

/// Single step result
#[derive(Debug, Clone)]
pub struct Step {
    pub obs: Observation,
    pub outcome: StepOutcome,
    pub done: bool,
    pub info: StepInfo,
}

impl Step {
    pub fn reward(&self) -> Vec<f32> {
        self.outcome.reward()
    }
}

/// Auxiliary step information; nothing in here is needed to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub phase: RoundPhase,
    pub current_player: Seat,
    pub tricks_completed: usize,
}

/// Two-player Watten environment driven by `reset`/`step`.
#[derive(Debug, Clone)]
pub struct WattenEnv {
    round: RoundState,
    obs_builder: ObservationBuilder,
    step_count: u32,
}

impl WattenEnv {
    /// Create an environment with a round already dealt from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::from_round(RoundState::deal(Deck::shuffled(&mut rng)))
    }

    /// Wrap an existing round, e.g. one built with `RoundState::from_hands`.
    pub fn from_round(round: RoundState) -> Self {
        Self {
            round,
            obs_builder: ObservationBuilder::new(),
            step_count: 0,
        }
    }

    /// Shuffle, deal five cards to each player and return the first
    /// player's observation.
    pub fn reset(&mut self, seed: u64) -> Observation {
        let mut rng = StdRng::seed_from_u64(seed);
        self.reset_with_rng(&mut rng)
    }

    pub fn reset_with_rng<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> Observation {
        self.round = RoundState::deal(Deck::shuffled(rng));
        self.step_count = 0;
        self.regenerate_observation()
    }

    pub fn step(&mut self, action: usize) -> Step {
        let actor = self.round.current_player();
        let outcome = match Card::from_id(action) {
            Some(card) => match self.round.play_card(actor, card) {
                Ok(PlayOutcome::Led) => StepOutcome::NoEvent,
                Ok(PlayOutcome::TrickCompleted { winner, points, .. }) => {
                    StepOutcome::TrickResolved { winner, points }
                }
                Err(_) => StepOutcome::IllegalMove,
            },
            None => StepOutcome::IllegalMove,
        };

        if !outcome.is_illegal() {
            self.step_count += 1;
        }

        Step {
            obs: self.regenerate_observation(),
            outcome,
            done: self.round.is_over(),
            info: self.info(),
        }
    }

    /// Recompute the observation for the seat to act; has no side effects.
    pub fn regenerate_observation(&self) -> Observation {
        self.obs_builder.build(&self.round)
    }

    pub fn get_state(&self) -> RoundSnapshot {
        RoundSnapshot::capture(&self.round)
    }

    /// Replace the live round with `snapshot`. On error the live round is
    /// left as it was.
    pub fn set_state(&mut self, snapshot: &RoundSnapshot) -> Result<Observation, StateError> {
        self.round = snapshot.restore()?;
        Ok(self.regenerate_observation())
    }

    pub fn legal_actions(&self) -> Vec<usize> {
        self.round
            .legal_cards()
            .into_iter()
            .map(Card::id)
            .collect()
    }

    pub fn action_mask(&self) -> [bool; ACTION_COUNT] {
        let mut mask = [false; ACTION_COUNT];
        for action in self.legal_actions() {
            mask[action] = true;
        }
        mask
    }

    pub fn is_done(&self) -> bool {
        self.round.is_over()
    }

    pub fn current_player(&self) -> Seat {
        self.round.current_player()
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn info(&self) -> StepInfo {
        StepInfo {
            phase: self.round.phase(),
            current_player: self.round.current_player(),
            tricks_completed: self.round.tricks_completed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ILLEGAL_MOVE_REWARD, StepOutcome, WattenEnv};
    use crate::model::card::Card;
    use crate::model::player::Seat;

    #[test]
    fn reward_flattening_matches_legacy_shapes() {
        assert!(StepOutcome::NoEvent.reward().is_empty());
        assert_eq!(StepOutcome::IllegalMove.reward(), vec![ILLEGAL_MOVE_REWARD]);
        assert_eq!(
            StepOutcome::TrickResolved {
                winner: Seat::First,
                points: [0, 6],
            }
            .reward(),
            vec![0.0, 6.0]
        );
    }

    #[test]
    fn lead_passes_turn_to_follower() {
        let mut env = WattenEnv::new(3);
        let action = env.legal_actions()[0];
        let step = env.step(action);
        assert_eq!(step.outcome, StepOutcome::NoEvent);
        assert!(step.reward().is_empty());
        assert!(!step.done);
        assert_eq!(env.current_player(), Seat::Second);
        assert_eq!(env.round().table_card(), Card::from_id(action));
        assert_eq!(step.obs.card_channels(Card::from_id(action).unwrap()), [0.0, 1.0]);
    }

    #[test]
    fn out_of_range_action_is_illegal() {
        let mut env = WattenEnv::new(4);
        let step = env.step(32);
        assert_eq!(step.outcome, StepOutcome::IllegalMove);
        assert_eq!(env.step_count(), 0);
    }

    #[test]
    fn mask_matches_hand() {
        let env = WattenEnv::new(5);
        let mask = env.action_mask();
        assert_eq!(mask.iter().filter(|&&m| m).count(), 5);
        for card in env.round().hand(Seat::First).iter() {
            assert!(mask[card.id()]);
        }
    }
}
