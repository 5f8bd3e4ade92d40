use crate::model::round::{RoundState, StateError};
use serde::{Deserialize, Serialize};

/// Deep copy of a round for save-point replay. Holding a snapshot never
/// aliases the live game; restoring validates card conservation first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSnapshot {
    round: RoundState,
}

impl RoundSnapshot {
    pub fn capture(round: &RoundState) -> Self {
        Self {
            round: round.clone(),
        }
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn restore(&self) -> Result<RoundState, StateError> {
        self.round.validate()?;
        Ok(self.round.clone())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a snapshot and rejects one whose contents break the round
    /// invariants, so a bad file fails here rather than at `set_state`.
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let snapshot: RoundSnapshot =
            serde_json::from_str(json).map_err(|err| StateError::Serialization(err.to_string()))?;
        snapshot.round.validate()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::RoundSnapshot;
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::player::Seat;
    use crate::model::round::{RoundState, StateError};

    #[test]
    fn snapshot_roundtrip_restores_identical_round() {
        let round = RoundState::deal(Deck::shuffled_with_seed(11));
        let snapshot = RoundSnapshot::capture(&round);
        assert_eq!(snapshot.restore().unwrap(), round);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_play() {
        let mut round = RoundState::deal(Deck::shuffled_with_seed(12));
        let snapshot = RoundSnapshot::capture(&round);
        let card = round.hand(Seat::First).cards()[0];
        round.play_card(Seat::First, card).unwrap();

        assert_eq!(snapshot.round().table_card(), None);
        assert!(snapshot.round().hand(Seat::First).contains(card));
    }

    #[test]
    fn json_roundtrip_preserves_state() {
        let mut round = RoundState::deal(Deck::shuffled_with_seed(13));
        let card = round.hand(Seat::First).cards()[0];
        round.play_card(Seat::First, card).unwrap();

        let json = RoundSnapshot::capture(&round).to_json().unwrap();
        assert!(json.contains("\"current_trick\""));
        let restored = RoundSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored, round);
    }

    #[test]
    fn from_json_rejects_duplicated_card() {
        let round = RoundState::deal(Deck::shuffled_with_seed(14));
        let json = RoundSnapshot::capture(&round).to_json().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let held = value["round"]["players"][0]["hand"][0].clone();
        value["round"]["deck"][0] = held.clone();
        let tampered = serde_json::to_string(&value).unwrap();

        let parsed: Card = serde_json::from_value(held).unwrap();
        assert_eq!(
            RoundSnapshot::from_json(&tampered),
            Err(StateError::DuplicateCard(parsed))
        );
    }

    #[test]
    fn from_json_reports_malformed_input() {
        assert!(matches!(
            RoundSnapshot::from_json("{\"round\": 3}"),
            Err(StateError::Serialization(_))
        ));
    }
}
