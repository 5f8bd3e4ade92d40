use super::{Policy, PolicyContext};
use crate::bot::{BotKind, PlayPlanner, UnseenTracker};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{Level, event};
use watten_core::game::env::WattenEnv;
use watten_core::model::card::Card;
use watten_core::model::hand::Hand;
use watten_core::model::player::{PlayerState, Seat};
use watten_core::model::round::RoundState;

pub const DEFAULT_SAMPLES: usize = 16;

/// Determinized Monte Carlo search.
///
/// Each sample deals the unseen cards into a plausible opponent hand, then
/// for every legal card plays it from a saved state and finishes the round
/// with heuristic play on both sides, restoring the save point between
/// candidates. The card with the best total point margin wins.
pub struct RolloutPolicy {
    samples: usize,
    rng: StdRng,
}

impl RolloutPolicy {
    pub fn new(samples: usize, seed: u64) -> Self {
        Self {
            samples: samples.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    fn determinize(&mut self, ctx: &PolicyContext) -> Option<RoundState> {
        let round = ctx.round;
        let opponent = ctx.seat.other();
        let mut unseen = ctx.tracker.unseen_cards();
        unseen.shuffle(&mut self.rng);

        let hidden = round.hand(opponent).len().min(unseen.len());
        let deck = unseen.split_off(hidden);
        let opponent_hand = Hand::with_cards(unseen);

        let mut players: [PlayerState; 2] = Default::default();
        players[ctx.seat.index()] = round.player(ctx.seat).clone();
        players[opponent.index()] =
            PlayerState::with_hand(opponent_hand, round.tricks_won(opponent));

        RoundState::from_parts(
            deck,
            players,
            round.current_trick().clone(),
            round.trick_history().to_vec(),
        )
        .ok()
    }
}

impl Policy for RolloutPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Card {
        let legal = ctx.legal_cards();
        let fallback = legal
            .first()
            .or_else(|| ctx.hand.cards().first())
            .copied()
            .unwrap_or(Card::HERZ_KING);
        if legal.len() <= 1 {
            return fallback;
        }

        let mut totals = vec![0i64; legal.len()];
        for _ in 0..self.samples {
            let Some(world) = self.determinize(ctx) else {
                continue;
            };
            let mut env = WattenEnv::from_round(world);
            let save = env.get_state();

            for (slot, card) in legal.iter().enumerate() {
                env.step(card.id());
                play_out(&mut env);
                totals[slot] += margin(env.round(), ctx.seat);
                if env.set_state(&save).is_err() {
                    break;
                }
            }
        }

        let best = legal
            .iter()
            .zip(&totals)
            .max_by(|(a, ta), (b, tb)| ta.cmp(tb).then(b.id().cmp(&a.id())))
            .map(|(card, _)| *card)
            .unwrap_or(fallback);

        if tracing::enabled!(Level::DEBUG) {
            let scores = legal
                .iter()
                .zip(&totals)
                .map(|(card, total)| format!("{card}:{total}"))
                .collect::<Vec<_>>()
                .join(",");
            event!(
                target: "watten_bot::rollout",
                Level::DEBUG,
                seat = %ctx.seat,
                samples = self.samples,
                scores = %scores,
                chosen = %best,
            );
        }

        best
    }

    fn kind(&self) -> BotKind {
        BotKind::Rollout
    }
}

/// Finish the round with both seats playing the heuristic on their own view.
fn play_out(env: &mut WattenEnv) {
    while !env.is_done() {
        let round = env.round();
        let seat = round.current_player();
        let tracker = UnseenTracker::for_seat(round, seat);
        let legal = round.legal_cards();
        let Some((card, _)) = PlayPlanner::choose(round.table_card(), &legal, &tracker) else {
            return;
        };
        if env.step(card.id()).outcome.is_illegal() {
            return;
        }
    }
}

/// Points conceded by the opponent minus points conceded by `seat`.
fn margin(round: &RoundState, seat: Seat) -> i64 {
    let points = round.points();
    i64::from(points[seat.other().index()]) - i64::from(points[seat.index()])
}

#[cfg(test)]
mod tests {
    use super::{RolloutPolicy, margin};
    use crate::bot::UnseenTracker;
    use crate::policy::{Policy, PolicyContext};
    use watten_core::model::card::Card;
    use watten_core::model::deck::Deck;
    use watten_core::model::hand::Hand;
    use watten_core::model::player::Seat;
    use watten_core::model::rank::Rank;
    use watten_core::model::round::RoundState;
    use watten_core::model::suit::Suit;

    #[test]
    fn margin_is_relative_to_seat() {
        let first = Hand::with_cards(vec![Card::HERZ_KING]);
        let second = Hand::with_cards(vec![Card::new(Suit::Gruen, Rank::Seven)]);
        let mut round = RoundState::from_hands([first, second]).unwrap();
        round.play_card(Seat::First, Card::HERZ_KING).unwrap();
        round
            .play_card(Seat::Second, Card::new(Suit::Gruen, Rank::Seven))
            .unwrap();
        assert_eq!(margin(&round, Seat::First), 1);
        assert_eq!(margin(&round, Seat::Second), -1);
    }

    #[test]
    fn takes_the_trick_that_wins_the_round() {
        let card = Card::new;
        let first = Hand::with_cards(vec![
            card(Suit::Gruen, Rank::Seven),
            card(Suit::Herz, Rank::Seven),
            card(Suit::Gruen, Rank::Ace),
            card(Suit::Gruen, Rank::Eight),
        ]);
        let second = Hand::with_cards(vec![
            card(Suit::Gruen, Rank::Ten),
            card(Suit::Schellen, Rank::Eight),
            Card::HERZ_KING,
            card(Suit::Eichel, Rank::Nine),
        ]);
        let mut round = RoundState::from_hands([first, second]).unwrap();
        // One trick each, then the first seat leads the Gruen Ace.
        round.play_card(Seat::First, card(Suit::Gruen, Rank::Seven)).unwrap();
        round.play_card(Seat::Second, card(Suit::Gruen, Rank::Ten)).unwrap();
        round.play_card(Seat::Second, card(Suit::Schellen, Rank::Eight)).unwrap();
        round.play_card(Seat::First, card(Suit::Herz, Rank::Seven)).unwrap();
        round.play_card(Seat::First, card(Suit::Gruen, Rank::Ace)).unwrap();

        let tracker = UnseenTracker::for_seat(&round, Seat::Second);
        let ctx = PolicyContext::new(&round, &tracker);
        let mut policy = RolloutPolicy::new(4, 1);
        assert_eq!(policy.choose_play(&ctx), Card::HERZ_KING);
        assert_eq!(policy.samples(), 4);
    }

    #[test]
    fn same_seed_same_choice() {
        let round = RoundState::deal(Deck::shuffled_with_seed(9));
        let tracker = UnseenTracker::for_seat(&round, Seat::First);
        let ctx = PolicyContext::new(&round, &tracker);
        let a = RolloutPolicy::new(3, 2).choose_play(&ctx);
        let b = RolloutPolicy::new(3, 2).choose_play(&ctx);
        assert_eq!(a, b);
        assert!(round.hand(Seat::First).contains(a));
    }
}
