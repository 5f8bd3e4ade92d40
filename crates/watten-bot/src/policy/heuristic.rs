use super::{Policy, PolicyContext};
use crate::bot::{BotKind, PlayPlanner};
use tracing::{Level, event};
use watten_core::model::card::Card;

/// Greedy rule-based player built on [`PlayPlanner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for HeuristicPolicy {
    fn choose_play(&mut self, ctx: &PolicyContext) -> Card {
        let legal = ctx.legal_cards();
        let (card, reason) = PlayPlanner::choose(ctx.table_card(), &legal, ctx.tracker)
            .unwrap_or_else(|| {
                let fallback = ctx.hand.cards().first().copied().unwrap_or(Card::HERZ_KING);
                (fallback, "no_legal_moves")
            });
        log_play_decision(ctx, &legal, card, reason);
        card
    }

    fn kind(&self) -> BotKind {
        BotKind::Heuristic
    }
}

fn log_play_decision(ctx: &PolicyContext, legal_moves: &[Card], chosen: Card, reason: &str) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let legal_preview = legal_moves
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(",");

    event!(
        target: "watten_bot::play",
        Level::DEBUG,
        seat = %ctx.seat,
        legal_moves = %legal_preview,
        chosen = %chosen,
        table = ?ctx.table_card().map(|card| card.to_string()),
        unseen = ctx.tracker.unseen_count(),
        reason,
    );
}
