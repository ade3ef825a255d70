//! State-based actions.
//!
//! Run after every mutation batch. The sweep repeats until nothing changes:
//! 1. Recompute continuous effects
//! 2. Move every card marked for destruction from the field to the graveyard
//! 3. Check loss conditions (life at zero, drawing from an empty deck)
//!
//! A card marked for destruction leaves the field exactly once; the mark is
//! cleared by the move itself.

use tracing::{info, warn};

use crate::cards::{CardCatalog, DestructionCause, Position};
use crate::continuous;
use crate::core::{GameState, InstanceId, PlayerId};
use crate::triggers::GameEvent;
use crate::zones::{ZoneKind, ZonePosition};

use super::engine::GameResult;

/// Apply state-based actions until the board is stable.
pub fn sweep(state: &mut GameState, catalog: &CardCatalog) {
    loop {
        continuous::refresh(state, catalog);

        let marked: Vec<(InstanceId, DestructionCause)> = state
            .cards
            .iter()
            .filter(|c| c.is_on_field())
            .filter_map(|c| c.destruction.map(|cause| (c.id, cause)))
            .collect();
        if marked.is_empty() {
            break;
        }

        for (card, cause) in marked {
            destroy(state, card, cause);
        }
    }

    check_loss(state);
}

fn destroy(state: &mut GameState, card: InstanceId, cause: DestructionCause) {
    let Some(from) = state.card(card).map(|c| c.zone) else {
        return;
    };
    if let Err(error) = state.relocate(card, ZoneKind::Graveyard, ZonePosition::Top, Position::FaceUp) {
        // Clear the mark so the sweep cannot spin on it.
        if let Some(instance) = state.card_mut(card) {
            instance.destruction = None;
        }
        warn!(%card, %error, "destroyed card could not be moved");
        return;
    }
    state.record(GameEvent::CardMoved { card, from, to: ZoneKind::Graveyard });
    state.record(GameEvent::Destroyed {
        card,
        by_battle: cause == DestructionCause::Battle,
    });
}

/// Players who have lost right now.
#[must_use]
pub fn losers(state: &GameState) -> Vec<PlayerId> {
    PlayerId::both()
        .filter(|p| {
            let player = state.player(*p);
            player.life == 0 || player.deck_out
        })
        .collect()
}

/// Mark the duel over if a player has lost. Idempotent once decided.
pub fn check_loss(state: &mut GameState) {
    if state.outcome.is_some() {
        return;
    }
    let result = match losers(state).as_slice() {
        [] => return,
        [loser] => GameResult::Winner(loser.opponent()),
        _ => GameResult::Draw,
    };
    end_duel(state, result);
}

/// Record the result and stop accepting actions.
pub fn end_duel(state: &mut GameState, result: GameResult) {
    if state.outcome.is_some() {
        return;
    }
    info!(%result, turn = state.turn, "duel ended");
    state.outcome = Some(result);
    state.record(GameEvent::GameEnded { result });
}
