//! Turn and phase transitions.
//!
//! Draw and Standby pass automatically: a turn starts, draws, and lands in
//! Main 1 within one call. From there the turn player moves on explicitly:
//! Main 1 → Battle → Main 2 → End, or straight to End. Ending the turn
//! enforces the hand limit, expires end-of-turn modifiers, and starts the
//! opponent's turn.
//!
//! Chain and priority gating happen in the duel flow before any of these run.

use tracing::{debug, info, warn};

use crate::continuous::{self, ModifierDuration};
use crate::core::{ActionError, GameState, PlayerId};
use crate::effects::Mutation;
use crate::rules::{state_based, DuelRules, RulesEngine};
use crate::triggers::GameEvent;
use crate::zones::{ZoneKind, ZonePosition};

use super::phase::Phase;

/// Move to `phase` and log it.
pub fn set_phase(state: &mut GameState, phase: Phase) {
    state.phase = phase;
    debug!(%phase, turn = state.turn, "phase changed");
    state.record(GameEvent::PhaseChanged { phase });
}

/// Begin the next turn. The first call starts turn 1 for the seated first
/// player.
pub fn start_turn(state: &mut GameState, rules: &DuelRules) {
    let player = if state.turn == 0 {
        state.turn_player
    } else {
        state.turn_player.opponent()
    };
    state.turn += 1;
    state.turn_player = player;

    for (_, seat) in state.players.iter_mut() {
        seat.normal_summon_used = false;
    }
    for card in state.cards.iter_mut() {
        card.reset_turn_flags();
    }
    state.activations.reset_turn();
    state.chain.finish(player);

    info!(turn = state.turn, %player, "turn started");
    state.record(GameEvent::TurnStarted { player, turn: state.turn });

    set_phase(state, Phase::Draw);
    if state.turn > 1 || rules.config().first_player_draws {
        draw_for_turn(state, player);
    }
    state_based::sweep(state, rules.catalog());
    if state.outcome.is_some() {
        return;
    }

    set_phase(state, Phase::Standby);
    set_phase(state, Phase::Main1);
}

/// The mandatory draw. An empty deck loses the duel at the next sweep.
fn draw_for_turn(state: &mut GameState, player: PlayerId) {
    let Some(card) = state.player(player).zones.top_of_deck() else {
        info!(%player, "deck empty at draw phase");
        state.player_mut(player).deck_out = true;
        return;
    };
    if let Err(error) = (Mutation::Draw { player, card }).apply(state) {
        warn!(%player, %error, "draw phase draw failed");
    }
}

/// Main 1 → Battle.
pub fn enter_battle_phase(state: &mut GameState, rules: &DuelRules) -> Result<(), ActionError> {
    let blocked = state.turn == 1 && !rules.config().first_turn_battle;
    if state.phase != Phase::Main1 || blocked {
        return Err(ActionError::WrongPhase {
            action: "enter_battle_phase",
            phase: state.phase,
        });
    }
    set_phase(state, Phase::Battle);
    Ok(())
}

/// Battle → Main 2.
pub fn enter_main_phase_2(state: &mut GameState) -> Result<(), ActionError> {
    if state.phase != Phase::Battle {
        return Err(ActionError::WrongPhase {
            action: "enter_main_phase_2",
            phase: state.phase,
        });
    }
    set_phase(state, Phase::Main2);
    Ok(())
}

/// End phase, then the opponent's turn.
pub fn end_turn(state: &mut GameState, rules: &DuelRules) -> Result<(), ActionError> {
    if !matches!(state.phase, Phase::Main1 | Phase::Battle | Phase::Main2) {
        return Err(ActionError::WrongPhase {
            action: "end_turn",
            phase: state.phase,
        });
    }
    set_phase(state, Phase::End);

    let player = state.turn_player;
    discard_to_hand_limit(state, player, rules.config().hand_limit);
    continuous::expire(state, ModifierDuration::EndOfTurn);
    state_based::sweep(state, rules.catalog());
    if state.outcome.is_some() {
        return Ok(());
    }

    start_turn(state, rules);
    Ok(())
}

/// Discard the most recently added cards until the hand fits the limit.
pub fn discard_to_hand_limit(state: &mut GameState, player: PlayerId, limit: usize) {
    let excess = state.player(player).zones.hand.len().saturating_sub(limit);
    for card in state.player(player).zones.newest_in_hand(excess) {
        let moved = Mutation::MoveCard {
            card,
            to: ZoneKind::Graveyard,
            place: ZonePosition::Top,
        }
        .apply(state);
        match moved {
            Ok(()) => state.record(GameEvent::HandLimitDiscard { player, card }),
            Err(error) => warn!(%card, %error, "hand limit discard failed"),
        }
    }
}
