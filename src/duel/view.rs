//! Per-player views of a duel.
//!
//! A view is what one player is allowed to see. Hidden information stays
//! hidden: the opponent's hand and face-down cards show only that a card is
//! there, and neither deck order is revealed.

use serde::Serialize;

use crate::cards::{CardCategory, CardId, CardInstance, Position, StatLine};
use crate::core::{GameState, InstanceId, PlayerId};
use crate::rules::GameResult;
use crate::turn::Phase;

/// A card as seen by the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: InstanceId,
    pub owner: PlayerId,
    /// `None` when the card is hidden from the viewer.
    pub card: Option<CardId>,
    pub category: Option<CardCategory>,
    pub position: Position,
    pub stats: Option<StatLine>,
}

impl CardView {
    fn of(card: &CardInstance, visible: bool) -> Self {
        Self {
            id: card.id,
            owner: card.owner,
            card: visible.then_some(card.card),
            category: visible.then_some(card.category),
            position: card.position,
            stats: visible.then_some(card.current),
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.card.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub player: PlayerId,
    pub life: u32,
    pub deck_size: usize,
    pub hand: Vec<CardView>,
    /// One entry per slot.
    pub monsters: Vec<Option<CardView>>,
    pub spells: Vec<Option<CardView>>,
    pub graveyard: Vec<CardView>,
    pub banished: Vec<CardView>,
    pub normal_summon_used: bool,
}

/// A chain link as announced to both players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub number: usize,
    pub source: InstanceId,
    pub card: CardId,
    pub effect: usize,
    pub controller: PlayerId,
    pub speed: u8,
    pub negated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuelView {
    pub viewer: PlayerId,
    pub version: u64,
    pub turn: u32,
    pub phase: Phase,
    pub turn_player: PlayerId,
    pub priority: PlayerId,
    /// Viewer first.
    pub players: [PlayerView; 2],
    /// Bottom link first.
    pub chain: Vec<LinkView>,
    pub window_open: bool,
    pub attack: Option<(InstanceId, Option<InstanceId>)>,
    pub outcome: Option<GameResult>,
}

impl DuelView {
    /// Build the view `viewer` is entitled to.
    #[must_use]
    pub fn new(state: &GameState, viewer: PlayerId) -> Self {
        let chain = state
            .chain
            .links()
            .iter()
            .map(|link| LinkView {
                number: link.number,
                source: link.source,
                card: link.card,
                effect: link.effect,
                controller: link.controller,
                speed: link.speed.value(),
                negated: link.negated,
            })
            .collect();

        Self {
            viewer,
            version: state.version,
            turn: state.turn,
            phase: state.phase,
            turn_player: state.turn_player,
            priority: state.priority_holder(),
            players: [
                player_view(state, viewer, viewer),
                player_view(state, viewer, viewer.opponent()),
            ],
            chain,
            window_open: state.window.is_some(),
            attack: state.pending_attack.map(|a| (a.attacker, a.target)),
            outcome: state.outcome,
        }
    }

    #[must_use]
    pub fn me(&self) -> &PlayerView {
        &self.players[0]
    }

    #[must_use]
    pub fn opponent(&self) -> &PlayerView {
        &self.players[1]
    }
}

fn player_view(state: &GameState, viewer: PlayerId, player: PlayerId) -> PlayerView {
    let own = viewer == player;
    let zones = &state.player(player).zones;
    let card = |id: InstanceId, visible: bool| state.card(id).map(|c| CardView::of(c, visible));
    let on_field = |id: InstanceId| {
        state
            .card(id)
            .map(|c| CardView::of(c, own || c.position.is_face_up()))
    };

    PlayerView {
        player,
        life: state.player(player).life,
        deck_size: zones.deck.len(),
        hand: zones.hand.iter().filter_map(|&id| card(id, own)).collect(),
        monsters: zones.monsters.iter().map(|slot| slot.and_then(on_field)).collect(),
        spells: zones.spells.iter().map(|slot| slot.and_then(on_field)).collect(),
        graveyard: zones.graveyard.iter().filter_map(|&id| card(id, true)).collect(),
        banished: zones.banished.iter().filter_map(|&id| card(id, true)).collect(),
        normal_summon_used: state.player(player).normal_summon_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardKind;
    use crate::core::DuelConfig;
    use crate::zones::{ZoneKind, ZonePosition};

    #[test]
    fn test_opponent_hand_hidden() {
        let mut state = GameState::new(&DuelConfig::default(), 3, PlayerId::FIRST);
        let kind = CardKind::Monster { level: 4, atk: 1500, def: 1000 };
        let mine = state.spawn(PlayerId::FIRST, CardId(1), &kind);
        let theirs = state.spawn(PlayerId::SECOND, CardId(1), &kind);
        for id in [mine, theirs] {
            state
                .relocate(id, ZoneKind::Hand, ZonePosition::Top, Position::FaceUp)
                .unwrap();
        }

        let view = DuelView::new(&state, PlayerId::FIRST);
        assert_eq!(view.me().hand.len(), 1);
        assert!(!view.me().hand[0].is_hidden());
        assert!(view.opponent().hand[0].is_hidden());
        assert_eq!(view.opponent().player, PlayerId::SECOND);
    }

    #[test]
    fn test_face_down_monster_hidden_from_opponent() {
        let mut state = GameState::new(&DuelConfig::default(), 3, PlayerId::FIRST);
        let kind = CardKind::Monster { level: 4, atk: 1500, def: 1000 };
        let set = state.spawn(PlayerId::SECOND, CardId(7), &kind);
        state
            .relocate(set, ZoneKind::MonsterZone, ZonePosition::Top, Position::FaceDownDefense)
            .unwrap();

        let mine = DuelView::new(&state, PlayerId::SECOND);
        let theirs = DuelView::new(&state, PlayerId::FIRST);
        let slot = |view: &DuelView, me: bool| {
            let side = if me { view.me() } else { view.opponent() };
            side.monsters.iter().flatten().next().copied()
        };
        assert_eq!(slot(&mine, true).and_then(|c| c.card), Some(CardId(7)));
        assert!(slot(&theirs, false).is_some_and(|c| c.is_hidden()));
    }
}
