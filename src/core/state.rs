//! Game state: the authoritative, versioned duel snapshot.
//!
//! ## PlayerState
//!
//! Per-seat information:
//! - Life points (never negative; zero loses at the next sweep)
//! - The six zones
//! - Per-turn flags (normal summon used)
//!
//! ## GameState
//!
//! Everything the rules need to continue a duel:
//! - Turn counter, phase, turn player
//! - Every card instance, indexed by `InstanceId`
//! - The chain, the open response window and any pending attack
//! - Granted and active modifiers
//! - Activation counts, the outcome, the event log and the RNG
//!
//! Uses `im` persistent collections so each action can clone the state,
//! mutate the clone, and keep the original on rejection.

use im::Vector;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::config::DuelConfig;
use super::entity::InstanceId;
use super::error::{ActionError, InvariantViolation};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{CardId, CardInstance, CardKind, Position};
use crate::chain::{Chain, ChainStatus};
use crate::continuous::Modifier;
use crate::rules::{ActivationTracker, GameResult, PendingAttack};
use crate::triggers::{GameEvent, LoggedEvent, ResponseWindow};
use crate::turn::Phase;
use crate::zones::{PlayerZones, ZoneKind, ZonePosition};

/// Binary snapshot failure.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode game state: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode game state: {0}")]
    Decode(#[source] bincode::Error),
}

/// One player's seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: u32,
    pub zones: PlayerZones,
    pub normal_summon_used: bool,
    /// Set when a mandatory draw found an empty deck.
    pub deck_out: bool,
}

impl PlayerState {
    #[must_use]
    pub fn new(config: &DuelConfig) -> Self {
        Self {
            life: config.starting_life,
            zones: PlayerZones::new(config.monster_zones, config.spell_trap_zones),
            normal_summon_used: false,
            deck_out: false,
        }
    }
}

/// Complete duel state.
///
/// `cards[i].id == InstanceId(i)` for every instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Progression ===
    /// Incremented once per accepted action.
    pub version: u64,

    /// Turn number; 0 before the first turn starts.
    pub turn: u32,

    pub phase: Phase,

    pub turn_player: PlayerId,

    // === Board ===
    pub players: PlayerMap<PlayerState>,

    pub cards: Vector<CardInstance>,

    // === Interaction ===
    pub chain: Chain,

    /// Event context for responses. Accepts passes only while the chain is
    /// empty; otherwise the chain holds priority.
    pub window: Option<ResponseWindow>,

    pub pending_attack: Option<PendingAttack>,

    /// Trigger-capable events not yet checked against the board.
    pub pending_events: Vector<GameEvent>,

    // === Continuous ===
    /// Modifiers granted by resolved effects.
    pub granted: Vector<Modifier>,

    /// Every modifier in force after the last recompute, by layer.
    pub active: Vector<Modifier>,

    pub activations: ActivationTracker,

    // === Outcome ===
    pub outcome: Option<GameResult>,

    pub log: Vector<LoggedEvent>,

    pub rng: GameRng,
}

impl GameState {
    /// Create an empty board. `first` takes turn 1.
    #[must_use]
    pub fn new(config: &DuelConfig, seed: u64, first: PlayerId) -> Self {
        Self {
            version: 0,
            turn: 0,
            phase: Phase::Draw,
            turn_player: first,
            players: PlayerMap::new(|_| PlayerState::new(config)),
            cards: Vector::new(),
            chain: Chain::new(first),
            window: None,
            pending_attack: None,
            pending_events: Vector::new(),
            granted: Vector::new(),
            active: Vector::new(),
            activations: ActivationTracker::new(),
            outcome: None,
            log: Vector::new(),
            rng: GameRng::new(seed),
        }
    }

    // === Cards ===

    /// Create a card instance on top of `owner`'s deck.
    pub fn spawn(&mut self, owner: PlayerId, card: CardId, kind: &CardKind) -> InstanceId {
        let id = InstanceId(self.cards.len() as u32);
        self.cards.push_back(CardInstance::new(id, card, kind, owner));
        self.players[owner]
            .zones
            .insert(ZoneKind::Deck, id, ZonePosition::Top);
        id
    }

    #[must_use]
    pub fn card(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.get(id.index())
    }

    pub fn card_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.cards.get_mut(id.index())
    }

    pub fn require_card(&self, id: InstanceId) -> Result<&CardInstance, InvariantViolation> {
        self.card(id).ok_or(InvariantViolation::MissingCard(id))
    }

    // === Players ===

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    // === Movement ===

    /// Move a card to `zone` on its owner's side.
    ///
    /// Field zones take the first free slot; a full row fails without moving
    /// anything. Returns the zone the card came from.
    pub fn relocate(
        &mut self,
        id: InstanceId,
        zone: ZoneKind,
        place: ZonePosition,
        position: Position,
    ) -> Result<ZoneKind, InvariantViolation> {
        let card = self.require_card(id)?;
        let (owner, from) = (card.owner, card.zone);

        let zones = &mut self.players[owner].zones;
        if zone.is_field() && zones.free_slot(zone).is_none() {
            return Err(InvariantViolation::NoFreeZone { player: owner, zone });
        }
        if !zones.remove(from, id) {
            return Err(InvariantViolation::NotInZone { card: id, zone: from });
        }
        let slot = zones.insert(zone, id, place);
        let slot = if zone.is_field() { slot } else { None };

        if let Some(card) = self.card_mut(id) {
            card.relocate(zone, slot, position);
        }
        trace!(card = %id, %from, to = %zone, "card relocated");
        Ok(from)
    }

    // === Events ===

    /// Append an event to the log. Trigger-capable events are also queued for
    /// trigger detection.
    pub fn record(&mut self, event: GameEvent) {
        if event.can_trigger() {
            self.pending_events.push_back(event.clone());
        }
        trace!(event = event.name(), turn = self.turn, "event");
        self.log.push_back(LoggedEvent {
            seq: self.log.len() as u64,
            turn: self.turn,
            event,
        });
    }

    /// Log entries after `seq` (exclusive).
    #[must_use]
    pub fn events_since(&self, seq: usize) -> Vec<LoggedEvent> {
        self.log.iter().skip(seq).cloned().collect()
    }

    // === Priority ===

    /// Player expected to act next.
    #[must_use]
    pub fn priority_holder(&self) -> PlayerId {
        if !self.chain.is_empty() {
            return self.chain.priority();
        }
        match &self.window {
            Some(window) => window.holder,
            None => self.turn_player,
        }
    }

    /// No chain, no window, no pending attack: the turn player may start
    /// something new.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.chain.status() == ChainStatus::Idle
            && self.window.is_none()
            && self.pending_attack.is_none()
    }

    /// Reject if the duel is over.
    pub fn ensure_running(&self) -> Result<(), ActionError> {
        match self.outcome {
            Some(_) => Err(ActionError::GameOver),
            None => Ok(()),
        }
    }

    // === Serialization ===

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(SnapshotError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> CardKind {
        CardKind::Monster { level: 4, atk: 1800, def: 1200 }
    }

    fn state_with_deck(n: u32) -> GameState {
        let mut state = GameState::new(&DuelConfig::default(), 7, PlayerId::FIRST);
        for i in 0..n {
            state.spawn(PlayerId::FIRST, CardId(100 + i), &knight());
        }
        state
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(&DuelConfig::default(), 1, PlayerId::SECOND);
        assert_eq!(state.turn, 0);
        assert_eq!(state.turn_player, PlayerId::SECOND);
        assert_eq!(state.player(PlayerId::FIRST).life, 8000);
        assert_eq!(state.player(PlayerId::FIRST).zones.monsters.len(), 5);
        assert!(state.is_open());
    }

    #[test]
    fn test_spawn_assigns_indices() {
        let state = state_with_deck(3);
        for (i, card) in state.cards.iter().enumerate() {
            assert_eq!(card.id.index(), i);
        }
        assert_eq!(
            state.player(PlayerId::FIRST).zones.top_of_deck(),
            Some(InstanceId(2))
        );
    }

    #[test]
    fn test_relocate_to_field_and_back() {
        let mut state = state_with_deck(1);
        let id = InstanceId(0);

        let from = state
            .relocate(id, ZoneKind::MonsterZone, ZonePosition::Top, Position::FaceUpAttack)
            .unwrap();
        assert_eq!(from, ZoneKind::Deck);
        assert_eq!(state.card(id).unwrap().slot, Some(0));
        assert!(state.player(PlayerId::FIRST).zones.contains(ZoneKind::MonsterZone, id));

        state
            .relocate(id, ZoneKind::Graveyard, ZonePosition::Top, Position::FaceUp)
            .unwrap();
        assert_eq!(state.card(id).unwrap().slot, None);
        assert_eq!(state.card(id).unwrap().moves, 2);
    }

    #[test]
    fn test_relocate_full_row_moves_nothing() {
        let config = DuelConfig::default().with_zones(1, 1);
        let mut state = GameState::new(&config, 0, PlayerId::FIRST);
        let a = state.spawn(PlayerId::FIRST, CardId(1), &knight());
        let b = state.spawn(PlayerId::FIRST, CardId(2), &knight());
        state
            .relocate(a, ZoneKind::MonsterZone, ZonePosition::Top, Position::FaceUpAttack)
            .unwrap();

        let err = state
            .relocate(b, ZoneKind::MonsterZone, ZonePosition::Top, Position::FaceUpAttack)
            .unwrap_err();
        assert!(matches!(err, InvariantViolation::NoFreeZone { .. }));
        assert_eq!(state.card(b).unwrap().zone, ZoneKind::Deck);
        assert!(state.player(PlayerId::FIRST).zones.contains(ZoneKind::Deck, b));
    }

    #[test]
    fn test_record_queues_trigger_events() {
        let mut state = state_with_deck(1);
        state.record(GameEvent::PhaseChanged { phase: Phase::Main1 });
        state.record(GameEvent::Destroyed { card: InstanceId(0), by_battle: true });

        assert_eq!(state.log.len(), 2);
        assert_eq!(state.log[1].seq, 1);
        assert_eq!(state.pending_events.len(), 1);
        assert_eq!(state.events_since(1).len(), 1);
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut state = state_with_deck(4);
        state
            .relocate(InstanceId(1), ZoneKind::Hand, ZonePosition::Top, Position::FaceDown)
            .unwrap();
        state.record(GameEvent::CardDrawn { player: PlayerId::FIRST, card: InstanceId(1) });

        let bytes = state.to_bytes().unwrap();
        let back = GameState::from_bytes(&bytes).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(GameState::from_bytes(&[1, 2, 3]).is_err());
    }
}
