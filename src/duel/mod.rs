//! The duel facade: setup, the public action API, and views.
//!
//! [`Duel`] pairs one [`GameState`] version with the [`DuelRules`] that
//! advance it. Every API call validates against the current version and,
//! when accepted, swaps in the next one; a rejected call leaves the duel
//! exactly as it was.
//!
//! ## Sections
//!
//! - Setup: [`DuelBuilder`]
//! - Action API: one method per player request, plus [`Duel::perform`]
//! - Queries: views, legal actions, snapshots
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use duel_rules::cards::{CardCatalog, CardId, CardTemplate};
//! use duel_rules::core::{DuelConfig, PlayerId};
//! use duel_rules::duel::DuelBuilder;
//!
//! let catalog = CardCatalog::new().with(CardTemplate::monster(CardId(1), "Scout", 4, 1200, 800));
//! let deck = vec![CardId(1); 10];
//!
//! let mut duel = DuelBuilder::new(Arc::new(catalog), DuelConfig::default())
//!     .with_deck(PlayerId::FIRST, deck.clone())
//!     .with_deck(PlayerId::SECOND, deck)
//!     .with_seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(duel.state().turn, 1);
//! assert_eq!(duel.view(PlayerId::FIRST).me().hand.len(), 5);
//!
//! duel.end_turn(PlayerId::FIRST).unwrap();
//! assert_eq!(duel.state().turn_player, PlayerId::SECOND);
//! ```

pub mod cache;
pub(crate) mod flow;
pub(crate) mod legal;
pub mod view;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::cards::{CardCatalog, CardId};
use crate::core::{
    Action, ActionError, CardList, ConfigError, DuelConfig, GameState, InstanceId,
    InvariantViolation, PlayerId, PlayerMap, SnapshotError,
};
use crate::effects::Mutation;
use crate::rules::{DuelRules, GameResult, RulesEngine};
use crate::triggers::LoggedEvent;
use crate::turn;

pub use cache::LegalActionCache;
pub use flow::force_timeout;
pub use legal::legal_actions;
pub use view::{CardView, DuelView, LinkView, PlayerView};

/// Why a duel could not be set up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{player} deck contains unknown card {card}")]
    UnknownCard { player: PlayerId, card: CardId },
    #[error("{player} deck has {size} cards, needs at least {needed}")]
    DeckTooSmall { player: PlayerId, size: usize, needed: usize },
    #[error("setup failed: {0}")]
    Invariant(#[from] InvariantViolation),
}

// === Setup ===

/// Builder for a [`Duel`].
///
/// Decks are listed top card first.
#[derive(Clone, Debug)]
pub struct DuelBuilder {
    catalog: Arc<CardCatalog>,
    config: DuelConfig,
    decks: PlayerMap<Vec<CardId>>,
    seed: u64,
    shuffle: bool,
    first_player: PlayerId,
}

impl DuelBuilder {
    #[must_use]
    pub fn new(catalog: Arc<CardCatalog>, config: DuelConfig) -> Self {
        Self {
            catalog,
            config,
            decks: PlayerMap::new(|_| Vec::new()),
            seed: 0,
            shuffle: false,
            first_player: PlayerId::FIRST,
        }
    }

    #[must_use]
    pub fn with_deck(mut self, player: PlayerId, deck: Vec<CardId>) -> Self {
        self.decks[player] = deck;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Shuffle both decks with the duel's RNG before drawing.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    /// Validate, deal starting hands and begin turn 1.
    pub fn build(self) -> Result<Duel, SetupError> {
        self.config.validate()?;
        for (player, deck) in self.decks.iter() {
            if let Some(&card) = deck.iter().find(|&&c| !self.catalog.contains(c)) {
                return Err(SetupError::UnknownCard { player, card });
            }
            if deck.len() < self.config.starting_hand {
                return Err(SetupError::DeckTooSmall {
                    player,
                    size: deck.len(),
                    needed: self.config.starting_hand,
                });
            }
        }

        let mut state = GameState::new(&self.config, self.seed, self.first_player);
        for (player, deck) in self.decks.iter() {
            for &card in deck.iter().rev() {
                if let Some(template) = self.catalog.get(card) {
                    state.spawn(player, card, &template.kind);
                }
            }
        }

        for player in PlayerId::starting_with(self.first_player) {
            if self.shuffle {
                Mutation::ShuffleDeck(player).apply(&mut state)?;
            }
            for _ in 0..self.config.starting_hand {
                let Some(card) = state.player(player).zones.top_of_deck() else {
                    break;
                };
                Mutation::Draw { player, card }.apply(&mut state)?;
            }
        }

        let rules = DuelRules::new(self.catalog, self.config);
        turn::start_turn(&mut state, &rules);
        flow::settle(&rules, &mut state);

        info!(seed = self.seed, first = %self.first_player, "duel started");
        Ok(Duel { rules, state })
    }
}

// === Duel ===

/// What an accepted action produced.
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub version: u64,
    /// Log entries appended by this action.
    pub events: Vec<LoggedEvent>,
    /// The acting player's view of the new state.
    pub view: DuelView,
}

/// A running duel.
#[derive(Clone, Debug)]
pub struct Duel {
    rules: DuelRules,
    state: GameState,
}

impl Duel {
    /// Resume a duel from an existing state.
    #[must_use]
    pub fn from_state(rules: DuelRules, state: GameState) -> Self {
        Self { rules, state }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn rules(&self) -> &DuelRules {
        &self.rules
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameResult> {
        self.rules.is_terminal(&self.state)
    }

    /// Apply any action for `player`.
    pub fn perform(&mut self, player: PlayerId, action: &Action) -> Result<ActionOutcome, ActionError> {
        let seq = self.state.log.len();
        let next = self.rules.apply_action(&self.state, player, action)?;
        Ok(self.commit(next, player, seq))
    }

    fn commit(&mut self, next: GameState, player: PlayerId, seq: usize) -> ActionOutcome {
        self.state = next;
        if let Some(result) = self.state.outcome {
            info!(%result, "duel over");
        }
        ActionOutcome {
            version: self.state.version,
            events: self.state.events_since(seq),
            view: DuelView::new(&self.state, player),
        }
    }

    // === Action API ===

    pub fn activate_effect(
        &mut self,
        player: PlayerId,
        card: InstanceId,
        effect: usize,
        targets: &[InstanceId],
        cost: &[InstanceId],
    ) -> Result<ActionOutcome, ActionError> {
        let action = Action::activate(card, effect).with_targets(targets).with_cost(cost);
        self.perform(player, &action)
    }

    pub fn pass_priority(&mut self, player: PlayerId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::PassPriority)
    }

    pub fn declare_attack(
        &mut self,
        player: PlayerId,
        attacker: InstanceId,
        target: Option<InstanceId>,
    ) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::DeclareAttack { attacker, target })
    }

    pub fn normal_summon(
        &mut self,
        player: PlayerId,
        card: InstanceId,
        tributes: &[InstanceId],
    ) -> Result<ActionOutcome, ActionError> {
        let tributes: CardList = tributes.iter().copied().collect();
        self.perform(player, &Action::NormalSummon { card, tributes })
    }

    pub fn special_summon(&mut self, player: PlayerId, card: InstanceId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::SpecialSummon { card })
    }

    pub fn set_card(
        &mut self,
        player: PlayerId,
        card: InstanceId,
        tributes: &[InstanceId],
    ) -> Result<ActionOutcome, ActionError> {
        let tributes: CardList = tributes.iter().copied().collect();
        self.perform(player, &Action::SetCard { card, tributes })
    }

    pub fn change_position(&mut self, player: PlayerId, card: InstanceId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::ChangePosition { card })
    }

    pub fn enter_battle_phase(&mut self, player: PlayerId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::EnterBattlePhase)
    }

    pub fn enter_main_phase_2(&mut self, player: PlayerId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::EnterMainPhase2)
    }

    pub fn end_turn(&mut self, player: PlayerId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::EndTurn)
    }

    pub fn forfeit(&mut self, player: PlayerId) -> Result<ActionOutcome, ActionError> {
        self.perform(player, &Action::Forfeit)
    }

    /// External clock expiry for `player`.
    pub fn force_timeout(&mut self, player: PlayerId) -> Result<ActionOutcome, ActionError> {
        let seq = self.state.log.len();
        let next = flow::force_timeout(&self.rules, &self.state, player)?;
        Ok(self.commit(next, player, seq))
    }

    // === Queries ===

    #[must_use]
    pub fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        self.rules.legal_actions(&self.state, player)
    }

    #[must_use]
    pub fn view(&self, viewer: PlayerId) -> DuelView {
        DuelView::new(&self.state, viewer)
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        self.state.to_bytes()
    }

    /// Replace the current state with a snapshot taken earlier.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        self.state = GameState::from_bytes(bytes)?;
        Ok(())
    }
}
