//! Effect definitions.
//!
//! A card effect is a typed tree of `EffectNode`s produced by the parser.
//! Leaves are `EffectAction`s paired with a target selector; inner nodes
//! sequence children or branch on a condition.
//!
//! ## Categories
//!
//! Every action belongs to exactly one handler category:
//! - **Movement**: draw, mill, discard, banish, search, return to deck,
//!   send to graveyard, return to hand
//! - **Combat**: damage, life gain, ATK/DEF/level modification
//! - **Summon**: special summon, destroy
//! - **Utility**: negate an activation or an attack
//!
//! The set is closed. Adding an action means adding a variant, and the
//! executor's exhaustive match points at every place that must handle it.

use serde::{Deserialize, Serialize};

use crate::cards::Stat;
use crate::continuous::ModifierDuration;
use crate::triggers::TriggerSpec;

use super::condition::Condition;
use super::targeting::{CardFilter, TargetSelector, TargetSpec};

/// How fast an effect is. A new chain link needs a speed at least as high
/// as the link it responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpellSpeed(u8);

impl SpellSpeed {
    pub const ONE: SpellSpeed = SpellSpeed(1);
    pub const TWO: SpellSpeed = SpellSpeed(2);
    pub const THREE: SpellSpeed = SpellSpeed(3);

    /// Validate a raw speed (1 to 3).
    #[must_use]
    pub const fn new(speed: u8) -> Option<Self> {
        match speed {
            1..=3 => Some(Self(speed)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for SpellSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spell speed {}", self.0)
    }
}

/// When an effect can be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Main phase, open game state, own turn only.
    Ignition,
    /// Any time the controller holds priority.
    Quick,
    /// Fires from an event; mandatory or optional.
    Trigger,
    /// The activation of a spell or trap card itself.
    Activate,
}

impl EffectKind {
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ignition" => Some(Self::Ignition),
            "quick" => Some(Self::Quick),
            "trigger" => Some(Self::Trigger),
            "activate" => Some(Self::Activate),
            _ => None,
        }
    }
}

/// Activation count restriction per card instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationLimit {
    OncePerTurn,
    OncePerDuel,
}

impl std::fmt::Display for ActivationLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OncePerTurn => f.write_str("once per turn"),
            Self::OncePerDuel => f.write_str("once per duel"),
        }
    }
}

/// What an activation cost is paid with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CostResource {
    LifePoints,
    /// Discard cards from the hand.
    Hand,
    /// Tribute monsters from the field.
    Field,
    /// Send the activating card itself to the graveyard.
    This,
}

/// Activation cost, paid when the link is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cost {
    pub resource: CostResource,
    pub amount: u32,
}

impl Cost {
    #[must_use]
    pub const fn new(resource: CostResource, amount: u32) -> Self {
        Self { resource, amount }
    }

    /// Number of cards the activating player must name.
    #[must_use]
    pub fn cards_named(&self) -> usize {
        match self.resource {
            CostResource::Hand | CostResource::Field => self.amount as usize,
            CostResource::LifePoints | CostResource::This => 0,
        }
    }
}

/// Where a card returned to the deck goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeckPlacement {
    Top,
    Bottom,
    Shuffle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SummonPosition {
    Attack,
    Defense,
}

/// Handler category of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    Movement,
    Combat,
    Summon,
    Utility,
}

/// A single effect operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectAction {
    // === Movement ===
    /// Target players draw.
    Draw { count: usize },
    /// Top cards of target players' decks go to the graveyard.
    Mill { count: usize },
    /// Target cards in hand, or the newest `count` hand cards of target players.
    Discard { count: usize },
    Banish,
    /// Target players add matching deck cards to the hand, then shuffle.
    Search { filter: CardFilter, count: usize },
    ReturnToDeck { placement: DeckPlacement },
    SendToGraveyard,
    ToHand,

    // === Combat ===
    Damage { amount: u32 },
    GainLife { amount: u32 },
    ModifyStat { stat: Stat, amount: i32, until: ModifierDuration },
    SetStat { stat: Stat, value: u32, until: ModifierDuration },

    // === Summon ===
    SpecialSummon { position: SummonPosition },
    Destroy,

    // === Utility ===
    /// Negate the link below (or negate target cards' effects).
    Negate,
    NegateAttack,
}

impl EffectAction {
    #[must_use]
    pub const fn category(&self) -> EffectCategory {
        match self {
            Self::Draw { .. }
            | Self::Mill { .. }
            | Self::Discard { .. }
            | Self::Banish
            | Self::Search { .. }
            | Self::ReturnToDeck { .. }
            | Self::SendToGraveyard
            | Self::ToHand => EffectCategory::Movement,
            Self::Damage { .. }
            | Self::GainLife { .. }
            | Self::ModifyStat { .. }
            | Self::SetStat { .. } => EffectCategory::Combat,
            Self::SpecialSummon { .. } | Self::Destroy => EffectCategory::Summon,
            Self::Negate | Self::NegateAttack => EffectCategory::Utility,
        }
    }

    /// Effect-language name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Draw { .. } => "draw",
            Self::Mill { .. } => "mill",
            Self::Discard { .. } => "discard",
            Self::Banish => "banish",
            Self::Search { .. } => "search",
            Self::ReturnToDeck { .. } => "return_to_deck",
            Self::SendToGraveyard => "send_to_graveyard",
            Self::ToHand => "to_hand",
            Self::Damage { .. } => "damage",
            Self::GainLife { .. } => "gain_life",
            Self::ModifyStat { .. } => "modify_stat",
            Self::SetStat { .. } => "set_stat",
            Self::SpecialSummon { .. } => "special_summon",
            Self::Destroy => "destroy",
            Self::Negate => "negate",
            Self::NegateAttack => "negate_attack",
        }
    }
}

/// A node of a compiled effect tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectNode {
    /// Apply `action` to whatever `target` resolves to.
    Action { action: EffectAction, target: TargetSelector },
    /// Run children in order against the evolving state.
    Sequence(Vec<EffectNode>),
    /// Branch on a condition evaluated at resolution.
    Conditional {
        condition: Condition,
        then: Box<EffectNode>,
        otherwise: Option<Box<EffectNode>>,
    },
}

impl EffectNode {
    #[must_use]
    pub fn action(action: EffectAction, target: TargetSelector) -> Self {
        Self::Action { action, target }
    }

    /// A node that does nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Sequence(Vec::new())
    }

    /// Number of action leaves in the tree.
    #[must_use]
    pub fn action_count(&self) -> usize {
        match self {
            Self::Action { .. } => 1,
            Self::Sequence(children) => children.iter().map(Self::action_count).sum(),
            Self::Conditional { then, otherwise, .. } => {
                then.action_count() + otherwise.as_ref().map_or(0, |o| o.action_count())
            }
        }
    }

    /// Does any leaf use this action category?
    #[must_use]
    pub fn uses(&self, category: EffectCategory) -> bool {
        match self {
            Self::Action { action, .. } => action.category() == category,
            Self::Sequence(children) => children.iter().any(|c| c.uses(category)),
            Self::Conditional { then, otherwise, .. } => {
                then.uses(category) || otherwise.as_ref().is_some_and(|o| o.uses(category))
            }
        }
    }
}

/// One activatable or triggered effect of a card.
#[derive(Clone, Debug, PartialEq)]
pub struct CardEffect {
    pub kind: EffectKind,
    pub speed: SpellSpeed,
    pub limit: Option<ActivationLimit>,
    pub cost: Option<Cost>,

    /// Must hold when activating.
    pub condition: Option<Condition>,

    /// For `Trigger` effects, what fires them. For other kinds, the event
    /// the activation must respond to.
    pub trigger: Option<TriggerSpec>,

    /// Targets chosen at activation, in order.
    pub targets: Vec<TargetSpec>,

    pub root: EffectNode,
}

impl CardEffect {
    #[must_use]
    pub fn new(kind: EffectKind, speed: SpellSpeed, root: EffectNode) -> Self {
        Self {
            kind,
            speed,
            limit: None,
            cost: None,
            condition: None,
            trigger: None,
            targets: Vec::new(),
            root,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: ActivationLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.targets.push(spec);
        self
    }

    /// Total number of targets chosen at activation.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.iter().map(|t| t.count).sum()
    }

    /// Is this a trigger effect the controller may decline?
    #[must_use]
    pub fn is_optional_trigger(&self) -> bool {
        self.kind == EffectKind::Trigger && self.trigger.as_ref().is_some_and(|t| t.optional)
    }

    /// Can this only be activated in answer to a specific event?
    #[must_use]
    pub fn is_event_gated(&self) -> bool {
        self.kind != EffectKind::Trigger && self.trigger.is_some()
    }
}
