//! Player actions: the requests the public API accepts.
//!
//! Every entry point of the duel (`activate_effect`, `declare_attack`, ...)
//! builds one of these and routes it through the same legality check, so a
//! scripted opponent, a replay, and a human client all take identical paths.
//!
//! Card lists (targets, tributes, cost cards) are small, so they live in a
//! `SmallVec` and stay on the stack in the common case.
//!
//! ## Example
//!
//! ```
//! use duel_rules::core::{Action, InstanceId};
//!
//! let activate = Action::activate(InstanceId(3), 0).with_targets(&[InstanceId(9)]);
//! assert_eq!(activate.name(), "activate_effect");
//!
//! let attack = Action::DeclareAttack { attacker: InstanceId(1), target: None };
//! assert!(attack.is_direct_attack());
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::InstanceId;

/// Inline list of card instances referenced by an action.
pub type CardList = SmallVec<[InstanceId; 2]>;

/// Every way to pick `count` distinct items, keeping their order.
///
/// Used for target choices, cost cards and tribute sets alike.
#[must_use]
pub fn combinations(items: &[InstanceId], count: usize) -> Vec<CardList> {
    fn build(
        items: &[InstanceId],
        count: usize,
        start: usize,
        current: &mut CardList,
        out: &mut Vec<CardList>,
    ) {
        if current.len() == count {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            build(items, count, i + 1, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    build(items, count, 0, &mut CardList::new(), &mut out);
    out
}

/// A complete player action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Activate effect `effect` of `card`, choosing `targets` and paying with
    /// `cost` cards (for hand/field costs).
    ActivateEffect {
        card: InstanceId,
        effect: usize,
        targets: CardList,
        cost: CardList,
    },

    /// Decline to respond while holding priority.
    PassPriority,

    /// Attack with `attacker`. `None` is a direct attack.
    DeclareAttack {
        attacker: InstanceId,
        target: Option<InstanceId>,
    },

    /// Normal (or tribute) summon from hand in attack position.
    NormalSummon { card: InstanceId, tributes: CardList },

    /// Special summon from hand using the card's own summoning condition.
    SpecialSummon { card: InstanceId },

    /// Set a monster face-down (uses the normal summon) or a spell/trap.
    SetCard { card: InstanceId, tributes: CardList },

    /// Switch battle position, or flip summon a face-down monster.
    ChangePosition { card: InstanceId },

    EnterBattlePhase,
    EnterMainPhase2,
    EndTurn,

    /// Concede the duel.
    Forfeit,
}

impl Action {
    /// Activation with no targets and no cost cards.
    #[must_use]
    pub fn activate(card: InstanceId, effect: usize) -> Self {
        Self::ActivateEffect {
            card,
            effect,
            targets: CardList::new(),
            cost: CardList::new(),
        }
    }

    /// Replace the chosen targets of an activation.
    #[must_use]
    pub fn with_targets(mut self, chosen: &[InstanceId]) -> Self {
        if let Self::ActivateEffect { targets, .. } = &mut self {
            *targets = chosen.iter().copied().collect();
        }
        self
    }

    /// Replace the cost cards of an activation.
    #[must_use]
    pub fn with_cost(mut self, paid: &[InstanceId]) -> Self {
        if let Self::ActivateEffect { cost, .. } = &mut self {
            *cost = paid.iter().copied().collect();
        }
        self
    }

    /// Stable snake_case name, used in logs and rejection messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ActivateEffect { .. } => "activate_effect",
            Self::PassPriority => "pass_priority",
            Self::DeclareAttack { .. } => "declare_attack",
            Self::NormalSummon { .. } => "normal_summon",
            Self::SpecialSummon { .. } => "special_summon",
            Self::SetCard { .. } => "set_card",
            Self::ChangePosition { .. } => "change_position",
            Self::EnterBattlePhase => "enter_battle_phase",
            Self::EnterMainPhase2 => "enter_main_phase_2",
            Self::EndTurn => "end_turn",
            Self::Forfeit => "forfeit",
        }
    }

    #[must_use]
    pub fn is_direct_attack(&self) -> bool {
        matches!(self, Self::DeclareAttack { target: None, .. })
    }

    /// Is this a turn-structure action (phase change or end of turn)?
    #[must_use]
    pub fn is_phase_action(&self) -> bool {
        matches!(
            self,
            Self::EnterBattlePhase | Self::EnterMainPhase2 | Self::EndTurn
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActivateEffect { card, effect, .. } => {
                write!(f, "activate_effect({card}, #{effect})")
            }
            Self::DeclareAttack { attacker, target: Some(t) } => {
                write!(f, "declare_attack({attacker} -> {t})")
            }
            Self::DeclareAttack { attacker, target: None } => {
                write!(f, "declare_attack({attacker} -> direct)")
            }
            Self::NormalSummon { card, .. }
            | Self::SpecialSummon { card }
            | Self::SetCard { card, .. }
            | Self::ChangePosition { card } => write!(f, "{}({card})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}
