//! Summon legality.
//!
//! Normal summons (and monster sets) share the once-per-turn normal summon and
//! need tributes by level. Special summons from the hand bypass that limit but
//! must satisfy the card's own stated condition.

use smallvec::SmallVec;

use crate::cards::{CardCatalog, CardInstance};
use crate::core::{ActionError, DuelConfig, GameState, InstanceId, PlayerId};
use crate::triggers::SummonKind;
use crate::zones::ZoneKind;

/// A validated normal summon or monster set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummonPlan {
    pub card: InstanceId,
    pub tributes: SmallVec<[InstanceId; 2]>,
    pub kind: SummonKind,
}

fn card_in_hand(
    state: &GameState,
    player: PlayerId,
    card: InstanceId,
) -> Result<&CardInstance, ActionError> {
    let instance = state.card(card).ok_or(ActionError::UnknownCard(card))?;
    if instance.owner != player {
        return Err(ActionError::NotOwner(card));
    }
    if instance.zone != ZoneKind::Hand {
        return Err(ActionError::NotInHand(card));
    }
    Ok(instance)
}

/// Monsters `player` may tribute.
#[must_use]
pub fn tribute_candidates(state: &GameState, player: PlayerId) -> Vec<InstanceId> {
    state.player(player).zones.monsters().collect()
}

/// Validate a normal (or tribute) summon. Also used for setting a monster.
pub fn validate_normal_summon(
    state: &GameState,
    config: &DuelConfig,
    player: PlayerId,
    card: InstanceId,
    tributes: &[InstanceId],
) -> Result<SummonPlan, ActionError> {
    let instance = card_in_hand(state, player, card)?;
    if !instance.is_monster() {
        return Err(ActionError::NotAMonster(card));
    }
    if state.player(player).normal_summon_used {
        return Err(ActionError::NormalSummonUsed);
    }

    let required = config.tributes_for_level(instance.base.level);
    if tributes.len() != required {
        return Err(ActionError::WrongTributeCount {
            required,
            provided: tributes.len(),
        });
    }

    let candidates = tribute_candidates(state, player);
    for (i, tribute) in tributes.iter().enumerate() {
        if !candidates.contains(tribute) || tributes[..i].contains(tribute) {
            return Err(ActionError::InvalidTribute(*tribute));
        }
    }

    if required == 0 && state.player(player).zones.free_slot(ZoneKind::MonsterZone).is_none() {
        return Err(ActionError::NoFreeZone(ZoneKind::MonsterZone));
    }

    Ok(SummonPlan {
        card,
        tributes: tributes.iter().copied().collect(),
        kind: if required == 0 { SummonKind::Normal } else { SummonKind::Tribute },
    })
}

/// Validate setting a spell or trap face-down from the hand.
pub fn validate_spell_set(
    state: &GameState,
    player: PlayerId,
    card: InstanceId,
) -> Result<(), ActionError> {
    let instance = card_in_hand(state, player, card)?;
    if instance.is_monster() {
        return Err(ActionError::InvalidTargets("monsters are set with tributes"));
    }
    if state.player(player).zones.free_slot(ZoneKind::SpellTrapZone).is_none() {
        return Err(ActionError::NoFreeZone(ZoneKind::SpellTrapZone));
    }
    Ok(())
}

/// Validate a special summon from the hand by the card's own condition.
pub fn validate_special_summon(
    state: &GameState,
    catalog: &CardCatalog,
    player: PlayerId,
    card: InstanceId,
) -> Result<(), ActionError> {
    let instance = card_in_hand(state, player, card)?;
    if !instance.is_monster() {
        return Err(ActionError::NotAMonster(card));
    }
    let template = catalog
        .get(instance.card)
        .ok_or(ActionError::SummonConditionNotMet(instance.card))?;
    let condition = template
        .special_summon
        .as_ref()
        .ok_or(ActionError::SummonConditionNotMet(instance.card))?;
    if !condition.holds(state, player, card) {
        return Err(ActionError::SummonConditionNotMet(instance.card));
    }
    if state.player(player).zones.free_slot(ZoneKind::MonsterZone).is_none() {
        return Err(ActionError::NoFreeZone(ZoneKind::MonsterZone));
    }
    Ok(())
}
