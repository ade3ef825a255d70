//! Card movement: draw, mill, discard, banish, search, return to deck,
//! send to graveyard, return to hand.

use rustc_hash::FxHashSet;

use crate::core::{GameState, InstanceId, InvariantViolation, PlayerId};
use crate::effects::effect::DeckPlacement;
use crate::effects::executor::Resolved;
use crate::effects::mutation::Mutation;
use crate::effects::targeting::CardFilter;
use crate::zones::{ZoneKind, ZonePosition};

fn enough(player: PlayerId, needed: usize, available: usize) -> Result<(), InvariantViolation> {
    if available < needed {
        return Err(InvariantViolation::NotEnoughCards { player, needed, available });
    }
    Ok(())
}

/// Move each resolved card to `to`. Cards already there are left alone.
fn move_cards(
    state: &GameState,
    resolved: &Resolved,
    to: ZoneKind,
    place: ZonePosition,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let mut mutations = Vec::new();
    for card in resolved.cards()? {
        if state.require_card(card)?.zone != to {
            mutations.push(Mutation::MoveCard { card, to, place });
        }
    }
    Ok(mutations)
}

pub fn draw(
    state: &GameState,
    resolved: &Resolved,
    count: usize,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let mut mutations = Vec::new();
    for &player in resolved.players()? {
        let deck = &state.player(player).zones.deck;
        enough(player, count, deck.len())?;
        mutations.extend(
            state
                .player(player)
                .zones
                .deck_top(count)
                .into_iter()
                .map(|card| Mutation::Draw { player, card }),
        );
    }
    Ok(mutations)
}

pub fn mill(
    state: &GameState,
    resolved: &Resolved,
    count: usize,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let mut mutations = Vec::new();
    for &player in resolved.players()? {
        let zones = &state.player(player).zones;
        enough(player, count, zones.deck.len())?;
        mutations.extend(zones.deck_top(count).into_iter().map(|card| Mutation::MoveCard {
            card,
            to: ZoneKind::Graveyard,
            place: ZonePosition::Top,
        }));
    }
    Ok(mutations)
}

/// Players discard their newest cards; chosen cards are discarded directly.
pub fn discard(
    state: &GameState,
    resolved: &Resolved,
    count: usize,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let cards: Vec<InstanceId> = match resolved {
        Resolved::Players(players) => {
            let mut cards = Vec::new();
            for &player in players {
                let zones = &state.player(player).zones;
                enough(player, count, zones.hand.len())?;
                cards.extend(zones.newest_in_hand(count));
            }
            cards
        }
        _ => {
            let cards = resolved.cards()?;
            for &card in &cards {
                if state.require_card(card)?.zone != ZoneKind::Hand {
                    return Err(InvariantViolation::NotInZone { card, zone: ZoneKind::Hand });
                }
            }
            cards.into_vec()
        }
    };

    Ok(cards
        .into_iter()
        .map(|card| Mutation::MoveCard {
            card,
            to: ZoneKind::Graveyard,
            place: ZonePosition::Top,
        })
        .collect())
}

pub fn banish(state: &GameState, resolved: &Resolved) -> Result<Vec<Mutation>, InvariantViolation> {
    move_cards(state, resolved, ZoneKind::Banished, ZonePosition::Top)
}

/// Add up to `count` matching cards from the deck to the hand, then shuffle.
pub fn search(
    state: &GameState,
    resolved: &Resolved,
    filter: &CardFilter,
    count: usize,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let mut mutations = Vec::new();
    for &player in resolved.players()? {
        let zones = &state.player(player).zones;
        let found: Vec<InstanceId> = zones
            .deck
            .iter()
            .rev()
            .filter(|id| state.card(**id).is_some_and(|c| filter.matches_card(c)))
            .take(count)
            .copied()
            .collect();
        if found.is_empty() {
            continue;
        }
        mutations.extend(found.into_iter().map(|card| Mutation::MoveCard {
            card,
            to: ZoneKind::Hand,
            place: ZonePosition::Top,
        }));
        mutations.push(Mutation::ShuffleDeck(player));
    }
    Ok(mutations)
}

pub fn return_to_deck(
    state: &GameState,
    resolved: &Resolved,
    placement: DeckPlacement,
) -> Result<Vec<Mutation>, InvariantViolation> {
    let place = match placement {
        DeckPlacement::Bottom => ZonePosition::Bottom,
        DeckPlacement::Top | DeckPlacement::Shuffle => ZonePosition::Top,
    };

    let mut mutations = Vec::new();
    let mut owners = Vec::new();
    let mut seen = FxHashSet::default();
    for card in resolved.cards()? {
        let owner = state.require_card(card)?.owner;
        mutations.push(Mutation::MoveCard { card, to: ZoneKind::Deck, place });
        if seen.insert(owner) {
            owners.push(owner);
        }
    }
    if placement == DeckPlacement::Shuffle {
        mutations.extend(owners.into_iter().map(Mutation::ShuffleDeck));
    }
    Ok(mutations)
}

pub fn send_to_graveyard(
    state: &GameState,
    resolved: &Resolved,
) -> Result<Vec<Mutation>, InvariantViolation> {
    move_cards(state, resolved, ZoneKind::Graveyard, ZonePosition::Top)
}

pub fn to_hand(state: &GameState, resolved: &Resolved) -> Result<Vec<Mutation>, InvariantViolation> {
    move_cards(state, resolved, ZoneKind::Hand, ZonePosition::Top)
}
