//! Effect DSL parser and validator.
//!
//! Compiles one catalog card from JSON into a `CardTemplate` with typed
//! effect trees. Everything structural is checked here, once, so resolution
//! never meets a malformed effect:
//! - Unknown actions, attributes, selectors, resources and enum values
//! - Selectors that do not fit their action (a card selector on `damage`)
//! - `chosen:N` beyond the declared targets
//! - Spell speeds that disagree with the effect type and card kind
//! - Trigger effects that declare targets or card costs
//! - Missing and cyclic `ref`s between subeffects
//!
//! Validation does not stop at the first problem. Every failing node is
//! reported with its path, e.g. `effects[1].effect.sequence[0].stat`.
//!
//! ## Node forms
//!
//! ```json
//! {"action": "damage", "amount": 800, "target": "opponent"}
//! {"sequence": [ ... ]}
//! {"if": {"life_at_most": 2000}, "then": { ... }, "else": { ... }}
//! {"ref": "subeffect-name"}
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::cards::{CardCategory, CardId, CardKind, CardTemplate, SpellKind, Stat, TrapKind};
use crate::continuous::{ContinuousAbility, ModifierDuration, StaticEffect};
use crate::triggers::{Subject, TriggerEvent, TriggerSpec};
use crate::turn::Phase;
use crate::zones::ZoneKind;

use super::condition::Condition;
use super::effect::{
    ActivationLimit, CardEffect, Cost, CostResource, DeckPlacement, EffectAction, EffectKind,
    EffectNode, SpellSpeed, SummonPosition,
};
use super::targeting::{CardFilter, Side, TargetSelector, TargetSpec, ZoneScope};

/// What is wrong with one node.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid catalog document: {0}")]
    Document(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("expected {0}")]
    ExpectedType(&'static str),
    #[error("unknown card kind `{0}`")]
    UnknownKind(String),
    #[error("unknown effect type `{0}`")]
    UnknownEffectType(String),
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
    #[error("malformed target selector `{0}`")]
    MalformedSelector(String),
    #[error("cost references unknown resource `{0}`")]
    UnknownResource(String),
    #[error("unknown {field} `{value}`")]
    UnknownValue { field: &'static str, value: String },
    #[error("unrecognized condition")]
    UnknownCondition,
    #[error("node is not an action, sequence, if or ref")]
    UnknownNode,
    #[error("subeffect `{0}` references itself")]
    CyclicRef(String),
    #[error("subeffect `{0}` does not exist")]
    UnknownRef(String),
    #[error("spell speed {0} is outside 1-3")]
    SpeedOutOfRange(u64),
    #[error("declared spell speed {declared} but this effect has speed {expected}")]
    SpeedMismatch { declared: u8, expected: u8 },
    #[error("`{0}` effects are only allowed on spells and traps")]
    ActivateOnMonster(&'static str),
    #[error("`{0}` is only allowed on monsters")]
    MonsterOnly(&'static str),
    #[error("trigger effects cannot declare targets")]
    TriggerTargets,
    #[error("trigger effects can only cost life points or the card itself")]
    TriggerCost,
    #[error("`chosen:{index}` but only {available} target(s) are declared")]
    ChosenOutOfRange { index: usize, available: usize },
    #[error("`{action}` needs a {expected} selector")]
    SelectorKind { action: &'static str, expected: &'static str },
    #[error("count must be at least 1")]
    ZeroCount,
    #[error("duplicate card id {0}")]
    DuplicateId(CardId),
}

/// A validation failure at one path.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct ParseError {
    pub path: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self { path: path.into(), kind }
    }

    /// The catalog document itself is unusable.
    #[must_use]
    pub fn document(message: impl Into<String>) -> Self {
        Self::new("$", ParseErrorKind::Document(message.into()))
    }
}

/// Every failure for one card of a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("card at index {index} rejected with {} error(s)", .errors.len())]
pub struct CatalogError {
    /// The card id, when it could be read.
    pub card: Option<CardId>,
    pub index: usize,
    pub errors: Vec<ParseError>,
}

impl CatalogError {
    #[must_use]
    pub fn duplicate(id: CardId, index: usize) -> Self {
        Self {
            card: Some(id),
            index,
            errors: vec![ParseError::new("id", ParseErrorKind::DuplicateId(id))],
        }
    }
}

/// Parse and validate one card object.
pub fn parse_card(value: &Value, index: usize) -> Result<CardTemplate, CatalogError> {
    let card = value
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .map(CardId);

    let mut parser = Parser::default();
    match parser.card(value) {
        Some(template) if parser.errors.is_empty() => Ok(template),
        _ => Err(CatalogError { card, index, errors: parser.errors }),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Actions whose selector must name players.
fn takes_players(action: &EffectAction) -> bool {
    matches!(
        action,
        EffectAction::Draw { .. }
            | EffectAction::Mill { .. }
            | EffectAction::Search { .. }
            | EffectAction::Damage { .. }
            | EffectAction::GainLife { .. }
    )
}

fn default_selector(action: &EffectAction) -> TargetSelector {
    match action {
        EffectAction::Negate => TargetSelector::PreviousLink,
        EffectAction::NegateAttack => TargetSelector::Attacker,
        EffectAction::Discard { .. } => TargetSelector::Controller,
        a if takes_players(a) => TargetSelector::Controller,
        _ => TargetSelector::This,
    }
}

#[derive(Default)]
struct Parser<'a> {
    errors: Vec<ParseError>,
    subeffects: Option<&'a Map<String, Value>>,
    /// Names of the subeffects currently being inlined.
    refs: Vec<String>,
}

impl<'a> Parser<'a> {
    // === Primitives ===

    fn fail<T>(&mut self, path: impl Into<String>, kind: ParseErrorKind) -> Option<T> {
        self.errors.push(ParseError::new(path, kind));
        None
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => self.fail(if path.is_empty() { "$" } else { path }, ParseErrorKind::ExpectedType("object")),
        }
    }

    fn required<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &'static str,
    ) -> Option<&'v Value> {
        match obj.get(key) {
            Some(value) => Some(value),
            None => self.fail(path, ParseErrorKind::MissingField(key)),
        }
    }

    fn string<'v>(&mut self, obj: &'v Map<String, Value>, path: &str, key: &'static str) -> Option<&'v str> {
        let value = self.required(obj, path, key)?;
        match value.as_str() {
            Some(s) => Some(s),
            None => self.fail(join(path, key), ParseErrorKind::ExpectedType("string")),
        }
    }

    fn uint(&mut self, value: &Value, path: &str) -> Option<u64> {
        match value.as_u64() {
            Some(n) => Some(n),
            None => self.fail(path, ParseErrorKind::ExpectedType("non-negative integer")),
        }
    }

    fn u32_at(&mut self, value: &Value, path: &str) -> Option<u32> {
        let n = self.uint(value, path)?;
        match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => self.fail(path, ParseErrorKind::ExpectedType("32-bit integer")),
        }
    }

    fn u32_field(&mut self, obj: &Map<String, Value>, path: &str, key: &'static str) -> Option<u32> {
        let value = self.required(obj, path, key)?;
        self.u32_at(value, &join(path, key))
    }

    /// Optional string field. `Some(None)` when absent, `None` on error.
    fn opt_str<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &'static str,
    ) -> Option<Option<&'v str>> {
        match obj.get(key) {
            None => Some(None),
            Some(value) => match value.as_str() {
                Some(s) => Some(Some(s)),
                None => self.fail(join(path, key), ParseErrorKind::ExpectedType("string")),
            },
        }
    }

    fn opt_bool(&mut self, obj: &Map<String, Value>, path: &str, key: &'static str) -> Option<bool> {
        match obj.get(key) {
            None => Some(false),
            Some(value) => match value.as_bool() {
                Some(b) => Some(b),
                None => self.fail(join(path, key), ParseErrorKind::ExpectedType("boolean")),
            },
        }
    }

    fn opt_u32(&mut self, obj: &Map<String, Value>, path: &str, key: &'static str) -> Option<Option<u32>> {
        match obj.get(key) {
            None => Some(None),
            Some(value) => self.u32_at(value, &join(path, key)).map(Some),
        }
    }

    /// Named enum value with a default when the key is absent.
    fn choice<T>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &'static str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        match self.opt_str(obj, path, key)? {
            None => Some(default),
            Some(name) => match parse(name) {
                Some(value) => Some(value),
                None => self.fail(
                    join(path, key),
                    ParseErrorKind::UnknownValue { field: key, value: name.to_string() },
                ),
            },
        }
    }

    fn count(&mut self, obj: &Map<String, Value>, path: &str) -> Option<usize> {
        match self.opt_u32(obj, path, "count")? {
            None => Some(1),
            Some(0) => self.fail(join(path, "count"), ParseErrorKind::ZeroCount),
            Some(n) => Some(n as usize),
        }
    }

    fn stat(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Stat> {
        let name = self.string(obj, path, "stat")?;
        match Stat::parse(name) {
            Some(stat) => Some(stat),
            None => self.fail(join(path, "stat"), ParseErrorKind::UnknownAttribute(name.to_string())),
        }
    }

    // === Cards ===

    fn card(&mut self, value: &'a Value) -> Option<CardTemplate> {
        let obj = self.object(value, "")?;

        if let Some(subs) = obj.get("subeffects") {
            match subs.as_object() {
                Some(map) => self.subeffects = Some(map),
                None => {
                    self.fail::<()>("subeffects", ParseErrorKind::ExpectedType("object"));
                }
            }
        }

        let id = self.u32_field(obj, "", "id");
        let name = self.string(obj, "", "name").map(str::to_string);
        let kind = self.card_kind(obj);
        let (Some(id), Some(name), Some(kind)) = (id, name, kind) else {
            return None;
        };

        let mut template = CardTemplate::new(CardId(id), name, kind);

        if let Some(effects) = obj.get("effects") {
            for (i, effect) in self.array(effects, "effects").iter().enumerate() {
                if let Some(effect) = self.effect(effect, &format!("effects[{i}]"), &kind) {
                    template.effects.push(effect);
                }
            }
        }

        if let Some(abilities) = obj.get("continuous") {
            for (i, ability) in self.array(abilities, "continuous").iter().enumerate() {
                if let Some(ability) = self.ability(ability, &format!("continuous[{i}]")) {
                    template.continuous.push(ability);
                }
            }
        }

        if let Some(condition) = obj.get("special_summon") {
            if !kind.is_monster() {
                self.fail::<()>("special_summon", ParseErrorKind::MonsterOnly("special_summon"));
            } else if let Some(condition) = self.condition(condition, "special_summon") {
                template.special_summon = Some(condition);
            }
        }

        let activates = template.effects.iter().any(|e| e.kind == EffectKind::Activate);
        if !kind.is_monster() && !activates {
            template.effects.push(CardEffect::new(
                EffectKind::Activate,
                kind.default_speed(EffectKind::Activate),
                EffectNode::empty(),
            ));
        }

        Some(template)
    }

    fn array<'v>(&mut self, value: &'v Value, path: &str) -> &'v [Value] {
        match value.as_array() {
            Some(items) => items,
            None => {
                self.fail::<()>(path, ParseErrorKind::ExpectedType("array"));
                &[]
            }
        }
    }

    fn card_kind(&mut self, obj: &Map<String, Value>) -> Option<CardKind> {
        let kind = self.string(obj, "", "kind")?;
        match kind {
            "monster" => {
                let level = self.u32_field(obj, "", "level");
                let atk = self.u32_field(obj, "", "atk");
                let def = self.u32_field(obj, "", "def");
                let level = match level {
                    Some(l) if l > u32::from(u8::MAX) => {
                        self.fail("level", ParseErrorKind::ExpectedType("level between 0 and 255"))
                    }
                    other => other,
                };
                Some(CardKind::Monster { level: level?, atk: atk?, def: def? })
            }
            "spell" => {
                let spell = self.choice(obj, "", "spell_type", SpellKind::Normal, |s| match s {
                    "normal" => Some(SpellKind::Normal),
                    "quick_play" => Some(SpellKind::QuickPlay),
                    "continuous" => Some(SpellKind::Continuous),
                    _ => None,
                })?;
                Some(CardKind::Spell(spell))
            }
            "trap" => {
                let trap = self.choice(obj, "", "trap_type", TrapKind::Normal, |s| match s {
                    "normal" => Some(TrapKind::Normal),
                    "continuous" => Some(TrapKind::Continuous),
                    "counter" => Some(TrapKind::Counter),
                    _ => None,
                })?;
                Some(CardKind::Trap(trap))
            }
            other => self.fail("kind", ParseErrorKind::UnknownKind(other.to_string())),
        }
    }

    // === Effects ===

    fn effect(&mut self, value: &'a Value, path: &str, card: &CardKind) -> Option<CardEffect> {
        let obj = self.object(value, path)?;

        let kind = match self.string(obj, path, "type") {
            Some(name) => match EffectKind::parse(name) {
                Some(kind) => Some(kind),
                None => self.fail(
                    join(path, "type"),
                    ParseErrorKind::UnknownEffectType(name.to_string()),
                ),
            },
            None => None,
        };
        let kind = match kind {
            Some(EffectKind::Activate) if card.is_monster() => {
                self.fail(join(path, "type"), ParseErrorKind::ActivateOnMonster("activate"))
            }
            other => other,
        };

        let speed = match (kind, obj.get("speed")) {
            (Some(kind), declared) => {
                let expected = card.default_speed(kind);
                match declared {
                    None => Some(expected),
                    Some(value) => self.speed(value, &join(path, "speed"), expected),
                }
            }
            (None, _) => None,
        };

        let limit = self.choice(obj, path, "limit", None, |s| match s {
            "once_per_turn" => Some(Some(ActivationLimit::OncePerTurn)),
            "once_per_duel" => Some(Some(ActivationLimit::OncePerDuel)),
            _ => None,
        });

        let cost = match obj.get("cost") {
            None => Some(None),
            Some(value) => self.cost(value, &join(path, "cost")).map(Some),
        };

        let condition = match obj.get("condition") {
            None => Some(None),
            Some(value) => self.condition(value, &join(path, "condition")).map(Some),
        };

        let trigger = match obj.get("trigger") {
            None if kind == Some(EffectKind::Trigger) => {
                self.fail(path, ParseErrorKind::MissingField("trigger"))
            }
            None => Some(None),
            Some(value) => self.trigger(value, &join(path, "trigger")).map(Some),
        };

        let mut targets = Vec::new();
        let mut targets_ok = true;
        if let Some(list) = obj.get("targets") {
            let list_path = join(path, "targets");
            if kind == Some(EffectKind::Trigger) {
                self.fail::<()>(list_path.clone(), ParseErrorKind::TriggerTargets);
                targets_ok = false;
            }
            for (i, spec) in self.array(list, &list_path).iter().enumerate() {
                match self.target_spec(spec, &format!("{list_path}[{i}]")) {
                    Some(spec) => targets.push(spec),
                    None => targets_ok = false,
                }
            }
        }

        if kind == Some(EffectKind::Trigger) {
            if let Some(Some(cost)) = cost {
                if matches!(cost.resource, CostResource::Hand | CostResource::Field) {
                    self.fail::<()>(join(path, "cost"), ParseErrorKind::TriggerCost);
                }
            }
        }

        let available: usize = targets.iter().map(|t: &TargetSpec| t.count).sum();
        let root = match self.required(obj, path, "effect") {
            Some(node) => self.node(node, &join(path, "effect"), available),
            None => None,
        };

        let mut effect = CardEffect::new(kind?, speed?, root?);
        effect.limit = limit?;
        effect.cost = cost?;
        effect.condition = condition?;
        effect.trigger = trigger?;
        if !targets_ok {
            return None;
        }
        effect.targets = targets;
        Some(effect)
    }

    fn speed(&mut self, value: &Value, path: &str, expected: SpellSpeed) -> Option<SpellSpeed> {
        let raw = self.uint(value, path)?;
        let Some(declared) = u8::try_from(raw).ok().and_then(SpellSpeed::new) else {
            return self.fail(path, ParseErrorKind::SpeedOutOfRange(raw));
        };
        if declared != expected {
            return self.fail(
                path,
                ParseErrorKind::SpeedMismatch {
                    declared: declared.value(),
                    expected: expected.value(),
                },
            );
        }
        Some(declared)
    }

    fn cost(&mut self, value: &Value, path: &str) -> Option<Cost> {
        let obj = self.object(value, path)?;
        let name = self.string(obj, path, "resource")?;
        let resource = match name {
            "life_points" => CostResource::LifePoints,
            "hand" => CostResource::Hand,
            "field" => CostResource::Field,
            "self" => CostResource::This,
            other => {
                return self.fail(
                    join(path, "resource"),
                    ParseErrorKind::UnknownResource(other.to_string()),
                )
            }
        };
        let amount = match resource {
            CostResource::LifePoints => self.u32_field(obj, path, "amount")?,
            CostResource::Hand | CostResource::Field => {
                match self.opt_u32(obj, path, "amount")? {
                    None => 1,
                    Some(0) => return self.fail(join(path, "amount"), ParseErrorKind::ZeroCount),
                    Some(n) => n,
                }
            }
            CostResource::This => 1,
        };
        Some(Cost::new(resource, amount))
    }

    fn trigger(&mut self, value: &Value, path: &str) -> Option<TriggerSpec> {
        let obj = self.object(value, path)?;
        let event = match self.string(obj, path, "event") {
            Some(name) => match TriggerEvent::parse(name) {
                Some(event) => Some(event),
                None => self.fail(
                    join(path, "event"),
                    ParseErrorKind::UnknownValue { field: "event", value: name.to_string() },
                ),
            },
            None => None,
        };
        let subject = self.choice(obj, path, "subject", Subject::Any, |s| match s {
            "self" => Some(Subject::This),
            "any" => Some(Subject::Any),
            _ => None,
        });
        let side = self.choice(obj, path, "side", Side::Either, Side::parse);
        let optional = self.opt_bool(obj, path, "optional");

        let mut spec = TriggerSpec::new(event?);
        spec.subject = subject?;
        spec.side = side?;
        spec.optional = optional?;
        Some(spec)
    }

    fn target_spec(&mut self, value: &Value, path: &str) -> Option<TargetSpec> {
        let obj = self.object(value, path)?;
        let count = self.count(obj, path);
        let filter = self.filter(value, path);
        Some(TargetSpec::new(filter?, count?))
    }

    fn filter(&mut self, value: &Value, path: &str) -> Option<CardFilter> {
        let obj = self.object(value, path)?;

        let scope = self.choice(obj, path, "zone", ZoneScope::Field, |s| match s {
            "field" => Some(ZoneScope::Field),
            other => ZoneKind::parse(other).map(ZoneScope::Zone),
        });
        let side = self.choice(obj, path, "side", Side::Either, Side::parse);
        let category = self.choice(obj, path, "category", None, |s| CardCategory::parse(s).map(Some));
        let card = self.opt_u32(obj, path, "card");
        let max_level = self.opt_u32(obj, path, "max_level");
        let min_atk = self.opt_u32(obj, path, "min_atk");
        let max_atk = self.opt_u32(obj, path, "max_atk");
        let face_up = self.opt_bool(obj, path, "face_up");
        let exclude_self = self.opt_bool(obj, path, "exclude_self");

        Some(CardFilter {
            scope: scope?,
            side: side?,
            category: category?,
            card: card?.map(CardId),
            max_level: max_level?,
            min_atk: min_atk?,
            max_atk: max_atk?,
            face_up: face_up?,
            exclude_self: exclude_self?,
        })
    }

    fn ability(&mut self, value: &Value, path: &str) -> Option<ContinuousAbility> {
        let obj = self.object(value, path)?;
        let affects = match self.required(obj, path, "affects") {
            Some(filter) => self.filter(filter, &join(path, "affects")),
            None => None,
        };

        let effect = if self.opt_bool(obj, path, "negate")? {
            Some(StaticEffect::Negate)
        } else {
            let stat = self.stat(obj, path);
            let amount = obj.get("amount");
            let value = obj.get("value");
            match (amount, value) {
                (Some(amount), _) => self
                    .signed(amount, &join(path, "amount"))
                    .and_then(|amount| Some(StaticEffect::Modify { stat: stat?, amount })),
                (None, Some(value)) => self
                    .u32_at(value, &join(path, "value"))
                    .and_then(|value| Some(StaticEffect::Override { stat: stat?, value })),
                (None, None) => self.fail(path, ParseErrorKind::MissingField("amount")),
            }
        };

        let condition = match obj.get("condition") {
            None => Some(None),
            Some(value) => self.condition(value, &join(path, "condition")).map(Some),
        };

        let mut ability = ContinuousAbility::new(affects?, effect?);
        ability.condition = condition?;
        Some(ability)
    }

    fn signed(&mut self, value: &Value, path: &str) -> Option<i32> {
        match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => self.fail(path, ParseErrorKind::ExpectedType("32-bit signed integer")),
        }
    }

    // === Conditions ===

    fn condition(&mut self, value: &Value, path: &str) -> Option<Condition> {
        if value.as_str() == Some("always") {
            return Some(Condition::Always);
        }
        let obj = self.object(value, path)?;
        let side = |parser: &mut Self| parser.choice(obj, path, "side", Side::Controller, Side::parse);

        if let Some(amount) = obj.get("life_at_most") {
            let amount = self.u32_at(amount, &join(path, "life_at_most"));
            return Some(Condition::LifeAtMost { side: side(self)?, amount: amount? });
        }
        if let Some(amount) = obj.get("life_at_least") {
            let amount = self.u32_at(amount, &join(path, "life_at_least"));
            return Some(Condition::LifeAtLeast { side: side(self)?, amount: amount? });
        }
        if let Some(count) = obj.get("hand_at_least") {
            let count = self.u32_at(count, &join(path, "hand_at_least"));
            return Some(Condition::HandAtLeast { side: side(self)?, count: count? as usize });
        }
        if let Some(filter) = obj.get("count") {
            let filter = self.filter(filter, &join(path, "count"));
            let at_least = self.opt_u32(obj, path, "at_least");
            let at_most = self.opt_u32(obj, path, "at_most");
            return Some(Condition::Count {
                filter: filter?,
                at_least: at_least?.map(|n| n as usize),
                at_most: at_most?.map(|n| n as usize),
            });
        }
        if obj.contains_key("no_monsters") {
            let side = self.choice(obj, path, "no_monsters", Side::Controller, Side::parse)?;
            return Some(Condition::no_monsters(side));
        }
        if obj.contains_key("phase") {
            let phase = self.choice(obj, path, "phase", Phase::Main1, Phase::parse)?;
            return Some(Condition::Phase(phase));
        }
        for key in ["all", "any"] {
            if let Some(list) = obj.get(key) {
                let list_path = join(path, key);
                let mut conditions = Vec::new();
                let mut ok = true;
                for (i, item) in self.array(list, &list_path).iter().enumerate() {
                    match self.condition(item, &format!("{list_path}[{i}]")) {
                        Some(c) => conditions.push(c),
                        None => ok = false,
                    }
                }
                if !ok {
                    return None;
                }
                return Some(if key == "all" {
                    Condition::All(conditions)
                } else {
                    Condition::Any(conditions)
                });
            }
        }
        if let Some(inner) = obj.get("not") {
            let inner = self.condition(inner, &join(path, "not"))?;
            return Some(Condition::Not(Box::new(inner)));
        }
        self.fail(path, ParseErrorKind::UnknownCondition)
    }

    // === Nodes ===

    fn node(&mut self, value: &'a Value, path: &str, targets: usize) -> Option<EffectNode> {
        let obj = self.object(value, path)?;

        if let Some(name) = obj.get("ref") {
            return self.reference(name, &join(path, "ref"), targets);
        }

        if let Some(children) = obj.get("sequence") {
            let seq_path = join(path, "sequence");
            let mut nodes = Vec::new();
            let mut ok = true;
            for (i, child) in self.array(children, &seq_path).iter().enumerate() {
                match self.node(child, &format!("{seq_path}[{i}]"), targets) {
                    Some(node) => nodes.push(node),
                    None => ok = false,
                }
            }
            return ok.then_some(EffectNode::Sequence(nodes));
        }

        if let Some(condition) = obj.get("if") {
            let condition = self.condition(condition, &join(path, "if"));
            let then = match self.required(obj, path, "then") {
                Some(then) => self.node(then, &join(path, "then"), targets),
                None => None,
            };
            let otherwise = match obj.get("else") {
                None => Some(None),
                Some(other) => self.node(other, &join(path, "else"), targets).map(Some),
            };
            return Some(EffectNode::Conditional {
                condition: condition?,
                then: Box::new(then?),
                otherwise: otherwise?.map(Box::new),
            });
        }

        if obj.contains_key("action") {
            return self.action_node(obj, path, targets);
        }

        self.fail(path, ParseErrorKind::UnknownNode)
    }

    fn reference(&mut self, name: &Value, path: &str, targets: usize) -> Option<EffectNode> {
        let Some(name) = name.as_str() else {
            return self.fail(path, ParseErrorKind::ExpectedType("string"));
        };
        let Some(node) = self.subeffects.and_then(|subs| subs.get(name)) else {
            return self.fail(path, ParseErrorKind::UnknownRef(name.to_string()));
        };
        if self.refs.iter().any(|r| r == name) {
            return self.fail(path, ParseErrorKind::CyclicRef(name.to_string()));
        }

        self.refs.push(name.to_string());
        let node = self.node(node, &format!("subeffects.{name}"), targets);
        self.refs.pop();
        node
    }

    fn action_node(&mut self, obj: &Map<String, Value>, path: &str, targets: usize) -> Option<EffectNode> {
        let name = self.string(obj, path, "action")?;

        let action = match name {
            "draw" => EffectAction::Draw { count: self.count(obj, path)? },
            "mill" => EffectAction::Mill { count: self.count(obj, path)? },
            "discard" => EffectAction::Discard { count: self.count(obj, path)? },
            "banish" => EffectAction::Banish,
            "search" => {
                let filter = match self.required(obj, path, "filter") {
                    Some(filter) => self.filter(filter, &join(path, "filter")),
                    None => None,
                };
                let count = self.count(obj, path);
                EffectAction::Search { filter: filter?, count: count? }
            }
            "return_to_deck" => {
                let placement = self.choice(obj, path, "placement", DeckPlacement::Shuffle, |s| match s {
                    "top" => Some(DeckPlacement::Top),
                    "bottom" => Some(DeckPlacement::Bottom),
                    "shuffle" => Some(DeckPlacement::Shuffle),
                    _ => None,
                })?;
                EffectAction::ReturnToDeck { placement }
            }
            "send_to_graveyard" => EffectAction::SendToGraveyard,
            "to_hand" => EffectAction::ToHand,
            "damage" => EffectAction::Damage { amount: self.u32_field(obj, path, "amount")? },
            "gain_life" => EffectAction::GainLife { amount: self.u32_field(obj, path, "amount")? },
            "modify_stat" => {
                let stat = self.stat(obj, path);
                let amount = match self.required(obj, path, "amount") {
                    Some(amount) => self.signed(amount, &join(path, "amount")),
                    None => None,
                };
                let until = self.duration(obj, path);
                EffectAction::ModifyStat { stat: stat?, amount: amount?, until: until? }
            }
            "set_stat" => {
                let stat = self.stat(obj, path);
                let value = self.u32_field(obj, path, "value");
                let until = self.duration(obj, path);
                EffectAction::SetStat { stat: stat?, value: value?, until: until? }
            }
            "special_summon" => {
                let position = self.choice(obj, path, "position", SummonPosition::Attack, |s| match s {
                    "attack" => Some(SummonPosition::Attack),
                    "defense" => Some(SummonPosition::Defense),
                    _ => None,
                })?;
                EffectAction::SpecialSummon { position }
            }
            "destroy" => EffectAction::Destroy,
            "negate" => EffectAction::Negate,
            "negate_attack" => EffectAction::NegateAttack,
            other => {
                return self.fail(join(path, "action"), ParseErrorKind::UnknownAction(other.to_string()))
            }
        };

        let target = match obj.get("target") {
            None => default_selector(&action),
            Some(value) => self.selector(value, &join(path, "target"), targets)?,
        };

        let flexible = matches!(action, EffectAction::Discard { .. });
        let wants_players = takes_players(&action);
        if !flexible && wants_players != target.selects_players() {
            return self.fail(
                join(path, "target"),
                ParseErrorKind::SelectorKind {
                    action: action.name(),
                    expected: if wants_players { "player" } else { "card" },
                },
            );
        }

        Some(EffectNode::Action { action, target })
    }

    fn duration(&mut self, obj: &Map<String, Value>, path: &str) -> Option<ModifierDuration> {
        self.choice(obj, path, "until", ModifierDuration::EndOfTurn, ModifierDuration::parse)
    }

    fn selector(&mut self, value: &Value, path: &str, targets: usize) -> Option<TargetSelector> {
        if let Some(name) = value.as_str() {
            let Some(selector) = TargetSelector::parse(name) else {
                return self.fail(path, ParseErrorKind::MalformedSelector(name.to_string()));
            };
            if let TargetSelector::Chosen(index) = selector {
                if index >= targets {
                    return self.fail(
                        path,
                        ParseErrorKind::ChosenOutOfRange { index, available: targets },
                    );
                }
            }
            return Some(selector);
        }

        match value.as_object().and_then(|obj| obj.get("all")) {
            Some(filter) => self.filter(filter, &join(path, "all")).map(TargetSelector::All),
            None => self.fail(path, ParseErrorKind::MalformedSelector(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<CardTemplate, CatalogError> {
        parse_card(&value, 0)
    }

    fn kinds(err: &CatalogError) -> Vec<(&str, &ParseErrorKind)> {
        err.errors.iter().map(|e| (e.path.as_str(), &e.kind)).collect()
    }

    #[test]
    fn test_vanilla_monster() {
        let card = parse(json!({
            "id": 100, "name": "Vanguard Knight", "kind": "monster",
            "level": 4, "atk": 1800, "def": 1200
        }))
        .unwrap();
        assert_eq!(card.kind, CardKind::Monster { level: 4, atk: 1800, def: 1200 });
        assert!(card.effects.is_empty());
    }

    #[test]
    fn test_spell_with_sequence() {
        let card = parse(json!({
            "id": 200, "name": "Pot", "kind": "spell",
            "effects": [{
                "type": "activate",
                "effect": {"sequence": [
                    {"action": "draw", "count": 2},
                    {"action": "damage", "amount": 300, "target": "opponent"}
                ]}
            }]
        }))
        .unwrap();

        let effect = &card.effects[0];
        assert_eq!(effect.kind, EffectKind::Activate);
        assert_eq!(effect.speed, SpellSpeed::ONE);
        assert_eq!(effect.root.action_count(), 2);
        let EffectNode::Sequence(children) = &effect.root else {
            panic!("expected a sequence");
        };
        assert_eq!(
            children[0],
            EffectNode::action(EffectAction::Draw { count: 2 }, TargetSelector::Controller)
        );
    }

    #[test]
    fn test_trap_speed_defaults() {
        let card = parse(json!({
            "id": 302, "name": "Counter", "kind": "trap", "trap_type": "counter",
            "effects": [{"type": "activate", "cost": {"resource": "life_points", "amount": 1000},
                         "effect": {"action": "negate"}}]
        }))
        .unwrap();
        let effect = &card.effects[0];
        assert_eq!(effect.speed, SpellSpeed::THREE);
        assert_eq!(effect.cost, Some(Cost::new(CostResource::LifePoints, 1000)));
        assert_eq!(
            effect.root,
            EffectNode::action(EffectAction::Negate, TargetSelector::PreviousLink)
        );
    }

    #[test]
    fn test_speed_mismatch() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "effects": [{"type": "activate", "speed": 2, "effect": {"action": "draw"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("effects[0].speed", &ParseErrorKind::SpeedMismatch { declared: 2, expected: 1 })]
        );
    }

    #[test]
    fn test_reports_every_bad_node_with_path() {
        let err = parse(json!({
            "id": 7, "name": "Broken", "kind": "monster", "level": 4, "atk": 0, "def": 0,
            "effects": [
                {"type": "ignition", "effect": {"action": "explode"}},
                {"type": "ignition", "effect": {"sequence": [
                    {"action": "modify_stat", "stat": "speed", "amount": 100},
                    {"action": "destroy", "target": "everyone"}
                ]}}
            ]
        }))
        .unwrap_err();

        assert_eq!(err.card, Some(CardId(7)));
        assert_eq!(
            kinds(&err),
            vec![
                ("effects[0].effect.action", &ParseErrorKind::UnknownAction("explode".into())),
                (
                    "effects[1].effect.sequence[0].stat",
                    &ParseErrorKind::UnknownAttribute("speed".into())
                ),
                (
                    "effects[1].effect.sequence[1].target",
                    &ParseErrorKind::MalformedSelector("everyone".into())
                ),
            ]
        );
    }

    #[test]
    fn test_unknown_cost_resource() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "effects": [{"type": "activate", "cost": {"resource": "mana", "amount": 3},
                         "effect": {"action": "draw"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("effects[0].cost.resource", &ParseErrorKind::UnknownResource("mana".into()))]
        );
    }

    #[test]
    fn test_refs_inline() {
        let card = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "subeffects": {"burn": {"action": "damage", "amount": 500, "target": "opponent"}},
            "effects": [{"type": "activate", "effect": {"sequence": [{"ref": "burn"}, {"ref": "burn"}]}}]
        }))
        .unwrap();
        assert_eq!(card.effects[0].root.action_count(), 2);
    }

    #[test]
    fn test_cyclic_ref_rejected() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "subeffects": {
                "a": {"sequence": [{"action": "draw"}, {"ref": "b"}]},
                "b": {"ref": "a"}
            },
            "effects": [{"type": "activate", "effect": {"ref": "a"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("subeffects.b.ref", &ParseErrorKind::CyclicRef("a".into()))]
        );
    }

    #[test]
    fn test_unknown_ref() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "effects": [{"type": "activate", "effect": {"ref": "missing"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("effects[0].effect.ref", &ParseErrorKind::UnknownRef("missing".into()))]
        );
    }

    #[test]
    fn test_selector_kind_checked() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "effects": [{"type": "activate", "effect": {"action": "damage", "amount": 1, "target": "self"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![(
                "effects[0].effect.target",
                &ParseErrorKind::SelectorKind { action: "damage", expected: "player" }
            )]
        );
    }

    #[test]
    fn test_chosen_needs_declared_target() {
        let ok = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "effects": [{"type": "activate",
                         "targets": [{"zone": "monster_zone", "side": "opponent", "category": "monster"}],
                         "effect": {"action": "destroy", "target": "chosen:0"}}]
        }))
        .unwrap();
        assert_eq!(ok.effects[0].target_count(), 1);

        let err = parse(json!({
            "id": 1, "name": "X", "kind": "spell",
            "effects": [{"type": "activate", "effect": {"action": "destroy", "target": "chosen:0"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![(
                "effects[0].effect.target",
                &ParseErrorKind::ChosenOutOfRange { index: 0, available: 0 }
            )]
        );
    }

    #[test]
    fn test_trigger_restrictions() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "monster", "level": 4, "atk": 0, "def": 0,
            "effects": [{
                "type": "trigger",
                "trigger": {"event": "destroyed", "subject": "self"},
                "cost": {"resource": "hand", "amount": 1},
                "targets": [{"zone": "monster_zone"}],
                "effect": {"action": "draw"}
            }]
        }))
        .unwrap_err();
        let found: Vec<_> = err.errors.iter().map(|e| e.kind.clone()).collect();
        assert!(found.contains(&ParseErrorKind::TriggerTargets));
        assert!(found.contains(&ParseErrorKind::TriggerCost));
    }

    #[test]
    fn test_trigger_requires_event() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "monster", "level": 4, "atk": 0, "def": 0,
            "effects": [{"type": "trigger", "effect": {"action": "draw"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("effects[0]", &ParseErrorKind::MissingField("trigger"))]
        );
    }

    #[test]
    fn test_activate_on_monster_rejected() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "monster", "level": 4, "atk": 0, "def": 0,
            "effects": [{"type": "activate", "effect": {"action": "draw"}}]
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("effects[0].type", &ParseErrorKind::ActivateOnMonster("activate"))]
        );
    }

    #[test]
    fn test_continuous_spell_gets_activation() {
        let card = parse(json!({
            "id": 202, "name": "Iron Aura", "kind": "spell", "spell_type": "continuous",
            "continuous": [{"affects": {"zone": "monster_zone", "side": "controller", "category": "monster"},
                            "stat": "atk", "amount": 500}]
        }))
        .unwrap();
        assert_eq!(card.effects.len(), 1);
        assert_eq!(card.effects[0].kind, EffectKind::Activate);
        assert_eq!(card.effects[0].root, EffectNode::empty());
        assert_eq!(
            card.continuous[0].effect,
            StaticEffect::Modify { stat: Stat::Atk, amount: 500 }
        );
    }

    #[test]
    fn test_conditions() {
        let card = parse(json!({
            "id": 107, "name": "Rift Walker", "kind": "monster", "level": 5, "atk": 1900, "def": 0,
            "special_summon": {"all": [{"no_monsters": "controller"}, {"count": {"side": "opponent", "category": "monster"}, "at_least": 1}]}
        }))
        .unwrap();
        let Some(Condition::All(parts)) = card.special_summon else {
            panic!("expected an all-condition");
        };
        assert_eq!(parts[0], Condition::no_monsters(Side::Controller));
        assert!(matches!(parts[1], Condition::Count { at_least: Some(1), at_most: None, .. }));
    }

    #[test]
    fn test_special_summon_only_on_monsters() {
        let err = parse(json!({
            "id": 1, "name": "X", "kind": "trap", "special_summon": "always"
        }))
        .unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![("special_summon", &ParseErrorKind::MonsterOnly("special_summon"))]
        );
    }

    #[test]
    fn test_unknown_kind_keeps_id() {
        let err = parse(json!({"id": 9, "name": "X", "kind": "dragon"})).unwrap_err();
        assert_eq!(err.card, Some(CardId(9)));
        assert_eq!(kinds(&err), vec![("kind", &ParseErrorKind::UnknownKind("dragon".into()))]);
    }

    #[test]
    fn test_error_display() {
        let error = ParseError::new("effects[0].stat", ParseErrorKind::UnknownAttribute("hp".into()));
        assert_eq!(error.to_string(), "effects[0].stat: unknown attribute `hp`");
    }
}
