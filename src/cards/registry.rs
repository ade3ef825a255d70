//! Card catalog for template lookup.
//!
//! The `CardCatalog` is the immutable card database handed to a duel at
//! setup. Catalogs are usually loaded from JSON; every card's effects are
//! validated once at load time, and a card that fails validation is left out
//! and reported rather than failing the whole load.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::effects::parser::{self, CatalogError, ParseError};

use super::definition::{CardId, CardTemplate};

/// Result of loading a catalog from JSON.
#[derive(Debug)]
pub struct CatalogLoad {
    /// Every card that validated.
    pub catalog: CardCatalog,
    /// One entry per rejected card.
    pub rejected: Vec<CatalogError>,
}

/// Registry of card templates.
///
/// ## Example
///
/// ```
/// use duel_rules::cards::{CardCatalog, CardId};
///
/// let load = CardCatalog::from_json_str(r#"[
///     {"id": 1, "name": "Vanguard Knight", "kind": "monster", "level": 4, "atk": 1800, "def": 1200}
/// ]"#).unwrap();
///
/// assert!(load.rejected.is_empty());
/// let knight = load.catalog.get(CardId::new(1)).unwrap();
/// assert_eq!(knight.name, "Vanguard Knight");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, CardTemplate>,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, returning the one it replaced.
    pub fn insert(&mut self, template: CardTemplate) -> Option<CardTemplate> {
        self.cards.insert(template.id, template)
    }

    /// Add a template (builder pattern).
    #[must_use]
    pub fn with(mut self, template: CardTemplate) -> Self {
        self.insert(template);
        self
    }

    /// Get a template by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardTemplate> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All templates, sorted by ID.
    #[must_use]
    pub fn templates(&self) -> Vec<&CardTemplate> {
        let mut templates: Vec<_> = self.cards.values().collect();
        templates.sort_by_key(|t| t.id);
        templates
    }

    /// Load a catalog from a JSON array of card objects.
    ///
    /// Fails only if the document itself is not a JSON array. Cards that do
    /// not validate are collected in `CatalogLoad::rejected`.
    pub fn from_json_str(json: &str) -> Result<CatalogLoad, ParseError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ParseError::document(e.to_string()))?;
        let cards = value
            .as_array()
            .ok_or_else(|| ParseError::document("catalog must be a JSON array"))?;

        let mut catalog = CardCatalog::new();
        let mut rejected = Vec::new();

        for (index, card) in cards.iter().enumerate() {
            match parser::parse_card(card, index) {
                Ok(template) => {
                    if catalog.contains(template.id) {
                        warn!(card = %template.id, "duplicate card id in catalog");
                        rejected.push(CatalogError::duplicate(template.id, index));
                    } else {
                        catalog.insert(template);
                    }
                }
                Err(error) => {
                    warn!(card = ?error.card, errors = error.errors.len(), "rejected card");
                    rejected.push(error);
                }
            }
        }

        debug!(loaded = catalog.len(), rejected = rejected.len(), "catalog loaded");
        Ok(CatalogLoad { catalog, rejected })
    }
}
