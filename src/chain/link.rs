//! Chain links.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::{InstanceId, PlayerId};
use crate::effects::SpellSpeed;

/// A card target captured at activation.
///
/// The move count pins the target to the object that was chosen: if the
/// card changes zones before resolution it no longer counts as that target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundTarget {
    pub card: InstanceId,
    pub moves: u32,
}

/// One activation on the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// 1-based position; CL1 is the first activation.
    pub number: usize,

    /// The activating card instance.
    pub source: InstanceId,

    /// Source's move count once activation finished.
    pub source_moves: u32,

    /// Template and effect index of the bound effect tree.
    pub card: CardId,
    pub effect: usize,

    pub controller: PlayerId,
    pub speed: SpellSpeed,

    /// Targets in the order they were chosen.
    pub targets: SmallVec<[BoundTarget; 2]>,

    /// Set by a later link's negation; the effect does nothing.
    pub negated: bool,
}

impl ChainLink {
    /// A link with no targets. `number` is assigned when pushed.
    #[must_use]
    pub fn new(
        source: InstanceId,
        source_moves: u32,
        card: CardId,
        effect: usize,
        controller: PlayerId,
        speed: SpellSpeed,
    ) -> Self {
        Self {
            number: 0,
            source,
            source_moves,
            card,
            effect,
            controller,
            speed,
            targets: SmallVec::new(),
            negated: false,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = BoundTarget>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }
}
