#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trophic classification derived from an ecosystem's prey graph.
//!
//! Two classifications live here and they are deliberately separate:
//!
//! * [`TrophicClassifier::level`] computes the structural level used for
//!   parameter resolution and population seeding. A producer sits at level
//!   zero and a consumer sits one above its highest-level prey that exists in
//!   the catalog.
//! * [`display_tier`] computes the presentation tier, which forces
//!   apex-flagged organisms into the top tier regardless of structure.
//!
//! The structural traversal walks the graph with an explicit stack, memoizes
//! every finished organism, and guards against revisiting an organism that is
//! still on the current path. A prey edge that closes a cycle contributes
//! level zero instead of recursing forever.

use std::collections::{BTreeMap, HashMap, HashSet};

use food_web_core::{DisplayTier, OrganismDefinition, OrganismId, TrophicLevel};
use tracing::debug;

/// Memoizing structural classifier over a set of organism definitions.
#[derive(Debug)]
pub struct TrophicClassifier<'a> {
    definitions: &'a [OrganismDefinition],
    by_id: HashMap<&'a OrganismId, &'a OrganismDefinition>,
    memo: HashMap<OrganismId, TrophicLevel>,
}

#[derive(Debug)]
struct Frame<'a> {
    definition: &'a OrganismDefinition,
    next_prey: usize,
    highest_prey: TrophicLevel,
}

impl<'a> Frame<'a> {
    fn new(definition: &'a OrganismDefinition) -> Self {
        Self {
            definition,
            next_prey: 0,
            highest_prey: TrophicLevel::PRODUCER,
        }
    }

    fn absorb(&mut self, level: TrophicLevel) {
        self.highest_prey = self.highest_prey.max(level);
    }

    fn finish(&self) -> TrophicLevel {
        if self.definition.is_producer() {
            TrophicLevel::PRODUCER
        } else {
            self.highest_prey.above()
        }
    }
}

impl<'a> TrophicClassifier<'a> {
    /// Indexes the provided definitions by identifier.
    ///
    /// When identifiers repeat, the first definition wins.
    #[must_use]
    pub fn new(definitions: &'a [OrganismDefinition]) -> Self {
        let mut by_id = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            let _ = by_id.entry(definition.id()).or_insert(definition);
        }

        Self {
            definitions,
            by_id,
            memo: HashMap::new(),
        }
    }

    /// Structural level of the organism registered under `id`.
    ///
    /// Returns `None` when the identifier is not part of the definitions.
    pub fn level(&mut self, id: &OrganismId) -> Option<TrophicLevel> {
        if let Some(level) = self.memo.get(id) {
            return Some(*level);
        }

        let root = *self.by_id.get(id)?;
        Some(self.traverse(root))
    }

    /// Structural levels of every definition, keyed by identifier.
    #[must_use]
    pub fn levels(mut self) -> BTreeMap<OrganismId, TrophicLevel> {
        let definitions = self.definitions;
        let mut levels = BTreeMap::new();
        for definition in definitions {
            if let Some(level) = self.level(definition.id()) {
                let _ = levels.entry(definition.id().clone()).or_insert(level);
            }
        }
        levels
    }

    fn traverse(&mut self, root: &'a OrganismDefinition) -> TrophicLevel {
        let mut on_path: HashSet<&'a OrganismId> = HashSet::new();
        let mut stack = vec![Frame::new(root)];
        let _ = on_path.insert(root.id());

        loop {
            let Some(top) = stack.last_mut() else {
                return TrophicLevel::PRODUCER;
            };

            let definition = top.definition;
            if let Some(prey_id) = definition.prey().get(top.next_prey) {
                top.next_prey += 1;

                let Some(prey) = self.by_id.get(prey_id).copied() else {
                    continue;
                };

                if on_path.contains(prey.id()) {
                    debug!(
                        predator = %definition.id(),
                        prey = %prey.id(),
                        "prey graph cycle detected; edge contributes level 0"
                    );
                    top.absorb(TrophicLevel::PRODUCER);
                    continue;
                }

                if let Some(level) = self.memo.get(prey.id()) {
                    top.absorb(*level);
                    continue;
                }

                let _ = on_path.insert(prey.id());
                stack.push(Frame::new(prey));
                continue;
            }

            let level = top.finish();
            let id = definition.id();
            let _ = self.memo.insert(id.clone(), level);
            let _ = on_path.remove(id);
            let _ = stack.pop();

            match stack.last_mut() {
                Some(parent) => parent.absorb(level),
                None => return level,
            }
        }
    }
}

/// Convenience wrapper computing every structural level in one pass.
#[must_use]
pub fn structural_levels(definitions: &[OrganismDefinition]) -> BTreeMap<OrganismId, TrophicLevel> {
    TrophicClassifier::new(definitions).levels()
}

/// Presentation tier of an organism given its structural level.
///
/// Apex-flagged organisms always land in [`DisplayTier::APEX`]; everything
/// else mirrors the structural level.
#[must_use]
pub fn display_tier(definition: &OrganismDefinition, level: TrophicLevel) -> DisplayTier {
    if definition.apex_predator() {
        DisplayTier::APEX
    } else {
        DisplayTier::new(level.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<OrganismDefinition> {
        vec![
            OrganismDefinition::new("plankton", "Plankton"),
            OrganismDefinition::new("jellyfish", "Jellyfish").with_prey(["plankton"]),
            OrganismDefinition::new("fish", "Fish").with_prey(["jellyfish", "plankton"]),
        ]
    }

    #[test]
    fn producers_sit_at_level_zero() {
        let definitions = chain();
        let mut classifier = TrophicClassifier::new(&definitions);
        assert_eq!(
            classifier.level(&OrganismId::new("plankton")),
            Some(TrophicLevel::PRODUCER)
        );
    }

    #[test]
    fn consumers_sit_above_highest_prey() {
        let definitions = chain();
        let mut classifier = TrophicClassifier::new(&definitions);
        assert_eq!(
            classifier.level(&OrganismId::new("fish")),
            Some(TrophicLevel::new(2))
        );
        assert_eq!(classifier.memo.len(), 3, "every visited organism is memoized");
    }

    #[test]
    fn unknown_identifier_has_no_level() {
        let definitions = chain();
        let mut classifier = TrophicClassifier::new(&definitions);
        assert_eq!(classifier.level(&OrganismId::new("whale")), None);
    }

    #[test]
    fn prey_missing_from_catalog_is_ignored() {
        let definitions = vec![OrganismDefinition::new("gull", "Gull").with_prey(["krill"])];
        let levels = structural_levels(&definitions);
        assert_eq!(levels[&OrganismId::new("gull")], TrophicLevel::new(1));
    }

    #[test]
    fn apex_flag_only_changes_display_tier() {
        let definitions = vec![
            OrganismDefinition::new("grasses", "Grasses"),
            OrganismDefinition::new("kangaroo", "Kangaroos").with_prey(["grasses"]),
            OrganismDefinition::new("dingo", "Dingoes")
                .with_prey(["kangaroo"])
                .with_apex_predator(true),
        ];
        let levels = structural_levels(&definitions);
        let dingo = &definitions[2];
        let level = levels[dingo.id()];

        assert_eq!(level, TrophicLevel::new(2));
        assert_eq!(display_tier(dingo, level), DisplayTier::APEX);
        assert_eq!(
            display_tier(&definitions[1], levels[definitions[1].id()]),
            DisplayTier::new(1)
        );
    }
}
