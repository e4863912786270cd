#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static registry of named ecosystems.
//!
//! Each [`Ecosystem`] owns an immutable list of organism definitions forming a
//! prey graph. Starting populations are seeded once, when the ecosystem is
//! built, from the structural trophic level of each organism. Runs never
//! mutate catalog data; they clone what they need.

use std::collections::BTreeMap;

use food_web_core::{
    CatalogError, DisplayTier, EcosystemId, OrganismDefinition, OrganismId, TrophicLevel,
};
use food_web_system_trophic::{display_tier, structural_levels};

mod built_in;
mod manifest;

/// Starting populations indexed by structural level; deeper levels use the last entry.
const SEED_POPULATIONS: [f64; 5] = [80.0, 40.0, 20.0, 10.0, 5.0];

/// Starting population assigned to an organism at `level`.
#[must_use]
pub fn seed_population(level: TrophicLevel) -> f64 {
    let index = usize::from(level.get()).min(SEED_POPULATIONS.len() - 1);
    SEED_POPULATIONS[index]
}

/// Named set of organism definitions with a default species selection.
#[derive(Clone, Debug)]
pub struct Ecosystem {
    id: EcosystemId,
    name: String,
    organisms: Vec<OrganismDefinition>,
    levels: BTreeMap<OrganismId, TrophicLevel>,
    default_species: Vec<OrganismId>,
}

impl Ecosystem {
    /// Builds an ecosystem, classifying every organism and seeding its population.
    ///
    /// Populations already present on the definitions are replaced by the
    /// level-based seed.
    #[must_use]
    pub fn new(
        id: impl Into<EcosystemId>,
        name: impl Into<String>,
        organisms: Vec<OrganismDefinition>,
        default_species: Vec<OrganismId>,
    ) -> Self {
        let levels = structural_levels(&organisms);
        let organisms = organisms
            .into_iter()
            .map(|definition| {
                let level = levels
                    .get(definition.id())
                    .copied()
                    .unwrap_or(TrophicLevel::PRODUCER);
                definition.with_population(seed_population(level))
            })
            .collect();

        Self {
            id: id.into(),
            name: name.into(),
            organisms,
            levels,
            default_species,
        }
    }

    /// Identifier of the ecosystem.
    #[must_use]
    pub fn id(&self) -> &EcosystemId {
        &self.id
    }

    /// Display name of the ecosystem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Organism definitions in catalog order.
    #[must_use]
    pub fn organisms(&self) -> &[OrganismDefinition] {
        &self.organisms
    }

    /// Looks up the definition registered under `id`.
    #[must_use]
    pub fn organism(&self, id: &OrganismId) -> Option<&OrganismDefinition> {
        self.organisms.iter().find(|definition| definition.id() == id)
    }

    /// Species selected when a caller does not provide a selection.
    #[must_use]
    pub fn default_species(&self) -> &[OrganismId] {
        &self.default_species
    }

    /// Structural level of the organism registered under `id`.
    #[must_use]
    pub fn trophic_level(&self, id: &OrganismId) -> Option<TrophicLevel> {
        self.levels.get(id).copied()
    }

    /// Presentation tier of the organism registered under `id`.
    #[must_use]
    pub fn display_tier(&self, id: &OrganismId) -> Option<DisplayTier> {
        let definition = self.organism(id)?;
        let level = self.trophic_level(id)?;
        Some(display_tier(definition, level))
    }

    /// Organisms whose prey list contains `id`, in catalog order.
    #[must_use]
    pub fn predators_of(&self, id: &OrganismId) -> Vec<&OrganismDefinition> {
        self.organisms
            .iter()
            .filter(|definition| definition.prey().contains(id))
            .collect()
    }
}

/// Registry of ecosystems addressable by identifier.
#[derive(Clone, Debug, Default)]
pub struct EcosystemCatalog {
    ecosystems: Vec<Ecosystem>,
}

impl EcosystemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the `ocean` and `ausNative` ecosystems.
    #[must_use]
    pub fn built_in() -> Self {
        Self {
            ecosystems: vec![built_in::ocean(), built_in::australian_native()],
        }
    }

    /// Parses ecosystems described in TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let ecosystems = manifest::parse(contents)?;
        Ok(Self { ecosystems })
    }

    /// Registers an ecosystem, replacing any previous one with the same identifier.
    pub fn insert(&mut self, ecosystem: Ecosystem) {
        match self
            .ecosystems
            .iter_mut()
            .find(|existing| existing.id() == ecosystem.id())
        {
            Some(existing) => *existing = ecosystem,
            None => self.ecosystems.push(ecosystem),
        }
    }

    /// Retrieves the ecosystem registered under `id`.
    pub fn get(&self, id: &EcosystemId) -> Result<&Ecosystem, CatalogError> {
        self.ecosystems
            .iter()
            .find(|ecosystem| ecosystem.id() == id)
            .ok_or_else(|| CatalogError::UnknownEcosystem(id.clone()))
    }

    /// Iterator over the registered ecosystems in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Ecosystem> {
        self.ecosystems.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_population_follows_level_table() {
        let seeds: Vec<f64> = (0..=6)
            .map(|level| seed_population(TrophicLevel::new(level)))
            .collect();
        assert_eq!(seeds, vec![80.0, 40.0, 20.0, 10.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn ecosystem_seeds_definitions_by_level() {
        let ecosystem = Ecosystem::new(
            "pond",
            "Pond",
            vec![
                OrganismDefinition::new("algae", "Algae").with_population(3.0),
                OrganismDefinition::new("snail", "Snail").with_prey(["algae"]),
            ],
            vec![OrganismId::new("algae")],
        );

        let algae = ecosystem
            .organism(&OrganismId::new("algae"))
            .expect("algae registered");
        let snail = ecosystem
            .organism(&OrganismId::new("snail"))
            .expect("snail registered");

        assert_eq!(algae.population(), 80.0);
        assert_eq!(snail.population(), 40.0);
    }

    #[test]
    fn insert_replaces_existing_identifier() {
        let mut catalog = EcosystemCatalog::new();
        catalog.insert(Ecosystem::new("pond", "Pond", Vec::new(), Vec::new()));
        catalog.insert(Ecosystem::new("pond", "Mill Pond", Vec::new(), Vec::new()));

        assert_eq!(catalog.iter().count(), 1);
        let pond = catalog.get(&EcosystemId::new("pond")).expect("pond registered");
        assert_eq!(pond.name(), "Mill Pond");
    }
}
