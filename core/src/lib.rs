#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the food web engine.
//!
//! This crate defines the vocabulary that connects the ecosystem catalog, the
//! authoritative per-run simulation state, and the pure systems that derive
//! views from it. Catalogs publish immutable [`OrganismDefinition`] values,
//! the world clones them into run-owned organisms and advances them one tick
//! at a time, and broadcasts [`Event`] values describing what happened so
//! adapters can react without inspecting internal state.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{
    ConfigError, DieOverride, DieParams, EatOverride, EatParams, GrowOverride, GrowParams,
    InvaderParams, LevelOverride, ResolvedParams, SimulationConfig,
};

/// Shortest run length accepted at the engine boundary.
pub const MIN_RUN_TICKS: u32 = 10;

/// Longest run length accepted at the engine boundary.
pub const MAX_RUN_TICKS: u32 = 500;

/// Smallest starting population an invader may be configured with.
pub const MIN_INVADER_POPULATION: u32 = 1;

/// Largest starting population an invader may be configured with.
pub const MAX_INVADER_POPULATION: u32 = 50;

/// Starting population used when an invader request omits one.
pub const DEFAULT_INVADER_POPULATION: f64 = 5.0;

/// Identifier of an organism, unique within its ecosystem.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganismId(String);

impl OrganismId {
    /// Creates a new organism identifier from the provided text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganismId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for OrganismId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of an ecosystem registered in a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EcosystemId(String);

impl EcosystemId {
    /// Creates a new ecosystem identifier from the provided text.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EcosystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for EcosystemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Structural trophic level derived from the prey graph.
///
/// Producers sit at level zero and every consumer sits one level above its
/// highest-level prey. This value selects configuration overrides and seeds
/// catalog populations; it is never altered by presentation concerns such as
/// the apex predator flag (see [`DisplayTier`]).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrophicLevel(u8);

impl TrophicLevel {
    /// Level assigned to organisms without prey.
    pub const PRODUCER: Self = Self(0);

    /// Creates a new trophic level wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Level directly above this one, saturating at `u8::MAX`.
    #[must_use]
    pub const fn above(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for TrophicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presentation-only tier used when grouping organisms into a pyramid.
///
/// Equal to the structural level except that apex-flagged organisms are
/// forced into [`DisplayTier::APEX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayTier(u8);

impl DisplayTier {
    /// Tier reserved for apex predators.
    pub const APEX: Self = Self(4);

    /// Creates a new display tier wrapper.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric tier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Human readable label for the tier.
    #[must_use]
    pub fn label(&self) -> String {
        match self.0 {
            0 => "Producers".to_owned(),
            1 => "Primary Consumers".to_owned(),
            2 => "Secondary Consumers".to_owned(),
            3 => "Tertiary Consumers".to_owned(),
            4 => "Apex Predators".to_owned(),
            other => format!("Level {other}"),
        }
    }
}

/// Immutable description of a species owned by a catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganismDefinition {
    id: OrganismId,
    name: String,
    prey: Vec<OrganismId>,
    apex_predator: bool,
    image: Option<String>,
    population: f64,
}

impl OrganismDefinition {
    /// Creates a producer definition with no prey and no seeded population.
    #[must_use]
    pub fn new(id: impl Into<OrganismId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prey: Vec::new(),
            apex_predator: false,
            image: None,
            population: 0.0,
        }
    }

    /// Replaces the prey list of the definition.
    #[must_use]
    pub fn with_prey<I, P>(mut self, prey: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<OrganismId>,
    {
        self.prey = prey.into_iter().map(Into::into).collect();
        self
    }

    /// Flags the definition as an apex predator for display purposes.
    #[must_use]
    pub fn with_apex_predator(mut self, apex_predator: bool) -> Self {
        self.apex_predator = apex_predator;
        self
    }

    /// Attaches a presentation image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Overrides the seeded starting population.
    #[must_use]
    pub fn with_population(mut self, population: f64) -> Self {
        self.population = sanitize_population(population);
        self
    }

    /// Identifier of the organism.
    #[must_use]
    pub fn id(&self) -> &OrganismId {
        &self.id
    }

    /// Display name of the organism.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifiers of the organisms this organism preys upon.
    #[must_use]
    pub fn prey(&self) -> &[OrganismId] {
        &self.prey
    }

    /// Reports whether the organism has no prey and therefore grows on its own.
    #[must_use]
    pub fn is_producer(&self) -> bool {
        self.prey.is_empty()
    }

    /// Reports whether the organism carries the apex predator display flag.
    #[must_use]
    pub const fn apex_predator(&self) -> bool {
        self.apex_predator
    }

    /// Presentation image reference, if any.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Starting population seeded by the catalog.
    #[must_use]
    pub const fn population(&self) -> f64 {
        self.population
    }
}

/// Request to introduce an invasive species halfway through a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvaderRequest {
    organism: OrganismId,
    start_population: f64,
}

impl InvaderRequest {
    /// Creates a request using [`DEFAULT_INVADER_POPULATION`].
    #[must_use]
    pub fn new(organism: impl Into<OrganismId>) -> Self {
        Self {
            organism: organism.into(),
            start_population: DEFAULT_INVADER_POPULATION,
        }
    }

    /// Overrides the population the invader enters with.
    ///
    /// The value is clamped into
    /// [`MIN_INVADER_POPULATION`]..=[`MAX_INVADER_POPULATION`].
    #[must_use]
    pub fn with_start_population(mut self, start_population: f64) -> Self {
        self.start_population = sanitize_population(start_population).clamp(
            f64::from(MIN_INVADER_POPULATION),
            f64::from(MAX_INVADER_POPULATION),
        );
        self
    }

    /// Identifier of the organism that will invade.
    #[must_use]
    pub fn organism(&self) -> &OrganismId {
        &self.organism
    }

    /// Population the invader enters with.
    #[must_use]
    pub const fn start_population(&self) -> f64 {
        self.start_population
    }
}

/// Tick at which a pending invader joins a run of `total_ticks` ticks.
#[must_use]
pub const fn invader_entry_tick(total_ticks: u32) -> u32 {
    total_ticks / 2
}

/// Clamps a population into the observable domain.
///
/// Negative values clamp to zero and non-finite values collapse to zero so
/// that no pass can leak `NaN` or infinities into the run.
#[must_use]
pub fn sanitize_population(population: f64) -> f64 {
    if population.is_finite() {
        population.max(0.0)
    } else {
        0.0
    }
}

/// Population recorded for an organism at the end of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// One-based tick the sample was recorded for.
    pub tick: u32,
    /// Population after the die pass of that tick.
    pub population: f64,
}

/// Direction a population moved between its two most recent samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// The latest sample is strictly greater than the previous one.
    Up,
    /// The latest sample is strictly lower than the previous one.
    Down,
    /// Both samples are equal.
    Stable,
}

impl Trend {
    /// Classifies the change from `previous` to `current`.
    #[must_use]
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Self::Up
        } else if current < previous {
            Self::Down
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        };
        f.write_str(label)
    }
}

/// Events broadcast by the world while advancing a run.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a pending invader joined the active organisms.
    InvaderIntroduced {
        /// Identifier of the invading organism.
        organism: OrganismId,
        /// Population the invader entered with.
        population: f64,
        /// Zero-based tick during which the invader entered.
        tick: u32,
    },
    /// Confirms that every pass of a tick completed.
    TickCompleted {
        /// Zero-based tick that was processed.
        tick: u32,
    },
}

/// Errors reported by ecosystem catalogs.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No ecosystem is registered under the requested identifier.
    #[error("ecosystem `{0}` is not registered in the catalog")]
    UnknownEcosystem(EcosystemId),
    /// A catalog description could not be parsed.
    #[error("could not parse ecosystem catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// A catalog description contained an unusable organism definition.
    #[error("ecosystem `{ecosystem}` contains an invalid organism: {reason}")]
    InvalidDefinition {
        /// Ecosystem that contained the offending definition.
        ecosystem: EcosystemId,
        /// Description of the problem.
        reason: String,
    },
}

/// Sequencing violations raised when stepping a run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// No simulation state was initialized before stepping.
    #[error("simulation state has not been initialized")]
    Uninitialized,
    /// The requested tick lies beyond the configured run length.
    #[error("tick {tick} is beyond the run length of {total_ticks} ticks")]
    RunComplete {
        /// Tick that was requested.
        tick: u32,
        /// Configured run length.
        total_ticks: u32,
    },
    /// Ticks must be stepped in strictly increasing order starting at zero.
    #[error("expected tick {expected} but received tick {received}")]
    OutOfSequence {
        /// Tick the state expects next.
        expected: u32,
        /// Tick that was requested.
        received: u32,
    },
    /// The run length differs from the one used by earlier steps.
    #[error("run length changed from {previous} to {requested} ticks mid-run")]
    RunLengthChanged {
        /// Run length used by earlier steps.
        previous: u32,
        /// Run length supplied with the rejected step.
        requested: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invader_entry_tick_floors_half_of_run() {
        assert_eq!(invader_entry_tick(50), 25);
        assert_eq!(invader_entry_tick(51), 25);
        assert_eq!(invader_entry_tick(10), 5);
    }

    #[test]
    fn sanitize_population_clamps_negative_and_non_finite() {
        assert_eq!(sanitize_population(-3.5), 0.0);
        assert_eq!(sanitize_population(f64::NAN), 0.0);
        assert_eq!(sanitize_population(f64::INFINITY), 0.0);
        assert_eq!(sanitize_population(12.25), 12.25);
    }

    #[test]
    fn trend_uses_strict_comparisons() {
        assert_eq!(Trend::between(1.0, 2.0), Trend::Up);
        assert_eq!(Trend::between(2.0, 1.0), Trend::Down);
        assert_eq!(Trend::between(2.0, 2.0), Trend::Stable);
    }

    #[test]
    fn definition_without_prey_is_producer() {
        let plankton = OrganismDefinition::new("plankton", "Plankton");
        let fish = OrganismDefinition::new("fish", "Fish").with_prey(["plankton"]);

        assert!(plankton.is_producer());
        assert!(!fish.is_producer());
        assert_eq!(fish.prey(), &[OrganismId::new("plankton")]);
    }

    #[test]
    fn invader_request_defaults_to_five() {
        let request = InvaderRequest::new("octopus");
        assert_eq!(request.start_population(), DEFAULT_INVADER_POPULATION);
    }

    #[test]
    fn invader_start_population_stays_within_bounds() {
        let start = |population: f64| {
            InvaderRequest::new("octopus")
                .with_start_population(population)
                .start_population()
        };

        assert_eq!(start(-1.0), 1.0);
        assert_eq!(start(0.0), 1.0);
        assert_eq!(start(f64::NAN), 1.0);
        assert_eq!(start(12.5), 12.5);
        assert_eq!(start(80.0), 50.0);
    }

    #[test]
    fn display_tier_labels_cover_pyramid() {
        assert_eq!(DisplayTier::new(0).label(), "Producers");
        assert_eq!(DisplayTier::APEX.label(), "Apex Predators");
        assert_eq!(DisplayTier::new(7).label(), "Level 7");
    }
}
