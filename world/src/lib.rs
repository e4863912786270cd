#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative per-run simulation state for the food web engine.
//!
//! A [`SimulationState`] is carved from a catalog ecosystem, a species
//! selection, and an optional invader request. It is advanced exclusively
//! through [`step`], one tick per call, and inspected through the [`query`]
//! module. The state owns every organism of its run; starting a new run means
//! building a new state, never reusing parts of an old one.

use std::collections::{HashMap, HashSet};

use food_web_catalog::Ecosystem;
use food_web_core::{
    invader_entry_tick, sanitize_population, Event, HistorySample, InvaderRequest,
    OrganismDefinition, OrganismId, ResolvedParams, SimulationConfig, StepError, TrophicLevel,
};
use tracing::{debug, trace};

mod session;
mod tick;

pub use session::Session;

/// Run-owned organism cloned from a catalog definition.
#[derive(Clone, Debug)]
pub struct Organism {
    definition: OrganismDefinition,
    level: TrophicLevel,
    params: ResolvedParams,
    population: f64,
    is_invader: bool,
    history: Vec<HistorySample>,
}

impl Organism {
    pub(crate) fn new(
        definition: OrganismDefinition,
        level: TrophicLevel,
        params: ResolvedParams,
        population: f64,
        is_invader: bool,
    ) -> Self {
        Self {
            definition,
            level,
            params,
            population: sanitize_population(population),
            is_invader,
            history: Vec::new(),
        }
    }

    /// Identifier of the organism.
    #[must_use]
    pub fn id(&self) -> &OrganismId {
        self.definition.id()
    }

    /// Display name of the organism.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Catalog definition the organism was cloned from.
    #[must_use]
    pub fn definition(&self) -> &OrganismDefinition {
        &self.definition
    }

    /// Structural trophic level used to resolve parameters.
    #[must_use]
    pub const fn trophic_level(&self) -> TrophicLevel {
        self.level
    }

    /// Parameters resolved for the organism when it joined the run.
    #[must_use]
    pub const fn params(&self) -> &ResolvedParams {
        &self.params
    }

    /// Current population.
    #[must_use]
    pub const fn population(&self) -> f64 {
        self.population
    }

    /// Reports whether the organism entered the run as an invader.
    #[must_use]
    pub const fn is_invader(&self) -> bool {
        self.is_invader
    }

    /// Reports whether the organism has no prey.
    #[must_use]
    pub fn is_producer(&self) -> bool {
        self.definition.is_producer()
    }

    /// Samples recorded at the end of every tick the organism was active for.
    #[must_use]
    pub fn history(&self) -> &[HistorySample] {
        &self.history
    }

    /// Population recorded for the one-based `tick`, if the organism was active.
    #[must_use]
    pub fn population_at(&self, tick: u32) -> Option<f64> {
        self.history
            .binary_search_by_key(&tick, |sample| sample.tick)
            .ok()
            .map(|index| self.history[index].population)
    }

    fn set_population(&mut self, population: f64) {
        self.population = sanitize_population(population);
    }
}

/// Invasive species waiting for, or already past, its entry tick.
#[derive(Clone, Debug)]
pub struct InvaderDescriptor {
    definition: OrganismDefinition,
    level: TrophicLevel,
    start_population: f64,
    introduced: bool,
}

impl InvaderDescriptor {
    /// Catalog definition of the invading organism.
    #[must_use]
    pub fn definition(&self) -> &OrganismDefinition {
        &self.definition
    }

    /// Structural trophic level of the invading organism.
    #[must_use]
    pub const fn trophic_level(&self) -> TrophicLevel {
        self.level
    }

    /// Population the invader enters with.
    #[must_use]
    pub const fn start_population(&self) -> f64 {
        self.start_population
    }

    /// Reports whether the invader already joined the active organisms.
    #[must_use]
    pub const fn introduced(&self) -> bool {
        self.introduced
    }
}

/// Mutable snapshot of a single run.
#[derive(Clone, Debug)]
pub struct SimulationState {
    organisms: Vec<Organism>,
    index: HashMap<OrganismId, usize>,
    invader: Option<InvaderDescriptor>,
    config: SimulationConfig,
    next_tick: u32,
    total_ticks: Option<u32>,
}

impl SimulationState {
    /// Initializes a run using the built-in [`SimulationConfig`].
    #[must_use]
    pub fn init(
        ecosystem: &Ecosystem,
        selected: &[OrganismId],
        invader: Option<&InvaderRequest>,
    ) -> Self {
        Self::init_with_config(ecosystem, selected, invader, SimulationConfig::default())
    }

    /// Initializes a run from a species selection and optional invader request.
    ///
    /// Unknown identifiers are dropped and duplicates collapse. Active
    /// organisms follow catalog order regardless of selection order. A
    /// requested invader is excluded from the initial organisms even when it
    /// is also selected, so at most one instance of it ever exists.
    #[must_use]
    pub fn init_with_config(
        ecosystem: &Ecosystem,
        selected: &[OrganismId],
        invader: Option<&InvaderRequest>,
        config: SimulationConfig,
    ) -> Self {
        let wanted: HashSet<&OrganismId> = selected.iter().collect();
        for id in &wanted {
            if ecosystem.organism(id).is_none() {
                debug!(ecosystem = %ecosystem.id(), species = %id, "dropping unknown species");
            }
        }

        let invader_id = invader.map(InvaderRequest::organism);
        let mut state = Self {
            organisms: Vec::with_capacity(wanted.len()),
            index: HashMap::with_capacity(wanted.len()),
            invader: None,
            config,
            next_tick: 0,
            total_ticks: None,
        };

        for definition in ecosystem.organisms() {
            if !wanted.contains(definition.id()) || invader_id == Some(definition.id()) {
                continue;
            }
            let level = level_in(ecosystem, definition.id());
            let params = state.config.resolve(level);
            let organism = Organism::new(
                definition.clone(),
                level,
                params,
                definition.population(),
                false,
            );
            state.insert(organism);
        }

        if let Some(request) = invader {
            match ecosystem.organism(request.organism()) {
                Some(definition) => {
                    state.invader = Some(InvaderDescriptor {
                        definition: definition.clone(),
                        level: level_in(ecosystem, definition.id()),
                        start_population: request.start_population(),
                        introduced: false,
                    });
                }
                None => {
                    debug!(
                        ecosystem = %ecosystem.id(),
                        invader = %request.organism(),
                        "dropping unknown invader"
                    );
                }
            }
        }

        state
    }

    fn insert(&mut self, organism: Organism) {
        if self.index.contains_key(organism.id()) {
            return;
        }
        let _ = self
            .index
            .insert(organism.id().clone(), self.organisms.len());
        self.organisms.push(organism);
    }

    fn inject_invader(&mut self, tick: u32, out_events: &mut Vec<Event>) {
        let Some(descriptor) = self.invader.as_mut() else {
            return;
        };
        if descriptor.introduced {
            return;
        }
        descriptor.introduced = true;

        let params = self.config.resolve(descriptor.level);
        let organism = Organism::new(
            descriptor.definition.clone(),
            descriptor.level,
            params,
            descriptor.start_population,
            true,
        );
        let id = organism.id().clone();
        let population = organism.population();
        debug!(invader = %id, population, tick, "invader introduced");
        self.insert(organism);
        out_events.push(Event::InvaderIntroduced {
            organism: id,
            population,
            tick,
        });
    }
}

fn level_in(ecosystem: &Ecosystem, id: &OrganismId) -> TrophicLevel {
    ecosystem
        .trophic_level(id)
        .unwrap_or(TrophicLevel::PRODUCER)
}

/// Advances `state` by exactly one tick.
///
/// Ticks must be stepped in order starting at zero and below `total_ticks`,
/// which must stay the same for the whole run. Each tick introduces a pending
/// invader when `tick` reaches half the run length, then runs the grow, eat
/// and die passes over every active organism. Numeric edge cases inside the
/// passes are absorbed; only sequencing violations are reported.
pub fn step(
    state: &mut SimulationState,
    tick: u32,
    total_ticks: u32,
    out_events: &mut Vec<Event>,
) -> Result<(), StepError> {
    if let Some(previous) = state.total_ticks {
        if previous != total_ticks {
            return Err(StepError::RunLengthChanged {
                previous,
                requested: total_ticks,
            });
        }
    }
    if tick >= total_ticks {
        return Err(StepError::RunComplete { tick, total_ticks });
    }
    if tick != state.next_tick {
        return Err(StepError::OutOfSequence {
            expected: state.next_tick,
            received: tick,
        });
    }
    state.total_ticks = Some(total_ticks);

    if tick == invader_entry_tick(total_ticks) {
        state.inject_invader(tick, out_events);
    }

    let multiplier = state.config.invader.consumption_factor_multiplier;
    tick::grow_pass(&mut state.organisms);
    tick::eat_pass(&mut state.organisms, &state.index, multiplier);
    tick::die_pass(&mut state.organisms, tick);

    state.next_tick = tick + 1;
    trace!(tick, organisms = state.organisms.len(), "tick completed");
    out_events.push(Event::TickCompleted { tick });
    Ok(())
}

/// Query functions that provide read-only access to the simulation state.
pub mod query {
    use food_web_core::{OrganismId, SimulationConfig};

    use super::{InvaderDescriptor, Organism, SimulationState};

    /// Current population of a single organism, keyed by identifier.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PopulationSnapshot {
        /// Identifier of the organism.
        pub id: OrganismId,
        /// Display name of the organism.
        pub name: String,
        /// Population after the most recent tick.
        pub population: f64,
        /// Indicates whether the organism entered as an invader.
        pub is_invader: bool,
    }

    /// Active organisms in processing order.
    ///
    /// The eat pass walks predators in exactly this order, so the order is
    /// significant for simulation outcomes.
    #[must_use]
    pub fn organisms(state: &SimulationState) -> &[Organism] {
        &state.organisms
    }

    /// Looks up an active organism by identifier.
    #[must_use]
    pub fn organism<'state>(
        state: &'state SimulationState,
        id: &OrganismId,
    ) -> Option<&'state Organism> {
        state
            .index
            .get(id)
            .and_then(|index| state.organisms.get(*index))
    }

    /// Invader descriptor of the run, pending or introduced.
    #[must_use]
    pub fn invader(state: &SimulationState) -> Option<&InvaderDescriptor> {
        state.invader.as_ref()
    }

    /// Configuration the run was initialized with.
    #[must_use]
    pub fn config(state: &SimulationState) -> &SimulationConfig {
        &state.config
    }

    /// Tick the next call to [`super::step`] must pass.
    #[must_use]
    pub fn next_tick(state: &SimulationState) -> u32 {
        state.next_tick
    }

    /// Populations of every active organism in processing order.
    #[must_use]
    pub fn current_populations(state: &SimulationState) -> Vec<PopulationSnapshot> {
        state
            .organisms
            .iter()
            .map(|organism| PopulationSnapshot {
                id: organism.id().clone(),
                name: organism.name().to_owned(),
                population: organism.population(),
                is_invader: organism.is_invader(),
            })
            .collect()
    }
}
