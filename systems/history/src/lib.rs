#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation-facing views derived from the history of a run.
//!
//! Every function here is a pure read over a [`SimulationState`]; none of them
//! mutate the run or cache anything between calls.

use std::collections::BTreeMap;

use food_web_catalog::Ecosystem;
use food_web_core::{DisplayTier, OrganismId, Trend};
use food_web_system_trophic::display_tier;
use food_web_world::{query, SimulationState};
use serde::Serialize;

pub use food_web_world::query::PopulationSnapshot;

/// Current population of every active organism in processing order.
#[must_use]
pub fn current_populations(state: &SimulationState) -> Vec<PopulationSnapshot> {
    query::current_populations(state)
}

/// Direction of the latest population change for every active organism.
///
/// Organisms with fewer than two samples have no entry.
#[must_use]
pub fn trends(state: &SimulationState) -> BTreeMap<OrganismId, Trend> {
    query::organisms(state)
        .iter()
        .filter_map(|organism| match organism.history() {
            [.., previous, current] => Some((
                organism.id().clone(),
                Trend::between(previous.population, current.population),
            )),
            _ => None,
        })
        .collect()
}

/// Organism tracked by a [`TimeSeries`] column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesColumn {
    /// Identifier of the organism; columns are looked up by this value.
    pub id: OrganismId,
    /// Display name of the organism. Names are not guaranteed to be unique.
    pub name: String,
    /// Indicates whether the column tracks the invader.
    pub is_invader: bool,
}

/// Populations recorded for a single tick, one value per column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesRow {
    /// One-based tick of the row.
    pub tick: u32,
    /// Population of each column at `tick`, in column order.
    pub populations: Vec<f64>,
}

/// Tick-indexed table of populations.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    columns: Vec<SeriesColumn>,
    rows: Vec<SeriesRow>,
}

impl TimeSeries {
    /// Columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    /// Rows ordered by ascending tick.
    #[must_use]
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    /// Position of the column tracking `id`.
    #[must_use]
    pub fn column(&self, id: &OrganismId) -> Option<usize> {
        self.columns.iter().position(|column| &column.id == id)
    }

    /// Population of `id` recorded for the one-based `tick`.
    #[must_use]
    pub fn value(&self, tick: u32, id: &OrganismId) -> Option<f64> {
        let column = self.column(id)?;
        let row = self.rows.iter().find(|row| row.tick == tick)?;
        row.populations.get(column).copied()
    }
}

/// Builds the time series for ticks `1..=current_tick`.
///
/// An invader reports zero for every tick it has no sample for, and a pending
/// invader is listed as a column of zeros so the column set stays the same
/// across the whole run.
#[must_use]
pub fn time_series(state: &SimulationState, current_tick: u32) -> TimeSeries {
    let organisms = query::organisms(state);
    let mut columns: Vec<SeriesColumn> = organisms
        .iter()
        .map(|organism| SeriesColumn {
            id: organism.id().clone(),
            name: organism.name().to_owned(),
            is_invader: organism.is_invader(),
        })
        .collect();

    let pending = query::invader(state).filter(|invader| !invader.introduced());
    if let Some(invader) = pending {
        columns.push(SeriesColumn {
            id: invader.definition().id().clone(),
            name: invader.definition().name().to_owned(),
            is_invader: true,
        });
    }

    let rows = (1..=current_tick)
        .map(|tick| {
            let mut populations: Vec<f64> = organisms
                .iter()
                .map(|organism| organism.population_at(tick).unwrap_or(0.0))
                .collect();
            if pending.is_some() {
                populations.push(0.0);
            }
            SeriesRow { tick, populations }
        })
        .collect();

    TimeSeries { columns, rows }
}

/// Organism listed in a [`PyramidTier`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PyramidEntry {
    /// Identifier of the organism.
    pub id: OrganismId,
    /// Display name of the organism.
    pub name: String,
    /// Current population; zero for an invader that has not entered yet.
    pub population: f64,
    /// Indicates whether the organism is the invader.
    pub is_invader: bool,
    /// Indicates an invader still waiting for its entry tick.
    pub pending: bool,
}

/// Organisms sharing a display tier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PyramidTier {
    /// Display tier of every entry.
    pub tier: DisplayTier,
    /// Human readable label of the tier.
    pub label: String,
    /// Entries in processing order.
    pub entries: Vec<PyramidEntry>,
}

/// Groups the organisms of a run by display tier, lowest tier first.
///
/// The invader is included whether it is pending or already active.
#[must_use]
pub fn pyramid(ecosystem: &Ecosystem, state: &SimulationState) -> Vec<PyramidTier> {
    let mut tiers: BTreeMap<DisplayTier, Vec<PyramidEntry>> = BTreeMap::new();

    for organism in query::organisms(state) {
        let tier = ecosystem
            .display_tier(organism.id())
            .unwrap_or_else(|| display_tier(organism.definition(), organism.trophic_level()));
        tiers.entry(tier).or_default().push(PyramidEntry {
            id: organism.id().clone(),
            name: organism.name().to_owned(),
            population: organism.population(),
            is_invader: organism.is_invader(),
            pending: false,
        });
    }

    if let Some(invader) = query::invader(state).filter(|invader| !invader.introduced()) {
        let definition = invader.definition();
        let tier = ecosystem
            .display_tier(definition.id())
            .unwrap_or_else(|| display_tier(definition, invader.trophic_level()));
        tiers.entry(tier).or_default().push(PyramidEntry {
            id: definition.id().clone(),
            name: definition.name().to_owned(),
            population: 0.0,
            is_invader: true,
            pending: true,
        });
    }

    tiers
        .into_iter()
        .map(|(tier, entries)| PyramidTier {
            tier,
            label: tier.label(),
            entries,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use food_web_catalog::EcosystemCatalog;
    use food_web_core::{EcosystemId, InvaderRequest};

    fn ocean() -> Ecosystem {
        EcosystemCatalog::built_in()
            .get(&EcosystemId::new("ocean"))
            .expect("ocean registered")
            .clone()
    }

    fn ids(values: &[&str]) -> Vec<OrganismId> {
        values.iter().copied().map(OrganismId::new).collect()
    }

    fn run(state: &mut SimulationState, ticks: std::ops::Range<u32>, total: u32) {
        let mut events = Vec::new();
        for tick in ticks {
            food_web_world::step(state, tick, total, &mut events).expect("tick succeeds");
        }
    }

    #[test]
    fn trends_need_two_samples() {
        let ocean = ocean();
        let mut state = SimulationState::init(&ocean, &ids(&["plankton", "fish"]), None);

        run(&mut state, 0..1, 10);
        assert!(trends(&state).is_empty());

        run(&mut state, 1..2, 10);
        let trends = trends(&state);
        assert_eq!(trends.len(), 2);
        for organism in query::organisms(&state) {
            let [.., previous, current] = organism.history() else {
                panic!("two samples recorded");
            };
            assert_eq!(
                trends[organism.id()],
                Trend::between(previous.population, current.population)
            );
        }
    }

    #[test]
    fn time_series_rows_follow_history() {
        let ocean = ocean();
        let mut state = SimulationState::init(&ocean, &ids(&["plankton", "fish"]), None);
        run(&mut state, 0..3, 10);

        let series = time_series(&state, 3);
        assert_eq!(series.rows().len(), 3);
        let fish = OrganismId::new("fish");
        let organism = query::organism(&state, &fish).expect("fish active");
        for tick in 1..=3 {
            assert_eq!(series.value(tick, &fish), organism.population_at(tick));
        }
        assert_eq!(series.value(4, &fish), None);
    }

    #[test]
    fn pending_invader_is_a_column_of_zeros() {
        let ocean = ocean();
        let invader = InvaderRequest::new("octopus");
        let mut state = SimulationState::init(
            &ocean,
            &ids(&["plankton", "fish", "shellfish"]),
            Some(&invader),
        );
        run(&mut state, 0..4, 20);

        let series = time_series(&state, 4);
        let octopus = OrganismId::new("octopus");
        let column = series.column(&octopus).expect("pending invader listed");
        assert!(series.columns()[column].is_invader);
        assert!(series
            .rows()
            .iter()
            .all(|row| row.populations[column] == 0.0));
    }

    #[test]
    fn pyramid_lists_pending_invader() {
        let ocean = ocean();
        let invader = InvaderRequest::new("shark");
        let state = SimulationState::init(
            &ocean,
            &ids(&["plankton", "fish", "dolphin"]),
            Some(&invader),
        );

        let tiers = pyramid(&ocean, &state);
        let labels: Vec<&str> = tiers.iter().map(|tier| tier.label.as_str()).collect();
        assert_eq!(labels, vec!["Producers", "Secondary Consumers", "Apex Predators"]);

        let apex = tiers.last().expect("apex tier present");
        let names: Vec<&str> = apex.entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(names, vec!["dolphin", "shark"]);
        assert!(apex.entries[1].pending && apex.entries[1].is_invader);
    }
}
