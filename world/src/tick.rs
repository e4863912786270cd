//! Grow, eat and die passes applied once per tick.
//!
//! The eat pass consumes prey sequentially: predators are processed in the
//! order of the active organism list and every transfer is applied
//! immediately, so a predator processed later sees prey already thinned by
//! earlier predators. This ordering is part of the model and changes
//! outcomes; it approximates a simultaneous update.

use std::collections::HashMap;

use food_web_core::{HistorySample, OrganismId};
use tracing::trace;

use crate::Organism;

/// Prey biomass available to a predator and what it took from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Feeding {
    /// Sum of the resolved prey populations before the predator ate.
    pub(crate) prey_total: f64,
    /// Population transferred from prey to the predator.
    pub(crate) intake: f64,
}

/// Grows every producer below its start threshold toward the configured cap.
pub(crate) fn grow_pass(organisms: &mut [Organism]) {
    for organism in organisms.iter_mut().filter(|organism| organism.is_producer()) {
        let grow = organism.params.grow;
        if grow.start_threshold <= 0.0 || organism.population >= grow.start_threshold {
            continue;
        }
        let headroom = (grow.cap - organism.population) / grow.start_threshold;
        organism.set_population(organism.population * (1.0 + grow.rate * headroom));
    }
}

/// Lets every consumer eat its active prey, then applies starvation.
pub(crate) fn eat_pass(
    organisms: &mut [Organism],
    index: &HashMap<OrganismId, usize>,
    invader_multiplier: f64,
) {
    for predator in 0..organisms.len() {
        if organisms[predator].is_producer() {
            continue;
        }
        if let Some(feeding) = feed(organisms, index, predator, invader_multiplier) {
            trace!(
                predator = %organisms[predator].id(),
                prey_total = feeding.prey_total,
                intake = feeding.intake,
                "predator fed"
            );
            starve(&mut organisms[predator], feeding);
        }
    }
}

/// Transfers population from the prey of `predator` to the predator.
///
/// Returns `None` when no prey is active or the prey biomass is zero, in which
/// case nothing changes.
pub(crate) fn feed(
    organisms: &mut [Organism],
    index: &HashMap<OrganismId, usize>,
    predator: usize,
    invader_multiplier: f64,
) -> Option<Feeding> {
    let mut prey: Vec<usize> = Vec::new();
    for prey_id in organisms[predator].definition.prey() {
        let Some(&position) = index.get(prey_id) else {
            continue;
        };
        if position != predator && position < organisms.len() && !prey.contains(&position) {
            prey.push(position);
        }
    }

    let prey_total: f64 = prey
        .iter()
        .map(|&position| organisms[position].population)
        .sum();
    if !(prey_total > 0.0) {
        return None;
    }

    let eat = organisms[predator].params.eat;
    let factor = if organisms[predator].is_invader {
        eat.consumption_factor * invader_multiplier
    } else {
        eat.consumption_factor
    };

    let mut intake = 0.0;
    for position in prey {
        let available = organisms[position].population;
        let share = available / prey_total * factor * organisms[predator].population;
        let cap = if eat.prey_loss_cap_divisor > 0.0 {
            available / eat.prey_loss_cap_divisor
        } else {
            available
        };
        let eaten = share.min(cap).clamp(0.0, available);
        if !eaten.is_finite() {
            continue;
        }

        let gained = organisms[predator].population + eaten;
        organisms[predator].set_population(gained);
        organisms[position].set_population(available - eaten);
        intake += eaten;
    }

    Some(Feeding { prey_total, intake })
}

/// Applies the one-tick starvation penalty when prey biomass ran short.
pub(crate) fn starve(predator: &mut Organism, feeding: Feeding) {
    let eat = predator.params.eat;
    if feeding.prey_total < eat.starvation_need_per_predator * predator.population {
        let starved = predator.population * eat.starvation_penalty_multiplier;
        predator.set_population(starved);
    }
}

/// Applies natural death to every organism and records a history sample.
pub(crate) fn die_pass(organisms: &mut [Organism], tick: u32) {
    for organism in organisms.iter_mut() {
        let survivors = organism.population * organism.params.die.natural_death_multiplier;
        organism.set_population(survivors);
        organism.history.push(HistorySample {
            tick: tick + 1,
            population: organism.population,
        });
    }
}
