//! Ecosystems shipped with the engine.

use food_web_core::{OrganismDefinition, OrganismId};

use crate::Ecosystem;

fn organism(id: &str, name: &str, prey: &[&str]) -> OrganismDefinition {
    OrganismDefinition::new(id, name)
        .with_prey(prey.iter().copied())
        .with_image(format!("/images/organisms/{id}.jpg"))
}

fn apex(id: &str, name: &str, prey: &[&str]) -> OrganismDefinition {
    organism(id, name, prey).with_apex_predator(true)
}

fn species(ids: &[&str]) -> Vec<OrganismId> {
    ids.iter().copied().map(OrganismId::new).collect()
}

pub(crate) fn ocean() -> Ecosystem {
    Ecosystem::new(
        "ocean",
        "Ocean",
        vec![
            organism("plankton", "Plankton", &[]),
            organism("seaweed", "Seaweed", &[]),
            organism("jellyfish", "Jellyfish", &["plankton"]),
            organism("fish", "Fish", &["jellyfish", "plankton"]),
            organism("shellfish", "Shellfish", &["plankton", "seaweed"]),
            organism("octopus", "Octopus", &["fish", "shellfish"]),
            apex("dolphin", "Dolphins", &["fish", "octopus"]),
            organism("turtle", "Turtles", &["jellyfish", "shellfish", "seaweed"]),
            apex("shark", "Sharks", &["turtle", "octopus", "fish"]),
        ],
        species(&["plankton", "fish", "dolphin"]),
    )
}

pub(crate) fn australian_native() -> Ecosystem {
    Ecosystem::new(
        "ausNative",
        "Australian Native",
        vec![
            organism("acacia", "Acacia", &[]),
            organism("grasses", "Grasses", &[]),
            organism("insects", "Insects", &["acacia", "grasses"]),
            organism("bilby", "Bilbies", &["grasses", "insects"]),
            organism("kangaroo", "Kangaroos", &["grasses"]),
            organism("rabbit", "Rabbits", &["grasses"]),
            organism("snake", "Snakes", &["insects", "bilby", "rabbit"]),
            apex("eagle", "Wedge-tailed Eagles", &["snake", "kangaroo", "rabbit"]),
            apex("dingo", "Dingoes", &["bilby", "kangaroo", "rabbit"]),
            organism("cane_toads", "Cane Toads", &["insects"]),
            apex("feral_cats", "Feral Cats", &["bilby", "snake", "rabbit"]),
        ],
        species(&["grasses", "kangaroo", "dingo"]),
    )
}
