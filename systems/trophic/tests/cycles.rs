use food_web_core::{OrganismDefinition, OrganismId, TrophicLevel};
use food_web_system_trophic::{structural_levels, TrophicClassifier};

fn level_of(levels: &std::collections::BTreeMap<OrganismId, TrophicLevel>, id: &str) -> u8 {
    levels[&OrganismId::new(id)].get()
}

#[test]
fn two_cycle_terminates_with_revisit_contributing_zero() {
    let definitions = vec![
        OrganismDefinition::new("a", "A").with_prey(["b"]),
        OrganismDefinition::new("b", "B").with_prey(["a"]),
    ];

    let levels = structural_levels(&definitions);

    assert_eq!(level_of(&levels, "b"), 1, "b sees a on the path and adds 0");
    assert_eq!(level_of(&levels, "a"), 2);
}

#[test]
fn self_predation_terminates() {
    let definitions = vec![OrganismDefinition::new("cannibal", "Cannibal").with_prey(["cannibal"])];

    let levels = structural_levels(&definitions);

    assert_eq!(level_of(&levels, "cannibal"), 1);
}

#[test]
fn cycle_above_producer_still_counts_real_chain() {
    let definitions = vec![
        OrganismDefinition::new("algae", "Algae"),
        OrganismDefinition::new("snail", "Snail").with_prey(["algae", "crab"]),
        OrganismDefinition::new("crab", "Crab").with_prey(["snail"]),
    ];

    let levels = structural_levels(&definitions);

    assert_eq!(level_of(&levels, "algae"), 0);
    assert_eq!(level_of(&levels, "snail"), 2);
    assert_eq!(level_of(&levels, "crab"), 1);
}

#[test]
fn shared_prey_is_not_mistaken_for_a_cycle() {
    let definitions = vec![
        OrganismDefinition::new("grass", "Grass"),
        OrganismDefinition::new("insect", "Insect").with_prey(["grass"]),
        OrganismDefinition::new("bilby", "Bilby").with_prey(["grass", "insect"]),
        OrganismDefinition::new("snake", "Snake").with_prey(["insect", "bilby"]),
    ];

    let mut classifier = TrophicClassifier::new(&definitions);

    assert_eq!(
        classifier.level(&OrganismId::new("snake")),
        Some(TrophicLevel::new(3))
    );
    assert_eq!(
        classifier.level(&OrganismId::new("bilby")),
        Some(TrophicLevel::new(2))
    );
}

#[test]
fn long_chain_does_not_exhaust_the_stack() {
    let mut definitions = vec![OrganismDefinition::new("n0", "N0")];
    for index in 1..5_000 {
        let prey = format!("n{}", index - 1);
        definitions.push(
            OrganismDefinition::new(format!("n{index}").as_str(), "Node")
                .with_prey([prey.as_str()]),
        );
    }

    let mut classifier = TrophicClassifier::new(&definitions);
    let level = classifier
        .level(&OrganismId::new("n4999"))
        .expect("chain head is registered");

    assert_eq!(level, TrophicLevel::new(u8::MAX), "levels saturate at u8::MAX");
}
