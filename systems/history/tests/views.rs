use food_web_catalog::EcosystemCatalog;
use food_web_core::{EcosystemId, InvaderRequest, OrganismId, Trend};
use food_web_system_history::{current_populations, pyramid, time_series, trends};
use food_web_world::{Session, SimulationState};

fn ids(values: &[&str]) -> Vec<OrganismId> {
    values.iter().copied().map(OrganismId::new).collect()
}

#[test]
fn invader_column_is_zero_until_its_first_sample() {
    let catalog = EcosystemCatalog::built_in();
    let ocean = catalog
        .get(&EcosystemId::new("ocean"))
        .expect("ocean registered")
        .clone();
    let mut session = Session::new(ocean, 50)
        .with_selection(ids(&["plankton", "fish", "dolphin"]))
        .with_invader(Some(InvaderRequest::new("octopus").with_start_population(5.0)));
    let mut events = Vec::new();
    session.reset();
    session
        .run_to_completion(&mut events)
        .expect("run completes");

    let state = session.state().expect("state initialized");
    let series = time_series(state, session.current_tick());
    let octopus = OrganismId::new("octopus");

    assert_eq!(series.rows().len(), 50);
    for tick in 1..=25 {
        assert_eq!(series.value(tick, &octopus), Some(0.0), "tick {tick}");
    }
    for tick in 26..=50 {
        let population = series.value(tick, &octopus).expect("invader column present");
        assert!(population > 0.0, "tick {tick} reported {population}");
    }

    let column = series.column(&octopus).expect("invader column present");
    assert!(series.columns()[column].is_invader);
}

#[test]
fn columns_are_keyed_by_identifier_not_name() {
    let catalog = EcosystemCatalog::from_toml_str(
        r#"
        [[ecosystems]]
        id = "marsh"
        name = "Marsh"
        default_species = ["reed", "reed_beetle"]

        [[ecosystems.organisms]]
        id = "reed"
        name = "Reed"

        [[ecosystems.organisms]]
        id = "reed_beetle"
        name = "Reed"
        prey = ["reed"]
        "#,
    )
    .expect("catalog parses");
    let marsh = catalog
        .get(&EcosystemId::new("marsh"))
        .expect("marsh registered")
        .clone();
    let mut session = Session::new(marsh, 10);
    let mut events = Vec::new();
    session.reset();
    session
        .run_to_completion(&mut events)
        .expect("run completes");

    let state = session.state().expect("state initialized");
    let series = time_series(state, 10);
    let reed = series.value(10, &OrganismId::new("reed")).expect("reed column");
    let beetle = series
        .value(10, &OrganismId::new("reed_beetle"))
        .expect("beetle column");

    assert_eq!(series.columns().len(), 2);
    assert!(series.columns().iter().all(|column| column.name == "Reed"));
    assert_ne!(reed, beetle);
}

#[test]
fn views_cover_every_active_organism() {
    let catalog = EcosystemCatalog::built_in();
    let australia = catalog
        .get(&EcosystemId::new("ausNative"))
        .expect("ausNative registered");
    let mut state = SimulationState::init(
        australia,
        &ids(&["grasses", "kangaroo", "rabbit", "dingo"]),
        None,
    );
    let mut events = Vec::new();
    for tick in 0..5 {
        food_web_world::step(&mut state, tick, 10, &mut events).expect("tick succeeds");
    }

    let populations = current_populations(&state);
    let names: Vec<&str> = populations.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["Grasses", "Kangaroos", "Rabbits", "Dingoes"]);

    let trends = trends(&state);
    assert_eq!(trends.len(), 4);
    assert!(populations
        .iter()
        .all(|entry| trends.contains_key(&entry.id)));
    assert_eq!(trends[&OrganismId::new("grasses")], Trend::Down);

    let tiers = pyramid(australia, &state);
    let labels: Vec<&str> = tiers.iter().map(|tier| tier.label.as_str()).collect();
    assert_eq!(labels, vec!["Producers", "Primary Consumers", "Apex Predators"]);
}

#[test]
fn time_series_serializes_to_json() {
    let catalog = EcosystemCatalog::built_in();
    let ocean = catalog
        .get(&EcosystemId::new("ocean"))
        .expect("ocean registered");
    let mut state = SimulationState::init(ocean, &ids(&["plankton"]), None);
    let mut events = Vec::new();
    food_web_world::step(&mut state, 0, 10, &mut events).expect("tick succeeds");

    let json = serde_json::to_value(time_series(&state, 1)).expect("series serializes");

    assert_eq!(json["columns"][0]["id"], "plankton");
    assert_eq!(json["rows"][0]["tick"], 1);
    assert_eq!(json["rows"].as_array().map(Vec::len), Some(1));
}
