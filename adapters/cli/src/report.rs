//! Plain-text and JSON rendering of catalogs and finished runs.

use std::io::{self, Write};

use food_web_catalog::EcosystemCatalog;
use food_web_core::{EcosystemId, OrganismId, Trend};
use food_web_system_history::{
    current_populations, pyramid, time_series, trends, PyramidTier, TimeSeries,
};
use food_web_world::Session;
use serde::Serialize;

/// Final population of one organism together with its latest trend.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct PopulationRow {
    id: OrganismId,
    name: String,
    population: f64,
    is_invader: bool,
    trend: Option<Trend>,
}

/// Everything printed once a run completes.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Report {
    ecosystem: EcosystemId,
    ecosystem_name: String,
    ticks: u32,
    populations: Vec<PopulationRow>,
    pyramid: Vec<PyramidTier>,
    time_series: TimeSeries,
}

impl Report {
    /// Collects the views of the session's current run, if it was started.
    pub(crate) fn from_session(session: &Session) -> Option<Self> {
        let state = session.state()?;
        let trends = trends(state);
        let populations = current_populations(state)
            .into_iter()
            .map(|snapshot| PopulationRow {
                trend: trends.get(&snapshot.id).copied(),
                id: snapshot.id,
                name: snapshot.name,
                population: snapshot.population,
                is_invader: snapshot.is_invader,
            })
            .collect();

        Some(Self {
            ecosystem: session.ecosystem().id().clone(),
            ecosystem_name: session.ecosystem().name().to_owned(),
            ticks: session.current_tick(),
            populations,
            pyramid: pyramid(session.ecosystem(), state),
            time_series: time_series(state, session.current_tick()),
        })
    }

    /// Writes the report as aligned text tables.
    pub(crate) fn write_table(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(
            out,
            "{} ({}) after {} ticks",
            self.ecosystem_name, self.ecosystem, self.ticks
        )?;
        writeln!(out)?;

        let id_width = self
            .populations
            .iter()
            .map(|row| row.id.as_str().len())
            .chain([2])
            .max()
            .unwrap_or(2);
        let name_width = self
            .populations
            .iter()
            .map(|row| row.name.len() + usize::from(row.is_invader))
            .chain([4])
            .max()
            .unwrap_or(4);
        writeln!(
            out,
            "{:<id_width$}  {:<name_width$}  {:>12}  TREND",
            "ID", "NAME", "POPULATION"
        )?;
        for row in &self.populations {
            let name = invader_marked(&row.name, row.is_invader);
            let trend = row
                .trend
                .map_or_else(|| String::from("-"), |trend| trend.to_string());
            writeln!(
                out,
                "{:<id_width$}  {:<name_width$}  {:>12.2}  {trend}",
                row.id, name, row.population
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Trophic pyramid")?;
        for tier in self.pyramid.iter().rev() {
            let entries: Vec<String> = tier
                .entries
                .iter()
                .map(|entry| {
                    let name = invader_marked(&entry.name, entry.is_invader);
                    if entry.pending {
                        format!("{name} (pending)")
                    } else {
                        format!("{name} {:.2}", entry.population)
                    }
                })
                .collect();
            writeln!(out, "  {}: {}", tier.label, entries.join(", "))?;
        }

        writeln!(out)?;
        writeln!(out, "Time series")?;
        let widths: Vec<usize> = self
            .time_series
            .columns()
            .iter()
            .map(|column| column.id.as_str().len().max(10))
            .collect();
        write!(out, "{:>5}", "TICK")?;
        for (column, width) in self.time_series.columns().iter().zip(&widths) {
            write!(out, "  {:>width$}", column.id.as_str())?;
        }
        writeln!(out)?;
        for row in self.time_series.rows() {
            write!(out, "{:>5}", row.tick)?;
            for (population, width) in row.populations.iter().zip(&widths) {
                write!(out, "  {population:>width$.2}")?;
            }
            writeln!(out)?;
        }

        if self.populations.iter().any(|row| row.is_invader)
            || self
                .time_series
                .columns()
                .iter()
                .any(|column| column.is_invader)
        {
            writeln!(out)?;
            writeln!(out, "* invasive species")?;
        }
        Ok(())
    }
}

fn invader_marked(name: &str, is_invader: bool) -> String {
    if is_invader {
        format!("{name}*")
    } else {
        name.to_owned()
    }
}

/// Lists every ecosystem with its organisms, levels and feeding relations.
pub(crate) fn write_catalog(catalog: &EcosystemCatalog, out: &mut impl Write) -> io::Result<()> {
    for ecosystem in catalog.iter() {
        let defaults: Vec<&str> = ecosystem
            .default_species()
            .iter()
            .map(OrganismId::as_str)
            .collect();
        writeln!(
            out,
            "{} ({}), default species: {}",
            ecosystem.id(),
            ecosystem.name(),
            defaults.join(", ")
        )?;

        for definition in ecosystem.organisms() {
            let level = ecosystem
                .trophic_level(definition.id())
                .map_or_else(|| String::from("?"), |level| level.to_string());
            let tier = ecosystem
                .display_tier(definition.id())
                .map(|tier| tier.label())
                .unwrap_or_default();
            let prey: Vec<&str> = definition.prey().iter().map(OrganismId::as_str).collect();
            let predators: Vec<&str> = ecosystem
                .predators_of(definition.id())
                .into_iter()
                .map(|predator| predator.id().as_str())
                .collect();
            writeln!(
                out,
                "  {:<12} {:<20} level {:<2} {:<20} eats: {:<28} eaten by: {}",
                definition.id(),
                definition.name(),
                level,
                tier,
                listed(&prey),
                listed(&predators)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn listed(ids: &[&str]) -> String {
    if ids.is_empty() {
        String::from("-")
    } else {
        ids.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use food_web_core::InvaderRequest;

    fn finished_session(ticks: u32) -> Session {
        let ocean = EcosystemCatalog::built_in()
            .get(&EcosystemId::new("ocean"))
            .expect("ocean registered")
            .clone();
        let mut session = Session::new(ocean, ticks)
            .with_invader(Some(InvaderRequest::new("octopus").with_start_population(8.0)));
        let mut events = Vec::new();
        session.reset();
        session
            .run_to_completion(&mut events)
            .expect("run completes");
        session
    }

    #[test]
    fn report_requires_a_started_run() {
        let ocean = EcosystemCatalog::built_in()
            .get(&EcosystemId::new("ocean"))
            .expect("ocean registered")
            .clone();
        assert!(Report::from_session(&Session::new(ocean, 10)).is_none());
    }

    #[test]
    fn table_lists_populations_pyramid_and_series() {
        let report = Report::from_session(&finished_session(12)).expect("run started");
        let mut buffer = Vec::new();
        report.write_table(&mut buffer).expect("write to memory");
        let text = String::from_utf8(buffer).expect("utf-8 output");

        assert!(text.starts_with("Ocean (ocean) after 12 ticks"));
        assert!(text.contains("Octopus*"));
        assert!(text.contains("Apex Predators: Dolphins"));
        assert!(text.contains("* invasive species"));
        let series_rows = text
            .lines()
            .skip_while(|line| *line != "Time series")
            .skip(2)
            .take_while(|line| !line.is_empty())
            .count();
        assert_eq!(series_rows, 12);
    }

    #[test]
    fn json_report_carries_every_view() {
        let report = Report::from_session(&finished_session(10)).expect("run started");
        let json = serde_json::to_value(&report).expect("report serializes");

        assert_eq!(json["ecosystem"], "ocean");
        assert_eq!(json["ticks"], 10);
        assert_eq!(json["populations"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["time_series"]["rows"].as_array().map(Vec::len), Some(10));
        assert_eq!(json["populations"][0]["trend"], "up");
    }

    #[test]
    fn catalog_listing_shows_feeding_relations() {
        let mut buffer = Vec::new();
        write_catalog(&EcosystemCatalog::built_in(), &mut buffer).expect("write to memory");
        let text = String::from_utf8(buffer).expect("utf-8 output");

        assert!(text.contains(
            "ausNative (Australian Native), default species: grasses, kangaroo, dingo"
        ));
        let rabbit = text
            .lines()
            .find(|line| line.trim_start().starts_with("rabbit"))
            .expect("rabbit listed");
        assert!(rabbit.ends_with("eaten by: snake, eagle, dingo, feral_cats"));
    }
}
