//! TOML descriptions of custom ecosystems.

use std::collections::HashSet;

use food_web_core::{CatalogError, EcosystemId, OrganismDefinition, OrganismId};
use serde::Deserialize;
use tracing::debug;

use crate::Ecosystem;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    ecosystems: Vec<EcosystemEntry>,
}

#[derive(Debug, Deserialize)]
struct EcosystemEntry {
    id: String,
    name: String,
    #[serde(default)]
    default_species: Vec<String>,
    #[serde(default)]
    organisms: Vec<OrganismEntry>,
}

#[derive(Debug, Deserialize)]
struct OrganismEntry {
    id: String,
    name: String,
    #[serde(default)]
    prey: Vec<String>,
    #[serde(default)]
    apex_predator: bool,
    image: Option<String>,
}

impl OrganismEntry {
    fn into_definition(self) -> OrganismDefinition {
        let definition = OrganismDefinition::new(self.id.as_str(), self.name)
            .with_prey(self.prey.iter().map(String::as_str))
            .with_apex_predator(self.apex_predator);
        match self.image {
            Some(image) => definition.with_image(image),
            None => definition,
        }
    }
}

pub(crate) fn parse(contents: &str) -> Result<Vec<Ecosystem>, CatalogError> {
    let manifest: Manifest = toml::from_str(contents)?;
    manifest
        .ecosystems
        .into_iter()
        .map(build_ecosystem)
        .collect()
}

fn build_ecosystem(entry: EcosystemEntry) -> Result<Ecosystem, CatalogError> {
    let ecosystem_id = EcosystemId::new(entry.id);
    let invalid = |reason: String| CatalogError::InvalidDefinition {
        ecosystem: ecosystem_id.clone(),
        reason,
    };

    let mut seen = HashSet::new();
    for organism in &entry.organisms {
        if organism.id.trim().is_empty() {
            return Err(invalid(format!(
                "organism `{}` has an empty identifier",
                organism.name
            )));
        }
        if !seen.insert(organism.id.clone()) {
            return Err(invalid(format!(
                "organism identifier `{}` is declared twice",
                organism.id
            )));
        }
    }

    let default_species: Vec<OrganismId> = entry
        .default_species
        .into_iter()
        .filter(|id| {
            let known = seen.contains(id);
            if !known {
                debug!(
                    ecosystem = %ecosystem_id,
                    species = %id,
                    "dropping unknown default species"
                );
            }
            known
        })
        .map(OrganismId::new)
        .collect();

    let organisms = entry
        .organisms
        .into_iter()
        .map(OrganismEntry::into_definition)
        .collect();

    Ok(Ecosystem::new(
        ecosystem_id,
        entry.name,
        organisms,
        default_species,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_duplicate_identifiers() {
        let contents = r#"
            [[ecosystems]]
            id = "pond"
            name = "Pond"

            [[ecosystems.organisms]]
            id = "algae"
            name = "Algae"

            [[ecosystems.organisms]]
            id = "algae"
            name = "More Algae"
        "#;

        let error = parse(contents).expect_err("duplicate identifiers are rejected");
        assert!(matches!(error, CatalogError::InvalidDefinition { .. }));
    }

    #[test]
    fn parse_drops_unknown_default_species() {
        let contents = r#"
            [[ecosystems]]
            id = "pond"
            name = "Pond"
            default_species = ["algae", "whale"]

            [[ecosystems.organisms]]
            id = "algae"
            name = "Algae"
        "#;

        let ecosystems = parse(contents).expect("manifest parses");
        assert_eq!(ecosystems.len(), 1);
        assert_eq!(ecosystems[0].default_species(), &[OrganismId::new("algae")]);
    }

    #[test]
    fn parse_reports_malformed_toml() {
        let error = parse("[[ecosystems]\nid = 3").expect_err("malformed toml is rejected");
        assert!(matches!(error, CatalogError::Parse(_)));
    }
}
