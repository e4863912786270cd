//! Layered grow/eat/die parameters.
//!
//! A [`SimulationConfig`] holds global defaults plus partial overrides keyed
//! by structural trophic level. [`SimulationConfig::resolve`] merges the two
//! into the effective [`ResolvedParams`] for a level; it is pure, so callers
//! may cache its result per organism for the lifetime of a run.

use serde::{Deserialize, Serialize};

use crate::TrophicLevel;

/// Highest structural level the built-in configuration carries an override for.
const BUILT_IN_OVERRIDE_LEVELS: u8 = 4;

/// Parameters governing producer growth toward a cap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowParams {
    /// Producers only grow while their population is below this value.
    pub start_threshold: f64,
    /// Population the growth curve converges toward.
    pub cap: f64,
    /// Scale applied to the remaining headroom each tick.
    pub rate: f64,
}

impl Default for GrowParams {
    fn default() -> Self {
        Self {
            start_threshold: 100.0,
            cap: 110.0,
            rate: 0.5,
        }
    }
}

/// Parameters governing consumption of prey by predators.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EatParams {
    /// Share of the predator population converted from prey each tick.
    pub consumption_factor: f64,
    /// A single prey species loses at most `population / divisor` per tick.
    pub prey_loss_cap_divisor: f64,
    /// Prey biomass a predator needs per head to avoid starving.
    pub starvation_need_per_predator: f64,
    /// Multiplier applied to a starving predator's population.
    pub starvation_penalty_multiplier: f64,
}

impl Default for EatParams {
    fn default() -> Self {
        Self {
            consumption_factor: 0.3,
            prey_loss_cap_divisor: 5.0,
            starvation_need_per_predator: 3.0,
            starvation_penalty_multiplier: 0.8,
        }
    }
}

/// Parameters governing natural population loss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DieParams {
    /// Multiplier applied to every population at the end of a tick.
    pub natural_death_multiplier: f64,
}

impl Default for DieParams {
    fn default() -> Self {
        Self {
            natural_death_multiplier: 0.95,
        }
    }
}

/// Effective parameters for one organism after layering overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedParams {
    /// Growth parameters.
    pub grow: GrowParams,
    /// Consumption parameters.
    pub eat: EatParams,
    /// Mortality parameters.
    pub die: DieParams,
}

/// Parameters applied to invading organisms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvaderParams {
    /// Multiplier applied to an invader's consumption factor.
    pub consumption_factor_multiplier: f64,
}

impl Default for InvaderParams {
    fn default() -> Self {
        Self {
            consumption_factor_multiplier: 2.0,
        }
    }
}

/// Partial growth override.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowOverride {
    /// Replacement for [`GrowParams::start_threshold`].
    pub start_threshold: Option<f64>,
    /// Replacement for [`GrowParams::cap`].
    pub cap: Option<f64>,
    /// Replacement for [`GrowParams::rate`].
    pub rate: Option<f64>,
}

impl GrowOverride {
    fn apply(&self, base: GrowParams) -> GrowParams {
        GrowParams {
            start_threshold: self.start_threshold.unwrap_or(base.start_threshold),
            cap: self.cap.unwrap_or(base.cap),
            rate: self.rate.unwrap_or(base.rate),
        }
    }
}

/// Partial consumption override.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EatOverride {
    /// Replacement for [`EatParams::consumption_factor`].
    pub consumption_factor: Option<f64>,
    /// Replacement for [`EatParams::prey_loss_cap_divisor`].
    pub prey_loss_cap_divisor: Option<f64>,
    /// Replacement for [`EatParams::starvation_need_per_predator`].
    pub starvation_need_per_predator: Option<f64>,
    /// Replacement for [`EatParams::starvation_penalty_multiplier`].
    pub starvation_penalty_multiplier: Option<f64>,
}

impl EatOverride {
    fn apply(&self, base: EatParams) -> EatParams {
        EatParams {
            consumption_factor: self.consumption_factor.unwrap_or(base.consumption_factor),
            prey_loss_cap_divisor: self
                .prey_loss_cap_divisor
                .unwrap_or(base.prey_loss_cap_divisor),
            starvation_need_per_predator: self
                .starvation_need_per_predator
                .unwrap_or(base.starvation_need_per_predator),
            starvation_penalty_multiplier: self
                .starvation_penalty_multiplier
                .unwrap_or(base.starvation_penalty_multiplier),
        }
    }
}

/// Partial mortality override.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DieOverride {
    /// Replacement for [`DieParams::natural_death_multiplier`].
    pub natural_death_multiplier: Option<f64>,
}

impl DieOverride {
    fn apply(&self, base: DieParams) -> DieParams {
        DieParams {
            natural_death_multiplier: self
                .natural_death_multiplier
                .unwrap_or(base.natural_death_multiplier),
        }
    }
}

/// Overrides layered over the defaults for one structural level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelOverride {
    /// Structural level the override applies to.
    pub level: TrophicLevel,
    /// Growth overrides.
    pub grow: GrowOverride,
    /// Consumption overrides.
    pub eat: EatOverride,
    /// Mortality overrides.
    pub die: DieOverride,
}

impl LevelOverride {
    /// Creates an empty override bucket for `level`.
    #[must_use]
    pub fn for_level(level: TrophicLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

/// Complete parameter set for a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Parameters applied to invading organisms.
    pub invader: InvaderParams,
    /// Parameters used wherever no level override applies.
    pub defaults: ResolvedParams,
    /// Per-level partial overrides. A later entry for the same level wins.
    pub trophic_overrides: Vec<LevelOverride>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let mut producers = LevelOverride::for_level(TrophicLevel::PRODUCER);
        producers.grow.rate = Some(0.6);

        let consumption = [0.4, 0.35, 0.3, 0.25];
        let mut trophic_overrides = vec![producers];
        for (level, factor) in (1..=BUILT_IN_OVERRIDE_LEVELS).zip(consumption) {
            let mut bucket = LevelOverride::for_level(TrophicLevel::new(level));
            bucket.eat.consumption_factor = Some(factor);
            trophic_overrides.push(bucket);
        }

        Self {
            invader: InvaderParams::default(),
            defaults: ResolvedParams::default(),
            trophic_overrides,
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from TOML, filling omitted fields with defaults.
    ///
    /// Omitting `trophic_overrides` keeps the built-in overrides; providing
    /// the key replaces them entirely.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the effective parameters for an organism at `level`.
    ///
    /// Levels without an override bucket use the defaults unchanged.
    #[must_use]
    pub fn resolve(&self, level: TrophicLevel) -> ResolvedParams {
        let base = self.defaults;
        match self
            .trophic_overrides
            .iter()
            .rev()
            .find(|bucket| bucket.level == level)
        {
            Some(bucket) => ResolvedParams {
                grow: bucket.grow.apply(base.grow),
                eat: bucket.eat.apply(base.eat),
                die: bucket.die.apply(base.die),
            },
            None => base,
        }
    }

    /// Rejects parameter sets that would be used as divisors while non-positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = self
            .trophic_overrides
            .iter()
            .map(|bucket| bucket.level)
            .chain(std::iter::once(TrophicLevel::new(u8::MAX)));

        for level in levels {
            let params = self.resolve(level);
            check_positive("grow.start_threshold", level, params.grow.start_threshold)?;
            check_positive(
                "eat.prey_loss_cap_divisor",
                level,
                params.eat.prey_loss_cap_divisor,
            )?;
        }

        if !self.invader.consumption_factor_multiplier.is_finite() {
            return Err(ConfigError::InvalidParameter {
                field: "invader.consumption_factor_multiplier",
                level: None,
                value: self.invader.consumption_factor_multiplier,
            });
        }

        Ok(())
    }
}

fn check_positive(field: &'static str, level: TrophicLevel, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            field,
            level: Some(level),
            value,
        })
    }
}

/// Errors raised while loading a [`SimulationConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("could not parse simulation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A parameter lies outside its usable domain.
    #[error("parameter `{field}` has unusable value {value} (level {level:?})")]
    InvalidParameter {
        /// Dotted name of the offending parameter.
        field: &'static str,
        /// Level whose resolved parameters were rejected, if level specific.
        level: Option<TrophicLevel>,
        /// Rejected value.
        value: f64,
    },
}
