//! Driver that owns the run configuration and the state of the current run.

use food_web_catalog::Ecosystem;
use food_web_core::{
    Event, InvaderRequest, OrganismId, SimulationConfig, StepError, MAX_RUN_TICKS, MIN_RUN_TICKS,
};

use crate::{step, SimulationState};

/// Owns a run's inputs and steps it one tick at a time.
///
/// [`Session::reset`] discards any previous state wholesale before building
/// a new one; nothing carries over between runs.
#[derive(Clone, Debug)]
pub struct Session {
    ecosystem: Ecosystem,
    selection: Vec<OrganismId>,
    invader: Option<InvaderRequest>,
    config: SimulationConfig,
    total_ticks: u32,
    current_tick: u32,
    state: Option<SimulationState>,
}

impl Session {
    /// Creates a session over `ecosystem` selecting its default species.
    ///
    /// The run length is clamped into [`MIN_RUN_TICKS`]..=[`MAX_RUN_TICKS`].
    #[must_use]
    pub fn new(ecosystem: Ecosystem, total_ticks: u32) -> Self {
        let selection = ecosystem.default_species().to_vec();
        Self {
            ecosystem,
            selection,
            invader: None,
            config: SimulationConfig::default(),
            total_ticks: total_ticks.clamp(MIN_RUN_TICKS, MAX_RUN_TICKS),
            current_tick: 0,
            state: None,
        }
    }

    /// Replaces the species selection used by the next reset.
    #[must_use]
    pub fn with_selection(mut self, selection: Vec<OrganismId>) -> Self {
        self.selection = selection;
        self
    }

    /// Requests an invader for the next reset.
    #[must_use]
    pub fn with_invader(mut self, invader: Option<InvaderRequest>) -> Self {
        self.invader = invader;
        self
    }

    /// Replaces the parameters used by the next reset.
    #[must_use]
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a fresh state for a new run, discarding the previous one.
    pub fn reset(&mut self) {
        self.state = Some(SimulationState::init_with_config(
            &self.ecosystem,
            &self.selection,
            self.invader.as_ref(),
            self.config.clone(),
        ));
        self.current_tick = 0;
    }

    /// Steps the next tick of the current run.
    pub fn advance(&mut self, out_events: &mut Vec<Event>) -> Result<(), StepError> {
        let state = self.state.as_mut().ok_or(StepError::Uninitialized)?;
        step(state, self.current_tick, self.total_ticks, out_events)?;
        self.current_tick += 1;
        Ok(())
    }

    /// Steps every remaining tick of the current run.
    pub fn run_to_completion(&mut self, out_events: &mut Vec<Event>) -> Result<(), StepError> {
        while !self.is_complete() {
            self.advance(out_events)?;
        }
        Ok(())
    }

    /// Ecosystem the session draws organisms from.
    #[must_use]
    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    /// Number of ticks already stepped in the current run.
    #[must_use]
    pub const fn current_tick(&self) -> u32 {
        self.current_tick
    }

    /// Configured run length.
    #[must_use]
    pub const fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    /// Reports whether the current run has stepped every tick.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current_tick >= self.total_ticks
    }

    /// State of the current run, if one was started.
    #[must_use]
    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }
}
