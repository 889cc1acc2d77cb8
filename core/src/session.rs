//! Loading/error bookkeeping around the facade for interactive callers.
//!
//! # Design
//! A session owns a `ClimatiqApi` and tracks whether a call is in flight and
//! what the last failure was. Failures are recorded and then handed back to
//! the caller unchanged. `loading` is a count of in-flight calls, so
//! overlapping calls on one session cannot clear each other's flag early;
//! the recorded error is whichever failure settled last.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::ClimatiqApi;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    EmissionFactorResponse, EstimationModel, EstimationResponse, ParametersModel, SelectorModel,
};

#[derive(Debug, Default)]
struct SessionState {
    in_flight: usize,
    error: Option<ApiError>,
}

#[derive(Debug)]
pub struct ClimatiqSession<T = UreqTransport> {
    api: ClimatiqApi<T>,
    state: Mutex<SessionState>,
}

impl<T: Transport> ClimatiqSession<T> {
    pub fn new(api: ClimatiqApi<T>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn api(&self) -> &ClimatiqApi<T> {
        &self.api
    }

    pub fn loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    /// Last recorded failure, cleared when the next call starts.
    pub fn error(&self) -> Option<ApiError> {
        self.lock().error.clone()
    }

    pub fn search_emission_factors(
        &self,
        params: &SelectorModel,
    ) -> Result<Vec<EmissionFactorResponse>, ApiError> {
        self.track(|api| api.search_emission_factors(params))
    }

    pub fn get_emission_factors(
        &self,
        params: &ParametersModel,
    ) -> Result<EmissionFactorResponse, ApiError> {
        self.track(|api| api.get_emission_factors(params))
    }

    pub fn calculate_emissions(
        &self,
        params: &EstimationModel,
    ) -> Result<EstimationResponse, ApiError> {
        self.track(|api| api.calculate_emissions(params))
    }

    fn track<R>(
        &self,
        call: impl FnOnce(&ClimatiqApi<T>) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let _guard = InFlight::start(self);
        let result = call(&self.api);
        if let Err(err) = &result {
            self.lock().error = Some(err.clone());
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks one call in flight; the drop resets it even if the call panics.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
}

impl<'a> InFlight<'a> {
    fn start<T: Transport>(session: &'a ClimatiqSession<T>) -> Self {
        let mut state = session.lock();
        state.in_flight += 1;
        state.error = None;
        Self {
            state: &session.state,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}
