//! Client for the Climatiq emission-factor API.
//!
//! # Overview
//! A thin, typed layer over the upstream HTTP endpoints: search, factor
//! lookup, estimation, unit types, data versions and management metadata.
//!
//! # Design
//! - `ClimatiqClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without I/O; `Transport` performs the round-trip.
//! - `ClimatiqApi` combines the two, one method per endpoint.
//! - `ClimatiqSession` adds loading/error bookkeeping for interactive callers.
//! - `UnitTypeSelector` models the cascading unit-type/unit picker.
//! - Every failure is an `ApiError`; non-2xx responses carry the upstream
//!   `message` or a fixed fallback.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod selector;
pub mod session;
pub mod transport;
pub mod types;

pub use api::ClimatiqApi;
pub use client::ClimatiqClient;
pub use config::ClimatiqConfig;
pub use error::{ApiError, FALLBACK_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use selector::{SelectorView, UnitTypeSelector};
pub use session::ClimatiqSession;
pub use transport::{Transport, UreqTransport};
pub use types::{
    ActivityData, CalculationMethod, DataVersionsResponse, EmissionFactor, EmissionFactorResponse,
    EmissionFactorSelector, EstimationModel, EstimationResponse, ManagementResponse,
    ParametersModel, SearchParams, SearchResponse, SelectorModel, UnitType, UnitTypesResponse,
};
