//! Stateless request builder and response parser for the Climatiq API.
//!
//! # Design
//! `ClimatiqClient` holds only the base URL and the bearer token. Each
//! endpoint is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. `ClimatiqApi`
//! glues the two together over a `Transport`; callers that run their own I/O
//! can use the halves directly.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, FALLBACK_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    DataVersionsResponse, EmissionFactorResponse, EstimationModel, EstimationResponse,
    ManagementResponse, ParametersModel, SearchParams, SearchResponse, SelectorModel,
    UnitTypesResponse,
};

pub const SEARCH_PATH: &str = "/search";
pub const EMISSION_FACTORS_PATH: &str = "/emission-factors";
pub const ESTIMATE_PATH: &str = "/estimate";
pub const UNIT_TYPES_PATH: &str = "/unit-types";
pub const DATA_VERSIONS_PATH: &str = "/data-versions";
pub const MANAGEMENT_PATH: &str = "/management";
pub const DATA_SEARCH_PATH: &str = "/data/v1/search";

#[derive(Clone)]
pub struct ClimatiqClient {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ClimatiqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClimatiqClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ClimatiqClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_search_emission_factors(
        &self,
        params: &SelectorModel,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, SEARCH_PATH, params)
    }

    /// The endpoint is a GET, so the lookup keys travel as query parameters.
    pub fn build_get_emission_factors(
        &self,
        params: &ParametersModel,
    ) -> Result<HttpRequest, ApiError> {
        let mut req = self.request(HttpMethod::Get, EMISSION_FACTORS_PATH);
        req.query = query_pairs(params)?;
        Ok(req)
    }

    pub fn build_calculate_emissions(
        &self,
        params: &EstimationModel,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, ESTIMATE_PATH, params)
    }

    pub fn build_get_unit_types(&self) -> HttpRequest {
        self.request(HttpMethod::Get, UNIT_TYPES_PATH)
    }

    pub fn build_get_data_versions(&self) -> HttpRequest {
        self.request(HttpMethod::Get, DATA_VERSIONS_PATH)
    }

    pub fn build_get_management_data(&self) -> HttpRequest {
        self.request(HttpMethod::Get, MANAGEMENT_PATH)
    }

    pub fn build_search_data(&self, params: &SearchParams) -> Result<HttpRequest, ApiError> {
        let mut req = self.request(HttpMethod::Get, DATA_SEARCH_PATH);
        req.query = query_pairs(params)?;
        Ok(req)
    }

    pub fn parse_search_emission_factors(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<EmissionFactorResponse>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_emission_factors(
        &self,
        response: HttpResponse,
    ) -> Result<EmissionFactorResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_calculate_emissions(
        &self,
        response: HttpResponse,
    ) -> Result<EstimationResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_unit_types(&self, response: HttpResponse) -> Result<UnitTypesResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_data_versions(
        &self,
        response: HttpResponse,
    ) -> Result<DataVersionsResponse, ApiError> {
        parse_json(response)
    }

    /// The 2xx body exactly as received, once it is known to be JSON. For
    /// relaying the upstream document without re-encoding it.
    pub fn parse_get_data_versions_raw(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_raw_json(response)
    }

    pub fn parse_get_management_data(
        &self,
        response: HttpResponse,
    ) -> Result<ManagementResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_search_data(&self, response: HttpResponse) -> Result<SearchResponse, ApiError> {
        parse_json(response)
    }

    fn request(&self, method: HttpMethod, endpoint: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{endpoint}", self.base_url),
            query: Vec::new(),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, endpoint);
        req.body = Some(body);
        Ok(req)
    }
}

/// Map a non-2xx response to `ApiError::Http`, taking the message from the
/// body's `message` field when there is one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_raw_json(response: HttpResponse) -> Result<String, ApiError> {
    check_status(&response)?;
    serde_json::from_str::<IgnoredAny>(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    Ok(response.body)
}

/// Flatten a serializable struct into query pairs. Absent fields are skipped,
/// arrays repeat the key.
fn query_pairs<T: Serialize>(params: &T) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ApiError::Serialization(
            "query parameters must serialize to an object".to_string(),
        ));
    };
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(s) = scalar_to_string(&item) {
                        pairs.push((key.clone(), s));
                    }
                }
            }
            other => {
                if let Some(s) = scalar_to_string(&other) {
                    pairs.push((key, s));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
