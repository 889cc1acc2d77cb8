//! In-memory stand-in for the Climatiq API, used by integration tests.
//!
//! Serves a fixed catalogue of emission factors behind bearer-token auth.
//! Rejections use the upstream's `{"error", "message"}` body shape.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const DEFAULT_API_KEY: &str = "test-key";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Factor {
    pub id: String,
    pub activity_id: String,
    pub name: String,
    pub category: String,
    pub source: String,
    pub region: String,
    pub year: u16,
    pub unit_type: String,
    pub unit: String,
    pub factor: f64,
}

#[derive(Clone)]
pub struct MockState {
    api_key: Arc<str>,
    factors: Arc<Vec<Factor>>,
}

pub fn catalogue() -> Vec<Factor> {
    vec![
        Factor {
            id: "ef-1".to_string(),
            activity_id: "electricity-supply_grid-source_residual_mix".to_string(),
            name: "Electricity supplied from grid - residual mix".to_string(),
            category: "Electricity".to_string(),
            source: "AIB".to_string(),
            region: "DE".to_string(),
            year: 2022,
            unit_type: "Energy".to_string(),
            unit: "kg/kWh".to_string(),
            factor: 0.5,
        },
        Factor {
            id: "ef-2".to_string(),
            activity_id: "passenger_vehicle-vehicle_type_car-fuel_source_petrol".to_string(),
            name: "Passenger car - petrol".to_string(),
            category: "Vehicles".to_string(),
            source: "BEIS".to_string(),
            region: "GB".to_string(),
            year: 2021,
            unit_type: "Distance".to_string(),
            unit: "kg/km".to_string(),
            factor: 0.17,
        },
        Factor {
            id: "ef-3".to_string(),
            activity_id: "steel-type_steel_billets".to_string(),
            name: "Steel billets".to_string(),
            category: "Metals".to_string(),
            source: "EPA".to_string(),
            region: "US".to_string(),
            year: 2020,
            unit_type: "Weight".to_string(),
            unit: "kg/t".to_string(),
            factor: 1850.0,
        },
    ]
}

pub fn app() -> Router {
    app_with_key(DEFAULT_API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = MockState {
        api_key: Arc::from(api_key),
        factors: Arc::new(catalogue()),
    };
    Router::new()
        .route("/search", post(search))
        .route("/emission-factors", get(emission_factors))
        .route("/estimate", post(estimate))
        .route("/unit-types", get(unit_types))
        .route("/data-versions", get(data_versions))
        .route("/management", get(management))
        .route("/data/v1/search", get(data_search))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn rejection(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

async fn require_bearer(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.api_key);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return rejection(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid API key");
    }
    next.run(request).await
}

fn matches_text(factor: &Factor, query: &str) -> bool {
    let query = query.to_lowercase();
    factor.name.to_lowercase().contains(&query) || factor.activity_id.contains(&query)
}

fn text<'a>(filters: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    filters.get(key).and_then(Value::as_str)
}

/// Filters shared by both search endpoints; absent keys match everything.
fn matches_filters(factor: &Factor, filters: &Map<String, Value>) -> bool {
    text(filters, "query").is_none_or(|q| matches_text(factor, q))
        && text(filters, "activity_id").is_none_or(|a| factor.activity_id == a)
        && text(filters, "category").is_none_or(|c| factor.category.eq_ignore_ascii_case(c))
        && text(filters, "source").is_none_or(|s| factor.source == s)
        && text(filters, "region").is_none_or(|r| factor.region == r)
        && filters
            .get("year")
            .and_then(|y| y.as_u64().or_else(|| y.as_str().and_then(|s| s.parse().ok())))
            .is_none_or(|y| u64::from(factor.year) == y)
}

async fn search(State(state): State<MockState>, Json(filters): Json<Map<String, Value>>) -> Json<Vec<Factor>> {
    Json(
        state
            .factors
            .iter()
            .filter(|f| matches_filters(f, &filters))
            .cloned()
            .collect(),
    )
}

async fn emission_factors(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let found = state.factors.iter().find(|f| {
        params.get("activity_id").is_some_and(|a| &f.activity_id == a)
            || params.get("id").is_some_and(|id| &f.id == id)
    });
    match found {
        Some(factor) => Json(factor.clone()).into_response(),
        None => rejection(
            StatusCode::NOT_FOUND,
            "not_found",
            "No emission factor matches the given parameters",
        ),
    }
}

#[derive(Deserialize)]
struct EstimateRequest {
    emission_factor: Map<String, Value>,
    #[serde(default)]
    parameters: Map<String, Value>,
}

async fn estimate(State(state): State<MockState>, Json(input): Json<EstimateRequest>) -> Response {
    let activity_id = input.emission_factor.get("activity_id").and_then(Value::as_str);
    let Some(factor) = state
        .factors
        .iter()
        .find(|f| Some(f.activity_id.as_str()) == activity_id)
    else {
        return rejection(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "emission_factor.activity_id does not match any emission factor",
        );
    };

    // The activity amount is the one numeric parameter; its unit sits under `<name>_unit`.
    let Some((name, amount)) = input
        .parameters
        .iter()
        .find_map(|(k, v)| v.as_f64().map(|amount| (k.clone(), amount)))
    else {
        return rejection(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "parameters must contain a numeric activity amount",
        );
    };
    let unit = input
        .parameters
        .get(&format!("{name}_unit"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Json(json!({
        "co2e": amount * factor.factor,
        "co2e_unit": "kg",
        "co2e_calculation_method": "ar5",
        "emission_factor": factor,
        "activity_data": { "activity_value": amount, "activity_unit": unit },
    }))
    .into_response()
}

async fn unit_types() -> Json<Value> {
    Json(json!({
        "unit_types": [
            { "unit_type": "Energy", "units": ["kWh", "MWh", "GJ"] },
            { "unit_type": "Distance", "units": ["km", "mi"] },
            { "unit_type": "Weight", "units": ["kg", "t", "lb"] },
        ]
    }))
}

async fn data_versions() -> Json<Value> {
    Json(json!({
        "latest_release": "21.21",
        "latest_major": 21,
        "latest_minor": 21,
    }))
}

async fn management() -> Json<Value> {
    Json(json!({
        "project_id": "mock-project",
        "api_keys": 1,
        "data_version": "^21",
    }))
}

async fn data_search(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let filters: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    let hits: Vec<&Factor> = state
        .factors
        .iter()
        .filter(|f| matches_filters(f, &filters))
        .collect();

    let per_page = params
        .get("results_per_page")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(20);
    let page = params
        .get("page")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);
    let last_page = hits.len().div_ceil(per_page).max(1);
    let results: Vec<&Factor> = hits
        .iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .copied()
        .collect();

    Json(json!({
        "results": results,
        "current_page": page,
        "last_page": last_page,
        "total_results": hits.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(activity_id: &str) -> Factor {
        catalogue()
            .into_iter()
            .find(|f| f.activity_id == activity_id)
            .unwrap()
    }

    #[test]
    fn empty_filters_match_everything() {
        assert!(catalogue().iter().all(|f| matches_filters(f, &Map::new())));
    }

    #[test]
    fn query_matches_name_case_insensitively() {
        let f = factor("steel-type_steel_billets");
        assert!(matches_text(&f, "STEEL"));
        assert!(!matches_text(&f, "petrol"));
    }

    #[test]
    fn year_filter_accepts_numbers_and_strings() {
        let f = factor("steel-type_steel_billets");
        let mut filters = Map::new();
        filters.insert("year".to_string(), json!(2020));
        assert!(matches_filters(&f, &filters));
        filters.insert("year".to_string(), json!("2021"));
        assert!(!matches_filters(&f, &filters));
    }

    #[test]
    fn factor_serializes_to_upstream_shape() {
        let json = serde_json::to_value(factor("steel-type_steel_billets")).unwrap();
        assert_eq!(json["activity_id"], "steel-type_steel_billets");
        assert_eq!(json["factor"], 1850.0);
        assert_eq!(json["year"], 2020);
    }
}
