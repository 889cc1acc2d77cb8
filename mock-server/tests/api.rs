use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_key, DEFAULT_API_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {DEFAULT_API_KEY}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_bearer_is_rejected_with_message() {
    let resp = app()
        .oneshot(Request::builder().uri("/unit-types").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Invalid API key");
}

#[tokio::test]
async fn custom_key_is_enforced() {
    let resp = app_with_key("other")
        .oneshot(authed("GET", "/data-versions", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- search ---

#[tokio::test]
async fn search_with_empty_filters_returns_catalogue() {
    let resp = app().oneshot(authed("POST", "/search", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), mock_server::catalogue().len());
}

#[tokio::test]
async fn search_filters_by_region() {
    let resp = app()
        .oneshot(authed("POST", "/search", r#"{"region":"GB"}"#))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["region"], "GB");
}

// --- emission factors ---

#[tokio::test]
async fn emission_factor_lookup_by_activity_id() {
    let resp = app()
        .oneshot(authed(
            "GET",
            "/emission-factors?activity_id=steel-type_steel_billets",
            "",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], "ef-3");
}

#[tokio::test]
async fn emission_factor_unknown_is_404_with_message() {
    let resp = app()
        .oneshot(authed("GET", "/emission-factors?activity_id=nope", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("No emission factor"));
}

// --- estimate ---

#[tokio::test]
async fn estimate_multiplies_amount_by_factor() {
    let payload = json!({
        "emission_factor": {"activity_id": "electricity-supply_grid-source_residual_mix"},
        "parameters": {"energy": 100, "energy_unit": "kWh"}
    });
    let resp = app()
        .oneshot(authed("POST", "/estimate", &payload.to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["co2e"], 50.0);
    assert_eq!(body["co2e_unit"], "kg");
    assert_eq!(body["activity_data"]["activity_unit"], "kWh");
}

#[tokio::test]
async fn estimate_without_amount_is_400() {
    let payload = json!({
        "emission_factor": {"activity_id": "steel-type_steel_billets"},
        "parameters": {"weight_unit": "t"}
    });
    let resp = app()
        .oneshot(authed("POST", "/estimate", &payload.to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- metadata ---

#[tokio::test]
async fn unit_types_are_wrapped() {
    let resp = app().oneshot(authed("GET", "/unit-types", "")).await.unwrap();

    let body = body_json(resp).await;
    let first = &body["unit_types"][0];
    assert_eq!(first["unit_type"], "Energy");
    assert!(first["units"].as_array().unwrap().contains(&json!("kWh")));
}

#[tokio::test]
async fn data_versions_and_management_respond() {
    let resp = app().oneshot(authed("GET", "/data-versions", "")).await.unwrap();
    assert_eq!(body_json(resp).await["latest_release"], "21.21");

    let resp = app().oneshot(authed("GET", "/management", "")).await.unwrap();
    assert_eq!(body_json(resp).await["project_id"], "mock-project");
}

// --- data search ---

#[tokio::test]
async fn data_search_pages_results() {
    let resp = app()
        .oneshot(authed("GET", "/data/v1/search?results_per_page=2&page=2", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["current_page"], 2);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["total_results"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn data_search_filters_by_year() {
    let resp = app()
        .oneshot(authed("GET", "/data/v1/search?year=2021", ""))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["results"][0]["id"], "ef-2");
}

#[tokio::test]
async fn data_search_survives_huge_paging_values() {
    let uri = format!(
        "/data/v1/search?page={max}&results_per_page={max}",
        max = usize::MAX
    );
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_results"], 3);
    assert_eq!(body["last_page"], 1);
    assert!(body["results"].as_array().unwrap().is_empty());
}
