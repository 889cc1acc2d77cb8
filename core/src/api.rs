//! Typed facade over the Climatiq endpoints.
//!
//! Each method is build, execute, parse: exactly one outbound request, no
//! retry, no caching.

use tracing::{debug, warn};

use crate::client::ClimatiqClient;
use crate::config::ClimatiqConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    DataVersionsResponse, EmissionFactorResponse, EstimationModel, EstimationResponse,
    ManagementResponse, ParametersModel, SearchParams, SearchResponse, SelectorModel,
    UnitTypesResponse,
};

#[derive(Debug, Clone)]
pub struct ClimatiqApi<T = UreqTransport> {
    client: ClimatiqClient,
    transport: T,
}

impl ClimatiqApi<UreqTransport> {
    /// Facade over the network with a fresh `ureq` agent.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_transport(ClimatiqClient::new(base_url, api_key), UreqTransport::new())
    }

    pub fn from_config(config: &ClimatiqConfig) -> Self {
        Self::new(&config.api_url, &config.api_key)
    }

    /// Reads `CLIMATIQ_API_URL` / `CLIMATIQ_API_KEY` (and `.env`).
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::from_config(&ClimatiqConfig::from_env()?))
    }
}

impl<T: Transport> ClimatiqApi<T> {
    pub fn with_transport(client: ClimatiqClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ClimatiqClient {
        &self.client
    }

    pub fn search_emission_factors(
        &self,
        params: &SelectorModel,
    ) -> Result<Vec<EmissionFactorResponse>, ApiError> {
        self.call(
            self.client.build_search_emission_factors(params),
            ClimatiqClient::parse_search_emission_factors,
        )
    }

    pub fn get_emission_factors(
        &self,
        params: &ParametersModel,
    ) -> Result<EmissionFactorResponse, ApiError> {
        self.call(
            self.client.build_get_emission_factors(params),
            ClimatiqClient::parse_get_emission_factors,
        )
    }

    pub fn calculate_emissions(
        &self,
        params: &EstimationModel,
    ) -> Result<EstimationResponse, ApiError> {
        self.call(
            self.client.build_calculate_emissions(params),
            ClimatiqClient::parse_calculate_emissions,
        )
    }

    pub fn get_unit_types(&self) -> Result<UnitTypesResponse, ApiError> {
        self.call(Ok(self.client.build_get_unit_types()), ClimatiqClient::parse_get_unit_types)
    }

    pub fn get_data_versions(&self) -> Result<DataVersionsResponse, ApiError> {
        self.call(
            Ok(self.client.build_get_data_versions()),
            ClimatiqClient::parse_get_data_versions,
        )
    }

    /// Same request as `get_data_versions`, returning the upstream body
    /// verbatim.
    pub fn get_data_versions_raw(&self) -> Result<String, ApiError> {
        self.call(
            Ok(self.client.build_get_data_versions()),
            ClimatiqClient::parse_get_data_versions_raw,
        )
    }

    pub fn get_management_data(&self) -> Result<ManagementResponse, ApiError> {
        self.call(
            Ok(self.client.build_get_management_data()),
            ClimatiqClient::parse_get_management_data,
        )
    }

    /// Query-string search against `/data/v1/search`.
    pub fn search_data(&self, params: &SearchParams) -> Result<SearchResponse, ApiError> {
        self.call(self.client.build_search_data(params), ClimatiqClient::parse_search_data)
    }

    /// Build, execute, parse. Every failure, including one from building the
    /// request, is logged once here.
    fn call<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&ClimatiqClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        request
            .and_then(|req| self.send(req))
            .and_then(|resp| parse(&self.client, resp))
            .inspect_err(log_failure)
    }

    fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = req.method.as_str();
        let path = req.path.clone();
        debug!(method, path = %path, "sending upstream request");
        let resp = self.transport.execute(req)?;
        debug!(method, path = %path, status = resp.status, "upstream responded");
        Ok(resp)
    }
}

fn log_failure(err: &ApiError) {
    warn!(error = %err, status = ?err.status(), "climatiq request failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use std::cell::{Cell, RefCell};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts `WARN` events emitted while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    fn ok(body: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        })
    }

    #[test]
    fn search_with_empty_filters_posts_once_and_returns_body() {
        let seen = RefCell::new(Vec::new());
        let transport = |req: HttpRequest| {
            seen.borrow_mut().push(req);
            ok(r#"[{"activity_id":"electricity-supply_grid","factor":0.4}]"#)
        };
        let api = ClimatiqApi::with_transport(ClimatiqClient::new("http://up", "k"), transport);

        let factors = api.search_emission_factors(&SelectorModel::default()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, HttpMethod::Post);
        assert_eq!(seen[0].path, "http://up/search");
        assert_eq!(seen[0].body.as_deref(), Some("{}"));
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].factor(), Some(0.4));
    }

    #[test]
    fn transport_failure_propagates() {
        let transport =
            |_: HttpRequest| Err::<HttpResponse, _>(ApiError::Transport("refused".to_string()));
        let api = ClimatiqApi::with_transport(ClimatiqClient::new("http://up", "k"), transport);
        let err = api.get_management_data().unwrap_err();
        assert_eq!(err, ApiError::Transport("refused".to_string()));
    }

    #[test]
    fn upstream_rejection_carries_message() {
        let transport = |_: HttpRequest| {
            Ok::<_, ApiError>(HttpResponse {
                status: 400,
                headers: Vec::new(),
                body: r#"{"message":"Unknown activity_id"}"#.to_string(),
            })
        };
        let api = ClimatiqApi::with_transport(ClimatiqClient::new("http://up", "k"), transport);
        let err = api.get_emission_factors(&ParametersModel::default()).unwrap_err();
        assert_eq!(err.message(), "Unknown activity_id");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn build_failure_is_logged_and_never_sent() {
        let calls = Cell::new(0);
        let transport = |_: HttpRequest| {
            calls.set(calls.get() + 1);
            ok("{}")
        };
        let api = ClimatiqApi::with_transport(ClimatiqClient::new("http://up", "k"), transport);

        let mut result = None;
        let warnings = count_warnings(|| {
            result = Some(api.call(
                Err(ApiError::Serialization("unserializable".to_string())),
                ClimatiqClient::parse_get_management_data,
            ));
        });

        assert_eq!(
            result.unwrap().unwrap_err(),
            ApiError::Serialization("unserializable".to_string())
        );
        assert_eq!(calls.get(), 0);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn each_failure_is_logged_once() {
        fn warnings_for(transport: impl Fn(HttpRequest) -> Result<HttpResponse, ApiError>) -> usize {
            let api = ClimatiqApi::with_transport(ClimatiqClient::new("http://up", "k"), transport);
            count_warnings(|| {
                let _ = api.get_unit_types();
            })
        }

        assert_eq!(
            warnings_for(|_| Err(ApiError::Transport("refused".to_string()))),
            1
        );
        assert_eq!(warnings_for(|_| ok("not json")), 1);
        assert_eq!(warnings_for(|_| ok(r#"{"unit_types":[]}"#)), 0);
    }

    #[test]
    fn raw_data_versions_are_not_reencoded() {
        let body = r#"{"latest_release":null,"latest_major":21.5}"#;
        let transport = |_: HttpRequest| ok(body);
        let api = ClimatiqApi::with_transport(ClimatiqClient::new("http://up", "k"), transport);
        assert_eq!(api.get_data_versions_raw().unwrap(), body);
    }
}
