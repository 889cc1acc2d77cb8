//! Executes `HttpRequest` values against the network.
//!
//! `UreqTransport` is the blocking default. Any
//! `Fn(HttpRequest) -> Result<HttpResponse, ApiError>` is also a transport,
//! which is how the session and selector tests script upstream responses.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round-trip. Non-2xx statuses are returned as data, not as
    /// errors; status interpretation belongs to the client.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx must come back as responses so their bodies can be read.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            query,
            headers,
            body,
        } = request;

        let mut response = match method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&path);
                for (k, v) in &query {
                    builder = builder.query(k, v);
                }
                for (k, v) in &headers {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&path);
                for (k, v) in &query {
                    builder = builder.query(k, v);
                }
                for (k, v) in &headers {
                    builder = builder.header(k.as_str(), v.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |req: HttpRequest| {
            Ok::<_, ApiError>(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: req.path,
            })
        };
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "http://upstream/unit-types".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };
        let resp = transport.execute(req).unwrap();
        assert_eq!(resp.body, "http://upstream/unit-types");
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: format!("http://127.0.0.1:{port}/data-versions"),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };
        let err = UreqTransport::new().execute(req).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
