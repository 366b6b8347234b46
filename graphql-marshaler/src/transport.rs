//! Sending built requests to a GraphQL API.
use indexmap::IndexMap;
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use url::Url;

use crate::configuration::ClientConfiguration;
use crate::error::BoxError;
use crate::request::RequestBody;
use crate::response::Response;

/// Carries a request body to an API and hands back the raw response.
///
/// Decoding the GraphQL envelope is left to the caller, so implementations only deal
/// with the wire. Retry policies belong here too.
pub trait Transport: Send + Sync {
    fn transport(&self, request: &RequestBody) -> Result<Response, BoxError>;
}

/// Posts each request as JSON to a single URL and waits for the answer.
#[derive(Debug, Clone)]
pub struct SimpleHttpTransport {
    api_url: Url,
    headers: IndexMap<String, Vec<String>>,
    http_client: HttpClient,
}

impl SimpleHttpTransport {
    pub fn new(api_url: Url) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(api_url, HttpClient::builder().build()?))
    }

    /// Builds a transport for the configured endpoint, timeout and headers.
    pub fn from_configuration(configuration: &ClientConfiguration) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder()
            .timeout(configuration.timeout)
            .build()?;
        let mut transport = Self::with_client(configuration.endpoint.clone(), http_client);
        for (name, value) in &configuration.headers {
            transport.add_header(name, value);
        }
        Ok(transport)
    }

    fn with_client(api_url: Url, http_client: HttpClient) -> Self {
        let mut transport = Self {
            api_url,
            headers: IndexMap::new(),
            http_client,
        };
        transport.add_header("Content-Type", "application/json");
        transport
    }

    /// Adds a header value sent with every request. Values accumulate.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    pub fn headers(&self) -> &IndexMap<String, Vec<String>> {
        &self.headers
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

impl Transport for SimpleHttpTransport {
    fn transport(&self, request: &RequestBody) -> Result<Response, BoxError> {
        let body = serde_json::to_vec(request)?;
        let mut http_request = self.http_client.post(self.api_url.clone()).body(body);
        for (name, values) in &self.headers {
            for value in values {
                http_request = http_request.header(name.as_str(), value.as_str());
            }
        }

        tracing::debug!(url = %self.api_url, "sending graphql request");
        let http_response = http_request.send()?;
        let status = http_response.status();
        if status != StatusCode::OK {
            return Err(format!("error from the api: {status}").into());
        }

        let headers = http_response.headers().clone();
        let payload = http_response.bytes()?;
        tracing::trace!(
            payload = %String::from_utf8_lossy(&payload),
            "received graphql response"
        );
        Ok(Response {
            status,
            headers,
            payload,
        })
    }
}
