//! NAPI bindings for the OData mock server.

use flexmock_core::config::{parser, MockConfig};
use flexmock_core::odata::{
    HttpMethod as CoreHttpMethod, Interception, MockRequest, MockResponse as CoreMockResponse,
    MockServer as CoreMockServer,
};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// HTTP method of an intercepted request
#[napi]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl From<HttpMethod> for CoreHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => CoreHttpMethod::Get,
            HttpMethod::Post => CoreHttpMethod::Post,
            HttpMethod::Put => CoreHttpMethod::Put,
            HttpMethod::Patch => CoreHttpMethod::Patch,
            HttpMethod::Delete => CoreHttpMethod::Delete,
            HttpMethod::Head => CoreHttpMethod::Head,
            HttpMethod::Options => CoreHttpMethod::Options,
        }
    }
}

/// Synthesized response
#[napi(object)]
#[derive(Clone)]
pub struct MockResponse {
    pub status: u32,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl From<CoreMockResponse> for MockResponse {
    fn from(r: CoreMockResponse) -> Self {
        let body = r.body_text();
        Self {
            status: u32::from(r.status),
            headers: r.headers.into_iter().collect(),
            body,
        }
    }
}

/// Mock of the TripPin `People` service
#[napi]
pub struct MockServer {
    inner: Arc<Mutex<Option<CoreMockServer>>>,
}

#[napi]
impl MockServer {
    /// Load fixtures and start intercepting.
    ///
    /// @param config - Optional `{ baseUrl, metadataPath, peoplePath }`; missing fields use defaults
    #[napi(constructor)]
    pub fn new(config: Option<serde_json::Value>) -> Result<Self> {
        let config: MockConfig = match config {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| Error::from_reason(format!("Invalid mock config: {e}")))?,
            None => MockConfig::default(),
        };
        Self::start(config)
    }

    /// Start from a JSON, JSONC or YAML config file.
    #[napi(factory)]
    pub fn from_file(config_path: String) -> Result<Self> {
        let config: MockConfig = parser::load_config_file(&config_path)
            .map_err(|e| Error::from_reason(format!("Failed to load config: {e}")))?;
        Self::start(config)
    }

    fn start(config: MockConfig) -> Result<Self> {
        let server = CoreMockServer::start(config).map_err(|e| Error::from_reason(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Some(server))),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<CoreMockServer>>> {
        self.inner
            .lock()
            .map_err(|_| Error::from_reason("Mock server lock poisoned"))
    }

    /// Base URL of the mocked service, or null once stopped
    #[napi(getter)]
    pub fn base_url(&self) -> Result<Option<String>> {
        let server = self.lock()?;
        Ok(server.as_ref().map(|s| s.base_url().to_string()))
    }

    /// Whether a request to `url` would be answered
    #[napi]
    pub fn intercepts(&self, url: String) -> Result<bool> {
        let server = self.lock()?;
        Ok(server.as_ref().is_some_and(|s| s.intercepts(&url)))
    }

    /// Current dataset
    #[napi]
    pub fn people(&self) -> Result<Vec<serde_json::Value>> {
        let server = self.lock()?;
        Ok(server
            .as_ref()
            .map(|s| s.people().iter().cloned().map(serde_json::Value::Object).collect())
            .unwrap_or_default())
    }

    /// Handle an outgoing request.
    ///
    /// Returns null when the request should go to the network (outside the service, no
    /// matching route, or server stopped).
    /// @throws Error on unsupported query fields, malformed bodies and unknown keys
    #[napi]
    pub fn handle(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<String>,
    ) -> Result<Option<MockResponse>> {
        let mut server = self.lock()?;
        let Some(server) = server.as_mut() else {
            return Ok(None);
        };

        let mut request = MockRequest::new(method.into(), url);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        match server
            .intercept(&request)
            .map_err(|e| Error::from_reason(e.to_string()))?
        {
            Interception::Responded(response) => Ok(Some(response.into())),
            Interception::Passthrough | Interception::Unanswered => Ok(None),
        }
    }

    /// Stop intercepting and drop the dataset
    #[napi]
    pub fn stop(&self) -> Result<()> {
        if let Some(server) = self.lock()?.take() {
            server.stop();
        }
        Ok(())
    }
}
