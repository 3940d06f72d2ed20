//! Interception handle returned by [`MockServer::start`].
//!
//! The handle owns the dataset, so several servers can coexist and `stop` simply
//! consumes it.

use crate::config::MockConfig;
use crate::odata::error::MockError;
use crate::odata::fixtures::{FixtureError, Fixtures, Person};
use crate::odata::request::{MockRequest, MockResponse};
use crate::odata::service::{Dispatch, ODataService};

/// What happened to an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// URL is outside the mocked service; the request goes to the network untouched
    Passthrough,
    /// URL is in scope but no route answers it
    Unanswered,
    Responded(MockResponse),
}

/// A running mock of the TripPin `People` service.
#[derive(Debug)]
pub struct MockServer {
    service: ODataService,
}

impl MockServer {
    /// Load fixtures and start intercepting requests to `config.base_url`.
    pub fn start(config: MockConfig) -> Result<Self, FixtureError> {
        let fixtures = Fixtures::load(&config)?;
        Ok(Self::with_fixtures(config, fixtures))
    }

    /// Same as [`MockServer::start`] but reads fixtures through tokio.
    pub async fn start_async(config: MockConfig) -> Result<Self, FixtureError> {
        let fixtures = Fixtures::load_async(&config).await?;
        Ok(Self::with_fixtures(config, fixtures))
    }

    fn with_fixtures(config: MockConfig, fixtures: Fixtures) -> Self {
        tracing::info!("Mock server started for {}", config.base_url);
        Self {
            service: ODataService::new(config, fixtures),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.service.config().base_url
    }

    /// Whether requests to `url` are answered by this server.
    pub fn intercepts(&self, url: &str) -> bool {
        url.contains(self.base_url())
    }

    pub fn people(&self) -> &[Person] {
        self.service.people()
    }

    /// Handle an outgoing request.
    pub fn intercept(&mut self, request: &MockRequest) -> Result<Interception, MockError> {
        if !self.intercepts(&request.url) {
            return Ok(Interception::Passthrough);
        }

        tracing::info!("Received {} request to URL {}", request.method, request.url);
        match &request.body {
            Some(body) => tracing::debug!("Request body is:\n{}", body),
            None => tracing::debug!("No request body."),
        }

        let dispatch = self.service.handle(request).inspect_err(|err| {
            tracing::error!("{} {} failed: {}", request.method, request.url, err);
        })?;

        match dispatch {
            Dispatch::Handled(response) => {
                tracing::info!("Sent response with return code {}", response.status);
                tracing::debug!(
                    "Response headers: {:?}\n\nResponse body:\n{}",
                    response.headers,
                    response.body_text().unwrap_or_default()
                );
                Ok(Interception::Responded(response))
            }
            Dispatch::NotHandled => {
                tracing::warn!("No mock response for {} {}", request.method, request.url);
                Ok(Interception::Unanswered)
            }
        }
    }

    /// Stop intercepting. The dataset is dropped with the handle.
    pub fn stop(self) {
        tracing::info!("Mock server stopped for {}", self.base_url());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odata::fixtures::tests::fixture_dir;
    use crate::odata::request::HttpMethod;
    use rstest::rstest;

    fn url(server: &MockServer, path: &str) -> String {
        format!("{}{}", server.base_url(), path)
    }

    #[rstest]
    fn test_start_fails_without_fixtures() {
        let (dir, config) = fixture_dir();
        drop(dir);
        let err = MockServer::start(config).unwrap_err();
        assert!(matches!(err, FixtureError::NotFound { .. }));
    }

    #[rstest]
    fn test_requests_outside_base_url_pass_through() {
        let (_dir, config) = fixture_dir();
        let mut server = MockServer::start(config).expect("start");
        let request = MockRequest::new(HttpMethod::Get, "http://localhost:8080/index.html");
        assert_eq!(
            server.intercept(&request).expect("ok"),
            Interception::Passthrough
        );
    }

    #[rstest]
    fn test_unmatched_request_in_scope_is_unanswered() {
        let (_dir, config) = fixture_dir();
        let mut server = MockServer::start(config).expect("start");
        let request = MockRequest::new(HttpMethod::Get, url(&server, "Airlines"));
        assert_eq!(
            server.intercept(&request).expect("ok"),
            Interception::Unanswered
        );
    }

    #[rstest]
    fn test_intercept_answers_in_scope_request() {
        let (_dir, config) = fixture_dir();
        let mut server = MockServer::start(config).expect("start");
        let request = MockRequest::new(HttpMethod::Get, url(&server, "People/$count"));
        match server.intercept(&request).expect("ok") {
            Interception::Responded(response) => {
                assert_eq!(response.status, 200);
                assert_eq!(response.body_text().as_deref(), Some("20"));
            }
            other => panic!("unexpected interception: {other:?}"),
        }
        server.stop();
    }

    #[rstest]
    fn test_reset_after_mutations_restores_fixture() {
        let (_dir, config) = fixture_dir();
        let mut server = MockServer::start(config).expect("start");
        let pristine = server.people().to_vec();

        let post = MockRequest::new(HttpMethod::Post, url(&server, "People"))
            .with_body(r#"{"UserName":"x","LastName":"X"}"#);
        server.intercept(&post).expect("post");
        assert_eq!(server.people().len(), pristine.len() + 1);

        let reset = MockRequest::new(HttpMethod::Post, url(&server, "ResetDataSource"));
        server.intercept(&reset).expect("reset");
        assert_eq!(server.people(), pristine.as_slice());
    }

    #[rstest]
    fn test_reset_fails_when_fixture_disappears() {
        let (dir, config) = fixture_dir();
        let mut server = MockServer::start(config).expect("start");
        std::fs::remove_file(dir.path().join("people.json")).expect("remove");

        let reset = MockRequest::new(HttpMethod::Post, url(&server, "ResetDataSource"));
        assert!(matches!(
            server.intercept(&reset).unwrap_err(),
            MockError::Fixture(_)
        ));
        assert_eq!(server.people().len(), 20);
    }

    #[tokio::test]
    async fn test_start_async() {
        let (_dir, config) = fixture_dir();
        let server = MockServer::start_async(config).await.expect("start");
        assert_eq!(server.people().len(), 20);
    }
}
