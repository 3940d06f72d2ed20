//! Request handlers of the mocked `People` service.

use crate::config::MockConfig;
use crate::odata::batch::{BatchError, BatchRequest};
use crate::odata::error::MockError;
use crate::odata::fixtures::{Fixtures, Person};
use crate::odata::query::CollectionQuery;
use crate::odata::request::{
    MockRequest, MockResponse, ResponseBody, CONTENT_TYPE, CONTENT_TYPE_COUNT, CONTENT_TYPE_JSON,
    CONTENT_TYPE_XML,
};
use crate::odata::router::{Handler, RouteMatch, Router};
use serde_json::{json, Value};

/// Outcome of dispatching a request against the route table.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Handled(MockResponse),
    /// No route matched; the request stays unanswered
    NotHandled,
}

/// Mutable dataset plus the routes serving it.
#[derive(Debug, Clone)]
pub struct ODataService {
    config: MockConfig,
    router: Router,
    fixtures: Fixtures,
}

impl ODataService {
    pub fn new(config: MockConfig, fixtures: Fixtures) -> Self {
        Self {
            config,
            router: Router::people_service(),
            fixtures,
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn people(&self) -> &[Person] {
        &self.fixtures.people
    }

    pub fn metadata(&self) -> &str {
        &self.fixtures.metadata
    }

    /// Dispatch a request, unwrapping `$batch` bodies.
    pub fn handle(&mut self, request: &MockRequest) -> Result<Dispatch, MockError> {
        match self.router.resolve(request.method, &request.url) {
            Some(RouteMatch {
                handler: Handler::Batch,
                ..
            }) => self.handle_batch(request).map(Dispatch::Handled),
            Some(matched) => self.run(matched, request).map(Dispatch::Handled),
            None => Ok(Dispatch::NotHandled),
        }
    }

    /// Dispatch a request that is not itself a batch.
    pub fn handle_direct(&mut self, request: &MockRequest) -> Result<Dispatch, MockError> {
        match self.router.resolve(request.method, &request.url) {
            Some(matched) if matched.handler != Handler::Batch => {
                self.run(matched, request).map(Dispatch::Handled)
            }
            _ => Ok(Dispatch::NotHandled),
        }
    }

    fn run(
        &mut self,
        matched: RouteMatch,
        request: &MockRequest,
    ) -> Result<MockResponse, MockError> {
        let key = matched.key.unwrap_or_default();
        match matched.handler {
            Handler::Metadata => Ok(self.metadata_response()),
            Handler::Count => Ok(self.count_response()),
            Handler::Query => self.query_response(&request.url),
            Handler::Update => self.update(&key, request.body_str()),
            Handler::Delete => self.delete(&key),
            Handler::Create => self.create(request.body_str()),
            Handler::Reset => self.reset(),
            Handler::Batch => self.handle_batch(request),
        }
    }

    fn metadata_response(&self) -> MockResponse {
        MockResponse::odata(200)
            .header(CONTENT_TYPE, CONTENT_TYPE_XML)
            .with_body(ResponseBody::Text(self.fixtures.metadata.clone()))
    }

    fn count_response(&self) -> MockResponse {
        MockResponse::odata(200)
            .header(CONTENT_TYPE, CONTENT_TYPE_COUNT)
            .with_body(ResponseBody::Text(self.fixtures.people.len().to_string()))
    }

    fn query_response(&self, url: &str) -> Result<MockResponse, MockError> {
        let query = CollectionQuery::from_url(url)?;
        let result = query.run(&self.fixtures.people);

        let mut body = json!({
            "@odata.context": format!(
                "{}$metadata#People(Age,FirstName,LastName,UserName)",
                self.config.base_url
            ),
            "value": result.items,
        });
        if query.inline_count {
            body["@odata.count"] = json!(result.count);
        }

        Ok(MockResponse::odata(200)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_body(ResponseBody::Json(body)))
    }

    fn update(&mut self, key: &str, body: &str) -> Result<MockResponse, MockError> {
        let changes = user_data(body)?;
        let person = self
            .fixtures
            .people
            .iter_mut()
            .find(|p| has_user_name(p, key))
            .ok_or_else(|| MockError::UnknownKey(key.to_string()))?;
        person.extend(changes);

        Ok(MockResponse::odata(204).header(CONTENT_TYPE, CONTENT_TYPE_JSON))
    }

    fn delete(&mut self, key: &str) -> Result<MockResponse, MockError> {
        let index = self
            .fixtures
            .people
            .iter()
            .position(|p| has_user_name(p, key))
            .ok_or_else(|| MockError::UnknownKey(key.to_string()))?;
        self.fixtures.people.remove(index);

        Ok(MockResponse::odata(204))
    }

    /// Appends without a duplicate check, as the live service does.
    fn create(&mut self, body: &str) -> Result<MockResponse, MockError> {
        let person = user_data(body)?;

        let mut entity = serde_json::Map::new();
        entity.insert(
            "@odata.context".to_string(),
            Value::String(format!("{}$metadata#People/$entity", self.config.base_url)),
        );
        entity.extend(person.clone());
        self.fixtures.people.push(person);

        Ok(MockResponse::odata(201)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_body(ResponseBody::Json(Value::Object(entity))))
    }

    /// Reload both fixture files, discarding every mutation.
    pub fn reset(&mut self) -> Result<MockResponse, MockError> {
        self.fixtures = Fixtures::load(&self.config)?;
        Ok(MockResponse::odata(204))
    }

    fn handle_batch(&mut self, request: &MockRequest) -> Result<MockResponse, MockError> {
        let batch = BatchRequest::parse(request.body_str())?;

        let mut responses = Vec::with_capacity(batch.parts.len());
        for (index, part) in batch.parts.iter().enumerate() {
            match self.handle_direct(part)? {
                Dispatch::Handled(response) => responses.push(response),
                Dispatch::NotHandled => {
                    return Err(BatchError::UnansweredPart {
                        index,
                        method: part.method,
                        url: part.url.clone(),
                    }
                    .into())
                }
            }
        }

        Ok(batch.render(&responses))
    }
}

fn has_user_name(person: &Person, key: &str) -> bool {
    person.get("UserName").and_then(Value::as_str) == Some(key)
}

/// JSON object spanning the first `{` to the last `}` of the body.
fn user_data(body: &str) -> Result<Person, MockError> {
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&body[start..=end]).map_err(MockError::InvalidUserData)
        }
        _ => Err(MockError::MissingUserData(body.to_string())),
    }
}
