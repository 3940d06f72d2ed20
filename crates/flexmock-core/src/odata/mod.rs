//! Mock response engine for the TripPin OData v4 `People` service.
//!
//! - [`MockServer`]: start/stop handle owning the dataset and answering intercepted requests
//! - [`ODataService`]: route dispatch and the `People` handlers
//! - [`BatchRequest`]: `$batch` multipart parsing and rendering

pub mod batch;
pub mod error;
pub mod fixtures;
pub mod query;
pub mod request;
pub mod router;
pub mod server;
pub mod service;

pub use batch::{BatchError, BatchRequest};
pub use error::MockError;
pub use fixtures::{FixtureError, Fixtures, Person};
pub use query::QueryError;
pub use request::{HttpMethod, MockRequest, MockResponse, ResponseBody};
pub use server::{Interception, MockServer};
pub use service::{Dispatch, ODataService};
