//! Errors aborting a single intercepted request.

use crate::odata::batch::BatchError;
use crate::odata::fixtures::FixtureError;
use crate::odata::query::QueryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("Could not find any user data in {0:?}")]
    MissingUserData(String),
    #[error("Invalid user data in request body: {0}")]
    InvalidUserData(#[source] serde_json::Error),
    #[error("No user with key '{0}'")]
    UnknownKey(String),
}
