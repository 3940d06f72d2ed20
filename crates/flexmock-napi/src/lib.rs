//! NAPI-RS bindings for Flexmock core library.
//!
//! Exposes the OData mock server and the variant controller to Node.js.

use napi::bindgen_prelude::*;
use napi_derive::napi;
use tracing_subscriber::EnvFilter;

mod server;
mod variants;

pub use server::*;
pub use variants::*;

/// Library version
#[napi]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Install a stderr log subscriber.
///
/// @param filter - `tracing` filter directive, e.g. `flexmock_core=debug`; defaults to `info`
#[napi]
pub fn init_logging(filter: Option<String>) -> Result<()> {
    let filter = match filter {
        Some(directive) => EnvFilter::try_new(&directive)
            .map_err(|e| Error::from_reason(format!("Invalid log filter '{directive}': {e}")))?,
        None => EnvFilter::new("info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::from_reason(e.to_string()))
}
