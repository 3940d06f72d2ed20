//! Configuration loading for the mock engine and variant store.

pub mod error;
pub mod mock;
pub mod parser;

pub use error::ConfigError;
pub use mock::MockConfig;
