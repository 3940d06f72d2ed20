//! Flexmock core library.
//!
//! Two independent components live here:
//! - [`odata`]: a mock response engine faking the TripPin OData v4 `People` service
//! - [`variants`]: an in-memory store of control variants and their change records

pub mod config;
pub mod odata;
pub mod variants;
