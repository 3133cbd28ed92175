//! Raw message header access.

pub mod headers;
