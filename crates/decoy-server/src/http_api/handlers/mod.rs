//! Request handlers for the HTTP API.

pub mod directory;
pub mod endpoint;
pub mod setup;
pub mod verification;
