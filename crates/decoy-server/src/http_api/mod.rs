//! HTTP API for the mock server.
//!
//! This module exposes over HTTP:
//! - Mock endpoints called by the system under test (SOAP and REST)
//! - Per-operation setup: reset and custom responses
//! - Per-operation verification: recorded requests and their projections
//! - A JSON service directory and a health endpoint

mod handlers;
mod router;
mod server;
mod types;

pub use server::{shutdown_on, MockServer};
