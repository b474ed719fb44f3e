//! Mocked operations: response sequencing and request recording.
//!
//! This module provides:
//! - `Operation`: default response, sparse custom responses and invocation counter
//! - `RequestRecorder`: per-operation ledger consulted by verification queries
//! - `MockResponse` / `RecordedRequest`: values flowing in and out of an operation
//!
//! ## Module Structure
//!
//! - `types`: response and request value types
//! - `recorder`: the request ledger
//! - `core`: the `Operation` state machine

mod core;
mod recorder;
mod types;

#[cfg(test)]
mod tests;

pub use core::Operation;
pub use recorder::RequestRecorder;
pub use types::{parse_header_list, DefaultResponse, MockResponse, RecordedRequest, ResponseBody};
pub(crate) use types::{DEFAULT_CONTENT_TYPE, DEFAULT_STATUS_CODE};
