//! Append-only ledger of requests received by one operation.

use super::types::RecordedRequest;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Per-operation request ledger.
///
/// Every projection reads the same entries, so header, query and path views
/// always line up with the recorded bodies.
#[derive(Debug, Default)]
pub struct RequestRecorder {
    ledger: Mutex<Vec<RecordedRequest>>,
}

impl RequestRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request, numbering it with `assign` while the ledger is locked.
    ///
    /// Concurrent callers therefore appear in the ledger in invocation order.
    pub fn record_with(&self, mut request: RecordedRequest, assign: impl FnOnce() -> u32) -> u32 {
        let mut ledger = self.ledger.lock();
        let invocation = assign();
        request.invocation = invocation;
        ledger.push(request);
        invocation
    }

    /// Append a request as-is
    pub fn record(&self, request: RecordedRequest) {
        self.ledger.lock().push(request);
    }

    /// Clear the ledger, running `reset` under the same lock
    pub fn clear_with(&self, reset: impl FnOnce()) {
        let mut ledger = self.ledger.lock();
        ledger.clear();
        reset();
    }

    pub fn clear(&self) {
        self.clear_with(|| {});
    }

    pub fn len(&self) -> usize {
        self.ledger.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all recorded requests, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.ledger.lock().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.project(|r| Some(r.body.clone()))
    }

    pub fn headers(&self) -> Vec<BTreeMap<String, String>> {
        self.project(|r| Some(r.headers.clone()))
    }

    /// Query strings of requests that carried one
    pub fn url_params(&self) -> Vec<String> {
        self.project(|r| r.query.clone())
    }

    /// Resource paths of requests that carried one
    pub fn resource_paths(&self) -> Vec<String> {
        self.project(|r| r.resource_path.clone())
    }

    fn project<T>(&self, f: impl Fn(&RecordedRequest) -> Option<T>) -> Vec<T> {
        self.ledger.lock().iter().filter_map(f).collect()
    }
}
