//! Core Operation struct: the response-sequencing state machine.
//!
//! An operation owns a default response, a sparse series of one-shot custom
//! responses keyed by 1-based invocation number, the invocation counter and
//! the request ledger.

use super::recorder::RequestRecorder;
use super::types::{DefaultResponse, MockResponse, RecordedRequest, ResponseBody};
use crate::error::{ClientFault, MockError};
use crate::identify::{NamespaceRules, SoapMessage};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// Runtime state of a mocked operation
#[derive(Debug)]
pub struct Operation {
    name: String,
    defaults: RwLock<DefaultResponse>,
    namespaces: NamespaceRules,
    /// Custom responses by invocation number; missing keys fall through to the default
    custom_responses: RwLock<BTreeMap<u32, MockResponse>>,
    invocation_number: AtomicU32,
    recorder: RequestRecorder,
}

impl Operation {
    /// Create an operation with a default response and no namespace rules
    pub fn new(name: impl Into<String>, defaults: DefaultResponse) -> Self {
        Self {
            name: name.into(),
            defaults: RwLock::new(defaults),
            namespaces: NamespaceRules::default(),
            custom_responses: RwLock::new(BTreeMap::new()),
            invocation_number: AtomicU32::new(0),
            recorder: RequestRecorder::new(),
        }
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceRules) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespaces(&self) -> &NamespaceRules {
        &self.namespaces
    }

    pub fn recorder(&self) -> &RequestRecorder {
        &self.recorder
    }

    pub fn defaults(&self) -> DefaultResponse {
        self.defaults.read().clone()
    }

    pub fn default_status_code(&self) -> u16 {
        self.defaults.read().status_code
    }

    /// Change the default status code. Custom responses already stored keep
    /// the code they were normalized to.
    pub fn set_default_status_code(&self, status_code: u16) {
        self.defaults.write().status_code = status_code;
    }

    pub fn set_default_body(&self, body: ResponseBody) {
        self.defaults.write().body = body;
    }

    /// Response for the `invocation`-th call since the last `init`.
    ///
    /// When the operation declares a namespace allow-list, a SOAP request is
    /// validated first and rejected without consulting any response.
    pub fn next_response(
        &self,
        invocation: u32,
        soap_message: Option<&SoapMessage>,
    ) -> Result<MockResponse, MockError> {
        if let Some(message) = soap_message {
            self.namespaces.validate(message.namespace.as_deref())?;
        } else if !self.namespaces.is_empty() {
            debug!(
                operation = %self.name,
                "Request is not a SOAP message, skipping namespace validation"
            );
        }

        let custom_responses = self.custom_responses.read();
        if let Some(response) = custom_responses.get(&invocation) {
            return Ok(response.clone());
        }
        drop(custom_responses);

        Ok(self.defaults.read().to_mock_response())
    }

    /// Store `response` for the `position`-th invocation, replacing any
    /// response already there.
    pub fn set_custom_response(
        &self,
        mut response: MockResponse,
        position: u32,
    ) -> Result<(), MockError> {
        if position == 0 {
            return Err(ClientFault::InvalidPosition(position).into());
        }
        response.set_zero_code_to(self.default_status_code());
        self.custom_responses.write().insert(position, response);
        debug!(operation = %self.name, position, "Custom response set");
        Ok(())
    }

    /// Store `response` right after the last configured position.
    /// Returns the position it was stored at.
    pub fn add_custom_response(&self, mut response: MockResponse) -> u32 {
        response.set_zero_code_to(self.default_status_code());
        let mut custom_responses = self.custom_responses.write();
        let position = custom_responses
            .last_key_value()
            .map_or(1, |(last, _)| last + 1);
        custom_responses.insert(position, response);
        debug!(operation = %self.name, position, "Custom response added");
        position
    }

    /// Number of the slots in the custom sequence, holes included
    pub fn custom_response_count(&self) -> u32 {
        self.custom_responses
            .read()
            .last_key_value()
            .map_or(0, |(last, _)| *last)
    }

    /// Increment and return the invocation counter
    pub fn next_invocation_number(&self) -> u32 {
        self.invocation_number.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invocations since the last `init`
    pub fn invocation_count(&self) -> u32 {
        self.invocation_number.load(Ordering::SeqCst)
    }

    /// Record an inbound request and attribute it to the next invocation number
    pub fn record_invocation(&self, request: RecordedRequest) -> u32 {
        self.recorder
            .record_with(request, || self.next_invocation_number())
    }

    /// Clear custom responses, the invocation counter and the ledger.
    /// Default response and namespace rules are kept.
    pub fn init(&self) {
        self.custom_responses.write().clear();
        self.recorder
            .clear_with(|| self.invocation_number.store(0, Ordering::SeqCst));
        debug!(operation = %self.name, "Operation initialized");
    }
}
