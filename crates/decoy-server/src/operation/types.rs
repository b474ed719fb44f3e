//! Type definitions for operations: canned responses and recorded requests.

use crate::error::ClientFault;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub(crate) const DEFAULT_STATUS_CODE: u16 = 200;
pub(crate) const DEFAULT_CONTENT_TYPE: &str = "text/xml";

// ============================================================================
// Response Types
// ============================================================================

/// Body of a canned response. Text and binary content never coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Binary(Bytes),
}

impl ResponseBody {
    pub fn is_binary(&self) -> bool {
        matches!(self, ResponseBody::Binary(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResponseBody::Empty => 0,
            ResponseBody::Text(text) => text.len(),
            ResponseBody::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wire bytes for the transport layer
    pub fn to_bytes(&self) -> Bytes {
        match self {
            ResponseBody::Empty => Bytes::new(),
            ResponseBody::Text(text) => Bytes::from(text.clone()),
            ResponseBody::Binary(bytes) => bytes.clone(),
        }
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_string())
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

/// A canned response returned for one invocation.
///
/// A `status_code` of 0 stands for "the operation's default status code" and
/// is resolved when the response is stored on an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockResponse {
    pub body: ResponseBody,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub headers: HashMap<String, String>,
    /// Held back this long after selection, before it is written
    pub delay: Option<Duration>,
}

impl MockResponse {
    /// Text response with the "use default" status code
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: ResponseBody::Text(body.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    pub fn is_binary(&self) -> bool {
        self.body.is_binary()
    }

    /// Replace a zero status code with `code`
    pub(crate) fn set_zero_code_to(&mut self, code: u16) {
        if self.status_code == 0 {
            self.status_code = code;
        }
    }
}

/// Default response of an operation, used whenever no custom response is set
/// for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultResponse {
    pub body: ResponseBody,
    pub status_code: u16,
    pub content_type: String,
    pub headers: HashMap<String, String>,
    /// File the body was loaded from; used as download name for binary bodies
    pub file_name: Option<String>,
}

impl Default for DefaultResponse {
    fn default() -> Self {
        Self {
            body: ResponseBody::Empty,
            status_code: DEFAULT_STATUS_CODE,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            headers: HashMap::new(),
            file_name: None,
        }
    }
}

impl DefaultResponse {
    pub fn is_binary(&self) -> bool {
        self.body.is_binary()
    }

    /// Build the response returned for an invocation without a custom slot
    pub(crate) fn to_mock_response(&self) -> MockResponse {
        let mut response = MockResponse {
            body: self.body.clone(),
            status_code: self.status_code,
            content_type: Some(self.content_type.clone()),
            headers: self.headers.clone(),
            delay: None,
        };
        if self.is_binary() {
            // Browsers use this as the file name for downloads
            response.headers.insert(
                "Content-Disposition".to_string(),
                format!(
                    "attachment; filename={}",
                    self.file_name.as_deref().unwrap_or_default()
                ),
            );
        }
        response
    }
}

/// Parse a `Key:Value,Key2:Value2` header list.
///
/// A blank list yields no headers. Values may contain further colons.
pub fn parse_header_list(list: &str) -> Result<HashMap<String, String>, ClientFault> {
    let mut headers = HashMap::new();
    if list.trim().is_empty() {
        return Ok(headers);
    }
    for entry in list.split(',') {
        match entry.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            _ => return Err(ClientFault::InvalidHeaderList(list.to_string())),
        }
    }
    Ok(headers)
}

// ============================================================================
// Recorded Request Types
// ============================================================================

/// Inbound request as captured on receipt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    /// Invocation number the request was attributed to (0 until recorded)
    pub invocation: u32,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    pub timestamp: String,
}

impl RecordedRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn with_resource_path(mut self, resource_path: Option<String>) -> Self {
        self.resource_path = resource_path.filter(|p| !p.is_empty());
        self
    }
}
