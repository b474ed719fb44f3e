//! Error taxonomy shared by the mock engine and the HTTP layer.
//!
//! Errors are classified where they are detected and travel unchanged up to
//! the transport boundary, which maps each class to a status code.

/// Faults attributable to the caller's request or setup call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientFault {
    #[error("Malformed Xml")]
    MalformedXml,
    #[error("Invalid SOAP request")]
    InvalidSoapRequest,
    #[error("Message doesn't contain namespace")]
    MissingNamespace,
    #[error("The namespace of message doesn't match ")]
    NamespaceMismatch,
    #[error("Invalid response position {0}, positions start at 1")]
    InvalidPosition(u32),
    #[error("Invalid response code: {0}")]
    InvalidStatusCode(String),
    #[error("Invalid header definition: {0}")]
    InvalidHeaderList(String),
    #[error("Invalid delay: {0}")]
    InvalidDelay(String),
    #[error("Malformed multipart request: {0}")]
    MalformedMultipart(String),
    #[error("Multipart request doesn't contain a text part")]
    MissingTextPart,
}

/// Error types for request dispatch and operation management
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error(transparent)]
    ClientFault(#[from] ClientFault),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MockError {
    pub fn service_not_found(service: &str) -> Self {
        MockError::NotFound(format!("Service {service} not found"))
    }

    pub fn operation_not_found(service: &str, operation: &str) -> Self {
        MockError::NotFound(format!(
            "Operation {operation} not found for service {service}"
        ))
    }

    pub fn is_client_fault(&self) -> bool {
        matches!(self, MockError::ClientFault(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MockError::NotFound(_))
    }
}
