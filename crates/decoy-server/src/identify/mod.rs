//! Request-to-operation identification.
//!
//! - `soap`: request element extraction from a SOAP envelope
//! - `rest`: HTTP method keys and resource-path shape checks
//! - `namespace`: allow-list validation of SOAP request namespaces

mod namespace;
mod rest;
mod soap;

pub use namespace::NamespaceRules;
pub use rest::{is_multi_segment, is_rest_method, rest_operation_key, REST_METHODS};
pub use soap::{parse_soap_message, SoapMessage};

use crate::error::ClientFault;
use crate::registry::ServiceType;

/// Result of identifying the operation an inbound request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identified {
    pub operation_key: String,
    /// Present for SOAP calls; carries the namespace to validate
    pub soap_message: Option<SoapMessage>,
}

/// Derive the operation key for a request against a service of `service_type`.
pub fn identify(
    service_type: ServiceType,
    method: &str,
    body: &str,
) -> Result<Identified, ClientFault> {
    match service_type {
        ServiceType::Soap => {
            let message = parse_soap_message(body)?;
            Ok(Identified {
                operation_key: message.operation.clone(),
                soap_message: Some(message),
            })
        }
        ServiceType::Rest => Ok(Identified {
            operation_key: rest_operation_key(method),
            soap_message: None,
        }),
    }
}
