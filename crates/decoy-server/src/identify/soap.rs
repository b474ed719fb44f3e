//! SOAP envelope inspection.
//!
//! Only the structure needed to name an operation is read: the document
//! element `Envelope`, its `Body` child and the first element inside the body.

use crate::error::ClientFault;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::parser;
use tracing::debug;

const ENVELOPE: &str = "Envelope";
const BODY: &str = "Body";

/// Request element of a SOAP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapMessage {
    /// Local name of the first element child of `Body`
    pub operation: String,
    /// Namespace URI of that element, if it has a non-empty one
    pub namespace: Option<String>,
}

/// Parse a SOAP payload and extract its request element.
///
/// Matching of `Envelope` and `Body` is by local name only, so SOAP 1.1 and
/// 1.2 envelopes (or any prefix) are accepted alike.
pub fn parse_soap_message(payload: &str) -> Result<SoapMessage, ClientFault> {
    let package = parser::parse(payload).map_err(|e| {
        debug!("SOAP payload is not well-formed XML: {:?}", e);
        ClientFault::MalformedXml
    })?;
    let document = package.as_document();

    let envelope = document
        .root()
        .children()
        .into_iter()
        .find_map(|child| match child {
            ChildOfRoot::Element(element) if element.name().local_part() == ENVELOPE => {
                Some(element)
            }
            _ => None,
        })
        .ok_or(ClientFault::InvalidSoapRequest)?;

    let body = child_element_named(envelope, BODY).ok_or(ClientFault::InvalidSoapRequest)?;
    let request = first_child_element(body).ok_or(ClientFault::InvalidSoapRequest)?;

    let name = request.name();
    Ok(SoapMessage {
        operation: name.local_part().to_string(),
        namespace: name
            .namespace_uri()
            .filter(|ns| !ns.is_empty())
            .map(str::to_string),
    })
}

fn child_element_named<'d>(parent: Element<'d>, local_name: &str) -> Option<Element<'d>> {
    parent.children().into_iter().find_map(|child| match child {
        ChildOfElement::Element(element) if element.name().local_part() == local_name => {
            Some(element)
        }
        _ => None,
    })
}

fn first_child_element(parent: Element<'_>) -> Option<Element<'_>> {
    parent.children().into_iter().find_map(|child| match child {
        ChildOfElement::Element(element) => Some(element),
        _ => None,
    })
}
