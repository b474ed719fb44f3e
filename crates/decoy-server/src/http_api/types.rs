//! Response helpers and wire formats for the HTTP API.

use crate::error::{ClientFault, MockError};
use crate::operation::{parse_header_list, MockResponse};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

pub const TEXT_XML: &str = "text/xml";
pub const TEXT_PLAIN: &str = "text/plain";

/// Link structure for directory documents
#[derive(Debug, Serialize, Clone)]
pub struct Link {
    pub href: String,
}

/// Links of one operation
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OperationLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub init: Link,
    pub responses: Link,
    pub recorded_requests: Link,
    pub recorded_request_headers: Link,
    pub recorded_request_params: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_resource_ids: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_resource_paths: Option<Link>,
}

/// Operation entry of `GET /services`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub name: String,
    #[serde(rename = "_links")]
    pub links: OperationLinks,
}

/// Service entry of `GET /services`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub enable_resource_paths: bool,
    pub endpoint: Link,
    pub operations: Vec<OperationSummary>,
}

/// Response for listing services
#[derive(Debug, Serialize)]
pub struct ListServicesResponse {
    pub services: Vec<ServiceSummary>,
}

/// Detailed operation state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDetail {
    pub service: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub name: String,
    pub invocation_count: u32,
    pub number_of_requests: usize,
    pub custom_responses: u32,
    pub default_response_code: u16,
    pub default_response_content_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(rename = "_links")]
    pub links: OperationLinks,
}

/// Setup parameters taken from the query string of `responses` calls
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResponseSetupParams {
    /// 0 when absent
    pub code: u16,
    pub headers: HashMap<String, String>,
    /// `delay=<seconds>`
    pub delay: Option<Duration>,
}

impl ResponseSetupParams {
    pub fn parse(query: Option<&str>) -> Result<Self, ClientFault> {
        let params = parse_query_string(query);
        let code = match params.get("code") {
            Some(code) => code
                .trim()
                .parse()
                .map_err(|_| ClientFault::InvalidStatusCode(code.clone()))?,
            None => 0,
        };
        let headers = match params.get("headers") {
            Some(list) => parse_header_list(list)?,
            None => HashMap::new(),
        };
        let delay = match params.get("delay") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ClientFault::InvalidDelay(secs.clone()))
                .map(Some)?,
            None => None,
        };
        Ok(Self {
            code,
            headers,
            delay,
        })
    }
}

/// Decode `a=1&b=2`. Later duplicates win.
pub fn parse_query_string(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some(query) = query else {
        return params;
    };
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key), decode_component(value));
    }
    params
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(raw)
}

// =============================================================================
// Helper functions for generating links
// =============================================================================

/// Extract base URL from request headers for links
pub fn get_base_url<B>(req: &Request<B>) -> String {
    if let Some(host) = req.headers().get("host") {
        if let Ok(host_str) = host.to_str() {
            return format!("http://{}", host_str);
        }
    }
    "http://localhost:8080".to_string()
}

pub fn make_endpoint_link(base_url: &str, service_type: &str, service: &str) -> Link {
    Link {
        href: format!("{}/services/{}/{}/endpoint", base_url, service_type, service),
    }
}

/// Generate links for an operation. Resource-path links only exist for REST services.
pub fn make_operation_links(
    base_url: &str,
    service_type: &str,
    service: &str,
    operation: &str,
    resource_paths: Option<bool>,
) -> OperationLinks {
    let base = format!(
        "{}/services/{}/{}/operations/{}",
        base_url, service_type, service, operation
    );
    let link = |suffix: &str| Link {
        href: format!("{base}/{suffix}"),
    };
    OperationLinks {
        self_link: Link { href: base.clone() },
        init: link("init"),
        responses: link("responses"),
        recorded_requests: link("recorded-requests"),
        recorded_request_headers: link("recorded-request-headers"),
        recorded_request_params: link("recorded-request-params"),
        recorded_resource_ids: (resource_paths == Some(false)).then(|| link("recorded-resource-ids")),
        recorded_resource_paths: (resource_paths == Some(true))
            .then(|| link("recorded-resource-paths")),
    }
}

// =============================================================================
// Verification document builders
// =============================================================================

/// `<root>\n` + entries + `</root>`; each entry wrapped in `<element>…</element>\n`
/// when an element name is given, optionally as CDATA.
pub fn build_list_xml(values: &[String], root: &str, element: Option<&str>, cdata: bool) -> String {
    let element = element.filter(|e| !e.is_empty());
    let mut xml = format!("<{root}>\n");
    for value in values {
        if let Some(element) = element {
            xml.push_str(&format!("<{element}>"));
        }
        if cdata {
            xml.push_str("<![CDATA[");
        }
        xml.push_str(value);
        if cdata {
            xml.push_str("]]>");
        }
        if let Some(element) = element {
            xml.push_str(&format!("</{element}>\n"));
        }
    }
    xml.push_str(&format!("</{root}>"));
    xml
}

pub fn build_headers_xml(requests: &[BTreeMap<String, String>]) -> String {
    let mut xml = String::from("<recorded-request-headers>");
    for headers in requests {
        xml.push_str("<single-request-recorded-headers>");
        for (name, value) in headers {
            xml.push_str(&format!(
                "<header><name>{}</name><value>{}</value></header>",
                xml_escape(name),
                xml_escape(value)
            ));
        }
        xml.push_str("</single-request-recorded-headers>");
    }
    xml.push_str("</recorded-request-headers>");
    xml
}

/// Escape text placed between tags. Quotes stay as they are.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

pub fn xml_response(body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    build_response_with_headers(StatusCode::OK, [("Content-Type", TEXT_XML)], body)
}

pub fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    build_response_with_headers(status, [("Content-Type", TEXT_PLAIN)], body)
}

/// Build an HTTP response with the given status and body.
///
/// Falls back to a minimal response if the builder rejects its input.
pub fn build_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

/// Build an HTTP response with headers.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

/// Serialize a canned response. Invalid status codes or header values are
/// reported as 500 instead of being sent.
pub fn mock_response_to_http(response: &MockResponse) -> Response<Full<Bytes>> {
    let status = match StatusCode::from_u16(response.status_code) {
        Ok(status) => status,
        Err(_) => {
            return text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid response code {}", response.status_code),
            )
        }
    };
    let mut builder = Response::builder().status(status);
    // A Content-Type among the custom headers replaces the stored one
    let overridden = response
        .headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case("content-type"));
    if let (Some(content_type), false) = (&response.content_type, overridden) {
        builder = builder.header("Content-Type", content_type.as_str());
    }
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Full::new(response.body.to_bytes()))
        .unwrap_or_else(|e| {
            text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid response definition: {e}"),
            )
        })
}

/// SOAP 1.1 client fault envelope
pub fn soap_fault_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>{}</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#,
        xml_escape(message)
    );
    build_response_with_headers(status, [("Content-Type", "text/xml; charset=utf-8")], body)
}

/// Map an error to its HTTP form. Client faults keep the 500 status.
pub fn error_to_response(err: &MockError, soap: bool) -> Response<Full<Bytes>> {
    match err {
        MockError::ClientFault(fault) if soap => {
            soap_fault_response(StatusCode::INTERNAL_SERVER_ERROR, &fault.to_string())
        }
        MockError::ClientFault(fault) => {
            text_response(StatusCode::INTERNAL_SERVER_ERROR, fault.to_string())
        }
        MockError::NotFound(message) => text_response(StatusCode::NOT_FOUND, message.clone()),
        MockError::Internal(_) => text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    text_response(StatusCode::NOT_FOUND, "Not Found")
}
