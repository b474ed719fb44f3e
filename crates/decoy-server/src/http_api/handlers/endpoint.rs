//! Mock endpoint handlers: the calls made by the system under test.

use crate::dispatcher::{InboundRequest, RequestDispatcher};
use crate::error::{ClientFault, MockError};
use crate::http_api::types::{error_to_response, mock_response_to_http};
use crate::operation::MockResponse;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response};
use std::collections::BTreeMap;
use tracing::debug;

/// Part types accepted as the body of a multipart call
const TEXT_PART_TYPES: [&str; 4] = ["text/plain", "application/json", "application/xml", "text/xml"];

/// POST /services/SOAP/:service/endpoint
pub async fn handle_soap(
    service: &str,
    req: Request<Bytes>,
    dispatcher: &RequestDispatcher,
) -> Response<Full<Bytes>> {
    let inbound = inbound_request(req, None);
    respond(dispatcher.dispatch(service, inbound), true).await
}

/// GET/POST/PUT/DELETE /services/REST/:service/endpoint[/:resource_path]
pub async fn handle_rest(
    service: &str,
    resource_path: Option<String>,
    req: Request<Bytes>,
    dispatcher: &RequestDispatcher,
) -> Response<Full<Bytes>> {
    let inbound = inbound_request(req, resource_path);
    respond(dispatcher.dispatch(service, inbound), false).await
}

/// POST/PUT /services/REST/:service/multipart-endpoint[/:resource_path]
///
/// The first text part becomes the request body. The query string is only
/// kept for POST.
pub async fn handle_rest_multipart(
    service: &str,
    resource_path: Option<String>,
    req: Request<Bytes>,
    dispatcher: &RequestDispatcher,
) -> Response<Full<Bytes>> {
    let content_type = req
        .headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let (parts, body) = req.into_parts();
    let text = match first_text_part(content_type.as_deref(), body).await {
        Ok(text) => text,
        Err(fault) => return error_to_response(&MockError::from(fault), false),
    };

    let mut inbound = inbound_request(Request::from_parts(parts, Bytes::from(text)), resource_path);
    if inbound.method != Method::POST.as_str() {
        inbound.query = None;
    }
    respond(dispatcher.dispatch(service, inbound), false).await
}

/// Write out a dispatch result, holding a delayed response back first
async fn respond(result: Result<MockResponse, MockError>, soap: bool) -> Response<Full<Bytes>> {
    match result {
        Ok(response) => {
            if let Some(delay) = response.delay {
                debug!("Delaying response by {:?}", delay);
                tokio::time::sleep(delay).await;
            }
            mock_response_to_http(&response)
        }
        Err(e) => error_to_response(&e, soap),
    }
}

/// Body of the first part typed as text, JSON or XML. Untyped parts count
/// as text.
async fn first_text_part(content_type: Option<&str>, body: Bytes) -> Result<String, ClientFault> {
    let content_type = content_type
        .ok_or_else(|| ClientFault::MalformedMultipart("missing Content-Type".to_string()))?;
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ClientFault::MalformedMultipart(e.to_string()))?;
    let stream = futures::stream::once(async move { Ok::<Bytes, std::convert::Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ClientFault::MalformedMultipart(e.to_string()))?
    {
        let is_text = field
            .content_type()
            .map_or(true, |mime| TEXT_PART_TYPES.contains(&mime.essence_str()));
        if is_text {
            return field
                .text()
                .await
                .map_err(|e| ClientFault::MalformedMultipart(e.to_string()));
        }
    }
    Err(ClientFault::MissingTextPart)
}

/// Capture what the recorder keeps. Repeated headers are joined with commas.
fn inbound_request(req: Request<Bytes>, resource_path: Option<String>) -> InboundRequest {
    let (parts, body) = req.into_parts();

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &parts.headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    InboundRequest {
        method: parts.method.as_str().to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
        headers,
        query: parts.uri.query().map(str::to_string),
        resource_path,
    }
}
