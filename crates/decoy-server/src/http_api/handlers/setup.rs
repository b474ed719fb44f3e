//! Operation setup handlers: reset and custom responses.

use crate::error::MockError;
use crate::http_api::types::{build_response, error_to_response, text_response, ResponseSetupParams};
use crate::operation::{MockResponse, Operation, ResponseBody};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use tracing::info;

/// POST /services/:type/:service/operations/:op/init
pub fn handle_init(operation: &Operation) -> Response<Full<Bytes>> {
    operation.init();
    info!(operation = operation.name(), "Operation reset");
    build_response(StatusCode::OK, Bytes::new())
}

/// POST /services/:type/:service/operations/:op/responses
///
/// Responds with the position the response was stored at.
pub fn handle_add(operation: &Operation, req: Request<Bytes>) -> Response<Full<Bytes>> {
    match response_from_request(operation, req) {
        Ok(response) => {
            let position = operation.add_custom_response(response);
            text_response(StatusCode::OK, position.to_string())
        }
        Err(e) => error_to_response(&e, false),
    }
}

/// PUT /services/:type/:service/operations/:op/responses/:n
pub fn handle_set(
    operation: &Operation,
    position: u32,
    req: Request<Bytes>,
) -> Response<Full<Bytes>> {
    let result = response_from_request(operation, req)
        .and_then(|response| operation.set_custom_response(response, position));
    match result {
        Ok(()) => build_response(StatusCode::OK, Bytes::new()),
        Err(e) => error_to_response(&e, false),
    }
}

/// Body, `Content-Type`, `code`, `headers` and `delay` of a setup call.
/// Without a `Content-Type` the operation's default content type is used.
fn response_from_request(
    operation: &Operation,
    req: Request<Bytes>,
) -> Result<MockResponse, MockError> {
    let params = ResponseSetupParams::parse(req.uri().query())?;
    let content_type = req
        .headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| operation.defaults().content_type);

    let body = req.into_body();
    let body = if body.is_empty() {
        ResponseBody::Empty
    } else {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => ResponseBody::Text(text),
            Err(_) => ResponseBody::Binary(body),
        }
    };

    Ok(MockResponse {
        body,
        status_code: params.code,
        content_type: Some(content_type),
        headers: params.headers,
        delay: params.delay,
    })
}
