//! Route dispatch logic for the HTTP API.

use crate::dispatcher::RequestDispatcher;
use crate::error::MockError;
use crate::http_api::handlers::{directory, endpoint, setup, verification};
use crate::http_api::types::{error_to_response, get_base_url, not_found, text_response};
use crate::operation::Operation;
use crate::registry::{Service, ServiceType};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use tracing::debug;

/// Parsed route below `/services/{type}/{service}`
#[derive(Debug, PartialEq, Eq)]
enum ServiceRoute {
    /// /endpoint[/{resource path}]
    Endpoint { resource_path: Option<String> },
    /// /multipart-endpoint[/{resource path}]
    MultipartEndpoint { resource_path: Option<String> },
    /// /operations/{op}[/...]
    Operation {
        operation: String,
        route: OperationRoute,
    },
}

impl ServiceRoute {
    /// Parse the remainder of the path after `/services/{type}/{service}/`
    fn parse(rest: &str) -> Option<Self> {
        if let Some(resource_path) = endpoint_path(rest, "endpoint") {
            return Some(ServiceRoute::Endpoint { resource_path });
        }
        if let Some(resource_path) = endpoint_path(rest, "multipart-endpoint") {
            return Some(ServiceRoute::MultipartEndpoint { resource_path });
        }
        let rest = rest.strip_prefix("operations/")?;
        let segments: Vec<&str> = rest.split('/').collect();
        let (operation, tail) = segments.split_first()?;
        if operation.is_empty() {
            return None;
        }
        Some(ServiceRoute::Operation {
            operation: decode_segment(operation),
            route: OperationRoute::parse(tail)?,
        })
    }
}

/// `Some(None)` for a bare `name` or `name/`, `Some(Some(path))` for `name/path`
fn endpoint_path(rest: &str, name: &str) -> Option<Option<String>> {
    let tail = rest.strip_prefix(name)?;
    if tail.is_empty() {
        return Some(None);
    }
    let resource_path = tail.strip_prefix('/')?;
    Some(Some(resource_path.to_string()).filter(|p| !p.is_empty()))
}

/// Parsed route for per-operation setup and verification endpoints
#[derive(Debug, PartialEq, Eq)]
enum OperationRoute {
    /// GET /operations/:op
    Detail,
    /// POST /operations/:op/init
    Init,
    /// POST /operations/:op/responses
    Responses,
    /// PUT /operations/:op/responses/:n
    ResponseAt(u32),
    /// GET /operations/:op/recorded-requests
    RecordedRequests,
    /// GET /operations/:op/recorded-request-headers
    RecordedRequestHeaders,
    /// GET /operations/:op/recorded-request-params
    RecordedRequestParams,
    /// GET /operations/:op/recorded-resource-ids
    RecordedResourceIds,
    /// GET /operations/:op/recorded-resource-paths
    RecordedResourcePaths,
}

impl OperationRoute {
    /// Parse route from path segments after `/operations/:op`.
    /// One trailing slash is ignored.
    fn parse(segments: &[&str]) -> Option<Self> {
        let segments = match segments {
            [head @ .., ""] => head,
            _ => segments,
        };
        match segments {
            [] => Some(OperationRoute::Detail),
            ["init"] => Some(OperationRoute::Init),
            ["responses"] => Some(OperationRoute::Responses),
            ["responses", position] => position.parse().ok().map(OperationRoute::ResponseAt),
            ["recorded-requests"] => Some(OperationRoute::RecordedRequests),
            ["recorded-request-headers"] => Some(OperationRoute::RecordedRequestHeaders),
            ["recorded-request-params"] => Some(OperationRoute::RecordedRequestParams),
            ["recorded-resource-ids"] => Some(OperationRoute::RecordedResourceIds),
            ["recorded-resource-paths"] => Some(OperationRoute::RecordedResourcePaths),
            _ => None,
        }
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    dispatcher: RequestDispatcher,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();
    Ok(route(Request::from_parts(parts, body), &dispatcher).await)
}

/// Route a request whose body has been read
pub async fn route(req: Request<Bytes>, dispatcher: &RequestDispatcher) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!("HTTP API: {} {}", method, path);

    match (&method, path.as_str()) {
        (&Method::GET, "/health") => return directory::handle_health(),
        (&Method::GET, "/services") | (&Method::GET, "/services/") => {
            let base_url = get_base_url(&req);
            return directory::handle_list(dispatcher.registry(), &base_url);
        }
        _ => {}
    }

    match path.strip_prefix("/services/") {
        Some(rest) => route_service(&method, rest, req, dispatcher).await,
        None => not_found(),
    }
}

/// Route `/services/{type}/{service}/...`
async fn route_service(
    method: &Method,
    path: &str,
    req: Request<Bytes>,
    dispatcher: &RequestDispatcher,
) -> Response<Full<Bytes>> {
    let mut parts = path.splitn(3, '/');
    let (Some(type_segment), Some(service_segment), Some(rest)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return not_found();
    };

    let Ok(requested_type) = type_segment.parse::<ServiceType>() else {
        return not_found();
    };
    let Some(route) = ServiceRoute::parse(rest) else {
        return not_found();
    };
    let soap = requested_type == ServiceType::Soap;

    let service_name = decode_segment(service_segment);
    let service = match resolve_typed(dispatcher, &service_name, requested_type) {
        Ok(service) => service,
        Err(e) => return error_to_response(&e, soap),
    };

    match route {
        ServiceRoute::Endpoint { resource_path } => match (requested_type, method) {
            // SOAP endpoints have no resource paths
            (ServiceType::Soap, _) if resource_path.is_some() => not_found(),
            (ServiceType::Soap, &Method::POST) => {
                endpoint::handle_soap(service.name(), req, dispatcher).await
            }
            (ServiceType::Soap, _) => text_response(
                StatusCode::METHOD_NOT_ALLOWED,
                "SOAP endpoints only accept POST",
            ),
            (ServiceType::Rest, _) => {
                endpoint::handle_rest(service.name(), resource_path, req, dispatcher).await
            }
        },
        ServiceRoute::MultipartEndpoint { resource_path } => {
            if requested_type != ServiceType::Rest {
                return not_found();
            }
            if *method != Method::POST && *method != Method::PUT {
                return text_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Multipart endpoints only accept POST and PUT",
                );
            }
            if !is_multipart(&req) {
                return text_response(
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "Expected a multipart request",
                );
            }
            endpoint::handle_rest_multipart(service.name(), resource_path, req, dispatcher).await
        }
        ServiceRoute::Operation { operation, route } => {
            let operation = match service.operation(&operation) {
                Ok(operation) => operation,
                Err(e) => return error_to_response(&e, false),
            };
            route_operation(method, route, service, operation, req)
        }
    }
}

fn is_multipart<B>(req: &Request<B>) -> bool {
    req.headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/"))
}

/// Resolve a service and check that the URL names its protocol
fn resolve_typed<'a>(
    dispatcher: &'a RequestDispatcher,
    name: &str,
    requested: ServiceType,
) -> Result<&'a Service, MockError> {
    let service = dispatcher.registry().resolve(name)?;
    if service.service_type() != requested {
        return Err(MockError::NotFound(format!(
            "Service {} is not a {} service",
            name, requested
        )));
    }
    Ok(service)
}

/// Route per-operation setup and verification requests
fn route_operation(
    method: &Method,
    route: OperationRoute,
    service: &Service,
    operation: &Operation,
    req: Request<Bytes>,
) -> Response<Full<Bytes>> {
    let query = req.uri().query().map(|s| s.to_string());

    match (method, route) {
        (&Method::GET, OperationRoute::Detail) => {
            let base_url = get_base_url(&req);
            directory::handle_operation(service, operation, &base_url)
        }

        // Setup
        (&Method::POST, OperationRoute::Init) => setup::handle_init(operation),
        (&Method::POST, OperationRoute::Responses) => setup::handle_add(operation, req),
        (&Method::PUT, OperationRoute::ResponseAt(position)) => {
            setup::handle_set(operation, position, req)
        }

        // Verification
        (&Method::GET, OperationRoute::RecordedRequests) => {
            verification::handle_recorded_requests(operation, query.as_deref())
        }
        (&Method::GET, OperationRoute::RecordedRequestHeaders) => {
            verification::handle_recorded_headers(operation)
        }
        (&Method::GET, OperationRoute::RecordedRequestParams) => {
            verification::handle_recorded_params(operation)
        }
        (&Method::GET, OperationRoute::RecordedResourceIds) => {
            verification::handle_recorded_resource_ids(service, operation)
        }
        (&Method::GET, OperationRoute::RecordedResourcePaths) => {
            verification::handle_recorded_resource_paths(service, operation)
        }

        _ => not_found(),
    }
}
