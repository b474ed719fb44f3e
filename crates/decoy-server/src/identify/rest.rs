//! REST operation keys and resource paths.

/// HTTP methods that can be configured as REST operations.
pub const REST_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// Operation key for a REST call: the HTTP method, upper-cased.
pub fn rest_operation_key(method: &str) -> String {
    method.to_ascii_uppercase()
}

/// Whether `method` names one of the configurable REST operations.
pub fn is_rest_method(method: &str) -> bool {
    REST_METHODS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(method))
}

/// True when a raw (un-decoded) resource path has more than one segment.
///
/// A leading `/` does not count: `id123` and `/id123` are single ids, while
/// `id123/id234` and `id123/` are paths.
pub fn is_multi_segment(raw_path: &str) -> bool {
    raw_path.find('/').is_some_and(|index| index > 0)
}
