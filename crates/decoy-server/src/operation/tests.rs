//! Tests for the operation module.
//!
//! This module covers:
//! - Custom response placement, overwrite and append
//! - Default response synthesis (status, headers, binary download name)
//! - Invocation numbering, sequential and concurrent
//! - `init` semantics
//! - Namespace precondition

use super::*;
use crate::error::{ClientFault, MockError};
use crate::identify::{NamespaceRules, SoapMessage};
use bytes::Bytes;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

fn operation_with_default(body: &str, status_code: u16) -> Operation {
    Operation::new(
        "sayHello",
        DefaultResponse {
            body: ResponseBody::from(body),
            status_code,
            ..Default::default()
        },
    )
}

fn soap_message(namespace: Option<&str>) -> SoapMessage {
    SoapMessage {
        operation: "objExecute".to_string(),
        namespace: namespace.map(str::to_string),
    }
}

#[test]
fn test_custom_first_response() {
    let operation = Operation::new("op", DefaultResponse::default());
    operation
        .set_custom_response(
            MockResponse::text("adsadsa").with_content_type("text/xml"),
            1,
        )
        .unwrap();

    let response = operation.next_response(1, None).unwrap();
    assert_eq!(response.body, ResponseBody::from("adsadsa"));
    assert_eq!(response.content_type.as_deref(), Some("text/xml"));
}

#[test]
fn test_set_custom_response_twice_overwrites() {
    let operation = operation_with_default("defaultResp", 200);
    operation
        .set_custom_response(MockResponse::text("sadfsdsdf"), 1)
        .unwrap();
    let second = MockResponse::text("sadfsdsdf2").with_status(201);
    operation.set_custom_response(second.clone(), 1).unwrap();

    assert_eq!(operation.next_response(1, None).unwrap(), second);
}

#[test]
fn test_default_when_second_slot_not_set() {
    let operation = operation_with_default("defaultResp", 201);
    operation
        .set_custom_response(MockResponse::text("sadfsdsdf"), 1)
        .unwrap();

    let response = operation.next_response(2, None).unwrap();
    assert_eq!(response.body, ResponseBody::from("defaultResp"));
    assert_eq!(response.status_code, 201);
}

#[test]
fn test_overwrite_does_not_append() {
    let operation = operation_with_default("defaultResp", 200);
    operation
        .set_custom_response(MockResponse::text("sadfsdsdf"), 1)
        .unwrap();
    operation
        .set_custom_response(MockResponse::text("sadfsdsdf"), 1)
        .unwrap();

    let response = operation.next_response(2, None).unwrap();
    assert_eq!(response.body, ResponseBody::from("defaultResp"));
    assert_eq!(response.status_code, 200);
    assert_eq!(operation.custom_response_count(), 1);
}

#[test]
fn test_zero_code_uses_default_code() {
    let operation = operation_with_default("defaultResp", 200);
    operation
        .set_custom_response(MockResponse::text("dummy").with_status(0), 1)
        .unwrap();
    assert_eq!(operation.next_response(1, None).unwrap().status_code, 200);
}

#[test]
fn test_zero_code_resolved_at_set_time() {
    let operation = operation_with_default("defaultResp", 201);
    operation
        .set_custom_response(MockResponse::text("custom"), 1)
        .unwrap();
    operation.set_default_status_code(404);

    assert_eq!(operation.next_response(1, None).unwrap().status_code, 201);
    // Slots without a custom response follow the new default
    assert_eq!(operation.next_response(2, None).unwrap().status_code, 404);
}

#[test]
fn test_custom_second_response() {
    let operation = Operation::new("op", DefaultResponse::default());
    let custom = MockResponse::text("adsadsa").with_status(201);
    operation.set_custom_response(custom.clone(), 2).unwrap();
    assert_eq!(operation.next_response(2, None).unwrap(), custom);
}

#[test]
fn test_sparse_growth_leaves_holes() {
    let operation = operation_with_default("defaultResp", 200);
    operation
        .set_custom_response(MockResponse::text("first"), 1)
        .unwrap();
    operation
        .set_custom_response(MockResponse::text("fifth"), 5)
        .unwrap();

    for hole in 2..=4 {
        assert_eq!(
            operation.next_response(hole, None).unwrap().body,
            ResponseBody::from("defaultResp")
        );
    }
    assert_eq!(
        operation.next_response(5, None).unwrap().body,
        ResponseBody::from("fifth")
    );
    assert_eq!(operation.custom_response_count(), 5);
}

#[test]
fn test_add_series_of_responses() {
    let operation = Operation::new("op", DefaultResponse::default());
    let r1 = MockResponse::text("abc1").with_status(201);
    let r2 = MockResponse::text("def45").with_status(200);
    let r3 = MockResponse::text("sadf1").with_status(403);

    assert_eq!(operation.add_custom_response(r1.clone()), 1);
    assert_eq!(operation.add_custom_response(r2.clone()), 2);
    assert_eq!(operation.add_custom_response(r3.clone()), 3);

    assert_eq!(operation.next_response(1, None).unwrap(), r1);
    assert_eq!(operation.next_response(2, None).unwrap(), r2);
    assert_eq!(operation.next_response(3, None).unwrap(), r3);
}

#[test]
fn test_add_appends_after_highest_position() {
    let operation = Operation::new("op", DefaultResponse::default());
    operation
        .set_custom_response(MockResponse::text("third"), 3)
        .unwrap();
    assert_eq!(operation.add_custom_response(MockResponse::text("fourth")), 4);
}

#[test]
fn test_set_consecutive_responses_out_of_order() {
    let operation = Operation::new("op", DefaultResponse::default());
    let r1 = MockResponse::text("sadfsadfsa1").with_status(201);
    let r2 = MockResponse::text("sadfsadfsa2").with_status(200);
    operation.set_custom_response(r2.clone(), 2).unwrap();
    operation.set_custom_response(r1.clone(), 1).unwrap();

    assert_eq!(operation.next_response(1, None).unwrap(), r1);
    assert_eq!(operation.next_response(2, None).unwrap(), r2);
}

#[test]
fn test_default_on_first_call_custom_on_second() {
    let operation = operation_with_default("defaultResp", 200);
    operation
        .set_custom_response(MockResponse::text("sadfsadfsa2"), 2)
        .unwrap();

    assert_eq!(
        operation.next_response(1, None).unwrap().body,
        ResponseBody::from("defaultResp")
    );
    assert_eq!(
        operation.next_response(2, None).unwrap().body,
        ResponseBody::from("sadfsadfsa2")
    );
}

#[test]
fn test_position_zero_rejected() {
    let operation = Operation::new("op", DefaultResponse::default());
    let err = operation
        .set_custom_response(MockResponse::text("x"), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        MockError::ClientFault(ClientFault::InvalidPosition(0))
    ));
}

#[test]
fn test_init_clears_custom_responses() {
    let operation = operation_with_default("defaultResp", 200);
    operation
        .set_custom_response(MockResponse::text("customResp123"), 1)
        .unwrap();
    operation
        .set_custom_response(MockResponse::text("customResp567"), 2)
        .unwrap();
    assert_eq!(
        operation.next_response(1, None).unwrap().body,
        ResponseBody::from("customResp123")
    );

    operation.init();

    assert_eq!(
        operation.next_response(1, None).unwrap().body,
        ResponseBody::from("defaultResp")
    );
    assert_eq!(
        operation.next_response(2, None).unwrap().body,
        ResponseBody::from("defaultResp")
    );
}

#[test]
fn test_init_keeps_defaults_and_namespaces() {
    let operation =
        operation_with_default("defaultResp", 202).with_namespaces(NamespaceRules::parse("urn:b"));
    operation.init();
    operation.init();

    assert_eq!(operation.default_status_code(), 202);
    assert_eq!(operation.namespaces().allowed(), ["urn:b"]);
}

#[test]
fn test_invocation_numbers() {
    let operation = Operation::new("op", DefaultResponse::default());
    assert_eq!(operation.next_invocation_number(), 1);
    assert_eq!(operation.next_invocation_number(), 2);
    assert_eq!(operation.next_invocation_number(), 3);
    assert_eq!(operation.next_invocation_number(), 4);
}

#[test]
fn test_init_resets_invocation_count() {
    let operation = Operation::new("op", DefaultResponse::default());
    for expected in 1..=3 {
        assert_eq!(operation.next_invocation_number(), expected);
    }
    operation.init();
    for expected in 1..=3 {
        assert_eq!(operation.next_invocation_number(), expected);
    }
}

#[test]
fn test_init_clears_ledger() {
    let operation = Operation::new("op", DefaultResponse::default());
    operation.record_invocation(RecordedRequest::new("one"));
    operation.record_invocation(RecordedRequest::new("two"));
    assert_eq!(operation.recorder().len(), 2);

    operation.init();

    assert!(operation.recorder().is_empty());
    assert_eq!(operation.invocation_count(), 0);
    assert_eq!(operation.record_invocation(RecordedRequest::new("three")), 1);
}

#[test]
fn test_concurrent_invocation_numbers_are_unique_and_gap_free() {
    let operation = Arc::new(Operation::new("op", DefaultResponse::default()));
    let threads = 8;
    let per_thread = 250;

    let numbers: Vec<u32> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let operation = Arc::clone(&operation);
                scope.spawn(move || {
                    (0..per_thread)
                        .map(|_| operation.next_invocation_number())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let unique: BTreeSet<u32> = numbers.iter().copied().collect();
    let total = (threads * per_thread) as u32;
    assert_eq!(numbers.len(), total as usize);
    assert_eq!(unique, (1..=total).collect::<BTreeSet<_>>());
}

#[test]
fn test_concurrent_recording_matches_ledger_order() {
    let operation = Arc::new(Operation::new("op", DefaultResponse::default()));

    std::thread::scope(|scope| {
        for t in 0..4 {
            let operation = Arc::clone(&operation);
            scope.spawn(move || {
                for i in 0..100 {
                    operation.record_invocation(RecordedRequest::new(format!("{t}-{i}")));
                }
            });
        }
    });

    let invocations: Vec<u32> = operation
        .recorder()
        .requests()
        .iter()
        .map(|r| r.invocation)
        .collect();
    assert_eq!(invocations, (1..=400).collect::<Vec<_>>());
}

#[test]
fn test_default_response_headers() {
    let mut headers = HashMap::new();
    headers.insert("Header1".to_string(), "Value1".to_string());
    headers.insert("Header-2".to_string(), "header_value_2".to_string());
    let operation = Operation::new(
        "GET",
        DefaultResponse {
            body: ResponseBody::from("<get_response_data/>"),
            content_type: "application/vnd.specific+xml".to_string(),
            headers,
            ..Default::default()
        },
    );

    let response = operation.next_response(1, None).unwrap();
    assert_eq!(response.headers.get("Header1").unwrap(), "Value1");
    assert_eq!(response.headers.get("Header-2").unwrap(), "header_value_2");
    assert_eq!(
        response.content_type.as_deref(),
        Some("application/vnd.specific+xml")
    );
    assert!(!response.headers.contains_key("Content-Disposition"));
}

#[test]
fn test_binary_default_gets_content_disposition() {
    let operation = Operation::new(
        "GET",
        DefaultResponse {
            body: ResponseBody::Binary(Bytes::from_static(b"GIF89a")),
            content_type: "image/gif".to_string(),
            file_name: Some("default_rest_get_binary_response.gif".to_string()),
            ..Default::default()
        },
    );

    let response = operation.next_response(1, None).unwrap();
    assert!(response.is_binary());
    assert_eq!(
        response.headers.get("Content-Disposition").unwrap(),
        "attachment; filename=default_rest_get_binary_response.gif"
    );
}

#[test]
fn test_missing_namespace_rejected() {
    let operation = Operation::new("objExecute", DefaultResponse::default())
        .with_namespaces(NamespaceRules::parse("http://non-valid.org/namespace"));
    let err = operation
        .next_response(1, Some(&soap_message(None)))
        .unwrap_err();
    assert_eq!(err.to_string(), "Message doesn't contain namespace");
}

#[test]
fn test_namespace_mismatch_rejected() {
    let operation = Operation::new("objExecute", DefaultResponse::default())
        .with_namespaces(NamespaceRules::parse("urn:b"));
    let err = operation
        .next_response(1, Some(&soap_message(Some("urn:a"))))
        .unwrap_err();
    assert!(err.is_client_fault());
    assert!(err.to_string().contains("namespace of message doesn't match"));
}

#[test]
fn test_namespace_rejection_precedes_custom_response() {
    let operation = Operation::new("objExecute", DefaultResponse::default())
        .with_namespaces(NamespaceRules::parse("urn:b"));
    operation
        .set_custom_response(MockResponse::text("custom"), 1)
        .unwrap();
    assert!(operation
        .next_response(1, Some(&soap_message(Some("urn:a"))))
        .is_err());
}

#[test]
fn test_no_allow_list_accepts_any_namespace() {
    let operation = operation_with_default("ok", 200);
    let response = operation
        .next_response(1, Some(&soap_message(Some("urn:a"))))
        .unwrap();
    assert_eq!(response.body, ResponseBody::from("ok"));
}

#[test]
fn test_matching_namespace_passes() {
    let operation = operation_with_default("This is the default response :)", 200)
        .with_namespaces(NamespaceRules::parse(
            "http://mystes.com/ns/library,http://mystes.com/ns/person",
        ));
    let response = operation
        .next_response(1, Some(&soap_message(Some("http://mystes.com/ns/library"))))
        .unwrap();
    assert_eq!(response.status_code, 200);
}

proptest! {
    #[test]
    fn prop_set_then_invoke_returns_response(
        position in 1u32..64,
        others in proptest::collection::vec(1u32..64, 0..8),
        code in 100u16..600,
    ) {
        let operation = operation_with_default("defaultResp", 200);
        for other in others.iter().filter(|p| **p != position) {
            operation
                .set_custom_response(MockResponse::text(format!("other-{other}")), *other)
                .unwrap();
        }
        let expected = MockResponse::text("target").with_status(code);
        operation.set_custom_response(expected.clone(), position).unwrap();

        for _ in 1..position {
            operation.next_invocation_number();
        }
        let n = operation.next_invocation_number();
        prop_assert_eq!(n, position);
        prop_assert_eq!(operation.next_response(n, None).unwrap(), expected);
    }
}

#[test]
fn test_set_default_body_affects_unset_slots_only() {
    let operation = operation_with_default("old", 200);
    operation
        .set_custom_response(MockResponse::text("custom"), 1)
        .unwrap();
    operation.set_default_body(ResponseBody::from("new"));

    assert_eq!(
        operation.next_response(1, None).unwrap().body,
        ResponseBody::from("custom")
    );
    assert_eq!(
        operation.next_response(2, None).unwrap().body,
        ResponseBody::from("new")
    );
}
