//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and a projection of the expected decoded result. Comparing projections as
//! JSON keeps the vectors readable while still checking resolved references.

use gram_core::{ClientConfig, FeedKind, FeedQuery, GramClient, HttpMethod, HttpResponse};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> GramClient {
    GramClient::new(ClientConfig::new(BASE_URL)).unwrap()
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[test]
fn feed_test_vectors() {
    let raw = include_str!("../../test-vectors/feed.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let kind = FeedKind::try_from(input["kind"].as_i64().unwrap() as i32).unwrap();
        let mut query = FeedQuery::new(kind, input["query"].as_str().unwrap());
        if let Some(max_id) = input["max_id"].as_str() {
            query = query.with_max_id(max_id);
        }
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_feed(&query);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let feed = c.parse_feed(&query, simulated(case)).unwrap();
        let items = feed.message().items();
        let projection = json!({
            "item_ids": items.iter().map(|i| i.id()).collect::<Vec<_>>(),
            "usernames": items.iter().map(|i| i.user().map(|u| u.username())).collect::<Vec<_>>(),
            "captions": items.iter().map(|i| i.caption().map(|c| c.text())).collect::<Vec<_>>(),
            "next_max_id": feed.envelope().next_max_id(),
        });
        assert_eq!(projection, case["expected_result"], "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Inbox
// ---------------------------------------------------------------------------

#[test]
fn inbox_test_vectors() {
    let raw = include_str!("../../test-vectors/inbox.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let cursor = case["input_cursor"].as_str();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_inbox(cursor);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        // Verify parse
        let envelope = c.parse_inbox(simulated(case)).unwrap();
        let inbox = envelope.payload().inbox().unwrap();
        let threads: Vec<Value> = inbox
            .threads()
            .iter()
            .map(|t| {
                json!({
                    "thread_id": t.thread_id(),
                    "senders": t.items().iter().map(|i| i.user().map(|u| u.username())).collect::<Vec<_>>(),
                    "texts": t.items().iter().map(|i| i.text()).collect::<Vec<_>>(),
                })
            })
            .collect();
        let projection = json!({
            "threads": threads,
            "oldest_cursor": inbox.oldest_cursor(),
        });
        assert_eq!(projection, case["expected_result"], "{name}: parsed result");
    }
}
