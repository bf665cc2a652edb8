use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, MISSING_TAG, NEXT_MAX_ID};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

// --- hashtag feed ---

#[tokio::test]
async fn hashtag_feed_first_page_has_cursor() {
    let resp = app().oneshot(get_request("/feed/tag/cats/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["more_available"], true);
    assert_eq!(body["next_max_id"], NEXT_MAX_ID);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["items"][0]["caption"]["text"], "#cats at dawn");
}

#[tokio::test]
async fn hashtag_feed_second_page_ends() {
    let uri = format!("/feed/tag/cats/?max_id={NEXT_MAX_ID}");
    let resp = app().oneshot(get_request(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["more_available"], false);
    assert!(body["next_max_id"].is_null());
}

#[tokio::test]
async fn missing_hashtag_returns_404() {
    let uri = format!("/feed/tag/{MISSING_TAG}/");
    let resp = app().oneshot(get_request(&uri)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- user feed ---

#[tokio::test]
async fn user_feed_items_belong_to_user() {
    let resp = app().oneshot(get_request("/feed/user/42/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    for item in body["items"].as_array().unwrap() {
        assert_eq!(item["user"]["pk"], 42);
    }
}

#[tokio::test]
async fn user_feed_non_numeric_id_returns_400() {
    let resp = app().oneshot(get_request("/feed/user/abc/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- timeline ---

#[tokio::test]
async fn timeline_with_device_ids_returns_feed_items() {
    let body = "_uuid=00000000-0000-0000-0000-000000000001\
                &phone_id=00000000-0000-0000-0000-000000000002\
                &reason=cold_start_fetch&is_pull_to_refresh=0";
    let resp = app()
        .oneshot(form_request("/feed/timeline/", body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["request_reason"], "cold_start_fetch");
    assert_eq!(body["feed_items"].as_array().unwrap().len(), 4);
    assert!(body["feed_items"][1]["media_or_ad"]["injected"].is_object());
}

#[tokio::test]
async fn timeline_without_device_ids_fails() {
    let resp = app()
        .oneshot(form_request("/feed/timeline/", "reason=cold_start_fetch"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn timeline_rejects_get() {
    let resp = app().oneshot(get_request("/feed/timeline/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- inbox ---

#[tokio::test]
async fn inbox_threads_share_users() {
    let resp = app().oneshot(get_request("/direct_v2/inbox/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let threads = body["inbox"]["threads"].as_array().unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0]["users"][0]["pk"], threads[1]["users"][0]["pk"]);
    assert_eq!(body["inbox"]["oldest_cursor"], "cursor-1");
}

#[tokio::test]
async fn inbox_with_cursor_has_no_older() {
    let resp = app()
        .oneshot(get_request("/direct_v2/inbox/?cursor=cursor-1"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["inbox"]["has_older"], false);
    assert!(body["inbox"]["oldest_cursor"].is_null());
}
