//! Fixture server mimicking the private API's feed and inbox endpoints.
//!
//! Payloads are canned but shaped like the real service: numeric ids sent as
//! strings in some places, users repeated across items, `null` fields, and
//! keys the client does not model.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Hashtag the server pretends does not exist.
pub const MISSING_TAG: &str = "missing";

/// `max_id` returned on the first page of every feed.
pub const NEXT_MAX_ID: &str = "QVFB_page2";

pub fn app() -> Router {
    Router::new()
        .route("/feed/tag/{tag}/", get(hashtag_feed))
        .route("/feed/user/{user_id}/", get(user_feed))
        .route("/feed/timeline/", post(timeline))
        .route("/direct_v2/inbox/", get(inbox))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Deserialize)]
struct PageParams {
    max_id: Option<String>,
}

#[derive(Deserialize)]
struct TimelineForm {
    #[serde(rename = "_uuid")]
    uuid: String,
    phone_id: String,
    reason: String,
    max_id: Option<String>,
}

async fn hashtag_feed(
    Path(tag): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Value>, StatusCode> {
    if tag == MISSING_TAG {
        return Err(StatusCode::NOT_FOUND);
    }
    let items = vec![
        media_item(1, 101, &format!("#{tag} at dawn")),
        media_item(2, 102, &format!("more #{tag}")),
        media_item(3, 101, &format!("#{tag} again")),
    ];
    Ok(Json(feed_page(items, page.max_id.is_none())))
}

async fn user_feed(
    Path(user_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Value>, StatusCode> {
    let pk: i64 = user_id.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
    let items = vec![media_item(10, pk, "first post"), media_item(11, pk, "second post")];
    Ok(Json(feed_page(items, page.max_id.is_none())))
}

async fn timeline(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let form = match parse_timeline_form(form) {
        Some(form) => form,
        None => {
            return (
                StatusCode::OK,
                Json(json!({"status": "fail", "message": "missing or invalid device ids"})),
            )
        }
    };
    let first_page = form.max_id.is_none();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "num_results": 3,
            "more_available": first_page,
            "next_max_id": if first_page { Value::from(NEXT_MAX_ID) } else { Value::Null },
            "is_direct_v2_enabled": true,
            "request_reason": form.reason,
            "feed_items": [
                {"media_or_ad": media_item(20, 101, "from a friend")},
                {"media_or_ad": with_injected(media_item(21, 900, "buy this"))},
                {"suggested_users": {"users": []}},
                {"media_or_ad": media_item(22, 102, "another friend")},
            ],
        })),
    )
}

async fn inbox(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let older = params.contains_key("cursor");
    Json(json!({
        "status": "ok",
        "seq_id": 77,
        "pending_requests_total": "2",
        "viewer": user(1, "viewer"),
        "inbox": {
            "unseen_count": 1,
            "has_older": !older,
            "oldest_cursor": if older { Value::Null } else { Value::from("cursor-1") },
            "threads": [
                {
                    "thread_id": "340282366841710300949128",
                    "thread_title": "friends",
                    "is_group": true,
                    "viewer_id": 1,
                    "users": [user(101, "ana"), user(102, "bo")],
                    "items": [
                        {"item_id": "m1", "user_id": 101, "timestamp": 1_600_000_000_000_000_i64, "item_type": "text", "text": "hey"},
                        {"item_id": "m2", "user_id": "102", "timestamp": "1600000000500000", "item_type": "media",
                         "media": {"id": "55_102", "media_type": 1, "image_versions2": {"candidates": [
                             {"url": "https://cdn.example/55_s.jpg", "width": 150, "height": 150},
                             {"url": "https://cdn.example/55_l.jpg", "width": 1080, "height": 1080}
                         ]}}},
                        {"item_id": "m3", "user_id": 1, "timestamp": 1_600_000_001_000_000_i64, "like": "\u{2764}\u{fe0f}"}
                    ]
                },
                {
                    "thread_id": "340282366841710300949129",
                    "thread_title": null,
                    "users": [user(101, "ana")],
                    "items": [
                        {"item_id": "m4", "user_id": 101, "text": "just us", "item_type": "text"}
                    ]
                }
            ]
        }
    }))
}

fn parse_timeline_form(form: HashMap<String, String>) -> Option<TimelineForm> {
    let value = serde_json::to_value(form).ok()?;
    let form: TimelineForm = serde_json::from_value(value).ok()?;
    Uuid::parse_str(&form.uuid).ok()?;
    Uuid::parse_str(&form.phone_id).ok()?;
    Some(form)
}

fn feed_page(items: Vec<Value>, first_page: bool) -> Value {
    json!({
        "status": "ok",
        "num_results": items.len(),
        "more_available": first_page,
        "next_max_id": if first_page { Value::from(NEXT_MAX_ID) } else { Value::Null },
        "auto_load_more_enabled": true,
        "items": items,
    })
}

fn user(pk: i64, username: &str) -> Value {
    json!({
        "pk": pk,
        "username": username,
        "full_name": format!("{username} example"),
        "is_private": false,
        "is_verified": null,
        "profile_pic_url": format!("https://cdn.example/{pk}.jpg"),
        "friendship_status": {"following": true},
    })
}

fn media_item(pk: i64, owner: i64, caption: &str) -> Value {
    json!({
        "id": format!("{pk}_{owner}"),
        "pk": pk,
        "code": format!("C{pk}"),
        "media_type": 1,
        "taken_at": 1_600_000_000 + pk,
        "like_count": pk * 10,
        "comment_count": "3",
        "user": user(owner, &format!("user{owner}")),
        "caption": {"pk": format!("c{pk}"), "text": caption, "user_id": owner, "created_at": 1_600_000_000 + pk},
        "image_versions2": {"candidates": [
            {"url": format!("https://cdn.example/{pk}.jpg"), "width": 1080, "height": 1350}
        ]},
    })
}

fn with_injected(mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        map.insert("injected".to_string(), json!({"label": "Sponsored"}));
    }
    item
}
