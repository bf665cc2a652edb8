//! Direct-message inbox payloads.
//!
//! `Thread` declares `users` before `items` so every `ThreadItem` can resolve
//! its sender from the users already decoded in the same thread.

use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use serde_json::{Map, Value};

use crate::decode::{Decodable, DescriptorBuilder, Requirement, Resolutions, Resolved};
use crate::dto::media::ImageVersions;
use crate::dto::user::User;

/// Kind of a direct-message item, parsed from `item_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Text,
    Media,
    MediaShare,
    Like,
    Link,
    ReelShare,
    ActionLog,
    Placeholder,
    Unknown,
}

impl ItemType {
    const KNOWN: [ItemType; 8] = [
        ItemType::Text,
        ItemType::Media,
        ItemType::MediaShare,
        ItemType::Like,
        ItemType::Link,
        ItemType::ReelShare,
        ItemType::ActionLog,
        ItemType::Placeholder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Text => "text",
            ItemType::Media => "media",
            ItemType::MediaShare => "media_share",
            ItemType::Like => "like",
            ItemType::Link => "link",
            ItemType::ReelShare => "reel_share",
            ItemType::ActionLog => "action_log",
            ItemType::Placeholder => "placeholder",
            ItemType::Unknown => "",
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|t| t.as_str() == raw)
            .unwrap_or(ItemType::Unknown)
    }

    /// Infer the type from which payload key is present, for items that
    /// arrive without `item_type`.
    fn infer(raw: &Map<String, Value>) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|t| raw.contains_key(t.as_str()))
            .unwrap_or(ItemType::Unknown)
    }
}

/// Media attached to a direct-message item.
#[derive(Debug, Default)]
pub struct ThreadMediaItem {
    id: String,
    media_type: i64,
    original_width: i64,
    original_height: i64,
    image_versions: Option<Arc<ImageVersions>>,
}

impl ThreadMediaItem {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn media_type(&self) -> i64 {
        self.media_type
    }

    pub fn dimensions(&self) -> (i64, i64) {
        (self.original_width, self.original_height)
    }

    pub fn image_versions(&self) -> Option<&ImageVersions> {
        self.image_versions.as_deref()
    }
}

impl Decodable for ThreadMediaItem {
    const TAG: &'static str = "thread_media_item";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .string("id", |m, v| m.id = v)
            .int("media_type", |m, v| m.media_type = v)
            .int("original_width", |m, v| m.original_width = v)
            .optional()
            .int("original_height", |m, v| m.original_height = v)
            .optional()
            .object::<ImageVersions>("image_versions2", |m, v| m.image_versions = Some(v))
            .optional()
    }
}

/// One message in a thread.
#[derive(Debug, Default)]
pub struct ThreadItem {
    item_id: String,
    user_id: i64,
    user: Option<Arc<User>>,
    timestamp: f64,
    item_type: String,
    media: Option<Arc<ThreadMediaItem>>,
    text: String,
    client_context: String,
    parent: Weak<Thread>,
}

impl ThreadItem {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Sender, when the thread payload included them.
    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<Arc<User>>) {
        self.user = user;
    }

    /// Raw timestamp in microseconds since the epoch.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn sent_at(&self) -> Option<SystemTime> {
        if self.timestamp <= 0.0 {
            return None;
        }
        SystemTime::UNIX_EPOCH.checked_add(Duration::from_micros(self.timestamp as u64))
    }

    pub fn item_type(&self) -> ItemType {
        ItemType::parse(&self.item_type)
    }

    pub fn item_type_raw(&self) -> &str {
        &self.item_type
    }

    pub fn is_item_type(&self, kind: ItemType) -> bool {
        self.item_type() == kind
    }

    pub fn media(&self) -> Option<&ThreadMediaItem> {
        self.media.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn client_context(&self) -> &str {
        &self.client_context
    }

    /// The thread containing this item, while that thread is alive.
    pub fn parent(&self) -> Option<Arc<Thread>> {
        self.parent.upgrade()
    }
}

impl Decodable for ThreadItem {
    const TAG: &'static str = "thread_item";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .string("item_id", |i, v| i.item_id = v)
            .int("user_id", |i, v| i.user_id = v)
            .float("timestamp", |i, v| i.timestamp = v)
            .string("item_type", |i, v| i.item_type = v)
            .object::<ThreadMediaItem>("media", |i, v| i.media = Some(v))
            .optional()
            .string("text", |i, v| i.text = v)
            .optional()
            .string("client_context", |i, v| i.client_context = v)
            .optional()
            .identifier("item_id")
            .requires(Requirement::lookup("user", "user_id", User::TAG))
            .requires(Requirement::ancestor("parent", Thread::TAG))
    }

    fn on_requirement(&mut self, slot: &str, value: Option<&Resolved>) {
        match slot {
            "user" => self.set_user(value.and_then(|r| r.upgrade::<User>())),
            "parent" => {
                if let Some(parent) = value.and_then(|r| r.downgrade::<Thread>()) {
                    self.parent = parent;
                }
            }
            _ => {}
        }
    }

    fn on_decode(&mut self, raw: &Map<String, Value>, _requirements: &Resolutions) {
        if self.item_type.is_empty() {
            self.item_type = ItemType::infer(raw).as_str().to_string();
        }
    }
}

#[derive(Debug, Default)]
pub struct Thread {
    thread_id: String,
    thread_title: String,
    users: Vec<Arc<User>>,
    items: Vec<Arc<ThreadItem>>,
    has_older: bool,
    oldest_cursor: String,
    viewer_id: i64,
    is_group: bool,
}

impl Thread {
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn thread_title(&self) -> &str {
        &self.thread_title
    }

    pub fn users(&self) -> &[Arc<User>] {
        &self.users
    }

    pub fn items(&self) -> &[Arc<ThreadItem>] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&Arc<ThreadItem>> {
        self.items.iter().find(|i| i.item_id() == item_id)
    }

    pub fn user(&self, pk: i64) -> Option<&Arc<User>> {
        self.users.iter().find(|u| u.pk() == pk)
    }

    pub fn has_older(&self) -> bool {
        self.has_older
    }

    pub fn oldest_cursor(&self) -> Option<&str> {
        Some(self.oldest_cursor.as_str()).filter(|c| !c.is_empty())
    }

    pub fn viewer_id(&self) -> i64 {
        self.viewer_id
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }
}

impl Decodable for Thread {
    const TAG: &'static str = "thread";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .string("thread_id", |t, v| t.thread_id = v)
            .string("thread_title", |t, v| t.thread_title = v)
            .optional()
            .list::<User>("users", |t, v| t.users = v)
            .list::<ThreadItem>("items", |t, v| t.items = v)
            .boolean("has_older", |t, v| t.has_older = v)
            .optional()
            .string("oldest_cursor", |t, v| t.oldest_cursor = v)
            .optional()
            .int("viewer_id", |t, v| t.viewer_id = v)
            .optional()
            .boolean("is_group", |t, v| t.is_group = v)
            .optional()
            .identifier("thread_id")
    }
}

#[derive(Debug, Default)]
pub struct Inbox {
    threads: Vec<Arc<Thread>>,
    has_older: bool,
    oldest_cursor: String,
    unseen_count: i64,
}

impl Inbox {
    pub fn threads(&self) -> &[Arc<Thread>] {
        &self.threads
    }

    pub fn thread(&self, thread_id: &str) -> Option<&Arc<Thread>> {
        self.threads.iter().find(|t| t.thread_id() == thread_id)
    }

    pub fn has_older(&self) -> bool {
        self.has_older
    }

    pub fn oldest_cursor(&self) -> Option<&str> {
        Some(self.oldest_cursor.as_str()).filter(|c| !c.is_empty())
    }

    pub fn unseen_count(&self) -> i64 {
        self.unseen_count
    }
}

impl Decodable for Inbox {
    const TAG: &'static str = "inbox";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .list::<Thread>("threads", |i, v| i.threads = v)
            .boolean("has_older", |i, v| i.has_older = v)
            .string("oldest_cursor", |i, v| i.oldest_cursor = v)
            .optional()
            .int("unseen_count", |i, v| i.unseen_count = v)
            .optional()
    }
}

/// Payload of the `direct_v2/inbox/` endpoint.
#[derive(Debug, Default)]
pub struct InboxMessage {
    inbox: Option<Arc<Inbox>>,
    viewer: Option<Arc<User>>,
    seq_id: i64,
    pending_requests_total: i64,
}

impl InboxMessage {
    pub fn inbox(&self) -> Option<&Inbox> {
        self.inbox.as_deref()
    }

    pub fn viewer(&self) -> Option<&Arc<User>> {
        self.viewer.as_ref()
    }

    pub fn seq_id(&self) -> i64 {
        self.seq_id
    }

    pub fn pending_requests_total(&self) -> i64 {
        self.pending_requests_total
    }
}

impl Decodable for InboxMessage {
    const TAG: &'static str = "inbox_message";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .object::<User>("viewer", |m, v| m.viewer = Some(v))
            .optional()
            .object::<Inbox>("inbox", |m, v| m.inbox = Some(v))
            .int("seq_id", |m, v| m.seq_id = v)
            .optional()
            .int("pending_requests_total", |m, v| m.pending_requests_total = v)
            .optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_type_round_trips_known_names() {
        assert_eq!(ItemType::parse("media_share"), ItemType::MediaShare);
        assert_eq!(ItemType::parse("voice_media"), ItemType::Unknown);
    }

    #[test]
    fn item_type_inferred_from_payload_keys() {
        let raw = json!({"item_id": "1", "like": "\u{2764}"});
        assert_eq!(ItemType::infer(raw.as_object().unwrap()), ItemType::Like);
    }

    #[test]
    fn sent_at_converts_microseconds() {
        let item = ThreadItem {
            timestamp: 1_500_000_000_000_000.0,
            ..ThreadItem::default()
        };
        let secs = item
            .sent_at()
            .unwrap()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert_eq!(secs, 1_500_000_000);
        assert!(ThreadItem::default().sent_at().is_none());
    }
}
