//! Media feed payloads: hashtag and user feeds, and the home timeline.

use std::sync::{Arc, Weak};

use serde_json::{Map, Value};

use crate::decode::{Decodable, DescriptorBuilder, Requirement, Resolutions, Resolved};
use crate::dto::media::ImageVersions;
use crate::dto::user::User;

#[derive(Debug, Default)]
pub struct Caption {
    pk: String,
    text: String,
    user_id: i64,
    created_at: i64,
    user: Option<Arc<User>>,
    media: Weak<FeedItem>,
}

impl Caption {
    pub fn pk(&self) -> &str {
        &self.pk
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    /// The feed item this caption belongs to.
    pub fn media(&self) -> Option<Arc<FeedItem>> {
        self.media.upgrade()
    }
}

impl Decodable for Caption {
    const TAG: &'static str = "caption";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .string("pk", |c, v| c.pk = v)
            .string("text", |c, v| c.text = v)
            .int("user_id", |c, v| c.user_id = v)
            .int("created_at", |c, v| c.created_at = v)
            .optional()
            .requires(Requirement::ancestor("media", FeedItem::TAG))
            .requires(Requirement::lookup("user", "user_id", User::TAG))
    }

    fn on_requirement(&mut self, slot: &str, value: Option<&Resolved>) {
        match slot {
            "media" => {
                if let Some(media) = value.and_then(|r| r.downgrade::<FeedItem>()) {
                    self.media = media;
                }
            }
            "user" => self.user = value.and_then(|r| r.upgrade::<User>()),
            _ => {}
        }
    }
}

/// A post in a feed.
#[derive(Debug, Default)]
pub struct FeedItem {
    id: String,
    pk: i64,
    code: String,
    media_type: i64,
    taken_at: i64,
    like_count: i64,
    comment_count: i64,
    user: Option<Arc<User>>,
    caption: Option<Arc<Caption>>,
    image_versions: Option<Arc<ImageVersions>>,
    is_ad: bool,
}

impl FeedItem {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pk(&self) -> i64 {
        self.pk
    }

    /// Shortcode used in public post URLs.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn media_type(&self) -> i64 {
        self.media_type
    }

    pub fn taken_at(&self) -> i64 {
        self.taken_at
    }

    pub fn like_count(&self) -> i64 {
        self.like_count
    }

    pub fn comment_count(&self) -> i64 {
        self.comment_count
    }

    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    pub fn caption(&self) -> Option<&Arc<Caption>> {
        self.caption.as_ref()
    }

    pub fn image_versions(&self) -> Option<&ImageVersions> {
        self.image_versions.as_deref()
    }

    pub fn is_ad(&self) -> bool {
        self.is_ad
    }
}

impl Decodable for FeedItem {
    const TAG: &'static str = "feed_item";

    fn describe() -> DescriptorBuilder<Self> {
        // `user` comes before `caption` so the caption can look its author up.
        DescriptorBuilder::<Self>::new()
            .string("id", |f, v| f.id = v)
            .int("pk", |f, v| f.pk = v)
            .string("code", |f, v| f.code = v)
            .optional()
            .int("media_type", |f, v| f.media_type = v)
            .int("taken_at", |f, v| f.taken_at = v)
            .optional()
            .int("like_count", |f, v| f.like_count = v)
            .optional()
            .int("comment_count", |f, v| f.comment_count = v)
            .optional()
            .object::<User>("user", |f, v| f.user = Some(v))
            .object::<Caption>("caption", |f, v| f.caption = Some(v))
            .optional()
            .object::<ImageVersions>("image_versions2", |f, v| f.image_versions = Some(v))
            .optional()
            .identifier("id")
    }

    fn on_decode(&mut self, raw: &Map<String, Value>, _requirements: &Resolutions) {
        self.is_ad = raw.contains_key("injected");
    }
}

/// Payload of the hashtag and user feed endpoints.
#[derive(Debug, Default)]
pub struct FeedMessage {
    items: Vec<Arc<FeedItem>>,
    num_results: i64,
    auto_load_more_enabled: bool,
}

impl FeedMessage {
    pub fn items(&self) -> &[Arc<FeedItem>] {
        &self.items
    }

    pub fn num_results(&self) -> i64 {
        self.num_results
    }

    pub fn auto_load_more_enabled(&self) -> bool {
        self.auto_load_more_enabled
    }
}

impl Decodable for FeedMessage {
    const TAG: &'static str = "feed_message";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .list::<FeedItem>("items", |m, v| m.items = v)
            .source("ranked_items")
            .int("num_results", |m, v| m.num_results = v)
            .optional()
            .boolean("auto_load_more_enabled", |m, v| m.auto_load_more_enabled = v)
            .optional()
    }
}

/// One slot of the home timeline; either organic media or an ad.
#[derive(Debug, Default)]
pub struct TimelineEntry {
    media_or_ad: Option<Arc<FeedItem>>,
}

impl TimelineEntry {
    pub fn media_or_ad(&self) -> Option<&Arc<FeedItem>> {
        self.media_or_ad.as_ref()
    }
}

impl Decodable for TimelineEntry {
    const TAG: &'static str = "timeline_entry";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .object::<FeedItem>("media_or_ad", |e, v| e.media_or_ad = Some(v))
            .optional()
    }
}

/// Payload of the home timeline endpoint.
#[derive(Debug, Default)]
pub struct Timeline {
    feed_items: Vec<Arc<TimelineEntry>>,
    num_results: i64,
    is_direct_v2_enabled: bool,
}

impl Timeline {
    pub fn entries(&self) -> &[Arc<TimelineEntry>] {
        &self.feed_items
    }

    /// Organic media in timeline order, skipping ads and non-media slots.
    pub fn media(&self) -> impl Iterator<Item = &Arc<FeedItem>> {
        self.feed_items
            .iter()
            .filter_map(|e| e.media_or_ad())
            .filter(|m| !m.is_ad())
    }

    pub fn num_results(&self) -> i64 {
        self.num_results
    }

    pub fn is_direct_v2_enabled(&self) -> bool {
        self.is_direct_v2_enabled
    }
}

impl Decodable for Timeline {
    const TAG: &'static str = "timeline";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .list::<TimelineEntry>("feed_items", |t, v| t.feed_items = v)
            .int("num_results", |t, v| t.num_results = v)
            .optional()
            .boolean("is_direct_v2_enabled", |t, v| t.is_direct_v2_enabled = v)
            .optional()
    }
}
