//! Typed DTOs for the endpoints the client speaks to.
//!
//! Each type exposes read-only accessors and a `Decodable` descriptor; the
//! field catalog is deliberately partial and grows with the endpoints used.

pub mod feed;
pub mod inbox;
pub mod media;
pub mod user;

pub use feed::{Caption, FeedItem, FeedMessage, Timeline, TimelineEntry};
pub use inbox::{Inbox, InboxMessage, ItemType, Thread, ThreadItem, ThreadMediaItem};
pub use media::{ImageCandidate, ImageVersions};
pub use user::User;

use crate::decode::DescriptorRegistry;
use crate::error::DescriptorError;

/// A registry holding every shipped envelope payload and its object graph.
pub fn registry() -> Result<DescriptorRegistry, DescriptorError> {
    let mut registry = DescriptorRegistry::new();
    registry.register::<FeedMessage>()?;
    registry.register::<Timeline>()?;
    registry.register::<InboxMessage>()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_registry_covers_every_dto() {
        let registry = registry().unwrap();
        for tag in [
            "feed_message",
            "feed_item",
            "caption",
            "user",
            "image_versions",
            "image_candidate",
            "timeline",
            "timeline_entry",
            "inbox_message",
            "inbox",
            "thread",
            "thread_item",
            "thread_media_item",
        ] {
            assert!(registry.contains_tag(tag), "missing {tag}");
        }
        assert_eq!(registry.len(), 13);
    }
}
