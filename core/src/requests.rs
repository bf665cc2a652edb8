//! Endpoint inputs and paged results.

use crate::dto::FeedMessage;
use crate::envelope::Envelope;
use crate::error::ApiError;

/// Which media feed to query. The numeric values match the public
/// constants older callers pass around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Hashtag = 1,
    User = 2,
}

impl FeedKind {
    pub(crate) fn path_segment(self) -> &'static str {
        match self {
            FeedKind::Hashtag => "tag",
            FeedKind::User => "user",
        }
    }
}

impl TryFrom<i32> for FeedKind {
    type Error = ApiError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FeedKind::Hashtag),
            2 => Ok(FeedKind::User),
            other => Err(ApiError::InvalidFeedType(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub kind: FeedKind,
    pub query: String,
    pub max_id: Option<String>,
}

impl FeedQuery {
    pub fn new(kind: FeedKind, query: &str) -> Self {
        Self {
            kind,
            query: query.to_string(),
            max_id: None,
        }
    }

    pub fn hashtag(tag: &str) -> Self {
        Self::new(FeedKind::Hashtag, tag)
    }

    pub fn user(user_id: &str) -> Self {
        Self::new(FeedKind::User, user_id)
    }

    pub fn with_max_id(mut self, max_id: &str) -> Self {
        self.max_id = Some(max_id.to_string());
        self
    }
}

/// One page of a hashtag or user feed, with the query that produced it.
#[derive(Debug)]
pub struct Feed {
    query: FeedQuery,
    envelope: Envelope<FeedMessage>,
}

impl Feed {
    pub(crate) fn new(query: FeedQuery, envelope: Envelope<FeedMessage>) -> Self {
        Self { query, envelope }
    }

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    pub fn kind(&self) -> FeedKind {
        self.query.kind
    }

    pub fn message(&self) -> &FeedMessage {
        self.envelope.payload()
    }

    pub fn envelope(&self) -> &Envelope<FeedMessage> {
        &self.envelope
    }

    /// Query for the following page, if the server says there is one.
    pub fn next_page(&self) -> Option<FeedQuery> {
        if !self.envelope.more_available() {
            return None;
        }
        let max_id = self.envelope.next_max_id()?;
        Some(self.query.clone().with_max_id(max_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineReason {
    #[default]
    ColdStartFetch,
    PullToRefresh,
    Pagination,
}

impl TimelineReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TimelineReason::ColdStartFetch => "cold_start_fetch",
            TimelineReason::PullToRefresh => "pull_to_refresh",
            TimelineReason::Pagination => "pagination",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    pub max_id: Option<String>,
    pub reason: TimelineReason,
    pub is_pull_to_refresh: bool,
    pub seen_posts: Vec<String>,
}

impl TimelineOptions {
    /// Options for the page after `max_id`.
    pub fn next(max_id: &str) -> Self {
        Self {
            max_id: Some(max_id.to_string()),
            reason: TimelineReason::Pagination,
            ..Self::default()
        }
    }

    pub(crate) fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("reason".to_string(), self.reason.as_str().to_string()),
            (
                "is_pull_to_refresh".to_string(),
                u8::from(self.is_pull_to_refresh).to_string(),
            ),
        ];
        if let Some(max_id) = &self.max_id {
            params.push(("max_id".to_string(), max_id.clone()));
        }
        if !self.seen_posts.is_empty() {
            params.push(("seen_posts".to_string(), self.seen_posts.join(",")));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_kind_from_legacy_constants() {
        assert_eq!(FeedKind::try_from(1).unwrap(), FeedKind::Hashtag);
        assert_eq!(FeedKind::try_from(2).unwrap(), FeedKind::User);
        assert!(matches!(
            FeedKind::try_from(3),
            Err(ApiError::InvalidFeedType(3))
        ));
    }

    #[test]
    fn timeline_params_skip_absent_values() {
        let params = TimelineOptions::default().params();
        assert_eq!(
            params,
            vec![
                ("reason".to_string(), "cold_start_fetch".to_string()),
                ("is_pull_to_refresh".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn next_timeline_page_paginates() {
        let params = TimelineOptions::next("abc").params();
        assert!(params.contains(&("reason".to_string(), "pagination".to_string())));
        assert!(params.contains(&("max_id".to_string(), "abc".to_string())));
    }
}
