//! Stateless HTTP request builder and response parser for the gram API.
//!
//! # Design
//! `GramClient` holds its configuration, the parsed base URL and a shared
//! descriptor registry; it carries no mutable state between calls. Each
//! endpoint is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. The caller
//! executes the actual HTTP round-trip, keeping the core deterministic and
//! free of I/O dependencies.

use std::sync::Arc;

use url::Url;

use crate::body::{BodySerializer, FormSerializer};
use crate::config::ClientConfig;
use crate::decode::{Decodable, DescriptorRegistry};
use crate::dto::{self, FeedMessage, InboxMessage, Timeline};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::requests::{Feed, FeedQuery, TimelineOptions};

/// Synchronous, stateless client for the gram API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. Cloning is cheap; clones share one registry.
#[derive(Debug, Clone)]
pub struct GramClient {
    config: ClientConfig,
    base: Url,
    descriptors: Arc<DescriptorRegistry>,
}

impl GramClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base URL `{}` cannot carry a path",
                config.base_url
            )));
        }
        Ok(Self {
            config,
            base,
            descriptors: Arc::new(dto::registry()?),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn descriptors(&self) -> &DescriptorRegistry {
        &self.descriptors
    }

    pub fn build_feed(&self, query: &FeedQuery) -> HttpRequest {
        let mut url = self.endpoint(&["feed", query.kind.path_segment(), query.query.as_str()]);
        if let Some(max_id) = &query.max_id {
            url.query_pairs_mut().append_pair("max_id", max_id);
        }
        self.get(url)
    }

    /// Timeline request with the form body the endpoint expects.
    pub fn build_timeline(&self, options: &TimelineOptions) -> Result<HttpRequest, ApiError> {
        self.build_timeline_with(options, &FormSerializer)
    }

    /// Timeline request with the body encoded by `serializer`.
    pub fn build_timeline_with(
        &self,
        options: &TimelineOptions,
        serializer: &dyn BodySerializer,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(&["feed", "timeline"]);
        let mut params = vec![
            ("_uuid".to_string(), self.config.device_id.to_string()),
            ("phone_id".to_string(), self.config.phone_id.to_string()),
        ];
        params.extend(options.params());
        self.post(url, &params, serializer)
    }

    pub fn build_inbox(&self, cursor: Option<&str>) -> HttpRequest {
        let mut url = self.endpoint(&["direct_v2", "inbox"]);
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }
        self.get(url)
    }

    pub fn parse_feed(&self, query: &FeedQuery, response: HttpResponse) -> Result<Feed, ApiError> {
        let envelope = self.parse_envelope::<FeedMessage>(response)?;
        Ok(Feed::new(query.clone(), envelope))
    }

    pub fn parse_timeline(&self, response: HttpResponse) -> Result<Envelope<Timeline>, ApiError> {
        self.parse_envelope(response)
    }

    pub fn parse_inbox(&self, response: HttpResponse) -> Result<Envelope<InboxMessage>, ApiError> {
        self.parse_envelope(response)
    }

    /// Decode any 200 response into an envelope around `T`.
    ///
    /// `T` must be registered in this client's descriptor registry.
    pub fn parse_envelope<T: Decodable>(
        &self,
        response: HttpResponse,
    ) -> Result<Envelope<T>, ApiError> {
        check_status(&response, 200)?;
        let envelope = Envelope::<T>::decode_str(&self.descriptors, &response.body)?;
        if envelope.is_fail() {
            return Err(ApiError::Rejected {
                message: envelope.message().unwrap_or_default().to_string(),
            });
        }
        Ok(envelope)
    }

    /// `base` joined with `segments`, each percent-encoded, plus a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    fn get(&self, url: Url) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![("user-agent".to_string(), self.config.user_agent.clone())],
            body: None,
        }
    }

    fn post(
        &self,
        url: Url,
        params: &[(String, String)],
        serializer: &dyn BodySerializer,
    ) -> Result<HttpRequest, ApiError> {
        let body = serializer.encode(params)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![
                ("user-agent".to_string(), self.config.user_agent.clone()),
                ("content-type".to_string(), serializer.content_type().to_string()),
            ],
            body: Some(body),
        })
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
