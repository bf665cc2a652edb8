//! Synchronous client core for a private social-media HTTP API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Responses are decoded by a
//! descriptor-driven object graph decoder into typed DTOs wrapped in an
//! `Envelope` that also exposes status and pagination metadata.
//!
//! # Design
//! - `GramClient` is stateless: it holds only configuration and the
//!   descriptor registry.
//! - Each endpoint is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - The decoder tolerates unknown keys, `null` values and missing sibling
//!   objects; only structural shape mismatches are errors.
//! - Every decode call owns its own `DecodeContext`, so responses can be
//!   decoded from any number of threads at once.

pub mod body;
pub mod client;
pub mod config;
pub mod decode;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod http;
pub mod requests;

pub use client::GramClient;
pub use config::ClientConfig;
pub use decode::{Decodable, DescriptorBuilder, DescriptorRegistry, Requirement};
pub use envelope::Envelope;
pub use error::{ApiError, DecodeError, DescriptorError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use requests::{Feed, FeedKind, FeedQuery, TimelineOptions, TimelineReason};
