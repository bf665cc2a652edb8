//! Error types for the gram client and its response decoder.
//!
//! # Design
//! `DecodeError` is the only hard failure of the decoder and always names
//! the JSON path plus the expected and found kinds, so shape drift in the
//! upstream API can be diagnosed from the error alone. `DescriptorError` is
//! raised while registering descriptors, never while decoding. `ApiError`
//! wraps both for callers of `GramClient` and keeps `NotFound` separate
//! because callers frequently branch on it.

use crate::decode::{ExpectedKind, JsonKind, Path};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A raw value's JSON kind cannot be coerced to the declared shape.
    #[error("expected {expected} at {path}, found {found}")]
    Mismatch {
        path: Path,
        expected: ExpectedKind,
        found: JsonKind,
    },

    #[error("malformed JSON payload: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("no descriptor registered for `{type_name}`")]
    Unregistered { type_name: &'static str },
}

impl DecodeError {
    /// Path to the failing value, for structural mismatches.
    pub fn path(&self) -> Option<&Path> {
        match self {
            DecodeError::Mismatch { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// A descriptor declaration that cannot be decoded consistently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("`{tag}` declares field `{field}` twice")]
    DuplicateField {
        tag: &'static str,
        field: &'static str,
    },

    #[error("`{tag}` identifier `{field}` is not a declared scalar field")]
    InvalidIdentifier {
        tag: &'static str,
        field: &'static str,
    },

    #[error("`{tag}` lookup field `{field}` is not a declared scalar field")]
    InvalidLookupField {
        tag: &'static str,
        field: &'static str,
    },

    #[error("`{tag}` declares requirement slot `{slot}` twice")]
    DuplicateSlot {
        tag: &'static str,
        slot: &'static str,
    },

    #[error("`{tag}` applies `{modifier}` before declaring any field")]
    DanglingModifier {
        tag: &'static str,
        modifier: &'static str,
    },

    #[error("type tag `{tag}` is used by both `{existing}` and `{incoming}`")]
    DuplicateTag {
        tag: &'static str,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Errors returned by `GramClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404; the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response envelope carried `"status": "fail"`.
    #[error("request rejected: {message}")]
    Rejected { message: String },

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Decode(#[from] DecodeError),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid feed type {0}")]
    InvalidFeedType(i32),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}
