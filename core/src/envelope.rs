//! Top-level response wrapper.
//!
//! # Design
//! An `Envelope<T>` anchors exactly one decode pass. The payload `T` is
//! decoded from the whole top-level object, while status and pagination
//! metadata are read from reserved keys independently of the payload's
//! descriptor. Once constructed the envelope is immutable.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::decode::{self, value, DescriptorRegistry, ExpectedKind, JsonKind, Path};
use crate::decode::Decodable;
use crate::error::DecodeError;

pub const STATUS_OK: &str = "ok";
pub const STATUS_FAIL: &str = "fail";

#[derive(Debug)]
pub struct Envelope<T> {
    status: Option<String>,
    message: Option<String>,
    next_max_id: Option<String>,
    more_available: bool,
    payload: Arc<T>,
}

impl<T: Decodable> Envelope<T> {
    pub fn decode_str(descriptors: &DescriptorRegistry, body: &str) -> Result<Self, DecodeError> {
        let raw: Value = serde_json::from_str(body)?;
        Self::decode_value(descriptors, &raw)
    }

    pub fn decode_slice(
        descriptors: &DescriptorRegistry,
        body: &[u8],
    ) -> Result<Self, DecodeError> {
        let raw: Value = serde_json::from_slice(body)?;
        Self::decode_value(descriptors, &raw)
    }

    pub fn decode_value(descriptors: &DescriptorRegistry, raw: &Value) -> Result<Self, DecodeError> {
        let Value::Object(map) = raw else {
            return Err(DecodeError::Mismatch {
                path: Path::root(),
                expected: ExpectedKind::Object,
                found: JsonKind::of(raw),
            });
        };

        let status = reserved(map, "status", ExpectedKind::String, value::string)?;
        let message = reserved(map, "message", ExpectedKind::String, value::string)?;
        let next_max_id = reserved(map, "next_max_id", ExpectedKind::String, value::string)?;
        let more_available =
            reserved(map, "more_available", ExpectedKind::Bool, value::boolean)?.unwrap_or(false);

        let payload = decode::decode_value::<T>(descriptors, raw)?;
        Ok(Self {
            status,
            message,
            next_max_id,
            more_available,
            payload,
        })
    }
}

impl<T> Envelope<T> {
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }

    pub fn is_fail(&self) -> bool {
        self.status.as_deref() == Some(STATUS_FAIL)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Cursor for the next page, when the server reported one.
    pub fn next_max_id(&self) -> Option<&str> {
        self.next_max_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn more_available(&self) -> bool {
        self.more_available
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn shared_payload(&self) -> Arc<T> {
        Arc::clone(&self.payload)
    }

    pub fn into_payload(self) -> Arc<T> {
        self.payload
    }
}

fn reserved<V>(
    map: &Map<String, Value>,
    key: &'static str,
    expected: ExpectedKind,
    coerce: fn(&Value) -> Result<Option<V>, JsonKind>,
) -> Result<Option<V>, DecodeError> {
    match map.get(key) {
        None => Ok(None),
        Some(raw) => coerce(raw).map_err(|found| DecodeError::Mismatch {
            path: Path::key(key),
            expected,
            found,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DescriptorBuilder;

    #[derive(Debug, Default)]
    struct Counter {
        count: i64,
    }

    impl Decodable for Counter {
        const TAG: &'static str = "counter";
        fn describe() -> DescriptorBuilder<Self> {
            DescriptorBuilder::<Self>::new().int("count", |c, v| c.count = v)
        }
    }

    fn registry() -> DescriptorRegistry {
        let mut registry = DescriptorRegistry::new();
        registry.register::<Counter>().unwrap();
        registry
    }

    #[test]
    fn reads_metadata_beside_payload() {
        let envelope = Envelope::<Counter>::decode_str(
            &registry(),
            r#"{"count":"3","status":"ok","next_max_id":12345,"more_available":true}"#,
        )
        .unwrap();
        assert!(envelope.is_ok());
        assert_eq!(envelope.payload().count, 3);
        assert_eq!(envelope.next_max_id(), Some("12345"));
        assert!(envelope.more_available());
        assert!(envelope.message().is_none());
    }

    #[test]
    fn missing_metadata_defaults() {
        let envelope = Envelope::<Counter>::decode_str(&registry(), "{}").unwrap();
        assert_eq!(envelope.status(), None);
        assert!(!envelope.is_ok());
        assert!(!envelope.more_available());
        assert_eq!(envelope.payload().count, 0);
    }

    #[test]
    fn fail_status_carries_message() {
        let envelope = Envelope::<Counter>::decode_str(
            &registry(),
            r#"{"status":"fail","message":"login_required"}"#,
        )
        .unwrap();
        assert!(envelope.is_fail());
        assert_eq!(envelope.message(), Some("login_required"));
    }

    #[test]
    fn malformed_status_names_its_key() {
        let err =
            Envelope::<Counter>::decode_str(&registry(), r#"{"status":["ok"]}"#).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "status");
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = Envelope::<Counter>::decode_slice(&registry(), b"\"ok\"").unwrap_err();
        assert!(err.path().unwrap().is_root());
    }
}
