//! Request body encodings.
//!
//! Endpoints hand their parameters to a `BodySerializer`, which decides the
//! wire encoding and the matching content type. `GramClient::build_timeline`
//! uses `FormSerializer`; `build_timeline_with` accepts any serializer, such
//! as `JsonSerializer` for hosts that post JSON bodies.

use serde_json::{Map, Value};

use crate::error::ApiError;

pub trait BodySerializer {
    fn content_type(&self) -> &'static str;

    fn encode(&self, params: &[(String, String)]) -> Result<String, ApiError>;
}

/// `application/x-www-form-urlencoded`, the encoding most endpoints expect.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormSerializer;

impl BodySerializer for FormSerializer {
    fn content_type(&self) -> &'static str {
        "application/x-www-form-urlencoded; charset=UTF-8"
    }

    fn encode(&self, params: &[(String, String)]) -> Result<String, ApiError> {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key, value);
        }
        Ok(serializer.finish())
    }
}

/// A flat JSON object of string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl BodySerializer for JsonSerializer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, params: &[(String, String)]) -> Result<String, ApiError> {
        let object: Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        serde_json::to_string(&object).map_err(|e| ApiError::SerializationError(e.to_string()))
    }
}
