//! Client configuration.
//!
//! A config can be built in code, loaded from JSON, or read from `GRAM_*`
//! environment variables. Device identifiers are stable per config so that
//! every request from one client looks like the same device.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://i.instagram.com/api/v1/";
pub const DEFAULT_USER_AGENT: &str =
    "Instagram 27.0.0.7.97 Android (24/7.0; 380dpi; 1080x1920; OnePlus; ONEPLUS A3010; OnePlus3T; qcom; en_US)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "Uuid::new_v4")]
    pub device_id: Uuid,
    #[serde(default = "Uuid::new_v4")]
    pub phone_id: Uuid,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            user_agent: default_user_agent(),
            device_id: Uuid::new_v4(),
            phone_id: Uuid::new_v4(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        serde_json::from_str(raw).map_err(|e| ApiError::Config(e.to_string()))
    }

    /// Read `GRAM_BASE_URL`, `GRAM_USER_AGENT`, `GRAM_DEVICE_ID` and
    /// `GRAM_PHONE_ID`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("GRAM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url);
        if let Some(agent) = lookup("GRAM_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("GRAM_DEVICE_ID") {
            config.device_id = parse_uuid("GRAM_DEVICE_ID", &raw)?;
        }
        if let Some(raw) = lookup("GRAM_PHONE_ID") {
            config.phone_id = parse_uuid("GRAM_PHONE_ID", &raw)?;
        }
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn parse_uuid(key: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|e| ApiError::Config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn from_json_fills_defaults() {
        let config = ClientConfig::from_json(r#"{"base_url":"http://localhost:3000"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_ne!(config.device_id, config.phone_id);
    }

    #[test]
    fn from_json_rejects_missing_base_url() {
        let err = ClientConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GRAM_BASE_URL", "http://127.0.0.1:9/"),
            ("GRAM_DEVICE_ID", "00000000-0000-0000-0000-000000000001"),
        ]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9/");
        assert_eq!(config.device_id, Uuid::from_u128(1));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn lookup_rejects_bad_uuid() {
        let err = ClientConfig::from_lookup(|k| {
            (k == "GRAM_PHONE_ID").then(|| "not-a-uuid".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(msg) if msg.starts_with("GRAM_PHONE_ID")));
    }
}
