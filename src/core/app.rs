//! Tenants and their credentials

use base64::Engine as _;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::object::now_millis;

/// Length of the random secret before encoding
const SECRET_BYTES: usize = 40;

/// An isolated tenant namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub appid: String,
    pub name: String,

    /// Whether the tenant shares infrastructure with other tenants
    pub shared: bool,

    /// Tenant-declared plural alias -> canonical type
    #[serde(default)]
    pub datatypes: BTreeMap<String, String>,

    pub timestamp: i64,

    #[serde(skip_serializing, default)]
    secret: String,
}

/// Access key / secret pair handed out exactly once
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl App {
    pub fn new(appid: impl Into<String>, name: impl Into<String>, shared: bool) -> Self {
        Self {
            appid: appid.into(),
            name: name.into(),
            shared,
            datatypes: BTreeMap::new(),
            timestamp: now_millis(),
            secret: generate_secret(),
        }
    }

    /// Replace the secret, invalidating the previous one
    pub fn reset_secret(&mut self) {
        self.secret = generate_secret();
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_key: self.appid.clone(),
            secret_key: self.secret.clone(),
        }
    }

    /// Register an alias. Returns false if it was already mapped the same way.
    pub fn add_datatype(&mut self, plural: &str, singular: &str) -> bool {
        if self.datatypes.get(plural).map(String::as_str) == Some(singular) {
            return false;
        }
        self.datatypes
            .insert(plural.to_string(), singular.to_string());
        true
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill(&mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_serialized() {
        let app = App::new("root", "Root", false);
        let json = serde_json::to_value(&app).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["appid"], "root");
    }

    #[test]
    fn test_reset_secret_changes_it() {
        let mut app = App::new("root", "Root", false);
        let before = app.credentials().secret_key;
        app.reset_secret();
        let after = app.credentials();
        assert_ne!(before, after.secret_key);
        assert_eq!(after.access_key, "root");
    }

    #[test]
    fn test_secret_length() {
        let app = App::new("a", "A", true);
        // 40 bytes -> 56 base64 characters
        assert_eq!(app.credentials().secret_key.len(), 56);
    }

    #[test]
    fn test_add_datatype() {
        let mut app = App::new("a", "A", false);
        assert!(app.add_datatype("cats", "cat"));
        assert!(!app.add_datatype("cats", "cat"));
        assert_eq!(app.datatypes["cats"], "cat");
    }

    #[test]
    fn test_credentials_serialize_camel_case() {
        let app = App::new("a", "A", false);
        let json = serde_json::to_value(app.credentials()).unwrap();
        assert!(json.get("accessKey").is_some());
        assert!(json.get("secretKey").is_some());
    }
}
