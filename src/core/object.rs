//! Runtime-typed domain objects

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::ValidationError;

/// Keys owned by the object envelope rather than its open property set
const RESERVED: [&str; 6] = ["id", "type", "appid", "timestamp", "updated", "parentid"];

/// A tenant-owned object whose shape is defined at runtime
///
/// The `object_type` is always canonical once an object reaches a port. All
/// tenant-defined fields live in `properties` and are flattened into the
/// JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainObject {
    pub id: String,

    #[serde(rename = "type")]
    pub object_type: String,

    pub appid: String,

    /// Creation time, epoch millis
    pub timestamp: i64,

    /// Last update time, epoch millis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,

    /// Containing object for the children relation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parentid: Option<String>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl DomainObject {
    /// Create an empty object with a fresh id
    pub fn new(appid: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            object_type: object_type.into(),
            appid: appid.into(),
            timestamp: now_millis(),
            updated: None,
            parentid: None,
            properties: Map::new(),
        }
    }

    /// Build an object from a client payload
    ///
    /// The type is taken from `object_type` rather than from the payload. The
    /// id and timestamp are kept if the payload carries them, otherwise they
    /// are generated.
    pub fn from_payload(
        appid: &str,
        object_type: &str,
        payload: Value,
    ) -> Result<Self, ValidationError> {
        let Value::Object(mut fields) = payload else {
            return Err(ValidationError::InvalidJson {
                message: "expected a JSON object".to_string(),
            });
        };

        let id = take_string(&mut fields, "id").unwrap_or_else(new_id);
        let timestamp = fields
            .remove("timestamp")
            .and_then(|v| v.as_i64())
            .unwrap_or_else(now_millis);
        let parentid = take_string(&mut fields, "parentid");
        for key in RESERVED {
            fields.remove(key);
        }

        Ok(Self {
            id,
            object_type: object_type.to_string(),
            appid: appid.to_string(),
            timestamp,
            updated: None,
            parentid,
            properties: fields,
        })
    }

    /// Merge a partial payload into this object
    ///
    /// Identity fields (`id`, `type`, `appid`, `timestamp`) never change. A
    /// `null` value removes the property.
    pub fn merge(&mut self, payload: &Map<String, Value>) {
        for (key, value) in payload {
            match key.as_str() {
                "id" | "type" | "appid" | "timestamp" | "updated" => {}
                "parentid" => {
                    self.parentid = value.as_str().map(str::to_string);
                }
                _ if value.is_null() => {
                    self.properties.remove(key);
                }
                _ => {
                    self.properties.insert(key.clone(), value.clone());
                }
            }
        }
        self.updated = Some(now_millis());
    }

    /// Look up an envelope field or a property by name
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "type" => Some(Value::String(self.object_type.clone())),
            "appid" => Some(Value::String(self.appid.clone())),
            "timestamp" => Some(Value::from(self.timestamp)),
            "updated" => self.updated.map(Value::from),
            "parentid" => self.parentid.clone().map(Value::String),
            _ => self.properties.get(name).cloned(),
        }
    }

    /// Scalar field rendered as text, for matching
    pub fn field_text(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Values of the `tags` array property
    pub fn tags(&self) -> Vec<&str> {
        self.properties
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// JSON representation as returned to clients
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Generate a new object identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
