//! Object metadata returned by the stat endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed metadata document for a single object.
///
/// The server's stat document is kept as-is. The accessors below cover the
/// fields most servers return and accept both camelCase and snake_case keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectStat(Value);

impl ObjectStat {
    /// Wraps a parsed metadata document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the field with the given key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Object size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.get("size").and_then(Value::as_u64)
    }

    /// Entity tag of the stored object.
    pub fn etag(&self) -> Option<&str> {
        self.first_str(&["etag", "eTag", "ETag"])
    }

    /// Last modification time, in whatever format the server reports it.
    pub fn last_modified(&self) -> Option<&str> {
        self.first_str(&["lastModified", "last_modified"])
    }

    /// Content type, either top-level or inside the `metaData` map.
    pub fn content_type(&self) -> Option<&str> {
        self.first_str(&["contentType", "content_type"]).or_else(|| {
            self.get("metaData")
                .or_else(|| self.get("metadata"))
                .and_then(|meta| meta.get("content-type"))
                .and_then(Value::as_str)
        })
    }

    /// Returns the raw metadata document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the stat and returns the raw metadata document.
    pub fn into_value(self) -> Value {
        self.0
    }

    fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key).and_then(Value::as_str))
    }
}

impl From<Value> for ObjectStat {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_accessors_camel_case() {
        let stat = ObjectStat::new(json!({
            "size": 1024,
            "etag": "abc123",
            "lastModified": "2024-01-01T00:00:00Z",
            "metaData": { "content-type": "image/png" }
        }));

        assert_eq!(stat.size(), Some(1024));
        assert_eq!(stat.etag(), Some("abc123"));
        assert_eq!(stat.last_modified(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(stat.content_type(), Some("image/png"));
    }

    #[test]
    fn test_accessors_snake_case() {
        let stat = ObjectStat::new(json!({
            "content_type": "text/plain",
            "last_modified": "yesterday"
        }));

        assert_eq!(stat.content_type(), Some("text/plain"));
        assert_eq!(stat.last_modified(), Some("yesterday"));
        assert!(stat.size().is_none());
        assert!(stat.etag().is_none());
    }

    #[test]
    fn test_transparent_serde() {
        let stat: ObjectStat = serde_json::from_str(r#"{"size":7}"#).unwrap();
        assert_eq!(stat.size(), Some(7));
        assert_eq!(serde_json::to_string(&stat).unwrap(), r#"{"size":7}"#);
    }
}
