//! Entries and Wire Types
//!
//! An [`Entry`] is one message on the wall. Entries are created by the
//! server, become visible once the server's reveal gate admits them, and are
//! immutable from then on. The id is the ordering and dedupe key for the
//! whole engine.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of an entry, assigned by the server (monotonically increasing, ≥ 1)
///
/// Decodes from either a JSON number or a numeric string, since the wall
/// server reports freshly inserted ids as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw id
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(Self)
                .map_err(|e| serde::de::Error::custom(format!("invalid entry id {s:?}: {e}"))),
        }
    }
}

/// A single message on the wall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Server-assigned id
    pub id: EntryId,
    /// Author name
    pub name: String,
    /// Message body
    pub text: String,
    /// When the entry was submitted (server local time)
    #[serde(with = "wire_timestamp")]
    pub created_at: NaiveDateTime,
}

impl Entry {
    /// Build an entry (mostly useful for backends and tests)
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        text: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            text: text.into(),
            created_at,
        }
    }
}

/// Response body of the list-since endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListResponse {
    /// Whether the server handled the request
    pub ok: bool,
    /// Visible entries with `id > since`, ascending
    #[serde(default)]
    pub items: Vec<Entry>,
    /// Error detail when `ok` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request body of the submit endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitRequest {
    /// Author name
    pub name: String,
    /// Message body
    pub text: String,
    /// Defer visibility to the next reveal time
    #[serde(rename = "surprise", serialize_with = "flag_as_int")]
    pub defer: bool,
}

impl SubmitRequest {
    /// Create a submit request
    pub fn new(name: impl Into<String>, text: impl Into<String>, defer: bool) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            defer,
        }
    }
}

/// Response body of the submit endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Whether the entry was accepted
    pub ok: bool,
    /// Id of the accepted entry
    #[serde(default)]
    pub id: Option<EntryId>,
    /// Validation message when rejected
    #[serde(default)]
    pub error: Option<String>,
}

fn flag_as_int<S: serde::Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

/// `YYYY-MM-DD HH:MM:SS` timestamps as stored by the wall server
pub(crate) mod wire_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_accepts_number_and_string() {
        let n: EntryId = serde_json::from_str("7").unwrap();
        let s: EntryId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(n, EntryId::new(7));
        assert_eq!(s, EntryId::new(12));
        assert!(serde_json::from_str::<EntryId>("\"seven\"").is_err());
    }

    #[test]
    fn test_list_response_decodes_server_rows() {
        let body = r#"{"ok":true,"items":[
            {"id":1,"name":"Ann","text":"hello","created_at":"2024-05-01 10:00:00"},
            {"id":"3","name":"Bo","text":"hi","created_at":"2024-05-01 10:00:05"}
        ]}"#;
        let resp: ListResponse = serde_json::from_str(body).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.items[1].id, EntryId::new(3));
        assert_eq!(
            resp.items[0].created_at.format("%H:%M:%S").to_string(),
            "10:00:00"
        );
    }

    #[test]
    fn test_list_response_without_items() {
        let resp: ListResponse = serde_json::from_str(r#"{"ok":false}"#).unwrap();
        assert!(!resp.ok);
        assert!(resp.items.is_empty());
    }

    #[test]
    fn test_submit_request_encodes_surprise_flag() {
        let body = serde_json::to_value(SubmitRequest::new("Ann", "hi", true)).unwrap();
        assert_eq!(body["surprise"], 1);
        assert_eq!(body["name"], "Ann");

        let body = serde_json::to_value(SubmitRequest::new("Ann", "hi", false)).unwrap();
        assert_eq!(body["surprise"], 0);
    }

    #[test]
    fn test_submit_response_string_id() {
        let resp: SubmitResponse = serde_json::from_str(r#"{"ok":true,"id":"42"}"#).unwrap();
        assert_eq!(resp.id, Some(EntryId::new(42)));
    }
}
