//! Identity and timestamp types for MindCanvas entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier. Random UUIDv4, serialized as a hyphenated string.
pub type EntityId = Uuid;

pub type MapId = EntityId;
pub type BlockId = EntityId;
pub type MessageId = EntityId;

/// Opaque caller-supplied identity, used only as a storage partition key.
pub type UserId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new random EntityId.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Current UTC time.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Serde adapter for ISO-8601 timestamps.
///
/// Writes RFC 3339 UTC with microsecond precision. Reads RFC 3339 as well as
/// offset-less `YYYY-MM-DDTHH:MM:SS[.ffffff]` strings, which are taken as UTC.
pub mod iso8601 {
    use super::Timestamp;
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn to_iso(ts: &Timestamp) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn parse(raw: &str) -> Option<Timestamp> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_iso(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {}", raw))
        })
    }
}
