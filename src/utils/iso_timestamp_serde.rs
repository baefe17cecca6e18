use chrono::{DateTime, Utc};
use serde::{self, Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Serialize an optional `DateTime<Utc>` as "YYYY-MM-DDTHH:MM:SS.mmmZ", or `null`.
pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

/// Deserialize any RFC 3339 timestamp (or `null`) into an optional `DateTime<Utc>`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let date = DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)?;
    Ok(Some(date.with_timezone(&Utc)))
}
