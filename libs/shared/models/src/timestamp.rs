//! Serde helpers for the `YYYY-MM-DD HH:MM` timestamp format used by the
//! clinic's flat CSV tables.

pub const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `NaiveDateTime` <-> `YYYY-MM-DD HH:MM`.
pub mod slot_minutes {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::SLOT_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(SLOT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, SLOT_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// `Option<NaiveDateTime>` <-> `YYYY-MM-DD HH:MM`, with the empty string
/// standing in for `None` (how unfired reminders are stored).
pub mod slot_minutes_opt {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::SLOT_FORMAT;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(SLOT_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.trim().is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(&s, SLOT_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
