use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Opaque session identifier.
///
/// The backend sends numeric ids, but nothing here relies on that: numbers
/// and strings are both accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Kind of training slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Individual,
    Group,
}

impl SessionType {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Individual => "individual",
            SessionType::Group => "group",
        }
    }
}

/// View-only predicate on [`SessionType`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Individual,
    Group,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 3] = [TypeFilter::All, TypeFilter::Individual, TypeFilter::Group];

    pub fn matches(self, session_type: SessionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Individual => session_type == SessionType::Individual,
            TypeFilter::Group => session_type == SessionType::Group,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Individual => "individual",
            TypeFilter::Group => "group",
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "individual" => Ok(TypeFilter::Individual),
            "group" => Ok(TypeFilter::Group),
            other => Err(format!("unknown session type filter: {other:?}")),
        }
    }
}

/// Booking counts of a group session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participants {
    pub current: u32,
    pub max: u32,
}

impl Participants {
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

/// A single bookable time slot as published by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,

    /// Calendar date; any time-of-day suffix on the wire is ignored
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,

    #[serde(with = "time_of_day")]
    pub start_time: NaiveTime,

    #[serde(with = "time_of_day")]
    pub end_time: NaiveTime,

    #[serde(rename = "type")]
    pub session_type: SessionType,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub trainer_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Only meaningful for group sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Participants>,

    #[serde(default)]
    pub is_cancelled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Session {
    pub fn new(
        id: SessionId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        session_type: SessionType,
    ) -> Self {
        Self {
            id,
            date,
            start_time,
            end_time,
            session_type,
            trainer_name: String::new(),
            program_name: None,
            participants: None,
            is_cancelled: false,
            description: None,
        }
    }

    /// `HH:MM–HH:MM`, as shown in the grid and the detail overlay
    pub fn time_range(&self) -> String {
        format!(
            "{}–{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }

    /// Participant counts, but only where they mean something
    pub fn group_participants(&self) -> Option<Participants> {
        match self.session_type {
            SessionType::Group => self.participants,
            SessionType::Individual => None,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `YYYY-MM-DD`, tolerating `T00:00:00`-style suffixes on input
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let date_part = raw.trim().get(..10).unwrap_or(raw.trim());
        NaiveDate::parse_from_str(date_part, FORMAT)
            .map_err(|e| de::Error::custom(format!("invalid session date {raw:?}: {e}")))
    }
}

/// `HH:MM` or `HH:MM:SS` on input, `HH:MM` on output
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|e| de::Error::custom(format!("invalid session time {raw:?}: {e}")))
    }
}
