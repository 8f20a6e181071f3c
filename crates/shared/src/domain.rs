use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::{error::ParseIdError, time};

/// Wire form of an identifier. Stored records carry numbers while form
/// input and some backends hand out numeric strings; both collapse into the
/// same canonical id when decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_i64(self, kind: &'static str) -> Result<i64, ParseIdError> {
        match self {
            RawId::Int(value) => Ok(value),
            RawId::Text(text) => parse_id(kind, &text),
        }
    }
}

fn parse_id(kind: &'static str, input: &str) -> Result<i64, ParseIdError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseIdError::new(kind, input))
}

macro_rules! id_newtype {
    ($name:ident, $kind:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "RawId")]
        pub struct $name(pub i64);

        impl TryFrom<RawId> for $name {
            type Error = ParseIdError;

            fn try_from(raw: RawId) -> Result<Self, Self::Error> {
                raw.into_i64($kind).map(Self)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id($kind, s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EventId, "event");
id_newtype!(CategoryId, "category");
id_newtype!(UserId, "user");

/// Absent and `null` both decode to the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One element of a record list, decoded on its own so a malformed entry can
/// be dropped without losing its neighbours.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Record<T> {
    Valid(T),
    Malformed(IgnoredAny),
}

/// Keeps the records that decoded, logging how many were dropped.
pub fn keep_valid<T>(records: Vec<Record<T>>, kind: &'static str) -> Vec<T> {
    let total = records.len();
    let valid: Vec<T> = records
        .into_iter()
        .filter_map(|record| match record {
            Record::Valid(value) => Some(value),
            Record::Malformed(_) => None,
        })
        .collect();
    if valid.len() < total {
        warn!(kind, skipped = total - valid.len(), "domain: skipping malformed records");
    }
    valid
}

/// `null_as_default` for record lists, dropping entries that fail to decode.
pub(crate) fn valid_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let records = Option::<Vec<Record<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(keep_valid(records, std::any::type_name::<T>()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(
        default,
        with = "time::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "time::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_ids: Vec<CategoryId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
}

impl Event {
    pub fn has_category(&self, category_id: CategoryId) -> bool {
        self.category_ids.contains(&category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}
