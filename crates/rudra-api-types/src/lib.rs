//! Wire types for the GraphQL data API consumed by the RUDRA console.
//!
//! The data API is a Hasura-style GraphQL endpoint. Its responses are loosely
//! typed (ids may be integers or strings, `numeric` columns may arrive as
//! strings, `timestamp` columns may lack an offset), so every row type here
//! decodes leniently into one strict shape.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

/// Body of a GraphQL POST request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: V,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl GraphQlErrorEntry {
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().and_then(|ext| ext.code.as_deref())
    }
}

/// Operation without variables; serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

/// Identifier that the data API may encode either as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(String);

impl WireId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for WireId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WireId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Ok(Self(value.to_string())),
            Raw::Float(value) => Ok(Self(value.to_string())),
            Raw::Text(value) => Ok(Self(value)),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AuditTrailData {
    #[serde(default)]
    pub audit_trail: Vec<AuditTrailRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditTrailRow {
    #[serde(with = "timestamp")]
    pub timestamp: OffsetDateTime,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub event_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub performed_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantUsageData {
    #[serde(default)]
    pub data_usage: Vec<TenantUsageRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantUsageRow {
    pub id: WireId,
    pub tenant_id: WireId,
    #[serde(default, deserialize_with = "lenient_number")]
    pub data_used: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyUsageData {
    #[serde(default)]
    pub daily_data_usage: Vec<DailyUsageRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyUsageRow {
    #[serde(deserialize_with = "calendar_date")]
    pub recorded_on: Date,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_data_used: f64,
}

/// Variables of the `Users` lookup issued at login.
#[derive(Debug, Clone, Serialize)]
pub struct UserByEmailVariables<'a> {
    #[serde(rename = "_eq")]
    pub email: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersData {
    #[serde(rename = "Users", default)]
    pub users: Vec<UserRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    pub id: WireId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertUserVariables<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertUsersData {
    #[serde(rename = "insert_Users")]
    pub insert_users: Option<InsertUsersReturning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertUsersReturning {
    #[serde(default)]
    pub returning: Vec<InsertedUserRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsertedUserRow {
    pub id: WireId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub username: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypenameData {
    #[serde(rename = "__typename")]
    pub typename: String,
}

// ---------------------------------------------------------------------------
// Lenient decoders
// ---------------------------------------------------------------------------

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid number `{text}`: {err}"))),
        Raw::Null(()) => Ok(0.0),
    }
}

fn calendar_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

/// Parse `YYYY-MM-DD`, or the date part of a full timestamp.
pub fn parse_calendar_date(raw: &str) -> Result<Date, String> {
    let trimmed = raw.trim();
    let date_format = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(trimmed, date_format) {
        return Ok(date);
    }
    parse_timestamp(trimmed).map(OffsetDateTime::date)
}

/// Parse an RFC 3339 timestamp, falling back to an offset-less timestamp
/// interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, String> {
    let trimmed = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(value);
    }

    let naive_format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    let spaced_format = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );

    PrimitiveDateTime::parse(trimmed, naive_format)
        .or_else(|_| PrimitiveDateTime::parse(trimmed, spaced_format))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|err| format!("invalid timestamp `{trimmed}`: {err}"))
}

pub mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = value
            .format(&Rfc3339)
            .map_err(|err| serde::ser::Error::custom(err.to_string()))?;
        serializer.serialize_str(&formatted)
    }
}
