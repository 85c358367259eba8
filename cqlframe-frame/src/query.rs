//! Query model handed over by the query layer.
//!
//! The requested output format historically arrived in several shapes: a
//! string token, a numeric enum code, or an already-typed [`Format`]. All of
//! them are normalized to [`Format`] once, when the model is built or
//! deserialized.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Requested output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    TimeSeries,
    #[default]
    Table,
    Logs,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::TimeSeries => "time_series",
            Format::Table => "table",
            Format::Logs => "logs",
        }
    }

    /// Numeric code: 0 time series, 1 table, 2 logs.
    pub fn code(&self) -> u32 {
        match self {
            Format::TimeSeries => 0,
            Format::Table => 1,
            Format::Logs => 2,
        }
    }

    /// Any code other than 0 or 2 is a table.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Format::TimeSeries,
            2 => Format::Logs,
            _ => Format::Table,
        }
    }

    /// `"time_series"` and `"logs"` are recognised; any other token is a table.
    pub fn from_token(token: &str) -> Self {
        match token {
            "time_series" => Format::TimeSeries,
            "logs" => Format::Logs,
            _ => Format::Table,
        }
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Read through `serde_json::Value`: numbers arrive as exact-number tokens
// rather than plain integers, which untagged enums cannot match.
impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(Format::from(raw.and_then(|value| FormatInput::from_json(&value))))
    }
}

/// Format as it appears on the wire before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatInput {
    Code(u32),
    Token(String),
}

impl FormatInput {
    /// Numbers outside `u32` and non-scalar values are not a format.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(token) => Some(FormatInput::Token(token.clone())),
            JsonValue::Number(number) => number
                .as_u64()
                .and_then(|code| u32::try_from(code).ok())
                .map(FormatInput::Code),
            _ => None,
        }
    }
}

impl From<FormatInput> for Format {
    fn from(input: FormatInput) -> Self {
        match input {
            FormatInput::Code(code) => Format::from_code(code),
            FormatInput::Token(token) => Format::from_token(&token),
        }
    }
}

impl From<Option<FormatInput>> for Format {
    fn from(input: Option<FormatInput>) -> Self {
        input.map(Format::from).unwrap_or_default()
    }
}

impl From<&Format> for Format {
    fn from(format: &Format) -> Self {
        *format
    }
}

impl From<&str> for Format {
    fn from(token: &str) -> Self {
        Format::from_token(token)
    }
}

impl From<u32> for Format {
    fn from(code: u32) -> Self {
        Format::from_code(code)
    }
}

impl From<Format> for FormatInput {
    fn from(format: Format) -> Self {
        FormatInput::Token(format.as_str().to_string())
    }
}

/// One query as seen by the frame builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryModel {
    /// Query text as written by the user; inspected for `ORDER BY`.
    #[serde(default)]
    pub raw_cql: String,
    /// Query text actually executed after macro expansion.
    #[serde(default)]
    pub actual_cql: String,
    #[serde(default)]
    pub format: Format,
}

impl QueryModel {
    pub fn new(
        raw_cql: impl Into<String>,
        actual_cql: impl Into<String>,
        format: impl Into<Format>,
    ) -> Self {
        Self {
            raw_cql: raw_cql.into(),
            actual_cql: actual_cql.into(),
            format: format.into(),
        }
    }

    /// Model whose raw and executed text are the same.
    pub fn for_query(cql: impl Into<String>, format: impl Into<Format>) -> Self {
        let cql = cql.into();
        Self::new(cql.clone(), cql, format)
    }

    pub fn from_json(json: &str) -> cqlframe_result::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the user already asked for an ordering.
    pub fn is_ordered(&self) -> bool {
        self.raw_cql.to_lowercase().contains("order by")
    }
}
