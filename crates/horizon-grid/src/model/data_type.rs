//! Column data types and their conversion functions.
//!
//! A field's [`DataType`] turns the raw text of a cell into a display string
//! and a [`CompareValue`]. Each conversion is total: text that does not parse
//! yields the type's fallback value and is reported as invalid, so a bad cell
//! never aborts a load.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::value::CompareValue;
use crate::error::GridError;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%d %b %Y", "%b %d, %Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const TRUE_TOKENS: &[&str] = &["true", "yes", "y", "1", "on", "checked"];
const FALSE_TOKENS: &[&str] = &["false", "no", "n", "0", "off", ""];

/// The data type of a field.
///
/// Fields without a data type pass their raw text through unchanged as a
/// text compare value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Trimmed, case-sensitive text.
    String,
    /// Trimmed text compared case-insensitively.
    #[serde(alias = "istring", alias = "insensitive-string")]
    InsensitiveString,
    /// 64-bit integer. Unparseable text becomes 0.
    #[serde(alias = "integer")]
    Int,
    /// 64-bit float. Unparseable text and NaN become 0.
    #[serde(alias = "number", alias = "double")]
    Float,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time (also accepts RFC 3339 and unix seconds).
    #[serde(alias = "datetime")]
    Timestamp,
    /// Boolean from yes/no style tokens.
    #[serde(alias = "bool")]
    Boolean,
    /// Boolean from `t`/`f` tokens.
    #[serde(alias = "bool-tf")]
    BooleanTf,
}

/// The outcome of converting one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Text shown for the cell.
    pub display: String,
    /// Value used for sorting, range filters and predicates.
    pub value: CompareValue,
    /// `false` if the text did not parse and a fallback value was used.
    pub valid: bool,
}

impl Conversion {
    fn new(display: String, value: CompareValue, valid: bool) -> Self {
        Self {
            display,
            value,
            valid,
        }
    }
}

impl DataType {
    /// All built-in data types.
    pub const ALL: [DataType; 9] = [
        DataType::String,
        DataType::InsensitiveString,
        DataType::Int,
        DataType::Float,
        DataType::Date,
        DataType::Time,
        DataType::Timestamp,
        DataType::Boolean,
        DataType::BooleanTf,
    ];

    /// Stable name of the type, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::InsensitiveString => "insensitivestring",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
            DataType::Boolean => "boolean",
            DataType::BooleanTf => "booleantf",
        }
    }

    /// Returns `true` for types whose compare values are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }

    /// Converts raw cell text.
    pub fn convert(&self, raw: &str) -> Conversion {
        let text = raw.trim();
        match self {
            DataType::String => {
                Conversion::new(text.to_string(), CompareValue::Text(text.to_string()), true)
            }
            DataType::InsensitiveString => Conversion::new(
                text.to_string(),
                CompareValue::Text(text.to_lowercase()),
                true,
            ),
            DataType::Int => {
                let parsed = parse_int(text);
                Conversion::new(
                    text.to_string(),
                    CompareValue::Int(parsed.unwrap_or(0)),
                    parsed.is_some() || text.is_empty(),
                )
            }
            DataType::Float => {
                let parsed = parse_float(text);
                Conversion::new(
                    text.to_string(),
                    CompareValue::from(parsed.unwrap_or(0.0)),
                    parsed.is_some() || text.is_empty(),
                )
            }
            DataType::Date => {
                let parsed = parse_date(text);
                Conversion::new(
                    text.to_string(),
                    CompareValue::Date(parsed),
                    parsed.is_some() || text.is_empty(),
                )
            }
            DataType::Time => {
                let parsed = parse_time(text);
                Conversion::new(
                    text.to_string(),
                    CompareValue::Time(parsed),
                    parsed.is_some() || text.is_empty(),
                )
            }
            DataType::Timestamp => {
                let parsed = parse_timestamp(text);
                Conversion::new(
                    text.to_string(),
                    CompareValue::Timestamp(parsed),
                    parsed.is_some() || text.is_empty(),
                )
            }
            DataType::Boolean => {
                let token = text.to_lowercase();
                let truthy = TRUE_TOKENS.contains(&token.as_str());
                let valid = truthy || FALSE_TOKENS.contains(&token.as_str());
                Conversion::new(text.to_string(), CompareValue::Bool(truthy), valid)
            }
            DataType::BooleanTf => {
                let token = text.to_lowercase();
                let truthy = token == "t" || token == "true";
                let valid = truthy || token == "f" || token == "false" || token.is_empty();
                Conversion::new(text.to_string(), CompareValue::Bool(truthy), valid)
            }
        }
    }
}

/// Converts raw text through an optional data type.
///
/// Untyped fields keep the raw text verbatim as both display and compare value.
pub fn convert_with(data_type: Option<DataType>, raw: &str) -> Conversion {
    match data_type {
        Some(data_type) => data_type.convert(raw),
        None => Conversion::new(raw.to_string(), CompareValue::Text(raw.to_string()), true),
    }
}

fn strip_grouping(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

fn parse_int(text: &str) -> Option<i64> {
    let cleaned = strip_grouping(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok().or_else(|| {
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64)
    })
}

fn parse_float(text: &str) -> Option<f64> {
    let cleaned = strip_grouping(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact_date(text);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| parse_timestamp(text).map(|ts| ts.date()))
}

/// `YYYYMMDD`; other digit-only text is not a date.
fn parse_compact_date(text: &str) -> Option<NaiveDate> {
    if text.len() != 8 {
        return None;
    }
    let year = text[..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    if text.is_empty() {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Some(ts) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|ts| ts.naive_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "string" | "text" => Ok(DataType::String),
            "insensitivestring" | "istring" => Ok(DataType::InsensitiveString),
            "int" | "integer" => Ok(DataType::Int),
            "float" | "number" | "double" => Ok(DataType::Float),
            "date" => Ok(DataType::Date),
            "time" => Ok(DataType::Time),
            "timestamp" | "datetime" => Ok(DataType::Timestamp),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "booleantf" | "booltf" => Ok(DataType::BooleanTf),
            _ => Err(GridError::unknown_data_type(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(data_type: DataType, raw: &str) -> CompareValue {
        data_type.convert(raw).value
    }

    #[test]
    fn test_string_trims() {
        let conv = DataType::String.convert("  Alice ");
        assert_eq!(conv.display, "Alice");
        assert_eq!(conv.value, CompareValue::from("Alice"));
        assert!(conv.valid);
    }

    #[test]
    fn test_insensitive_string_lowercases_compare_value_only() {
        let conv = DataType::InsensitiveString.convert("McDonald");
        assert_eq!(conv.display, "McDonald");
        assert_eq!(conv.value, CompareValue::from("mcdonald"));
    }

    #[test]
    fn test_int_parsing() {
        assert_eq!(value(DataType::Int, "42"), CompareValue::Int(42));
        assert_eq!(value(DataType::Int, "1,200"), CompareValue::Int(1200));
        assert_eq!(value(DataType::Int, "-7"), CompareValue::Int(-7));
        assert_eq!(value(DataType::Int, "3.9"), CompareValue::Int(3));

        let bad = DataType::Int.convert("abc");
        assert_eq!(bad.value, CompareValue::Int(0));
        assert!(!bad.valid);

        assert!(DataType::Int.convert("").valid);
    }

    #[test]
    fn test_float_parsing() {
        assert_eq!(value(DataType::Float, "2.5"), CompareValue::Float(2.5));
        assert_eq!(value(DataType::Float, "NaN"), CompareValue::Float(0.0));
        assert!(!DataType::Float.convert("NaN").valid);
        assert!(!DataType::Float.convert("n/a").valid);
    }

    #[test]
    fn test_date_formats() {
        let expected = CompareValue::from(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(value(DataType::Date, "2024-02-29"), expected);
        assert_eq!(value(DataType::Date, "02/29/2024"), expected);
        assert_eq!(value(DataType::Date, "29.02.2024"), expected);
        assert_eq!(value(DataType::Date, "2024-02-29 10:00:00"), expected);
        assert_eq!(value(DataType::Date, "not a date"), CompareValue::Date(None));
    }

    #[test]
    fn test_digit_only_dates() {
        let compact = DataType::Date.convert("20240101");
        assert!(compact.valid);
        assert_eq!(
            compact.value,
            CompareValue::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );

        let short = DataType::Date.convert("123");
        assert!(!short.valid);
        assert_eq!(short.value, CompareValue::Date(None));
        assert!(!DataType::Date.convert("20241399").valid);
    }

    #[test]
    fn test_time_formats() {
        let expected = CompareValue::Time(NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(value(DataType::Time, "14:30"), expected);
        assert_eq!(value(DataType::Time, "02:30 PM"), expected);
        assert_eq!(value(DataType::Time, "14:30:00"), expected);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            value(DataType::Timestamp, "2021-06-01 12:00:00"),
            CompareValue::Timestamp(Some(expected))
        );
        assert_eq!(
            value(DataType::Timestamp, "2021-06-01T12:00:00Z"),
            CompareValue::Timestamp(Some(expected))
        );
        assert_eq!(
            value(DataType::Timestamp, "1622548800"),
            CompareValue::Timestamp(Some(expected))
        );
    }

    #[test]
    fn test_boolean_tokens() {
        assert_eq!(value(DataType::Boolean, "Yes"), CompareValue::Bool(true));
        assert_eq!(value(DataType::Boolean, "1"), CompareValue::Bool(true));
        assert_eq!(value(DataType::Boolean, "no"), CompareValue::Bool(false));
        assert!(!DataType::Boolean.convert("maybe").valid);

        assert_eq!(value(DataType::BooleanTf, "T"), CompareValue::Bool(true));
        assert_eq!(value(DataType::BooleanTf, "f"), CompareValue::Bool(false));
        assert_eq!(value(DataType::BooleanTf, "yes"), CompareValue::Bool(false));
    }

    #[test]
    fn test_untyped_passthrough_keeps_whitespace() {
        let conv = convert_with(None, "  raw ");
        assert_eq!(conv.display, "  raw ");
        assert_eq!(conv.value, CompareValue::from("  raw "));
    }

    #[test]
    fn test_conversion_is_idempotent_for_every_type() {
        let samples = [
            " Mixed Case ",
            "1,234",
            "-17.25",
            "2023-12-31",
            "07/04/2021",
            "23:59:58.125",
            "2020-01-02 03:04:05.5",
            "1700000000",
            "yes",
            "T",
            "garbage",
            "",
        ];
        for data_type in DataType::ALL {
            for raw in samples {
                let first = data_type.convert(raw).value;
                let second = data_type.convert(&first.canonical()).value;
                assert_eq!(first, second, "{data_type} not idempotent for {raw:?}");
            }
        }
    }

    #[test]
    fn test_from_str_names() {
        for data_type in DataType::ALL {
            assert_eq!(data_type.name().parse::<DataType>().unwrap(), data_type);
        }
        assert_eq!("insensitive-string".parse::<DataType>().unwrap(), DataType::InsensitiveString);
        assert!("currency".parse::<DataType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let parsed: DataType = serde_json::from_str("\"booleantf\"").unwrap();
        assert_eq!(parsed, DataType::BooleanTf);
        let parsed: DataType = serde_json::from_str("\"istring\"").unwrap();
        assert_eq!(parsed, DataType::InsensitiveString);
    }
}
