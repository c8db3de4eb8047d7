//! Type-normalized cell values.
//!
//! Every cell carries a [`CompareValue`] derived from its display string by
//! the owning field's [`DataType`](super::DataType). Sorting, range filters
//! and predicates compare these values, never the display strings.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Canonical date format used when a compare value is turned back into text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical time format.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
/// Canonical timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// The comparable value of a cell.
///
/// Temporal variants hold `None` when the source text could not be parsed;
/// absent values order before any present value.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareValue {
    /// Text data (string and insensitive-string fields, untyped fields).
    Text(String),
    /// Integer data.
    Int(i64),
    /// Floating point data. Never NaN: conversion maps NaN to `0.0`.
    Float(f64),
    /// Calendar date.
    Date(Option<NaiveDate>),
    /// Time of day.
    Time(Option<NaiveTime>),
    /// Date and time.
    Timestamp(Option<NaiveDateTime>),
    /// Boolean data.
    Bool(bool),
}

impl Default for CompareValue {
    fn default() -> Self {
        CompareValue::Text(String::new())
    }
}

impl CompareValue {
    /// Orders two compare values.
    ///
    /// Values of the same kind compare naturally (floats by IEEE total order).
    /// Integers and floats compare numerically with each other. Any other
    /// mix of kinds orders by kind so the ordering stays total.
    pub fn compare(&self, other: &Self) -> Ordering {
        use CompareValue::*;
        match (self, other) {
            (Text(a), Text(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Date(a), Date(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// Returns `true` if both values compare equal.
    pub fn same_as(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    fn kind_rank(&self) -> u8 {
        match self {
            CompareValue::Bool(_) => 0,
            CompareValue::Int(_) | CompareValue::Float(_) => 1,
            CompareValue::Date(_) => 2,
            CompareValue::Time(_) => 3,
            CompareValue::Timestamp(_) => 4,
            CompareValue::Text(_) => 5,
        }
    }

    /// Returns the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CompareValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is numeric.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CompareValue::Int(n) => Some(*n),
            CompareValue::Float(n) => Some(*n as i64),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CompareValue::Int(n) => Some(*n as f64),
            CompareValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CompareValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `true` for empty text and absent temporal values.
    pub fn is_empty(&self) -> bool {
        match self {
            CompareValue::Text(s) => s.is_empty(),
            CompareValue::Date(d) => d.is_none(),
            CompareValue::Time(t) => t.is_none(),
            CompareValue::Timestamp(t) => t.is_none(),
            _ => false,
        }
    }

    /// Canonical text for this value.
    ///
    /// Feeding the canonical text back through the conversion of the data
    /// type that produced the value yields the same value.
    pub fn canonical(&self) -> String {
        match self {
            CompareValue::Text(s) => s.clone(),
            CompareValue::Int(n) => n.to_string(),
            CompareValue::Float(n) => n.to_string(),
            CompareValue::Date(d) => d
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            CompareValue::Time(t) => t
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default(),
            CompareValue::Timestamp(t) => t
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            CompareValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for CompareValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for CompareValue {
    fn from(s: &str) -> Self {
        CompareValue::Text(s.to_string())
    }
}

impl From<String> for CompareValue {
    fn from(s: String) -> Self {
        CompareValue::Text(s)
    }
}

impl From<i64> for CompareValue {
    fn from(n: i64) -> Self {
        CompareValue::Int(n)
    }
}

impl From<f64> for CompareValue {
    fn from(n: f64) -> Self {
        CompareValue::Float(if n.is_nan() { 0.0 } else { n })
    }
}

impl From<bool> for CompareValue {
    fn from(b: bool) -> Self {
        CompareValue::Bool(b)
    }
}

impl From<NaiveDate> for CompareValue {
    fn from(d: NaiveDate) -> Self {
        CompareValue::Date(Some(d))
    }
}
