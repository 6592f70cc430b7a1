//! Best-effort parsing of loosely typed ingestion data. Every parser here resolves malformed
//! input to `None` (or an empty sequence) instead of failing, so that a bad value only ever
//! affects the field it sits in.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::record::FormResult;

/// Interprets a JSON value as a finite number. Numeric strings are accepted with an optional
/// trailing `%`. A lone comma is a decimal separator (`"1,85"`); otherwise commas must group
/// thousands (`"1,234.5"`). `NaN`, infinities and anything else are rejected.
pub fn number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(s) => decimal(s.trim().trim_end_matches('%').trim_end()),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn decimal(s: &str) -> Option<f64> {
    static GROUPED: OnceLock<Regex> = OnceLock::new();
    match s.matches(',').count() {
        0 => s.parse().ok(),
        1 if !s.contains('.') => s.replacen(',', ".", 1).parse().ok(),
        _ => {
            let grouped = GROUPED
                .get_or_init(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());
            if grouped.is_match(s) {
                s.replace(',', "").parse().ok()
            } else {
                None
            }
        }
    }
}

/// Interprets a JSON value as a positive integer, e.g. a ranking.
pub fn positive_integer(value: &Value) -> Option<u32> {
    let number = number(value)?;
    (number >= 1.0 && number <= u32::MAX as f64).then_some(number.round() as u32)
}

/// Interprets a JSON value as a non-blank string. Numbers are rendered in their JSON form.
pub fn text(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Parses a form sequence given either as a list (`["W", "d", "Loss"]`) or as a string
/// (`"W,D L"`, `"['W', 'L']"`). Only the first character of each token is significant;
/// unrecognised tokens are dropped.
pub fn form(value: &Value) -> Vec<FormResult> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| text(item).and_then(|token| FormResult::parse(&token)))
            .collect(),
        Value::String(s) => form_str(s),
        _ => vec![],
    }
}

pub fn form_str(s: &str) -> Vec<FormResult> {
    s.split(|c: char| c == ',' || c.is_whitespace() || matches!(c, '[' | ']' | '\'' | '"'))
        .filter_map(FormResult::parse)
        .collect()
}

/// Extracts a pair of goal/set counts from a score string such as `"2:1"`, `"0 - 3"` or
/// `"2-1 (1-0)"`. The first pair found wins.
pub fn score(s: &str) -> Option<(u32, u32)> {
    static SCORE: OnceLock<Regex> = OnceLock::new();
    let regex = SCORE.get_or_init(|| Regex::new(r"(\d+)\s*[:\-]\s*(\d+)").unwrap());
    let captures = regex.captures(s)?;
    let first = captures[1].parse().ok()?;
    let second = captures[2].parse().ok()?;
    Some((first, second))
}

/// Parses an encounter date in `dd.mm.yy`, `dd.mm.yyyy` or ISO `yyyy-mm-dd` form. Two-digit years
/// up to 50 are placed in the 2000s, later ones in the 1900s.
pub fn date(s: &str) -> Option<NaiveDate> {
    static DOTTED: OnceLock<Regex> = OnceLock::new();
    static ISO: OnceLock<Regex> = OnceLock::new();
    let dotted = DOTTED.get_or_init(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{2,4})").unwrap());
    let iso = ISO.get_or_init(|| Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").unwrap());

    if let Some(captures) = iso.captures(s) {
        let year = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let day = captures[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let captures = dotted.captures(s)?;
    let day = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let mut year: i32 = captures[3].parse().ok()?;
    if captures[3].len() == 2 {
        year += if year <= 50 { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Serde adapters that never fail on a field's content; a value of the wrong shape
/// deserializes as absent.
pub mod de {
    use rustc_hash::FxHashMap;

    use super::*;
    use crate::record::Encounter;

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Option::<Value>::deserialize(deserializer)
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(raw(deserializer)?.as_ref().and_then(super::number))
    }

    pub fn positive_integer<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        Ok(raw(deserializer)?.as_ref().and_then(super::positive_integer))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(raw(deserializer)?.as_ref().and_then(super::text))
    }

    pub fn form<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<FormResult>, D::Error> {
        Ok(raw(deserializer)?
            .as_ref()
            .map(super::form)
            .unwrap_or_default())
    }

    pub fn encounters<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Encounter>>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::Array(items)) => Some(items.iter().filter_map(Encounter::from_value).collect()),
            _ => None,
        })
    }

    pub fn rates<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FxHashMap<String, f64>>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::Object(entries)) => Some(
                entries
                    .iter()
                    .filter_map(|(key, value)| {
                        super::number(value).map(|rate| (key.trim().to_lowercase(), rate))
                    })
                    .collect(),
            ),
            _ => None,
        })
    }
}
