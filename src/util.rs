// Parsing and formatting helpers.
//
// Backend exports arrive either as JSON (numbers may be quoted) or as CSV
// (everything is text), so every numeric or boolean field goes through the
// forgiving parsers and deserializers below. Anything unusable becomes
// `None` and is defaulted by the caller.
use chrono::{DateTime, NaiveDate};
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::hash::Hash;

/// Parse a string-like value into `f64`, tolerating whitespace and
/// thousands separators. Values containing letters are rejected.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    // Counts sometimes come through as "3.0"; truncate rather than reject.
    parse_f64_safe(s).map(|v| v.trunc() as i64)
}

/// Parse a calendar date. Accepts `YYYY-MM-DD`, RFC 3339 timestamps and any
/// string that starts with a `YYYY-MM-DD` prefix (`2025-01-15 08:30:00`).
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// `part / total * 100` rounded to one decimal, or `None` when the total is
/// zero and the ratio is not computable.
pub fn percent_of(part: f64, total: f64) -> Option<f64> {
    if total == 0.0 || !total.is_finite() || !part.is_finite() {
        return None;
    }
    Some(round1(part / total * 100.0))
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `75.0%`, or `n/a` when the percentage could not be computed.
pub fn format_pct(p: &Option<f64>) -> String {
    match p {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

pub fn format_amount(v: &f64) -> String {
    format_number(*v, 2)
}

/// Insertion-ordered grouping: groups come out in first-seen order so a
/// stable sort afterwards breaks ties by encounter order.
pub fn group_ordered<T, K, A, FK, FA>(items: &[T], key_of: FK, mut fold: FA) -> Vec<(K, A)>
where
    K: Eq + Hash + Clone,
    A: Default,
    FK: Fn(&T) -> K,
    FA: FnMut(&mut A, &T),
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, A)> = Vec::new();
    for item in items {
        let key = key_of(item);
        let slot = match index.get(&key) {
            Some(i) => *i,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, A::default()));
                groups.len() - 1
            }
        };
        fold(&mut groups[slot].1, item);
    }
    groups
}

// ---- lenient serde adapters -------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

pub fn de_opt_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Loose>::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        Loose::Int(n) => Some(n as f64),
        Loose::Float(n) if n.is_finite() => Some(n),
        Loose::Text(s) => parse_f64_safe(Some(&s)),
        _ => None,
    }))
}

pub fn de_opt_i64<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Loose>::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        Loose::Int(n) => Some(n),
        Loose::Float(n) if n.is_finite() => Some(n.trunc() as i64),
        Loose::Text(s) => parse_i64_safe(Some(&s)),
        _ => None,
    }))
}

pub fn de_opt_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Loose>::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        Loose::Bool(b) => Some(b),
        Loose::Int(n) => Some(n != 0),
        Loose::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Loose::Float(_) => None,
    }))
}

/// Identifiers may be numeric in JSON and text in CSV.
pub fn de_opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Loose>::deserialize(d)?;
    Ok(v.map(|v| match v {
        Loose::Bool(b) => b.to_string(),
        Loose::Int(n) => n.to_string(),
        Loose::Float(n) => n.to_string(),
        Loose::Text(s) => s,
    }))
}
