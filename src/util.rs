// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" cell/number/date handling so the
// rest of the code can assume clean, typed values.
use crate::types::RawValue;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric view of a cell, `None` when blank or not a number.
pub fn raw_number(v: Option<&RawValue>) -> Option<f64> {
    match v? {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Number(_) | RawValue::Blank => None,
        RawValue::Text(s) => parse_f64_safe(Some(s)),
    }
}

/// Numeric coercion used for amounts: anything unparseable becomes `0`.
pub fn coerce_number(v: Option<&RawValue>) -> f64 {
    raw_number(v).unwrap_or(0.0)
}

/// Earliest year a parsed date may carry. `%Y` also accepts one to three
/// digit years, so `05/01/24` would otherwise land in year 24.
pub const MIN_YEAR: i32 = 1900;

/// Parse a date string against each layout in turn. Layouts carrying a
/// time component are matched as date-times and truncated to the day.
/// A match before [`MIN_YEAR`] is discarded and the next layout is tried.
pub fn parse_date_safe<S: AsRef<str>>(s: Option<&str>, layouts: &[S]) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    layouts.iter().find_map(|layout| {
        let layout = layout.as_ref();
        NaiveDate::parse_from_str(s, layout)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(s, layout).ok().map(|dt| dt.date()))
            .filter(|d| d.year() >= MIN_YEAR)
    })
}

/// Spreadsheet serial day number (days since 1899-12-30) to a date.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    // 1 = 1899-12-31, 2958465 = 9999-12-31
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Date view of a cell: text goes through the layouts, numbers are treated
/// as spreadsheet serials.
pub fn raw_date<S: AsRef<str>>(v: Option<&RawValue>, layouts: &[S]) -> Option<NaiveDate> {
    match v? {
        RawValue::Text(s) => parse_date_safe(Some(s), layouts),
        RawValue::Number(n) => date_from_serial(*n),
        RawValue::Blank => None,
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize, locale: &Locale) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware digit grouping (e.g., `12,34,567.89` for en-IN).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // `u128` covers every integer an f64 amount realistically reaches;
    // beyond that the digits are grouped by hand.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(locale),
        Err(_) => group_digits(int_part, locale),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push_str(locale.decimal());
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Group a plain digit string by the locale's separator and grouping
/// (`Standard` 3-3-3 or `Indian` 3-2-2).
fn group_digits(digits: &str, locale: &Locale) -> String {
    let sep = locale.separator();
    let indian = matches!(locale.grouping(), num_format::Grouping::Indian);
    let mut out: Vec<char> = Vec::with_capacity(digits.len() * 2);
    for (i, c) in digits.chars().rev().enumerate() {
        let boundary = if indian { i == 3 || (i > 3 && i % 2 == 1) } else { i > 0 && i % 3 == 0 };
        if boundary && !sep.is_empty() {
            out.extend(sep.chars().rev());
        }
        out.push(c);
    }
    out.into_iter().rev().collect()
}

pub fn format_int<T>(n: T, locale: &Locale) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(locale)
}

/// Integer-rounded, grouped amount with the currency symbol in front
/// (`-₹1,200` for negatives).
pub fn format_currency(n: f64, symbol: &str, locale: &Locale) -> String {
    let grouped = format_number(n, 0, locale);
    match grouped.strip_prefix('-') {
        Some(rest) => format!("-{}{}", symbol, rest),
        None => format!("{}{}", symbol, grouped),
    }
}
