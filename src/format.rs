// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Fixed-precision number and date formatting used on certificates.

use chrono::{DateTime, NaiveDate};

/// Rounds half away from zero to the given number of decimals.
///
/// # Examples
///
/// ```
/// use labcert::format::round_to;
/// assert_eq!(round_to(2518.5185, 0), 2519.0);
/// assert_eq!(round_to(8.125, 2), 8.13);
/// ```
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    // too large to carry a fractional part at this precision
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    // avoid "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formats `value` with exactly `decimals` digits after the point.
///
/// Non-finite values print as zero.
///
/// # Examples
///
/// ```
/// use labcert::format::fixed;
/// assert_eq!(fixed(20.0, 1), "20.0");
/// assert_eq!(fixed(f64::NAN, 1), "0.0");
/// ```
pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, round_to(value, decimals))
}

/// Formats a rounded integer (areas, densities).
pub fn integer(value: f64) -> String {
    fixed(value, 0)
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Renders a stored date as `DD/MM/YYYY`; unparseable input is returned unchanged.
pub fn display_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Whole days from casting to testing, when both dates parse and testing is not earlier.
pub fn age_in_days(casting: &str, testing: &str) -> Option<i64> {
    let days = (parse_date(testing)? - parse_date(casting)?).num_days();
    (days >= 0).then_some(days)
}
