// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure natural-language date/time extraction for Spanish customer messages.
//!
//! All functions are pure and exception-free: absence of a match returns
//! `None`, never an error. Input is normalized (lowercased, accents folded)
//! before matching, so "miércoles" and "miercoles" behave identically.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

/// Spanish weekday names (accent-folded), Monday first.
const WEEKDAYS: &[(&str, Weekday)] = &[
    ("lunes", Weekday::Mon),
    ("martes", Weekday::Tue),
    ("miercoles", Weekday::Wed),
    ("jueves", Weekday::Thu),
    ("viernes", Weekday::Fri),
    ("sabado", Weekday::Sat),
    ("domingo", Weekday::Sun),
];

/// Spanish month names (accent-folded), January first.
const MONTHS: &[&str] = &[
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

static WEEKS_AHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\ben (\d{1,2}) semanas?\b").unwrap());

static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").unwrap());

static DAY_OF_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d{1,2}) de (enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|octubre|noviembre|diciembre)\b",
    )
    .unwrap()
});

static TIME_12H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?::([0-5]\d))?\s*(am|pm)\b").unwrap());

static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());

/// Day-part terms mapped to representative times, accepted only behind a
/// qualifying preposition ("por la tarde", "al mediodia"). The guard keeps
/// "mañana" (tomorrow) from being read as "in the morning".
static DAY_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:por|en|de|a) la (tarde|noche)\b|\b(?:al|por el|para el) (mediodia)\b")
        .unwrap()
});

/// Folds accented Spanish characters to their ASCII base and lowercases.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}

/// Extracts a date from free text relative to `reference`.
///
/// Recognizes, in order:
/// 1. Keyword offsets: hoy=0, mañana=1, pasado mañana=2, esta semana=0,
///    próxima/siguiente semana=7, "en N semanas"=7N days ahead.
/// 2. Weekday names, resolved to the next strictly future occurrence (a
///    weekday matching the reference date means one week ahead).
/// 3. Explicit `D/M[/YY[YY]]` or `D de <month>`. When no year is given and
///    the computed date precedes `reference`, the year rolls forward by one.
pub fn parse_relative_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let text = normalize(text);

    // Keyword offsets. "pasado manana" must win over plain "manana".
    if text.contains("pasado manana") {
        return reference.checked_add_days(Days::new(2));
    }
    if text.contains("manana") {
        return reference.checked_add_days(Days::new(1));
    }
    if text.contains("hoy") || text.contains("esta semana") {
        return Some(reference);
    }
    if text.contains("proxima semana") || text.contains("siguiente semana") {
        return reference.checked_add_days(Days::new(7));
    }
    if let Some(caps) = WEEKS_AHEAD.captures(&text) {
        let n: u64 = caps[1].parse().ok()?;
        return reference.checked_add_days(Days::new(7 * n));
    }

    // Weekday names resolve strictly into the future.
    for (name, weekday) in WEEKDAYS {
        if word_match(&text, name) {
            let ahead = (weekday.num_days_from_monday() + 7
                - reference.weekday().num_days_from_monday())
                % 7;
            let ahead = if ahead == 0 { 7 } else { u64::from(ahead) };
            return reference.checked_add_days(Days::new(ahead));
        }
    }

    // Explicit D/M[/Y].
    if let Some(caps) = NUMERIC_DATE.captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = caps.get(3).map(|y| parse_year(y.as_str()));
        return resolve_explicit(day, month, year, reference);
    }

    // "D de <month>".
    if let Some(caps) = DAY_OF_MONTH.captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month = MONTHS.iter().position(|m| *m == &caps[2])? as u32 + 1;
        return resolve_explicit(day, month, None, reference);
    }

    None
}

/// Extracts a time of day from free text.
///
/// Recognizes 12h forms (`5pm`, `5:30 pm`; 12am→00:00, 12pm→12:00), 24h
/// `HH:MM`, and preposition-guarded day parts (tarde→15:00, noche→19:00,
/// mediodía→12:00).
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = normalize(&text.replace("a.m.", "am").replace("p.m.", "pm"));

    // 12h with am/pm marker has to win over the bare HH:MM scan, or
    // "5:30 pm" would resolve as 05:30.
    if let Some(caps) = TIME_12H.captures(&text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let hour = match &caps[3] {
            "am" if hour == 12 => 0,
            "pm" if hour < 12 => hour + 12,
            _ => hour,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = TIME_24H.captures(&text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some(caps) = DAY_PART.captures(&text) {
        let term = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())?;
        let hour = match term {
            "tarde" => 15,
            "noche" => 19,
            "mediodia" => 12,
            _ => return None,
        };
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    None
}

/// Whole-word containment check on normalized text.
fn word_match(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn parse_year(raw: &str) -> i32 {
    let y: i32 = raw.parse().unwrap_or(0);
    if raw.len() == 2 { 2000 + y } else { y }
}

/// Builds an explicit date, rolling the year forward when no year was given
/// and the computed date already passed.
fn resolve_explicit(
    day: u32,
    month: u32,
    year: Option<i32>,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    match year {
        Some(y) => NaiveDate::from_ymd_opt(y, month, day),
        None => {
            let candidate = NaiveDate::from_ymd_opt(reference.year(), month, day)?;
            if candidate < reference {
                NaiveDate::from_ymd_opt(reference.year() + 1, month, day)
            } else {
                Some(candidate)
            }
        }
    }
}
