//! Portuguese free-text date normalization
//!
//! Converts the date expressions found in extracted schedules into canonical
//! `YYYY-MM-DD` strings:
//!
//! ```
//! use chrono::NaiveDate;
//! use congregacao_common::DateNormalizer;
//!
//! let dates = DateNormalizer::with_today(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
//! assert_eq!(dates.normalize("sábado, 4 de outubro").iso, "2024-10-04");
//! assert_eq!(dates.normalize("04/10/2024").iso, "2024-10-04");
//! assert_eq!(dates.normalize("2024-10-11").iso, "2024-10-11");
//! ```
//!
//! Patterns are tried in priority order:
//! 1. ISO passthrough (`2024-10-04`)
//! 2. `[weekday,] <day> de <month>[ de <year>]`
//! 3. `<day>/<month>/<year>`
//! 4. `<day>/<month>`
//!
//! A missing year always resolves to the current year. Input that matches
//! nothing resolves to today and is flagged through [`NormalizedDate::fell_back`].

use chrono::{Datelike, Local, NaiveDate};
use tracing::warn;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Full month names and three-letter abbreviations
const MONTHS: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("fevereiro", 2),
    ("março", 3),
    ("marco", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
    ("jan", 1),
    ("fev", 2),
    ("mar", 3),
    ("abr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("set", 9),
    ("out", 10),
    ("nov", 11),
    ("dez", 12),
];

/// Result of a normalization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    /// Canonical `YYYY-MM-DD`
    pub iso: String,
    /// True when no pattern matched and `iso` is today's date
    pub fell_back: bool,
}

/// Date normalizer with an injectable "today"
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    today: Option<NaiveDate>,
}

impl DateNormalizer {
    /// Normalizer that reads the local clock on every call
    pub fn new() -> Self {
        Self { today: None }
    }

    /// Normalizer pinned to a fixed "today" (year inference and fallback)
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Normalize `input`, falling back to today when nothing matches
    pub fn normalize(&self, input: &str) -> NormalizedDate {
        match self.try_parse(input) {
            Some(date) => NormalizedDate {
                iso: date.format(ISO_FORMAT).to_string(),
                fell_back: false,
            },
            None => {
                let today = self.today();
                warn!(input = %input, fallback = %today, "Unparseable date, using today");
                NormalizedDate {
                    iso: today.format(ISO_FORMAT).to_string(),
                    fell_back: true,
                }
            }
        }
    }

    /// Parse `input` without falling back
    pub fn try_parse(&self, input: &str) -> Option<NaiveDate> {
        let trimmed = input.trim();
        if looks_like_iso(trimmed) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_FORMAT) {
                return Some(date);
            }
        }

        let lower = trimmed.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        let current_year = self.today().year();
        parse_textual(&tokens, current_year)
            .or_else(|| parse_slashed(&tokens, 3, current_year))
            .or_else(|| parse_slashed(&tokens, 2, current_year))
    }

    /// First day of a program week from its period label
    ///
    /// Handles `"6-12 de outubro"`, `"6 a 12 de outubro"` and
    /// `"30 de setembro - 6 de outubro"`. Never falls back to today.
    pub fn parse_week_start(&self, periodo: &str) -> Option<NaiveDate> {
        if looks_like_iso(periodo.trim()) {
            return self.try_parse(periodo);
        }
        let lower = periodo
            .trim()
            .to_lowercase()
            .replace(['–', '—'], "-")
            .replace(" a ", "-");
        let first = lower.split('-').next()?.trim();

        // "30 de setembro - 6 de outubro": the first segment is a full date
        if let Some(date) = self.try_parse(first) {
            return Some(date);
        }

        // "6-12 de outubro": take month/year from the end of the range
        let start_day: u32 = first.parse().ok()?;
        let end = self.try_parse(&lower.replace('-', " "))?;
        if start_day <= end.day() {
            NaiveDate::from_ymd_opt(end.year(), end.month(), start_day)
        } else {
            let (year, month) = if end.month() == 1 {
                (end.year() - 1, 12)
            } else {
                (end.year(), end.month() - 1)
            };
            NaiveDate::from_ymd_opt(year, month, start_day)
        }
    }
}

/// Normalize with the local clock; see [`DateNormalizer::normalize`]
pub fn parse_portuguese_date(input: &str) -> String {
    DateNormalizer::new().normalize(input).iso
}

fn looks_like_iso(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn month_number(token: &str) -> Option<u32> {
    let token = token.trim_end_matches('.');
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, number)| *number)
}

fn parse_day(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches(['º', 'o', '.']);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_year(token: &str) -> Option<i32> {
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match token.len() {
        4 => token.parse().ok(),
        2 => token.parse::<i32>().ok().map(|y| 2000 + y),
        _ => None,
    }
}

/// `<day> de <month>[ de <year>]`, anywhere in the token stream
fn parse_textual(tokens: &[&str], current_year: i32) -> Option<NaiveDate> {
    tokens.windows(3).enumerate().find_map(|(i, window)| {
        let day = parse_day(window[0])?;
        if window[1] != "de" {
            return None;
        }
        let month = month_number(window[2])?;
        let year = match (tokens.get(i + 3), tokens.get(i + 4)) {
            (Some(&"de"), Some(year)) => parse_year(year).unwrap_or(current_year),
            _ => current_year,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// `<day>/<month>/<year>` (parts = 3) or `<day>/<month>` (parts = 2)
fn parse_slashed(tokens: &[&str], parts: usize, current_year: i32) -> Option<NaiveDate> {
    tokens.iter().find_map(|token| {
        let pieces: Vec<&str> = token.split('/').collect();
        if pieces.len() != parts {
            return None;
        }
        let day = parse_day(pieces[0])?;
        let month: u32 = parse_day(pieces[1])?;
        let year = if parts == 3 {
            parse_year(pieces[2])?
        } else {
            current_year
        };
        NaiveDate::from_ymd_opt(year, month, day)
    })
}
