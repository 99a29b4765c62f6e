// src/process/period.rs

//! Reporting-period extraction from free text.
//!
//! Source documents phrase their date ranges inconsistently, so no single
//! strict pattern covers the variants. Patterns are tried in decreasing
//! specificity and the first one that both matches and parses wins; a
//! strategy that matches structurally but fails to parse passes the text on
//! to the next one. Ambiguous or malformed text yields `(None, None)`,
//! never an error.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Separators accepted between the two halves of a range.
const SEPARATOR: &str = r"\s+(?:to|through|until|[-–—])\s+";

static DMY_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(\d{{1,2}}\s+[A-Za-z]+\s+\d{{4}}){SEPARATOR}(\d{{1,2}}\s+[A-Za-z]+\s+\d{{4}})"
    ))
    .unwrap()
});

static NUMERIC_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(\d{{1,2}}[/\-]\d{{1,2}}[/\-]\d{{4}}){SEPARATOR}(\d{{1,2}}[/\-]\d{{1,2}}[/\-]\d{{4}})"
    ))
    .unwrap()
});

static MONTH_YEAR_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)([A-Za-z]+\s+\d{{4}}){SEPARATOR}([A-Za-z]+\s+\d{{4}})"
    ))
    .unwrap()
});

static SINGLE_DMY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}\s+[A-Za-z]+\s+\d{4})").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One pattern strategy: recognizes some structure in the text and parses
/// it, or reports failure so the next strategy gets a try.
type PatternStrategy = fn(&str) -> Option<(NaiveDate, Option<NaiveDate>)>;

/// Decreasing specificity; first success wins.
const STRATEGIES: &[PatternStrategy] = &[
    day_month_year_range,
    numeric_range,
    month_year_range,
    single_day_month_year,
];

/// Extract a (start, end) reporting period in canonical `"YYYYMMDD"` form
/// from free text. End may be absent; both are absent when nothing matched.
pub fn parse_period_text(text: &str) -> (Option<String>, Option<String>) {
    let normalized = WHITESPACE_RE.replace_all(text.trim(), " ").into_owned();
    if normalized.is_empty() {
        return (None, None);
    }
    for strategy in STRATEGIES {
        if let Some((start, end)) = strategy(&normalized) {
            return (Some(canonical(start)), end.map(canonical));
        }
    }
    (None, None)
}

fn canonical(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// "1 December 2023 to 29 February 2024" — day-first, month by name.
fn day_month_year_range(text: &str) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let caps = DMY_RANGE_RE.captures(text)?;
    let start = parse_day_month_year(&caps[1])?;
    let end = parse_day_month_year(&caps[2])?;
    ordered(start, end)
}

/// "01/12/2023 to 29/02/2024" — day-first numeric dates.
fn numeric_range(text: &str) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let caps = NUMERIC_RANGE_RE.captures(text)?;
    let start = parse_numeric(&caps[1])?;
    let end = parse_numeric(&caps[2])?;
    ordered(start, end)
}

/// "December 2023 to February 2024" — no day given, defaults to the 1st.
fn month_year_range(text: &str) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let caps = MONTH_YEAR_RANGE_RE.captures(text)?;
    let start = parse_day_month_year(&format!("1 {}", &caps[1]))?;
    let end = parse_day_month_year(&format!("1 {}", &caps[2]))?;
    ordered(start, end)
}

/// A lone "1 December 2023" anywhere in the text: start only.
fn single_day_month_year(text: &str) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let caps = SINGLE_DMY_RE.captures(text)?;
    parse_day_month_year(&caps[1]).map(|date| (date, None))
}

/// A reversed range is a failed parse; start ≤ end holds for every range
/// this module reports.
fn ordered(start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, Option<NaiveDate>)> {
    (start <= end).then_some((start, Some(end)))
}

fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    // %B accepts full and abbreviated month names, case-insensitively.
    NaiveDate::parse_from_str(text.trim(), "%d %B %Y").ok()
}

fn parse_numeric(text: &str) -> Option<NaiveDate> {
    let t = text.trim();
    NaiveDate::parse_from_str(t, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(t, "%d-%m-%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> (Option<String>, Option<String>) {
        parse_period_text(text)
    }

    #[test]
    fn day_month_year_range_day_first() {
        assert_eq!(
            parsed("1 December 2023 to 29 February 2024"),
            (Some("20231201".into()), Some("20240229".into()))
        );
    }

    #[test]
    fn abbreviated_months_and_noise() {
        assert_eq!(
            parsed("Reporting period: 1 Jun 2023 to 30 Nov 2023 (all venues)"),
            (Some("20230601".into()), Some("20231130".into()))
        );
    }

    #[test]
    fn dash_separators() {
        assert_eq!(
            parsed("1 June 2022 - 30 November 2022"),
            (Some("20220601".into()), Some("20221130".into()))
        );
        assert_eq!(
            parsed("1 June 2022 – 30 November 2022"),
            (Some("20220601".into()), Some("20221130".into()))
        );
    }

    #[test]
    fn numeric_dates_day_first() {
        assert_eq!(
            parsed("01/12/2023 to 29/02/2024"),
            (Some("20231201".into()), Some("20240229".into()))
        );
        assert_eq!(
            parsed("1-7-2021 until 31-12-2021"),
            (Some("20210701".into()), Some("20211231".into()))
        );
    }

    #[test]
    fn month_year_range_defaults_to_first() {
        assert_eq!(
            parsed("December 2023 through February 2024"),
            (Some("20231201".into()), Some("20240201".into()))
        );
    }

    #[test]
    fn single_date_is_start_only() {
        assert_eq!(
            parsed("Premises list as at 1 July 2024"),
            (Some("20240701".into()), None)
        );
    }

    #[test]
    fn collapsed_whitespace() {
        assert_eq!(
            parsed("  1   June\t2023   to   30  November 2023 "),
            (Some("20230601".into()), Some("20231130".into()))
        );
    }

    #[test]
    fn no_pattern_yields_none() {
        assert_eq!(parsed("Report Summary"), (None, None));
        assert_eq!(parsed(""), (None, None));
        assert_eq!(parsed("   "), (None, None));
    }

    #[test]
    fn invalid_dates_yield_none() {
        // "31 June" never parses; every strategy that sees it fails and
        // nothing later in the chain recognizes the text.
        assert_eq!(parsed("31 June 2023 to 30 November 2023"), (None, None));
    }

    #[test]
    fn reversed_range_is_rejected() {
        // The range strategies refuse end < start; the single-date strategy
        // then reports the first date as a bare start.
        assert_eq!(
            parsed("30 November 2023 to 1 June 2023"),
            (Some("20231130".into()), None)
        );
    }

    #[test]
    fn ranges_are_ordered() {
        for text in [
            "1 December 2016 to 31 May 2017",
            "1 Jul 2018 to 31 Dec 2018",
            "January 2020 to June 2020",
            "01/01/2022 to 30/06/2022",
        ] {
            let (start, end) = parsed(text);
            let (start, end) = (start.unwrap(), end.unwrap());
            assert!(start <= end, "{text}: {start} > {end}");
        }
    }
}
