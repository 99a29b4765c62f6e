// src/process/columns.rs

//! Column-name compaction: verbose spreadsheet headers become short,
//! lowercase, underscore-separated identifiers safe for storage.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrase-level substitutions, applied in order before any tokenization so
/// multi-word phrases are recognized whole.
const PHRASE_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("local government area", "lga"),
    ("government", "gov"),
    ("venue", "ven"),
    ("trading", "trd"),
    ("number", "num"),
    ("electronic", "elec"),
    ("gaming", "gam"),
    ("machine", "mach"),
    ("monthly", "mon"),
    ("expenditure", "expend"),
    ("average", "avg"),
    ("statistics", "stats"),
    ("statistical", "stat"),
    ("division", "div"),
    ("postcode", "pcode"),
    ("liquor", "liq"),
    ("licence", "lic"),
    ("premises", "prem"),
    ("count", "cnt"),
    ("population", "pop"),
    ("per 100k", "per_100k"),
];

static AS_AT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"as at.*$").unwrap());
static PARENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static UNDERSCORE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Compact a raw header label into a storage-safe column identifier.
///
/// Returns an empty string when the input holds nothing but punctuation and
/// whitespace; callers fall back to positional names since a table schema
/// cannot hold a blank column.
pub fn normalize_column_name(raw: &str) -> String {
    let mut name = raw.to_lowercase().trim().to_string();
    name = AS_AT_RE.replace(&name, "").trim().to_string();
    for (phrase, short) in PHRASE_SUBSTITUTIONS {
        name = name.replace(phrase, short);
    }
    name = PARENS_RE.replace_all(&name, "").into_owned();
    name = PUNCT_RE.replace_all(&name, "").into_owned();
    name = WHITESPACE_RE.replace_all(&name, "_").into_owned();
    name = UNDERSCORE_RUN_RE.replace_all(&name, "_").into_owned();
    name.trim_matches('_').to_string()
}
