//! Answer-equivalence scorer
//!
//! A tie-break cascade over lower-cased, trimmed inputs:
//!
//! 1. grouped numbers (`1,234.50`, `$12`, `.5`) compare numerically
//! 2. anything else holding `;` or `,` compares as an unordered list
//! 3. inputs that both contain a number compare numerically
//! 4. everything else compares as text (exact, single-word subset, fuzzy)
//!
//! Grouped numbers are checked first so that `1,234` is never read as a
//! two-item list.

use super::sequence_matcher::similarity_ratio;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Fuzzy text comparison passes strictly above this ratio
const FUZZY_THRESHOLD: f64 = 0.95;

static GROUPED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?([0-9]{1,3}(,[0-9]{3})*(\.[0-9]+)?|\.[0-9]+)$").expect("valid regex")
});
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]*\.[0-9]+|[0-9]+\.?[0-9]*)%?").expect("valid regex"));
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]").expect("valid regex"));
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w]").expect("valid regex"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

/// Returns true when `candidate` and `reference` denote the same answer.
pub fn question_scorer(candidate: &str, reference: &str) -> bool {
    let a = candidate.trim().to_lowercase();
    let b = reference.trim().to_lowercase();

    if is_grouped_number(&a) || is_grouped_number(&b) {
        return match (extract_numeric(&a), extract_numeric(&b)) {
            (Some(x), Some(y)) => compare_numeric(x, y),
            _ => false,
        };
    }

    if a.contains([';', ',']) || b.contains([';', ',']) {
        return compare_lists(&a, &b);
    }

    if let (Some(x), Some(y)) = (extract_numeric(&a), extract_numeric(&b)) {
        return compare_numeric(x, y);
    }

    compare_strings(&a, &b)
}

fn is_grouped_number(value: &str) -> bool {
    GROUPED_NUMBER.is_match(value.trim())
}

/// First float-like value after dropping grouping commas and `$`.
///
/// Only ASCII digits count; `f64::from_str` rejects other decimal digits.
fn extract_numeric(value: &str) -> Option<f64> {
    let cleaned = value.replace([',', '$'], "");
    let captures = NUMBER.captures(&cleaned)?;
    captures.get(1)?.as_str().parse().ok()
}

fn compare_numeric(x: f64, y: f64) -> bool {
    if x == y {
        return true;
    }

    // proportions and percentages
    if x < 1.0 && y < 1.0 {
        return is_close(x, y, 1e-2, 1e-4);
    }

    let places = decimal_places(x).min(decimal_places(y));
    if round_to(x, places) == round_to(y, places) {
        return true;
    }

    is_close(x, y, 1e-2, 1e-2)
}

fn is_close(x: f64, y: f64, rel_tol: f64, abs_tol: f64) -> bool {
    (x - y).abs() <= (rel_tol * x.abs().max(y.abs())).max(abs_tol)
}

/// Digits after the point in the shortest round-trip rendering (`100.0` has one)
fn decimal_places(value: f64) -> usize {
    let rendered = format!("{value:?}");
    rendered.split_once('.').map_or(0, |(_, frac)| frac.len())
}

fn round_to(value: f64, places: usize) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round_ties_even() / factor
}

fn compare_lists(a: &str, b: &str) -> bool {
    let mut left = split_list(a);
    let mut right = split_list(b);
    left.sort_unstable();
    right.sort_unstable();

    if left == right {
        return true;
    }
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right.iter())
        .all(|(x, y)| question_scorer(x, y))
}

fn split_list(value: &str) -> Vec<&str> {
    let value = value.trim();
    let value = value.strip_prefix('[').unwrap_or(value);
    let value = value.strip_suffix(']').unwrap_or(value);

    LIST_SEPARATOR
        .split(value)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn compare_strings(a: &str, b: &str) -> bool {
    if NON_WORD.replace_all(a, "") == NON_WORD.replace_all(b, "") {
        return true;
    }

    let words_a: Vec<&str> = WORD.find_iter(a).map(|m| m.as_str()).collect();
    let words_b: Vec<&str> = WORD.find_iter(b).map(|m| m.as_str()).collect();

    if (words_a.len() == 1 || words_b.len() == 1) && !words_a.is_empty() && !words_b.is_empty() {
        let set_a: HashSet<&str> = words_a.into_iter().collect();
        let set_b: HashSet<&str> = words_b.into_iter().collect();
        return set_a.is_subset(&set_b) || set_b.is_subset(&set_a);
    }

    fuzzy_ratio(a, b) > FUZZY_THRESHOLD
}

/// Similarity taken in both directions. Popular-character pruning only
/// applies to the second sequence, so one order can miss a match.
fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    similarity_ratio(a, b).max(similarity_ratio(b, a))
}
