use std::sync::OnceLock;

use regex::Regex;

use mitsumori_core::normalize::{is_date_like, is_phone_like, parse_price};
use mitsumori_core::ExtractConfig;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Uppercase-letter-prefixed alphanumeric codes like TEM2521_70.
re!(re_part_no, r"[A-Z]+\d+[_\-0-9A-Z]*");
// Digit/comma run closing the line, optionally with a trailing dash marker.
re!(re_price_line, r"([\d,]+)-?$");
// A whole line that is nothing but a currency-like token.
re!(re_price_token, r"^[¥￥]?[\d,]+(?:\.\d+)?[-－]?$");
// Leading separator junk OCR leaves between a part number and the name.
re!(re_leading_junk, r"^[_:|\- ]+");
// Two or more consecutive Kana/Kanji characters.
re!(re_kana_kanji, r"[ぁ-んァ-ン一-龥]{2,}");

// ── Line classes ─────────────────────────────────────────────────────────────

/// How a single OCR output line reads, by token shape alone — the rasterizer
/// destroyed all column geometry, so shape is all there is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// An item code opening a new record; `rest` is whatever followed the
    /// code on the same line, usually the start of the item name.
    PartNoStart { part_no: String, rest: String },
    /// A currency magnitude in yen.
    Price(i64),
    /// Japanese text, a candidate item name.
    NameFragment,
}

/// Classify one line against the ordered rule list; the first matching rule
/// decides. Returns `None` when no rule applies.
pub fn classify_line(line: &str, config: &ExtractConfig) -> Option<LineClass> {
    if let Some((part_no, rest)) = part_no_start(line, config.min_part_no_len) {
        return Some(LineClass::PartNoStart { part_no, rest });
    }
    if let Some(value) = price_line(line, config.min_ocr_price) {
        return Some(LineClass::Price(value));
    }
    if re_kana_kanji().is_match(line) {
        return Some(LineClass::NameFragment);
    }
    None
}

/// Rule 1: part-number start. The code must be at least `min_len` long;
/// anything shorter is more likely a unit or a stray token.
pub fn part_no_start(line: &str, min_len: usize) -> Option<(String, String)> {
    let found = re_part_no().find(line)?;
    let part_no = found.as_str();
    if part_no.len() < min_len {
        return None;
    }
    let rest = line.replacen(part_no, "", 1);
    let rest = re_leading_junk().replace(rest.trim(), "").to_string();
    Some((part_no.to_string(), rest))
}

/// Rule 2: price line. Dates and phone numbers carry digit runs of the same
/// shape and are excluded outright; values at or below `min_price` are
/// quantities or counters misread as prices.
fn price_line(line: &str, min_price: i64) -> Option<i64> {
    if is_phone_like(line) || is_date_like(line) {
        return None;
    }
    let caps = re_price_line().captures(line)?;
    let value = parse_price(caps.get(1)?.as_str());
    (value > min_price).then_some(value)
}

/// Whether a whole line is a single currency-like token (`1,500-`, `¥500`).
/// Used by the vertical strategy to spot unit-price/amount pairs.
pub fn is_price_token(line: &str) -> bool {
    re_price_token().is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<LineClass> {
        classify_line(line, &ExtractConfig::default())
    }

    // ── Part numbers ─────────────────────────────────────────────────────────

    #[test]
    fn part_number_start_line() {
        match classify("TEM2521_70") {
            Some(LineClass::PartNoStart { part_no, rest }) => {
                assert_eq!(part_no, "TEM2521_70");
                assert_eq!(rest, "");
            }
            other => panic!("unexpected class: {other:?}"),
        }
    }

    #[test]
    fn part_number_with_trailing_name() {
        match classify("TEM2521 | カバー") {
            Some(LineClass::PartNoStart { part_no, rest }) => {
                assert_eq!(part_no, "TEM2521");
                assert_eq!(rest, "カバー");
            }
            other => panic!("unexpected class: {other:?}"),
        }
    }

    #[test]
    fn short_codes_are_not_part_numbers() {
        // "M6" is a thread size, not an item code.
        assert_eq!(classify("M6"), None);
    }

    // ── Prices ───────────────────────────────────────────────────────────────

    #[test]
    fn price_line_with_comma_and_dash() {
        assert_eq!(classify("9,000-"), Some(LineClass::Price(9000)));
        assert_eq!(classify("50,100"), Some(LineClass::Price(50100)));
    }

    #[test]
    fn phone_numbers_are_not_prices() {
        assert_eq!(classify("072-123-4567"), None);
        assert_eq!(classify("06-1234-5678"), None);
    }

    #[test]
    fn dates_are_not_prices() {
        assert_eq!(classify("2026/01/15"), None);
        assert_eq!(classify("2026年1月"), None);
    }

    #[test]
    fn small_magnitudes_are_not_prices() {
        // Bare quantities must not be misread as prices.
        assert_eq!(classify("2"), None);
        assert_eq!(classify("100"), None);
    }

    // ── Name fragments ───────────────────────────────────────────────────────

    #[test]
    fn kana_kanji_lines_are_name_fragments() {
        assert_eq!(classify("カバー"), Some(LineClass::NameFragment));
        assert_eq!(classify("取付金具"), Some(LineClass::NameFragment));
    }

    #[test]
    fn single_kana_character_is_not_a_name() {
        assert_eq!(classify("個"), None);
    }

    #[test]
    fn latin_noise_matches_nothing() {
        assert_eq!(classify("page 1 of 2"), None);
    }

    // ── Rule ordering ────────────────────────────────────────────────────────

    #[test]
    fn part_number_rule_wins_over_name_rule() {
        // A line with both a code and Kana text opens a record.
        match classify("TEM2521 カバー") {
            Some(LineClass::PartNoStart { .. }) => {}
            other => panic!("unexpected class: {other:?}"),
        }
    }

    // ── Price tokens ─────────────────────────────────────────────────────────

    #[test]
    fn price_token_forms() {
        assert!(is_price_token("1,500-"));
        assert!(is_price_token("¥500"));
        assert!(is_price_token("1"));
        assert!(!is_price_token("個"));
        assert!(!is_price_token("1,500円"));
    }
}
