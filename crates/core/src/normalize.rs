use std::sync::OnceLock;

use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_digit_run, r"[\d,]+");
re!(re_leading_digits, r"^\d+");
// Dates like 2026-01-15 / 2026/1/6 / 2026年1月 must not read as prices.
re!(re_date_like, r"\d{4}[-/年]\d{1,2}[-/月]");
// Switchboard numbers like 072-123-4567.
re!(re_phone_like, r"\d{2,4}-\d{2,4}-\d{4}");

// ── Text cleanup ─────────────────────────────────────────────────────────────

/// Trim and fold full-width (ideographic) spaces into ASCII spaces.
pub fn clean_text(s: &str) -> String {
    s.trim().replace('\u{3000}', " ")
}

// ── Numeric normalization ────────────────────────────────────────────────────

/// Dates like `2026-01-15` or `2026年1月` — never prices.
pub fn is_date_like(s: &str) -> bool {
    re_date_like().is_match(s)
}

/// Switchboard numbers like `072-123-4567` — never prices.
pub fn is_phone_like(s: &str) -> bool {
    re_phone_like().is_match(s)
}

/// Parse a currency-like string into whole yen.
///
/// `"¥1,234-"`, `"1,234"` and `"1234"` all yield 1234. Date-like and
/// phone-number-like text yields 0, as does anything without digits —
/// normalization failures recover locally, they never propagate.
pub fn parse_price(s: &str) -> i64 {
    if is_date_like(s) || is_phone_like(s) {
        return 0;
    }
    re_digit_run()
        .find(s)
        .and_then(|m| m.as_str().replace(',', "").parse::<i64>().ok())
        .unwrap_or(0)
}

/// Parse a quantity: the leading run of digits, 0 when absent.
pub fn parse_quantity(s: &str) -> i64 {
    re_leading_digits()
        .find(s.trim())
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Whether the whole string is a bare integer token.
pub fn is_bare_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
