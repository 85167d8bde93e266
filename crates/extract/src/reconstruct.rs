use std::sync::OnceLock;

use regex::Regex;

use mitsumori_core::normalize::{clean_text, parse_price, parse_quantity};
use mitsumori_core::{ExtractConfig, LineItem, NameMergePolicy, Strategy};

use crate::classify::{classify_line, is_price_token, part_no_start, LineClass};

// One item per line: <name> <qty> <unit> <unit-price> <amount>.
fn re_horizontal() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(concat!(
            r"(.*?)\s+(\d+)\s+([^\s\d]+)\s+",
            r"([¥￥]?[\d,]+(?:\.\d+)?[-－]?)\s+([¥￥]?[\d,]+(?:\.\d+)?[-－]?)$",
        ))
        .expect("invalid regex")
    })
}

/// Rebuild line items from OCR text lines.
///
/// Runs the configured strategies in order and returns the first non-empty
/// result. Layout is gone by the time text reaches here, so each strategy
/// bets on a different serialization of the source table: one item per line,
/// one field per line, or an interleaved stream keyed by part numbers.
pub fn reconstruct(lines: &[String], config: &ExtractConfig, source: &str) -> Vec<LineItem> {
    let lines: Vec<String> = lines
        .iter()
        .map(|l| clean_text(l))
        .filter(|l| !l.is_empty())
        .collect();

    for strategy in &config.strategies {
        let items = match strategy {
            Strategy::Horizontal => horizontal(&lines, source),
            Strategy::Vertical => vertical(&lines, config, source),
            Strategy::Accumulate => accumulate(&lines, config, source),
        };
        if !items.is_empty() {
            tracing::debug!(?strategy, count = items.len(), "reconstruction strategy matched");
            return items;
        }
    }
    Vec::new()
}

// ── Horizontal: one item per line ────────────────────────────────────────────

/// Preferred when it applies: every matching line is a complete record with
/// quantity, unit and both prices trailing the name.
fn horizontal(lines: &[String], source: &str) -> Vec<LineItem> {
    let mut items = Vec::new();
    for line in lines {
        let Some(caps) = re_horizontal().captures(line) else {
            continue;
        };
        let name = caps[1].trim();
        // A one-character name is noise, not an item.
        if name.chars().count() <= 1 {
            continue;
        }
        let mut item = LineItem::new(source);
        item.name = name.to_string();
        item.quantity = parse_quantity(&caps[2]);
        item.unit = caps[3].to_string();
        item.unit_price = parse_price(&caps[4]);
        item.amount = parse_price(&caps[5]);
        items.push(item);
    }
    items
}

// ── Vertical: one field per line ─────────────────────────────────────────────

/// Fallback for OCR dumps where each table cell became its own line, order
/// preserved. Anchors on two consecutive currency tokens (unit price then
/// amount), then walks backward: unit one line up, bare-integer quantity two
/// lines up, and up to two earlier lines as the name/model fragments.
fn vertical(lines: &[String], config: &ExtractConfig, source: &str) -> Vec<LineItem> {
    let mut items = Vec::new();
    let mut i = 0usize;

    while i + 1 < lines.len() {
        if !(is_price_token(&lines[i]) && is_price_token(&lines[i + 1])) {
            i += 1;
            continue;
        }

        let (qty, unit) = match (i.checked_sub(2), i.checked_sub(1)) {
            (Some(qty_idx), Some(unit_idx))
                if mitsumori_core::normalize::is_bare_integer(&lines[qty_idx]) =>
            {
                (parse_quantity(&lines[qty_idx]), lines[unit_idx].clone())
            }
            _ => {
                i += 1;
                continue;
            }
        };

        let mut item = LineItem::new(source);
        item.quantity = qty;
        item.unit = unit;
        item.unit_price = parse_price(&lines[i]);
        item.amount = parse_price(&lines[i + 1]);

        let start = i.saturating_sub(4);
        let mut name_parts: Vec<String> = Vec::new();
        for fragment in &lines[start..i - 2] {
            match part_no_start(fragment, config.min_part_no_len) {
                Some((part_no, rest)) if item.part_no.is_empty() => {
                    item.part_no = part_no;
                    if !rest.is_empty() {
                        name_parts.push(rest);
                    }
                }
                _ => name_parts.push(fragment.clone()),
            }
        }
        item.name = name_parts.join(" ");

        items.push(item);
        i += 2;
    }

    items
}

// ── Accumulate: interleaved stream keyed by part numbers ─────────────────────

enum State {
    Idle,
    Accumulating(LineItem),
}

impl State {
    /// Flush transition: keep the in-progress record only when it identifies
    /// a part or carries an amount; bare fragments are discarded.
    fn flush_into(self, items: &mut Vec<LineItem>) {
        if let State::Accumulating(item) = self {
            if item.has_substance() {
                items.push(item);
            } else {
                tracing::debug!(?item, "discarding partial record");
            }
        }
    }
}

/// Single forward pass over classified lines. A part-number line flushes the
/// in-progress record and opens a new one; price lines fill unit price then
/// amount; name fragments fill the name under the configured merge policy.
/// End of input flushes whatever is pending under the same substance rule.
fn accumulate(lines: &[String], config: &ExtractConfig, source: &str) -> Vec<LineItem> {
    let mut items = Vec::new();
    let mut state = State::Idle;

    for line in lines {
        match classify_line(line, config) {
            Some(LineClass::PartNoStart { part_no, rest }) => {
                std::mem::replace(&mut state, State::Idle).flush_into(&mut items);
                let mut item = LineItem::new(source);
                item.part_no = part_no;
                if !rest.is_empty() {
                    item.name = rest;
                }
                state = State::Accumulating(item);
            }
            Some(LineClass::Price(value)) => match &mut state {
                State::Accumulating(item) => {
                    if item.unit_price == 0 {
                        item.unit_price = value;
                    } else if item.amount == 0 {
                        item.amount = value;
                    }
                }
                State::Idle => {
                    // A price with no part number yet still opens a record —
                    // OCR sometimes drops the code line entirely.
                    let mut item = LineItem::new(source);
                    item.unit_price = value;
                    state = State::Accumulating(item);
                }
            },
            Some(LineClass::NameFragment) => {
                if let State::Accumulating(item) = &mut state {
                    if !item.part_no.is_empty() {
                        merge_name(&mut item.name, line, config.name_policy);
                    }
                }
            }
            None => {}
        }
    }

    state.flush_into(&mut items);
    items
}

fn merge_name(name: &mut String, fragment: &str, policy: NameMergePolicy) {
    match policy {
        NameMergePolicy::FirstWins => {
            if name.is_empty() {
                *name = fragment.to_string();
            }
        }
        NameMergePolicy::Append => {
            if name.is_empty() {
                *name = fragment.to_string();
            } else {
                name.push(' ');
                name.push_str(fragment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn config() -> ExtractConfig {
        ExtractConfig::default()
    }

    // ── Horizontal ───────────────────────────────────────────────────────────

    #[test]
    fn horizontal_single_line_item() {
        let input = lines(&["カバー取付 2 個 1,500 3,000"]);
        let items = reconstruct(&input, &config(), "a.pdf");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.name, "カバー取付");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit, "個");
        assert_eq!(item.unit_price, 1500);
        assert_eq!(item.amount, 3000);
    }

    #[test]
    fn horizontal_skips_trivial_names() {
        let input = lines(&["x 2 個 1,500 3,000"]);
        let items = horizontal(&input, "a.pdf");
        assert!(items.is_empty());
    }

    #[test]
    fn horizontal_wins_over_vertical_when_it_matches() {
        // One matching line means the whole page is single-line-per-item.
        let input = lines(&["ブラケット 4 個 250 1,000", "1,500-", "1,500"]);
        let items = reconstruct(&input, &config(), "a.pdf");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "ブラケット");
    }

    // ── Vertical ─────────────────────────────────────────────────────────────

    #[test]
    fn vertical_block_scenario() {
        let input = lines(&["TEM2521_70", "カバー01", "1", "個", "1,500-", "1,500"]);
        let items = vertical(&input, &config(), "b.pdf");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.part_no, "TEM2521_70");
        assert_eq!(item.name, "カバー01");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit, "個");
        assert_eq!(item.unit_price, 1500);
        assert_eq!(item.amount, 1500);
    }

    #[test]
    fn vertical_without_quantity_advances() {
        // Two prices with no preceding bare-integer quantity: no record.
        let input = lines(&["カバー", "個", "1,500-", "1,500"]);
        assert!(vertical(&input, &config(), "b.pdf").is_empty());
    }

    #[test]
    fn vertical_consumes_price_pair_and_continues() {
        let input = lines(&[
            "TEM2521_70", "カバー01", "1", "個", "1,500-", "1,500",
            "TEM2521_71", "カバー02", "2", "個", "2,000-", "4,000",
        ]);
        let items = vertical(&input, &config(), "b.pdf");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].part_no, "TEM2521_70");
        assert_eq!(items[1].part_no, "TEM2521_71");
        assert_eq!(items[1].amount, 4000);
    }

    // ── Accumulate ───────────────────────────────────────────────────────────

    #[test]
    fn accumulate_groups_fields_under_part_number() {
        let input = lines(&["TEM2521_70", "カバー", "9,000-", "9,000"]);
        let items = accumulate(&input, &config(), "c.pdf");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.part_no, "TEM2521_70");
        assert_eq!(item.name, "カバー");
        assert_eq!(item.unit_price, 9000);
        assert_eq!(item.amount, 9000);
    }

    #[test]
    fn accumulate_flushes_on_next_part_number() {
        let input = lines(&[
            "TEM2521_70", "カバー", "9,000-", "9,000",
            "TEM2521_71", "ブラケット", "500-",
        ]);
        let items = accumulate(&input, &config(), "c.pdf");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, 9000);
        assert_eq!(items[1].part_no, "TEM2521_71");
        assert_eq!(items[1].unit_price, 500);
        assert_eq!(items[1].amount, 0);
    }

    #[test]
    fn accumulate_inline_name_after_code() {
        let input = lines(&["TEM2521_70 カバー", "9,000-"]);
        let items = accumulate(&input, &config(), "c.pdf");
        assert_eq!(items[0].name, "カバー");
    }

    #[test]
    fn accumulate_first_wins_name_policy() {
        let input = lines(&["TEM2521_70", "カバー", "取付金具", "9,000-"]);
        let items = accumulate(&input, &config(), "c.pdf");
        assert_eq!(items[0].name, "カバー");
    }

    #[test]
    fn accumulate_append_name_policy() {
        let mut cfg = config();
        cfg.name_policy = NameMergePolicy::Append;
        let input = lines(&["TEM2521_70", "カバー", "取付金具", "9,000-"]);
        let items = accumulate(&input, &cfg, "c.pdf");
        assert_eq!(items[0].name, "カバー 取付金具");
    }

    #[test]
    fn accumulate_discards_record_without_substance() {
        // A lone price below the amount slot leaves no part number and no
        // amount — the partial record is dropped at end of input.
        let input = lines(&["9,000-"]);
        assert!(accumulate(&input, &config(), "c.pdf").is_empty());
    }

    #[test]
    fn accumulate_keeps_codeless_record_with_amount() {
        let input = lines(&["9,000-", "9,000"]);
        let items = accumulate(&input, &config(), "c.pdf");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].part_no, "");
        assert_eq!(items[0].amount, 9000);
    }

    #[test]
    fn accumulate_ignores_phone_and_date_lines() {
        let input = lines(&[
            "TEM2521_70", "2026/01/15", "072-123-4567", "9,000-", "9,000",
        ]);
        let items = accumulate(&input, &config(), "c.pdf");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, 9000);
        assert_eq!(items[0].amount, 9000);
    }

    // ── Cascade ──────────────────────────────────────────────────────────────

    #[test]
    fn cascade_falls_through_to_vertical() {
        let input = lines(&["TEM2521_70", "カバー01", "1", "個", "1,500-", "1,500"]);
        let items = reconstruct(&input, &config(), "b.pdf");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].part_no, "TEM2521_70");
    }

    #[test]
    fn cascade_empty_input_yields_nothing() {
        assert!(reconstruct(&[], &config(), "x.pdf").is_empty());
    }

    #[test]
    fn blank_lines_are_dropped_before_strategies() {
        let input = lines(&["", "  ", "カバー取付 2 個 1,500 3,000", ""]);
        let items = reconstruct(&input, &config(), "a.pdf");
        assert_eq!(items.len(), 1);
    }
}
