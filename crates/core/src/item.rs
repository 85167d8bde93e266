use serde::{Deserialize, Serialize};

/// The six canonical output fields of a quotation line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    PartNo,
    Name,
    Quantity,
    Unit,
    UnitPrice,
    Amount,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::PartNo,
        FieldKind::Name,
        FieldKind::Quantity,
        FieldKind::Unit,
        FieldKind::UnitPrice,
        FieldKind::Amount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::PartNo => "part_no",
            FieldKind::Name => "name",
            FieldKind::Quantity => "quantity",
            FieldKind::Unit => "unit",
            FieldKind::UnitPrice => "unit_price",
            FieldKind::Amount => "amount",
        }
    }

    fn index(self) -> usize {
        match self {
            FieldKind::PartNo => 0,
            FieldKind::Name => 1,
            FieldKind::Quantity => 2,
            FieldKind::Unit => 3,
            FieldKind::UnitPrice => 4,
            FieldKind::Amount => 5,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single spreadsheet cell, stripped down to what extraction needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Textual rendering. Integral numbers render without a fractional tail
    /// so `2.0` matches the header keyword / part-number patterns as `"2"`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }

    /// Blank cells, plus the literal empty markers that upstream
    /// normalization sometimes leaves behind in place of absent data.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => {
                let t = s.trim();
                t.is_empty() || t == "nan" || t == "None"
            }
            Cell::Number(_) => false,
        }
    }
}

/// One sheet's worth of raw rows × columns. No schema is implied — the
/// Header Locator decides which row, if any, labels the columns.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Canonical field → column index, derived once per sheet by the Header
/// Locator and consumed read-only by the Row Extractor.
///
/// Invariant: at most one column per field; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; 6],
}

impl ColumnMap {
    pub fn get(&self, field: FieldKind) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Record a column for a field unless one was already recorded.
    /// Returns whether the entry was newly set.
    pub fn set_if_absent(&mut self, field: FieldKind, col: usize) -> bool {
        let slot = &mut self.columns[field.index()];
        if slot.is_none() {
            *slot = Some(col);
            true
        } else {
            false
        }
    }

    /// Number of distinct fields mapped — the header score.
    pub fn len(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, usize)> + '_ {
        FieldKind::ALL
            .iter()
            .filter_map(|&f| self.get(f).map(|c| (f, c)))
    }
}

/// One extracted quotation record. Immutable once appended to a result set;
/// absent fields keep their defaults so the output schema stays uniform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Basename of the file the item came from.
    pub source: String,
    /// Vendor display name, attached at consolidation time.
    #[serde(default)]
    pub vendor: String,
    pub part_no: String,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
    /// Unit price in yen.
    pub unit_price: i64,
    /// Line amount in yen.
    pub amount: i64,
}

impl LineItem {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), ..Self::default() }
    }

    /// A record worth keeping: it identifies a part or carries an amount.
    pub fn has_substance(&self) -> bool {
        !self.part_no.is_empty() || self.amount > 0
    }
}

/// Where a page's text lines came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// Extracted from the PDF text layer, line order preserved.
    Layout,
    /// Recognized from a rasterized page image.
    Ocr,
}

/// Ordered text lines for one PDF page. No positional data survives beyond
/// line order — the Line Reconstructor works from token shape alone.
#[derive(Debug, Clone)]
pub struct PageText {
    pub page: usize,
    pub origin: TextOrigin,
    pub lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Cell ─────────────────────────────────────────────────────────────────

    #[test]
    fn cell_integral_number_renders_without_tail() {
        assert_eq!(Cell::Number(2.0).to_text(), "2");
        assert_eq!(Cell::Number(1500.0).to_text(), "1500");
    }

    #[test]
    fn cell_fractional_number_keeps_fraction() {
        assert_eq!(Cell::Number(2.5).to_text(), "2.5");
    }

    #[test]
    fn cell_blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text("  ".into()).is_blank());
        assert!(Cell::Text("nan".into()).is_blank());
        assert!(Cell::Text("None".into()).is_blank());
        assert!(!Cell::Text("カバー".into()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    // ── ColumnMap ────────────────────────────────────────────────────────────

    #[test]
    fn column_map_first_match_wins() {
        let mut map = ColumnMap::default();
        assert!(map.set_if_absent(FieldKind::Name, 1));
        assert!(!map.set_if_absent(FieldKind::Name, 4));
        assert_eq!(map.get(FieldKind::Name), Some(1));
    }

    #[test]
    fn column_map_len_counts_distinct_fields() {
        let mut map = ColumnMap::default();
        map.set_if_absent(FieldKind::PartNo, 0);
        map.set_if_absent(FieldKind::Amount, 5);
        assert_eq!(map.len(), 2);
    }

    // ── LineItem ─────────────────────────────────────────────────────────────

    #[test]
    fn line_item_substance() {
        let mut item = LineItem::new("a.xlsx");
        assert!(!item.has_substance());
        item.amount = 3000;
        assert!(item.has_substance());

        let mut item = LineItem::new("b.xlsx");
        item.part_no = "TEM2521".into();
        assert!(item.has_substance());
    }

    #[test]
    fn line_item_serializes_all_columns() {
        let item = LineItem::new("a.xlsx");
        let json = serde_json::to_value(&item).unwrap();
        for field in FieldKind::ALL {
            assert!(json.get(field.as_str()).is_some(), "missing {field}");
        }
    }
}
