pub mod config;
pub mod item;
pub mod normalize;
pub mod report;

pub use config::{
    CompiledKeywords, ConfigError, ExtractConfig, KeywordTable, NameMergePolicy, Strategy,
    VendorRule, VendorTable,
};
pub use item::{Cell, ColumnMap, FieldKind, Grid, LineItem, PageText, TextOrigin};
pub use report::{FileOutcome, FileReport, RunReport};

/// Attach vendor names to extracted items by filename substring. The output
/// schema is already uniform (absent fields keep their defaults), so this is
/// the whole of consolidation; it is deterministic and idempotent.
pub fn consolidate(items: &mut [LineItem], vendors: &VendorTable) {
    for item in items {
        item.vendor = vendors
            .lookup(&item.source)
            .unwrap_or_default()
            .to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: &str) -> LineItem {
        LineItem::new(source)
    }

    #[test]
    fn consolidate_attaches_vendor_by_substring() {
        let mut items = vec![item("MT05_見積.pdf"), item("unknown.xlsx")];
        consolidate(&mut items, &VendorTable::default());
        assert_eq!(items[0].vendor, "TKエンジニアリング");
        assert_eq!(items[1].vendor, "");
    }

    #[test]
    fn consolidate_is_idempotent() {
        let mut items = vec![item("QTKG_a.xlsx"), item("b.pdf")];
        consolidate(&mut items, &VendorTable::default());
        let once = items.clone();
        consolidate(&mut items, &VendorTable::default());
        assert_eq!(items, once);
    }
}
