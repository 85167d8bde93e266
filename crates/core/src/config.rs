use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::FieldKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid {field} pattern '{pattern}': {source}")]
    Pattern {
        field: FieldKind,
        pattern: String,
        source: regex::Error,
    },
}

// ── Keyword table ────────────────────────────────────────────────────────────

/// Alias patterns recognizing each canonical field in header text. Entries
/// are regular expressions, though most are plain substrings. Vendors never
/// agree on labels (図番 vs 品番 vs 型番, spaced variants from OCR), so the
/// table errs toward recall; the header score threshold keeps data rows out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    pub part_no: Vec<String>,
    pub name: Vec<String>,
    pub quantity: Vec<String>,
    pub unit: Vec<String>,
    pub unit_price: Vec<String>,
    pub amount: Vec<String>,
}

fn strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|s| (*s).to_string()).collect()
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            part_no: strings(&["図番", r"図\s*番", "品番", "図面", "型番", "製品番号"]),
            name: strings(&["品名", r"品\s*名", "名称", "商品名", "件名", "銘柄"]),
            quantity: strings(&["数量", "数"]),
            unit: strings(&["単位"]),
            unit_price: strings(&["単価", r"単\s*価", "価格"]),
            amount: strings(&["金額", r"金\s*額", "小計", "合計金額"]),
        }
    }
}

impl KeywordTable {
    pub fn patterns(&self, field: FieldKind) -> &[String] {
        match field {
            FieldKind::PartNo => &self.part_no,
            FieldKind::Name => &self.name,
            FieldKind::Quantity => &self.quantity,
            FieldKind::Unit => &self.unit,
            FieldKind::UnitPrice => &self.unit_price,
            FieldKind::Amount => &self.amount,
        }
    }

    /// Compile every alias pattern once per run.
    pub fn compile(&self) -> Result<CompiledKeywords, ConfigError> {
        let mut per_field = Vec::with_capacity(FieldKind::ALL.len());
        for field in FieldKind::ALL {
            let mut compiled = Vec::new();
            for pattern in self.patterns(field) {
                let re = Regex::new(pattern).map_err(|source| ConfigError::Pattern {
                    field,
                    pattern: pattern.clone(),
                    source,
                })?;
                compiled.push(re);
            }
            per_field.push((field, compiled));
        }
        Ok(CompiledKeywords { per_field })
    }
}

/// The keyword table with its patterns compiled, ready for header scanning.
#[derive(Debug)]
pub struct CompiledKeywords {
    per_field: Vec<(FieldKind, Vec<Regex>)>,
}

impl CompiledKeywords {
    pub fn fields(&self) -> impl Iterator<Item = (FieldKind, &[Regex])> + '_ {
        self.per_field.iter().map(|(f, res)| (*f, res.as_slice()))
    }

    pub fn field_matches(&self, field: FieldKind, text: &str) -> bool {
        self.per_field
            .iter()
            .find(|(f, _)| *f == field)
            .is_some_and(|(_, res)| res.iter().any(|re| re.is_match(text)))
    }
}

// ── Vendor table ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRule {
    /// Filename substring identifying the vendor.
    pub pattern: String,
    /// Display name written into the master list.
    pub name: String,
}

/// Filename-substring → vendor display name. Purely a lookup table; the
/// first matching entry wins, in table order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorTable(pub Vec<VendorRule>);

impl Default for VendorTable {
    fn default() -> Self {
        let rules = [
            ("26AA0788", "株式会社メイカーズ"),
            ("QTKG", "創業實業(中国)有限公司"),
            ("MT05", "TKエンジニアリング"),
            ("注文No", "TKエンジニアリング"),
        ];
        VendorTable(
            rules
                .iter()
                .map(|(pattern, name)| VendorRule {
                    pattern: (*pattern).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
        )
    }
}

impl VendorTable {
    pub fn lookup(&self, filename: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|r| filename.contains(&r.pattern))
            .map(|r| r.name.as_str())
    }
}

// ── Policies ─────────────────────────────────────────────────────────────────

/// What to do when several name-fragment lines precede a price in OCR
/// output. The source material is ambiguous here, so this stays a policy
/// rather than a hard-coded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameMergePolicy {
    /// Keep the first fragment; later fragments are ignored.
    #[default]
    FirstWins,
    /// Join fragments with a space, in input order.
    Append,
}

/// OCR line-reconstruction strategies, tried in configured order; the first
/// one producing any items wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Horizontal,
    Vertical,
    Accumulate,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Every knob of the extraction pipeline in one place. The historical
/// extractor revisions differed only in these values, so revision
/// differences are configuration, not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub keywords: KeywordTable,
    /// A header row must match at least this many distinct fields.
    pub min_header_score: usize,
    /// Minimum length of a part-number token in OCR output.
    pub min_part_no_len: usize,
    /// OCR price lines at or below this value are treated as quantities.
    pub min_ocr_price: i64,
    /// OCR lines below this confidence are discarded.
    pub min_ocr_confidence: f32,
    pub strategies: Vec<Strategy>,
    pub name_policy: NameMergePolicy,
    /// A data row whose name contains this marker ends the sheet.
    pub total_marker: String,
    /// A master-list row containing this marker is the insertion point.
    pub grand_total_marker: String,
    pub vendors: VendorTable,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordTable::default(),
            min_header_score: 2,
            min_part_no_len: 5,
            min_ocr_price: 100,
            min_ocr_confidence: 0.3,
            strategies: vec![Strategy::Horizontal, Strategy::Vertical, Strategy::Accumulate],
            name_policy: NameMergePolicy::default(),
            total_marker: "合計".to_string(),
            grand_total_marker: "総合計".to_string(),
            vendors: VendorTable::default(),
        }
    }
}

impl ExtractConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
