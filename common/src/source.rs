//! データソースの読み込み
//!
//! 表形式データ（CSV・Excel）のヘッダーを正規の列名に対応づけ、
//! ProductRecordへ変換する。ヘッダーは大文字小文字・空白を無視して照合する。

use crate::error::{Error, Result};
use crate::types::{ProductField, ProductRecord};
use log::{debug, warn};

/// CSVテンプレートのヘッダー
pub const TEMPLATE_HEADERS: [&str; 11] = [
    "ASIN",
    "Marketplace",
    "ProductTitle",
    "Description",
    "BulletPoint1",
    "BulletPoint2",
    "BulletPoint3",
    "BulletPoint4",
    "BulletPoint5",
    "Variations",
    "Link",
];

/// 必須列
pub const REQUIRED_HEADERS: [&str; 2] = ["ASIN", "Marketplace"];

/// 列の割り当て先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Asin,
    Marketplace,
    Field(ProductField),
    Link,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let normalized = normalize_header(header);
        if normalized.eq_ignore_ascii_case("ASIN") {
            return Some(Column::Asin);
        }
        if normalized.eq_ignore_ascii_case("Marketplace") {
            return Some(Column::Marketplace);
        }
        if normalized.eq_ignore_ascii_case("Link") {
            return Some(Column::Link);
        }
        normalized.parse::<ProductField>().ok().map(Column::Field)
    }
}

/// ヘッダーを正規化（BOM・前後空白・内部空白を除去）
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// ヘッダーと行データからProductRecordを作る
///
/// ASIN・Marketplaceの列がなければエラー。値は前後空白を除去し、
/// ASINかMarketplaceが空の行は読み飛ばす。未知の列は無視する。
pub fn records_from_table<S: AsRef<str>>(
    headers: &[S],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<Vec<ProductRecord>> {
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| Column::from_header(h.as_ref()))
        .collect();

    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .zip([Column::Asin, Column::Marketplace])
        .filter(|(_, required)| !columns.contains(&Some(*required)))
        .map(|(name, _)| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingColumns {
            columns: missing,
            available: headers
                .iter()
                .map(|h| normalize_header(h.as_ref()))
                .collect(),
        });
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        let mut record = ProductRecord::default();
        for (index, column) in columns.iter().enumerate() {
            let Some(column) = column else { continue };
            let value = row.get(index).map(|v| v.trim()).unwrap_or("");
            match column {
                Column::Asin => record.asin = value.to_string(),
                Column::Marketplace => record.marketplace = value.to_string(),
                Column::Link => record.link = value.to_string(),
                Column::Field(field) => record = record.with_field(*field, value),
            }
        }

        if record.asin.is_empty() || record.marketplace.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(record);
    }

    if skipped > 0 {
        warn!("ASINまたはMarketplaceが空の行を{}件スキップ", skipped);
    }
    debug!("読み込み: {}件", records.len());

    Ok(records)
}

/// CSV文字列からProductRecordを読み込む
pub fn parse_products_csv(content: &str) -> Result<Vec<ProductRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }

    records_from_table(&headers, rows)
}

/// テンプレートCSV（ヘッダー行のみ）
pub fn template_csv() -> String {
    format!("{}\n", TEMPLATE_HEADERS.join(","))
}
