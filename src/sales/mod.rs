//! 売上突合
//!
//! 注文レポートを集計し、PBIの売上・数量と比較する。

pub mod parser;

pub use parser::{convert_to_eur, parse_european_number, parse_metadata, parse_number, parse_orders, parse_pbi};

use crate::error::{ContentCheckError, Result};
use crate::loader::scan_report_folder;
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

const ORDER_REPORT_EXTENSIONS: &[&str] = &["csv", "txt", "tsv"];

/// 注文明細1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrderRow {
    pub purchase_date: String,
    /// purchase-dateの先頭10文字（YYYY-MM-DD）
    pub date: String,
    pub sales_channel: String,
    pub order_status: String,
    pub item_price: f64,
    pub currency: String,
    pub item_price_eur: f64,
    pub asin: String,
    pub quantity: i64,
}

/// PBI売上1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PbiRow {
    #[serde(rename = "ASIN")]
    pub asin: String,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Units")]
    pub units: i64,
}

/// ASINの分類情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AsinMetadata {
    pub asin: String,
    pub brand: String,
    pub category: String,
    pub client: String,
    pub product: String,
    pub sku: String,
    pub subcategory: String,
    pub product_type: String,
}

/// 集計値（キーはASIN・販売チャネル・日付のいずれか）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTotal {
    pub key: String,
    pub total: f64,
    pub units: i64,
}

/// ASIN単位の突合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesComparison {
    pub asin: String,
    pub total: f64,
    pub units: i64,
    pub pbi_sales: f64,
    pub pbi_units: i64,
    /// (PBI - 注文) / 注文 × 100
    pub sales_discrepancy: f64,
    pub units_discrepancy: f64,
}

/// 突合結果一式（JSON出力用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub order_count: usize,
    pub total_eur: f64,
    pub comparisons: Vec<SalesComparison>,
    pub missing_asins: Vec<String>,
    pub by_marketplace: Vec<SalesTotal>,
    pub by_date: Vec<SalesTotal>,
}

impl SalesReport {
    pub fn build(orders: &[OrderRow], pbi: &[PbiRow]) -> Self {
        Self {
            order_count: orders.len(),
            total_eur: orders.iter().map(|o| o.item_price_eur).sum(),
            comparisons: compare_sales(orders, pbi),
            missing_asins: find_missing_asins(orders, pbi),
            by_marketplace: aggregate_by_marketplace(orders),
            by_date: aggregate_by_date(orders),
        }
    }
}

/// 注文レポートを読み込む（フォルダ指定時は直下のレポートをすべて連結）
pub fn load_orders(path: &Path) -> Result<Vec<OrderRow>> {
    let files = if path.is_dir() {
        scan_report_folder(path, ORDER_REPORT_EXTENSIONS)?
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(ContentCheckError::FileNotFound(path.display().to_string()));
    };

    let mut orders = Vec::new();
    for file in &files {
        let content = std::fs::read_to_string(file)?;
        let rows = parse_orders(&content)?;
        info!("{}: {}行", file.display(), rows.len());
        orders.extend(rows);
    }
    Ok(orders)
}

pub fn load_pbi(path: &Path) -> Result<Vec<PbiRow>> {
    let content = read_existing(path)?;
    parse_pbi(&content)
}

pub fn load_metadata(path: &Path) -> Result<Vec<AsinMetadata>> {
    let content = read_existing(path)?;
    parse_metadata(&content)
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ContentCheckError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// キーごとに売上（EUR）と数量を合計（初出順）
fn aggregate_by<F>(orders: &[OrderRow], key: F) -> Vec<SalesTotal>
where
    F: Fn(&OrderRow) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<SalesTotal> = Vec::new();

    for order in orders {
        let k = key(order);
        match index.get(k) {
            Some(&i) => {
                totals[i].total += order.item_price_eur;
                totals[i].units += order.quantity;
            }
            None => {
                index.insert(k, totals.len());
                totals.push(SalesTotal {
                    key: k.to_string(),
                    total: order.item_price_eur,
                    units: order.quantity,
                });
            }
        }
    }
    totals
}

fn sort_by_total_desc(totals: &mut [SalesTotal]) {
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
}

/// ASIN別集計（売上の降順）
pub fn aggregate_by_asin(orders: &[OrderRow]) -> Vec<SalesTotal> {
    let mut totals = aggregate_by(orders, |o| o.asin.as_str());
    sort_by_total_desc(&mut totals);
    totals
}

/// 販売チャネル別集計（売上の降順）
pub fn aggregate_by_marketplace(orders: &[OrderRow]) -> Vec<SalesTotal> {
    let mut totals = aggregate_by(orders, |o| o.sales_channel.as_str());
    sort_by_total_desc(&mut totals);
    totals
}

/// 日付別集計（日付の昇順）
pub fn aggregate_by_date(orders: &[OrderRow]) -> Vec<SalesTotal> {
    let mut totals = aggregate_by(orders, |o| o.date.as_str());
    totals.sort_by(|a, b| a.key.cmp(&b.key));
    totals
}

/// 注文の日付範囲（解析できない日付は無視）
pub fn date_range(orders: &[OrderRow]) -> Option<(NaiveDate, NaiveDate)> {
    let dates: BTreeSet<NaiveDate> = orders
        .iter()
        .filter_map(|o| NaiveDate::parse_from_str(&o.date, "%Y-%m-%d").ok())
        .collect();
    Some((*dates.first()?, *dates.last()?))
}

fn discrepancy(expected: f64, actual: f64) -> f64 {
    if expected > 0.0 {
        (actual - expected) / expected * 100.0
    } else {
        0.0
    }
}

/// ASIN別に注文集計とPBIを比較する
///
/// PBIにないASINは売上・数量0として扱う。同一ASINが複数行あれば先頭を使う。
pub fn compare_sales(orders: &[OrderRow], pbi: &[PbiRow]) -> Vec<SalesComparison> {
    let mut pbi_index: HashMap<&str, &PbiRow> = HashMap::new();
    for row in pbi {
        pbi_index.entry(row.asin.as_str()).or_insert(row);
    }

    aggregate_by_asin(orders)
        .into_iter()
        .map(|total| {
            let (pbi_sales, pbi_units) = pbi_index
                .get(total.key.as_str())
                .map(|p| (p.sales, p.units))
                .unwrap_or((0.0, 0));

            SalesComparison {
                sales_discrepancy: discrepancy(total.total, pbi_sales),
                units_discrepancy: discrepancy(total.units as f64, pbi_units as f64),
                asin: total.key,
                total: total.total,
                units: total.units,
                pbi_sales,
                pbi_units,
            }
        })
        .collect()
}

/// 売上があるのにPBIに存在しないASIN（昇順）
pub fn find_missing_asins(orders: &[OrderRow], pbi: &[PbiRow]) -> Vec<String> {
    let present: HashSet<&str> = pbi.iter().map(|p| p.asin.as_str()).collect();

    orders
        .iter()
        .filter(|o| o.item_price_eur > 0.0)
        .map(|o| o.asin.as_str())
        .filter(|asin| !present.contains(asin))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// 空でない値の一覧（重複除去・昇順）
pub fn unique_values<T, F>(items: &[T], value: F) -> Vec<String>
where
    F: Fn(&T) -> &str,
{
    items
        .iter()
        .map(value)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// 注文ステータスで絞り込む（None = 全件）
pub fn filter_by_status(orders: &[OrderRow], status: Option<&str>) -> Vec<OrderRow> {
    orders
        .iter()
        .filter(|o| status.map_or(true, |s| o.order_status == s))
        .cloned()
        .collect()
}

/// メタデータによるドリルダウン条件（None = 条件なし）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub client: Option<String>,
    pub subcategory: Option<String>,
    pub product_type: Option<String>,
}

impl MetadataFilter {
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.category.is_none()
            && self.client.is_none()
            && self.subcategory.is_none()
            && self.product_type.is_none()
    }

    pub fn matches(&self, metadata: &AsinMetadata) -> bool {
        fn check(condition: &Option<String>, value: &str) -> bool {
            condition.as_deref().map_or(true, |c| c == value)
        }

        check(&self.brand, &metadata.brand)
            && check(&self.category, &metadata.category)
            && check(&self.client, &metadata.client)
            && check(&self.subcategory, &metadata.subcategory)
            && check(&self.product_type, &metadata.product_type)
    }

    /// 条件に合うPBI行（メタデータのないASINは除外）
    pub fn apply(&self, pbi: &[PbiRow], metadata: &[AsinMetadata]) -> Vec<PbiRow> {
        let mut index: HashMap<&str, &AsinMetadata> = HashMap::new();
        for m in metadata {
            index.entry(m.asin.as_str()).or_insert(m);
        }

        pbi.iter()
            .filter(|row| {
                index
                    .get(row.asin.as_str())
                    .map_or(false, |m| self.matches(m))
            })
            .cloned()
            .collect()
    }
}
