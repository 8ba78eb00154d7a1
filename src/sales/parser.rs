//! 売上レポートの解析
//!
//! - 注文レポート（Amazon Order Report）: 1行1注文明細
//! - PBI売上: ASIN単位の売上・数量
//! - ASINメタデータ: ブランド・カテゴリ等の分類

use super::{AsinMetadata, OrderRow, PbiRow};
use crate::error::{ContentCheckError, Result};
use content_check_common::Error as CommonError;
use csv::StringRecord;
use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;

/// メタデータCSVの必須列（小文字）
pub const METADATA_HEADERS: [&str; 8] = [
    "asin",
    "brand",
    "category",
    "client",
    "product",
    "sku",
    "subcategory",
    "product type",
];

/// 通貨ごとのユーロ換算レート
const EXCHANGE_RATES: [(&str, f64); 4] = [("EUR", 1.0), ("USD", 0.92), ("GBP", 1.15), ("SEK", 0.088)];

/// 金額をユーロに換算（未知の通貨は換算しない）
pub fn convert_to_eur(amount: f64, currency: &str) -> f64 {
    let rate = EXCHANGE_RATES
        .iter()
        .find(|(code, _)| *code == currency)
        .map(|(_, rate)| *rate)
        .unwrap_or(1.0);
    amount * rate
}

/// 文字列先頭の数値部分を読む（読めなければNone）
fn leading_float(text: &str) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref FLOAT_RE: Regex = Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?").unwrap();
    }
    FLOAT_RE.find(text.trim()).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// 注文レポートの数値を解析
///
/// 先頭の記号（通貨など）を除き、最後のピリオド以外を桁区切りとして除去、
/// カンマは小数点として扱う。解析できなければ0。
pub fn parse_number(value: &str) -> f64 {
    lazy_static::lazy_static! {
        static ref LEADING_RE: Regex = Regex::new(r"^[^0-9-]*").unwrap();
    }

    let stripped = LEADING_RE.replace(value, "");
    let last_dot = stripped.rfind('.');
    let cleaned: String = stripped
        .char_indices()
        .filter(|(i, c)| *c != '.' || Some(*i) == last_dot)
        .map(|(_, c)| if c == ',' { '.' } else { c })
        .collect();

    leading_float(&cleaned).unwrap_or(0.0)
}

/// PBIの数値（欧州表記）を解析
///
/// "€ 1.234,56" → 1234.56, "1,234" → 1234
pub fn parse_european_number(value: &str) -> f64 {
    lazy_static::lazy_static! {
        static ref THOUSANDS_COMMA_RE: Regex = Regex::new(r",(\d{3})").unwrap();
    }

    let compact: String = value
        .chars()
        .filter(|c| *c != '€' && !c.is_whitespace())
        .collect();
    let without_commas = THOUSANDS_COMMA_RE.replace_all(&compact, "$1");
    let cleaned = without_commas.replace('.', "").replace(',', ".");

    leading_float(&cleaned).unwrap_or(0.0)
}

/// 整数（数量）を解析。数字と符号以外は無視。
pub fn parse_units(value: &str) -> i64 {
    lazy_static::lazy_static! {
        static ref INT_RE: Regex = Regex::new(r"^-?\d+").unwrap();
    }

    let digits: String = value.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
    INT_RE
        .find(&digits)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

/// 区切り文字を推定（タブ区切りの注文レポートに対応）
fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    if header.matches('\t').count() > header.matches(',').count() {
        b'\t'
    } else {
        b','
    }
}

/// ヘッダー付きCSVを読み、列名→値のマップ列にする
///
/// `lowercase_headers` が真なら列名を小文字に揃える。
fn read_rows(content: &str, lowercase_headers: bool) -> Result<(Vec<String>, Vec<HashMap<String, String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(detect_delimiter(content))
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(CommonError::from)?
        .iter()
        .map(|h| {
            let h = h.trim_start_matches('\u{feff}').trim();
            if lowercase_headers { h.to_lowercase() } else { h.to_string() }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record: StringRecord = record.map_err(CommonError::from)?;
        let row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.to_string()))
            .collect::<HashMap<_, _>>();
        rows.push(row);
    }

    Ok((headers, rows))
}

fn get<'a>(row: &'a HashMap<String, String>, key: &str) -> &'a str {
    row.get(key).map(|v| v.as_str()).unwrap_or("")
}

/// 注文レポートを解析する
///
/// purchase-dateのない行があればファイル全体をエラーにする。
pub fn parse_orders(content: &str) -> Result<Vec<OrderRow>> {
    let (_, rows) = read_rows(content, false)?;

    let orders = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            OrderRow::from_row(row).ok_or_else(|| {
                ContentCheckError::from(CommonError::Parse(format!(
                    "Missing purchase date in order data (row {})",
                    index + 2
                )))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("注文レポート: {}行", orders.len());
    Ok(orders)
}

impl OrderRow {
    fn from_row(row: &HashMap<String, String>) -> Option<Self> {
        let purchase_date = get(row, "purchase-date");
        if purchase_date.is_empty() {
            return None;
        }

        let item_price = parse_number(get(row, "item-price"));
        let currency = match get(row, "currency") {
            "" => "EUR",
            c => c,
        };

        Some(OrderRow {
            purchase_date: purchase_date.to_string(),
            date: purchase_date.chars().take(10).collect(),
            sales_channel: get(row, "sales-channel").to_string(),
            order_status: get(row, "order-status").to_string(),
            item_price,
            currency: currency.to_string(),
            item_price_eur: convert_to_eur(item_price, currency),
            asin: get(row, "asin").to_string(),
            quantity: parse_number(get(row, "quantity")).round() as i64,
        })
    }
}

/// PBI売上を解析する（ASINなし・"NA"の行は除外）
pub fn parse_pbi(content: &str) -> Result<Vec<PbiRow>> {
    let (_, rows) = read_rows(content, false)?;

    let pbi: Vec<PbiRow> = rows
        .iter()
        .filter_map(|row| {
            let asin = get(row, "ASIN").trim();
            if asin.is_empty() || asin == "NA" {
                return None;
            }
            let sales = match get(row, "Sales") {
                "" => get(row, "ProductSales"),
                s => s,
            };
            Some(PbiRow {
                asin: asin.to_string(),
                sales: parse_european_number(sales),
                units: parse_units(get(row, "Units")),
            })
        })
        .collect();

    debug!("PBI: {}行（除外 {}行）", pbi.len(), rows.len() - pbi.len());
    Ok(pbi)
}

/// ASINメタデータを解析する（列名は大文字小文字を区別しない）
pub fn parse_metadata(content: &str) -> Result<Vec<AsinMetadata>> {
    let (headers, rows) = read_rows(content, true)?;

    let missing: Vec<String> = METADATA_HEADERS
        .iter()
        .filter(|h| !headers.iter().any(|header| header.as_str() == **h))
        .map(|h| h.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CommonError::MissingColumns { columns: missing, available: headers }.into());
    }

    let field = |row: &HashMap<String, String>, key: &str| get(row, key).trim().to_string();

    let metadata: Vec<AsinMetadata> = rows
        .iter()
        .filter(|row| !get(row, "asin").trim().is_empty())
        .map(|row| AsinMetadata {
            asin: field(row, "asin"),
            brand: field(row, "brand"),
            category: field(row, "category"),
            client: field(row, "client"),
            product: field(row, "product"),
            sku: field(row, "sku"),
            subcategory: field(row, "subcategory"),
            product_type: field(row, "product type"),
        })
        .collect();

    if metadata.len() < rows.len() {
        warn!("ASINが空のメタデータ行を{}件スキップ", rows.len() - metadata.len());
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("19.99"), 19.99);
        assert_eq!(parse_number("EUR 19,99"), 19.99);
        assert_eq!(parse_number("1.000.50"), 1000.5);
        assert_eq!(parse_number("-5"), -5.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("n/a"), 0.0);
    }

    #[test]
    fn test_parse_european_number() {
        assert_eq!(parse_european_number("€ 1.234,56"), 1234.56);
        assert_eq!(parse_european_number("1,234"), 1234.0);
        assert_eq!(parse_european_number("12,5"), 12.5);
        assert_eq!(parse_european_number(""), 0.0);
        assert_eq!(parse_european_number("abc"), 0.0);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("12"), 12);
        assert_eq!(parse_units("1,200"), 1200);
        assert_eq!(parse_units(""), 0);
    }

    #[test]
    fn test_convert_to_eur() {
        assert_eq!(convert_to_eur(100.0, "EUR"), 100.0);
        assert!((convert_to_eur(100.0, "USD") - 92.0).abs() < 1e-9);
        assert!((convert_to_eur(100.0, "GBP") - 115.0).abs() < 1e-9);
        assert!((convert_to_eur(100.0, "SEK") - 8.8).abs() < 1e-9);
        assert_eq!(convert_to_eur(100.0, "PLN"), 100.0);
    }

    #[test]
    fn test_parse_orders() {
        let csv = "purchase-date,sales-channel,order-status,item-price,currency,asin,quantity\n\
                   2024-03-01T10:00:00+00:00,Amazon.de,Shipped,19.99,EUR,B001,1\n\
                   2024-03-02T11:00:00+00:00,Amazon.co.uk,Pending,10.00,GBP,B002,2.6\n\
                   2024-03-02T12:00:00+00:00,Amazon.de,Shipped,5,,B001,1\n";
        let orders = parse_orders(csv).unwrap();

        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].date, "2024-03-01");
        assert!((orders[1].item_price_eur - 11.5).abs() < 1e-9);
        assert_eq!(orders[1].quantity, 3);
        assert_eq!(orders[2].currency, "EUR");
    }

    #[test]
    fn test_parse_orders_tab_separated() {
        let tsv = "purchase-date\tasin\titem-price\tquantity\n2024-03-01T10:00:00\tB001\t9.5\t1\n";
        let orders = parse_orders(tsv).unwrap();
        assert_eq!(orders[0].asin, "B001");
        assert_eq!(orders[0].item_price, 9.5);
    }

    #[test]
    fn test_parse_orders_missing_purchase_date() {
        let csv = "purchase-date,asin,item-price\n2024-03-01,B001,1\n,B002,2\n";
        let err = parse_orders(csv).unwrap_err();
        assert!(matches!(err, ContentCheckError::Common(CommonError::Parse(_))));
    }

    #[test]
    fn test_parse_pbi() {
        let csv = "ASIN,Sales,ProductSales,Units\n\
                   B001,\"€ 1.234,56\",,10\n\
                   NA,100,,1\n\
                   ,100,,1\n\
                   B002,,\"50,5\",2\n";
        let pbi = parse_pbi(csv).unwrap();

        assert_eq!(pbi.len(), 2);
        assert_eq!(pbi[0].sales, 1234.56);
        assert_eq!(pbi[0].units, 10);
        assert_eq!(pbi[1].asin, "B002");
        assert_eq!(pbi[1].sales, 50.5);
    }

    #[test]
    fn test_parse_metadata() {
        let csv = "ASIN,Brand,Category,Client,Product,SKU,Subcategory,Product Type\n\
                   B001,Acme,Shoes,ClientA,Runner,SKU1,Sport,Sneaker\n\
                   ,Acme,Shoes,ClientA,Runner,SKU2,Sport,Sneaker\n";
        let metadata = parse_metadata(csv).unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].brand, "Acme");
        assert_eq!(metadata[0].product_type, "Sneaker");
    }

    #[test]
    fn test_parse_metadata_missing_headers() {
        let csv = "asin,brand\nB001,Acme\n";
        let err = parse_metadata(csv).unwrap_err();
        match err {
            ContentCheckError::Common(CommonError::MissingColumns { columns, .. }) => {
                assert!(columns.contains(&"category".to_string()));
                assert!(columns.contains(&"product type".to_string()));
                assert!(!columns.contains(&"asin".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
