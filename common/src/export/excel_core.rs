//! Excel生成（共通ライブラリ）
//!
//! - 要対応バッチ: 正とするコンテンツを列挙し、閾値未満のセルを黄色で強調
//! - 照合レポート: 現在／正のコンテンツを2列で並べた全件一覧

use crate::batch::Batch;
use crate::types::{ComparisonResult, FieldSelection, ProductField};
use rust_xlsxwriter::*;

/// 要対応セルの背景色
const HIGHLIGHT_COLOR: u32 = 0xFFFF00;
/// ヘッダー行の背景色
const HEADER_COLOR: u32 = 0xE0E0E0;

const KEY_COL_WIDTH: f64 = 15.0;
const FIELD_COL_WIDTH: f64 = 30.0;
const SCORE_COL_WIDTH: f64 = 12.0;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_COLOR))
        .set_border(FormatBorder::Thin)
}

fn highlight_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HIGHLIGHT_COLOR))
        .set_text_wrap()
        .set_align(FormatAlign::Top)
}

fn value_format() -> Format {
    Format::new().set_text_wrap().set_align(FormatAlign::Top)
}

fn similarity_of(result: &ComparisonResult, field: ProductField) -> f64 {
    result.fields.get(&field).map(|f| f.similarity).unwrap_or(0.0)
}

/// 要対応バッチのExcelをバッファに生成
///
/// 列: ASIN, Marketplace, 選択フィールド（正とするコンテンツ）
pub fn generate_batch_buffer(
    batch: &Batch,
    selection: &FieldSelection,
    threshold_percent: f64,
) -> Result<Vec<u8>, String> {
    let fields: Vec<ProductField> = selection.selected().collect();
    let mut workbook = Workbook::new();

    let header_format = header_format();
    let highlight_format = highlight_format();
    let value_format = value_format();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Content Review")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    // ヘッダー
    let mut headers = vec![("ASIN", KEY_COL_WIDTH), ("Marketplace", KEY_COL_WIDTH)];
    headers.extend(fields.iter().map(|f| (f.key(), FIELD_COL_WIDTH)));
    for (col, (title, width)) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet.write_string_with_format(0, col, *title, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    for (index, result) in batch.results.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, &result.asin)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string(row, 1, &result.marketplace)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;

        for (offset, field) in fields.iter().enumerate() {
            let col = offset as u16 + 2;
            let value = result.fields.get(field).map(|f| f.source2.as_str()).unwrap_or("");
            let format = if similarity_of(result, *field) < threshold_percent {
                &highlight_format
            } else {
                &value_format
            };
            worksheet.write_string_with_format(row, col, value, format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

/// 照合レポートのExcelをバッファに生成
///
/// 列: ASIN, Marketplace, Link, Overall Match, 以降フィールドごとに
/// 現在のコンテンツ／正とするコンテンツ／類似度
pub fn generate_report_buffer(
    results: &[ComparisonResult],
    selection: &FieldSelection,
    threshold_percent: f64,
) -> Result<Vec<u8>, String> {
    let fields: Vec<ProductField> = selection.selected().collect();
    let mut workbook = Workbook::new();

    let header_format = header_format();
    let highlight_format = highlight_format();
    let value_format = value_format();
    let score_format = Format::new().set_num_format("0.00").set_align(FormatAlign::Top);
    let low_score_format = Format::new()
        .set_num_format("0.00")
        .set_bold()
        .set_background_color(Color::RGB(HIGHLIGHT_COLOR))
        .set_align(FormatAlign::Top);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Comparison")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    let mut headers: Vec<(String, f64)> = vec![
        ("ASIN".to_string(), KEY_COL_WIDTH),
        ("Marketplace".to_string(), KEY_COL_WIDTH),
        ("Link".to_string(), FIELD_COL_WIDTH),
        ("Overall Match".to_string(), SCORE_COL_WIDTH),
    ];
    for field in &fields {
        headers.push((format!("{} (Current)", field.label()), FIELD_COL_WIDTH));
        headers.push((format!("{} (Required)", field.label()), FIELD_COL_WIDTH));
        headers.push((format!("{} %", field.label()), SCORE_COL_WIDTH));
    }
    for (col, (title, width)) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet.write_string_with_format(0, col, title, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }
    worksheet.set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    for (index, result) in results.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string_with_format(row, 0, &result.asin, &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string_with_format(row, 1, &result.marketplace, &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string_with_format(row, 2, &result.link, &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_number_with_format(row, 3, result.overall_match, &score_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;

        for (offset, field) in fields.iter().enumerate() {
            let col = 4 + offset as u16 * 3;
            let (current, required) = result
                .fields
                .get(field)
                .map(|f| (f.source1.as_str(), f.source2.as_str()))
                .unwrap_or(("", ""));
            let similarity = similarity_of(result, *field);
            let below = similarity < threshold_percent;

            let text_format = if below { &highlight_format } else { &value_format };
            worksheet.write_string_with_format(row, col, current, text_format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
            worksheet.write_string_with_format(row, col + 1, required, text_format)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
            worksheet
                .write_number_with_format(
                    row,
                    col + 2,
                    similarity,
                    if below { &low_score_format } else { &score_format },
                )
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldComparison;
    use std::collections::BTreeMap;

    fn result(asin: &str, similarity: f64) -> ComparisonResult {
        let mut fields = BTreeMap::new();
        fields.insert(
            ProductField::ProductTitle,
            FieldComparison {
                source1: "Red Shoe".to_string(),
                source2: "Red Shoes".to_string(),
                similarity,
            },
        );
        ComparisonResult {
            asin: asin.to_string(),
            marketplace: "DE".to_string(),
            link: String::new(),
            fields,
            overall_match: similarity,
        }
    }

    #[test]
    fn test_generate_batch_buffer() {
        let batch = Batch {
            id: 1,
            marketplace: "DE".to_string(),
            results: vec![result("B001", 72.2), result("B002", 100.0)],
        };
        let selection = FieldSelection::from_fields([ProductField::ProductTitle]);
        let buffer = generate_batch_buffer(&batch, &selection, 90.0).expect("Excel生成失敗");
        // xlsxはZIP形式
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_report_buffer_empty() {
        let buffer = generate_report_buffer(&[], &FieldSelection::all(), 90.0).expect("Excel生成失敗");
        assert!(buffer.starts_with(b"PK"));
    }
}
