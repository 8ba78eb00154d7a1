//! Excel生成（CLI版）
//!
//! 共通ライブラリで生成したバッファをファイルに書き出す

use crate::error::{ContentCheckError, Result};
use content_check_common::export::excel_core;
use content_check_common::{Batch, ComparisonResult, FieldSelection};
use std::path::Path;

pub fn generate_batch_excel(
    batch: &Batch,
    selection: &FieldSelection,
    threshold_percent: f64,
    output_path: &Path,
) -> Result<()> {
    let buffer = excel_core::generate_batch_buffer(batch, selection, threshold_percent)
        .map_err(ContentCheckError::ExcelGeneration)?;
    write_buffer(&buffer, output_path)
}

pub fn generate_report_excel(
    results: &[ComparisonResult],
    selection: &FieldSelection,
    threshold_percent: f64,
    output_path: &Path,
) -> Result<()> {
    let buffer = excel_core::generate_report_buffer(results, selection, threshold_percent)
        .map_err(ContentCheckError::ExcelGeneration)?;
    write_buffer(&buffer, output_path)
}

fn write_buffer(buffer: &[u8], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}
