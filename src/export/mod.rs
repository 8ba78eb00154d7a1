pub mod excel;

use crate::cli::ExportFormat;
use crate::error::{ContentCheckError, Result};
use content_check_common::{support_message, Batch, ComparisonResult, FieldSelection};
use log::debug;
use std::path::{Path, PathBuf};

/// バッチ出力の設定
#[derive(Debug, Clone)]
pub struct CaseExportOptions<'a> {
    pub selection: &'a FieldSelection,
    pub threshold_percent: f64,
    pub signature: &'a str,
    pub format: ExportFormat,
}

/// バッチのファイル名（拡張子なし）
pub fn batch_file_stem(batch: &Batch) -> String {
    let marketplace: String = batch
        .marketplace
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("open_cases_batch_{}_{}", batch.id, marketplace)
}

/// 要対応バッチを出力し、書き出したファイルの一覧を返す
///
/// - excel: `{stem}.xlsx` と問い合わせ文面 `{stem}.txt`
/// - json: `{stem}.json`
pub fn export_batches(
    batches: &[Batch],
    options: &CaseExportOptions<'_>,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    for batch in batches {
        let stem = batch_file_stem(batch);

        if options.format.includes_excel() {
            let excel_path = output_dir.join(format!("{}.xlsx", stem));
            excel::generate_batch_excel(batch, options.selection, options.threshold_percent, &excel_path)?;
            written.push(excel_path);

            let message_path = output_dir.join(format!("{}.txt", stem));
            let message = support_message(batch, options.selection, options.threshold_percent, options.signature);
            std::fs::write(&message_path, message)?;
            written.push(message_path);
        }

        if options.format.includes_json() {
            let json_path = output_dir.join(format!("{}.json", stem));
            std::fs::write(&json_path, serde_json::to_string_pretty(batch)?)?;
            written.push(json_path);
        }

        println!("✔ バッチ{} ({}): {}件", batch.id, batch.marketplace, batch.results.len());
    }

    debug!("出力ファイル: {}件", written.len());
    Ok(written)
}

/// 照合結果をJSONで保存
pub fn save_results(results: &[ComparisonResult], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// 照合結果JSONを読み込む
pub fn load_results(input_path: &Path) -> Result<Vec<ComparisonResult>> {
    if !input_path.exists() {
        return Err(ContentCheckError::FileNotFound(input_path.display().to_string()));
    }
    let content = std::fs::read_to_string(input_path)?;
    let results: Vec<ComparisonResult> = serde_json::from_str(&content)?;
    Ok(results)
}

/// 結果に含まれるフィールドの選択（結果が空なら全フィールド）
pub fn selection_from_results(results: &[ComparisonResult]) -> FieldSelection {
    if results.is_empty() {
        return FieldSelection::all();
    }
    FieldSelection::from_fields(results.iter().flat_map(|r| r.fields.keys().copied()))
}
