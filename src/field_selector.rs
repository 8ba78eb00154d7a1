//! 比較フィールドの対話式選択

use crate::error::{ContentCheckError, Result};
use content_check_common::{FieldSelection, ProductField};
use dialoguer::MultiSelect;

/// 対話式でフィールドを選択（初期状態は `current`）
pub fn select_fields_interactive(current: &FieldSelection) -> Result<FieldSelection> {
    let labels: Vec<&str> = ProductField::ALL.iter().map(|f| f.label()).collect();
    let defaults: Vec<bool> = ProductField::ALL.iter().map(|f| current.is_selected(*f)).collect();

    println!("\n📋 比較するフィールドを選択してください（スペースで切替、Enterで確定）:\n");

    let chosen = MultiSelect::new()
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .map_err(|e| ContentCheckError::Prompt(e.to_string()))?;

    let selection = selection_from_indices(&chosen);
    if !selection.has_any() {
        return Err(ContentCheckError::NoFieldsSelected);
    }
    Ok(selection)
}

/// 選択肢の番号からFieldSelectionを作る（範囲外は無視）
fn selection_from_indices(indices: &[usize]) -> FieldSelection {
    FieldSelection::from_fields(
        indices
            .iter()
            .filter_map(|i| ProductField::ALL.get(*i).copied()),
    )
}

/// コマンドライン指定→設定値の順でフィールド選択を決める
pub fn resolve_selection(names: &[String], fallback: FieldSelection) -> Result<FieldSelection> {
    let selection = if names.is_empty() {
        fallback
    } else {
        FieldSelection::from_names(names).map_err(ContentCheckError::Config)?
    };

    if !selection.has_any() {
        return Err(ContentCheckError::NoFieldsSelected);
    }
    Ok(selection)
}
