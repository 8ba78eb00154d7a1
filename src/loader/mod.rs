//! データソースの読み込み（CSV / Excel）

use crate::error::{ContentCheckError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use content_check_common::{parse_products_csv, records_from_table, ProductRecord};
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CSV_EXTENSIONS: &[&str] = &["csv"];
const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// 商品データを読み込む（拡張子で形式を判定）
pub fn load_products(path: &Path) -> Result<Vec<ProductRecord>> {
    if !path.is_file() {
        return Err(ContentCheckError::FileNotFound(path.display().to_string()));
    }

    let ext = extension_of(path);
    let records = if CSV_EXTENSIONS.contains(&ext.as_str()) {
        let content = std::fs::read_to_string(path)?;
        parse_products_csv(&content)?
    } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
        let (headers, rows) = read_first_sheet(path)?;
        records_from_table(&headers, rows)?
    } else {
        return Err(ContentCheckError::UnsupportedFormat(path.display().to_string()));
    };

    info!("{}: {}件", path.display(), records.len());
    Ok(records)
}

/// 先頭シートをヘッダー行とデータ行に分けて読む
fn read_first_sheet(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ContentCheckError::XlsxRead(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ContentCheckError::XlsxRead(format!("シートがありません: {}", path.display())))?
        .map_err(|e| ContentCheckError::XlsxRead(e.to_string()))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };

    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|v| !v.trim().is_empty()))
        .collect();

    debug!("シート読み込み: 列={}, 行={}", headers.len(), data.len());
    Ok((headers, data))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // 整数値の数値セルは小数点なしで
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        other => other.to_string(),
    }
}

/// フォルダ直下のレポートファイルを列挙（ファイル名順）
pub fn scan_report_folder(folder: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(ContentCheckError::FileNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| extensions.iter().any(|e| extension_of(p) == e.to_lowercase()))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_check_common::ProductField;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_products_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("current.csv");
        fs::write(
            &path,
            "ASIN,Marketplace,Product Title\nB001,DE,Rote Schuhe\nB002,FR,Chaussures\n",
        )
        .unwrap();

        let records = load_products(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field(ProductField::ProductTitle), "Rote Schuhe");
    }

    #[test]
    fn test_load_products_not_found() {
        let result = load_products(Path::new("/nonexistent/current.csv"));
        assert!(matches!(result, Err(ContentCheckError::FileNotFound(_))));
    }

    #[test]
    fn test_load_products_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("current.txt");
        fs::write(&path, "ASIN,Marketplace\n").unwrap();
        assert!(matches!(load_products(&path), Err(ContentCheckError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_products_missing_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "SKU,Title\nX,Y\n").unwrap();
        assert!(matches!(load_products(&path), Err(ContentCheckError::Common(_))));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(cell_to_string(&Data::Float(10.5)), "10.5");
        assert_eq!(cell_to_string(&Data::String("B001".into())), "B001");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_scan_report_folder() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b_orders.csv"), "x").unwrap();
        fs::write(dir.path().join("a_orders.CSV"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.csv"), "x").unwrap();

        let files = scan_report_folder(dir.path(), &["csv"]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_orders.CSV", "b_orders.csv"]);
    }

    #[test]
    fn test_scan_report_folder_not_found() {
        assert!(scan_report_folder(Path::new("/nonexistent/folder"), &["csv"]).is_err());
    }
}
