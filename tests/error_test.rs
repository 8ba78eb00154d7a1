//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use content_check_common::Error as CommonError;
use content_check_rust::error::ContentCheckError;
use content_check_rust::{export, loader, sales};
use std::path::Path;
use tempfile::tempdir;

/// 存在しないファイルを読み込んだ場合
#[test]
fn test_load_nonexistent_file() {
    let result = loader::load_products(Path::new("/nonexistent/path/current.csv"));
    assert!(matches!(result, Err(ContentCheckError::FileNotFound(_))));
}

/// 対応していない拡張子
#[test]
fn test_load_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("current.json");
    std::fs::write(&path, "[]").unwrap();

    let err = loader::load_products(&path).unwrap_err();
    assert!(matches!(err, ContentCheckError::UnsupportedFormat(_)));
    assert!(err.to_string().contains("current.json"));
}

/// 必須列がないCSV
#[test]
fn test_load_csv_missing_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("current.csv");
    std::fs::write(&path, "SKU,Product Title\nX1,Shoes\n").unwrap();

    let err = loader::load_products(&path).unwrap_err();
    match &err {
        ContentCheckError::Common(CommonError::MissingColumns { columns, available }) => {
            assert_eq!(columns, &vec!["ASIN".to_string(), "Marketplace".to_string()]);
            assert_eq!(available, &vec!["SKU".to_string(), "ProductTitle".to_string()]);
        }
        other => panic!("MissingColumnsになるべき: {:?}", other),
    }
    // 共通エラーのメッセージはそのまま表示される
    assert!(err.to_string().starts_with("Missing required columns: ASIN, Marketplace"));
}

/// 壊れたxlsx
#[test]
fn test_load_corrupt_xlsx() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("current.xlsx");
    std::fs::write(&path, b"not a zip file").unwrap();

    let result = loader::load_products(&path);
    assert!(matches!(result, Err(ContentCheckError::XlsxRead(_))));
}

/// ヘッダーのみのCSVは空の結果
#[test]
fn test_load_header_only_csv() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("current.csv");
    std::fs::write(&path, "ASIN,Marketplace\n").unwrap();

    let records = loader::load_products(&path).expect("ヘッダーのみは正常");
    assert!(records.is_empty());
}

/// 不正なJSON
#[test]
fn test_load_invalid_results_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("results.json");
    std::fs::write(&path, "{ invalid json }").unwrap();

    let result = export::load_results(&path);
    assert!(matches!(result, Err(ContentCheckError::JsonParse(_))));
}

#[test]
fn test_load_results_not_found() {
    let result = export::load_results(Path::new("/nonexistent/results.json"));
    assert!(matches!(result, Err(ContentCheckError::FileNotFound(_))));
}

/// 注文レポートのpurchase-date欠落
#[test]
fn test_orders_missing_purchase_date() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("orders.csv");
    std::fs::write(&path, "purchase-date,asin,item-price\n,B001,10\n").unwrap();

    let err = sales::load_orders(&path).unwrap_err();
    assert!(matches!(err, ContentCheckError::Common(CommonError::Parse(_))));
    assert!(err.to_string().contains("purchase date"));
}

/// エラーメッセージの表示
#[test]
fn test_error_messages() {
    assert_eq!(
        ContentCheckError::NoFieldsSelected.to_string(),
        "比較するフィールドが選択されていません"
    );
    assert!(ContentCheckError::ExcelGeneration("x".into()).to_string().contains("Excel生成エラー"));
    assert!(ContentCheckError::Task("join".into()).to_string().contains("join"));

    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: ContentCheckError = io.into();
    assert!(err.to_string().contains("IOエラー"));
}
