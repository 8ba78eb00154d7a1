//! エクスポート機能（共通）

#[cfg(feature = "excel")]
pub mod excel_core;
