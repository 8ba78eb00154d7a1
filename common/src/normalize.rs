//! テキスト正規化
//!
//! 比較前に自由記述テキストを正規形へ変換する。

/// 比較用にテキストを正規化する
///
/// 小文字化し、英数字・空白以外の文字を除去してから前後の空白を取り除く。
/// 英数字判定はUnicode準拠（ä, é, ß などは保持）。
pub fn preprocess_text(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    filtered.trim().to_string()
}

/// 未設定値を含めて正規化する
pub fn preprocess_optional(text: Option<&str>) -> String {
    text.map(preprocess_text).unwrap_or_default()
}
