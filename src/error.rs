use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentCheckError {
    #[error(transparent)]
    Common(#[from] content_check_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("対応していないファイル形式です: {0}（csv / xlsx を指定してください）")]
    UnsupportedFormat(String),

    #[error("比較するフィールドが選択されていません")]
    NoFieldsSelected,

    #[error("一致する商品がありません（ASINとMarketplaceを確認してください）")]
    NoMatches,

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("Excel読み込みエラー: {0}")]
    XlsxRead(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("バックグラウンド処理エラー: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ContentCheckError>;
