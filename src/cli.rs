use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "content-check")]
#[command(about = "Amazon商品ページのコンテンツ照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 2つのデータソースを照合して結果JSONを出力
    Compare {
        /// 現在のコンテンツ（csv/xlsx）
        #[arg(required = true)]
        source1: PathBuf,

        /// 正とするコンテンツ（csv/xlsx）
        #[arg(required = true)]
        source2: PathBuf,

        /// 比較フィールド（カンマ区切り、省略時は設定値）
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,

        /// 対話的にフィールドを選択
        #[arg(short, long)]
        interactive: bool,

        /// サマリーを表示するマーケットプレイス
        #[arg(short, long)]
        marketplace: Option<String>,

        /// 出力JSONファイル
        #[arg(short, long, default_value = "comparison_results.json")]
        output: PathBuf,

        /// 照合レポート（xlsx）の出力先
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 照合結果から要対応バッチ（Excel・問い合わせ文面）を出力
    Cases {
        /// 照合結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 要対応とみなす閾値（%、省略時は設定値）
        #[arg(short, long)]
        threshold: Option<f64>,

        /// 1バッチあたりの件数（省略時は設定値）
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// 閾値に関係なく全件を出力
        #[arg(long)]
        all: bool,

        /// 対象マーケットプレイス（省略時は全て）
        #[arg(short, long)]
        marketplace: Option<String>,

        /// 比較フィールド（カンマ区切り、省略時は結果に含まれる全フィールド）
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,

        /// 出力ディレクトリ
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// 出力形式 (excel/json/both)
        #[arg(long, default_value = "both")]
        format: ExportFormat,
    },

    /// source1にあってsource2にないASINを表示
    Missing {
        #[arg(required = true)]
        source1: PathBuf,

        #[arg(required = true)]
        source2: PathBuf,
    },

    /// 入力用CSVテンプレートを出力
    Template {
        /// 出力ファイル
        #[arg(short, long, default_value = "template.csv")]
        output: PathBuf,
    },

    /// 注文レポートとPBI売上を突合
    Sales {
        /// 注文レポートCSV（ファイルまたはフォルダ）
        #[arg(required = true)]
        orders: PathBuf,

        /// PBI売上CSV
        #[arg(required = true)]
        pbi: PathBuf,

        /// 注文ステータスで絞り込み
        #[arg(long)]
        status: Option<String>,

        /// ASINメタデータCSV（ドリルダウン用）
        #[arg(long)]
        metadata: Option<PathBuf>,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        subcategory: Option<String>,

        #[arg(long)]
        product_type: Option<String>,

        /// 出力JSONファイル
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 要対応の閾値（%）
        #[arg(long)]
        threshold: Option<f64>,

        /// バッチ件数
        #[arg(long)]
        batch_size: Option<usize>,

        /// 既定の比較フィールド（カンマ区切り）
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// 問い合わせ文面の署名
        #[arg(long)]
        signature: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Json,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn includes_excel(&self) -> bool {
        matches!(self, ExportFormat::Excel | ExportFormat::Both)
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use excel, json, or both", s)),
        }
    }
}
