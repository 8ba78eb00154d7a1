//! 照合データの型定義
//!
//! CLIとライブラリ利用側で共有される型:
//! - ProductRecord: 商品ページ1件分のコンテンツ（ASIN+マーケットプレイスで一意）
//! - FieldSelection: 比較対象フィールドの選択
//! - ComparisonResult: 照合結果（フィールド単位の類似度と総合一致率）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 比較対象フィールド
///
/// 宣言順がそのまま表示・出力の順序になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductField {
    ProductTitle,
    Description,
    BulletPoint1,
    BulletPoint2,
    BulletPoint3,
    BulletPoint4,
    BulletPoint5,
    Variations,
}

impl ProductField {
    pub const ALL: [ProductField; 8] = [
        ProductField::ProductTitle,
        ProductField::Description,
        ProductField::BulletPoint1,
        ProductField::BulletPoint2,
        ProductField::BulletPoint3,
        ProductField::BulletPoint4,
        ProductField::BulletPoint5,
        ProductField::Variations,
    ];

    /// CSV列名・JSONキー
    pub fn key(&self) -> &'static str {
        match self {
            ProductField::ProductTitle => "ProductTitle",
            ProductField::Description => "Description",
            ProductField::BulletPoint1 => "BulletPoint1",
            ProductField::BulletPoint2 => "BulletPoint2",
            ProductField::BulletPoint3 => "BulletPoint3",
            ProductField::BulletPoint4 => "BulletPoint4",
            ProductField::BulletPoint5 => "BulletPoint5",
            ProductField::Variations => "Variations",
        }
    }

    /// 表示名
    pub fn label(&self) -> &'static str {
        match self {
            ProductField::ProductTitle => "Product Title",
            ProductField::Description => "Description",
            ProductField::BulletPoint1 => "Bullet Point 1",
            ProductField::BulletPoint2 => "Bullet Point 2",
            ProductField::BulletPoint3 => "Bullet Point 3",
            ProductField::BulletPoint4 => "Bullet Point 4",
            ProductField::BulletPoint5 => "Bullet Point 5",
            ProductField::Variations => "Variations",
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for ProductField {
    type Err = String;

    /// 大文字小文字・空白を無視して解釈する（"bullet point 1" → BulletPoint1）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        ProductField::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(&compact))
            .ok_or_else(|| {
                format!(
                    "Unknown field: {}. Use one of {}",
                    s,
                    ProductField::ALL.map(|f| f.key()).join(", ")
                )
            })
    }
}

/// 商品コンテンツ1件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "ASIN")]
    pub asin: String,

    #[serde(rename = "Marketplace")]
    pub marketplace: String,

    #[serde(rename = "ProductTitle", default)]
    pub product_title: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    #[serde(rename = "BulletPoint1", default)]
    pub bullet_point1: String,

    #[serde(rename = "BulletPoint2", default)]
    pub bullet_point2: String,

    #[serde(rename = "BulletPoint3", default)]
    pub bullet_point3: String,

    #[serde(rename = "BulletPoint4", default)]
    pub bullet_point4: String,

    #[serde(rename = "BulletPoint5", default)]
    pub bullet_point5: String,

    #[serde(rename = "Variations", default)]
    pub variations: String,

    /// 商品ページURL（空文字 = なし）
    #[serde(rename = "Link", default)]
    pub link: String,
}

impl ProductRecord {
    pub fn new(asin: impl Into<String>, marketplace: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            marketplace: marketplace.into(),
            ..Default::default()
        }
    }

    /// 照合キー "ASIN-Marketplace"
    pub fn key(&self) -> String {
        format!("{}-{}", self.asin, self.marketplace)
    }

    /// フィールド値を取得
    pub fn field(&self, field: ProductField) -> &str {
        match field {
            ProductField::ProductTitle => &self.product_title,
            ProductField::Description => &self.description,
            ProductField::BulletPoint1 => &self.bullet_point1,
            ProductField::BulletPoint2 => &self.bullet_point2,
            ProductField::BulletPoint3 => &self.bullet_point3,
            ProductField::BulletPoint4 => &self.bullet_point4,
            ProductField::BulletPoint5 => &self.bullet_point5,
            ProductField::Variations => &self.variations,
        }
    }

    /// フィールド値を設定（ビルダー形式）
    pub fn with_field(mut self, field: ProductField, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            ProductField::ProductTitle => self.product_title = value,
            ProductField::Description => self.description = value,
            ProductField::BulletPoint1 => self.bullet_point1 = value,
            ProductField::BulletPoint2 => self.bullet_point2 = value,
            ProductField::BulletPoint3 => self.bullet_point3 = value,
            ProductField::BulletPoint4 => self.bullet_point4 = value,
            ProductField::BulletPoint5 => self.bullet_point5 = value,
            ProductField::Variations => self.variations = value,
        }
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

/// 比較対象フィールドの選択
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSelection {
    fields: BTreeMap<ProductField, bool>,
}

impl FieldSelection {
    /// 全フィールドを選択
    pub fn all() -> Self {
        Self::from_fields(ProductField::ALL)
    }

    /// 何も選択しない
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: impl IntoIterator<Item = ProductField>) -> Self {
        let mut selection = Self::default();
        for field in fields {
            selection.set(field, true);
        }
        selection
    }

    /// フィールド名のリストから生成（不明な名前はエラー）
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let fields = names
            .iter()
            .map(|n| n.as_ref().parse::<ProductField>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_fields(fields))
    }

    pub fn set(&mut self, field: ProductField, include: bool) {
        self.fields.insert(field, include);
    }

    pub fn is_selected(&self, field: ProductField) -> bool {
        self.fields.get(&field).copied().unwrap_or(false)
    }

    /// 選択されたフィールド（正規の順序）
    pub fn selected(&self) -> impl Iterator<Item = ProductField> + '_ {
        self.fields
            .iter()
            .filter(|(_, include)| **include)
            .map(|(field, _)| *field)
    }

    /// 1つ以上選択されているか
    pub fn has_any(&self) -> bool {
        self.fields.values().any(|include| *include)
    }
}

/// フィールド単位の比較結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    /// 現在のコンテンツ（正規化前）
    pub source1: String,
    /// 正とするコンテンツ（正規化前）
    pub source2: String,
    /// 類似度 (0-100)
    pub similarity: f64,
}

/// 商品1件の照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(rename = "ASIN")]
    pub asin: String,

    #[serde(rename = "Marketplace")]
    pub marketplace: String,

    #[serde(rename = "Link", default)]
    pub link: String,

    pub fields: BTreeMap<ProductField, FieldComparison>,

    /// 総合一致率 (0-100)
    #[serde(rename = "overallMatch")]
    pub overall_match: f64,
}
