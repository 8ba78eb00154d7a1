//! 商品コンテンツ照合
//!
//! - フィールド単位の比較（空値の扱いを含む）
//! - 商品単位の比較と総合一致率
//! - 2つのデータソースの結合（ASIN+マーケットプレイス）

use crate::normalize::preprocess_text;
use crate::similarity::calculate_similarity;
use crate::types::{ComparisonResult, FieldComparison, FieldSelection, ProductRecord};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// 2つの値の類似度を計算する (0-100)
///
/// - 両方空 → 100（差異なし）
/// - 片方のみ空 → 0
/// - それ以外 → 正規化して類似度を計算
pub fn compare_fields(value1: Option<&str>, value2: Option<&str>) -> f64 {
    let text1 = value1.unwrap_or("");
    let text2 = value2.unwrap_or("");

    match (text1.is_empty(), text2.is_empty()) {
        (true, true) => 100.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            calculate_similarity(&preprocess_text(text1), &preprocess_text(text2)) * 100.0
        }
    }
}

/// 元の値を保持したフィールド比較結果を作る
pub fn compare_field(value1: Option<&str>, value2: Option<&str>) -> FieldComparison {
    FieldComparison {
        source1: value1.unwrap_or("").to_string(),
        source2: value2.unwrap_or("").to_string(),
        similarity: compare_fields(value1, value2),
    }
}

/// 同一商品と見なした2件を選択フィールドで比較する
///
/// 総合一致率は、少なくとも一方に値があるフィールドの平均。
/// 両方空のフィールドは結果には残すが平均には含めない。
pub fn compare_products(
    source1: &ProductRecord,
    source2: &ProductRecord,
    selection: &FieldSelection,
) -> ComparisonResult {
    let fields: BTreeMap<_, _> = selection
        .selected()
        .map(|field| {
            let comparison = compare_field(Some(source1.field(field)), Some(source2.field(field)));
            (field, comparison)
        })
        .collect();

    let (sum, count) = fields
        .values()
        .filter(|f| !f.source1.is_empty() || !f.source2.is_empty())
        .fold((0.0, 0usize), |(sum, count), f| (sum + f.similarity, count + 1));

    let overall_match = if count > 0 { sum / count as f64 } else { 0.0 };

    let link = if !source1.link.is_empty() {
        source1.link.clone()
    } else {
        source2.link.clone()
    };

    ComparisonResult {
        asin: source1.asin.clone(),
        marketplace: source1.marketplace.clone(),
        link,
        fields,
        overall_match,
    }
}

/// 2つのデータソースを照合する
///
/// source1をキーで索引化し、source2の順に一致したものだけ結果にする。
/// 片方にしかないキーは結果に含めない。
pub fn compare_sources(
    source1: &[ProductRecord],
    source2: &[ProductRecord],
    selection: &FieldSelection,
) -> Vec<ComparisonResult> {
    let mut index: HashMap<(&str, &str), &ProductRecord> = HashMap::with_capacity(source1.len());
    for record in source1 {
        let key = (record.asin.as_str(), record.marketplace.as_str());
        if index.insert(key, record).is_some() {
            warn!("重複キー（後の行を使用）: {}", record.key());
        }
    }

    let results: Vec<ComparisonResult> = source2
        .iter()
        .filter_map(|product2| {
            index
                .get(&(product2.asin.as_str(), product2.marketplace.as_str()))
                .map(|product1| compare_products(product1, product2, selection))
        })
        .collect();

    debug!(
        "照合完了: source1={}件, source2={}件, 一致={}件",
        source1.len(),
        source2.len(),
        results.len()
    );

    results
}

/// `a` にあって `b` にないASIN（重複除去・昇順）
pub fn find_missing_asins(a: &[ProductRecord], b: &[ProductRecord]) -> Vec<String> {
    let present: HashSet<&str> = b.iter().map(|r| r.asin.as_str()).collect();

    a.iter()
        .map(|r| r.asin.as_str())
        .filter(|asin| !present.contains(asin))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
