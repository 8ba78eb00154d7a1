//! 照合結果の集計
//!
//! - 全体統計（件数、完全一致数、マーケットプレイス別・フィールド別の平均）
//! - ダッシュボード用のフィールド別サマリー

use crate::types::{ComparisonResult, FieldSelection, ProductField};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// 完全一致とみなす総合一致率（加重平均の丸め誤差を許容）
pub const PERFECT_MATCH_THRESHOLD: f64 = 99.9;

/// 高一致とみなす類似度
pub const HIGH_MATCH_THRESHOLD: f64 = 90.0;

/// 中一致とみなす類似度
pub const MEDIUM_MATCH_THRESHOLD: f64 = 70.0;

/// 全体統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_products: usize,
    pub perfect_matches: usize,
    /// マーケットプレイス別の総合一致率平均
    pub marketplace_stats: BTreeMap<String, f64>,
    /// フィールド別の類似度平均（分母は全結果数）
    pub field_stats: BTreeMap<ProductField, f64>,
}

/// 照合結果から全体統計を計算する
pub fn calculate_statistics(results: &[ComparisonResult]) -> Statistics {
    let mut marketplace_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut field_sums: BTreeMap<ProductField, f64> = BTreeMap::new();
    let mut perfect_matches = 0;

    for result in results {
        let entry = marketplace_sums
            .entry(result.marketplace.clone())
            .or_insert((0.0, 0));
        entry.0 += result.overall_match;
        entry.1 += 1;

        for (field, comparison) in &result.fields {
            *field_sums.entry(*field).or_insert(0.0) += comparison.similarity;
        }

        if result.overall_match >= PERFECT_MATCH_THRESHOLD {
            perfect_matches += 1;
        }
    }

    let marketplace_stats = marketplace_sums
        .into_iter()
        .map(|(marketplace, (sum, count))| (marketplace, sum / count as f64))
        .collect();

    let total = results.len();
    let field_stats = field_sums
        .into_iter()
        .map(|(field, sum)| (field, sum / total as f64))
        .collect();

    Statistics {
        total_products: total,
        perfect_matches,
        marketplace_stats,
        field_stats,
    }
}

/// 結果に含まれるマーケットプレイス（初出順）
pub fn marketplaces(results: &[ComparisonResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|r| seen.insert(r.marketplace.as_str()))
        .map(|r| r.marketplace.clone())
        .collect()
}

/// マーケットプレイスで絞り込む（None = 全件）
pub fn filter_by_marketplace<'a>(
    results: &'a [ComparisonResult],
    marketplace: Option<&'a str>,
) -> impl Iterator<Item = &'a ComparisonResult> + 'a {
    results
        .iter()
        .filter(move |r| marketplace.map_or(true, |m| r.marketplace == m))
}

/// フィールド別サマリー
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub average: f64,
    pub high_match_count: usize,
}

/// 選択フィールドごとの平均類似度と高一致件数
///
/// 平均の分母はそのフィールドを持つ結果の件数。
pub fn field_summary(
    results: &[ComparisonResult],
    selection: &FieldSelection,
    marketplace: Option<&str>,
) -> BTreeMap<ProductField, FieldSummary> {
    selection
        .selected()
        .map(|field| {
            let mut total = 0.0;
            let mut count = 0usize;
            let mut high_match_count = 0usize;

            for result in filter_by_marketplace(results, marketplace) {
                if let Some(comparison) = result.fields.get(&field) {
                    total += comparison.similarity;
                    count += 1;
                    if comparison.similarity >= HIGH_MATCH_THRESHOLD {
                        high_match_count += 1;
                    }
                }
            }

            let average = if count > 0 { total / count as f64 } else { 0.0 };
            (field, FieldSummary { average, high_match_count })
        })
        .collect()
}

/// 一致度の区分（表示の色分けに使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchGrade {
    High,
    Medium,
    Low,
}

impl MatchGrade {
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity >= HIGH_MATCH_THRESHOLD {
            MatchGrade::High
        } else if similarity >= MEDIUM_MATCH_THRESHOLD {
            MatchGrade::Medium
        } else {
            MatchGrade::Low
        }
    }
}

impl std::fmt::Display for MatchGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchGrade::High => write!(f, "high"),
            MatchGrade::Medium => write!(f, "medium"),
            MatchGrade::Low => write!(f, "low"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldComparison;

    fn result(asin: &str, marketplace: &str, scores: &[(ProductField, f64)], overall: f64) -> ComparisonResult {
        ComparisonResult {
            asin: asin.to_string(),
            marketplace: marketplace.to_string(),
            link: String::new(),
            fields: scores
                .iter()
                .map(|(field, similarity)| {
                    (
                        *field,
                        FieldComparison {
                            source1: "a".to_string(),
                            source2: "b".to_string(),
                            similarity: *similarity,
                        },
                    )
                })
                .collect(),
            overall_match: overall,
        }
    }

    #[test]
    fn test_statistics_empty() {
        let stats = calculate_statistics(&[]);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.perfect_matches, 0);
        assert!(stats.marketplace_stats.is_empty());
        assert!(stats.field_stats.is_empty());
    }

    #[test]
    fn test_statistics_basic() {
        let results = vec![
            result("A1", "DE", &[(ProductField::ProductTitle, 100.0)], 100.0),
            result("A2", "DE", &[(ProductField::ProductTitle, 60.0)], 60.0),
            result("A3", "FR", &[(ProductField::ProductTitle, 99.95)], 99.95),
            result("A4", "FR", &[(ProductField::ProductTitle, 99.85)], 99.85),
        ];
        let stats = calculate_statistics(&results);

        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.perfect_matches, 2);
        assert!((stats.marketplace_stats["DE"] - 80.0).abs() < 1e-9);
        assert!((stats.marketplace_stats["FR"] - 99.9).abs() < 1e-9);
        assert!((stats.field_stats[&ProductField::ProductTitle] - 89.95).abs() < 1e-9);
    }

    #[test]
    fn test_field_stats_divided_by_total() {
        // Descriptionは1件にしかないが分母は全件数
        let results = vec![
            result("A1", "DE", &[(ProductField::ProductTitle, 100.0), (ProductField::Description, 80.0)], 90.0),
            result("A2", "DE", &[(ProductField::ProductTitle, 50.0)], 50.0),
        ];
        let stats = calculate_statistics(&results);
        assert!((stats.field_stats[&ProductField::Description] - 40.0).abs() < 1e-9);
        assert!((stats.field_stats[&ProductField::ProductTitle] - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_marketplaces_first_seen_order() {
        let results = vec![
            result("A1", "FR", &[], 0.0),
            result("A2", "DE", &[], 0.0),
            result("A3", "FR", &[], 0.0),
        ];
        assert_eq!(marketplaces(&results), vec!["FR".to_string(), "DE".to_string()]);
        assert_eq!(filter_by_marketplace(&results, Some("FR")).count(), 2);
        assert_eq!(filter_by_marketplace(&results, None).count(), 3);
    }

    #[test]
    fn test_field_summary() {
        let results = vec![
            result("A1", "DE", &[(ProductField::ProductTitle, 95.0)], 95.0),
            result("A2", "DE", &[(ProductField::ProductTitle, 45.0)], 45.0),
            result("A3", "FR", &[(ProductField::ProductTitle, 90.0)], 90.0),
        ];
        let selection = FieldSelection::from_fields([ProductField::ProductTitle, ProductField::Variations]);

        let all = field_summary(&results, &selection, None);
        let title = all[&ProductField::ProductTitle];
        assert!((title.average - 230.0 / 3.0).abs() < 1e-9);
        assert_eq!(title.high_match_count, 2);
        // 結果に存在しないフィールドは0
        assert_eq!(all[&ProductField::Variations], FieldSummary::default());

        let de = field_summary(&results, &selection, Some("DE"));
        assert!((de[&ProductField::ProductTitle].average - 70.0).abs() < 1e-9);
        assert_eq!(de[&ProductField::ProductTitle].high_match_count, 1);
    }

    #[test]
    fn test_match_grade() {
        assert_eq!(MatchGrade::from_similarity(100.0), MatchGrade::High);
        assert_eq!(MatchGrade::from_similarity(90.0), MatchGrade::High);
        assert_eq!(MatchGrade::from_similarity(89.99), MatchGrade::Medium);
        assert_eq!(MatchGrade::from_similarity(70.0), MatchGrade::Medium);
        assert_eq!(MatchGrade::from_similarity(0.0), MatchGrade::Low);
    }
}
