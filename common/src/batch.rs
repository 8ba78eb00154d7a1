//! 要対応結果のバッチ分割
//!
//! 閾値未満のフィールドを持つ結果を抽出し、マーケットプレイスごとに
//! 一定件数のバッチへ分割する。バッチIDは実行全体で通し番号。

use crate::types::{ComparisonResult, FieldSelection, ProductField};
use log::debug;
use serde::{Deserialize, Serialize};

/// 要対応とみなす類似度の閾値（%）
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 90.0;

/// 1バッチあたりの件数
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// 対象範囲
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchScope {
    #[default]
    All,
    Marketplace(String),
}

impl BatchScope {
    pub fn from_option(marketplace: Option<&str>) -> Self {
        match marketplace {
            Some(m) if !m.is_empty() => BatchScope::Marketplace(m.to_string()),
            _ => BatchScope::All,
        }
    }

    fn includes(&self, marketplace: &str) -> bool {
        match self {
            BatchScope::All => true,
            BatchScope::Marketplace(m) => m == marketplace,
        }
    }
}

/// バッチ分割ポリシー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPolicy {
    /// この値未満のフィールドがある結果だけを対象にする（None = 全件）
    pub threshold_percent: Option<f64>,
    pub chunk_size: usize,
    pub scope: BatchScope,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::open_cases()
    }
}

impl BatchPolicy {
    /// 要対応ケース（90%未満、10件ずつ、全マーケットプレイス）
    pub fn open_cases() -> Self {
        Self {
            threshold_percent: Some(DEFAULT_THRESHOLD_PERCENT),
            chunk_size: DEFAULT_CHUNK_SIZE,
            scope: BatchScope::All,
        }
    }

    /// 全件出力（閾値なし、件数指定）
    pub fn full_export(chunk_size: usize) -> Self {
        Self {
            threshold_percent: None,
            chunk_size,
            scope: BatchScope::All,
        }
    }

    pub fn with_threshold(mut self, threshold_percent: f64) -> Self {
        self.threshold_percent = Some(threshold_percent);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_scope(mut self, scope: BatchScope) -> Self {
        self.scope = scope;
        self
    }
}

/// 出力用バッチ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: usize,
    pub marketplace: String,
    pub results: Vec<ComparisonResult>,
}

/// 選択フィールドのうち閾値未満のもの（正規の順序）
pub fn fields_below_threshold(
    result: &ComparisonResult,
    selection: &FieldSelection,
    threshold_percent: f64,
) -> Vec<ProductField> {
    result
        .fields
        .iter()
        .filter(|(field, comparison)| {
            selection.is_selected(**field) && comparison.similarity < threshold_percent
        })
        .map(|(field, _)| *field)
        .collect()
}

/// 選択フィールドに閾値未満のものが1つでもあるか
pub fn needs_attention(
    result: &ComparisonResult,
    selection: &FieldSelection,
    threshold_percent: f64,
) -> bool {
    result.fields.iter().any(|(field, comparison)| {
        selection.is_selected(*field) && comparison.similarity < threshold_percent
    })
}

/// ポリシーに従って結果をバッチに分割する
///
/// マーケットプレイスは初出順、各グループ内は入力順を保持する。
pub fn partition_batches(
    results: &[ComparisonResult],
    selection: &FieldSelection,
    policy: &BatchPolicy,
) -> Vec<Batch> {
    let chunk_size = policy.chunk_size.max(1);

    let mut groups: Vec<(String, Vec<&ComparisonResult>)> = Vec::new();
    for result in results {
        if !policy.scope.includes(&result.marketplace) {
            continue;
        }
        if let Some(threshold) = policy.threshold_percent {
            if !needs_attention(result, selection, threshold) {
                continue;
            }
        }

        match groups.iter_mut().find(|(m, _)| *m == result.marketplace) {
            Some((_, members)) => members.push(result),
            None => groups.push((result.marketplace.clone(), vec![result])),
        }
    }

    let mut batches = Vec::new();
    for (marketplace, members) in groups {
        for chunk in members.chunks(chunk_size) {
            batches.push(Batch {
                id: batches.len() + 1,
                marketplace: marketplace.clone(),
                results: chunk.iter().map(|r| (*r).clone()).collect(),
            });
        }
    }

    debug!(
        "バッチ分割: 入力={}件, バッチ={}件 (閾値={:?}, 件数={})",
        results.len(),
        batches.len(),
        policy.threshold_percent,
        chunk_size
    );

    batches
}
