//! 類似度計算
//!
//! 編集距離（レーベンシュタイン）と単語集合（ジャッカード）の加重平均。

use std::collections::HashSet;

/// 編集距離の重み
pub const LEVENSHTEIN_WEIGHT: f64 = 0.7;
/// 単語集合の重み
pub const JACCARD_WEIGHT: f64 = 0.3;

/// 正規化済み文字列同士の類似度 (0.0-1.0)
pub fn calculate_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let score = levenshtein_similarity(a, b) * LEVENSHTEIN_WEIGHT
        + jaccard_similarity(a, b) * JACCARD_WEIGHT;
    score.clamp(0.0, 1.0)
}

/// 編集距離ベースの類似度 (0.0-1.0)
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

/// 単語集合のジャッカード係数 (0.0-1.0)
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();

    intersection as f64 / union as f64
}

/// レーベンシュタイン距離（文字単位、1行DP）
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("größe", "grösse"), 2);
    }

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(calculate_similarity("", ""), 1.0);
        assert_eq!(calculate_similarity("red shoes", "red shoes"), 1.0);
        assert_eq!(calculate_similarity("red shoes", ""), 0.0);
        assert_eq!(calculate_similarity("", "red shoes"), 0.0);
    }

    #[test]
    fn test_completely_different() {
        // 共通の単語なし・全文字置換
        assert_eq!(calculate_similarity("abc", "xyz"), 0.0);
        assert_eq!(levenshtein_similarity("abc", "xyz"), 0.0);
        assert_eq!(jaccard_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_reordered_tokens() {
        let a = "red shoes size 10";
        let b = "shoes red 10 size";
        assert_eq!(jaccard_similarity(a, b), 1.0);

        let edit = levenshtein_similarity(a, b);
        assert!(edit < 1.0);
        // 距離13 / 最大長17
        assert!((edit - 4.0 / 17.0).abs() < 1e-9);

        let blended = calculate_similarity(a, b);
        let expected = edit * LEVENSHTEIN_WEIGHT + JACCARD_WEIGHT;
        assert!((blended - expected).abs() < 1e-9);
        assert!(blended > JACCARD_WEIGHT && blended < 1.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("organic green tea 100 bags", "organic green tea 50 bags"),
            ("kitten", "sitting"),
            ("red shoes", "blue shoes"),
            ("größe m", "grosse m"),
        ];
        for (a, b) in pairs {
            assert_eq!(levenshtein_similarity(a, b), levenshtein_similarity(b, a));
            assert_eq!(jaccard_similarity(a, b), jaccard_similarity(b, a));
            assert_eq!(calculate_similarity(a, b), calculate_similarity(b, a));
        }
    }

    #[test]
    fn test_partial_overlap() {
        let score = calculate_similarity("organic green tea 100 bags", "organic green tea 50 bags");
        // 編集距離 2/26、単語 4/6
        let expected = (1.0 - 2.0 / 26.0) * 0.7 + (4.0 / 6.0) * 0.3;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_range() {
        let pairs = [("a", "bbbbbbbbbb"), ("x y z", "z"), ("same", "same"), ("ab", "ba")];
        for (a, b) in pairs {
            let s = calculate_similarity(a, b);
            assert!((0.0..=1.0).contains(&s), "{} vs {} = {}", a, b, s);
        }
    }
}
