//! サポート問い合わせ文面の生成
//!
//! バッチごとに、更新が必要なASINとフィールドを列挙したテキストを作る。

use crate::batch::{fields_below_threshold, Batch};
use crate::types::FieldSelection;

/// 署名のデフォルト
pub const DEFAULT_SIGNATURE: &str = "Thanks!";

/// バッチ1件分の問い合わせ文面
pub fn support_message(
    batch: &Batch,
    selection: &FieldSelection,
    threshold_percent: f64,
    signature: &str,
) -> String {
    let sections = batch
        .results
        .iter()
        .map(|result| {
            let fields = fields_below_threshold(result, selection, threshold_percent)
                .iter()
                .map(|field| format!("- {}", field.key()))
                .collect::<Vec<_>>()
                .join("\n");
            format!("[{}]:\n{}", result.asin, fields)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let signature = if signature.trim().is_empty() {
        DEFAULT_SIGNATURE
    } else {
        signature
    };

    format!(
        "Hi team,\n\n\
         I am writing regarding content updates needed for the following ASINs in the marketplace {}:\n\n\
         {}\n\n\
         As brand owners, we would like to request your assistance to get the right content live. \
         Please see the attached Excel file where the yellow cells indicate the content that needs to be updated.\n\n\
         {}",
        batch.marketplace, sections, signature
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComparisonResult, FieldComparison, ProductField};
    use std::collections::BTreeMap;

    fn result(asin: &str, scores: &[(ProductField, f64)]) -> ComparisonResult {
        ComparisonResult {
            asin: asin.to_string(),
            marketplace: "DE".to_string(),
            link: String::new(),
            fields: scores
                .iter()
                .map(|(f, s)| {
                    (*f, FieldComparison { source1: String::new(), source2: String::new(), similarity: *s })
                })
                .collect::<BTreeMap<_, _>>(),
            overall_match: 0.0,
        }
    }

    #[test]
    fn test_support_message_sections() {
        let batch = Batch {
            id: 1,
            marketplace: "DE".to_string(),
            results: vec![
                result("B001", &[(ProductField::ProductTitle, 50.0), (ProductField::BulletPoint2, 95.0)]),
                result("B002", &[(ProductField::ProductTitle, 95.0), (ProductField::Variations, 10.0)]),
            ],
        };
        let selection = FieldSelection::all();
        let message = support_message(&batch, &selection, 90.0, "");

        assert!(message.starts_with("Hi team,"));
        assert!(message.contains("in the marketplace DE:"));
        assert!(message.contains("[B001]:\n- ProductTitle\n\n[B002]:\n- Variations"));
        assert!(!message.contains("- BulletPoint2"));
        assert!(message.contains("yellow cells"));
        assert!(message.ends_with("Thanks!"));
    }

    #[test]
    fn test_support_message_unselected_fields_omitted() {
        let batch = Batch {
            id: 2,
            marketplace: "FR".to_string(),
            results: vec![result("B003", &[(ProductField::ProductTitle, 10.0), (ProductField::Description, 10.0)])],
        };
        let selection = FieldSelection::from_fields([ProductField::Description]);
        let message = support_message(&batch, &selection, 90.0, "Best regards,\nBrand Team");

        assert!(message.contains("[B003]:\n- Description"));
        assert!(!message.contains("- ProductTitle"));
        assert!(message.ends_with("Best regards,\nBrand Team"));
    }
}
