//! Content Check Common Library
//!
//! CLIとライブラリ利用側で共有される照合エンジン

pub mod types;
pub mod error;
pub mod normalize;
pub mod similarity;
pub mod compare;
pub mod stats;
pub mod batch;
pub mod message;
pub mod source;
pub mod export;

pub use types::{ComparisonResult, FieldComparison, FieldSelection, ProductField, ProductRecord};
pub use error::{Error, Result};
pub use normalize::preprocess_text;
pub use similarity::{calculate_similarity, levenshtein_distance};
pub use compare::{compare_field, compare_fields, compare_products, compare_sources, find_missing_asins};
pub use stats::{calculate_statistics, field_summary, MatchGrade, Statistics};
pub use batch::{partition_batches, Batch, BatchPolicy, BatchScope};
pub use message::support_message;
pub use source::{parse_products_csv, records_from_table, template_csv};
