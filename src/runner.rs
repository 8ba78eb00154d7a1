//! 照合の実行
//!
//! 照合処理はブロッキングタスクで実行し、その間スピナーを表示する。

use crate::error::{ContentCheckError, Result};
use content_check_common::{compare_sources, ComparisonResult, FieldSelection, ProductRecord};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::{Duration, Instant};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 2つのデータソースを照合する
pub async fn run_comparison(
    source1: Vec<ProductRecord>,
    source2: Vec<ProductRecord>,
    selection: FieldSelection,
) -> Result<Vec<ComparisonResult>> {
    let pb = spinner("照合中...");
    let started = Instant::now();

    let handle = tokio::task::spawn_blocking(move || compare_sources(&source1, &source2, &selection));
    let results = handle.await.map_err(|e| ContentCheckError::Task(e.to_string()));

    pb.finish_and_clear();
    let results = results?;

    info!("照合: {}件 ({:.2?})", results.len(), started.elapsed());
    Ok(results)
}
