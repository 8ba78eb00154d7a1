use clap::Parser;
use content_check_common::stats::{field_summary, marketplaces, MatchGrade};
use content_check_common::{
    calculate_statistics, find_missing_asins, partition_batches, template_csv, BatchPolicy, BatchScope,
};
use content_check_rust::{cli, config, error, export, field_selector, loader, runner, sales};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::path::PathBuf;

fn init_logger(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Compare { source1, source2, fields, interactive, marketplace, output, report } => {
            println!("🔍 content-check - コンテンツ照合\n");

            // 1. 読み込み
            println!("[1/3] データを読み込み中...");
            let current = loader::load_products(&source1)?;
            let required = loader::load_products(&source2)?;
            println!("✔ 現在: {}件 / 正: {}件\n", current.len(), required.len());

            let mut selection = field_selector::resolve_selection(&fields, config.selection()?)?;
            if interactive {
                selection = field_selector::select_fields_interactive(&selection)?;
            }

            // 2. 照合
            println!("[2/3] 照合中...");
            let results = runner::run_comparison(current, required, selection.clone()).await?;
            if results.is_empty() {
                return Err(error::ContentCheckError::NoMatches);
            }
            println!("✔ {}件を照合\n", results.len());

            let stats = calculate_statistics(&results);
            println!("統計:");
            println!("  商品数: {}", stats.total_products);
            println!("  完全一致: {}", stats.perfect_matches);
            for (mp, avg) in &stats.marketplace_stats {
                println!("  {}: {:.1}%", mp, avg);
            }

            let scope = marketplace.as_deref();
            println!(
                "\nフィールド別（{}）:",
                scope.map(str::to_string).unwrap_or_else(|| marketplaces(&results).join(", "))
            );
            for (field, summary) in field_summary(&results, &selection, scope) {
                println!(
                    "  {:<16} {:>6.1}% [{}] 高一致 {}件",
                    field.label(),
                    summary.average,
                    MatchGrade::from_similarity(summary.average),
                    summary.high_match_count
                );
            }
            println!();

            // 3. 保存
            println!("[3/3] 結果を保存中...");
            export::save_results(&results, &output)?;
            println!("✔ 結果を保存: {}", output.display());

            if let Some(report_path) = report {
                export::excel::generate_report_excel(&results, &selection, config.threshold_percent, &report_path)?;
                println!("✔ レポート出力: {}", report_path.display());
            }

            println!("\n✅ 照合完了");
        }

        Commands::Cases { input, threshold, batch_size, all, marketplace, fields, output, format } => {
            println!("📦 content-check - 要対応バッチ出力\n");

            let results = export::load_results(&input)?;
            let selection =
                field_selector::resolve_selection(&fields, export::selection_from_results(&results))?;

            let threshold = threshold.unwrap_or(config.threshold_percent);
            let chunk_size = batch_size.unwrap_or(config.batch_size);
            let policy = if all {
                BatchPolicy::full_export(chunk_size)
            } else {
                BatchPolicy::open_cases().with_threshold(threshold).with_chunk_size(chunk_size)
            }
            .with_scope(BatchScope::from_option(marketplace.as_deref()));

            let batches = partition_batches(&results, &selection, &policy);
            if batches.is_empty() {
                println!("✔ 要対応の商品はありません（閾値: {}%）", threshold);
                return Ok(());
            }
            println!("- {}件のバッチを出力中...", batches.len());

            let options = export::CaseExportOptions {
                selection: &selection,
                threshold_percent: threshold,
                signature: &config.support_signature,
                format,
            };
            let written = export::export_batches(&batches, &options, &output)?;

            println!("\n✅ {}ファイルを出力: {}", written.len(), output.display());
        }

        Commands::Missing { source1, source2 } => {
            let a = loader::load_products(&source1)?;
            let b = loader::load_products(&source2)?;
            let missing = find_missing_asins(&a, &b);

            if missing.is_empty() {
                println!("✔ 不足しているASINはありません");
            } else {
                println!("⚠ {}にないASIN: {}件", source2.display(), missing.len());
                for asin in &missing {
                    println!("  {}", asin);
                }
            }
        }

        Commands::Template { output } => {
            std::fs::write(&output, template_csv())?;
            println!("✔ テンプレートを出力: {}", output.display());
        }

        Commands::Sales {
            orders,
            pbi,
            status,
            metadata,
            brand,
            category,
            client,
            subcategory,
            product_type,
            output,
        } => {
            println!("💶 content-check - 売上突合\n");

            println!("[1/2] レポートを読み込み中...");
            let all_orders = sales::load_orders(&orders)?;
            let statuses = sales::unique_values(&all_orders, |o| o.order_status.as_str());
            let order_rows = sales::filter_by_status(&all_orders, status.as_deref());
            let mut pbi_rows = sales::load_pbi(&pbi)?;
            println!("✔ 注文: {}行 / PBI: {}行", order_rows.len(), pbi_rows.len());
            if !statuses.is_empty() {
                println!("  ステータス: {}", statuses.join(", "));
            }
            if let Some((first, last)) = sales::date_range(&order_rows) {
                println!("  期間: {} 〜 {}", first, last);
            }

            if let Some(metadata_path) = metadata {
                let metadata = sales::load_metadata(&metadata_path)?;
                let filter = sales::MetadataFilter { brand, category, client, subcategory, product_type };
                pbi_rows = filter.apply(&pbi_rows, &metadata);
                println!("  ドリルダウン後のPBI: {}行", pbi_rows.len());
            }
            println!();

            println!("[2/2] 突合中...");
            let report = sales::SalesReport::build(&order_rows, &pbi_rows);
            println!("✔ 売上合計: {:.2} EUR", report.total_eur);
            for total in &report.by_marketplace {
                println!("  {}: {:.2} EUR / {}個", total.key, total.total, total.units);
            }
            if !report.missing_asins.is_empty() {
                println!("⚠ PBIにないASIN: {}", report.missing_asins.join(", "));
            }

            let output = output.unwrap_or_else(|| PathBuf::from("sales_comparison.json"));
            std::fs::write(&output, serde_json::to_string_pretty(&report)?)?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ 突合完了");
        }

        Commands::Config { show, threshold, batch_size, fields, signature } => {
            let mut config = config;
            let mut changed = false;

            if let Some(t) = threshold {
                config.set_threshold(t)?;
                changed = true;
            }
            if let Some(n) = batch_size {
                config.batch_size = n;
                changed = true;
            }
            if let Some(names) = fields {
                config.default_fields = names;
                config.selection()?;
                changed = true;
            }
            if let Some(s) = signature {
                config.support_signature = s;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                let fields = if config.default_fields.is_empty() {
                    "全フィールド".to_string()
                } else {
                    config.default_fields.join(", ")
                };
                println!("設定:");
                println!("  比較フィールド: {}", fields);
                println!("  閾値: {}%", config.threshold_percent);
                println!("  バッチ件数: {}", config.batch_size);
                println!("  署名: {}", config.support_signature);
            }
        }
    }

    Ok(())
}
