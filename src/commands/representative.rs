//! # representative 命令实现
//!
//! 选择最具代表性的图像，并打印最接近均值的若干图像。
//!
//! ## 依赖关系
//! - 使用 `cli/representative.rs` 定义的参数
//! - 使用 `stats/representative.rs`
//! - 使用 `utils/output.rs`，`tabled` 打印表格

use crate::cli::representative::RepresentativeArgs;
use crate::error::Result;
use crate::stats::{self, SelectionMode};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 表格行
#[derive(Debug, Clone, Tabled)]
struct CandidateRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Distance")]
    distance: String,
}

/// 执行 representative 命令
pub fn execute(args: RepresentativeArgs) -> Result<()> {
    let title = match args.mode {
        SelectionMode::Gray => "Representative Image (mean intensity)",
        SelectionMode::Color => "Representative Image (mean color)",
    };
    output::print_header(title);

    let selection = stats::find_representative(&args.input, args.mode, &args.pattern)?;

    output::print_info(&format!(
        "Measured {} image(s), {} skipped",
        selection.ranked.len(),
        selection.skipped.len()
    ));
    output::print_field("Dataset mean", &selection.dataset_mean.to_string());

    let rows: Vec<CandidateRow> = selection
        .ranked
        .iter()
        .take(args.top_n)
        .enumerate()
        .map(|(i, s)| CandidateRow {
            rank: i + 1,
            image: s.file_name.clone(),
            mean: s.statistic.to_string(),
            distance: format!("{:.3}", s.distance),
        })
        .collect();

    if !rows.is_empty() {
        println!("\n{}\n", Table::new(&rows));
    }

    if let Some(ref csv_path) = args.stats_csv {
        stats::write_stats_csv(&selection, csv_path)?;
        output::print_success(&format!("Statistics saved to '{}'", csv_path.display()));
    }

    let best = selection.best();
    output::print_done(&format!(
        "Most representative ({}): {} ({})",
        selection.mode,
        best.file_name,
        best.path.display()
    ));

    Ok(())
}
