//! # representative 子命令 CLI 定义
//!
//! 选择统计量最接近数据集均值的图像，可用作归一化参考图像
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/representative.rs`

use crate::batch::IMAGE_PATTERNS;
use crate::stats::SelectionMode;

use clap::Args;
use std::path::PathBuf;

/// representative 子命令参数
#[derive(Args, Debug)]
pub struct RepresentativeArgs {
    /// Input directory containing images (searched recursively)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Statistic used for the comparison
    #[arg(short, long, value_enum, default_value_t = SelectionMode::Gray)]
    pub mode: SelectionMode,

    /// Glob patterns for input images (comma separated, case-insensitive)
    #[arg(short, long, default_value = IMAGE_PATTERNS)]
    pub pattern: String,

    /// Number of closest images to print
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Write per-image statistics to this CSV file
    #[arg(long)]
    pub stats_csv: Option<PathBuf>,
}
