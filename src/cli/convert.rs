//! # convert 子命令 CLI 定义
//!
//! 将目录树中的图像重新编码为 PNG（不做颜色变换）
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use crate::batch::IMAGE_PATTERNS;

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input directory containing images (searched recursively)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for PNG files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Glob patterns for input images (comma separated, case-insensitive)
    #[arg(short, long, default_value = IMAGE_PATTERNS)]
    pub pattern: String,
}
