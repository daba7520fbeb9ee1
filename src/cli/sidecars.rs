//! # sidecars 子命令 CLI 定义
//!
//! 复制元数据文件
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sidecars.rs`

use crate::batch::SIDECAR_PATTERNS;

use clap::Args;
use std::path::PathBuf;

/// sidecars 子命令参数
#[derive(Args, Debug)]
pub struct SidecarArgs {
    /// Input directory containing sidecar files (searched recursively)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory (files are written flat, existing files are overwritten)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Glob patterns for sidecar files (comma separated, case-insensitive)
    #[arg(short, long, default_value = SIDECAR_PATTERNS)]
    pub pattern: String,
}
