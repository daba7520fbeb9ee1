//! # normalize 子命令 CLI 定义
//!
//! 对目录树中的所有图像做染色归一化，输出 PNG
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/normalize.rs`

use crate::batch::IMAGE_PATTERNS;
use crate::stain::StainMethod;

use clap::Args;
use std::path::PathBuf;

/// normalize 子命令参数
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Input directory containing image tiles (searched recursively)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for normalized PNG files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Reference image whose stain appearance is matched
    #[arg(short, long, env = "HISTOPREP_REFERENCE")]
    pub reference: PathBuf,

    /// Stain normalization method
    #[arg(short, long, value_enum, default_value_t = StainMethod::Macenko)]
    pub method: StainMethod,

    /// Glob patterns for input images (comma separated, case-insensitive)
    #[arg(short, long, default_value = IMAGE_PATTERNS)]
    pub pattern: String,

    /// Also copy JSON sidecar files into the output directory
    #[arg(long, default_value_t = false)]
    pub copy_sidecars: bool,
}
