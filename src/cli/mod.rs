//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `normalize`: 染色归一化（Vahadane / Reinhard / Macenko）
//! - `convert`: 重新编码为 PNG
//! - `sidecars`: 复制 JSON 元数据文件
//! - `representative`: 选择最具代表性的图像
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: normalize, convert, sidecars, representative

pub mod convert;
pub mod normalize;
pub mod representative;
pub mod sidecars;

use clap::{Parser, Subcommand};

/// histoprep - 病理切片图像批量预处理工具
#[derive(Parser)]
#[command(name = "histoprep")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Batch stain normalization and preprocessing for histopathology image tiles", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Stain-normalize every image in a directory tree against a reference image
    Normalize(normalize::NormalizeArgs),

    /// Re-encode every image in a directory tree as PNG
    Convert(convert::ConvertArgs),

    /// Copy JSON sidecar files into the output directory
    Sidecars(sidecars::SidecarArgs),

    /// Find the image whose mean intensity/color is closest to the dataset mean
    Representative(representative::RepresentativeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stain::StainMethod;
    use crate::stats::SelectionMode;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_normalize() {
        let cli = Cli::try_parse_from([
            "histoprep", "normalize", "-i", "in", "-o", "out", "-r", "ref.png", "-m", "vahadane",
        ])
        .unwrap();
        match cli.command {
            Commands::Normalize(args) => {
                assert_eq!(args.method, StainMethod::Vahadane);
                assert_eq!(args.pattern, "*.jpg,*.png");
                assert!(!args.copy_sidecars);
            }
            _ => panic!("expected normalize"),
        }
    }

    #[test]
    fn test_parse_representative_defaults() {
        let cli = Cli::try_parse_from(["histoprep", "representative", "-i", "tiles"]).unwrap();
        match cli.command {
            Commands::Representative(args) => {
                assert_eq!(args.mode, SelectionMode::Gray);
                assert_eq!(args.top_n, 10);
                assert!(args.stats_csv.is_none());
            }
            _ => panic!("expected representative"),
        }
    }
}
