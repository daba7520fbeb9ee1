//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `stain/`, `stats/`, `utils/`
//! - 子模块: normalize, convert, sidecars, representative

pub mod convert;
pub mod normalize;
pub mod representative;
pub mod sidecars;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Normalize(args) => normalize::execute(args),
        Commands::Convert(args) => convert::execute(args),
        Commands::Sidecars(args) => sidecars::execute(args),
        Commands::Representative(args) => representative::execute(args),
    }
}
