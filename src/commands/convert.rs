//! # convert 命令实现
//!
//! 将目录树中的图像原样重新编码为 PNG。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/`
//! - 使用 `utils/output.rs`

use crate::batch::{self, BatchOptions};
use crate::cli::convert::ConvertArgs;
use crate::error::Result;
use crate::utils::output;

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("Converting to PNG");

    let options = BatchOptions {
        patterns: args.pattern.clone(),
        label: "Converting".to_string(),
    };
    let result = batch::run_batch(Ok, &args.input, &args.output, &options)?;

    if result.total() == 0 {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    output::print_batch_summary("Converted", &result);
    Ok(())
}
