//! # sidecars 命令实现
//!
//! 复制元数据文件到输出目录。
//!
//! ## 依赖关系
//! - 使用 `cli/sidecars.rs` 定义的参数
//! - 使用 `batch/sidecar.rs`
//! - 使用 `utils/output.rs`

use crate::batch;
use crate::cli::sidecars::SidecarArgs;
use crate::error::Result;
use crate::utils::output;

/// 执行 sidecars 命令
pub fn execute(args: SidecarArgs) -> Result<()> {
    output::print_header("Copying Sidecar Files");

    let result = batch::copy_sidecars(&args.input, &args.output, &args.pattern)?;

    if result.total() == 0 {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    output::print_done(&format!(
        "Copied {} file(s) to '{}'",
        result.success,
        args.output.display()
    ));
    Ok(())
}
