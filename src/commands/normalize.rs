//! # normalize 命令实现
//!
//! 对目录树中的所有图像做染色归一化。
//!
//! ## 功能
//! - 读取并拟合参考图像（每次运行只拟合一次）
//! - 逐文件归一化并写出 PNG
//! - 可选同时复制 JSON 元数据文件
//!
//! ## 依赖关系
//! - 使用 `cli/normalize.rs` 定义的参数
//! - 使用 `stain/`, `batch/`
//! - 使用 `utils/output.rs`

use crate::batch::{self, BatchOptions, SIDECAR_PATTERNS};
use crate::cli::normalize::NormalizeArgs;
use crate::error::Result;
use crate::stain::BoundNormalizer;
use crate::utils::output;

/// 执行 normalize 命令
pub fn execute(args: NormalizeArgs) -> Result<()> {
    output::print_header(&format!("Stain Normalization ({})", args.method));

    output::print_field("Input", &args.input.display().to_string());
    output::print_field("Output", &args.output.display().to_string());
    output::print_field("Reference", &args.reference.display().to_string());
    output::print_field("Method", &args.method.to_string());
    println!();

    let normalizer = BoundNormalizer::from_reference_path(args.method, &args.reference)?;
    output::print_info(&format!(
        "Fitted {} normalizer on '{}'",
        normalizer.method(),
        normalizer.reference().display()
    ));

    let options = BatchOptions {
        patterns: args.pattern.clone(),
        label: "Normalizing".to_string(),
    };
    let result = batch::run_batch(
        |tile| normalizer.normalize(&tile),
        &args.input,
        &args.output,
        &options,
    )?;

    if result.total() == 0 {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
    }
    output::print_batch_summary("Normalized", &result);

    if args.copy_sidecars {
        let copied = batch::copy_sidecars(&args.input, &args.output, SIDECAR_PATTERNS)?;
        output::print_success(&format!(
            "Copied {} sidecar file(s) to '{}'",
            copied.success,
            args.output.display()
        ));
    }

    Ok(())
}
