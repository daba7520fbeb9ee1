//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块和 `batch/runner.rs` 使用
//! - 使用 `colored` crate

use crate::batch::BatchResult;

use colored::Colorize;

/// 失败详情最多列出的条数
const MAX_LISTED_FAILURES: usize = 10;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 打印键值对
pub fn print_field(key: &str, value: &str) {
    println!("  {:<18} {}", format!("{}:", key).dimmed(), value);
}

/// 打印批量处理汇总
pub fn print_batch_summary(action: &str, result: &BatchResult) {
    print_separator();
    print_done(&format!(
        "{} {} of {} file(s), {} skipped",
        action,
        result.success,
        result.total(),
        result.failed
    ));

    if !result.failures.is_empty() {
        print_warning("Skipped files:");
        for (path, err) in result.failures.iter().take(MAX_LISTED_FAILURES) {
            let reason = err.lines().last().unwrap_or(err);
            println!("  {} {}", path.dimmed(), reason);
        }
        if result.failures.len() > MAX_LISTED_FAILURES {
            print_warning(&format!(
                "  ... and {} more",
                result.failures.len() - MAX_LISTED_FAILURES
            ));
        }
    }
}
