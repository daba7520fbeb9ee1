//! histoprep 命令行入口
//!
//! 解析参数并分发到 `commands/`，错误统一打印后以退出码 1 结束。

use clap::Parser;
use env_logger::Env;
use histoprep::cli::Cli;
use histoprep::{commands, utils};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
