//! # qdiffuse - 单晶漫散射计算工具
//!
//! 命令行前端：把参数接到 `qdiffuse` 库的 Grid、UnitCell 和 Fourier 引擎上。
//!
//! ## 子命令
//! - `calc` - 计算中子 / X 射线 / 磁漫散射强度
//! - `cell` - 显示晶胞参数
//! - `grid` - 显示倒空间网格
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── parsers/   (原子表解析)
//!   ├── utils/      (输出、日志、进度)
//!   └── qdiffuse    (库：models, grid, fourier, error)
//! ```

mod cli;
mod commands;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::output::init_logger(cli.verbose) {
        utils::output::print_warning(&format!("Logger unavailable: {}", e));
    }

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
