//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `utils/` 和 `qdiffuse` 库
//! - 子模块: calc, cell, grid

pub mod calc;
pub mod cell;
pub mod grid;

use crate::cli::Commands;
use qdiffuse::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Calc(args) => calc::execute(args),
        Commands::Cell(args) => cell::execute(args),
        Commands::Grid(args) => grid::execute(args),
    }
}
