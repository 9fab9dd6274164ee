//! # cell 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 和 `cli/calc.rs` 使用
//! - 参数传递给 `commands/cell.rs`

use clap::Args;

/// cell 子命令参数
#[derive(Args, Debug)]
pub struct CellArgs {
    /// Unit cell: a | a b c | a b c alpha beta gamma (Å, degrees)
    #[arg(long, num_args = 1..=6, default_values_t = [1.0])]
    pub cell: Vec<f64>,
}
