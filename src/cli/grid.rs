//! # grid 子命令 CLI 定义
//!
//! 网格角点和 bins 参数，`calc` 与 `grid` 共用。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 和 `cli/calc.rs` 使用
//! - 参数传递给 `commands/grid.rs`

use clap::Args;

/// 倒空间网格参数（r.l.u.）
#[derive(Args, Debug, Clone)]
pub struct GridSpec {
    /// Lower-left corner (origin) of the grid
    #[arg(long, num_args = 3, value_names = ["H", "K", "L"], allow_negative_numbers = true, default_values_t = [0.0, 0.0, 0.0])]
    pub ll: Vec<f64>,

    /// Lower-right corner, defines the first axis
    #[arg(long, num_args = 3, value_names = ["H", "K", "L"], allow_negative_numbers = true, default_values_t = [1.0, 0.0, 0.0])]
    pub lr: Vec<f64>,

    /// Upper-left corner, defines the second axis
    #[arg(long, num_args = 3, value_names = ["H", "K", "L"], allow_negative_numbers = true, default_values_t = [0.0, 1.0, 0.0])]
    pub ul: Vec<f64>,

    /// Top-left corner, defines the third axis of a volume grid
    #[arg(long, num_args = 3, value_names = ["H", "K", "L"], allow_negative_numbers = true)]
    pub tl: Option<Vec<f64>>,

    /// Number of points along each axis (2 values for a plane, 3 for a volume)
    #[arg(long, num_args = 2..=3, default_values_t = [101, 101])]
    pub bins: Vec<usize>,
}

/// grid 子命令参数
#[derive(Args, Debug)]
pub struct GridArgs {
    #[command(flatten)]
    pub grid: GridSpec,
}
