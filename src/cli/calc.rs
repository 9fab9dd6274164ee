//! # calc 子命令 CLI 定义
//!
//! 漫散射计算的全部选项。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/calc.rs`

use crate::cli::grid::GridSpec;

use clap::Args;
use std::path::PathBuf;

/// calc 子命令参数
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Atom table (CSV columns: i,j,k,site,species,x,y,z[,mx,my,mz])
    #[arg(short, long)]
    pub atoms: PathBuf,

    /// Unit cell: a | a b c | a b c alpha beta gamma (Å, degrees)
    #[arg(long, num_args = 1..=6, default_values_t = [1.0])]
    pub cell: Vec<f64>,

    #[command(flatten)]
    pub grid: GridSpec,

    /// Radiation type: neutron or xray
    #[arg(short, long, default_value = "neutron")]
    pub radiation: String,

    /// Calculate magnetic scattering from the atom moments
    #[arg(long, default_value_t = false)]
    pub magnetic: bool,

    /// Ion charge used for the magnetic form factor
    #[arg(long, default_value_t = 3)]
    pub ion: i32,

    /// Use the full-meshgrid phase calculation instead of separable factors
    #[arg(long, default_value_t = false)]
    pub slow: bool,

    /// Lot size in unit cells along i, j, k
    #[arg(long, num_args = 3, value_names = ["I", "J", "K"])]
    pub lots: Option<Vec<usize>>,

    /// Number of lots to sum
    #[arg(long, default_value_t = 1)]
    pub number_of_lots: usize,

    /// Subtract the average structure
    #[arg(long, default_value_t = false)]
    pub average: bool,

    /// Random seed for the lot offsets
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of parallel threads (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Output CSV file
    #[arg(short, long, default_value = "intensity.csv")]
    pub output: PathBuf,

    /// Divide the summed lots intensity by the number of lots
    #[arg(long, default_value_t = false)]
    pub mean: bool,
}
