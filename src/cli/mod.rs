//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `calc`: 计算漫散射强度并导出 CSV
//! - `cell`: 显示晶胞和倒易晶胞参数
//! - `grid`: 显示倒空间网格的轴信息
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: calc, cell, grid

pub mod calc;
pub mod cell;
pub mod grid;

use clap::{ArgAction, Parser, Subcommand};

/// qdiffuse - 单晶漫散射计算
#[derive(Parser)]
#[command(name = "qdiffuse")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Diffuse scattering (nuclear, X-ray, magnetic) from large disordered structures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Calculate diffuse scattering intensity over a reciprocal-space grid
    Calc(calc::CalcArgs),

    /// Show direct and reciprocal unit cell parameters
    Cell(cell::CellArgs),

    /// Show the axes of a reciprocal-space grid
    Grid(grid::GridArgs),
}
