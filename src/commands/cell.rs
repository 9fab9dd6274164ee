//! # cell 子命令实现
//!
//! 打印正空间和倒空间晶胞参数以及度规张量。
//!
//! ## 依赖关系
//! - 使用 `cli/cell.rs` 定义的参数
//! - 使用 `qdiffuse::models::UnitCell`

use crate::cli::cell::CellArgs;
use crate::utils::output;
use qdiffuse::error::Result;
use qdiffuse::models::UnitCell;

use nalgebra::Matrix3;
use tabled::{Table, Tabled};

/// 晶胞参数行
#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "Parameter")]
    name: &'static str,
    #[tabled(rename = "Direct")]
    direct: String,
    #[tabled(rename = "Reciprocal")]
    reciprocal: String,
}

/// 执行 cell 子命令
pub fn execute(args: CellArgs) -> Result<()> {
    output::print_header("Unit Cell");

    let cell = UnitCell::new(&args.cell)?;
    print_cell(&cell);
    Ok(())
}

/// 打印晶胞参数表格
pub fn print_cell(cell: &UnitCell) {
    let (a, b, c, alpha, beta, gamma) = cell.cell();
    let (ra, rb, rc, ralpha, rbeta, rgamma) = cell.reciprocal_cell();

    let rows = vec![
        row("a (Å)", a, ra),
        row("b (Å)", b, rb),
        row("c (Å)", c, rc),
        row("α (°)", alpha, ralpha),
        row("β (°)", beta, rbeta),
        row("γ (°)", gamma, rgamma),
        row("Volume", cell.volume(), cell.reciprocal_volume()),
    ];
    println!("{}", Table::new(&rows));

    output::print_info("Metric tensor G:");
    print_matrix(cell.g());
    output::print_info("Reciprocal metric tensor G*:");
    print_matrix(cell.g_star());
}

fn row(name: &'static str, direct: f64, reciprocal: f64) -> ParameterRow {
    ParameterRow {
        name,
        direct: format!("{:.6}", direct),
        reciprocal: format!("{:.6}", reciprocal),
    }
}

fn print_matrix(m: &Matrix3<f64>) {
    for i in 0..3 {
        println!(
            "    {:>12.6} {:>12.6} {:>12.6}",
            m[(i, 0)],
            m[(i, 1)],
            m[(i, 2)]
        );
    }
}
