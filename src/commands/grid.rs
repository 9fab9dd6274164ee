//! # grid 子命令实现
//!
//! 由命令行参数构造网格并打印各轴信息。
//!
//! ## 依赖关系
//! - 使用 `cli/grid.rs` 定义的参数
//! - 被 `commands/calc.rs` 用于构造网格

use crate::cli::grid::{GridArgs, GridSpec};
use crate::utils::output;
use qdiffuse::error::Result;
use qdiffuse::grid::Grid;

use tabled::{Table, Tabled};

/// 轴信息行
#[derive(Tabled)]
struct AxisRow {
    #[tabled(rename = "Axis")]
    axis: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Unit vector")]
    unit: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "Bins")]
    bins: usize,
}

/// 由命令行参数构造网格
pub fn build_grid(spec: &GridSpec) -> Result<Grid> {
    match &spec.tl {
        Some(tl) => Grid::from_corners_3d(&spec.ll, &spec.lr, &spec.ul, tl, &spec.bins),
        None => Grid::from_corners(&spec.ll, &spec.lr, &spec.ul, &spec.bins),
    }
}

/// 执行 grid 子命令
pub fn execute(args: GridArgs) -> Result<()> {
    output::print_header("Reciprocal-Space Grid");

    let grid = build_grid(&args.grid)?;
    print_grid(&grid);
    Ok(())
}

/// 打印网格轴表格
pub fn print_grid(grid: &Grid) {
    let units = [grid.v1(), grid.v2(), grid.v3()];
    let rows: Vec<AxisRow> = grid
        .axis_names()
        .into_iter()
        .zip(grid.axis_coords())
        .zip(grid.bins())
        .enumerate()
        .map(|(i, ((label, coords), &bins))| AxisRow {
            axis: format!("Q{}", i + 1),
            label,
            unit: format!(
                "[{:.4} {:.4} {:.4}]",
                units[i][0], units[i][1], units[i][2]
            ),
            length: format!("{:.4}", coords.last().copied().unwrap_or(0.0)),
            bins,
        })
        .collect();

    println!("{}", Table::new(&rows));
    output::print_info(&format!(
        "{} grid, {} points ({})",
        if grid.is_2d() { "Planar" } else { "Volume" },
        grid.len(),
        grid.units()
    ));

    let pairs: &[&str] = if grid.is_2d() {
        &["Q1/Q2"]
    } else {
        &["Q1/Q2", "Q1/Q3", "Q2/Q3"]
    };
    let angles: Vec<String> = pairs
        .iter()
        .zip(grid.axis_angles())
        .map(|(pair, deg)| format!("{} {:.2}°", pair, deg))
        .collect();
    output::print_info(&format!("Axis angles: {}", angles.join(", ")));
}
