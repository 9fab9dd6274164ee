//! # calc 子命令实现
//!
//! 读取原子表，在网格上计算漫散射强度并导出 CSV。
//!
//! ## 功能
//! - 中子 / X 射线 / 磁散射
//! - 分块 (lots) 采样与平均结构扣除
//! - 并行计算（rayon 线程池，线程数由 `--jobs` 决定）
//!
//! ## 依赖关系
//! - 使用 `cli/calc.rs` 定义的 CalcArgs
//! - 使用 `parsers/atom_table.rs` 读取结构
//! - 使用 `qdiffuse::fourier` 进行计算

use crate::cli::calc::CalcArgs;
use crate::commands::grid::{build_grid, print_grid};
use crate::parsers::atom_table;
use crate::utils::{output, progress};
use qdiffuse::error::{DiffuseError, Result};
use qdiffuse::fourier::{Fourier, FourierConfig, Lots, Radiation, StandardTables};
use qdiffuse::models::{Supercell, UnitCell};

use tabled::{Table, Tabled};

/// 元素统计行
#[derive(Tabled)]
struct SpeciesRow {
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Atoms")]
    count: usize,
}

/// 执行漫散射计算
pub fn execute(args: CalcArgs) -> Result<()> {
    output::print_header("Diffuse Scattering Calculation");

    // 先解析辐射类型，避免读完结构才报错
    let radiation: Radiation = args.radiation.parse()?;

    let cell = UnitCell::new(&args.cell)?;
    let structure = atom_table::read_atom_table(&args.atoms, cell)?;
    output::print_info(&format!(
        "Loaded '{}': {} atoms, {}",
        args.atoms.display(),
        structure.number_of_atoms(),
        structure.formula()
    ));
    print_species(&structure);

    let grid = build_grid(&args.grid)?;
    print_grid(&grid);

    let lots = match &args.lots {
        Some(shape) => Some(Lots::new(
            [shape[0], shape[1], shape[2]],
            args.number_of_lots,
        )?),
        None => None,
    };

    let config = FourierConfig::new()
        .with_radiation(radiation)
        .with_magnetic(args.magnetic)
        .with_magnetic_ion(args.ion)
        .with_fast(!args.slow)
        .with_lots(lots)
        .with_average(args.average)
        .with_seed(args.seed);

    let jobs = if args.jobs == 0 {
        num_cpus::get()
    } else {
        args.jobs
    };
    output::print_info(&format!(
        "Calculating {} scattering with {} threads",
        config.kind(),
        jobs
    ));
    if let Some(lots) = &config.lots {
        output::print_info(&format!(
            "Sampling {} lots of {} cells each",
            lots.count,
            lots.cells_per_lot()
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| DiffuseError::InvalidArgument(format!("Failed to build thread pool: {}", e)))?;

    let engine = Fourier::new(&grid, &StandardTables);
    let spinner = progress::create_spinner("Calculating");
    let result = pool.install(|| engine.calc(&structure, &config));
    spinner.finish_and_clear();
    let mut result = result?;

    if args.mean {
        match &config.lots {
            Some(lots) => result = result.scaled(1.0 / lots.count as f64),
            None => output::print_warning("--mean only applies to lots calculations, ignoring"),
        }
    }

    result.to_csv(&args.output)?;

    output::print_separator();
    output::print_info(&format!(
        "Max intensity: {:.6e}, total: {:.6e}",
        result.max(),
        result.sum()
    ));
    output::print_success(&format!("Intensity written to '{}'", args.output.display()));

    Ok(())
}

/// 打印元素统计表
fn print_species(structure: &Supercell) {
    let rows: Vec<SpeciesRow> = structure
        .species_counts()
        .into_iter()
        .map(|(species, count)| SpeciesRow { species, count })
        .collect();
    println!("{}", Table::new(&rows));
}
