//! # 数据模型模块
//!
//! 定义晶胞几何与结构适配接口。
//!
//! ## 依赖关系
//! - 被 `grid/`、`fourier/` 和 `commands/` 使用
//! - 子模块: unitcell, structure

pub mod structure;
pub mod unitcell;

pub use structure::{Atom, CellRow, Crystal, Structure, Supercell};
pub use unitcell::UnitCell;
