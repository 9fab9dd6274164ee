//! # 结构适配接口
//!
//! 傅里叶引擎只需要结构提供以下能力：
//! - 晶胞 (`unit_cell`)
//! - 每个原子的元素 (`species`)
//! - 分数或笛卡尔坐标 (`positions`)
//! - 磁矩（仅磁散射需要）
//! - 按 (i, j, k, site) 索引的原子表（仅 lots 采样与平均结构扣除需要）
//!
//! 每种外部结构类型实现一次 `Structure` trait，引擎只通过这些方法访问结构。
//!
//! ## 依赖关系
//! - 被 `fourier/engine.rs` 使用
//! - 使用 `models/unitcell.rs`

use crate::error::{DiffuseError, Result};
use crate::models::UnitCell;

use std::collections::BTreeMap;

/// 结构协作者接口
pub trait Structure: Sync {
    /// 晶胞
    fn unit_cell(&self) -> Result<UnitCell>;

    /// 每个原子的元素标识
    fn species(&self) -> Result<Vec<String>>;

    /// 原子坐标；`scaled = true` 返回分数坐标（以晶胞为单位），否则返回笛卡尔坐标
    fn positions(&self, scaled: bool) -> Result<Vec<[f64; 3]>>;

    /// 每个原子的磁矩（晶胞笛卡尔坐标系）
    fn magnetic_moments(&self) -> Result<Vec<[f64; 3]>> {
        Err(DiffuseError::UnsupportedStructure(
            "structure does not carry magnetic moments".to_string(),
        ))
    }

    /// 按 (i, j, k, site) 排序的原子表
    fn cell_table(&self) -> Result<Vec<&CellRow>> {
        Err(DiffuseError::UnsupportedStructure(
            "structure is not indexed by unit cell; lots and average subtraction need a cell-indexed structure"
                .to_string(),
        ))
    }
}

// ─────────────────────────────────────────────────────────────
// 平铺结构：原子列表 + 晶格
// ─────────────────────────────────────────────────────────────

/// 原子信息
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],

    /// 可选：磁矩
    pub moment: Option<[f64; 3]>,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
            moment: None,
        }
    }

    pub fn with_moment(mut self, moment: [f64; 3]) -> Self {
        self.moment = Some(moment);
        self
    }
}

/// 晶体结构（原子列表）
#[derive(Debug, Clone)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶胞
    pub unit_cell: UnitCell,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, unit_cell: UnitCell, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            unit_cell,
            atoms,
        }
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        formula_from_counts(self.atoms.iter().map(|a| a.element.as_str()))
    }
}

impl Structure for Crystal {
    fn unit_cell(&self) -> Result<UnitCell> {
        Ok(self.unit_cell.clone())
    }

    fn species(&self) -> Result<Vec<String>> {
        Ok(self.atoms.iter().map(|a| a.element.clone()).collect())
    }

    fn positions(&self, scaled: bool) -> Result<Vec<[f64; 3]>> {
        let frac = self.atoms.iter().map(|a| a.position);
        if scaled {
            Ok(frac.collect())
        } else {
            Ok(frac.map(|p| self.unit_cell.cartesian(p)).collect())
        }
    }

    fn magnetic_moments(&self) -> Result<Vec<[f64; 3]>> {
        collect_moments(self.atoms.iter().map(|a| a.moment))
    }
}

// ─────────────────────────────────────────────────────────────
// 超胞结构：按晶胞索引的原子表
// ─────────────────────────────────────────────────────────────

/// 原子表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct CellRow {
    /// 晶胞索引 (i, j, k)
    pub cell: [i64; 3],
    /// 晶胞内位置编号
    pub site: usize,
    /// 元素符号
    pub species: String,
    /// 晶胞内分数坐标
    pub position: [f64; 3],
    /// 可选：磁矩
    pub moment: Option<[f64; 3]>,
}

impl CellRow {
    /// 绝对分数坐标 = 晶胞偏移 + 晶胞内坐标
    pub fn absolute_position(&self) -> [f64; 3] {
        [
            self.cell[0] as f64 + self.position[0],
            self.cell[1] as f64 + self.position[1],
            self.cell[2] as f64 + self.position[2],
        ]
    }
}

type RowKey = ([i64; 3], usize);

/// 按 (i, j, k, site) 索引的超胞
#[derive(Debug, Clone)]
pub struct Supercell {
    /// 结构名称
    pub name: String,

    unit_cell: UnitCell,
    rows: BTreeMap<RowKey, CellRow>,
}

impl Supercell {
    pub fn new(name: impl Into<String>, unit_cell: UnitCell) -> Self {
        Supercell {
            name: name.into(),
            unit_cell,
            rows: BTreeMap::new(),
        }
    }

    /// 添加原子；同一 (cell, site) 已存在时替换
    pub fn add_atom(
        &mut self,
        cell: [i64; 3],
        site: usize,
        species: impl Into<String>,
        position: [f64; 3],
    ) -> &mut Self {
        let moment = self.rows.get(&(cell, site)).and_then(|r| r.moment);
        self.rows.insert(
            (cell, site),
            CellRow {
                cell,
                site,
                species: species.into(),
                position,
                moment,
            },
        );
        self
    }

    /// 设置已有原子的磁矩
    pub fn set_moment(&mut self, cell: [i64; 3], site: usize, moment: [f64; 3]) -> Result<()> {
        match self.rows.get_mut(&(cell, site)) {
            Some(row) => {
                row.moment = Some(moment);
                Ok(())
            }
            None => Err(DiffuseError::InvalidArgument(format!(
                "no atom at cell {:?}, site {}",
                cell, site
            ))),
        }
    }

    /// 将晶胞 (0, 0, 0) 中的原子平铺到 ni × nj × nk 个晶胞
    pub fn repeat(&mut self, reps: [usize; 3]) -> Result<()> {
        if reps.iter().any(|&n| n == 0) {
            return Err(DiffuseError::InvalidArgument(format!(
                "repeat counts must be positive, got {:?}",
                reps
            )));
        }

        let template: Vec<CellRow> = self
            .rows
            .values()
            .filter(|r| r.cell == [0, 0, 0])
            .cloned()
            .collect();

        if template.is_empty() {
            return Err(DiffuseError::InvalidArgument(
                "cell (0, 0, 0) is empty, nothing to repeat".to_string(),
            ));
        }

        let mut rows = BTreeMap::new();
        for i in 0..reps[0] as i64 {
            for j in 0..reps[1] as i64 {
                for k in 0..reps[2] as i64 {
                    for row in &template {
                        let cell = [i, j, k];
                        rows.insert(
                            (cell, row.site),
                            CellRow {
                                cell,
                                ..row.clone()
                            },
                        );
                    }
                }
            }
        }
        self.rows = rows;
        Ok(())
    }

    /// 原子总数
    pub fn number_of_atoms(&self) -> usize {
        self.rows.len()
    }

    /// 各元素原子数
    pub fn species_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for row in self.rows.values() {
            *counts.entry(row.species.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        formula_from_counts(self.rows.values().map(|r| r.species.as_str()))
    }
}

impl Structure for Supercell {
    fn unit_cell(&self) -> Result<UnitCell> {
        Ok(self.unit_cell.clone())
    }

    fn species(&self) -> Result<Vec<String>> {
        Ok(self.rows.values().map(|r| r.species.clone()).collect())
    }

    fn positions(&self, scaled: bool) -> Result<Vec<[f64; 3]>> {
        let frac = self.rows.values().map(CellRow::absolute_position);
        if scaled {
            Ok(frac.collect())
        } else {
            Ok(frac.map(|p| self.unit_cell.cartesian(p)).collect())
        }
    }

    fn magnetic_moments(&self) -> Result<Vec<[f64; 3]>> {
        collect_moments(self.rows.values().map(|r| r.moment))
    }

    fn cell_table(&self) -> Result<Vec<&CellRow>> {
        Ok(self.rows.values().collect())
    }
}

/// 只要有一个原子带磁矩，其余原子视为零磁矩
fn collect_moments(moments: impl Iterator<Item = Option<[f64; 3]>> + Clone) -> Result<Vec<[f64; 3]>> {
    if moments.clone().all(|m| m.is_none()) {
        return Err(DiffuseError::UnsupportedStructure(
            "structure does not carry magnetic moments".to_string(),
        ));
    }
    Ok(moments.map(|m| m.unwrap_or([0.0; 3])).collect())
}

fn formula_from_counts<'a>(elements: impl Iterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for el in elements {
        *counts.entry(el).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(el, count)| {
            if count == 1 {
                el.to_string()
            } else {
                format!("{}{}", el, count)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nacl() -> Crystal {
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Na", [0.5, 0.5, 0.0]),
            Atom::new("Na", [0.5, 0.0, 0.5]),
            Atom::new("Na", [0.0, 0.5, 0.5]),
            Atom::new("Cl", [0.5, 0.0, 0.0]),
            Atom::new("Cl", [0.0, 0.5, 0.0]),
            Atom::new("Cl", [0.0, 0.0, 0.5]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
        ];
        Crystal::new("NaCl", UnitCell::new(&[5.64]).unwrap(), atoms)
    }

    #[test]
    fn test_crystal_formula() {
        let formula = nacl().formula();
        assert_eq!(formula, "Cl4Na4");
    }

    #[test]
    fn test_crystal_positions() {
        let crystal = nacl();
        let frac = crystal.positions(true).unwrap();
        let cart = crystal.positions(false).unwrap();
        assert_eq!(frac.len(), 8);
        assert!((cart[1][0] - 2.82).abs() < 1e-9);
        assert!((cart[1][1] - 2.82).abs() < 1e-9);
        assert_eq!(crystal.species().unwrap()[4], "Cl");
    }

    #[test]
    fn test_crystal_without_moments() {
        let crystal = nacl();
        assert!(matches!(
            crystal.magnetic_moments(),
            Err(DiffuseError::UnsupportedStructure(_))
        ));
        assert!(matches!(
            crystal.cell_table(),
            Err(DiffuseError::UnsupportedStructure(_))
        ));
    }

    #[test]
    fn test_crystal_partial_moments() {
        let crystal = Crystal::new(
            "Fe",
            UnitCell::new(&[2.87]).unwrap(),
            vec![
                Atom::new("Fe", [0.0, 0.0, 0.0]).with_moment([0.0, 0.0, 2.2]),
                Atom::new("Fe", [0.5, 0.5, 0.5]),
            ],
        );
        let moments = crystal.magnetic_moments().unwrap();
        assert_eq!(moments, vec![[0.0, 0.0, 2.2], [0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_supercell_repeat() {
        let mut s = Supercell::new("CsCl", UnitCell::new(&[4.0]).unwrap());
        s.add_atom([0, 0, 0], 0, "Cs", [0.0, 0.0, 0.0])
            .add_atom([0, 0, 0], 1, "Cl", [0.5, 0.5, 0.5]);
        s.repeat([2, 3, 4]).unwrap();

        assert_eq!(s.number_of_atoms(), 2 * 2 * 3 * 4);
        assert_eq!(s.species_counts()["Cs"], 24);
        assert_eq!(s.formula(), "Cl24Cs24");

        let table = s.cell_table().unwrap();
        let last = table.last().unwrap();
        assert_eq!(last.cell, [1, 2, 3]);
        assert_eq!(last.site, 1);
        assert_eq!(last.absolute_position(), [1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_supercell_add_atom_replaces() {
        let mut s = Supercell::new("X", UnitCell::default());
        s.add_atom([0, 0, 0], 0, "Fe", [0.0, 0.0, 0.0]);
        s.set_moment([0, 0, 0], 0, [1.0, 0.0, 0.0]).unwrap();
        s.add_atom([0, 0, 0], 0, "Co", [0.1, 0.0, 0.0]);

        assert_eq!(s.number_of_atoms(), 1);
        assert_eq!(s.species().unwrap(), vec!["Co".to_string()]);
        assert_eq!(s.magnetic_moments().unwrap(), vec![[1.0, 0.0, 0.0]]);
        assert!(s.set_moment([1, 0, 0], 0, [0.0; 3]).is_err());
    }

    #[test]
    fn test_supercell_positions_are_absolute() {
        let mut s = Supercell::new("X", UnitCell::new(&[2.0]).unwrap());
        s.add_atom([0, 0, 0], 0, "Fe", [0.25, 0.0, 0.0]);
        s.repeat([2, 1, 1]).unwrap();

        let frac = s.positions(true).unwrap();
        assert_eq!(frac, vec![[0.25, 0.0, 0.0], [1.25, 0.0, 0.0]]);
        let cart = s.positions(false).unwrap();
        assert!((cart[1][0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_repeat_empty_origin_cell() {
        let mut s = Supercell::new("X", UnitCell::default());
        s.add_atom([1, 0, 0], 0, "Fe", [0.0; 3]);
        assert!(s.repeat([2, 2, 2]).is_err());
        assert!(s.repeat([0, 2, 2]).is_err());
    }
}
