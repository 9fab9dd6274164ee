//! # 原子表 CSV 解析器
//!
//! 每行一个原子，按晶胞索引和晶胞内位置编号组织。
//!
//! ## 格式说明
//! ```text
//! i,j,k,site,species,x,y,z,mx,my,mz
//! 0,0,0,0,Fe,0.0,0.0,0.0,0,0,2.2
//! 0,0,0,1,O,0.5,0.5,0.5,,,
//! ```
//! - `x, y, z` 为晶胞内分数坐标
//! - `mx, my, mz` 可省略整列或留空；有任一分量时缺失分量取 0
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `serde` + `csv` 反序列化

use qdiffuse::error::{DiffuseError, Result};
use qdiffuse::models::{Supercell, UnitCell};

use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

/// CSV 中的一行
#[derive(Debug, Deserialize)]
struct AtomRecord {
    i: i64,
    j: i64,
    k: i64,
    site: usize,
    species: String,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    mx: Option<f64>,
    #[serde(default)]
    my: Option<f64>,
    #[serde(default)]
    mz: Option<f64>,
}

impl AtomRecord {
    fn moment(&self) -> Option<[f64; 3]> {
        if self.mx.is_none() && self.my.is_none() && self.mz.is_none() {
            return None;
        }
        Some([
            self.mx.unwrap_or(0.0),
            self.my.unwrap_or(0.0),
            self.mz.unwrap_or(0.0),
        ])
    }
}

/// 读取原子表文件
pub fn read_atom_table(path: &Path, unit_cell: UnitCell) -> Result<Supercell> {
    let file = File::open(path).map_err(|e| DiffuseError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    parse_atom_table(file, name, unit_cell)
}

/// 从任意输入流解析原子表
pub fn parse_atom_table<R: io::Read>(reader: R, name: &str, unit_cell: UnitCell) -> Result<Supercell> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut structure = Supercell::new(name, unit_cell);
    let mut seen = HashSet::new();

    for (line, record) in rdr.deserialize::<AtomRecord>().enumerate() {
        let record = record?;
        let cell = [record.i, record.j, record.k];

        if !seen.insert((cell, record.site)) {
            return Err(DiffuseError::ParseError {
                format: "atom table".to_string(),
                path: name.to_string(),
                reason: format!(
                    "duplicate atom at cell {:?}, site {} (row {})",
                    cell,
                    record.site,
                    line + 1
                ),
            });
        }

        structure.add_atom(cell, record.site, record.species.clone(), [record.x, record.y, record.z]);
        if let Some(moment) = record.moment() {
            structure.set_moment(cell, record.site, moment)?;
        }
    }

    if structure.number_of_atoms() == 0 {
        return Err(DiffuseError::ParseError {
            format: "atom table".to_string(),
            path: name.to_string(),
            reason: "no atoms found".to_string(),
        });
    }

    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdiffuse::models::Structure;

    #[test]
    fn test_parse_without_moments() {
        let content = "\
i,j,k,site,species,x,y,z
0,0,0,0,Na,0.0,0.0,0.0
0,0,0,1,Cl,0.5,0.5,0.5
1,0,0,0,Na,0.0,0.0,0.0
1,0,0,1,Cl,0.5,0.5,0.5
";
        let s = parse_atom_table(content.as_bytes(), "nacl", UnitCell::new(&[5.64]).unwrap())
            .unwrap();

        assert_eq!(s.number_of_atoms(), 4);
        assert_eq!(s.formula(), "Cl2Na2");
        assert_eq!(s.positions(true).unwrap()[3], [1.5, 0.5, 0.5]);
        assert!(s.magnetic_moments().is_err());
    }

    #[test]
    fn test_parse_with_partial_moments() {
        let content = "\
i, j, k, site, species, x, y, z, mx, my, mz
0, 0, 0, 0, Fe, 0.0, 0.0, 0.0, 0, 0, 2.2
0, 0, 0, 1, O, 0.5, 0.5, 0.5, , ,
0, 1, 0, 0, Fe, 0.0, 0.0, 0.0, 1.0, , 
";
        let s = parse_atom_table(content.as_bytes(), "feo", UnitCell::default()).unwrap();
        let moments = s.magnetic_moments().unwrap();

        assert_eq!(moments.len(), 3);
        assert_eq!(moments[0], [0.0, 0.0, 2.2]);
        assert_eq!(moments[1], [0.0, 0.0, 0.0]);
        assert_eq!(moments[2], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_duplicate_and_empty() {
        let dup = "i,j,k,site,species,x,y,z\n0,0,0,0,Fe,0,0,0\n0,0,0,0,Co,0,0,0\n";
        assert!(matches!(
            parse_atom_table(dup.as_bytes(), "dup", UnitCell::default()),
            Err(DiffuseError::ParseError { .. })
        ));

        let empty = "i,j,k,site,species,x,y,z\n";
        assert!(parse_atom_table(empty.as_bytes(), "empty", UnitCell::default()).is_err());

        let bad = "i,j,k,site,species,x,y,z\n0,0,0,0,Fe,zero,0,0\n";
        assert!(matches!(
            parse_atom_table(bad.as_bytes(), "bad", UnitCell::default()),
            Err(DiffuseError::CsvError(_))
        ));
    }
}
