//! # 强度结果
//!
//! 计算结果：强度数组 + 每个轴的坐标和标签，可导出为 CSV。
//!
//! ## CSV 格式
//! 每个网格点一行：各轴坐标 (Q1, Q2[, Q3]) 和 intensity。
//! 轴标签（原点 + 边向量）写在 `axes` 中，供调用方还原 hkl。
//!
//! ## 依赖关系
//! - 被 `fourier/engine.rs` 构造
//! - 被 `commands/calc.rs` 导出
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{DiffuseError, Result};
use crate::fourier::config::ScatteringKind;
use crate::grid::Grid;

use ndarray::ArrayD;
use std::io;
use std::path::Path;

/// 单个轴的描述
#[derive(Debug, Clone, PartialEq)]
pub struct AxisInfo {
    /// "Q1" / "Q2" / "Q3"
    pub name: String,
    /// 如 "[0 0 0] + x[1 0 0]"
    pub label: String,
    /// 沿轴的距离坐标
    pub coords: Vec<f64>,
    pub units: String,
}

/// 网格上的强度分布
#[derive(Debug, Clone)]
pub struct IntensityMap {
    pub values: ArrayD<f64>,
    pub axes: Vec<AxisInfo>,
    pub kind: ScatteringKind,
}

impl IntensityMap {
    /// 以网格的轴信息包装强度数组
    pub fn from_grid(grid: &Grid, values: ArrayD<f64>, kind: ScatteringKind) -> Self {
        let axes = grid
            .axis_names()
            .into_iter()
            .zip(grid.axis_coords())
            .enumerate()
            .map(|(i, (label, coords))| AxisInfo {
                name: format!("Q{}", i + 1),
                label,
                coords,
                units: grid.units().to_string(),
            })
            .collect();

        Self { values, axes, kind }
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// 最大值，忽略 NaN；全为 NaN 时返回 NaN
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(f64::NAN, f64::max)
    }

    /// 总和，忽略 NaN
    pub fn sum(&self) -> f64 {
        self.values.iter().filter(|v| !v.is_nan()).sum()
    }

    /// 乘以常数后的副本
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            values: self.values.mapv(|v| v * factor),
            ..self.clone()
        }
    }

    /// 写入 CSV
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = self.axes.iter().map(|a| a.name.as_str()).collect();
        header.push("intensity");
        wtr.write_record(&header)?;

        for (idx, value) in self.values.indexed_iter() {
            let mut record: Vec<String> = self
                .axes
                .iter()
                .enumerate()
                .map(|(a, axis)| format!("{:.6}", axis.coords[idx[a]]))
                .collect();
            record.push(format!("{:.6e}", value));
            wtr.write_record(&record)?;
        }

        wtr.flush().map_err(|e| DiffuseError::FileWriteError {
            path: "<csv writer>".to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// 导出为 CSV 文件
    pub fn to_csv(&self, output_path: &Path) -> Result<()> {
        let file = std::fs::File::create(output_path).map_err(|e| DiffuseError::FileWriteError {
            path: output_path.display().to_string(),
            source: e,
        })?;
        self.write_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn sample() -> IntensityMap {
        let grid = Grid::from_corners(&[0.0, 0.0, 0.0], &[2.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[3, 2])
            .unwrap();
        let values = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, f64::NAN, 4.0, 5.0, 0.5])
            .unwrap()
            .into_dyn();
        IntensityMap::from_grid(&grid, values, ScatteringKind::Neutron)
    }

    #[test]
    fn test_axes_from_grid() {
        let map = sample();
        assert_eq!(map.axes.len(), 2);
        assert_eq!(map.axes[0].name, "Q1");
        assert_eq!(map.axes[0].label, "[0 0 0] + x[2 0 0]");
        assert_eq!(map.axes[0].coords, vec![0.0, 1.0, 2.0]);
        assert_eq!(map.axes[1].coords, vec![0.0, 1.0]);
        assert_eq!(map.axes[1].units, "r.l.u.");
    }

    #[test]
    fn test_max_and_sum_skip_nan() {
        let map = sample();
        assert_eq!(map.max(), 5.0);
        assert!((map.sum() - 12.5).abs() < 1e-12);

        let halved = map.scaled(0.5);
        assert_eq!(halved.max(), 2.5);
        assert_eq!(halved.kind, ScatteringKind::Neutron);
    }

    #[test]
    fn test_write_csv() {
        let map = sample();
        let mut buf = Vec::new();
        map.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Q1,Q2,intensity");
        assert_eq!(lines[2], "0.000000,1.000000,2.000000e0");
        assert_eq!(lines[3], "1.000000,0.000000,NaN");
    }
}
