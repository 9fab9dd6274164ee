//! # 倒空间采样网格
//!
//! 由左下角 `ll` 出发、沿三条边 `lr - ll`、`ul - ll`、`tl - ll` 张成的
//! 平行四边形（2D）或平行六面体（3D）采样区域。
//!
//! ## 约定
//! - 所有派生量（单位向量、坐标序列、网格数组）每次读取时都从当前角点和
//!   bins 重新计算，不存在需要失效的缓存
//! - 网格点 = ll + i/(n1-1)·(lr-ll) + j/(n2-1)·(ul-ll) [+ k/(n3-1)·(tl-ll)]
//! - 坐标单位为倒格子单位 (r.l.u.)
//!
//! ## 依赖关系
//! - 被 `fourier/engine.rs` 使用
//! - 子模块: vector
//! - 使用 `nalgebra` 表示角点，`ndarray` 存储网格数组

pub mod vector;

use crate::error::{DiffuseError, Result};
use vector::{angle, check_parallel, format_vector, length, norm};

use nalgebra::Vector3;
use ndarray::{ArrayD, IxDyn};

/// 默认每轴 bin 数
const DEFAULT_BINS: usize = 101;

/// 网格坐标单位：倒格子单位
const UNITS: &str = "r.l.u.";

/// 倒空间采样网格
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    ll: Vector3<f64>,
    lr: Vector3<f64>,
    ul: Vector3<f64>,
    /// 未设置时 v3 由 v1 × v2 给出
    tl: Option<Vector3<f64>>,
    bins: Vec<usize>,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            ll: Vector3::zeros(),
            lr: Vector3::x(),
            ul: Vector3::y(),
            tl: None,
            bins: vec![DEFAULT_BINS, DEFAULT_BINS],
        }
    }
}

impl Grid {
    /// 默认网格：单位正方形，101 × 101
    pub fn new() -> Self {
        Self::default()
    }

    /// 由三个角点和 bins 创建平面或（bins 长度为 3 时）体网格
    ///
    /// 体网格的第三条边取默认顶角 [0, 0, 1]；需要其他顶角时用
    /// `from_corners_3d`。
    pub fn from_corners(ll: &[f64], lr: &[f64], ul: &[f64], bins: &[usize]) -> Result<Self> {
        Self::build(ll, lr, ul, None, bins)
    }

    /// 由四个角点创建网格；bins 长度为 3 时 tl 决定第三条边
    pub fn from_corners_3d(
        ll: &[f64],
        lr: &[f64],
        ul: &[f64],
        tl: &[f64],
        bins: &[usize],
    ) -> Result<Self> {
        Self::build(ll, lr, ul, Some(tl), bins)
    }

    /// 所有角点一次赋值后整体校验
    fn build(
        ll: &[f64],
        lr: &[f64],
        ul: &[f64],
        tl: Option<&[f64]>,
        bins: &[usize],
    ) -> Result<Self> {
        let grid = Grid {
            ll: to_vector(ll)?,
            lr: to_vector(lr)?,
            ul: to_vector(ul)?,
            tl: tl.map(to_vector).transpose()?,
            bins: checked_bins(bins)?,
        };
        grid.check_edges()?;
        Ok(grid)
    }

    // ─────────────────────────────────────────────────────────────
    // 角点
    // ─────────────────────────────────────────────────────────────

    pub fn ll(&self) -> [f64; 3] {
        self.ll.into()
    }

    pub fn lr(&self) -> [f64; 3] {
        self.lr.into()
    }

    pub fn ul(&self) -> [f64; 3] {
        self.ul.into()
    }

    /// 未设置时返回默认值 [0, 0, 1]
    pub fn tl(&self) -> [f64; 3] {
        self.tl_or_default().into()
    }

    /// 设置左下角（原点），三条边随之整体重新校验
    pub fn set_ll(&mut self, ll: &[f64]) -> Result<()> {
        let ll = to_vector(ll)?;
        self.update(|g| g.ll = ll)
    }

    /// 设置右下角，决定第一条边
    pub fn set_lr(&mut self, lr: &[f64]) -> Result<()> {
        let lr = to_vector(lr)?;
        self.update(|g| g.lr = lr)
    }

    /// 设置左上角，决定第二条边
    pub fn set_ul(&mut self, ul: &[f64]) -> Result<()> {
        let ul = to_vector(ul)?;
        self.update(|g| g.ul = ul)
    }

    /// 设置顶角，决定第三条边（体网格）
    pub fn set_tl(&mut self, tl: &[f64]) -> Result<()> {
        let tl = to_vector(tl)?;
        self.update(|g| g.tl = Some(tl))
    }

    /// 在副本上修改并校验，成功后才替换；失败时网格保持不变
    fn update(&mut self, change: impl FnOnce(&mut Grid)) -> Result<()> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.check_edges()?;
        *self = candidate;
        Ok(())
    }

    /// 参与网格的每条边非零且两两不平行
    ///
    /// 设置过 tl 或为体网格时第三条边也参与校验（未设置时为默认顶角）。
    fn check_edges(&self) -> Result<()> {
        let lr = self.lr - self.ll;
        let ul = self.ul - self.ll;
        ensure_non_zero("lr", &lr)?;
        ensure_non_zero("ul", &ul)?;
        ensure_not_parallel("ul", &ul, "lr", &lr)?;

        if self.tl.is_some() || !self.is_2d() {
            let tl = self.tl_or_default() - self.ll;
            ensure_non_zero("tl", &tl)?;
            ensure_not_parallel("tl", &tl, "lr", &lr)?;
            ensure_not_parallel("tl", &tl, "ul", &ul)?;
        }
        Ok(())
    }

    fn tl_or_default(&self) -> Vector3<f64> {
        self.tl.unwrap_or_else(Vector3::z)
    }

    // ─────────────────────────────────────────────────────────────
    // bins
    // ─────────────────────────────────────────────────────────────

    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// 设置 bins：2 个（平面）或 3 个（体），每个 >= 2
    ///
    /// 切换为体网格时第三条边一并校验。
    pub fn set_bins(&mut self, bins: &[usize]) -> Result<()> {
        let bins = checked_bins(bins)?;
        self.update(|g| g.bins = bins)
    }

    /// 是否为平面网格
    pub fn is_2d(&self) -> bool {
        self.bins.len() == 2
    }

    /// 网格数组形状（等于 bins）
    pub fn shape(&self) -> IxDyn {
        IxDyn(&self.bins)
    }

    /// 网格点总数
    pub fn len(&self) -> usize {
        self.bins.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn units(&self) -> &str {
        UNITS
    }

    // ─────────────────────────────────────────────────────────────
    // 派生几何
    // ─────────────────────────────────────────────────────────────

    /// 参与网格的边向量（平面 2 条，体 3 条）
    ///
    /// 所有修改路径都经过 `check_edges`，这里的边总是非零且互不平行。
    fn edges(&self) -> Vec<Vector3<f64>> {
        let mut edges = vec![self.lr - self.ll, self.ul - self.ll];
        if !self.is_2d() {
            edges.push(self.tl_or_default() - self.ll);
        }
        edges
    }

    /// lr - ll 方向的单位向量
    pub fn v1(&self) -> [f64; 3] {
        norm(&(self.lr - self.ll)).into()
    }

    /// ul - ll 方向的单位向量
    pub fn v2(&self) -> [f64; 3] {
        norm(&(self.ul - self.ll)).into()
    }

    /// tl - ll 方向的单位向量；tl 未设置时为 v1 × v2 的单位向量
    pub fn v3(&self) -> [f64; 3] {
        match self.tl {
            Some(tl) => norm(&(tl - self.ll)).into(),
            None => {
                let v1 = norm(&(self.lr - self.ll));
                let v2 = norm(&(self.ul - self.ll));
                norm(&v1.cross(&v2)).into()
            }
        }
    }

    /// 第一轴坐标：0 到 |lr - ll|
    pub fn r1(&self) -> Vec<f64> {
        linspace(0.0, length(&(self.lr - self.ll)), self.bins[0])
    }

    /// 第二轴坐标：0 到 |ul - ll|
    pub fn r2(&self) -> Vec<f64> {
        linspace(0.0, length(&(self.ul - self.ll)), self.bins[1])
    }

    /// 第三轴坐标：平面网格为 [0]
    pub fn r3(&self) -> Vec<f64> {
        if self.is_2d() {
            vec![0.0]
        } else {
            linspace(0.0, length(&(self.tl_or_default() - self.ll)), self.bins[2])
        }
    }

    /// 各轴坐标序列（平面 2 个，体 3 个）
    pub fn axis_coords(&self) -> Vec<Vec<f64>> {
        let mut coords = vec![self.r1(), self.r2()];
        if !self.is_2d() {
            coords.push(self.r3());
        }
        coords
    }

    /// 轴间夹角（度）：平面为 (1,2)，体为 (1,2)、(1,3)、(2,3)
    pub fn axis_angles(&self) -> Vec<f64> {
        let edges = self.edges();
        let pairs: &[(usize, usize)] = if self.is_2d() {
            &[(0, 1)]
        } else {
            &[(0, 1), (0, 2), (1, 2)]
        };
        pairs
            .iter()
            .map(|&(a, b)| angle(&edges[a], &edges[b]).to_degrees())
            .collect()
    }

    /// 各轴标签："原点 + 轴名[边向量]"
    pub fn axis_names(&self) -> Vec<String> {
        let origin = format_vector(&self.ll);
        self.edges()
            .iter()
            .zip(["x", "y", "z"])
            .map(|(edge, axis)| format!("{} + {}{}", origin, axis, format_vector(edge)))
            .collect()
    }

    /// 完整网格：三个分量数组，形状均为 bins
    pub fn q_meshgrid(&self) -> [ArrayD<f64>; 3] {
        let full: Vec<usize> = self.bins.clone();
        [0, 1, 2].map(|c| self.component(c, &full))
    }

    /// 分量 c (0=x, 1=y, 2=z) 的最小广播形状
    ///
    /// 若第 a 条边在分量 c 上为零，则该分量沿轴 a 不变，对应长度取 1。
    pub fn squashed_shape(&self, c: usize) -> Vec<usize> {
        self.edges()
            .iter()
            .zip(&self.bins)
            .map(|(edge, &n)| if edge[c] != 0.0 { n } else { 1 })
            .collect()
    }

    /// 最小广播网格：每个分量只沿其实际变化的轴展开
    ///
    /// 广播到 bins 形状后与 `q_meshgrid()` 完全一致。
    pub fn squashed_q_meshgrid(&self) -> [ArrayD<f64>; 3] {
        [0, 1, 2].map(|c| self.component(c, &self.squashed_shape(c)))
    }

    /// 在给定形状上计算分量 c；形状中长度为 1 的轴取索引 0
    fn component(&self, c: usize, shape: &[usize]) -> ArrayD<f64> {
        let edges = self.edges();
        let steps: Vec<f64> = self.bins.iter().map(|&n| (n - 1) as f64).collect();
        let origin = self.ll[c];

        ArrayD::from_shape_fn(IxDyn(shape), |idx| {
            edges
                .iter()
                .enumerate()
                .fold(origin, |acc, (a, edge)| {
                    acc + idx[a] as f64 / steps[a] * edge[c]
                })
        })
    }
}

/// 将切片转换为三维向量
fn to_vector(v: &[f64]) -> Result<Vector3<f64>> {
    match *v {
        [x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(DiffuseError::InvalidDimension { len: v.len() }),
    }
}

fn checked_bins(bins: &[usize]) -> Result<Vec<usize>> {
    if bins.len() != 2 && bins.len() != 3 {
        return Err(DiffuseError::InvalidBinCount(format!(
            "expected 2 or 3 bin counts, got {}",
            bins.len()
        )));
    }
    if let Some(&n) = bins.iter().find(|&&n| n < 2) {
        return Err(DiffuseError::InvalidBinCount(format!(
            "each bin count must be >= 2, got {}",
            n
        )));
    }
    Ok(bins.to_vec())
}

fn ensure_non_zero(name: &str, edge: &Vector3<f64>) -> Result<()> {
    if length(edge) == 0.0 {
        return Err(DiffuseError::InvalidGeometry(format!(
            "{} coincides with ll, edge has zero length",
            name
        )));
    }
    Ok(())
}

fn ensure_not_parallel(
    name: &str,
    edge: &Vector3<f64>,
    other_name: &str,
    other: &Vector3<f64>,
) -> Result<()> {
    if check_parallel(edge, other) {
        return Err(DiffuseError::InvalidGeometry(format!(
            "{} - ll {} is parallel to {} - ll {}",
            name,
            format_vector(edge),
            other_name,
            format_vector(other)
        )));
    }
    Ok(())
}

/// 线性等分序列，首尾精确
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        stop
                    } else {
                        start + i as f64 * step
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::SQRT_2;

    fn assert_vec_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "expected {:?}, got {:?}", expected, actual);
        }
    }

    /// 广播后的最小网格应与完整网格逐点一致
    fn assert_squashed_matches_full(grid: &Grid) {
        let full = grid.q_meshgrid();
        let squashed = grid.squashed_q_meshgrid();
        for c in 0..3 {
            assert_eq!(full[c].shape(), grid.bins());
            let view = squashed[c]
                .broadcast(grid.shape())
                .expect("squashed component must broadcast to the full shape");
            for (a, b) in full[c].iter().zip(view.iter()) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_default_grid() {
        let grid = Grid::new();

        assert_eq!(grid.bins(), &[101, 101]);
        assert!(grid.is_2d());
        assert_eq!(grid.ll(), [0.0, 0.0, 0.0]);
        assert_eq!(grid.lr(), [1.0, 0.0, 0.0]);
        assert_eq!(grid.ul(), [0.0, 1.0, 0.0]);
        assert_eq!(grid.tl(), [0.0, 0.0, 1.0]);
        assert_eq!(grid.v1(), [1.0, 0.0, 0.0]);
        assert_eq!(grid.v2(), [0.0, 1.0, 0.0]);
        assert_eq!(grid.v3(), [0.0, 0.0, 1.0]);
        assert_eq!(grid.r1(), linspace(0.0, 1.0, 101));
        assert_eq!(grid.r2(), linspace(0.0, 1.0, 101));
        assert_eq!(grid.r3(), vec![0.0]);
        assert!((grid.r1()[50] - 0.5).abs() < 1e-15);
        assert_eq!(grid.units(), "r.l.u.");
        assert_eq!(
            grid.axis_names(),
            vec!["[0 0 0] + x[1 0 0]", "[0 0 0] + y[0 1 0]"]
        );

        let [qx, qy, qz] = grid.q_meshgrid();
        assert!((qx[[30, 70]] - 0.3).abs() < 1e-12);
        assert!((qy[[30, 70]] - 0.7).abs() < 1e-12);
        assert!(qz.iter().all(|&v| v == 0.0));

        let [qx, qy, qz] = grid.squashed_q_meshgrid();
        assert_eq!(qx.shape(), &[101, 1]);
        assert_eq!(qy.shape(), &[1, 101]);
        assert_eq!(qz.shape(), &[1, 1]);
        assert_eq!(qz[[0, 0]], 0.0);
        assert_squashed_matches_full(&grid);
    }

    #[test]
    fn test_default_grid_3d() {
        let mut grid = Grid::new();
        grid.set_bins(&[101, 101, 101]).unwrap();

        assert!(!grid.is_2d());
        assert_eq!(grid.r3(), linspace(0.0, 1.0, 101));

        let [qx, qy, qz] = grid.q_meshgrid();
        assert!((qx[[10, 20, 30]] - 0.1).abs() < 1e-12);
        assert!((qy[[10, 20, 30]] - 0.2).abs() < 1e-12);
        assert!((qz[[10, 20, 30]] - 0.3).abs() < 1e-12);

        let [qx, qy, qz] = grid.squashed_q_meshgrid();
        assert_eq!(qx.shape(), &[101, 1, 1]);
        assert_eq!(qy.shape(), &[1, 101, 1]);
        assert_eq!(qz.shape(), &[1, 1, 101]);
        assert_squashed_matches_full(&grid);
    }

    #[test]
    fn test_oblique_2d() {
        let mut grid = Grid::new();
        grid.set_ll(&[0.0, 0.0, 0.0]).unwrap();
        grid.set_lr(&[2.0, 2.0, 0.0]).unwrap();
        grid.set_ul(&[3.0, -3.0, 0.0]).unwrap();
        grid.set_bins(&[3, 4]).unwrap();

        assert_eq!(grid.bins(), &[3, 4]);
        assert!(grid.is_2d());
        assert_vec_close(&grid.v1(), &[1.0 / SQRT_2, 1.0 / SQRT_2, 0.0], 1e-12);
        assert_vec_close(&grid.v2(), &[1.0 / SQRT_2, -1.0 / SQRT_2, 0.0], 1e-12);
        // v1 × v2 指向 -z
        assert_vec_close(&grid.v3(), &[0.0, 0.0, -1.0], 1e-12);
        assert_vec_close(&grid.r1(), &linspace(0.0, 2.0 * SQRT_2, 3), 1e-12);
        assert_vec_close(&grid.r2(), &linspace(0.0, 3.0 * SQRT_2, 4), 1e-12);
        assert_eq!(grid.r3(), vec![0.0]);
        assert_eq!(
            grid.axis_names(),
            vec!["[0 0 0] + x[2 2 0]", "[0 0 0] + y[3 -3 0]"]
        );
        assert_vec_close(&grid.axis_angles(), &[90.0], 1e-9);

        let [qx, qy, qz] = grid.q_meshgrid();
        let expected_x = [
            [0.0, 1.0, 2.0, 3.0],
            [1.0, 2.0, 3.0, 4.0],
            [2.0, 3.0, 4.0, 5.0],
        ];
        let expected_y = [
            [0.0, -1.0, -2.0, -3.0],
            [1.0, 0.0, -1.0, -2.0],
            [2.0, 1.0, 0.0, -1.0],
        ];
        for i in 0..3 {
            for j in 0..4 {
                assert!((qx[[i, j]] - expected_x[i][j]).abs() < 1e-12);
                assert!((qy[[i, j]] - expected_y[i][j]).abs() < 1e-12);
                assert_eq!(qz[[i, j]], 0.0);
            }
        }

        let [sx, sy, sz] = grid.squashed_q_meshgrid();
        assert_eq!(sx.shape(), &[3, 4]);
        assert_eq!(sy.shape(), &[3, 4]);
        assert_eq!(sz.shape(), &[1, 1]);
        assert_squashed_matches_full(&grid);
    }

    #[test]
    fn test_complete_3d() {
        let mut grid = Grid::new();
        grid.set_ll(&[-2.0, -3.0, -4.0]).unwrap();
        grid.set_lr(&[2.0, -3.0, -4.0]).unwrap();
        grid.set_ul(&[-2.0, 3.0, -4.0]).unwrap();
        grid.set_tl(&[-2.0, -3.0, 4.0]).unwrap();
        grid.set_bins(&[3, 4, 5]).unwrap();

        assert!(!grid.is_2d());
        assert_eq!(grid.v1(), [1.0, 0.0, 0.0]);
        assert_eq!(grid.v2(), [0.0, 1.0, 0.0]);
        assert_eq!(grid.v3(), [0.0, 0.0, 1.0]);
        assert_vec_close(&grid.r1(), &[0.0, 2.0, 4.0], 1e-12);
        assert_vec_close(&grid.r2(), &[0.0, 2.0, 4.0, 6.0], 1e-12);
        assert_vec_close(&grid.r3(), &[0.0, 2.0, 4.0, 6.0, 8.0], 1e-12);
        assert_eq!(
            grid.axis_names(),
            vec![
                "[-2 -3 -4] + x[4 0 0]",
                "[-2 -3 -4] + y[0 6 0]",
                "[-2 -3 -4] + z[0 0 8]"
            ]
        );

        let [sx, sy, sz] = grid.squashed_q_meshgrid();
        assert_eq!(sx.shape(), &[3, 1, 1]);
        assert_eq!(sy.shape(), &[1, 4, 1]);
        assert_eq!(sz.shape(), &[1, 1, 5]);
        assert_vec_close(sx.as_slice().unwrap(), &[-2.0, 0.0, 2.0], 1e-12);
        assert_vec_close(sy.as_slice().unwrap(), &[-3.0, -1.0, 1.0, 3.0], 1e-12);
        assert_vec_close(sz.as_slice().unwrap(), &[-4.0, -2.0, 0.0, 2.0, 4.0], 1e-12);
        assert_squashed_matches_full(&grid);
    }

    #[test]
    fn test_oblique_3d_squashing() {
        let grid = {
            let mut g = Grid::from_corners(
                &[0.0, 0.0, 0.0],
                &[1.0, 2.0, 3.0],
                &[0.0, 5.0, 2.0],
                &[2, 3, 4],
            )
            .unwrap();
            g.set_tl(&[7.0, 0.0, 1.0]).unwrap();
            g
        };

        let angles = grid.axis_angles();
        assert_eq!(angles.len(), 3);
        // (1 2 3)·(0 5 2) = 16, |.| = √14 · √29
        assert!((angles[0] - (16.0 / (14f64.sqrt() * 29f64.sqrt())).acos().to_degrees()).abs() < 1e-9);
        assert!(angles.iter().all(|&a| a > 0.0 && a < 180.0));

        assert_eq!(grid.squashed_shape(0), vec![2, 1, 4]);
        assert_eq!(grid.squashed_shape(1), vec![2, 3, 1]);
        assert_eq!(grid.squashed_shape(2), vec![2, 3, 4]);
        assert_squashed_matches_full(&grid);
    }

    #[test]
    fn test_squashed_shape_axis_aligned() {
        let mut grid = Grid::new();
        grid.set_bins(&[2, 3]).unwrap();
        assert_eq!(grid.squashed_shape(0), vec![2, 1]);
        assert_eq!(grid.squashed_shape(1), vec![1, 3]);

        grid.set_bins(&[2, 3, 4]).unwrap();
        assert_eq!(grid.squashed_shape(0), vec![2, 1, 1]);
        assert_eq!(grid.squashed_shape(1), vec![1, 3, 1]);
        assert_eq!(grid.squashed_shape(2), vec![1, 1, 4]);
    }

    #[test]
    fn test_derived_values_follow_mutation() {
        let mut grid = Grid::new();
        assert_eq!(grid.r1().len(), 101);
        grid.set_bins(&[5, 7]).unwrap();
        grid.set_lr(&[4.0, 0.0, 0.0]).unwrap();
        assert_eq!(grid.r1(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.q_meshgrid()[0].shape(), &[5, 7]);
        assert_eq!(grid.len(), 35);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut grid = Grid::new();

        assert!(matches!(
            grid.set_bins(&[1, 1, 1]),
            Err(DiffuseError::InvalidBinCount(_))
        ));
        assert!(matches!(
            grid.set_bins(&[2, 3, 4, 5]),
            Err(DiffuseError::InvalidBinCount(_))
        ));
        assert!(matches!(
            grid.set_ll(&[1.0, 2.0]),
            Err(DiffuseError::InvalidDimension { len: 2 })
        ));
        assert!(matches!(
            grid.set_lr(&[1.0, 2.0, 3.0, 4.0]),
            Err(DiffuseError::InvalidDimension { len: 4 })
        ));
        assert!(matches!(
            grid.set_ul(&[1.0]),
            Err(DiffuseError::InvalidDimension { len: 1 })
        ));
        assert!(matches!(
            grid.set_tl(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            Err(DiffuseError::InvalidDimension { len: 5 })
        ));
        assert!(matches!(
            grid.set_ul(&[1.0, 0.0, 0.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert!(matches!(
            grid.set_lr(&[0.0, 0.0, 0.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert!(matches!(
            grid.set_tl(&[2.0, 0.0, 0.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));

        // 失败的设置不改变网格
        assert_eq!(grid, Grid::new());
    }

    #[test]
    fn test_from_corners_parallel_ul() {
        assert!(matches!(
            Grid::from_corners(&[0.0; 3], &[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[11, 11]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_set_ll_onto_existing_corner() {
        let mut grid = Grid::new();
        assert!(matches!(
            grid.set_ll(&[1.0, 0.0, 0.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        // ll 移到 lr、ul 连线上，两条边平行
        assert!(matches!(
            grid.set_ll(&[2.0, -1.0, 0.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert_eq!(grid, Grid::new());
        assert!(grid.v1().iter().all(|v| v.is_finite()));

        grid.set_tl(&[0.0, 0.0, 2.0]).unwrap();
        assert!(matches!(
            grid.set_ll(&[0.0, 0.0, 2.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert_eq!(grid.ll(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_set_lr_parallel_to_tl() {
        let mut grid = Grid::new();
        grid.set_tl(&[0.0, 0.0, 1.0]).unwrap();
        assert!(matches!(
            grid.set_lr(&[0.0, 0.0, 2.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert!(matches!(
            grid.set_ul(&[0.0, 0.0, -3.0]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert_eq!(grid.lr(), [1.0, 0.0, 0.0]);
        assert_eq!(grid.ul(), [0.0, 1.0, 0.0]);

        grid.set_lr(&[1.0, 0.0, 1.0]).unwrap();
        assert_eq!(grid.lr(), [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_default_third_edge_degenerate() {
        // 默认顶角 [0 0 1] 与 ll 重合
        assert!(matches!(
            Grid::from_corners(&[0.0, 0.0, 1.0], &[1.0, 0.0, 1.0], &[0.0, 1.0, 1.0], &[3, 3, 3]),
            Err(DiffuseError::InvalidGeometry(_))
        ));

        // 平面网格不使用第三条边，切换为体网格时才校验
        let mut grid =
            Grid::from_corners(&[0.0, 0.0, 1.0], &[1.0, 0.0, 1.0], &[0.0, 1.0, 1.0], &[3, 3])
                .unwrap();
        assert!(matches!(
            grid.set_bins(&[3, 3, 3]),
            Err(DiffuseError::InvalidGeometry(_))
        ));
        assert!(grid.is_2d());

        // 默认第三条边与 lr 边平行
        let mut grid = Grid::new();
        grid.set_lr(&[0.0, 0.0, 1.0]).unwrap();
        grid.set_ul(&[0.0, 1.0, 0.0]).unwrap();
        assert!(grid.set_bins(&[2, 2, 2]).is_err());

        // 显式给出顶角后同一组角点合法
        let grid = Grid::from_corners_3d(
            &[0.0, 0.0, 1.0],
            &[1.0, 0.0, 1.0],
            &[0.0, 1.0, 1.0],
            &[0.0, 0.0, 3.0],
            &[3, 3, 3],
        )
        .unwrap();
        assert_vec_close(&grid.r3(), &[0.0, 1.0, 2.0], 1e-12);
        assert!(grid.r3().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
