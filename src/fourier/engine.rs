//! # 傅里叶引擎
//!
//! 在网格的每个倒空间点上直接求和计算漫散射强度。
//!
//! ## 算法概述
//! 1. 按元素分组，每种元素只查询一次散射因子
//! 2. 每个原子贡献相位 exp(2πi(hx + ky + lz))
//!    - 快速路径：三个一维可分离因子在最小广播网格上相乘
//!    - 慢速路径：完整网格上的点积
//! 3. 核散射 / X 射线：I = |F|²
//! 4. 磁散射：M⊥ = M - (M·Q/|Q|²)Q，I = Σ|M⊥ᵢ|²，|Q| = 0 处为 NaN
//! 5. 分块 (lots)：随机循环偏移选取若干晶胞块，各块强度求和
//! 6. 平均结构扣除：F - ⟨F_cell⟩·Σ_R exp(2πi q·R)
//!
//! ## 依赖关系
//! - 使用 `grid/` 生成倒空间坐标
//! - 使用 `models/` 的 Structure, UnitCell
//! - 使用 `fourier/form_factor.rs` 获取散射因子
//! - 使用 `rayon` 在元素和分块之间并行

use crate::error::{DiffuseError, Result};
use crate::fourier::config::{FourierConfig, Lots, ScatteringKind};
use crate::fourier::form_factor::FormFactorSource;
use crate::fourier::intensity::IntensityMap;
use crate::grid::Grid;
use crate::models::{CellRow, Structure, UnitCell};

use log::{debug, info, warn};
use ndarray::{ArrayD, IxDyn, Zip};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::f64::consts::PI;

/// 傅里叶引擎：持有网格和散射因子服务的只读引用
pub struct Fourier<'a> {
    grid: &'a Grid,
    form_factors: &'a dyn FormFactorSource,
}

impl<'a> Fourier<'a> {
    pub fn new(grid: &'a Grid, form_factors: &'a dyn FormFactorSource) -> Self {
        Self { grid, form_factors }
    }

    /// 计算结构在当前网格上的漫散射强度
    pub fn calc(&self, structure: &dyn Structure, config: &FourierConfig) -> Result<IntensityMap> {
        let kind = config.kind();
        let cell = structure.unit_cell()?;
        let q = QSpace::new(self.grid, &cell, config.fast, kind != ScatteringKind::Neutron);

        let species = structure.species()?;
        let factors = self.form_factor_table(&species, config, &q)?;

        if kind == ScatteringKind::Magnetic && config.subtract_average {
            warn!("Average subtraction is not applied to magnetic scattering, ignoring");
        }
        let average = config.subtract_average && kind != ScatteringKind::Magnetic;

        let values = match &config.lots {
            None => self.calc_full(structure, config, &q, &factors, average)?,
            Some(lots) => self.calc_lots(structure, config, lots, &q, &factors, average)?,
        };

        Ok(IntensityMap::from_grid(self.grid, values, kind))
    }

    /// 每种元素的散射因子；找不到的元素记录警告后跳过
    fn form_factor_table(
        &self,
        species: &[String],
        config: &FourierConfig,
        q: &QSpace,
    ) -> Result<HashMap<String, FormFactor>> {
        let unique: BTreeSet<&str> = species.iter().map(String::as_str).collect();
        let mut table = HashMap::new();

        for sp in unique {
            let factor = match config.kind() {
                ScatteringKind::Neutron => self.form_factors.nuclear_factor(sp).map(FormFactor::Constant),
                ScatteringKind::Xray => self
                    .form_factors
                    .xray_factor(sp, q.magnitude()?)
                    .map(FormFactor::Varying),
                ScatteringKind::Magnetic => self
                    .form_factors
                    .magnetic_factor(sp, q.magnitude()?, config.magnetic_ion)
                    .map(FormFactor::Varying),
            };

            match factor {
                Ok(f) => {
                    table.insert(sp.to_string(), f);
                }
                Err(e) if e.is_not_found() => {
                    warn!("Skipping fourier calculation for '{}': {}", sp, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(table)
    }

    // ─────────────────────────────────────────────────────────────
    // 整体计算
    // ─────────────────────────────────────────────────────────────

    fn calc_full(
        &self,
        structure: &dyn Structure,
        config: &FourierConfig,
        q: &QSpace,
        factors: &HashMap<String, FormFactor>,
        average: bool,
    ) -> Result<ArrayD<f64>> {
        let species = structure.species()?;
        let positions = structure.positions(true)?;
        ensure_same_len("positions", positions.len(), species.len())?;
        let species: Vec<&str> = species.iter().map(String::as_str).collect();

        if config.magnetic {
            let moments = structure.magnetic_moments()?;
            ensure_same_len("magnetic moments", moments.len(), species.len())?;
            let m = magnetization(q, factors, &species, &positions, &moments);
            return q.reject(m);
        }

        let mut f = structure_factor(q, factors, &species, &positions);
        if average {
            let rows = structure.cell_table()?;
            let mean = mean_cell_factor(q, factors, &rows);
            subtract_average(q, &mut f, &mean, &unique_cells(&rows));
        }
        Ok(f.mapv(|v| v.norm_sqr()))
    }

    // ─────────────────────────────────────────────────────────────
    // 分块计算
    // ─────────────────────────────────────────────────────────────

    fn calc_lots(
        &self,
        structure: &dyn Structure,
        config: &FourierConfig,
        lots: &Lots,
        q: &QSpace,
        factors: &HashMap<String, FormFactor>,
        average: bool,
    ) -> Result<ArrayD<f64>> {
        let rows = structure.cell_table()?;
        if config.magnetic {
            // 没有任何磁矩时在此报错
            structure.magnetic_moments()?;
        }

        let levels = cell_levels(&rows);
        for (d, level) in levels.iter().enumerate() {
            if lots.shape[d] > level.len() {
                return Err(DiffuseError::InvalidLots(format!(
                    "lot size {} along axis {} exceeds the {} cells of the structure",
                    lots.shape[d],
                    d,
                    level.len()
                )));
            }
        }

        debug!(
            "{} lots of {} cells ({}x{}x{})",
            lots.count,
            lots.cells_per_lot(),
            lots.shape[0],
            lots.shape[1],
            lots.shape[2]
        );

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let offsets: Vec<[usize; 3]> = (0..lots.count)
            .map(|_| [0, 1, 2].map(|d| rng.gen_range(0..levels[d].len())))
            .collect();

        let mean = average.then(|| mean_cell_factor(q, factors, &rows));

        let total = offsets
            .par_iter()
            .enumerate()
            .map(|(n, offset)| {
                let selected = select_lot(&levels, *offset, lots.shape);
                let lot_rows: Vec<&CellRow> = rows
                    .iter()
                    .copied()
                    .filter(|r| (0..3).all(|d| selected[d].contains(&r.cell[d])))
                    .collect();
                info!(
                    "Lot {} out of {}: offsets {:?}, {} atoms",
                    n + 1,
                    lots.count,
                    offset,
                    lot_rows.len()
                );
                debug!("Lot {} cells: {:?}", n + 1, selected);

                lot_intensity(q, factors, &lot_rows, config.magnetic, mean.as_ref())
            })
            .try_reduce(|| ArrayD::zeros(q.shape.clone()), |a, b| Ok(a + b))?;

        Ok(total)
    }
}

/// 单个分块的强度
fn lot_intensity(
    q: &QSpace,
    factors: &HashMap<String, FormFactor>,
    rows: &[&CellRow],
    magnetic: bool,
    mean: Option<&ArrayD<Complex64>>,
) -> Result<ArrayD<f64>> {
    let species: Vec<&str> = rows.iter().map(|r| r.species.as_str()).collect();
    let positions: Vec<[f64; 3]> = rows.iter().map(|r| r.absolute_position()).collect();

    if magnetic {
        let moments: Vec<[f64; 3]> = rows.iter().map(|r| r.moment.unwrap_or([0.0; 3])).collect();
        let m = magnetization(q, factors, &species, &positions, &moments);
        return q.reject(m);
    }

    let mut f = structure_factor(q, factors, &species, &positions);
    if let Some(mean) = mean {
        subtract_average(q, &mut f, mean, &unique_cells(rows));
    }
    Ok(f.mapv(|v| v.norm_sqr()))
}

/// 按照循环偏移在各轴的有序晶胞索引中取连续 shape[d] 个
fn select_lot(levels: &[Vec<i64>; 3], offset: [usize; 3], shape: [usize; 3]) -> [Vec<i64>; 3] {
    [0, 1, 2].map(|d| {
        let level = &levels[d];
        (0..shape[d])
            .map(|t| level[(offset[d] + t) % level.len()])
            .collect()
    })
}

/// 各轴出现过的晶胞索引（升序去重）
fn cell_levels(rows: &[&CellRow]) -> [Vec<i64>; 3] {
    [0, 1, 2].map(|d| {
        rows.iter()
            .map(|r| r.cell[d])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    })
}

fn unique_cells(rows: &[&CellRow]) -> BTreeSet<[i64; 3]> {
    rows.iter().map(|r| r.cell).collect()
}

fn ensure_same_len(what: &str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(DiffuseError::UnsupportedStructure(format!(
            "structure reports {} {} for {} atoms",
            len, what, expected
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// 倒空间坐标
// ─────────────────────────────────────────────────────────────

/// 一次计算中共享的倒空间数组
struct QSpace {
    shape: IxDyn,
    /// 2π·(h, k, l)；快速路径为最小广播形状
    phase: [ArrayD<f64>; 3],
    fast: bool,
    /// 笛卡尔 Q = 2π·B·hkl，仅 X 射线和磁散射需要
    cartesian: Option<ArrayD<[f64; 3]>>,
    magnitude: Option<ArrayD<f64>>,
}

impl QSpace {
    fn new(grid: &Grid, cell: &UnitCell, fast: bool, with_cartesian: bool) -> Self {
        let meshgrid = if fast {
            grid.squashed_q_meshgrid()
        } else {
            grid.q_meshgrid()
        };
        let phase = meshgrid.map(|m| m.mapv(|v| 2.0 * PI * v));

        let cartesian = with_cartesian.then(|| {
            let [h, k, l] = grid.q_meshgrid();
            Zip::from(&h)
                .and(&k)
                .and(&l)
                .map_collect(|&h, &k, &l| cell.q_cartesian([h, k, l]))
        });
        let magnitude = cartesian
            .as_ref()
            .map(|qc| qc.mapv(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()));

        Self {
            shape: grid.shape(),
            phase,
            fast,
            cartesian,
            magnitude,
        }
    }

    fn magnitude(&self) -> Result<&ArrayD<f64>> {
        self.magnitude
            .as_ref()
            .ok_or_else(|| DiffuseError::InvalidArgument("|Q| was not prepared".to_string()))
    }

    /// 单个原子的三个相位因子，可广播到完整形状后相乘
    fn atom_phase(&self, pos: [f64; 3]) -> [ArrayD<Complex64>; 3] {
        if self.fast {
            [0, 1, 2].map(|c| self.phase[c].mapv(|q| Complex64::cis(q * pos[c])))
        } else {
            let [h, k, l] = &self.phase;
            let full = Zip::from(h)
                .and(k)
                .and(l)
                .map_collect(|&h, &k, &l| Complex64::cis(h * pos[0] + k * pos[1] + l * pos[2]));
            let ones = ArrayD::<Complex64>::ones(IxDyn(&vec![1; full.ndim()]));
            [full, ones.clone(), ones]
        }
    }

    /// Σ exp(2πi q·r)
    fn phase_sum(&self, positions: impl IntoIterator<Item = [f64; 3]>) -> ArrayD<Complex64> {
        let mut total = ArrayD::<Complex64>::zeros(self.shape.clone());
        for pos in positions {
            let [fx, fy, fz] = self.atom_phase(pos);
            Zip::from(&mut total)
                .and_broadcast(&fx)
                .and_broadcast(&fy)
                .and_broadcast(&fz)
                .for_each(|t, &x, &y, &z| *t += x * y * z);
        }
        total
    }

    /// 磁矩垂直于 Q 的分量的强度；|Q| = 0 处为 NaN
    fn reject(&self, m: [ArrayD<Complex64>; 3]) -> Result<ArrayD<f64>> {
        let qc = self.cartesian.as_ref().ok_or_else(|| {
            DiffuseError::InvalidArgument("cartesian Q was not prepared".to_string())
        })?;
        let [mx, my, mz] = m;

        Ok(Zip::from(&mx)
            .and(&my)
            .and(&mz)
            .and(qc)
            .map_collect(|&mx, &my, &mz, q| {
                let q2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2];
                if q2 == 0.0 {
                    return f64::NAN;
                }
                let scale = (mx * q[0] + my * q[1] + mz * q[2]) / q2;
                (mx - scale * q[0]).norm_sqr()
                    + (my - scale * q[1]).norm_sqr()
                    + (mz - scale * q[2]).norm_sqr()
            }))
    }
}

// ─────────────────────────────────────────────────────────────
// 散射因子与求和
// ─────────────────────────────────────────────────────────────

/// 某元素在所有网格点上的散射因子
#[derive(Debug, Clone)]
enum FormFactor {
    /// 中子散射长度
    Constant(f64),
    /// 依赖 |Q| 的散射因子
    Varying(ArrayD<f64>),
}

impl FormFactor {
    fn apply(&self, values: &mut ArrayD<Complex64>) {
        match self {
            FormFactor::Constant(f) => values.mapv_inplace(|v| v * *f),
            FormFactor::Varying(f) => Zip::from(values).and(f).for_each(|v, &f| *v *= f),
        }
    }
}

/// 按元素分组的原子下标
fn group_by_species<'s>(species: &[&'s str]) -> Vec<(&'s str, Vec<usize>)> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, sp) in species.iter().enumerate() {
        groups.entry(*sp).or_default().push(i);
    }
    groups.into_iter().collect()
}

/// 有散射因子的元素分组
fn known_groups<'f, 's>(
    factors: &'f HashMap<String, FormFactor>,
    species: &[&'s str],
) -> Vec<(&'s str, Vec<usize>, &'f FormFactor)> {
    group_by_species(species)
        .into_iter()
        .filter_map(|(sp, idx)| factors.get(sp).map(|f| (sp, idx, f)))
        .collect()
}

/// 结构因子 F = Σ_species f · Σ_atoms exp(2πi q·r)
fn structure_factor(
    q: &QSpace,
    factors: &HashMap<String, FormFactor>,
    species: &[&str],
    positions: &[[f64; 3]],
) -> ArrayD<Complex64> {
    known_groups(factors, species)
        .par_iter()
        .map(|(sp, idx, ff)| {
            debug!("Working on {}, total atoms: {}", sp, idx.len());
            let mut f = q.phase_sum(idx.iter().map(|&i| positions[i]));
            ff.apply(&mut f);
            f
        })
        .reduce(|| ArrayD::zeros(q.shape.clone()), |a, b| a + b)
}

/// 磁化强度的三个分量 Σ f_m · m · exp(2πi q·r)
fn magnetization(
    q: &QSpace,
    factors: &HashMap<String, FormFactor>,
    species: &[&str],
    positions: &[[f64; 3]],
    moments: &[[f64; 3]],
) -> [ArrayD<Complex64>; 3] {
    let zeros = || [0, 1, 2].map(|_| ArrayD::<Complex64>::zeros(q.shape.clone()));

    known_groups(factors, species)
        .par_iter()
        .map(|(sp, idx, ff)| {
            debug!("Working on {}, total atoms: {}", sp, idx.len());
            let [mut sx, mut sy, mut sz] = zeros();
            for &i in idx {
                let [fx, fy, fz] = q.atom_phase(positions[i]);
                let [mx, my, mz] = moments[i];
                Zip::from(&mut sx)
                    .and(&mut sy)
                    .and(&mut sz)
                    .and_broadcast(&fx)
                    .and_broadcast(&fy)
                    .and_broadcast(&fz)
                    .for_each(|sx, sy, sz, &x, &y, &z| {
                        let p = x * y * z;
                        *sx += p * mx;
                        *sy += p * my;
                        *sz += p * mz;
                    });
            }
            for s in [&mut sx, &mut sy, &mut sz] {
                ff.apply(s);
            }
            [sx, sy, sz]
        })
        .reduce(zeros, |[ax, ay, az], [bx, by, bz]| [ax + bx, ay + by, az + bz])
}

/// 平均晶胞结构因子：所有原子取晶胞内坐标求和后除以晶胞数
fn mean_cell_factor(
    q: &QSpace,
    factors: &HashMap<String, FormFactor>,
    rows: &[&CellRow],
) -> ArrayD<Complex64> {
    let species: Vec<&str> = rows.iter().map(|r| r.species.as_str()).collect();
    let positions: Vec<[f64; 3]> = rows.iter().map(|r| r.position).collect();
    let n_cells: usize = cell_levels(rows).iter().map(Vec::len).product();

    let mut mean = structure_factor(q, factors, &species, &positions);
    if n_cells > 0 {
        mean.mapv_inplace(|v| v / n_cells as f64);
    }
    mean
}

/// F -= ⟨F_cell⟩ · Σ_R exp(2πi q·R)
fn subtract_average(
    q: &QSpace,
    f: &mut ArrayD<Complex64>,
    mean: &ArrayD<Complex64>,
    cells: &BTreeSet<[i64; 3]>,
) {
    let lattice = q.phase_sum(cells.iter().map(|c| c.map(|i| i as f64)));
    Zip::from(f)
        .and(mean)
        .and(&lattice)
        .for_each(|f, &m, &l| *f -= m * l);
}
