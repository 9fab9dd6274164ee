//! # 晶胞与度规张量
//!
//! 用度规张量 G 及其逆 G* 表示正空间与倒空间的晶格几何。
//!
//! ## 公式
//! - G 对角元 = 晶格常数平方，非对角元 = 两长度之积 × 夹角余弦
//! - G* = G⁻¹
//! - a* = sqrt(G*₁₁)，α* = arccos(G*₂₃ / (b* c*))
//! - V = sqrt(det G)
//!
//! ## 笛卡尔坐标约定
//! a 沿 x 轴，b 位于 xy 平面，c 补全晶胞（与 `Crystal` 的晶格构造一致）。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 和 `fourier/engine.rs` 使用
//! - 使用 `nalgebra` 的固定尺寸 3x3 矩阵

use crate::error::{DiffuseError, Result};

use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;

/// 晶胞参数及其派生量
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    a: f64,
    b: f64,
    c: f64,
    /// 弧度
    alpha: f64,
    beta: f64,
    gamma: f64,
    g: Matrix3<f64>,
    g_star: Matrix3<f64>,
    /// 列向量为 a, b, c 的笛卡尔分量
    basis: Matrix3<f64>,
    basis_inv: Matrix3<f64>,
}

impl Default for UnitCell {
    fn default() -> Self {
        // 单位立方晶胞总是合法的
        Self::from_parameters(1.0, 1.0, 1.0, PI / 2.0, PI / 2.0, PI / 2.0)
            .unwrap_or_else(|_| unreachable!("unit cube is a valid cell"))
    }
}

impl UnitCell {
    /// 从 1 个（立方）、3 个（正交）或 6 个（三斜，角度单位：度）参数创建晶胞
    pub fn new(params: &[f64]) -> Result<Self> {
        let (a, b, c, alpha, beta, gamma) = expand_parameters(params)?;
        Self::from_parameters(a, b, c, alpha, beta, gamma)
    }

    /// 重新设置晶胞参数
    ///
    /// 所有派生量在临时值中计算完成后一次性替换；出错时晶胞保持不变。
    pub fn set_cell(&mut self, params: &[f64]) -> Result<()> {
        *self = Self::new(params)?;
        Ok(())
    }

    /// 角度以弧度给出
    fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        if a <= 0.0 || b <= 0.0 || c <= 0.0 {
            return Err(DiffuseError::InvalidGeometry(format!(
                "cell lengths must be positive, got ({}, {}, {})",
                a, b, c
            )));
        }

        if alpha > beta + gamma || beta > alpha + gamma || gamma > alpha + beta {
            return Err(DiffuseError::InvalidGeometry(format!(
                "invalid angles ({:.3}, {:.3}, {:.3}): no angle may exceed the sum of the other two",
                alpha.to_degrees(),
                beta.to_degrees(),
                gamma.to_degrees()
            )));
        }

        let (ca, cb, cg) = (alpha.cos(), beta.cos(), gamma.cos());

        // det G / (abc)²，<= 0 时三个向量共面或无法构成晶胞
        let shape = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if shape <= 1e-12 || gamma.sin().abs() < 1e-12 {
            return Err(DiffuseError::InvalidGeometry(format!(
                "angles ({:.3}, {:.3}, {:.3}) do not span a volume",
                alpha.to_degrees(),
                beta.to_degrees(),
                gamma.to_degrees()
            )));
        }

        let g = Matrix3::new(
            a * a,
            a * b * cg,
            a * c * cb,
            a * b * cg,
            b * b,
            b * c * ca,
            a * c * cb,
            b * c * ca,
            c * c,
        );

        let g_star = g.try_inverse().ok_or_else(|| {
            DiffuseError::InvalidGeometry("metric tensor is singular".to_string())
        })?;

        // 晶格向量：a 沿 x，b 在 xy 平面
        let sg = gamma.sin();
        let c1 = c * cb;
        let c2 = c * (ca - cb * cg) / sg;
        let c3 = (c * c - c1 * c1 - c2 * c2).max(0.0).sqrt();
        let basis = Matrix3::new(a, b * cg, c1, 0.0, b * sg, c2, 0.0, 0.0, c3);

        let basis_inv = basis.try_inverse().ok_or_else(|| {
            DiffuseError::InvalidGeometry("lattice basis is singular".to_string())
        })?;

        Ok(UnitCell {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
            g,
            g_star,
            basis,
            basis_inv,
        })
    }

    /// 晶胞参数 (a, b, c, α, β, γ)，角度单位：度
    pub fn cell(&self) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.a,
            self.b,
            self.c,
            self.alpha.to_degrees(),
            self.beta.to_degrees(),
            self.gamma.to_degrees(),
        )
    }

    /// 度规张量 G
    pub fn g(&self) -> &Matrix3<f64> {
        &self.g
    }

    /// 倒易度规张量 G* = G⁻¹
    pub fn g_star(&self) -> &Matrix3<f64> {
        &self.g_star
    }

    /// 倒格子参数 (a*, b*, c*, α*, β*, γ*)，角度单位：度
    pub fn reciprocal_cell(&self) -> (f64, f64, f64, f64, f64, f64) {
        let gs = &self.g_star;
        let ra = gs[(0, 0)].sqrt();
        let rb = gs[(1, 1)].sqrt();
        let rc = gs[(2, 2)].sqrt();

        (
            ra,
            rb,
            rc,
            clamped_acos(gs[(1, 2)] / (rb * rc)).to_degrees(),
            clamped_acos(gs[(0, 2)] / (ra * rc)).to_degrees(),
            clamped_acos(gs[(0, 1)] / (ra * rb)).to_degrees(),
        )
    }

    /// 晶胞体积 sqrt(det G)
    pub fn volume(&self) -> f64 {
        self.g.determinant().sqrt()
    }

    /// 倒格子体积 sqrt(det G*)
    pub fn reciprocal_volume(&self) -> f64 {
        self.g_star.determinant().sqrt()
    }

    /// 倒格矢矩阵 B，列向量为 a*, b*, c*（不含 2π）
    pub fn b_matrix(&self) -> Matrix3<f64> {
        self.basis_inv.transpose()
    }

    /// 分数坐标转笛卡尔坐标
    pub fn cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        (self.basis * Vector3::from(frac)).into()
    }

    /// 笛卡尔坐标转分数坐标
    pub fn fractional(&self, cart: [f64; 3]) -> [f64; 3] {
        (self.basis_inv * Vector3::from(cart)).into()
    }

    pub fn cartesian_many(&self, frac: &[[f64; 3]]) -> Vec<[f64; 3]> {
        frac.iter().map(|&p| self.cartesian(p)).collect()
    }

    pub fn fractional_many(&self, cart: &[[f64; 3]]) -> Vec<[f64; 3]> {
        cart.iter().map(|&p| self.fractional(p)).collect()
    }

    /// 倒空间点 (h, k, l) 对应的笛卡尔动量转移 Q = 2π B·hkl
    pub fn q_cartesian(&self, hkl: [f64; 3]) -> [f64; 3] {
        (self.b_matrix() * Vector3::from(hkl) * (2.0 * PI)).into()
    }

    /// |Q| = 2π sqrt(hklᵀ G* hkl)
    pub fn q_magnitude(&self, hkl: [f64; 3]) -> f64 {
        let h = Vector3::from(hkl);
        2.0 * PI * h.dot(&(self.g_star * h)).max(0.0).sqrt()
    }
}

/// 将 1/3/6 个参数展开为 (a, b, c, α, β, γ)，角度转换为弧度
fn expand_parameters(params: &[f64]) -> Result<(f64, f64, f64, f64, f64, f64)> {
    let right = PI / 2.0;
    match *params {
        [a] => Ok((a, a, a, right, right, right)),
        [a, b, c] => Ok((a, b, c, right, right, right)),
        [a, b, c, alpha, beta, gamma] => Ok((
            a,
            b,
            c,
            alpha.to_radians(),
            beta.to_radians(),
            gamma.to_radians(),
        )),
        _ => Err(DiffuseError::InvalidParameterCount {
            count: params.len(),
        }),
    }
}

fn clamped_acos(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}
