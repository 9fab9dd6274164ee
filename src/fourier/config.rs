//! # 傅里叶计算配置
//!
//! 一次计算所需的全部选项，构造后不可变，由调用方显式传给
//! `Fourier::calc`。
//!
//! ## 依赖关系
//! - 被 `fourier/engine.rs` 和 `commands/calc.rs` 使用

use crate::error::{DiffuseError, Result};

use std::fmt;
use std::str::FromStr;

/// 辐射类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radiation {
    #[default]
    Neutron,
    Xray,
}

impl FromStr for Radiation {
    type Err = DiffuseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "neutron" | "nuclear" => Ok(Radiation::Neutron),
            "xray" | "x-ray" => Ok(Radiation::Xray),
            _ => Err(DiffuseError::InvalidRadiation(s.to_string())),
        }
    }
}

impl fmt::Display for Radiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radiation::Neutron => write!(f, "neutron"),
            Radiation::Xray => write!(f, "xray"),
        }
    }
}

/// 结果强度的散射类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatteringKind {
    Neutron,
    Xray,
    Magnetic,
}

impl fmt::Display for ScatteringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScatteringKind::Neutron => write!(f, "neutron"),
            ScatteringKind::Xray => write!(f, "xray"),
            ScatteringKind::Magnetic => write!(f, "magnetic"),
        }
    }
}

/// 分块（lots）设置：每块沿 i/j/k 的晶胞数，以及块数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lots {
    pub shape: [usize; 3],
    pub count: usize,
}

impl Lots {
    pub fn new(shape: [usize; 3], count: usize) -> Result<Self> {
        if shape.iter().any(|&n| n == 0) {
            return Err(DiffuseError::InvalidLots(format!(
                "lot shape must be at least 1 cell in each direction, got {:?}",
                shape
            )));
        }
        if count == 0 {
            return Err(DiffuseError::InvalidLots(
                "number of lots must be at least 1".to_string(),
            ));
        }
        Ok(Self { shape, count })
    }

    /// 每块包含的晶胞数
    pub fn cells_per_lot(&self) -> usize {
        self.shape.iter().product()
    }
}

/// 傅里叶计算配置
#[derive(Debug, Clone, PartialEq)]
pub struct FourierConfig {
    pub radiation: Radiation,
    /// 计算磁散射（忽略 radiation）
    pub magnetic: bool,
    /// 使用可分离相位因子
    pub fast: bool,
    pub lots: Option<Lots>,
    /// 扣除平均结构
    pub subtract_average: bool,
    /// 磁散射因子的离子价态
    pub magnetic_ion: i32,
    /// lots 随机偏移的种子；None 时取系统熵
    pub seed: Option<u64>,
}

impl Default for FourierConfig {
    fn default() -> Self {
        Self {
            radiation: Radiation::Neutron,
            magnetic: false,
            fast: true,
            lots: None,
            subtract_average: false,
            magnetic_ion: 3,
            seed: None,
        }
    }
}

impl FourierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radiation(mut self, radiation: Radiation) -> Self {
        self.radiation = radiation;
        self
    }

    pub fn with_magnetic(mut self, magnetic: bool) -> Self {
        self.magnetic = magnetic;
        self
    }

    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn with_lots(mut self, lots: Option<Lots>) -> Self {
        self.lots = lots;
        self
    }

    pub fn with_average(mut self, subtract_average: bool) -> Self {
        self.subtract_average = subtract_average;
        self
    }

    pub fn with_magnetic_ion(mut self, ion: i32) -> Self {
        self.magnetic_ion = ion;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// 本次计算得到的强度类型
    pub fn kind(&self) -> ScatteringKind {
        match (self.magnetic, self.radiation) {
            (true, _) => ScatteringKind::Magnetic,
            (false, Radiation::Neutron) => ScatteringKind::Neutron,
            (false, Radiation::Xray) => ScatteringKind::Xray,
        }
    }
}
