//! # 傅里叶计算模块
//!
//! 漫散射强度计算：引擎、配置、散射因子和结果。
//!
//! ## 依赖关系
//! - 使用 `grid/` 和 `models/`
//! - 子模块: config, engine, form_factor, intensity

pub mod config;
pub mod engine;
pub mod form_factor;
pub mod intensity;

pub use config::{FourierConfig, Lots, Radiation, ScatteringKind};
pub use engine::Fourier;
pub use form_factor::{FormFactorSource, StandardTables};
pub use intensity::{AxisInfo, IntensityMap};
