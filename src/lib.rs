//! # qdiffuse
//!
//! 单晶漫散射计算库：晶胞度规、倒空间网格和直接求和傅里叶引擎。
//!
//! ## 模块
//! - `models`: 晶胞 (UnitCell) 与结构接口 (Structure)
//! - `grid`: 倒空间采样网格
//! - `fourier`: 中子 / X 射线 / 磁漫散射强度计算
//! - `error`: 统一错误类型

pub mod error;
pub mod fourier;
pub mod grid;
pub mod models;

pub use error::{DiffuseError, Result};
