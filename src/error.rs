//! # 统一错误处理模块
//!
//! 定义 qdiffuse 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误策略
//! - 参数校验错误在 setter 边界立即返回，不推迟到计算阶段
//! - 缺失散射因子 (`NotFound`) 由引擎捕获并跳过该元素，不中断计算
//! - 其余错误（几何、结构接口、辐射类型）均为致命错误
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// qdiffuse 统一错误类型
#[derive(Error, Debug)]
pub enum DiffuseError {
    // ─────────────────────────────────────────────────────────────
    // 参数校验错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid number of cell parameters: expected 1, 3 or 6, got {count}")]
    InvalidParameterCount { count: usize },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid dimension: expected a 3-component vector, got {len} components")]
    InvalidDimension { len: usize },

    #[error("Invalid bin count: {0}")]
    InvalidBinCount(String),

    #[error("Unknown radiation: '{0}' (expected 'neutron' or 'xray')")]
    InvalidRadiation(String),

    #[error("Invalid lots configuration: {0}")]
    InvalidLots(String),

    // ─────────────────────────────────────────────────────────────
    // 外部协作者错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported structure: {0}")]
    UnsupportedStructure(String),

    #[error("No {kind} form factor available for '{species}'")]
    NotFound { kind: String, species: String },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DiffuseError {
    /// 是否为可跳过的缺失散射因子错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiffuseError::NotFound { .. })
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DiffuseError>;
