//! # 解析器模块
//!
//! 读取命令行输入的原子表。
//!
//! ## 依赖关系
//! - 被 `commands/calc.rs` 使用
//! - 使用 `qdiffuse::models` 数据模型
//! - 子模块: atom_table

pub mod atom_table;
