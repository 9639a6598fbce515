//! # 评分模块
//!
//! 五个独立子分数函数、核自旋数据与加权几何平均聚合器。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs` 和 `commands/` 使用
//! - 使用 `models/record.rs` 的 MaterialRecord

pub mod aggregate;
pub mod spin;
pub mod subscores;

pub use aggregate::{PropertySchema, Weights};
