//! # 数据模型模块
//!
//! 定义晶体结构与候选材料记录的统一表示。
//!
//! ## 依赖关系
//! - 被 `data/`, `matching/`, `score/` 使用
//! - 无外部模块依赖

pub mod record;
pub mod structure;
