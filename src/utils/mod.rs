//! # 工具模块
//!
//! ## 依赖关系
//! - 被 `commands/`, `data/`, `batch/` 使用

pub mod output;
pub mod progress;
