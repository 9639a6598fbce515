//! # 批量测试模块
//!
//! 对一批化学式并行计算 QSI：验证模式对照真值标签生成
//! 混淆矩阵，预测模式只输出分数映射。
//!
//! ## 依赖关系
//! - 被 `commands/bulk.rs` 调用
//! - 使用 `pipeline.rs`, `utils/progress.rs`
//! - 使用 `rayon` 进行并行计算

pub mod report;
pub mod runner;

pub use report::ConfusionBuckets;
pub use runner::{parse_input, BulkMode, BulkReport, BulkRunner};
