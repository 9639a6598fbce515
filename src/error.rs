//! # 统一错误处理模块
//!
//! 定义 qsindex 的所有错误类型，使用 `thiserror` 派生。
//!
//! 网络与上游解析失败在检索器边界被降级为 `Retrieval::NoData`，
//! 不会出现在这里；此处只保留对命令本身致命的错误。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// qsindex 统一错误类型
#[derive(Error, Debug)]
pub enum QsiError {
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

    // ─────────────────────────────────────────────────────────────
    // 输入解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse JSON in {path}\nReason: {reason}")]
    JsonError { path: String, reason: String },

    #[error("Cannot parse chemical formula: {0}")]
    FormulaError(String),

    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid weight configuration: {0}")]
    InvalidWeights(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, QsiError>;
