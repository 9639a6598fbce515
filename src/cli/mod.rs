//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `calc`: 单个化学式的 QSI 计算
//! - `bulk`: 批量测试（验证 / 预测模式）
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: calc, bulk

pub mod bulk;
pub mod calc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::score::PropertySchema;

/// qsindex - 量子适宜性指数计算器
#[derive(Parser)]
#[command(name = "qsindex")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Quantum Suitability Index calculator for candidate qubit-host materials", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Calculate the QSI for a single chemical formula
    Calc(calc::CalcArgs),

    /// Score a batch of formulas and build a confusion matrix
    Bulk(bulk::BulkArgs),
}

/// 物性方案的 CLI 表示
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SchemaArg {
    /// Thickness + symmetry axes (default)
    ThicknessSymmetry,
    /// Nuclear-spin magnetic-noise axis
    SpinNoise,
}

impl From<SchemaArg> for PropertySchema {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::ThicknessSymmetry => PropertySchema::ThicknessSymmetry,
            SchemaArg::SpinNoise => PropertySchema::SpinNoise,
        }
    }
}

impl std::fmt::Display for SchemaArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaArg::ThicknessSymmetry => write!(f, "thickness-symmetry"),
            SchemaArg::SpinNoise => write!(f, "spin-noise"),
        }
    }
}
