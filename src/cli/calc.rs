//! # calc 子命令 CLI 定义
//!
//! 单个化学式的 QSI 计算参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/calc.rs`

use clap::Args;
use std::path::PathBuf;

use crate::cli::SchemaArg;

/// calc 子命令参数
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Chemical formula to score (e.g. 'SiC', 'Fe2O3')
    pub formula: String,

    /// Skip Materials Project and query OQMD directly
    #[arg(long, default_value_t = false)]
    pub force_oqmd: bool,

    /// Property schema for the fourth scoring axis
    #[arg(long, value_enum, default_value_t = SchemaArg::ThicknessSymmetry)]
    pub schema: SchemaArg,

    /// Path to a JSON weight file (defaults to the schema's weight set)
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// Print DEBUG diagnostics during resolution
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}
