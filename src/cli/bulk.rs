//! # bulk 子命令 CLI 定义
//!
//! 批量测试参数：验证模式读 `{"化学式": bool}` 对象，
//! 预测模式 (`--predict`) 读化学式数组。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/bulk.rs`

use clap::Args;
use std::path::PathBuf;

use crate::batch::runner::{DEFAULT_CHUNK_SIZE, DEFAULT_THRESHOLD};
use crate::cli::SchemaArg;

/// bulk 子命令参数
#[derive(Args, Debug)]
pub struct BulkArgs {
    /// Path to the input JSON file
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for the JSON result buckets
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Suitability threshold on the index
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Flush results to disk every N formulas
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Number of parallel jobs (0 = number of CPUs)
    #[arg(long, short, default_value_t = 0)]
    pub jobs: usize,

    /// Prediction mode: input is a plain array of formulas
    #[arg(long, default_value_t = false)]
    pub predict: bool,

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
