//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `pipeline.rs`, `batch/`, `utils/`
//! - 子模块: calc, bulk

pub mod bulk;
pub mod calc;

use crate::cli::{Commands, SchemaArg};
use crate::error::Result;
use crate::pipeline::CalcOptions;
use crate::score::{PropertySchema, Weights};
use crate::utils::output::Diagnostics;

use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Calc(args) => calc::execute(args),
        Commands::Bulk(args) => bulk::execute(args),
    }
}

/// 从公共 CLI 参数组装一次计算的配置
///
/// 权重文件缺省时使用所选方案的默认权重集。
fn resolve_options(
    schema: SchemaArg,
    weights_path: Option<&Path>,
    force_secondary: bool,
    verbose: bool,
) -> Result<CalcOptions> {
    let schema: PropertySchema = schema.into();

    let weights = match weights_path {
        Some(path) => Weights::load(path)?,
        None => Weights::defaults_for(schema),
    };

    Ok(CalcOptions {
        force_secondary,
        schema,
        weights,
        diagnostics: Diagnostics::new(verbose),
    })
}
