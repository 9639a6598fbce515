//! # qsindex - 量子适宜性指数计算器
//!
//! 按化学式从 MP / OQMD 检索候选晶体结构，去重选优后
//! 用加权几何平均合成量子适宜性指数 (QSI)。
//!
//! ## 子命令
//! - `calc` - 单个化学式的 QSI 计算
//! - `bulk` - 批量测试（混淆矩阵 / 预测模式）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── pipeline.rs (检索 → 去重 → 评分流水线)
//!   │     ├── data/       (MP / OQMD 检索与去重)
//!   │     ├── matching/   (结构等价性匹配)
//!   │     ├── score/      (子分数与聚合)
//!   │     └── batch/      (批量并行执行)
//!   ├── models/     (晶体与候选记录模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod data;
mod error;
mod matching;
mod models;
mod pipeline;
mod score;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
