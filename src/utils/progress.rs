//! # 进度条工具
//!
//! 封装 `indicatif`，批量评分与单次解析各用一种样式。
//!
//! ## 依赖关系
//! - 被 `batch/` 与 `commands/` 模块使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// 批量评分进度条（按化学式计数）
pub fn create_progress_bar(total_formulas: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_formulas);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:36.cyan/blue}] {pos}/{len} formulas ({percent}%, eta {eta})",
        )
        .unwrap()
        .progress_chars("=>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// 不确定时长任务的 spinner（单化学式解析）
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})").unwrap());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
