//! # 批量执行器
//!
//! 逐块并行处理化学式列表：块内以 rayon 按化学式粒度并行
//! （每个 resolve-and-score 调用相互独立），块间顺序执行并
//! 在每块结束后把累计结果刷盘。
//!
//! ## 依赖关系
//! - 被 `commands/bulk.rs` 调用
//! - 使用 `pipeline.rs` 计算单条 QSI
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::batch::report::{ConfusionBuckets, PredictionReport};
use crate::error::{QsiError, Result};
use crate::pipeline::{self, CalcOptions, QsiOutcome};
use crate::utils::progress;

use rayon::prelude::*;
use serde_json::Value;
use std::path::Path;

/// 原始版本的块大小
pub const DEFAULT_CHUNK_SIZE: usize = 45;
/// 适宜性判定阈值
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// 批量运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMode {
    /// 输入带真值标签，输出混淆矩阵
    Validation,
    /// 输入纯化学式列表，输出分数映射
    Prediction,
}

/// 一条批量输入
#[derive(Debug, Clone)]
pub struct BulkEntry {
    pub formula: String,
    /// 验证模式下的真值标签
    pub label: Option<bool>,
}

/// 批量运行结果
#[derive(Debug, Clone)]
pub enum BulkReport {
    Validation(ConfusionBuckets),
    Prediction(PredictionReport),
}

/// 解析批量输入 JSON
///
/// 验证模式要求 `{"化学式": bool}` 对象，预测模式要求字符串数组。
/// 格式错误的条目不进入核心，直接预归入无法判定列表。
pub fn parse_input(value: &Value, mode: BulkMode) -> Result<(Vec<BulkEntry>, Vec<String>)> {
    let mut entries = Vec::new();
    let mut malformed = Vec::new();

    match mode {
        BulkMode::Validation => {
            let map = value.as_object().ok_or_else(|| {
                QsiError::InvalidArgument(
                    "validation input must be a JSON object of formula -> bool".to_string(),
                )
            })?;

            for (formula, label) in map {
                match label.as_bool() {
                    Some(label) => entries.push(BulkEntry {
                        formula: formula.clone(),
                        label: Some(label),
                    }),
                    None => malformed.push(formula.clone()),
                }
            }
        }
        BulkMode::Prediction => {
            let list = value.as_array().ok_or_else(|| {
                QsiError::InvalidArgument(
                    "prediction input must be a JSON array of formula strings".to_string(),
                )
            })?;

            for item in list {
                match item.as_str() {
                    Some(formula) => entries.push(BulkEntry {
                        formula: formula.to_string(),
                        label: None,
                    }),
                    None => malformed.push(item.to_string()),
                }
            }
        }
    }

    Ok((entries, malformed))
}

/// 批量执行器
pub struct BulkRunner {
    /// 并行作业数（0 = CPU 核数）
    pub jobs: usize,
    /// 每处理多少条刷盘一次
    pub chunk_size: usize,
    /// 适宜性阈值
    pub threshold: f64,
}

impl BulkRunner {
    pub fn new(jobs: usize, chunk_size: usize, threshold: f64) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        let chunk_size = chunk_size.max(1);
        BulkRunner {
            jobs,
            chunk_size,
            threshold,
        }
    }

    /// 执行批量测试，结果按块写入输出目录
    pub fn run(
        &self,
        mode: BulkMode,
        entries: Vec<BulkEntry>,
        malformed: Vec<String>,
        opts: &CalcOptions,
        output_dir: &Path,
    ) -> Result<BulkReport> {
        let mut report = match mode {
            BulkMode::Validation => BulkReport::Validation(ConfusionBuckets::default()),
            BulkMode::Prediction => BulkReport::Prediction(PredictionReport::default()),
        };

        for formula in &malformed {
            mark_inconclusive(&mut report, formula);
        }

        let pb = progress::create_progress_bar(entries.len() as u64, "Scoring");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| QsiError::Other(e.to_string()))?;

        for chunk in entries.chunks(self.chunk_size) {
            let outcomes: Vec<(&BulkEntry, Result<QsiOutcome>)> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|entry| {
                        let outcome = pipeline::calculate_index(&entry.formula, opts);
                        pb.inc(1);
                        (entry, outcome)
                    })
                    .collect()
            });

            // 合并与写盘串行进行，核心不管理共享输出缓冲
            for (entry, outcome) in outcomes {
                self.merge(&mut report, entry, outcome);
            }

            self.flush(&report, output_dir)?;
        }

        pb.finish_and_clear();
        Ok(report)
    }

    fn merge(&self, report: &mut BulkReport, entry: &BulkEntry, outcome: Result<QsiOutcome>) {
        let qsi = match outcome {
            Ok(outcome) => outcome.index(),
            Err(_) => None,
        };

        match (report, qsi) {
            (BulkReport::Validation(buckets), Some(qsi)) => {
                // parse_input 保证验证条目都有标签
                if let Some(label) = entry.label {
                    buckets.classify(&entry.formula, qsi, label, self.threshold);
                } else {
                    buckets.mark_inconclusive(&entry.formula);
                }
            }
            (BulkReport::Prediction(predictions), Some(qsi)) => {
                predictions.record(&entry.formula, qsi);
            }
            (report, None) => mark_inconclusive(report, &entry.formula),
        }
    }

    fn flush(&self, report: &BulkReport, output_dir: &Path) -> Result<()> {
        match report {
            BulkReport::Validation(buckets) => buckets.write(output_dir),
            BulkReport::Prediction(predictions) => predictions.write(output_dir),
        }
    }
}

fn mark_inconclusive(report: &mut BulkReport, formula: &str) {
    match report {
        BulkReport::Validation(buckets) => buckets.mark_inconclusive(formula),
        BulkReport::Prediction(predictions) => predictions.mark_inconclusive(formula),
    }
}
