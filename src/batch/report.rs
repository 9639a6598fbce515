//! # 批量测试报告
//!
//! 混淆矩阵分桶与 JSON 持久化。桶在运行中途按块刷盘，
//! 中断的长任务也能留下已完成部分的结果。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 与 `commands/bulk.rs` 使用
//! - 使用 `serde_json` 写报告文件

use crate::error::{QsiError, Result};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 2×2 混淆矩阵分桶 + 无法判定列表（验证模式）
#[derive(Debug, Default, Clone)]
pub struct ConfusionBuckets {
    pub true_positives: BTreeMap<String, f64>,
    pub true_negatives: BTreeMap<String, f64>,
    pub false_positives: BTreeMap<String, f64>,
    pub false_negatives: BTreeMap<String, f64>,
    pub inconclusive: Vec<String>,
}

impl ConfusionBuckets {
    /// 按阈值分桶一条已评分的化学式
    pub fn classify(&mut self, formula: &str, qsi: f64, truly_suitable: bool, threshold: f64) {
        let predicted_suitable = qsi >= threshold;

        let bucket = match (truly_suitable, predicted_suitable) {
            (true, true) => &mut self.true_positives,
            (false, false) => &mut self.true_negatives,
            (false, true) => &mut self.false_positives,
            (true, false) => &mut self.false_negatives,
        };
        bucket.insert(formula.to_string(), qsi);
    }

    /// 记录一条无法判定的化学式（去重）
    pub fn mark_inconclusive(&mut self, formula: &str) {
        if !self.inconclusive.iter().any(|f| f == formula) {
            self.inconclusive.push(formula.to_string());
        }
    }

    /// (TP, TN, FP, FN, inconclusive) 计数
    pub fn counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.true_positives.len(),
            self.true_negatives.len(),
            self.false_positives.len(),
            self.false_negatives.len(),
            self.inconclusive.len(),
        )
    }

    /// 正确率（已分类条目为 0 时为 None）
    pub fn accuracy(&self) -> Option<f64> {
        let (tp, tn, fp, fn_) = (
            self.true_positives.len(),
            self.true_negatives.len(),
            self.false_positives.len(),
            self.false_negatives.len(),
        );
        let total = tp + tn + fp + fn_;
        (total > 0).then(|| (tp + tn) as f64 / total as f64)
    }

    /// 查准率
    pub fn precision(&self) -> Option<f64> {
        let tp = self.true_positives.len();
        let fp = self.false_positives.len();
        (tp + fp > 0).then(|| tp as f64 / (tp + fp) as f64)
    }

    /// 查全率
    pub fn recall(&self) -> Option<f64> {
        let tp = self.true_positives.len();
        let fn_ = self.false_negatives.len();
        (tp + fn_ > 0).then(|| tp as f64 / (tp + fn_) as f64)
    }

    /// 把五个桶写入输出目录
    pub fn write(&self, output_dir: &Path) -> Result<()> {
        write_json(output_dir, "true_positives.json", &self.true_positives)?;
        write_json(output_dir, "true_negatives.json", &self.true_negatives)?;
        write_json(output_dir, "false_positives.json", &self.false_positives)?;
        write_json(output_dir, "false_negatives.json", &self.false_negatives)?;
        write_json(output_dir, "inconclusive.json", &self.inconclusive)?;
        Ok(())
    }
}

/// 预测模式报告：化学式 → 分数映射
#[derive(Debug, Default, Clone)]
pub struct PredictionReport {
    pub predictions: BTreeMap<String, f64>,
    pub inconclusive: Vec<String>,
}

impl PredictionReport {
    pub fn record(&mut self, formula: &str, qsi: f64) {
        self.predictions.insert(formula.to_string(), qsi);
    }

    pub fn mark_inconclusive(&mut self, formula: &str) {
        if !self.inconclusive.iter().any(|f| f == formula) {
            self.inconclusive.push(formula.to_string());
        }
    }

    pub fn write(&self, output_dir: &Path) -> Result<()> {
        write_json(output_dir, "predictions.json", &self.predictions)?;
        write_json(output_dir, "inconclusive.json", &self.inconclusive)?;
        Ok(())
    }
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let path = dir.join(name);
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| QsiError::Other(format!("Failed to serialize {}: {}", name, e)))?;

    fs::write(&path, content).map_err(|e| QsiError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_buckets() {
        let mut buckets = ConfusionBuckets::default();
        buckets.classify("A", 0.9, true, 0.7); // TP
        buckets.classify("B", 0.2, false, 0.7); // TN
        buckets.classify("C", 0.8, false, 0.7); // FP
        buckets.classify("D", 0.3, true, 0.7); // FN
        buckets.mark_inconclusive("E");

        assert_eq!(buckets.counts(), (1, 1, 1, 1, 1));
    }

    #[test]
    fn test_threshold_boundary_is_suitable() {
        let mut buckets = ConfusionBuckets::default();
        // qsi == threshold 判为适宜
        buckets.classify("A", 0.7, true, 0.7);
        assert_eq!(buckets.true_positives.len(), 1);
    }

    #[test]
    fn test_inconclusive_deduplicated() {
        let mut buckets = ConfusionBuckets::default();
        buckets.mark_inconclusive("A");
        buckets.mark_inconclusive("A");
        assert_eq!(buckets.inconclusive.len(), 1);
    }

    #[test]
    fn test_metrics() {
        let mut buckets = ConfusionBuckets::default();
        buckets.classify("A", 0.9, true, 0.7);
        buckets.classify("B", 0.8, true, 0.7);
        buckets.classify("C", 0.2, false, 0.7);
        buckets.classify("D", 0.9, false, 0.7);

        assert!((buckets.accuracy().unwrap() - 0.75).abs() < 1e-12);
        assert!((buckets.precision().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((buckets.recall().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_empty_are_none() {
        let buckets = ConfusionBuckets::default();
        assert!(buckets.accuracy().is_none());
        assert!(buckets.precision().is_none());
        assert!(buckets.recall().is_none());
    }
}
