//! # QSI 计算流水线
//!
//! 核心入口：化学式 → 检索 → 去重 → 评分 → 聚合。
//! 每次调用独立且无共享可变状态，批量层可以安全并发调用。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 调用
//! - 使用 `data/`, `matching/`, `score/`

use crate::data::mp::MpRetriever;
use crate::data::oqmd::OqmdRetriever;
use crate::data::resolver::Resolver;
use crate::error::Result;
use crate::matching::ToleranceMatcher;
use crate::models::record::MaterialRecord;
use crate::score::aggregate::{aggregate, IndexBreakdown, PropertySchema, Weights};
use crate::utils::output::Diagnostics;

use serde::Serialize;

/// 一次 QSI 计算的配置
#[derive(Debug, Clone)]
pub struct CalcOptions {
    /// 跳过主数据库，强制走 OQMD
    pub force_secondary: bool,
    pub schema: PropertySchema,
    pub weights: Weights,
    pub diagnostics: Diagnostics,
}

impl Default for CalcOptions {
    fn default() -> Self {
        let schema = PropertySchema::ThicknessSymmetry;
        CalcOptions {
            force_secondary: false,
            schema,
            weights: Weights::defaults_for(schema),
            diagnostics: Diagnostics::default(),
        }
    }
}

/// 一次 QSI 计算的结果
///
/// "未找到" 是合法终态（error-as-value），
/// 只有致命输入错误才会让 `calculate_index` 返回 `Err`。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QsiOutcome {
    Scored {
        record: MaterialRecord,
        #[serde(flatten)]
        breakdown: IndexBreakdown,
    },
    NotFound {
        reason: String,
    },
}

impl QsiOutcome {
    /// 标量指数（未找到时为 None）
    pub fn index(&self) -> Option<f64> {
        match self {
            QsiOutcome::Scored { breakdown, .. } => Some(breakdown.index),
            QsiOutcome::NotFound { .. } => None,
        }
    }
}

/// 计算一个化学式的 QSI
pub fn calculate_index(formula: &str, opts: &CalcOptions) -> Result<QsiOutcome> {
    let diag = &opts.diagnostics;
    diag.debug(&format!("Calculating QSI for {}...", formula));

    let mp = MpRetriever::new()?;
    let oqmd = OqmdRetriever::new()?;
    let matcher = ToleranceMatcher::default();
    let resolver = Resolver::new(&mp, &oqmd, &matcher);

    let record = resolver.resolve(formula, opts.force_secondary, diag);

    if !record.is_found() {
        return Ok(QsiOutcome::NotFound {
            reason: "No valid material candidate found in MP or OQMD databases.".to_string(),
        });
    }

    diag.debug(&format!("Final candidate: {}", record));

    let breakdown = aggregate(&record, opts.schema, &opts.weights)?;
    diag.debug(&format!("Index calculated for {}: {:.4}", formula, breakdown.index));

    Ok(QsiOutcome::Scored { record, breakdown })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_index_accessor() {
        let not_found = QsiOutcome::NotFound {
            reason: "nothing".to_string(),
        };
        assert!(not_found.index().is_none());

        let scored = QsiOutcome::Scored {
            record: MaterialRecord {
                formula: Some("Si".to_string()),
                band_gap: 1.0,
                hull_distance: 0.0,
                formation_energy: -0.5,
                thickness: 0.6,
                symmetry: 227,
            },
            breakdown: IndexBreakdown {
                index: 0.91,
                sub_scores: [1.0, 1.0, 0.88, 1.0, 0.97],
            },
        };
        assert!((scored.index().unwrap() - 0.91).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&QsiOutcome::NotFound {
            reason: "nothing".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""status":"not_found""#));
    }
}
