//! # bulk 子命令实现
//!
//! 读取批量输入，驱动并行执行器，打印混淆矩阵汇总。
//!
//! ## 依赖关系
//! - 使用 `cli/bulk.rs` 定义的参数
//! - 使用 `batch/`, `utils/output.rs`

use crate::batch::{parse_input, BulkMode, BulkReport, BulkRunner, ConfusionBuckets};
use crate::cli::bulk::BulkArgs;
use crate::error::{QsiError, Result};
use crate::utils::output;

use std::fs;
use tabled::{Table, Tabled};

/// 混淆矩阵汇总行
#[derive(Debug, Clone, Tabled)]
struct MatrixRow {
    #[tabled(rename = "Bucket")]
    bucket: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// 预测排名行
#[derive(Debug, Clone, Tabled)]
struct PredictionRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "QSI")]
    qsi: String,
}

/// 执行批量测试
pub fn execute(args: BulkArgs) -> Result<()> {
    output::print_header("Bulk QSI Test");

    if !(0.0..=1.0).contains(&args.threshold) {
        return Err(QsiError::InvalidArgument(format!(
            "threshold must be within [0, 1], got {}",
            args.threshold
        )));
    }

    let mode = if args.predict {
        BulkMode::Prediction
    } else {
        BulkMode::Validation
    };

    let content = fs::read_to_string(&args.input).map_err(|e| QsiError::FileReadError {
        path: args.input.display().to_string(),
        source: e,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| QsiError::JsonError {
            path: args.input.display().to_string(),
            reason: e.to_string(),
        })?;

    let (entries, malformed) = parse_input(&value, mode)?;

    fs::create_dir_all(&args.output_dir).map_err(|e| QsiError::FileWriteError {
        path: args.output_dir.display().to_string(),
        source: e,
    })?;

    output::print_info(&format!("Input:      {}", args.input.display()));
    output::print_info(&format!("Formulas:   {}", entries.len()));
    if !malformed.is_empty() {
        output::print_warning(&format!(
            "{} malformed entries routed to the inconclusive bucket",
            malformed.len()
        ));
    }

    let opts = super::resolve_options(args.schema, args.weights.as_deref(), false, args.verbose)?;
    let runner = BulkRunner::new(args.jobs, args.chunk_size, args.threshold);

    let report = runner.run(mode, entries, malformed, &opts, &args.output_dir)?;

    println!();
    match &report {
        BulkReport::Validation(buckets) => print_confusion_matrix(buckets, args.threshold),
        BulkReport::Prediction(predictions) => {
            output::print_info(&format!("Scored:       {}", predictions.predictions.len()));
            output::print_info(&format!("Inconclusive: {}", predictions.inconclusive.len()));

            let mut ranked: Vec<(&String, &f64)> = predictions.predictions.iter().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(a.1));

            let rows: Vec<PredictionRow> = ranked
                .iter()
                .take(10)
                .enumerate()
                .map(|(i, (formula, qsi))| PredictionRow {
                    rank: i + 1,
                    formula: (*formula).clone(),
                    qsi: format!("{:.4}", qsi),
                })
                .collect();

            if !rows.is_empty() {
                println!("\n{}", Table::new(&rows));
            }
        }
    }

    println!();
    output::print_success(&format!(
        "Results saved in '{}'",
        args.output_dir.display()
    ));

    Ok(())
}

fn print_confusion_matrix(buckets: &ConfusionBuckets, threshold: f64) {
    let (tp, tn, fp, fn_, inconclusive) = buckets.counts();

    let rows = vec![
        MatrixRow {
            bucket: "True Positives".to_string(),
            count: tp,
        },
        MatrixRow {
            bucket: "True Negatives".to_string(),
            count: tn,
        },
        MatrixRow {
            bucket: "False Positives".to_string(),
            count: fp,
        },
        MatrixRow {
            bucket: "False Negatives".to_string(),
            count: fn_,
        },
        MatrixRow {
            bucket: "Inconclusive".to_string(),
            count: inconclusive,
        },
    ];

    output::print_info(&format!("Threshold: {:.2}", threshold));
    println!("\n{}", Table::new(&rows));

    let as_pct = |v: Option<f64>| match v {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "n/a".to_string(),
    };

    println!();
    output::print_info(&format!(
        "Accuracy: {}  Precision: {}  Recall: {}",
        as_pct(buckets.accuracy()),
        as_pct(buckets.precision()),
        as_pct(buckets.recall())
    ));
}
