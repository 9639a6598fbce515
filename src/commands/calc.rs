//! # calc 子命令实现
//!
//! 解析单个化学式的候选结构并打印子分数明细表。
//!
//! ## 依赖关系
//! - 使用 `cli/calc.rs` 定义的参数
//! - 使用 `pipeline.rs`, `utils/output.rs`, `utils/progress.rs`

use crate::cli::calc::CalcArgs;
use crate::error::Result;
use crate::pipeline::{self, QsiOutcome};
use crate::score::PropertySchema;
use crate::utils::{output, progress};

use tabled::{Table, Tabled};

/// 子分数明细行
#[derive(Debug, Clone, Tabled)]
struct SubscoreRow {
    #[tabled(rename = "Axis")]
    axis: String,
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Subscore")]
    subscore: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

/// 执行单化学式计算
pub fn execute(args: CalcArgs) -> Result<()> {
    output::print_header("Quantum Suitability Index");

    let opts = super::resolve_options(
        args.schema,
        args.weights.as_deref(),
        args.force_oqmd,
        args.verbose,
    )?;

    output::print_info(&format!("Formula: {}", args.formula));
    output::print_info(&format!("Schema:  {}", opts.schema));

    // verbose 模式下 DEBUG 行和 spinner 会互相打架
    let spinner = (!args.verbose).then(|| progress::create_spinner("Resolving candidate..."));

    let outcome = pipeline::calculate_index(&args.formula, &opts);

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome? {
        QsiOutcome::NotFound { reason } => {
            output::print_warning(&reason);
            output::print_info("Index unavailable for this formula.");
        }
        QsiOutcome::Scored { record, breakdown } => {
            output::print_info(&format!("Candidate: {}", record));
            println!();

            let [st, bg, fe, axis, sy] = breakdown.sub_scores;
            let weights = &opts.weights;

            let (axis_name, axis_property, axis_weight) = match opts.schema {
                PropertySchema::ThicknessSymmetry => (
                    "Thickness",
                    format!("{:.3} nm", record.thickness),
                    weights.thickness,
                ),
                PropertySchema::SpinNoise => (
                    "Magnetic Noise",
                    record.formula.clone().unwrap_or_default(),
                    weights.magnetic_noise,
                ),
            };

            let rows = vec![
                SubscoreRow {
                    axis: "Stability".to_string(),
                    property: format!("{:.4} eV/atom", record.hull_distance),
                    subscore: format!("{:.4}", st),
                    weight: format!("{:.2}", weights.stability),
                },
                SubscoreRow {
                    axis: "Band Gap".to_string(),
                    property: format!("{:.3} eV", record.band_gap),
                    subscore: format!("{:.4}", bg),
                    weight: format!("{:.2}", weights.band_gap),
                },
                SubscoreRow {
                    axis: "Formation Energy".to_string(),
                    property: format!("{:.3} eV/atom", record.formation_energy),
                    subscore: format!("{:.4}", fe),
                    weight: format!("{:.2}", weights.formation_energy),
                },
                SubscoreRow {
                    axis: axis_name.to_string(),
                    property: axis_property,
                    subscore: format!("{:.4}", axis),
                    weight: format!("{:.2}", axis_weight),
                },
                SubscoreRow {
                    axis: "Symmetry".to_string(),
                    property: format!("SG {}", record.symmetry),
                    subscore: format!("{:.4}", sy),
                    weight: format!("{:.2}", weights.symmetry),
                },
            ];

            let table = Table::new(&rows);
            println!("{}", table);
            println!();

            output::print_success(&format!("QSI = {:.4}", breakdown.index));
        }
    }

    Ok(())
}
