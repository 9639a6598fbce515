//! # 指数聚合器
//!
//! 从规范化记录计算五个子分数，并以加权几何平均合成 QSI。
//! 几何平均是有意的"短板"设计：任一强权重轴上的低分
//! 都会把总指数拉向零，无法被其他轴的高分挽救。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs` 和 `commands/` 调用
//! - 使用 `score/subscores.rs`, `score/spin.rs`

use crate::error::{QsiError, Result};
use crate::models::record::MaterialRecord;
use crate::score::{spin, subscores};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 物性方案：第四个评分轴的选择
///
/// 两套历史方案都保留为显式配置，而不是写死的代码分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertySchema {
    /// 厚度 + 对称性方案（默认，不依赖同位素数据）
    ThicknessSymmetry,
    /// 磁噪声（平均核自旋）方案
    SpinNoise,
}

impl PropertySchema {
    /// 第四轴的显示名称
    pub fn axis_name(&self) -> &'static str {
        match self {
            PropertySchema::ThicknessSymmetry => "Thickness",
            PropertySchema::SpinNoise => "Magnetic Noise",
        }
    }
}

impl std::fmt::Display for PropertySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertySchema::ThicknessSymmetry => write!(f, "thickness-symmetry"),
            PropertySchema::SpinNoise => write!(f, "spin-noise"),
        }
    }
}

/// 子分数权重配置
///
/// 权重作为几何平均的指数，只要求非负；
/// 是否归一化到 1 由表示层负责，聚合器不做强制。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Weights {
    pub stability: f64,
    pub band_gap: f64,
    pub formation_energy: f64,
    pub thickness: f64,
    pub magnetic_noise: f64,
    pub symmetry: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights::defaults_for(PropertySchema::ThicknessSymmetry)
    }
}

impl Weights {
    /// 各方案的默认权重集
    pub fn defaults_for(schema: PropertySchema) -> Self {
        match schema {
            PropertySchema::ThicknessSymmetry => Weights {
                stability: 0.35,
                band_gap: 0.30,
                formation_energy: 0.15,
                thickness: 0.10,
                magnetic_noise: 0.0,
                symmetry: 0.10,
            },
            PropertySchema::SpinNoise => Weights {
                stability: 0.25,
                band_gap: 0.10,
                formation_energy: 0.05,
                thickness: 0.0,
                magnetic_noise: 0.45,
                symmetry: 0.15,
            },
        }
    }

    /// 从 JSON 权重文件加载并校验
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| QsiError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let weights: Weights =
            serde_json::from_str(&content).map_err(|e| QsiError::JsonError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        weights.validate()?;
        Ok(weights)
    }

    /// 校验所有权重非负
    pub fn validate(&self) -> Result<()> {
        let entries = [
            ("stability", self.stability),
            ("bandGap", self.band_gap),
            ("formationEnergy", self.formation_energy),
            ("thickness", self.thickness),
            ("magneticNoise", self.magnetic_noise),
            ("symmetry", self.symmetry),
        ];

        for (name, value) in entries {
            if value < 0.0 || !value.is_finite() {
                return Err(QsiError::InvalidWeights(format!(
                    "weight '{}' must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// 当前方案第四轴的权重
    fn axis_weight(&self, schema: PropertySchema) -> f64 {
        match schema {
            PropertySchema::ThicknessSymmetry => self.thickness,
            PropertySchema::SpinNoise => self.magnetic_noise,
        }
    }
}

/// 聚合结果：标量指数 + 有序子分数向量
///
/// 子分数顺序固定为
/// [stability, bandGap, formationEnergy, 方案轴, symmetry]。
#[derive(Debug, Clone, Serialize)]
pub struct IndexBreakdown {
    pub index: f64,
    pub sub_scores: [f64; 5],
}

/// 计算五个子分数并合成加权几何平均指数
///
/// 记录必须是有效候选；对 "未找到" 哨兵调用属于调用层的
/// 编程错误，在此显式拒绝而不是返回无意义的数。
pub fn aggregate(
    record: &MaterialRecord,
    schema: PropertySchema,
    weights: &Weights,
) -> Result<IndexBreakdown> {
    let formula = record.formula.as_deref().ok_or_else(|| {
        QsiError::InvalidArgument("aggregate() called on a not-found record".to_string())
    })?;

    let st = subscores::stability(record.hull_distance, subscores::DEFAULT_STABILITY_DECAY);
    let bg = subscores::band_gap(
        record.band_gap,
        subscores::DEFAULT_IDEAL_GAP_VISIBLE,
        subscores::DEFAULT_IDEAL_GAP_UV,
        subscores::DEFAULT_VISIBLE_TOLERANCE,
        subscores::DEFAULT_UV_TOLERANCE,
        subscores::DEFAULT_UV_CUTOFF,
    );
    let fe = subscores::formation_energy(
        record.formation_energy,
        subscores::DEFAULT_FORMATION_CUTOFF,
        subscores::DEFAULT_FORMATION_STEEPNESS,
    );
    let axis = match schema {
        PropertySchema::ThicknessSymmetry => subscores::thickness(
            record.thickness,
            subscores::DEFAULT_IDEAL_THICKNESS,
            subscores::DEFAULT_THICKNESS_SENSITIVITY,
        ),
        PropertySchema::SpinNoise => {
            let avg_spin = spin::average_nuclear_spin(formula)?;
            subscores::magnetic_noise(avg_spin, subscores::DEFAULT_SPIN_PENALTY)
        }
    };
    let sy = subscores::symmetry(record.symmetry, subscores::DEFAULT_SYMMETRY_CURVATURE);

    let sub_scores = [st, bg, fe, axis, sy];
    let exponents = [
        weights.stability,
        weights.band_gap,
        weights.formation_energy,
        weights.axis_weight(schema),
        weights.symmetry,
    ];

    let index = sub_scores
        .iter()
        .zip(exponents.iter())
        .map(|(score, weight)| score.powf(*weight))
        .product();

    Ok(IndexBreakdown { index, sub_scores })
}
