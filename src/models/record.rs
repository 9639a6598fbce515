//! # 候选材料记录模型
//!
//! 定义两个数据库的原始记录（静态字段集，不透传未定型的 JSON）
//! 以及贯穿整个流水线的规范化 `MaterialRecord`。
//!
//! ## 依赖关系
//! - 被 `data/` 和 `score/` 使用
//! - 使用 `models/structure.rs` 的 Crystal

use crate::models::structure::Crystal;

use serde::Serialize;

/// 规范化候选材料记录（每次解析恰好产出一个）
///
/// 不变量：`formula == None` 当且仅当没有可用候选，
/// 此时其余字段无意义，下游必须先检查 `is_found()`。
#[derive(Debug, Clone, Serialize)]
pub struct MaterialRecord {
    pub formula: Option<String>,
    pub band_gap: f64,
    pub hull_distance: f64,
    pub formation_energy: f64,
    /// 厚度（晶格 c 方向，nm 量纲）
    pub thickness: f64,
    /// 空间群号 (1-230)
    pub symmetry: u16,
}

impl MaterialRecord {
    /// "未找到" 哨兵记录
    pub fn not_found() -> Self {
        MaterialRecord {
            formula: None,
            band_gap: 0.0,
            hull_distance: 0.0,
            formation_energy: 0.0,
            thickness: 0.0,
            symmetry: 0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.formula.is_some()
    }
}

impl std::fmt::Display for MaterialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.formula {
            Some(formula) => write!(
                f,
                "{} (gap {:.3} eV, hull {:.4} eV/atom, Ef {:.3} eV/atom, t {:.3} nm, SG {})",
                formula,
                self.band_gap,
                self.hull_distance,
                self.formation_energy,
                self.thickness,
                self.symmetry
            ),
            None => write!(f, "<no candidate>"),
        }
    }
}

/// 候选记录的通用视图，供解析器排序与分组使用
pub trait Candidate {
    /// 来源数据库中的记录标识（MP material_id / OQMD entry_id）
    fn source_id(&self) -> String;

    /// 用于结构等价性比较的晶体
    fn crystal(&self) -> &Crystal;

    /// 凸包上方能量 (eV/atom)，越低越稳定
    fn hull_distance(&self) -> f64;

    /// 带隙 (eV)
    fn band_gap(&self) -> f64;

    /// 转换为规范化记录
    fn into_material(self) -> MaterialRecord;
}

// ─────────────────────────────────────────────────────────────
// Materials Project（主数据库）原始记录
// ─────────────────────────────────────────────────────────────

/// MP summary 接口返回的单条结构记录
#[derive(Debug, Clone)]
pub struct MpRecord {
    pub material_id: String,
    pub deprecated: bool,
    pub formula: String,
    pub band_gap: f64,
    pub energy_above_hull: f64,
    pub formation_energy_per_atom: f64,
    /// 空间群号 (1-230)
    pub space_group: u16,
    pub crystal: Crystal,
}

impl Candidate for MpRecord {
    fn source_id(&self) -> String {
        self.material_id.clone()
    }

    fn crystal(&self) -> &Crystal {
        &self.crystal
    }

    fn hull_distance(&self) -> f64 {
        self.energy_above_hull
    }

    fn band_gap(&self) -> f64 {
        self.band_gap
    }

    fn into_material(self) -> MaterialRecord {
        // 厚度取晶格 c 长度（Å），换算为 nm
        let thickness = self.crystal.lattice.lengths()[2] / 10.0;

        MaterialRecord {
            formula: Some(self.formula),
            band_gap: self.band_gap,
            hull_distance: self.energy_above_hull,
            formation_energy: self.formation_energy_per_atom,
            thickness,
            symmetry: self.space_group,
        }
    }
}

// ─────────────────────────────────────────────────────────────
// OQMD（备用数据库）原始记录
// ─────────────────────────────────────────────────────────────

/// OQMD phases 接口返回的单条结构记录
#[derive(Debug, Clone)]
pub struct OqmdRecord {
    pub entry_id: u64,
    pub name: String,
    pub band_gap: f64,
    /// OQMD 称 stability，即 hull distance
    pub stability: f64,
    /// 每原子生成能 (eV/atom)
    pub delta_e: f64,
    /// 空间群号 (1-230)
    pub spacegroup: u16,
    pub crystal: Crystal,
}

impl Candidate for OqmdRecord {
    fn source_id(&self) -> String {
        format!("oqmd-{}", self.entry_id)
    }

    fn crystal(&self) -> &Crystal {
        &self.crystal
    }

    fn hull_distance(&self) -> f64 {
        self.stability
    }

    fn band_gap(&self) -> f64 {
        self.band_gap
    }

    fn into_material(self) -> MaterialRecord {
        let thickness = self.crystal.lattice.lengths()[2] / 10.0;

        MaterialRecord {
            formula: Some(self.name),
            band_gap: self.band_gap,
            hull_distance: self.stability,
            formation_energy: self.delta_e,
            thickness,
            symmetry: self.spacegroup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Lattice, Site};

    fn cubic_crystal(c: f64) -> Crystal {
        Crystal::new(
            "test",
            Lattice::from_parameters(4.0, 4.0, c, 90.0, 90.0, 90.0),
            vec![Site::new("Si", [0.0, 0.0, 0.0])],
        )
    }

    #[test]
    fn test_not_found_sentinel() {
        let record = MaterialRecord::not_found();
        assert!(!record.is_found());
        assert_eq!(format!("{}", record), "<no candidate>");
    }

    #[test]
    fn test_oqmd_thickness_normalized() {
        let record = OqmdRecord {
            entry_id: 42,
            name: "Si".to_string(),
            band_gap: 1.1,
            stability: 0.0,
            delta_e: -0.5,
            spacegroup: 227,
            crystal: cubic_crystal(6.0),
        };

        let material = record.into_material();
        assert!((material.thickness - 0.6).abs() < 1e-9);
        assert_eq!(material.symmetry, 227);
        assert_eq!(material.formula.as_deref(), Some("Si"));
    }

    #[test]
    fn test_mp_record_conversion() {
        let record = MpRecord {
            material_id: "mp-149".to_string(),
            deprecated: false,
            formula: "Si".to_string(),
            band_gap: 0.85,
            energy_above_hull: 0.0,
            formation_energy_per_atom: 0.0,
            space_group: 227,
            crystal: cubic_crystal(5.43),
        };

        let material = record.into_material();
        assert!((material.thickness - 0.543).abs() < 1e-9);
        assert!((material.band_gap - 0.85).abs() < 1e-12);
    }
}
