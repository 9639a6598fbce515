//! # 结构去重与选优
//!
//! 把一个数据源返回的多条结构条目规约为恰好一个候选：
//! 1. `NoData` 短路为 "未找到" 哨兵
//! 2. MP 通道先丢弃 deprecated 条目
//! 3. 按结构等价性分簇（能力由 `StructureGrouper` 注入）
//! 4. 簇内双键升序排序选代表：主键 hull distance，
//!    次键 |band gap − 1.0 eV|；并列保持输入顺序
//! 5. 对各簇代表施加同一排序，取首元素
//!
//! ## 依赖关系
//! - 被 `data/resolver.rs` 调用
//! - 使用 `matching/`, `models/record.rs`, `score/subscores.rs`

use crate::data::Retrieval;
use crate::matching::StructureGrouper;
use crate::models::record::{Candidate, MaterialRecord, MpRecord, OqmdRecord};
use crate::models::structure::Crystal;
use crate::score::subscores::DEFAULT_IDEAL_GAP_VISIBLE;
use crate::utils::output::Diagnostics;

use std::cmp::Ordering;

/// 单数据源去重器
pub struct Deduplicator<'a> {
    grouper: &'a dyn StructureGrouper,
}

impl<'a> Deduplicator<'a> {
    pub fn new(grouper: &'a dyn StructureGrouper) -> Self {
        Deduplicator { grouper }
    }

    /// 规约 MP 检索结果（先过滤 deprecated）
    pub fn reduce_primary(
        &self,
        retrieval: Retrieval<MpRecord>,
        diag: &Diagnostics,
    ) -> MaterialRecord {
        match retrieval {
            Retrieval::NoData { reason } => {
                diag.debug(&reason);
                MaterialRecord::not_found()
            }
            Retrieval::Found(records) => {
                let total = records.len();
                let kept: Vec<MpRecord> =
                    records.into_iter().filter(|r| !r.deprecated).collect();
                if kept.len() < total {
                    diag.debug(&format!(
                        "Dropped {} deprecated MP entries",
                        total - kept.len()
                    ));
                }
                self.reduce(kept, diag)
            }
        }
    }

    /// 规约 OQMD 检索结果
    pub fn reduce_secondary(
        &self,
        retrieval: Retrieval<OqmdRecord>,
        diag: &Diagnostics,
    ) -> MaterialRecord {
        match retrieval {
            Retrieval::NoData { reason } => {
                diag.debug(&reason);
                MaterialRecord::not_found()
            }
            Retrieval::Found(records) => self.reduce(records, diag),
        }
    }

    /// 分簇、簇内选代表、代表间选优
    fn reduce<R: Candidate>(&self, mut records: Vec<R>, diag: &Diagnostics) -> MaterialRecord {
        if records.is_empty() {
            return MaterialRecord::not_found();
        }

        let crystals: Vec<&Crystal> = records.iter().map(Candidate::crystal).collect();
        let clusters = self.grouper.group(&crystals);

        diag.debug(&format!(
            "Grouped {} entries into {} unique structures",
            records.len(),
            clusters.len()
        ));

        let representatives: Vec<usize> = clusters
            .iter()
            .map(|cluster| best_of(&records, cluster))
            .collect();

        let winner = records.swap_remove(best_of(&records, &representatives));
        diag.debug(&format!("Selected candidate {}", winner.source_id()));
        winner.into_material()
    }
}

/// 双键排序键：`(hull distance, |gap − 理想带隙|)`
fn rank<R: Candidate>(record: &R) -> (f64, f64) {
    (
        record.hull_distance(),
        (record.band_gap() - DEFAULT_IDEAL_GAP_VISIBLE).abs(),
    )
}

/// 按双键升序取最优下标；严格小于才替换，并列保持输入顺序
fn best_of<R: Candidate>(records: &[R], indices: &[usize]) -> usize {
    let mut best = indices[0];

    for &i in &indices[1..] {
        let (a_hull, a_gap) = rank(&records[i]);
        let (b_hull, b_gap) = rank(&records[best]);
        let order = a_hull
            .total_cmp(&b_hull)
            .then_with(|| a_gap.total_cmp(&b_gap));
        if order == Ordering::Less {
            best = i;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Lattice, Site};

    /// 桩分组器：所有结构并为一簇
    struct SingleCluster;
    impl StructureGrouper for SingleCluster {
        fn group(&self, crystals: &[&Crystal]) -> Vec<Vec<usize>> {
            vec![(0..crystals.len()).collect()]
        }
    }

    /// 桩分组器：每个结构自成一簇
    struct Singletons;
    impl StructureGrouper for Singletons {
        fn group(&self, crystals: &[&Crystal]) -> Vec<Vec<usize>> {
            (0..crystals.len()).map(|i| vec![i]).collect()
        }
    }

    fn mp_record(id: &str, hull: f64, gap: f64, deprecated: bool) -> MpRecord {
        MpRecord {
            material_id: id.to_string(),
            deprecated,
            formula: "Si".to_string(),
            band_gap: gap,
            energy_above_hull: hull,
            formation_energy_per_atom: -0.5,
            space_group: 227,
            crystal: Crystal::new(
                id,
                Lattice::from_parameters(5.43, 5.43, 5.43, 90.0, 90.0, 90.0),
                vec![Site::new("Si", [0.0, 0.0, 0.0])],
            ),
        }
    }

    fn reduce_mp(records: Vec<MpRecord>, grouper: &dyn StructureGrouper) -> MaterialRecord {
        Deduplicator::new(grouper).reduce_primary(Retrieval::Found(records), &Diagnostics::default())
    }

    #[test]
    fn test_no_data_short_circuits_to_sentinel() {
        let grouper = SingleCluster;
        let dedup = Deduplicator::new(&grouper);
        let result = dedup.reduce_primary(Retrieval::no_data("nothing"), &Diagnostics::default());
        assert!(!result.is_found());
    }

    #[test]
    fn test_lower_hull_wins_within_cluster() {
        let records = vec![
            mp_record("mp-2", 0.02, 1.0, false),
            mp_record("mp-1", 0.01, 1.0, false),
        ];
        let result = reduce_mp(records, &SingleCluster);
        assert!((result.hull_distance - 0.01).abs() < 1e-12);

        // 输入顺序颠倒结果不变
        let records = vec![
            mp_record("mp-1", 0.01, 1.0, false),
            mp_record("mp-2", 0.02, 1.0, false),
        ];
        let result = reduce_mp(records, &SingleCluster);
        assert!((result.hull_distance - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_gap_breaks_hull_tie() {
        let records = vec![
            mp_record("far", 0.0, 2.4, false),
            mp_record("near", 0.0, 1.1, false),
        ];
        let result = reduce_mp(records, &SingleCluster);
        assert!((result.band_gap - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        // |1.2 − 1| == |0.8 − 1|，两键完全并列
        let mut first = mp_record("first", 0.0, 1.2, false);
        first.formation_energy_per_atom = -0.7;
        let second = mp_record("second", 0.0, 0.8, false);

        let result = reduce_mp(vec![first, second], &SingleCluster);
        // 并列保留先出现的条目
        assert!((result.formation_energy + 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_deprecated_entries_dropped_before_grouping() {
        let records = vec![
            mp_record("dead", 0.0, 1.0, true),
            mp_record("live", 0.1, 1.0, false),
        ];
        let result = reduce_mp(records, &SingleCluster);
        assert!((result.hull_distance - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_all_deprecated_is_not_found() {
        let records = vec![mp_record("dead", 0.0, 1.0, true)];
        let result = reduce_mp(records, &SingleCluster);
        assert!(!result.is_found());
    }

    #[test]
    fn test_representatives_compete_across_clusters() {
        // 每簇一个成员：跨簇比较仍用同一双键排序
        let records = vec![
            mp_record("a", 0.05, 1.0, false),
            mp_record("b", 0.00, 1.0, false),
            mp_record("c", 0.02, 1.0, false),
        ];
        let result = reduce_mp(records, &Singletons);
        assert!((result.hull_distance - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_entry_does_not_change_winner() {
        let records = vec![
            mp_record("w", 0.01, 1.0, false),
            mp_record("x", 0.02, 1.0, false),
        ];
        let baseline = reduce_mp(records, &SingleCluster);

        let records = vec![
            mp_record("x", 0.02, 1.0, false),
            mp_record("w", 0.01, 1.0, false),
            mp_record("x", 0.02, 1.0, false),
        ];
        let with_dupe = reduce_mp(records, &SingleCluster);

        assert!((baseline.hull_distance - with_dupe.hull_distance).abs() < 1e-12);
        assert!((baseline.band_gap - with_dupe.band_gap).abs() < 1e-12);
    }

    #[test]
    fn test_single_record_trivially_selected() {
        let records = vec![mp_record("only", 0.3, 2.0, false)];
        let result = reduce_mp(records, &SingleCluster);
        assert!(result.is_found());
        assert!((result.hull_distance - 0.3).abs() < 1e-12);
    }
}
