//! # 结构等价性匹配模块
//!
//! 判定两个晶体结构是否代表同一多形体，并把等价结构分簇。
//! 解析器通过 `StructureGrouper` 接口注入匹配能力，
//! 因此排序/选优逻辑可以用桩实现独立测试。
//!
//! ## 算法概述
//! 1. 组成完全一致（逐元素计数）
//! 2. 每原子体积在相对容差内
//! 3. 排序后的晶格长度逐项在相对容差内（对晶格向量置换不变）
//! 4. 排序后的晶格夹角逐项在绝对角度容差内
//! 5. 最近邻距离指纹（最小镜像约定，按约化长度排序）逐项在容差内
//!    （对原点平移与格位顺序不变）
//!
//! ## 依赖关系
//! - 被 `data/dedup.rs` 调用
//! - 使用 `models/structure.rs` 的 Crystal

use crate::models::structure::Crystal;

/// 结构分组能力接口
///
/// 输入一组晶体，返回等价簇（以输入下标表示）。
/// 每个下标恰好出现在一个簇中，簇内顺序保持输入顺序。
pub trait StructureGrouper {
    fn group(&self, crystals: &[&Crystal]) -> Vec<Vec<usize>>;
}

/// 晶格夹角的绝对容差（度），对应 pymatgen 的 angle_tol
const ANGLE_TOL_DEG: f64 = 5.0;

/// 基于容差的结构匹配器
///
/// 容差语义与 pymatgen `StructureMatcher` 的 ltol/stol 对齐。
pub struct ToleranceMatcher {
    /// 晶格长度与体积的相对容差
    pub ltol: f64,
    /// 格位距离指纹的相对容差
    pub stol: f64,
}

impl Default for ToleranceMatcher {
    fn default() -> Self {
        ToleranceMatcher {
            ltol: 0.2,
            stol: 0.3,
        }
    }
}

impl ToleranceMatcher {
    pub fn new(ltol: f64, stol: f64) -> Self {
        ToleranceMatcher { ltol, stol }
    }

    /// 判定两个晶体是否结构等价
    pub fn equivalent(&self, a: &Crystal, b: &Crystal) -> bool {
        if a.sites.is_empty() || b.sites.is_empty() {
            return false;
        }

        if a.composition() != b.composition() {
            return false;
        }

        let va = a.volume_per_atom();
        let vb = b.volume_per_atom();
        if !within(va, vb, self.ltol) {
            return false;
        }

        let mut la = a.lattice.lengths();
        let mut lb = b.lattice.lengths();
        la.sort_by(f64::total_cmp);
        lb.sort_by(f64::total_cmp);
        for (x, y) in la.iter().zip(lb.iter()) {
            if !within(*x, *y, self.ltol) {
                return false;
            }
        }

        let (_, _, _, a1, a2, a3) = a.lattice.parameters();
        let (_, _, _, b1, b2, b3) = b.lattice.parameters();
        let mut aa = [a1, a2, a3];
        let mut ab = [b1, b2, b3];
        aa.sort_by(f64::total_cmp);
        ab.sort_by(f64::total_cmp);
        for (x, y) in aa.iter().zip(ab.iter()) {
            if (x - y).abs() > ANGLE_TOL_DEG {
                return false;
            }
        }

        let fa = neighbor_fingerprint(a);
        let fb = neighbor_fingerprint(b);
        if fa.len() != fb.len() {
            return false;
        }
        fa.iter().zip(fb.iter()).all(|(x, y)| within(*x, *y, self.stol))
    }
}

impl StructureGrouper for ToleranceMatcher {
    fn group(&self, crystals: &[&Crystal]) -> Vec<Vec<usize>> {
        // 单链接聚类：任意一对等价即并入同簇
        let n = crystals.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut Vec<usize>, i: usize) -> usize {
            let p = parent[i];
            if p == i {
                return i;
            }
            let root = find(parent, p);
            parent[i] = root;
            root
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if self.equivalent(crystals[i], crystals[j]) {
                    let ri = find(&mut parent, i);
                    let rj = find(&mut parent, j);
                    if ri != rj {
                        parent[rj.max(ri)] = rj.min(ri);
                    }
                }
            }
        }

        let mut clusters: Vec<Vec<usize>> = Vec::new();
        let mut root_to_cluster: Vec<Option<usize>> = vec![None; n];

        for i in 0..n {
            let root = find(&mut parent, i);
            match root_to_cluster[root] {
                Some(c) => clusters[c].push(i),
                None => {
                    root_to_cluster[root] = Some(clusters.len());
                    clusters.push(vec![i]);
                }
            }
        }

        clusters
    }
}

/// 相对容差比较
fn within(a: f64, b: f64, tol: f64) -> bool {
    let scale = a.abs().max(b.abs());
    if scale < 1e-12 {
        return true;
    }
    (a - b).abs() / scale <= tol
}

/// 每格位最近邻距离指纹
///
/// 距离以 (每原子体积)^(1/3) 约化，使指纹对整体缩放不敏感，
/// 排序后对格位顺序与原点选取不变。
fn neighbor_fingerprint(crystal: &Crystal) -> Vec<f64> {
    let scale = crystal.volume_per_atom().cbrt();
    let n = crystal.sites.len();
    let mut distances = Vec::with_capacity(n);

    for i in 0..n {
        let mut min_dist = f64::INFINITY;

        for j in 0..n {
            for ta in -1i32..=1 {
                for tb in -1i32..=1 {
                    for tc in -1i32..=1 {
                        if i == j && ta == 0 && tb == 0 && tc == 0 {
                            continue;
                        }

                        let fi = crystal.sites[i].frac;
                        let fj = crystal.sites[j].frac;
                        let delta = [
                            fj[0] + ta as f64 - fi[0],
                            fj[1] + tb as f64 - fi[1],
                            fj[2] + tc as f64 - fi[2],
                        ];
                        let cart = crystal.lattice.frac_to_cart(delta);
                        let dist =
                            (cart[0] * cart[0] + cart[1] * cart[1] + cart[2] * cart[2]).sqrt();

                        if dist < min_dist {
                            min_dist = dist;
                        }
                    }
                }
            }
        }

        distances.push(min_dist / scale);
    }

    distances.sort_by(f64::total_cmp);
    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Lattice, Site};

    fn rocksalt(label: &str, a: f64) -> Crystal {
        Crystal::new(
            label,
            Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0),
            vec![
                Site::new("Na", [0.0, 0.0, 0.0]),
                Site::new("Cl", [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_identical_structures_equivalent() {
        let matcher = ToleranceMatcher::default();
        assert!(matcher.equivalent(&rocksalt("a", 5.6), &rocksalt("b", 5.6)));
    }

    #[test]
    fn test_slightly_strained_equivalent() {
        let matcher = ToleranceMatcher::default();
        // 2% 应变在 ltol=0.2 之内
        assert!(matcher.equivalent(&rocksalt("a", 5.6), &rocksalt("b", 5.71)));
    }

    #[test]
    fn test_different_volume_not_equivalent() {
        let matcher = ToleranceMatcher::default();
        assert!(!matcher.equivalent(&rocksalt("a", 5.6), &rocksalt("b", 8.0)));
    }

    #[test]
    fn test_different_composition_not_equivalent() {
        let matcher = ToleranceMatcher::default();
        let kcl = Crystal::new(
            "kcl",
            Lattice::from_parameters(5.6, 5.6, 5.6, 90.0, 90.0, 90.0),
            vec![
                Site::new("K", [0.0, 0.0, 0.0]),
                Site::new("Cl", [0.5, 0.5, 0.5]),
            ],
        );
        assert!(!matcher.equivalent(&rocksalt("a", 5.6), &kcl));
    }

    #[test]
    fn test_site_order_and_origin_invariance() {
        let matcher = ToleranceMatcher::default();
        // 同一结构：格位顺序调换 + 整体原点平移 0.5
        let shifted = Crystal::new(
            "shifted",
            Lattice::from_parameters(5.6, 5.6, 5.6, 90.0, 90.0, 90.0),
            vec![
                Site::new("Cl", [0.0, 0.0, 0.0]),
                Site::new("Na", [0.5, 0.5, 0.5]),
            ],
        );
        assert!(matcher.equivalent(&rocksalt("a", 5.6), &shifted));
    }

    #[test]
    fn test_lattice_permutation_invariance() {
        let matcher = ToleranceMatcher::default();
        let tall = Crystal::new(
            "tall",
            Lattice::from_parameters(3.0, 3.0, 7.0, 90.0, 90.0, 90.0),
            vec![Site::new("C", [0.0, 0.0, 0.0])],
        );
        let wide = Crystal::new(
            "wide",
            Lattice::from_parameters(7.0, 3.0, 3.0, 90.0, 90.0, 90.0),
            vec![Site::new("C", [0.0, 0.0, 0.0])],
        );
        assert!(matcher.equivalent(&tall, &wide));
    }

    #[test]
    fn test_grouping_clusters_duplicates() {
        let matcher = ToleranceMatcher::default();
        let a = rocksalt("a", 5.6);
        let b = rocksalt("b", 5.62);
        let c = rocksalt("c", 8.5);

        let crystals = vec![&a, &b, &c];
        let clusters = matcher.group(&crystals);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], vec![0, 1]);
        assert_eq!(clusters[1], vec![2]);
    }

    #[test]
    fn test_grouping_is_order_insensitive() {
        let matcher = ToleranceMatcher::default();
        let a = rocksalt("a", 5.6);
        let b = rocksalt("b", 8.5);
        let c = rocksalt("c", 5.61);

        let clusters = matcher.group(&[&a, &b, &c]);
        // a 与 c 等价，b 单独成簇
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().any(|cl| cl == &vec![0, 2]));
        assert!(clusters.iter().any(|cl| cl == &vec![1]));
    }
}
