//! # 晶体结构数据模型
//!
//! 定义用于结构等价性比较的统一晶体表示。
//! MP 返回分数坐标，OQMD 返回笛卡尔坐标，二者在此统一为分数坐标。
//!
//! ## 依赖关系
//! - 被 `data/` 和 `matching/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let alpha_rad = alpha.to_radians();
        let beta_rad = beta.to_radians();
        let gamma_rad = gamma.to_radians();

        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        Lattice {
            matrix: [a_vec, b_vec, c_vec],
        }
    }

    /// 三个晶格向量的长度 (a, b, c)
    pub fn lengths(&self) -> [f64; 3] {
        let norm = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        [
            norm(self.matrix[0]),
            norm(self.matrix[1]),
            norm(self.matrix[2]),
        ]
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a, b, c] = self.lengths();
        let a_vec = self.matrix[0];
        let b_vec = self.matrix[1];
        let c_vec = self.matrix[2];

        let dot = |x: [f64; 3], y: [f64; 3]| x[0] * y[0] + x[1] * y[1] + x[2] * y[2];

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标 → 笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标 → 分数坐标（通过 3x3 逆矩阵）
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> [f64; 3] {
        let inv = self.inverse();
        [
            cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
            cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
            cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
        ]
    }

    /// 晶格矩阵的逆（伴随矩阵法）
    fn inverse(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        let det = self.volume();

        let cof = |r1: usize, c1: usize, r2: usize, c2: usize| {
            m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]
        };

        [
            [
                cof(1, 1, 2, 2) / det,
                -cof(0, 1, 2, 2) / det,
                cof(0, 1, 1, 2) / det,
            ],
            [
                -cof(1, 0, 2, 2) / det,
                cof(0, 0, 2, 2) / det,
                -cof(0, 0, 1, 2) / det,
            ],
            [
                cof(1, 0, 2, 1) / det,
                -cof(0, 0, 2, 1) / det,
                cof(0, 0, 1, 1) / det,
            ],
        ]
    }
}

/// 晶体格位（元素 + 分数坐标）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub frac: [f64; 3],
}

impl Site {
    pub fn new(element: impl Into<String>, frac: [f64; 3]) -> Self {
        Site {
            element: element.into(),
            frac,
        }
    }
}

/// 可比较的晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 来源标识（MP material_id 或 OQMD entry_id）
    pub label: String,

    /// 晶格
    pub lattice: Lattice,

    /// 格位列表
    pub sites: Vec<Site>,
}

impl Crystal {
    pub fn new(label: impl Into<String>, lattice: Lattice, sites: Vec<Site>) -> Self {
        Crystal {
            label: label.into(),
            lattice,
            sites,
        }
    }

    /// 从笛卡尔坐标格位创建（OQMD 载荷）
    pub fn from_cartesian(
        label: impl Into<String>,
        lattice: Lattice,
        species: Vec<String>,
        cart_coords: Vec<[f64; 3]>,
    ) -> Self {
        let sites = species
            .into_iter()
            .zip(cart_coords)
            .map(|(el, cart)| {
                let mut frac = lattice.cart_to_frac(cart);
                // 归一化到 [0, 1) 单胞内
                for f in frac.iter_mut() {
                    *f -= f.floor();
                }
                Site::new(el, frac)
            })
            .collect();

        Crystal {
            label: label.into(),
            lattice,
            sites,
        }
    }

    /// 元素组成（按元素符号有序）
    pub fn composition(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for site in &self.sites {
            *counts.entry(site.element.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        self.composition()
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 每原子体积
    pub fn volume_per_atom(&self) -> f64 {
        self.lattice.volume().abs() / self.sites.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_from_parameters_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let (a, b, c, alpha, beta, gamma) = lattice.parameters();

        assert!((a - 5.0).abs() < 1e-6);
        assert!((b - 5.0).abs() < 1e-6);
        assert!((c - 5.0).abs() < 1e-6);
        assert!((alpha - 90.0).abs() < 1e-6);
        assert!((beta - 90.0).abs() < 1e-6);
        assert!((gamma - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let vol = lattice.volume().abs();

        // 5^3 = 125
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_cart_frac_roundtrip() {
        let lattice = Lattice::from_parameters(4.0, 5.0, 6.0, 90.0, 100.0, 95.0);
        let frac = [0.25, 0.5, 0.75];
        let cart = lattice.frac_to_cart(frac);
        let back = lattice.cart_to_frac(cart);

        for i in 0..3 {
            assert!((back[i] - frac[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_crystal_from_cartesian_wraps_into_cell() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        // 单胞外的笛卡尔坐标应被折回 [0,1)
        let crystal = Crystal::from_cartesian(
            "test",
            lattice,
            vec!["Na".to_string()],
            vec![[6.0, -2.0, 0.0]],
        );

        let frac = crystal.sites[0].frac;
        assert!((frac[0] - 0.5).abs() < 1e-9);
        assert!((frac[1] - 0.5).abs() < 1e-9);
        assert!(frac[2].abs() < 1e-9);
    }

    #[test]
    fn test_crystal_formula() {
        let lattice = Lattice::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Na", [0.0, 0.0, 0.0]),
            Site::new("Cl", [0.5, 0.5, 0.5]),
            Site::new("Na", [0.5, 0.5, 0.0]),
            Site::new("Cl", [0.0, 0.0, 0.5]),
        ];
        let crystal = Crystal::new("NaCl", lattice, sites);

        assert_eq!(crystal.formula(), "Cl2Na2");
    }

    #[test]
    fn test_volume_per_atom() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let sites = vec![
            Site::new("Fe", [0.0, 0.0, 0.0]),
            Site::new("Fe", [0.5, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("Fe", lattice, sites);

        assert!((crystal.volume_per_atom() - 32.0).abs() < 1e-9);
    }
}
