//! # 子分数函数
//!
//! 五个纯函数，把单一物性映射到 (0, 1] 的适宜度分数。
//! 所有函数对全实数域输入只饱和、不报错；
//! 可调常数以显式参数传入，默认值见各 `DEFAULT_*` 常量。
//!
//! ## 依赖关系
//! - 被 `score/aggregate.rs` 调用
//! - 无外部模块依赖

/// 稳定性衰减常数 (eV/atom)
///
/// hull distance 超过约 0.05 eV/atom 即进入亚稳区，
/// 衰减常数取 0.05 使该阈值处得分为 e^-1。
pub const DEFAULT_STABILITY_DECAY: f64 = 0.05;

/// 可见光区理想带隙 (eV)
pub const DEFAULT_IDEAL_GAP_VISIBLE: f64 = 1.0;
/// 紫外区理想带隙 (eV)
pub const DEFAULT_IDEAL_GAP_UV: f64 = 2.5;
/// 可见光区容差 (eV)
pub const DEFAULT_VISIBLE_TOLERANCE: f64 = 0.5;
/// 紫外区容差 (eV)
pub const DEFAULT_UV_TOLERANCE: f64 = 1.0;
/// 紫外发射体判定阈值 (eV)
pub const DEFAULT_UV_CUTOFF: f64 = 2.0;

/// 生成能 sigmoid 截断点 (eV/atom)
pub const DEFAULT_FORMATION_CUTOFF: f64 = 0.0;
/// 生成能 sigmoid 陡峭度
pub const DEFAULT_FORMATION_STEEPNESS: f64 = 2.0;

/// 对称性幂律曲率
pub const DEFAULT_SYMMETRY_CURVATURE: f64 = 0.5;

/// 理想厚度 (nm)
pub const DEFAULT_IDEAL_THICKNESS: f64 = 0.6;
/// 厚度偏差灵敏度 (nm^-2)
pub const DEFAULT_THICKNESS_SENSITIVITY: f64 = 10.0;

/// 磁噪声惩罚系数
pub const DEFAULT_SPIN_PENALTY: f64 = 2.5;

/// 稳定性子分数：`exp(-hull / decay)`
///
/// hull distance 为 0（落在凸包上）得满分 1。
/// 负输入（数值噪声）饱和到 1。
pub fn stability(hull_distance: f64, decay_constant: f64) -> f64 {
    (-hull_distance / decay_constant).exp().min(1.0)
}

/// 带隙子分数：双区高斯
///
/// 以可见光区理想带隙为中心的钟形曲线；带隙超过紫外阈值时
/// 切换到紫外区的中心与容差。两区各自连续，
/// 阈值处导数不连续是有意的策略。
pub fn band_gap(
    gap: f64,
    ideal_visible: f64,
    ideal_uv: f64,
    visible_tolerance: f64,
    uv_tolerance: f64,
    uv_cutoff: f64,
) -> f64 {
    let (ideal, tolerance) = if gap > uv_cutoff {
        (ideal_uv, uv_tolerance)
    } else {
        (ideal_visible, visible_tolerance)
    };

    (-(gap - ideal).powi(2) / (2.0 * tolerance.powi(2))).exp()
}

/// 生成能子分数：偏好负值的 sigmoid
///
/// `1 / (1 + exp(steepness * (Ef - cutoff)))`，随 Ef 单调递减。
pub fn formation_energy(formation_energy: f64, cutoff: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (steepness * (formation_energy - cutoff)).exp())
}

/// 对称性子分数：`(n / 230)^curvature`
///
/// 亚线性幂律，高对称性收益递减。
pub fn symmetry(space_group: u16, curvature: f64) -> f64 {
    (f64::from(space_group) / 230.0).powf(curvature)
}

/// 厚度子分数：理想厚度附近的倒二次惩罚
pub fn thickness(thickness: f64, ideal: f64, sensitivity: f64) -> f64 {
    1.0 / (1.0 + sensitivity * (thickness - ideal).powi(2))
}

/// 磁噪声子分数：`exp(-penalty * avg_spin)`
///
/// 局域磁场涨落导致量子比特退相干，平均核自旋
/// 略高于 0 就应受到陡峭惩罚。
pub fn magnetic_noise(avg_nuclear_spin: f64, penalty_factor: f64) -> f64 {
    (-penalty_factor * avg_nuclear_spin).exp().min(1.0)
}
