//! # 核自旋数据与化学式解析
//!
//! 磁噪声子分数需要整个化学式的平均核自旋：
//! 先把化学式解析为元素计数，再按组成加权平均各元素的
//! 同位素丰度加权平均核自旋。
//!
//! 化学式不可解析属于致命输入错误，不做静默降级。
//!
//! ## 依赖关系
//! - 被 `score/aggregate.rs` 调用
//! - 使用 `error.rs`，使用 `regex` 做词法扫描

use crate::error::{QsiError, Result};

use regex::Regex;
use std::collections::BTreeMap;

/// 各元素的同位素丰度加权平均核自旋（ħ 单位）
///
/// 由稳定同位素的自旋量子数按天然丰度（归一化为分数）加权求和。
/// 无稳定同位素的元素 (Tc, Pm) 记 0。
const ELEMENT_SPINS: &[(&str, f64)] = &[
    ("H", 0.500),
    ("He", 0.000),
    ("Li", 1.462),
    ("Be", 1.500),
    ("B", 1.799),
    ("C", 0.005),
    ("N", 0.998),
    ("O", 0.001),
    ("F", 0.500),
    ("Ne", 0.004),
    ("Na", 1.500),
    ("Mg", 0.250),
    ("Al", 2.500),
    ("Si", 0.023),
    ("P", 0.500),
    ("S", 0.011),
    ("Cl", 1.500),
    ("Ar", 0.000),
    ("K", 1.500),
    ("Ca", 0.005),
    ("Sc", 3.500),
    ("Ti", 0.375),
    ("V", 3.506),
    ("Cr", 0.143),
    ("Mn", 2.500),
    ("Fe", 0.011),
    ("Co", 3.500),
    ("Ni", 0.017),
    ("Cu", 1.500),
    ("Zn", 0.101),
    ("Ga", 1.500),
    ("Ge", 0.349),
    ("As", 1.500),
    ("Se", 0.038),
    ("Br", 1.500),
    ("Kr", 0.518),
    ("Rb", 2.222),
    ("Sr", 0.315),
    ("Y", 0.500),
    ("Zr", 0.281),
    ("Nb", 4.500),
    ("Mo", 0.633),
    ("Tc", 0.000),
    ("Ru", 0.746),
    ("Rh", 0.500),
    ("Pd", 0.558),
    ("Ag", 0.500),
    ("Cd", 0.125),
    ("In", 4.500),
    ("Sn", 0.083),
    ("Sb", 2.928),
    ("Te", 0.040),
    ("I", 2.500),
    ("Xe", 0.450),
    ("Cs", 3.500),
    ("Ba", 0.267),
    ("La", 3.501),
    ("Ce", 0.000),
    ("Pr", 2.500),
    ("Nd", 0.718),
    ("Pm", 0.000),
    ("Sm", 1.008),
    ("Eu", 2.500),
    ("Gd", 0.457),
    ("Tb", 1.500),
    ("Dy", 1.095),
    ("Ho", 3.500),
    ("Er", 0.803),
    ("Tm", 0.500),
    ("Yb", 0.475),
    ("Lu", 3.591),
    ("Hf", 1.264),
    ("Ta", 3.501),
    ("W", 0.072),
    ("Re", 2.500),
    ("Os", 0.252),
    ("Ir", 1.500),
    ("Pt", 0.169),
    ("Au", 1.500),
    ("Hg", 0.282),
    ("Tl", 0.500),
    ("Pb", 0.111),
    ("Bi", 4.500),
    ("Th", 0.000),
    ("U", 0.025),
];

/// 查询单个元素的平均核自旋
pub fn element_spin(symbol: &str) -> Option<f64> {
    ELEMENT_SPINS
        .iter()
        .find(|(el, _)| *el == symbol)
        .map(|(_, spin)| *spin)
}

/// 把化学式解析为元素 → 计数映射
///
/// 支持小数计数与嵌套括号，如 `Ca(OH)2`、`Li0.5CoO2`。
pub fn parse_formula(formula: &str) -> Result<BTreeMap<String, f64>> {
    // 词法：元素符号+可选计数 | 左括号 | 右括号+可选计数
    let token_re = Regex::new(r"([A-Z][a-z]?)(\d*\.?\d*)|(\()|(\))(\d*\.?\d*)")
        .map_err(|e| QsiError::Other(e.to_string()))?;

    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(QsiError::FormulaError(formula.to_string()));
    }

    // 栈式解析，栈底为整个化学式的计数
    let mut stack: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new()];
    let mut cursor = 0;

    for cap in token_re.captures_iter(trimmed) {
        let whole = cap.get(0).unwrap();
        if whole.start() != cursor {
            // 两个 token 之间出现了非法字符
            return Err(QsiError::FormulaError(formula.to_string()));
        }
        cursor = whole.end();

        if let Some(element) = cap.get(1) {
            let count = parse_count(cap.get(2).map(|m| m.as_str()), formula)?;
            let top = stack.last_mut().unwrap();
            *top.entry(element.as_str().to_string()).or_insert(0.0) += count;
        } else if cap.get(3).is_some() {
            stack.push(BTreeMap::new());
        } else {
            let multiplier = parse_count(cap.get(5).map(|m| m.as_str()), formula)?;
            let group = stack
                .pop()
                .ok_or_else(|| QsiError::FormulaError(formula.to_string()))?;
            if stack.is_empty() {
                // 右括号多于左括号
                return Err(QsiError::FormulaError(formula.to_string()));
            }
            let top = stack.last_mut().unwrap();
            for (element, count) in group {
                *top.entry(element).or_insert(0.0) += count * multiplier;
            }
        }
    }

    if cursor != trimmed.len() || stack.len() != 1 {
        return Err(QsiError::FormulaError(formula.to_string()));
    }

    let counts = stack.pop().unwrap();
    if counts.is_empty() {
        return Err(QsiError::FormulaError(formula.to_string()));
    }

    Ok(counts)
}

fn parse_count(raw: Option<&str>, formula: &str) -> Result<f64> {
    match raw {
        None | Some("") => Ok(1.0),
        Some(s) => s
            .parse::<f64>()
            .map_err(|_| QsiError::FormulaError(formula.to_string())),
    }
}

/// 化学式的组成加权平均核自旋
pub fn average_nuclear_spin(formula: &str) -> Result<f64> {
    let counts = parse_formula(formula)?;

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (element, count) in &counts {
        let spin = element_spin(element)
            .ok_or_else(|| QsiError::UnknownElement(element.clone()))?;
        numerator += spin * count;
        denominator += count;
    }

    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_formula() {
        let counts = parse_formula("H2O").unwrap();
        assert_eq!(counts.len(), 2);
        assert!((counts["H"] - 2.0).abs() < 1e-12);
        assert!((counts["O"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_nested_groups() {
        let counts = parse_formula("Ca(OH)2").unwrap();
        assert!((counts["Ca"] - 1.0).abs() < 1e-12);
        assert!((counts["O"] - 2.0).abs() < 1e-12);
        assert!((counts["H"] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_fractional_counts() {
        let counts = parse_formula("Li0.5CoO2").unwrap();
        assert!((counts["Li"] - 0.5).abs() < 1e-12);
        assert!((counts["Co"] - 1.0).abs() < 1e-12);
        assert!((counts["O"] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_formula("h2o").is_err());
        assert!(parse_formula("Fe2O3)").is_err());
        assert!(parse_formula("(Fe2O3").is_err());
        assert!(parse_formula("").is_err());
        assert!(parse_formula("Fe2-O3").is_err());
    }

    #[test]
    fn test_element_spin_lookup() {
        assert!((element_spin("H").unwrap() - 0.5).abs() < 1e-9);
        assert!((element_spin("O").unwrap() - 0.001).abs() < 1e-9);
        assert!(element_spin("Xx").is_none());
    }

    #[test]
    fn test_average_spin_h2o() {
        // (2*0.5 + 1*0.001) / 3
        let avg = average_nuclear_spin("H2O").unwrap();
        assert!((avg - 1.001 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_spin_unknown_element_is_fatal() {
        assert!(average_nuclear_spin("Og2").is_err());
    }
}
