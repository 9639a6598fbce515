//! # 数据检索模块
//!
//! 查询两个外部材料数据库（MP 主、OQMD 备），把异构的
//! 原始条目规约为单一规范化候选记录。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs` 使用
//! - 使用 `models/`, `matching/`, `utils/output.rs`

pub mod dedup;
pub mod mp;
pub mod oqmd;
pub mod resolver;

use serde_json::Value;

/// 单一数据源的检索结果
///
/// 网络/解析失败在检索器边界被降级为 `NoData`，
/// 解析器的回退逻辑因此是对类型化结果的普通分支，
/// 而不是异常驱动的控制流。
#[derive(Debug, Clone)]
pub enum Retrieval<T> {
    /// 至少一条结构条目
    Found(Vec<T>),
    /// 数据源没有可用数据（含检索失败的降级）
    NoData { reason: String },
}

impl<T> Retrieval<T> {
    pub fn no_data(reason: impl Into<String>) -> Self {
        Retrieval::NoData {
            reason: reason.into(),
        }
    }
}

/// 把 JSON 值解析为空间群号 (1-230)
///
/// 接受整数或纯数字字符串；Hermann-Mauguin 符号等
/// 其他形式视为缺失，由调用方跳过该记录。
pub fn space_group_number(value: &Value) -> Option<u16> {
    let number = match value {
        Value::Number(n) => u16::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.trim().parse::<u16>().ok()?,
        _ => return None,
    };

    (1..=230).contains(&number).then_some(number)
}
