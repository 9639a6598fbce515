//! # 候选解析器
//!
//! 两级严格回退：先查主数据库 (MP)，报告无数据时再查
//! 备用数据库 (OQMD)。不重试、不跨源合并——被选中的源
//! 的结果是权威的，即使它的可用字段更少。
//!
//! 数据源以 trait 对象注入，回退逻辑可用假源独立测试。
//!
//! ## 依赖关系
//! - 被 `pipeline.rs` 调用
//! - 使用 `data/dedup.rs`, `data/mp.rs`, `data/oqmd.rs`

use crate::data::dedup::Deduplicator;
use crate::data::Retrieval;
use crate::matching::StructureGrouper;
use crate::models::record::{MaterialRecord, MpRecord, OqmdRecord};
use crate::utils::output::Diagnostics;

/// 主数据库查询能力
pub trait PrimarySource {
    fn retrieve(&self, formula: &str, diag: &Diagnostics) -> Retrieval<MpRecord>;
}

/// 备用数据库查询能力
pub trait SecondarySource {
    fn retrieve(&self, formula: &str, diag: &Diagnostics) -> Retrieval<OqmdRecord>;
}

/// 候选解析器
pub struct Resolver<'a> {
    primary: &'a dyn PrimarySource,
    secondary: &'a dyn SecondarySource,
    dedup: Deduplicator<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        primary: &'a dyn PrimarySource,
        secondary: &'a dyn SecondarySource,
        grouper: &'a dyn StructureGrouper,
    ) -> Self {
        Resolver {
            primary,
            secondary,
            dedup: Deduplicator::new(grouper),
        }
    }

    /// 解析一个化学式为恰好一个规范化候选
    ///
    /// 两个源都没有可用数据时返回 "未找到" 哨兵，
    /// 这是合法的终态而不是错误。
    pub fn resolve(
        &self,
        formula: &str,
        force_secondary: bool,
        diag: &Diagnostics,
    ) -> MaterialRecord {
        if force_secondary {
            diag.debug("Secondary source forced, skipping MP");
        } else {
            match self.primary.retrieve(formula, diag) {
                found @ Retrieval::Found(_) => {
                    return self.dedup.reduce_primary(found, diag);
                }
                Retrieval::NoData { reason } => {
                    diag.debug(&format!("Primary source has no data: {}", reason));
                }
            }
        }

        let retrieval = self.secondary.retrieve(formula, diag);
        self.dedup.reduce_secondary(retrieval, diag)
    }
}
