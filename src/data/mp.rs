//! # Materials Project 检索器（主数据库）
//!
//! 通过 MP 的 summary REST 接口按化学式查询，把每条结构条目
//! 解析为类型化的 `MpRecord`。任何传输/解析失败都在此边界
//! 降级为 `Retrieval::NoData`，让解析器回退到 OQMD，
//! 绝不让检索失败终止流水线。
//!
//! API key 只从环境变量 `MP_API_KEY` 读取，不接受内联凭据。
//!
//! ## 依赖关系
//! - 被 `data/resolver.rs` 调用
//! - 使用 `models/`, `utils/output.rs`
//! - 使用 `reqwest` (blocking) 与 `serde_json`

use crate::data::resolver::PrimarySource;
use crate::data::{space_group_number, Retrieval};
use crate::models::record::MpRecord;
use crate::models::structure::{Crystal, Lattice, Site};
use crate::utils::output::Diagnostics;

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.materialsproject.org";
const API_KEY_ENV: &str = "MP_API_KEY";
const TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("qsindex/", env!("CARGO_PKG_VERSION"));

/// MP summary 检索器
pub struct MpRetriever {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MpRetriever {
    /// 创建检索器，API key 取自环境
    pub fn new() -> crate::error::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::QsiError::Other(e.to_string()))?;

        Ok(MpRetriever {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn query(&self, formula: &str, diag: &Diagnostics) -> Retrieval<MpRecord> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                diag.debug(&format!(
                    "{} not set, treating MP as unavailable",
                    API_KEY_ENV
                ));
                return Retrieval::no_data(format!("{} is not set", API_KEY_ENV));
            }
        };

        diag.debug(&format!("Retrieving MP data for {}...", formula));

        let url = format!("{}/materials/summary/", self.base_url);
        let fields = "material_id,deprecated,formula_pretty,band_gap,\
                      energy_above_hull,formation_energy_per_atom,structure,symmetry";

        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", api_key)
            .query(&[("formula", formula), ("_fields", fields)])
            .send();

        let body = match response.and_then(|r| r.error_for_status()) {
            Ok(r) => match r.text() {
                Ok(body) => body,
                Err(e) => return Retrieval::no_data(format!("MP response read failed: {}", e)),
            },
            Err(e) => {
                diag.debug(&format!("MP request failed: {}", e));
                return Retrieval::no_data(format!("MP request failed: {}", e));
            }
        };

        parse_summary(&body, diag)
    }
}

impl PrimarySource for MpRetriever {
    fn retrieve(&self, formula: &str, diag: &Diagnostics) -> Retrieval<MpRecord> {
        self.query(formula, diag)
    }
}

// ─────────────────────────────────────────────────────────────
// summary 响应载荷
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    data: Vec<SummaryDoc>,
}

#[derive(Debug, Deserialize)]
struct SummaryDoc {
    material_id: String,
    #[serde(default)]
    deprecated: bool,
    formula_pretty: Option<String>,
    band_gap: Option<f64>,
    energy_above_hull: Option<f64>,
    formation_energy_per_atom: Option<f64>,
    structure: Option<RawStructure>,
    symmetry: Option<RawSymmetry>,
}

#[derive(Debug, Deserialize)]
struct RawStructure {
    lattice: RawLattice,
    sites: Vec<RawSite>,
}

#[derive(Debug, Deserialize)]
struct RawLattice {
    matrix: [[f64; 3]; 3],
}

#[derive(Debug, Deserialize)]
struct RawSite {
    species: Vec<RawSpecies>,
    /// 分数坐标
    abc: [f64; 3],
}

#[derive(Debug, Deserialize)]
struct RawSpecies {
    element: String,
}

#[derive(Debug, Deserialize)]
struct RawSymmetry {
    number: serde_json::Value,
}

/// 把 summary 响应体解析为类型化记录列表
///
/// 缺少必需字段的条目跳过并记录诊断；全部跳过时降级为 NoData。
fn parse_summary(body: &str, diag: &Diagnostics) -> Retrieval<MpRecord> {
    let response: SummaryResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Retrieval::no_data(format!("MP response parse failed: {}", e)),
    };

    if response.data.is_empty() {
        return Retrieval::no_data("No data found in MP, switching to OQMD");
    }

    let total = response.data.len();
    let mut records = Vec::with_capacity(total);

    for doc in response.data {
        match build_record(doc) {
            Some(record) => records.push(record),
            None => diag.debug("Skipping MP entry with missing fields"),
        }
    }

    diag.debug(&format!("Found {} usable MP entries of {}", records.len(), total));

    if records.is_empty() {
        Retrieval::no_data("All MP entries were missing required fields")
    } else {
        Retrieval::Found(records)
    }
}

fn build_record(doc: SummaryDoc) -> Option<MpRecord> {
    let structure = doc.structure?;
    let space_group = space_group_number(&doc.symmetry?.number)?;

    let lattice = Lattice::from_vectors(structure.lattice.matrix);
    let sites = structure
        .sites
        .into_iter()
        .map(|site| {
            let element = site.species.into_iter().next().map(|s| s.element)?;
            Some(Site::new(element, site.abc))
        })
        .collect::<Option<Vec<_>>>()?;

    let crystal = Crystal::new(doc.material_id.clone(), lattice, sites);

    Some(MpRecord {
        material_id: doc.material_id,
        deprecated: doc.deprecated,
        formula: doc.formula_pretty?,
        band_gap: doc.band_gap?,
        energy_above_hull: doc.energy_above_hull?,
        formation_energy_per_atom: doc.formation_energy_per_atom?,
        space_group,
        crystal,
    })
}
