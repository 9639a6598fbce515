//! # OQMD 检索器（备用数据库）
//!
//! 通过 OQMD 的 phases REST 接口按组成查询。OQMD 不需要凭据，
//! 但结构载荷是原始的晶格向量 + "元素 @ x y z" 笛卡尔格位串，
//! 需要在此边界组装成可比较的 `Crystal`。
//!
//! 与 MP 检索器相同，任何失败都降级为 `Retrieval::NoData`。
//!
//! ## 依赖关系
//! - 被 `data/resolver.rs` 调用
//! - 使用 `models/`, `utils/output.rs`
//! - 使用 `reqwest` (blocking) 与 `serde_json`

use crate::data::resolver::SecondarySource;
use crate::data::{space_group_number, Retrieval};
use crate::models::record::OqmdRecord;
use crate::models::structure::{Crystal, Lattice};
use crate::utils::output::Diagnostics;

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://oqmd.org/oqmdapi";
const TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("qsindex/", env!("CARGO_PKG_VERSION"));

/// OQMD phases 检索器
pub struct OqmdRetriever {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OqmdRetriever {
    pub fn new() -> crate::error::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::QsiError::Other(e.to_string()))?;

        Ok(OqmdRetriever {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    fn query(&self, formula: &str, diag: &Diagnostics) -> Retrieval<OqmdRecord> {
        diag.debug(&format!("Retrieving OQMD data for {}...", formula));

        let url = format!("{}/formationenergy", self.base_url);
        let fields = "entry_id,name,spacegroup,band_gap,delta_e,stability,unit_cell,sites";

        let response = self
            .client
            .get(&url)
            .query(&[
                ("composition", formula),
                ("fields", fields),
                ("format", "json"),
            ])
            .send();

        let body = match response.and_then(|r| r.error_for_status()) {
            Ok(r) => match r.text() {
                Ok(body) => body,
                Err(e) => return Retrieval::no_data(format!("OQMD response read failed: {}", e)),
            },
            Err(e) => {
                diag.debug(&format!("OQMD request failed: {}", e));
                return Retrieval::no_data(format!("OQMD request failed: {}", e));
            }
        };

        parse_phases(&body, diag)
    }
}

impl SecondarySource for OqmdRetriever {
    fn retrieve(&self, formula: &str, diag: &Diagnostics) -> Retrieval<OqmdRecord> {
        self.query(formula, diag)
    }
}

// ─────────────────────────────────────────────────────────────
// phases 响应载荷
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PhasesResponse {
    #[serde(default)]
    data: Vec<PhaseDoc>,
}

#[derive(Debug, Deserialize)]
struct PhaseDoc {
    entry_id: Option<u64>,
    name: Option<String>,
    band_gap: Option<f64>,
    stability: Option<f64>,
    delta_e: Option<f64>,
    /// 晶格向量 (3x3, Å)
    unit_cell: Option<[[f64; 3]; 3]>,
    /// "元素 @ x y z" 笛卡尔格位串
    sites: Option<Vec<String>>,
    spacegroup: Option<serde_json::Value>,
}

/// 把 phases 响应体解析为类型化记录列表
fn parse_phases(body: &str, diag: &Diagnostics) -> Retrieval<OqmdRecord> {
    let response: PhasesResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return Retrieval::no_data(format!("OQMD response parse failed: {}", e)),
    };

    if response.data.is_empty() {
        return Retrieval::no_data("No data found in OQMD");
    }

    let total = response.data.len();
    let mut records = Vec::with_capacity(total);

    for doc in response.data {
        match build_record(doc) {
            Some(record) => records.push(record),
            None => diag.debug("Skipping OQMD entry with missing fields"),
        }
    }

    diag.debug(&format!(
        "Found {} usable OQMD entries of {}",
        records.len(),
        total
    ));

    if records.is_empty() {
        Retrieval::no_data("All OQMD entries were missing required fields")
    } else {
        Retrieval::Found(records)
    }
}

fn build_record(doc: PhaseDoc) -> Option<OqmdRecord> {
    let entry_id = doc.entry_id?;
    let spacegroup = space_group_number(&doc.spacegroup?)?;
    let lattice = Lattice::from_vectors(doc.unit_cell?);

    let mut species = Vec::new();
    let mut coords = Vec::new();
    for site in doc.sites? {
        let (element, cart) = parse_site(&site)?;
        species.push(element);
        coords.push(cart);
    }
    if species.is_empty() {
        return None;
    }

    let crystal = Crystal::from_cartesian(entry_id.to_string(), lattice, species, coords);

    Some(OqmdRecord {
        entry_id,
        name: doc.name.unwrap_or_else(|| crystal.formula()),
        band_gap: doc.band_gap?,
        stability: doc.stability?,
        delta_e: doc.delta_e?,
        spacegroup,
        crystal,
    })
}

/// 解析 "Fe @ 0.5 0.5 0.5" 形式的格位串
fn parse_site(site: &str) -> Option<(String, [f64; 3])> {
    let (element, coords) = site.split_once('@')?;

    let values: Vec<f64> = coords
        .split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    if values.len() != 3 {
        return None;
    }

    Some((
        element.trim().to_string(),
        [values[0], values[1], values[2]],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BODY: &str = r#"{
        "data": [
            {
                "entry_id": 4061139,
                "name": "SiC",
                "band_gap": 1.35,
                "stability": 0.0,
                "delta_e": -0.205,
                "spacegroup": 216,
                "unit_cell": [[4.38, 0, 0], [0, 4.38, 0], [0, 0, 4.38]],
                "sites": ["Si @ 0.0 0.0 0.0", "C @ 1.095 1.095 1.095"]
            },
            {
                "entry_id": 12345,
                "name": "SiC",
                "band_gap": 2.3,
                "stability": 0.04,
                "delta_e": -0.19,
                "spacegroup": "F-43m",
                "unit_cell": [[4.38, 0, 0], [0, 4.38, 0], [0, 0, 4.38]],
                "sites": ["Si @ 0.0 0.0 0.0", "C @ 1.095 1.095 1.095"]
            }
        ]
    }"#;

    #[test]
    fn test_parse_phases_builds_typed_records() {
        let diag = Diagnostics::default();
        match parse_phases(SAMPLE_BODY, &diag) {
            Retrieval::Found(records) => {
                // 空间群是符号串的条目被跳过
                assert_eq!(records.len(), 1);
                let record = &records[0];
                assert_eq!(record.entry_id, 4061139);
                assert_eq!(record.spacegroup, 216);
                assert_eq!(record.crystal.sites.len(), 2);
                // 笛卡尔坐标换算成分数坐标
                assert!((record.crystal.sites[1].frac[0] - 0.25).abs() < 1e-9);
            }
            Retrieval::NoData { reason } => panic!("unexpected NoData: {}", reason),
        }
    }

    #[test]
    fn test_parse_phases_empty_is_no_data() {
        let diag = Diagnostics::default();
        assert!(matches!(
            parse_phases(r#"{"data": []}"#, &diag),
            Retrieval::NoData { .. }
        ));
    }

    #[test]
    fn test_parse_site_string() {
        let (element, cart) = parse_site("Fe @ 1.5 -0.25 3.0").unwrap();
        assert_eq!(element, "Fe");
        assert!((cart[0] - 1.5).abs() < 1e-12);
        assert!((cart[1] + 0.25).abs() < 1e-12);
        assert!((cart[2] - 3.0).abs() < 1e-12);

        assert!(parse_site("Fe 1.5 0.25").is_none());
        assert!(parse_site("Fe @ 1.5 0.25").is_none());
    }
}
