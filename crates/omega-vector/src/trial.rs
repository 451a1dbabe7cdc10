//! 临床试验记录
//!
//! 索引返回的行是无类型的键值数据，这里是唯一的解码边界。

use omega_core::{OmegaError, Result, Upstream};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 索引返回的原始行
pub type RawRow = serde_json::Map<String, Value>;

pub const ID_FIELD: &str = "PMID";
pub const DISTANCE_FIELD: &str = "__nn_distance";

/// 一条试验记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(rename = "PMID")]
    pub pmid: String,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publication_date: Option<String>,
    pub country: Option<String>,
    pub journal: Option<String>,
    pub domain_primary: Option<String>,
    pub domain_secondary: Option<String>,
    pub trial_population: Option<String>,
    pub measured_outcomes: Option<String>,
    pub observed_outcomes: Option<String>,
    #[serde(rename = "__nn_distance")]
    pub distance: f32,
    pub url: Option<String>,
}

impl TrialRecord {
    /// 从索引行解码，缺少标识或距离字段视为上游数据格式错误
    pub fn from_row(row: &RawRow) -> Result<Self> {
        let pmid = match row.get(ID_FIELD) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            other => {
                return Err(schema_error(format!(
                    "{} 字段缺失或类型错误: {:?}",
                    ID_FIELD, other
                )));
            }
        };

        let distance = row
            .get(DISTANCE_FIELD)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                schema_error(format!("记录 {} 缺少数值型 {} 字段", pmid, DISTANCE_FIELD))
            })? as f32;

        Ok(Self {
            title: text_field(row, "title"),
            abstract_text: text_field(row, "abstract"),
            publication_date: text_field(row, "publication_date"),
            country: text_field(row, "country"),
            journal: text_field(row, "journal"),
            domain_primary: text_field(row, "domain_primary"),
            domain_secondary: text_field(row, "domain_secondary"),
            trial_population: text_field(row, "trial_population"),
            measured_outcomes: text_field(row, "measured_outcomes"),
            observed_outcomes: text_field(row, "observed_outcomes"),
            url: text_field(row, "url"),
            pmid,
            distance,
        })
    }

    pub fn from_rows(rows: &[RawRow]) -> Result<Vec<Self>> {
        rows.iter().map(Self::from_row).collect()
    }
}

fn schema_error(message: String) -> OmegaError {
    OmegaError::upstream(Upstream::Index, message)
}

// 列表类字段 (如多个结局指标) 以 "; " 连接
fn text_field(row: &RawRow, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Some(other.to_string()),
    }
}
