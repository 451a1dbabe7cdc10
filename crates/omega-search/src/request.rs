//! 检索请求与响应

use std::fmt;
use std::str::FromStr;

use omega_core::{OmegaError, Result, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::postprocess::ScoredTrial;

/// 检索模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// 稠密嵌入
    #[default]
    Semantic,
    /// 稀疏词频
    Statistical,
    /// 两者加权
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Semantic => "semantic",
            SearchMode::Statistical => "statistical",
            SearchMode::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

impl FromStr for SearchMode {
    type Err = OmegaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(SearchMode::Semantic),
            "statistical" => Ok(SearchMode::Statistical),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(OmegaError::invalid_input(format!(
                "unknown search_type '{}', expected semantic, statistical or hybrid",
                other
            ))),
        }
    }
}

/// `POST /search` 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub queries: Vec<String>,
    #[serde(rename = "search_type", default)]
    pub mode: SearchMode,
    /// 缺省时使用 `search.default_top_k`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
}

impl SearchRequest {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
            mode: SearchMode::default(),
            top_k: None,
            alpha: None,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// 过滤空查询并检查参数范围，缺省的 top_k 和混合检索的 alpha 取配置默认值
    pub fn validate(self, config: &SearchConfig) -> Result<ValidatedRequest> {
        let queries: Vec<String> = self
            .queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if queries.is_empty() {
            return Err(OmegaError::invalid_input(
                "queries must contain at least one non-empty string",
            ));
        }

        let top_k = self.top_k.unwrap_or(config.default_top_k);
        if top_k == 0 || top_k > config.max_top_k {
            return Err(OmegaError::invalid_input(format!(
                "top_k must be between 1 and {}, got {}",
                config.max_top_k, top_k
            )));
        }

        let alpha = match (self.mode, self.alpha) {
            (SearchMode::Hybrid, Some(alpha)) if !(0.0..=1.0).contains(&alpha) => {
                return Err(OmegaError::invalid_input(format!(
                    "alpha must be between 0 and 1, got {}",
                    alpha
                )));
            }
            (SearchMode::Hybrid, alpha) => Some(alpha.unwrap_or(config.default_alpha)),
            (mode, Some(_)) => {
                return Err(OmegaError::invalid_input(format!(
                    "alpha is only allowed for hybrid search, got search_type '{}'",
                    mode
                )));
            }
            (_, None) => None,
        };

        Ok(ValidatedRequest {
            queries,
            mode: self.mode,
            top_k,
            alpha,
        })
    }
}

/// 通过校验的请求
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub queries: Vec<String>,
    pub mode: SearchMode,
    pub top_k: usize,
    /// 仅混合检索为 Some
    pub alpha: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredTrial>,
    pub total_found: usize,
}

impl SearchResponse {
    pub fn new(results: Vec<ScoredTrial>) -> Self {
        Self {
            total_found: results.len(),
            results,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}
