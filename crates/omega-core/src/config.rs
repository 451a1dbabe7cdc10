//! 配置管理

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{OmegaError, Result};

/// 主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 服务配置
    pub server: ServerConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 分词器配置
    pub tokenizer: TokenizerConfig,
    /// 向量索引配置
    pub index: IndexConfig,
    /// 检索参数
    pub search: SearchConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;

        if self.tokenizer.max_length == 0 {
            return Err(OmegaError::Config(
                "tokenizer.max_length 必须大于 0".to_string(),
            ));
        }

        if self.index.endpoint.is_none() {
            return Err(OmegaError::Config(
                "索引服务需要配置 index.endpoint (或 KDBAI_ENDPOINT)".to_string(),
            ));
        }

        Ok(())
    }
}

/// 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域访问的来源
    pub cors_origins: Vec<String>,
    /// 单个请求的超时时间 (秒)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.voyageai.com/v1".to_string(),
            model: "voyage-multilingual-2".to_string(),
            dimensions: 1024,
            timeout_secs: 30,
        }
    }
}

/// 分词器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// tokenizer.json 路径
    pub path: Option<PathBuf>,
    /// 最大序列长度，超出部分截断
    pub max_length: usize,
    /// 不计入词频的边界 token ([CLS] / [SEP])
    pub reserved_token_ids: Vec<u32>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_length: 32_000,
            reserved_token_ids: vec![101, 102],
        }
    }
}

/// 向量索引配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// 检索服务地址，如 `https://cloud.kdb.ai/instance/xxx`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub database: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            database: "Omega_Trials".to_string(),
            table: "Haiku_model".to_string(),
            timeout_secs: 30,
        }
    }
}

/// `similarity` 字段的计算方式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMode {
    /// 直接使用索引返回的距离
    #[default]
    Raw,
    /// 1 - distance
    Inverted,
}

impl SimilarityMode {
    pub fn score(self, distance: f32) -> f32 {
        match self {
            SimilarityMode::Raw => distance,
            SimilarityMode::Inverted => 1.0 - distance,
        }
    }
}

/// 检索参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 候选超取倍数，用于抵消去重损失
    pub overfetch_factor: f64,
    /// 单次向索引请求的最大候选数
    pub max_candidates: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// 混合检索未指定 alpha 时的默认值
    pub default_alpha: f32,
    pub similarity: SimilarityMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 1.5,
            max_candidates: 20,
            default_top_k: 5,
            max_top_k: 20,
            default_alpha: 0.5,
            similarity: SimilarityMode::Raw,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.overfetch_factor.is_finite() || self.overfetch_factor < 1.0 {
            return Err(OmegaError::Config(format!(
                "search.overfetch_factor 必须 >= 1.0, 当前值 {}",
                self.overfetch_factor
            )));
        }
        if self.max_candidates == 0 || self.max_top_k == 0 {
            return Err(OmegaError::Config(
                "search.max_candidates 和 search.max_top_k 必须大于 0".to_string(),
            ));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(OmegaError::Config(format!(
                "search.default_top_k 必须在 [1, {}] 范围内",
                self.max_top_k
            )));
        }
        if !(0.0..=1.0).contains(&self.default_alpha) {
            return Err(OmegaError::Config(
                "search.default_alpha 必须在 [0, 1] 范围内".to_string(),
            ));
        }
        Ok(())
    }
}
