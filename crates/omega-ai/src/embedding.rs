//! Embedding Provider Trait
//!
//! 定义独立的嵌入向量生成接口，以及 Voyage AI 的 HTTP 实现

use std::time::Duration;

use async_trait::async_trait;
use omega_core::{EmbeddingConfig, OmegaError, Result, Upstream};
use serde::Deserialize;
use tracing::debug;

pub type Embedding = Vec<f32>;
pub type Embeddings = Vec<Embedding>;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    fn dimensions(&self) -> usize;

    /// 按输入顺序为每段文本返回一个向量
    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings>;

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| OmegaError::upstream(Upstream::Embedder, "empty embedding response"))
    }
}

pub struct VoyageEmbedding {
    client: reqwest::Client,
    model: String,
    dimensions: usize,
    api_key: String,
    base_url: String,
}

impl VoyageEmbedding {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: "voyage-multilingual-2".to_string(),
            dimensions: 1024,
            api_key: api_key.into(),
            base_url: "https://api.voyageai.com/v1".to_string(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            OmegaError::Config("缺少嵌入服务 API Key (embedding.api_key 或 VOYAGE_API_KEY)".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OmegaError::Config(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_model(mut self, model: &str, dimensions: usize) -> Self {
        self.model = model.to_string();
        self.dimensions = dimensions;
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for VoyageEmbedding {
    fn name(&self) -> &str {
        "voyage"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts with {}", texts.len(), self.model);

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "input": texts,
                "model": self.model,
                "input_type": "query",
            }))
            .send()
            .await
            .map_err(|e| OmegaError::upstream(Upstream::Embedder, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OmegaError::upstream(
                Upstream::Embedder,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| OmegaError::upstream(Upstream::Embedder, format!("响应格式错误: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(OmegaError::upstream(
                Upstream::Embedder,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    parsed.data.len()
                ),
            ));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}
