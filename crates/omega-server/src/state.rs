//! 应用状态 - 持有启动时构建的检索引擎

use std::sync::Arc;

use omega_ai::{HfTokenizer, VoyageEmbedding};
use omega_core::{Config, OmegaError, Result};
use omega_search::{SearchEngine, SparseVectorBuilder};
use omega_vector::create_index;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

impl AppState {
    pub fn new(engine: SearchEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// 按配置构建嵌入客户端、分词器和索引，组装成检索引擎
pub fn build_engine(config: &Config) -> Result<SearchEngine> {
    config.validate()?;

    let embedder = VoyageEmbedding::from_config(&config.embedding)?;

    let tokenizer_path = config.tokenizer.path.as_ref().ok_or_else(|| {
        OmegaError::Config("缺少分词器文件路径 (tokenizer.path)".to_string())
    })?;
    let tokenizer = HfTokenizer::from_file(tokenizer_path, config.tokenizer.max_length)?;
    let sparse_builder = SparseVectorBuilder::from_config(Arc::new(tokenizer), &config.tokenizer);

    let index = create_index(&config.index)?;

    let engine = SearchEngine::new(
        Arc::new(embedder),
        sparse_builder,
        index,
        config.search.clone(),
    );

    info!(
        "Search engine ready: embedder={}/{}, index={}",
        engine.embedder().name(),
        engine.embedder().model(),
        engine.index().name()
    );

    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_endpoint() -> Config {
        let mut config = Config::default();
        config.index.endpoint = Some("http://localhost:8082".to_string());
        config
    }

    #[test]
    fn test_build_engine_requires_embedding_key() {
        let config = config_with_endpoint();
        assert!(matches!(build_engine(&config), Err(OmegaError::Config(_))));
    }

    #[test]
    fn test_build_engine_requires_tokenizer_path() {
        let mut config = config_with_endpoint();
        config.embedding.api_key = Some("test-key".to_string());
        let err = build_engine(&config).err().unwrap();
        assert!(err.to_string().contains("tokenizer.path"));
    }

    #[test]
    fn test_build_engine_rejects_invalid_config() {
        let config = Config::default();
        // 没有索引服务地址
        assert!(matches!(build_engine(&config), Err(OmegaError::Config(_))));
    }
}
