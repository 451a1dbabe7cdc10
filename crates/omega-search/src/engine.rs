//! 检索引擎
//!
//! 串联校验、向量构建、融合、检索计划、索引调用和结果后处理。
//! 外部句柄在启动时构建一次，之后只读共享。

use std::sync::Arc;

use omega_ai::EmbeddingProvider;
use omega_core::{OmegaError, Result, SearchConfig, Upstream};
use omega_vector::{DenseVector, IndexName, SparseVector, TrialIndex, TrialRecord};
use tracing::{debug, info, instrument, warn};

use crate::fusion::{fuse_dense, fuse_sparse};
use crate::planner::QueryPlanner;
use crate::postprocess::ResultPostProcessor;
use crate::request::{SearchRequest, SearchResponse};
use crate::sparse::SparseVectorBuilder;

pub struct SearchEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    sparse_builder: Arc<SparseVectorBuilder>,
    index: Arc<dyn TrialIndex>,
    planner: QueryPlanner,
    postprocessor: ResultPostProcessor,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        sparse_builder: SparseVectorBuilder,
        index: Arc<dyn TrialIndex>,
        config: SearchConfig,
    ) -> Self {
        Self {
            embedder,
            sparse_builder: Arc::new(sparse_builder),
            index,
            planner: QueryPlanner::from_config(&config),
            postprocessor: ResultPostProcessor::new(config.similarity),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn index(&self) -> &dyn TrialIndex {
        self.index.as_ref()
    }

    #[instrument(skip(self, request), fields(mode = %request.mode, top_k = ?request.top_k))]
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let request = request.validate(&self.config)?;
        let plan = self.planner.plan(request.mode, request.top_k, request.alpha);
        debug!(
            "Planned {} query(ies): n={}, indexes={:?}, weights={:?}",
            request.queries.len(),
            plan.n,
            plan.indexes,
            plan.weights
        );

        let (dense, sparse) = tokio::join!(
            self.dense_vector(&request.queries, plan.uses(IndexName::Dense)),
            self.sparse_vector(&request.queries, plan.uses(IndexName::Sparse)),
        );
        let query = plan.build_query(dense?, sparse?);

        let rows = self.index.search(query).await?;
        if rows.is_empty() {
            warn!("Index {} returned no candidates", self.index.name());
            return Ok(SearchResponse::empty());
        }

        let candidates = rows.len();
        let records = TrialRecord::from_rows(&rows)?;
        let results = self.postprocessor.process(records, request.top_k);

        info!(
            "Search returned {} result(s) from {} candidate(s)",
            results.len(),
            candidates
        );
        Ok(SearchResponse::new(results))
    }

    async fn dense_vector(&self, queries: &[String], needed: bool) -> Result<Option<DenseVector>> {
        if !needed {
            return Ok(None);
        }

        let embeddings = self.embedder.embed_batch(queries).await?;
        if embeddings.len() != queries.len() {
            return Err(OmegaError::upstream(
                Upstream::Embedder,
                format!(
                    "expected {} embeddings, got {}",
                    queries.len(),
                    embeddings.len()
                ),
            ));
        }

        // 嵌入结果不满足融合前提说明上游数据有误
        let fused = fuse_dense(&embeddings).map_err(|e| match e {
            OmegaError::InvalidInput(message) => OmegaError::upstream(Upstream::Embedder, message),
            other => other,
        })?;

        debug!("Fused {} embedding(s) of dimension {}", embeddings.len(), fused.len());
        Ok(Some(fused))
    }

    async fn sparse_vector(&self, queries: &[String], needed: bool) -> Result<Option<SparseVector>> {
        if !needed {
            return Ok(None);
        }

        let builder = Arc::clone(&self.sparse_builder);
        let queries = queries.to_vec();
        let fused = tokio::task::spawn_blocking(move || fuse_sparse(&builder.build_all(&queries)))
            .await
            .map_err(|e| {
                OmegaError::upstream(Upstream::Tokenizer, format!("sparse vector task failed: {}", e))
            })?;

        debug!("Fused sparse vector with {} token(s)", fused.len());
        Ok(Some(fused))
    }
}
