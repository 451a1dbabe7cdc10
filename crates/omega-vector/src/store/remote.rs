//! 远程试验索引
//!
//! 通过 REST 调用 KDB.ai 风格的检索接口：
//! `POST {endpoint}/api/v2/databases/{database}/tables/{table}/search`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::TrialIndex;
use crate::trial::RawRow;
use crate::types::IndexQuery;
use omega_core::{IndexConfig, OmegaError, Result, Upstream};

pub struct RemoteIndex {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    database: String,
    table: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    result: Vec<Vec<RawRow>>,
}

impl RemoteIndex {
    pub fn new(endpoint: &str, database: &str, table: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: None,
            database: database.to_string(),
            table: table.to_string(),
        }
    }

    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            OmegaError::Config("缺少索引服务地址 (index.endpoint 或 KDBAI_ENDPOINT)".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OmegaError::Config(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            ..Self::new(endpoint, &config.database, &config.table)
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn search_url(&self) -> String {
        format!(
            "{}/api/v2/databases/{}/tables/{}/search",
            self.endpoint, self.database, self.table
        )
    }

    fn request_body(query: &IndexQuery) -> Value {
        let mut body = json!({
            "vectors": query.vectors,
            "n": query.n,
        });

        if let Some(weights) = &query.weights {
            let params: serde_json::Map<String, Value> = weights
                .iter()
                .map(|(index, weight)| (index.as_str().to_string(), json!({ "weight": weight })))
                .collect();
            body["indexParams"] = Value::Object(params);
        }

        body
    }
}

#[async_trait]
impl TrialIndex for RemoteIndex {
    fn name(&self) -> &str {
        &self.table
    }

    async fn search(&self, query: IndexQuery) -> Result<Vec<RawRow>> {
        debug!(
            "Searching {}.{} with {} index(es), n={}",
            self.database,
            self.table,
            query.vectors.len(),
            query.n
        );

        let mut request = self.client.post(self.search_url()).json(&Self::request_body(&query));
        if let Some(api_key) = &self.api_key {
            request = request.header("X-Api-Key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OmegaError::upstream(Upstream::Index, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OmegaError::upstream(
                Upstream::Index,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| OmegaError::upstream(Upstream::Index, format!("响应格式错误: {}", e)))?;

        // 每个查询向量对应一组结果，这里只提交了一组
        Ok(body.result.into_iter().next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndexName, QueryVector, SparseVector};
    use httpmock::prelude::*;
    use std::collections::BTreeMap;

    const SEARCH_PATH: &str = "/api/v2/databases/Omega_Trials/tables/Haiku_model/search";

    fn hybrid_query() -> IndexQuery {
        let mut sparse = SparseVector::new();
        sparse.insert("2001", 1.0);
        let weights: BTreeMap<IndexName, f32> =
            [(IndexName::Dense, 0.25), (IndexName::Sparse, 0.75)].into_iter().collect();
        IndexQuery::new(5)
            .with_vector(IndexName::Dense, QueryVector::Dense(vec![1.0, 0.0]))
            .with_vector(IndexName::Sparse, QueryVector::Sparse(sparse))
            .with_weights(weights)
    }

    #[test]
    fn test_request_body_includes_index_params() {
        let body = RemoteIndex::request_body(&hybrid_query());
        assert_eq!(body["n"], 5);
        assert_eq!(body["vectors"]["flat_index"], json!([[1.0, 0.0]]));
        assert_eq!(body["vectors"]["sparse_index"], json!([{"2001": 1.0}]));
        assert_eq!(body["indexParams"]["flat_index"]["weight"], 0.25);
        assert_eq!(body["indexParams"]["sparse_index"]["weight"], 0.75);
    }

    #[test]
    fn test_single_index_body_has_no_params() {
        let query =
            IndexQuery::new(8).with_vector(IndexName::Dense, QueryVector::Dense(vec![0.5]));
        let body = RemoteIndex::request_body(&query);
        assert!(body.get("indexParams").is_none());
    }

    #[tokio::test]
    async fn test_search_returns_first_result_set() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(SEARCH_PATH).header("x-api-key", "secret");
                then.status(200).json_body(json!({
                    "result": [[
                        {"PMID": "1", "__nn_distance": 0.1},
                        {"PMID": "2", "__nn_distance": 0.2}
                    ]]
                }));
            })
            .await;

        let index = RemoteIndex::new(&server.base_url(), "Omega_Trials", "Haiku_model")
            .with_api_key("secret");
        let rows = index.search(hybrid_query()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["PMID"], "2");
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(SEARCH_PATH);
                then.status(200).json_body(json!({"result": []}));
            })
            .await;

        let index = RemoteIndex::new(&server.base_url(), "Omega_Trials", "Haiku_model");
        let rows = index.search(hybrid_query()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_index() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(SEARCH_PATH);
                then.status(503).body("unavailable");
            })
            .await;

        let index = RemoteIndex::new(&server.base_url(), "Omega_Trials", "Haiku_model");
        let err = index.search(hybrid_query()).await.unwrap_err();
        assert_eq!(err.upstream_service(), Some(Upstream::Index));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = IndexConfig::default();
        assert!(matches!(
            RemoteIndex::from_config(&config),
            Err(OmegaError::Config(_))
        ));
    }
}
