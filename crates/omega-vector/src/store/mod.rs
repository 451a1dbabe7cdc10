//! 向量索引抽象层实现

mod remote;

use async_trait::async_trait;
use omega_core::{IndexConfig, Result};
use std::sync::Arc;

pub use remote::RemoteIndex;

use super::trial::RawRow;
use super::types::IndexQuery;

/// 试验索引 Trait
///
/// 返回的行按相关度排序 (距离升序)，可能包含相同 PMID 的多行。
#[async_trait]
pub trait TrialIndex: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, query: IndexQuery) -> Result<Vec<RawRow>>;
}

pub fn create_index(config: &IndexConfig) -> Result<Arc<dyn TrialIndex>> {
    let index = RemoteIndex::from_config(config)?;
    Ok(Arc::new(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use omega_core::OmegaError;

    #[test]
    fn test_create_index_without_endpoint_is_config_error() {
        let result = create_index(&IndexConfig::default());
        assert!(matches!(result, Err(OmegaError::Config(_))));
    }

    #[test]
    fn test_create_index_uses_configured_table() {
        let config = IndexConfig {
            endpoint: Some("http://localhost:8082".to_string()),
            table: "trials_v2".to_string(),
            ..IndexConfig::default()
        };
        let index = create_index(&config).unwrap();
        assert_eq!(index.name(), "trials_v2");
    }
}
