//! 检索计划
//!
//! 根据检索模式决定参与的索引、各索引权重和候选超取数量。

use std::collections::BTreeMap;

use omega_core::SearchConfig;
use omega_vector::{DenseVector, IndexName, IndexQuery, QueryVector, SparseVector};

use crate::request::SearchMode;

pub const DEFAULT_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    /// 向索引请求的候选数量
    pub n: usize,
    pub indexes: Vec<IndexName>,
    /// 仅混合检索时存在
    pub weights: Option<BTreeMap<IndexName, f32>>,
}

impl SearchPlan {
    pub fn uses(&self, index: IndexName) -> bool {
        self.indexes.contains(&index)
    }

    /// 只放入参与检索的向量
    pub fn build_query(&self, dense: Option<DenseVector>, sparse: Option<SparseVector>) -> IndexQuery {
        let mut query = IndexQuery::new(self.n);

        if let Some(dense) = dense.filter(|_| self.uses(IndexName::Dense)) {
            query = query.with_vector(IndexName::Dense, QueryVector::Dense(dense));
        }
        if let Some(sparse) = sparse.filter(|_| self.uses(IndexName::Sparse)) {
            query = query.with_vector(IndexName::Sparse, QueryVector::Sparse(sparse));
        }
        if let Some(weights) = &self.weights {
            query = query.with_weights(weights.clone());
        }

        query
    }
}

#[derive(Debug, Clone)]
pub struct QueryPlanner {
    overfetch_factor: f64,
    max_candidates: usize,
}

impl QueryPlanner {
    pub fn new(overfetch_factor: f64, max_candidates: usize) -> Self {
        Self {
            overfetch_factor,
            max_candidates,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.overfetch_factor, config.max_candidates)
    }

    /// `min(round(top_k * factor), max_candidates)`，四舍六入五成双
    pub fn overfetch_count(&self, top_k: usize) -> usize {
        let wanted = (top_k as f64 * self.overfetch_factor).round_ties_even() as usize;
        wanted.min(self.max_candidates)
    }

    pub fn plan(&self, mode: SearchMode, top_k: usize, alpha: Option<f32>) -> SearchPlan {
        let n = self.overfetch_count(top_k);

        match mode {
            SearchMode::Semantic => SearchPlan {
                n,
                indexes: vec![IndexName::Dense],
                weights: None,
            },
            SearchMode::Statistical => SearchPlan {
                n,
                indexes: vec![IndexName::Sparse],
                weights: None,
            },
            SearchMode::Hybrid => {
                let alpha = alpha.unwrap_or(DEFAULT_ALPHA);
                let weights = [(IndexName::Dense, alpha), (IndexName::Sparse, 1.0 - alpha)]
                    .into_iter()
                    .collect();
                SearchPlan {
                    n,
                    indexes: vec![IndexName::Dense, IndexName::Sparse],
                    weights: Some(weights),
                }
            }
        }
    }
}

impl Default for QueryPlanner {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overfetch_count() {
        let planner = QueryPlanner::default();
        assert_eq!(planner.overfetch_count(1), 2);
        assert_eq!(planner.overfetch_count(3), 4);
        assert_eq!(planner.overfetch_count(5), 8);
        assert_eq!(planner.overfetch_count(7), 10);
        assert_eq!(planner.overfetch_count(10), 15);
        assert_eq!(planner.overfetch_count(13), 20);
        assert_eq!(planner.overfetch_count(20), 20);
    }

    #[test]
    fn test_semantic_plan_uses_dense_only() {
        let plan = QueryPlanner::default().plan(SearchMode::Semantic, 5, None);
        assert_eq!(plan.n, 8);
        assert_eq!(plan.indexes, vec![IndexName::Dense]);
        assert!(plan.weights.is_none());
    }

    #[test]
    fn test_statistical_plan_uses_sparse_only() {
        let plan = QueryPlanner::default().plan(SearchMode::Statistical, 5, None);
        assert_eq!(plan.indexes, vec![IndexName::Sparse]);
        assert!(plan.weights.is_none());
    }

    #[test]
    fn test_hybrid_plan_weights() {
        let plan = QueryPlanner::default().plan(SearchMode::Hybrid, 3, Some(0.3));
        let weights = plan.weights.unwrap();
        assert_eq!(plan.n, 4);
        assert!((weights[&IndexName::Dense] - 0.3).abs() < 1e-6);
        assert!((weights[&IndexName::Sparse] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_build_query_drops_unused_vectors() {
        let plan = QueryPlanner::default().plan(SearchMode::Semantic, 5, None);
        let query = plan.build_query(Some(vec![1.0]), Some(SparseVector::new()));
        assert!(query.first_vector(IndexName::Dense).is_some());
        assert!(query.first_vector(IndexName::Sparse).is_none());
        assert_eq!(query.n, 8);
    }
}
