//! 查询向量类型定义

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 稠密向量
pub type DenseVector = Vec<f32>;

/// 稀疏向量: token id (字符串形式) -> 权重
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector(HashMap<String, f32>);

impl SparseVector {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, token: impl Into<String>, weight: f32) {
        self.0.insert(token.into(), weight);
    }

    /// 累加权重，token 不存在时插入
    pub fn add(&mut self, token: &str, weight: f32) {
        match self.0.get_mut(token) {
            Some(existing) => *existing += weight,
            None => {
                self.0.insert(token.to_string(), weight);
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<f32> {
        self.0.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn total_weight(&self) -> f32 {
        self.0.values().sum()
    }

    /// 所有权重乘以同一系数
    pub fn scale(&mut self, factor: f32) {
        for weight in self.0.values_mut() {
            *weight *= factor;
        }
    }
}

impl FromIterator<(String, f32)> for SparseVector {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 索引名称 (与远端表结构中的索引名一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexName {
    #[serde(rename = "flat_index")]
    Dense,
    #[serde(rename = "sparse_index")]
    Sparse,
}

impl IndexName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IndexName::Dense => "flat_index",
            IndexName::Sparse => "sparse_index",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryVector {
    Dense(DenseVector),
    Sparse(SparseVector),
}

/// 提交给索引的一次检索请求
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    /// 每个参与检索的索引对应的查询向量
    pub vectors: BTreeMap<IndexName, Vec<QueryVector>>,
    /// 各索引的融合权重，仅多索引检索时存在
    pub weights: Option<BTreeMap<IndexName, f32>>,
    /// 候选数量
    pub n: usize,
}

impl IndexQuery {
    pub fn new(n: usize) -> Self {
        Self {
            vectors: BTreeMap::new(),
            weights: None,
            n,
        }
    }

    pub fn with_vector(mut self, index: IndexName, vector: QueryVector) -> Self {
        self.vectors.entry(index).or_default().push(vector);
        self
    }

    pub fn with_weights(mut self, weights: BTreeMap<IndexName, f32>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn first_vector(&self, index: IndexName) -> Option<&QueryVector> {
        self.vectors.get(&index).and_then(|v| v.first())
    }

    pub fn weight(&self, index: IndexName) -> f32 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(&index).copied())
            .unwrap_or(1.0)
    }
}
