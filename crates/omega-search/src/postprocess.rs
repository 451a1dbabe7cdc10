//! 结果后处理：去重、截断、相似度标注

use std::collections::HashSet;

use omega_core::SimilarityMode;
use omega_vector::TrialRecord;
use serde::{Deserialize, Serialize};

/// 带相似度的试验记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrial {
    #[serde(flatten)]
    pub record: TrialRecord,
    pub similarity: f32,
}

impl ScoredTrial {
    pub fn pmid(&self) -> &str {
        &self.record.pmid
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultPostProcessor {
    similarity: SimilarityMode,
}

impl ResultPostProcessor {
    pub fn new(similarity: SimilarityMode) -> Self {
        Self { similarity }
    }

    /// 按 PMID 去重 (保留索引顺序中的第一条)，再截断到 `top_k`，不重新排序
    pub fn process(&self, records: Vec<TrialRecord>, top_k: usize) -> Vec<ScoredTrial> {
        let mut seen = HashSet::new();

        records
            .into_iter()
            .filter(|record| seen.insert(record.pmid.clone()))
            .take(top_k)
            .map(|record| ScoredTrial {
                similarity: self.similarity.score(record.distance),
                record,
            })
            .collect()
    }
}
