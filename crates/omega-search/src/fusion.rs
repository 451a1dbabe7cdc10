//! 多查询向量融合
//!
//! 稠密向量取均值后重新归一化，稀疏向量求和后归一化为概率分布。

use omega_core::{OmegaError, Result};
use omega_vector::{DenseVector, SparseVector};

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// 逐维求均值并归一化为单位向量，零向量原样返回
pub fn fuse_dense(vectors: &[DenseVector]) -> Result<DenseVector> {
    let first = vectors
        .first()
        .ok_or_else(|| OmegaError::invalid_input("no embeddings provided"))?;

    let dim = first.len();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(OmegaError::invalid_input(format!(
            "embedding dimension mismatch: expected {}, got {}",
            dim,
            bad.len()
        )));
    }

    let count = vectors.len() as f32;
    let mut mean = vec![0.0f32; dim];
    for vector in vectors {
        for (acc, x) in mean.iter_mut().zip(vector) {
            *acc += x;
        }
    }
    for x in mean.iter_mut() {
        *x /= count;
    }

    let norm = l2_norm(&mean);
    if norm > 0.0 {
        for x in mean.iter_mut() {
            *x /= norm;
        }
    }

    Ok(mean)
}

/// 按 token 累加权重后除以总权重，全部为空时返回空向量
pub fn fuse_sparse(vectors: &[SparseVector]) -> SparseVector {
    let mut combined = SparseVector::new();
    for vector in vectors {
        for (token, weight) in vector.iter() {
            combined.add(token, weight);
        }
    }

    let total = combined.total_weight();
    if total > 0.0 {
        combined.scale(1.0 / total);
    }

    combined
}
