//! Omega AI - 模型能力接入
//!
//! - 嵌入向量生成 (Voyage AI)
//! - 分词 (HuggingFace tokenizer.json)

pub mod embedding;
pub mod tokenizer;

pub use embedding::*;
pub use tokenizer::*;
