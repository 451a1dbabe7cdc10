//! Omega Search - 查询融合与结果排序
//!
//! 多条查询 -> 稀疏词频向量 + 稠密嵌入 -> 融合 -> 索引检索 -> 去重截断

pub mod engine;
pub mod fusion;
pub mod planner;
pub mod postprocess;
pub mod request;
pub mod sparse;

pub use engine::*;
pub use fusion::*;
pub use planner::*;
pub use postprocess::*;
pub use request::*;
pub use sparse::*;
