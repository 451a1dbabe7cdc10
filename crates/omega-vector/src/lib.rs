//! Omega Vector - 向量索引抽象层
//!
//! 提供查询向量类型、试验记录的行格式，以及统一的索引检索接口
//! (KDB.ai 兼容的 REST 检索服务)。

pub mod store;
pub mod trial;
pub mod types;

pub use store::*;
pub use trial::*;
pub use types::*;
