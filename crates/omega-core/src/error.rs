//! 统一错误处理

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 外部依赖服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    Embedder,
    Tokenizer,
    Index,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Upstream::Embedder => "embedder",
            Upstream::Tokenizer => "tokenizer",
            Upstream::Index => "index",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum OmegaError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("上游服务不可用 ({service}): {message}")]
    UpstreamUnavailable { service: Upstream, message: String },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OmegaError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        OmegaError::InvalidInput(reason.into())
    }

    pub fn upstream(service: Upstream, message: impl Into<String>) -> Self {
        OmegaError::UpstreamUnavailable {
            service,
            message: message.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, OmegaError::InvalidInput(_))
    }

    /// 出错的上游服务，非上游错误返回 None
    pub fn upstream_service(&self) -> Option<Upstream> {
        match self {
            OmegaError::UpstreamUnavailable { service, .. } => Some(*service),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OmegaError>;
