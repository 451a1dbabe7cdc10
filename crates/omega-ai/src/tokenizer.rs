//! 分词器

use std::path::Path;

use omega_core::{OmegaError, Result, Upstream};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

/// Token 编码器 Trait
pub trait TokenEncoder: Send + Sync {
    fn name(&self) -> &str;

    /// 将文本编码为 token id 序列，超过 `max_length` 的部分静默截断
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>>;
}

/// 基于 HuggingFace `tokenizer.json` 的编码器
pub struct HfTokenizer {
    name: String,
    inner: Tokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: impl AsRef<Path>, max_length: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut inner = Tokenizer::from_file(path).map_err(|e| {
            OmegaError::Config(format!("加载分词器失败 ({}): {}", path.display(), e))
        })?;

        inner
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| OmegaError::Config(format!("设置截断参数失败: {}", e)))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tokenizer".to_string());

        info!("Tokenizer loaded from {}", path.display());

        Ok(Self { name, inner })
    }
}

impl TokenEncoder for HfTokenizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, true)
            .map_err(|e| OmegaError::upstream(Upstream::Tokenizer, e.to_string()))?;

        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(max_length);
        Ok(ids)
    }
}
