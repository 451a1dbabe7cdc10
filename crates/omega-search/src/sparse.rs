//! 稀疏词频向量

use std::collections::HashMap;
use std::sync::Arc;

use omega_ai::TokenEncoder;
use omega_core::TokenizerConfig;
use omega_vector::SparseVector;
use tracing::warn;

/// [CLS]
pub const CLS_TOKEN_ID: u32 = 101;
/// [SEP]
pub const SEP_TOKEN_ID: u32 = 102;

const DEFAULT_MAX_LENGTH: usize = 32_000;

pub struct SparseVectorBuilder {
    tokenizer: Arc<dyn TokenEncoder>,
    max_length: usize,
    reserved_tokens: Vec<u32>,
}

impl SparseVectorBuilder {
    pub fn new(tokenizer: Arc<dyn TokenEncoder>) -> Self {
        Self {
            tokenizer,
            max_length: DEFAULT_MAX_LENGTH,
            reserved_tokens: vec![CLS_TOKEN_ID, SEP_TOKEN_ID],
        }
    }

    pub fn from_config(tokenizer: Arc<dyn TokenEncoder>, config: &TokenizerConfig) -> Self {
        Self {
            tokenizer,
            max_length: config.max_length,
            reserved_tokens: config.reserved_token_ids.clone(),
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_reserved_tokens(mut self, tokens: Vec<u32>) -> Self {
        self.reserved_tokens = tokens;
        self
    }

    /// 统计单条文本的 token 出现次数
    ///
    /// 空文本或分词失败返回空向量，表示没有词法信号。
    pub fn build(&self, text: &str) -> SparseVector {
        if text.trim().is_empty() {
            return SparseVector::new();
        }

        let ids = match self.tokenizer.encode(text, self.max_length) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Tokenization failed, using empty sparse vector: {}", e);
                return SparseVector::new();
            }
        };

        let mut counts: HashMap<u32, f32> = HashMap::new();
        for id in ids {
            *counts.entry(id).or_insert(0.0) += 1.0;
        }
        for reserved in &self.reserved_tokens {
            counts.remove(reserved);
        }

        counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect()
    }

    pub fn build_all(&self, texts: &[String]) -> Vec<SparseVector> {
        texts.iter().map(|text| self.build(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omega_testing::ai::MockTokenizer;
    use proptest::prelude::*;

    fn builder() -> SparseVectorBuilder {
        SparseVectorBuilder::new(Arc::new(MockTokenizer::new()))
    }

    #[test]
    fn test_counts_repeated_tokens() {
        let tokenizer = MockTokenizer::new();
        let omega = tokenizer.token_id("omega");
        let builder = SparseVectorBuilder::new(Arc::new(tokenizer));

        let vector = builder.build("omega cholesterol omega");
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.get(&omega.to_string()), Some(2.0));
    }

    #[test]
    fn test_blank_text_is_empty() {
        let builder = builder();
        assert!(builder.build("").is_empty());
        assert!(builder.build("   \t\n").is_empty());
    }

    #[test]
    fn test_tokenizer_failure_degrades_to_empty() {
        let tokenizer = MockTokenizer::new().failing_on("broken");
        let builder = SparseVectorBuilder::new(Arc::new(tokenizer));

        let vectors = builder.build_all(&["broken".to_string(), "omega".to_string()]);
        assert!(vectors[0].is_empty());
        assert_eq!(vectors[1].len(), 1);
    }

    #[test]
    fn test_truncation_is_passed_to_tokenizer() {
        let builder = builder().with_max_length(3);
        // [CLS] a b -> 只剩两个普通 token
        let vector = builder.build("a b c d e");
        assert_eq!(vector.total_weight(), 2.0);
    }

    #[test]
    fn test_custom_reserved_tokens() {
        let tokenizer = MockTokenizer::new();
        let omega = tokenizer.token_id("omega");
        let builder = SparseVectorBuilder::new(Arc::new(tokenizer))
            .with_reserved_tokens(vec![CLS_TOKEN_ID, SEP_TOKEN_ID, omega]);

        let vector = builder.build("omega trial");
        assert!(!vector.contains(&omega.to_string()));
        assert_eq!(vector.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_boundary_tokens_never_present(text in "[a-z0-9 \\-]{0,64}") {
            let vector = builder().build(&text);
            prop_assert!(!vector.contains(&CLS_TOKEN_ID.to_string()));
            prop_assert!(!vector.contains(&SEP_TOKEN_ID.to_string()));
        }
    }
}
