//! 测试替身：嵌入、分词与索引的内存实现

/// 确定性的字符串哈希 (FNV-1a)，跨进程稳定
fn stable_hash(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub mod ai {
    use async_trait::async_trait;
    use omega_ai::{Embeddings, EmbeddingProvider, TokenEncoder};
    use omega_core::{OmegaError, Result, Upstream};
    use std::sync::{Arc, Mutex};

    use super::stable_hash;

    pub const MOCK_CLS_ID: u32 = 101;
    pub const MOCK_SEP_ID: u32 = 102;
    const WORD_ID_BASE: u32 = 1000;

    #[derive(Clone)]
    pub struct MockEmbedder {
        dimensions: usize,
        fixed_output: Arc<Mutex<Option<Embeddings>>>,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
        should_fail: Arc<Mutex<bool>>,
    }

    impl Default for MockEmbedder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockEmbedder {
        pub fn new() -> Self {
            Self::with_dimensions(4)
        }

        pub fn with_dimensions(dimensions: usize) -> Self {
            Self {
                dimensions,
                fixed_output: Arc::new(Mutex::new(None)),
                calls: Arc::new(Mutex::new(Vec::new())),
                should_fail: Arc::new(Mutex::new(false)),
            }
        }

        /// 忽略输入，始终返回给定向量
        pub fn returning(self, embeddings: Embeddings) -> Self {
            *self.fixed_output.lock().unwrap() = Some(embeddings);
            self
        }

        /// 文本对应的确定性向量
        pub fn vector_for(&self, text: &str) -> Vec<f32> {
            let hash = stable_hash(text);
            (0..self.dimensions)
                .map(|i| {
                    let byte = (hash >> ((i % 8) * 8)) & 0xff;
                    byte as f32 / 255.0 + 0.01
                })
                .collect()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        pub fn set_should_fail(&self, should_fail: bool) {
            *self.should_fail.lock().unwrap() = should_fail;
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbedder {
        fn name(&self) -> &str {
            "mock-embedder"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings> {
            self.calls.lock().unwrap().push(texts.to_vec());

            if *self.should_fail.lock().unwrap() {
                return Err(OmegaError::upstream(Upstream::Embedder, "Mock embedder error"));
            }

            if let Some(fixed) = self.fixed_output.lock().unwrap().clone() {
                return Ok(fixed);
            }

            Ok(texts.iter().map(|t| self.vector_for(t)).collect())
        }
    }

    /// 按空白切词的分词器，输出 `[CLS] words... [SEP]`
    #[derive(Clone, Default)]
    pub struct MockTokenizer {
        failing_text: Option<String>,
        calls: Arc<Mutex<u32>>,
    }

    impl MockTokenizer {
        pub fn new() -> Self {
            Self::default()
        }

        /// 遇到这段文本时返回分词错误
        pub fn failing_on(mut self, text: &str) -> Self {
            self.failing_text = Some(text.to_string());
            self
        }

        pub fn token_id(&self, word: &str) -> u32 {
            WORD_ID_BASE + (stable_hash(word) % 1_000_000) as u32
        }

        pub fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl TokenEncoder for MockTokenizer {
        fn name(&self) -> &str {
            "mock-tokenizer"
        }

        fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>> {
            *self.calls.lock().unwrap() += 1;

            if self.failing_text.as_deref() == Some(text) {
                return Err(OmegaError::upstream(Upstream::Tokenizer, "Mock tokenizer error"));
            }

            let mut ids = vec![MOCK_CLS_ID];
            ids.extend(text.split_whitespace().map(|w| self.token_id(w)));
            ids.push(MOCK_SEP_ID);
            ids.truncate(max_length);
            Ok(ids)
        }
    }
}

pub mod index {
    use async_trait::async_trait;
    use omega_core::{OmegaError, Result, Upstream};
    use omega_vector::{IndexQuery, RawRow, TrialIndex};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// 构造一行最小的索引结果
    pub fn trial_row(pmid: &str, distance: f32) -> RawRow {
        let mut row = RawRow::new();
        row.insert("PMID".to_string(), json!(pmid));
        row.insert("title".to_string(), json!(format!("Trial {}", pmid)));
        row.insert("__nn_distance".to_string(), json!(distance));
        row
    }

    /// 返回预设行的索引，记录收到的查询
    #[derive(Clone, Default)]
    pub struct MockIndex {
        rows: Arc<Mutex<Vec<RawRow>>>,
        queries: Arc<Mutex<Vec<IndexQuery>>>,
        should_fail: Arc<Mutex<bool>>,
    }

    impl MockIndex {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_rows(self, rows: Vec<RawRow>) -> Self {
            *self.rows.lock().unwrap() = rows;
            self
        }

        pub fn last_query(&self) -> Option<IndexQuery> {
            self.queries.lock().unwrap().last().cloned()
        }

        pub fn call_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }

        pub fn set_should_fail(&self, should_fail: bool) {
            *self.should_fail.lock().unwrap() = should_fail;
        }
    }

    #[async_trait]
    impl TrialIndex for MockIndex {
        fn name(&self) -> &str {
            "mock-index"
        }

        async fn search(&self, query: IndexQuery) -> Result<Vec<RawRow>> {
            self.queries.lock().unwrap().push(query);

            if *self.should_fail.lock().unwrap() {
                return Err(OmegaError::upstream(Upstream::Index, "Mock index error"));
            }

            Ok(self.rows.lock().unwrap().clone())
        }
    }
}
