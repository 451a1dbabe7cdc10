//! 统一配置加载器
//!
//! 依次合并：默认值 -> 配置文件 -> `OMEGA__` 前缀环境变量 -> 兼容旧部署的环境变量
//! (`VOYAGE_API_KEY`, `KDBAI_API_KEY`, `KDBAI_ENDPOINT`)。

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::{OmegaError, Result};

const ENV_PREFIX: &str = "OMEGA";
const ENV_SEPARATOR: &str = "__";

impl Config {
    /// 加载配置
    ///
    /// `path` 为 None 时读取默认路径，文件不存在则跳过；显式指定的文件必须存在。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if required && !file.exists() {
            return Err(OmegaError::Config(format!(
                "配置文件不存在: {}",
                file.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(file.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("tokenizer.reserved_token_ids")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| OmegaError::Config(format!("读取配置失败: {}", e)))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| OmegaError::Config(format!("解析配置失败: {}", e)))?;

        config.apply_legacy_env(|key| std::env::var(key).ok());

        info!(
            "Configuration loaded (file: {}, index table: {}.{})",
            file.display(),
            config.index.database,
            config.index.table
        );

        Ok(config)
    }

    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".omega-search")
            .join("config.json")
    }

    /// 用旧部署使用的环境变量补全未配置的凭据
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.embedding.api_key.is_none() {
            if let Some(key) = lookup("VOYAGE_API_KEY") {
                debug!("Using VOYAGE_API_KEY from environment");
                self.embedding.api_key = Some(key);
            }
        }

        if self.index.api_key.is_none() {
            if let Some(key) = lookup("KDBAI_API_KEY") {
                debug!("Using KDBAI_API_KEY from environment");
                self.index.api_key = Some(key);
            }
        }

        if self.index.endpoint.is_none() {
            if let Some(endpoint) = lookup("KDBAI_ENDPOINT") {
                debug!("Using KDBAI_ENDPOINT from environment");
                self.index.endpoint = Some(endpoint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimilarityMode;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "server": {{"port": 9100}},
                "index": {{"endpoint": "http://localhost:8082"}},
                "search": {{"similarity": "inverted", "max_candidates": 30}}
            }}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.index.endpoint.as_deref(), Some("http://localhost:8082"));
        assert_eq!(config.search.similarity, SimilarityMode::Inverted);
        assert_eq!(config.search.max_candidates, 30);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            "[tokenizer]\nmax_length = 512\n\n[index]\ntable = \"trials\"\n"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.tokenizer.max_length, 512);
        assert_eq!(config.index.table, "trials");
        assert_eq!(config.index.database, "Omega_Trials");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let result = Config::load(Some(&missing));
        assert!(matches!(result, Err(OmegaError::Config(_))));
    }

    #[test]
    fn test_legacy_env_fills_missing_credentials() {
        let vars: HashMap<&str, &str> = [
            ("VOYAGE_API_KEY", "voyage-key"),
            ("KDBAI_API_KEY", "kdb-key"),
            ("KDBAI_ENDPOINT", "https://cloud.kdb.ai/instance/abc"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_legacy_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.embedding.api_key.as_deref(), Some("voyage-key"));
        assert_eq!(config.index.api_key.as_deref(), Some("kdb-key"));
        assert_eq!(
            config.index.endpoint.as_deref(),
            Some("https://cloud.kdb.ai/instance/abc")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_env_does_not_override_explicit_values() {
        let mut config = Config::default();
        config.embedding.api_key = Some("from-file".to_string());
        config.index.endpoint = Some("http://configured:8082".to_string());
        let before = config.index.clone();

        config.apply_legacy_env(|_| Some("from-env".to_string()));
        assert_eq!(config.embedding.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.index.endpoint, before.endpoint);
        assert_eq!(config.index.table, before.table);
    }
}
