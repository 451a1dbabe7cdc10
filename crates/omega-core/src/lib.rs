//! Omega Core - 核心类型和抽象
//!
//! 提供错误处理、配置加载等各 crate 共用的基础功能。

pub mod config;
pub mod config_loader;
pub mod error;

pub use config::*;
pub use error::*;
