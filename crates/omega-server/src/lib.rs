//! Omega Server - HTTP 检索服务

pub mod api;
pub mod gateway;
pub mod state;

pub use api::*;
pub use gateway::*;
pub use state::*;
