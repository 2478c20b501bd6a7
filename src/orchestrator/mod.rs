//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次命令的完整生命周期，是两个命令行工具的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `publish_app` - 发布应用
//! - 在启动浏览器之前校验发布请求
//! - 启动（或连接）浏览器，交给 `PublishFlow` 执行
//! - 无论成功失败，浏览器恰好关闭一次
//!
//! ### `search_app` - 搜索应用
//! - 检查关键词和 API Key
//! - 调用搜索后端，渲染文本或原样输出 JSON
//!
//! ## 层次关系
//!
//! ```text
//! publish_app                      search_app
//!     ↓                                ↓
//! workflow::PublishFlow            clients::SerperClient
//!     ↓                                ↓
//! services::LoginGate              services::search_render
//!     ↓
//! infrastructure (PageDriver / CdpDriver)
//! ```

pub mod publish_app;
pub mod search_app;

pub use publish_app::PublishApp;
pub use search_app::{OutputMode, SearchApp};
