//! # xhs_tools
//!
//! 两个命令行工具共用的库：
//!
//! - `serper-search`：通过 serper.dev API 搜索网页、图片、新闻、视频
//! - `xhs-publish`：驱动有界面的浏览器，在小红书创作中心发布图文笔记
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 唯一接触 chromiumoxide 的一层，只暴露能力
//! - `PageDriver` - 页面操作抽象（导航、定位、点击、填写、上传、按键）
//! - `CdpDriver` - 基于 CDP 的实现，`JsExecutor` 负责执行脚本
//! - `browser/` - 启动带持久化会话目录的浏览器，或连接已有浏览器
//!
//! ### ② 业务能力层（Services / Clients）
//! - `LoginGate` - 登录检测与扫码等待
//! - `search_render` - 搜索结果渲染
//! - `SerperClient` - serper.dev HTTP 客户端
//!
//! ### ③ 流程层（Workflow）
//! - `PublishFlow` - 一次发布的完整流程（登录 → 上传 → 填写 → 话题 → 发布）
//!
//! ### ④ 编排层（Orchestration）
//! - `PublishApp` - 校验输入、管理浏览器生命周期
//! - `SearchApp` - 检查输入、调用搜索、选择输出格式
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::ChromeLauncher;
pub use clients::{SearchBackend, SerperClient};
pub use config::{PublishConfig, SearchConfig, Timing};
pub use error::{AppError, AppResult, ErrorKind};
pub use infrastructure::{PageDriver, SessionLauncher};
pub use models::{PublishRequest, SearchKind, SearchRequest, SearchResponse, TimeRange};
pub use orchestrator::{OutputMode, PublishApp, SearchApp};
pub use workflow::{PublishFlow, PublishOutcome};
