//! 搜索应用 - 编排层
//!
//! 检查输入 → 调用一次搜索后端 → 渲染输出

use tracing::debug;

use crate::clients::SearchBackend;
use crate::error::{AppResult, InputError};
use crate::models::{SearchRequest, SearchResponse};
use crate::services::search_render;

/// 输出模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// 格式化文本
    #[default]
    Text,
    /// 上游原始 JSON（美化输出）
    Json,
}

/// 搜索应用
pub struct SearchApp<B> {
    backend: B,
    api_key: Option<String>,
}

impl<B: SearchBackend> SearchApp<B> {
    pub fn new(backend: B, api_key: Option<String>) -> Self {
        Self { backend, api_key }
    }

    /// 执行一次搜索，返回要打印到 stdout 的文本
    ///
    /// 关键词为空或没有 API Key 时，不会发出任何请求。
    pub async fn run(&self, request: &SearchRequest, mode: OutputMode) -> AppResult<String> {
        if request.query.trim().is_empty() {
            return Err(InputError::MissingQuery.into());
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| InputError::MissingApiKey {
                var: "SERPER_API_KEY".to_string(),
            })?;

        debug!("搜索类型: {} | 关键词: {}", request.kind, request.query);
        let raw = self.backend.search(api_key, request).await?;

        match mode {
            OutputMode::Json => Ok(serde_json::to_string_pretty(&raw)? + "\n"),
            OutputMode::Text => {
                let response: SearchResponse = serde_json::from_value(raw)?;
                Ok(search_render::render(request.kind, &response))
            }
        }
    }
}
