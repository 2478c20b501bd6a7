/// serper.dev API 客户端
///
/// 封装对 serper.dev 的 HTTP 调用，返回原始 JSON
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{ApiError, AppError, AppResult, InputError};
use crate::models::SearchRequest;

/// API Key 请求头（HTTP 头名大小写不敏感）
const API_KEY_HEADER: &str = "x-api-key";

/// 搜索后端
///
/// 每次调用恰好发出一个请求
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, api_key: &str, request: &SearchRequest) -> AppResult<Value>;
}

/// serper.dev 客户端
#[derive(Debug, Clone)]
pub struct SerperClient {
    http: reqwest::Client,
    base_url: String,
}

impl SerperClient {
    /// 创建新的 serper.dev 客户端
    pub fn new(config: &SearchConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 请求的完整地址
    pub fn url_for(&self, request: &SearchRequest) -> String {
        format!("{}{}", self.base_url, request.kind.endpoint())
    }

    fn headers(api_key: &str) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| InputError::MissingApiKey {
            var: "SERPER_API_KEY".to_string(),
        })?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl SearchBackend for SerperClient {
    async fn search(&self, api_key: &str, request: &SearchRequest) -> AppResult<Value> {
        let url = self.url_for(request);
        debug!("POST {} q={:?} num={}", url, request.query, request.num);

        let response = self
            .http
            .post(&url)
            .headers(Self::headers(api_key)?)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        debug!("响应状态: {}", status);
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 启动只应答一次的本地 HTTP 服务，返回地址和收到的请求
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (format!("http://{}", addr), handle)
    }

    fn client(base_url: String) -> SerperClient {
        SerperClient::new(&SearchConfig {
            api_key: Some("k".to_string()),
            base_url,
            ..SearchConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_for_each_kind() {
        let c = client("https://google.serper.dev/".to_string());
        assert_eq!(
            c.url_for(&SearchRequest::new("q", SearchKind::Images)),
            "https://google.serper.dev/images"
        );
        assert_eq!(
            c.url_for(&SearchRequest::new("q", SearchKind::Search)),
            "https://google.serper.dev/search"
        );
    }

    #[tokio::test]
    async fn test_search_posts_with_api_key() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 38\r\nConnection: close\r\n\r\n{\"organic\":[{\"title\":\"T\",\"link\":\"L\"}]}",
        )
        .await;

        let value = client(base)
            .search("secret-key", &SearchRequest::new("rust", SearchKind::News))
            .await
            .unwrap();
        assert_eq!(value["organic"][0]["title"], "T");

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(raw.starts_with("POST /news "));
        assert!(lower.contains("x-api-key: secret-key"));
        assert!(lower.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (base, _server) = serve_once(
            "HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = client(base)
            .search("bad", &SearchRequest::new("rust", SearchKind::Search))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Api(ApiError::BadStatus { status: 403, .. })
        ));
        assert!(err.to_string().contains("API error: 403 Forbidden"));
    }
}
