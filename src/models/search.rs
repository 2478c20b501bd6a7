//! 搜索请求与响应
//!
//! 响应的每个字段都是可选的，上游缺字段时按空值渲染。

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 搜索类型，对应 serper.dev 的四个接口
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SearchKind {
    /// 网页搜索
    #[default]
    Search,
    /// 图片搜索
    Images,
    /// 新闻搜索
    News,
    /// 视频搜索
    Videos,
}

impl SearchKind {
    /// 接口路径
    pub fn endpoint(self) -> &'static str {
        match self {
            SearchKind::Search => "/search",
            SearchKind::Images => "/images",
            SearchKind::News => "/news",
            SearchKind::Videos => "/videos",
        }
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SearchKind::Search => "search",
            SearchKind::Images => "images",
            SearchKind::News => "news",
            SearchKind::Videos => "videos",
        };
        write!(f, "{}", name)
    }
}

/// 时间范围过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    /// 过去一天
    #[value(name = "qdr:d")]
    Day,
    /// 过去一周
    #[value(name = "qdr:w")]
    Week,
    /// 过去一月
    #[value(name = "qdr:m")]
    Month,
    /// 过去一年
    #[value(name = "qdr:y")]
    Year,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "qdr:d",
            TimeRange::Week => "qdr:w",
            TimeRange::Month => "qdr:m",
            TimeRange::Year => "qdr:y",
        }
    }
}

/// 单次搜索请求，序列化后即为 POST 请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "q")]
    pub query: String,
    pub num: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_tbs")]
    pub tbs: Option<TimeRange>,
    #[serde(skip)]
    pub kind: SearchKind,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, kind: SearchKind) -> Self {
        Self {
            query: query.into(),
            num: 10,
            gl: None,
            hl: None,
            tbs: None,
            kind,
        }
    }
}

fn serialize_tbs<S: serde::Serializer>(tbs: &Option<TimeRange>, s: S) -> Result<S::Ok, S::Error> {
    match tbs {
        Some(range) => s.serialize_str(range.as_str()),
        None => s.serialize_none(),
    }
}

/// serper.dev 响应中本工具关心的部分
///
/// 列表为 `null` 或不是数组时按空列表处理，单条结果格式不对时按空结果处理。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    #[serde(deserialize_with = "lenient_list")]
    pub organic: Vec<OrganicResult>,
    #[serde(deserialize_with = "lenient_list")]
    pub images: Vec<ImageResult>,
    #[serde(deserialize_with = "lenient_list")]
    pub news: Vec<NewsResult>,
    #[serde(deserialize_with = "lenient_list")]
    pub videos: Vec<VideoResult>,
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// 网页结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// 图片结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageResult {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

/// 新闻结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewsResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
}

/// 视频结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub channel: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_omits_unset_filters() {
        let request = SearchRequest::new("rust async", SearchKind::News);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({ "q": "rust async", "num": 10 }));
    }

    #[test]
    fn test_request_body_with_filters() {
        let request = SearchRequest {
            gl: Some("cn".to_string()),
            hl: Some("zh-cn".to_string()),
            tbs: Some(TimeRange::Week),
            num: 5,
            ..SearchRequest::new("科技", SearchKind::Search)
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({ "q": "科技", "num": 5, "gl": "cn", "hl": "zh-cn", "tbs": "qdr:w" })
        );
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: SearchResponse = serde_json::from_value(json!({
            "searchParameters": { "q": "sunset" },
            "images": [{ "imageUrl": "https://img/1.png" }]
        }))
        .unwrap();
        assert!(response.organic.is_empty());
        assert_eq!(response.images.len(), 1);
        assert_eq!(response.images[0].image_url.as_deref(), Some("https://img/1.png"));
        assert_eq!(response.images[0].title, None);
    }

    #[test]
    fn test_response_treats_null_lists_as_empty() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"organic": null, "news": null}"#).unwrap();
        assert!(response.organic.is_empty());
        assert!(response.news.is_empty());
    }

    #[test]
    fn test_response_ignores_malformed_lists() {
        let response: SearchResponse = serde_json::from_value(json!({
            "organic": [{ "title": "Rust", "link": "https://rust-lang.org" }],
            "videos": "unavailable",
            "news": [42]
        }))
        .unwrap();
        assert_eq!(response.organic.len(), 1);
        assert!(response.videos.is_empty());
        assert_eq!(response.news.len(), 1);
        assert_eq!(response.news[0].title, None);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(SearchKind::default().endpoint(), "/search");
        assert_eq!(SearchKind::Videos.endpoint(), "/videos");
    }
}
