use thiserror::Error;

/// 错误类别
///
/// 决定错误在命令行上的呈现方式。两类错误的退出码都是 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 用户输入错误：在任何网络/浏览器操作之前被拒绝
    UserInput,
    /// 运行时操作错误：HTTP 失败、导航超时、元素未找到等
    Operation,
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 用户输入错误
    #[error(transparent)]
    Input(#[from] InputError),
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// API 调用错误
    #[error(transparent)]
    Api(#[from] ApiError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 用户输入错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 没有提供搜索关键词
    #[error("No query provided. Use --help for usage.")]
    MissingQuery,
    /// 缺少 API Key 环境变量
    #[error("{var} environment variable is not set.")]
    MissingApiKey { var: String },
    /// 没有提供图片
    #[error("at least one --image is required. Use --help for usage.")]
    NoImages,
    /// 图片文件不存在
    #[error("image file not found: {path}")]
    ImageNotFound { path: String },
    /// 标题超长
    #[error("标题长度 {len} 超过上限 {max}")]
    TitleTooLong { len: usize, max: usize },
    /// 正文超长
    #[error("正文长度 {len} 超过上限 {max}")]
    ContentTooLong { len: usize, max: usize },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 导航超时
    #[error("导航到 {url} 超时 ({secs} 秒)")]
    NavigationTimeout { url: String, secs: u64 },
    /// 元素未找到
    #[error("未找到元素: {what}")]
    ElementNotFound { what: String },
    /// 文件选择框未出现
    #[error("等待文件选择框超时 ({secs} 秒)")]
    FileChooserTimeout { secs: u64 },
    /// 扫码登录超时
    #[error("登录超时 ({secs} 秒)，请重试")]
    LoginTimeout { secs: u64 },
    /// 执行脚本或 CDP 命令失败
    #[error("执行脚本失败: {0}")]
    ScriptExecutionFailed(#[from] chromiumoxide::error::CdpError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非 2xx 状态
    #[error("API error: {status} {reason}")]
    BadStatus { status: u16, reason: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 会话目录无法创建
    #[error("无法创建会话目录 {path}: {source}")]
    SessionDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// URL 匹配规则不是合法的正则
    #[error("无效的正则表达式 {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建元素未找到错误
    pub fn element_not_found(what: impl Into<String>) -> Self {
        AppError::Browser(BrowserError::ElementNotFound { what: what.into() })
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建导航失败错误
    pub fn navigation_failed(url: impl Into<String>, source: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source,
        })
    }

    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Input(_) => ErrorKind::UserInput,
            _ => ErrorKind::Operation,
        }
    }

    /// 进程退出码
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// 把错误及其 source 链拼成一行
///
/// 外层消息已经包含内层消息时跳过内层，避免重复输出。
pub fn report(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = String::new();
    for cause in std::iter::successors(Some(err), |e| e.source()) {
        let text = cause.to_string();
        if message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    message
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
