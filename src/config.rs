use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// serper.dev 默认地址
pub const DEFAULT_SERPER_BASE_URL: &str = "https://google.serper.dev";
/// 小红书创作中心发布页
pub const DEFAULT_PUBLISH_URL: &str = "https://creator.xiaohongshu.com/publish/publish";
/// 登录页 URL 特征
pub const DEFAULT_LOGIN_URL_FRAGMENT: &str = "/login";

/// 发布流程中所有等待时长与超时
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// 单次导航的超时
    pub navigation_timeout: Duration,
    /// 导航完成后的等待
    pub page_settle: Duration,
    /// 等待页面控件出现的超时
    pub element_timeout: Duration,
    /// 等待控件时的轮询间隔
    pub element_poll: Duration,
    /// 扫码登录的总超时
    pub login_timeout: Duration,
    /// 登录状态轮询间隔
    pub login_poll: Duration,
    /// 点出二维码后的等待
    pub qr_settle: Duration,
    /// 切换到图文标签后的等待
    pub tab_settle: Duration,
    /// 查找主上传按钮的超时
    pub upload_locate_timeout: Duration,
    /// 等待文件选择框出现的超时
    pub file_chooser_timeout: Duration,
    /// 图片上传后的等待
    pub upload_settle: Duration,
    /// 关闭弹窗后的等待
    pub popup_settle: Duration,
    /// 填写标题/正文后的等待
    pub fill_settle: Duration,
    /// 按 End 之后、输入标签之前的等待
    pub tag_cursor_delay: Duration,
    /// 标签逐字输入的按键间隔
    pub key_delay: Duration,
    /// 等待话题下拉框出现
    pub tag_dropdown_delay: Duration,
    /// 回车选中话题后的等待
    pub tag_settle: Duration,
    /// 点击发布后的等待
    pub submit_settle: Duration,
    /// dry-run 模式下保留窗口的时间
    pub dry_run_hold: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            page_settle: Duration::from_secs(3),
            element_timeout: Duration::from_secs(10),
            element_poll: Duration::from_millis(250),
            login_timeout: Duration::from_secs(120),
            login_poll: Duration::from_secs(1),
            qr_settle: Duration::from_secs(1),
            tab_settle: Duration::from_secs(2),
            upload_locate_timeout: Duration::from_secs(5),
            file_chooser_timeout: Duration::from_secs(10),
            upload_settle: Duration::from_secs(3),
            popup_settle: Duration::from_millis(500),
            fill_settle: Duration::from_millis(500),
            tag_cursor_delay: Duration::from_millis(200),
            key_delay: Duration::from_millis(80),
            tag_dropdown_delay: Duration::from_millis(1500),
            tag_settle: Duration::from_millis(800),
            submit_settle: Duration::from_secs(3),
            dry_run_hold: Duration::from_secs(60),
        }
    }
}

/// 发布工具配置
#[derive(Clone, Debug)]
pub struct PublishConfig {
    /// 浏览器用户数据目录（保存登录状态）
    pub user_data_dir: PathBuf,
    /// 发布页 URL
    pub publish_url: String,
    /// 登录页 URL 特征
    pub login_url_fragment: String,
    /// 发布成功的 URL 特征（正则）
    pub success_url_pattern: String,
    /// 浏览器窗口大小
    pub viewport: (u32, u32),
    /// 浏览器语言
    pub locale: String,
    /// 指定浏览器可执行文件
    pub chrome_executable: Option<PathBuf>,
    /// 连接已有浏览器的调试端口，为空时自行启动浏览器
    pub debug_port: Option<u16>,
    pub timing: Timing,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            user_data_dir: default_user_data_dir(),
            publish_url: DEFAULT_PUBLISH_URL.to_string(),
            login_url_fragment: DEFAULT_LOGIN_URL_FRAGMENT.to_string(),
            success_url_pattern: "success|published=true".to_string(),
            viewport: (1400, 900),
            locale: "zh-CN".to_string(),
            chrome_executable: None,
            debug_port: None,
            timing: Timing::default(),
        }
    }
}

impl PublishConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            user_data_dir: std::env::var("XHS_USER_DATA_DIR").map(PathBuf::from).unwrap_or(default.user_data_dir),
            publish_url: std::env::var("XHS_PUBLISH_URL").unwrap_or(default.publish_url),
            chrome_executable: std::env::var("XHS_CHROME_PATH").ok().map(PathBuf::from).or(default.chrome_executable),
            debug_port: std::env::var("XHS_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).or(default.debug_port),
            ..default
        }
    }

    /// 读取环境变量后，再用 TOML 文件覆盖
    ///
    /// `path` 为空时读取 `XHS_CONFIG` 指向的文件；两者都没有时等同于 [`PublishConfig::from_env`]。
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::from_env();
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("XHS_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = path {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
            let file: PublishConfigFile = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
            config.apply(file);
        }

        Ok(config)
    }

    fn apply(&mut self, file: PublishConfigFile) {
        if let Some(dir) = file.user_data_dir {
            self.user_data_dir = dir;
        }
        if let Some(url) = file.publish_url {
            self.publish_url = url;
        }
        if let Some(fragment) = file.login_url_fragment {
            self.login_url_fragment = fragment;
        }
        if let Some(pattern) = file.success_url_pattern {
            self.success_url_pattern = pattern;
        }
        if let Some([w, h]) = file.viewport {
            self.viewport = (w, h);
        }
        if let Some(locale) = file.locale {
            self.locale = locale;
        }
        if let Some(exe) = file.chrome_executable {
            self.chrome_executable = Some(exe);
        }
        if let Some(port) = file.debug_port {
            self.debug_port = Some(port);
        }
        if let Some(timing) = file.timing {
            timing.apply(&mut self.timing);
        }
    }
}

/// 默认会话目录：~/.xhs-browser-data
fn default_user_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".xhs-browser-data")
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PublishConfigFile {
    user_data_dir: Option<PathBuf>,
    publish_url: Option<String>,
    login_url_fragment: Option<String>,
    success_url_pattern: Option<String>,
    viewport: Option<[u32; 2]>,
    locale: Option<String>,
    chrome_executable: Option<PathBuf>,
    debug_port: Option<u16>,
    timing: Option<TimingFile>,
}

/// `[timing]` 小节，单位毫秒
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TimingFile {
    navigation_timeout_ms: Option<u64>,
    page_settle_ms: Option<u64>,
    element_timeout_ms: Option<u64>,
    element_poll_ms: Option<u64>,
    login_timeout_ms: Option<u64>,
    login_poll_ms: Option<u64>,
    qr_settle_ms: Option<u64>,
    tab_settle_ms: Option<u64>,
    upload_locate_timeout_ms: Option<u64>,
    file_chooser_timeout_ms: Option<u64>,
    upload_settle_ms: Option<u64>,
    popup_settle_ms: Option<u64>,
    fill_settle_ms: Option<u64>,
    tag_cursor_delay_ms: Option<u64>,
    key_delay_ms: Option<u64>,
    tag_dropdown_delay_ms: Option<u64>,
    tag_settle_ms: Option<u64>,
    submit_settle_ms: Option<u64>,
    dry_run_hold_ms: Option<u64>,
}

impl TimingFile {
    fn apply(self, timing: &mut Timing) {
        let pairs = [
            (self.navigation_timeout_ms, &mut timing.navigation_timeout),
            (self.page_settle_ms, &mut timing.page_settle),
            (self.element_timeout_ms, &mut timing.element_timeout),
            (self.element_poll_ms, &mut timing.element_poll),
            (self.login_timeout_ms, &mut timing.login_timeout),
            (self.login_poll_ms, &mut timing.login_poll),
            (self.qr_settle_ms, &mut timing.qr_settle),
            (self.tab_settle_ms, &mut timing.tab_settle),
            (self.upload_locate_timeout_ms, &mut timing.upload_locate_timeout),
            (self.file_chooser_timeout_ms, &mut timing.file_chooser_timeout),
            (self.upload_settle_ms, &mut timing.upload_settle),
            (self.popup_settle_ms, &mut timing.popup_settle),
            (self.fill_settle_ms, &mut timing.fill_settle),
            (self.tag_cursor_delay_ms, &mut timing.tag_cursor_delay),
            (self.key_delay_ms, &mut timing.key_delay),
            (self.tag_dropdown_delay_ms, &mut timing.tag_dropdown_delay),
            (self.tag_settle_ms, &mut timing.tag_settle),
            (self.submit_settle_ms, &mut timing.submit_settle),
            (self.dry_run_hold_ms, &mut timing.dry_run_hold),
        ];
        for (value, slot) in pairs {
            if let Some(ms) = value {
                *slot = Duration::from_millis(ms);
            }
        }
    }
}

/// 搜索工具配置
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// serper.dev API Key，未设置时搜索会在发请求前失败
    pub api_key: Option<String>,
    /// API 地址
    pub base_url: String,
    /// 单次请求超时
    pub request_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SERPER_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("SERPER_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("SERPER_BASE_URL").unwrap_or(default.base_url),
            request_timeout: std::env::var("SERPER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.request_timeout),
        }
    }
}
