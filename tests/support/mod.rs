//! 测试用的假浏览器
//!
//! `MockDriver` 记录每一次页面操作，按配置模拟登录跳转、缺失控件和上传失败。

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use xhs_tools::error::{AppError, AppResult, BrowserError};
use xhs_tools::infrastructure::{Key, Locator, PageDriver, SessionLauncher};
use xhs_tools::PublishConfig;

pub const PUBLISH_URL: &str = "https://creator.xiaohongshu.com/publish/publish";
pub const LOGIN_URL: &str = "https://creator.xiaohongshu.com/login?redirectReason=401";
pub const SUCCESS_URL: &str = "https://creator.xiaohongshu.com/publish/success";

/// 页面上发生的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Goto(String),
    Click(String),
    Fill(String, String),
    Upload(String, usize),
    UploadFailed(String),
    ClickAll(String),
    Key(Key),
    Type(String),
    Close,
}

/// 假浏览器的共享状态
#[derive(Default)]
pub struct MockState {
    events: Mutex<Vec<Event>>,
    url: Mutex<String>,
    /// 需要登录时，第几次读取 URL 后视为扫码成功；`None` 表示永远不登录
    login_after_polls: Mutex<Option<usize>>,
    needs_login: Mutex<bool>,
    /// 定位描述中包含这些片段的控件不存在
    missing: Vec<String>,
    /// 通过这些控件上传会失败
    failing_uploads: Vec<String>,
    fail_click_all: bool,
    /// 第几次（从 0 开始）读取 URL 时失败，模拟页面跳转中的瞬时错误
    failing_url_read: Option<usize>,
    url_reads: AtomicUsize,
    post_submit_url: Option<String>,
    closes: AtomicUsize,
}

impl MockState {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn clicked(&self, fragment: &str) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, Event::Click(target) if target.contains(fragment)))
    }

    pub fn uploads(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Upload(..) | Event::UploadFailed(_)))
            .collect()
    }

    pub fn url_reads(&self) -> usize {
        self.url_reads.load(Ordering::SeqCst)
    }

    pub fn gotos(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Goto(_)))
            .count()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn is_missing(&self, description: &str) -> bool {
        self.missing.iter().any(|m| description.contains(m.as_str()))
    }
}

/// 记录操作的假页面驱动
pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    /// 会话有效，直接进入发布页
    pub fn logged_in() -> Self {
        Self {
            state: Arc::new(MockState::default()),
        }
    }

    /// 会话失效，读取 `after_polls` 次 URL 后扫码成功
    pub fn needs_login(after_polls: Option<usize>) -> Self {
        let state = MockState {
            login_after_polls: Mutex::new(after_polls),
            needs_login: Mutex::new(true),
            ..MockState::default()
        };
        Self {
            state: Arc::new(state),
        }
    }

    pub fn missing(mut self, fragment: &str) -> Self {
        self.state_mut().missing.push(fragment.to_string());
        self
    }

    pub fn failing_upload(mut self, fragment: &str) -> Self {
        self.state_mut().failing_uploads.push(fragment.to_string());
        self
    }

    pub fn failing_click_all(mut self) -> Self {
        self.state_mut().fail_click_all = true;
        self
    }

    pub fn failing_url_read(mut self, index: usize) -> Self {
        self.state_mut().failing_url_read = Some(index);
        self
    }

    pub fn after_submit(mut self, url: &str) -> Self {
        self.state_mut().post_submit_url = Some(url.to_string());
        self
    }

    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }

    fn state_mut(&mut self) -> &mut MockState {
        Arc::get_mut(&mut self.state).expect("配置 MockDriver 时状态不应被共享")
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    type Handle = String;

    async fn goto(&self, url: &str, _timeout: Duration) -> AppResult<()> {
        self.state.record(Event::Goto(url.to_string()));
        let landed = if *self.state.needs_login.lock().unwrap() {
            LOGIN_URL.to_string()
        } else {
            url.to_string()
        };
        *self.state.url.lock().unwrap() = landed;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<String> {
        let read = self.state.url_reads.fetch_add(1, Ordering::SeqCst);
        if self.state.failing_url_read == Some(read) {
            return Err(BrowserError::ScriptExecutionFailed(CdpError::ChromeMessage(
                "Execution context was destroyed".to_string(),
            ))
            .into());
        }
        let mut needs_login = self.state.needs_login.lock().unwrap();
        if *needs_login {
            let mut polls = self.state.login_after_polls.lock().unwrap();
            if let Some(left) = polls.as_mut() {
                if *left == 0 {
                    *needs_login = false;
                    *self.state.url.lock().unwrap() = PUBLISH_URL.to_string();
                } else {
                    *left -= 1;
                }
            }
        }
        Ok(self.state.url.lock().unwrap().clone())
    }

    async fn find(&self, locator: &Locator) -> AppResult<Option<String>> {
        let description = locator.to_string();
        if self.state.is_missing(&description) {
            Ok(None)
        } else {
            Ok(Some(description))
        }
    }

    async fn click(&self, target: &String) -> AppResult<()> {
        self.state.record(Event::Click(target.clone()));
        if target.contains("发布") {
            if let Some(url) = &self.state.post_submit_url {
                *self.state.url.lock().unwrap() = url.clone();
            }
        }
        Ok(())
    }

    async fn fill(&self, target: &String, text: &str) -> AppResult<()> {
        self.state.record(Event::Fill(target.clone(), text.to_string()));
        Ok(())
    }

    async fn upload_files(
        &self,
        trigger: &String,
        files: &[PathBuf],
        chooser_timeout: Duration,
    ) -> AppResult<()> {
        if self
            .state
            .failing_uploads
            .iter()
            .any(|f| trigger.contains(f.as_str()))
        {
            self.state.record(Event::UploadFailed(trigger.clone()));
            return Err(BrowserError::FileChooserTimeout {
                secs: chooser_timeout.as_secs(),
            }
            .into());
        }
        self.state.record(Event::Upload(trigger.clone(), files.len()));
        Ok(())
    }

    async fn click_all(&self, selector: &str) -> AppResult<usize> {
        self.state.record(Event::ClickAll(selector.to_string()));
        if self.state.fail_click_all {
            return Err(AppError::element_not_found(selector));
        }
        Ok(2)
    }

    async fn press_key(&self, key: Key) -> AppResult<()> {
        self.state.record(Event::Key(key));
        Ok(())
    }

    async fn type_text(&self, text: &str, _delay: Duration) -> AppResult<()> {
        self.state.record(Event::Type(text.to_string()));
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        self.state.record(Event::Close);
        Ok(())
    }
}

/// 交出预先准备好的 `MockDriver`，并统计启动次数
pub struct MockLauncher {
    driver: Mutex<Option<MockDriver>>,
    launches: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(driver: MockDriver) -> Self {
        Self {
            driver: Mutex::new(Some(driver)),
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn launches(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.launches)
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self, _config: &PublishConfig) -> AppResult<MockDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.driver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AppError::element_not_found("浏览器已经启动过"))
    }
}

/// 测试用配置：会话目录放在临时目录里
pub fn test_config(dir: &tempfile::TempDir) -> PublishConfig {
    PublishConfig {
        user_data_dir: dir.path().join("session"),
        publish_url: PUBLISH_URL.to_string(),
        ..PublishConfig::default()
    }
}

/// 在临时目录中创建一张假图片
pub fn image_fixture(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();
    path
}
