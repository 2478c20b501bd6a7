use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::handler::Handler;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::connection::connect_to_browser;
use crate::config::PublishConfig;
use crate::error::{AppResult, BrowserError, ConfigError};
use crate::infrastructure::{CdpDriver, SessionLauncher};

/// 启动或连接真实浏览器
///
/// 配置了调试端口时连接到已有浏览器，否则用持久化的用户数据目录启动有界面的浏览器。
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Driver = CdpDriver;

    async fn launch(&self, config: &PublishConfig) -> AppResult<CdpDriver> {
        match config.debug_port {
            Some(port) => connect_to_browser(port, config).await,
            None => launch_browser(config).await,
        }
    }
}

/// 启动有界面的浏览器，复用会话目录中的登录状态
pub async fn launch_browser(config: &PublishConfig) -> AppResult<CdpDriver> {
    info!("🚀 启动浏览器...");
    debug!("会话目录: {}", config.user_data_dir.display());

    ensure_session_dir(&config.user_data_dir)?;

    let (width, height) = config.viewport;
    let mut builder = BrowserConfig::builder()
        .with_head()
        .user_data_dir(&config.user_data_dir)
        .window_size(width, height)
        .viewport(Viewport {
            width,
            height,
            ..Default::default()
        })
        .request_timeout(config.timing.navigation_timeout)
        .args(vec![
            format!("--lang={}", config.locale),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
        ]);
    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (browser, handler) = Browser::launch(browser_config).await.map_err(|source| {
        error!("启动浏览器失败: {}", source);
        BrowserError::LaunchFailed { source }
    })?;
    debug!("浏览器启动成功");

    let handler_task = spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 持久化的会话通常会自带一个标签页，优先复用
    let page = match browser.pages().await?.into_iter().next() {
        Some(page) => page,
        None => browser.new_page("about:blank").await?,
    };

    info!("✅ 浏览器已就绪");
    Ok(CdpDriver::launched(browser, page, handler_task))
}

/// 在后台处理浏览器事件
pub(crate) fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("浏览器事件处理出错: {}", e);
            }
        }
    })
}

/// 会话目录不存在时创建
fn ensure_session_dir(path: &Path) -> AppResult<()> {
    if path.is_dir() {
        return Ok(());
    }
    info!("📁 首次运行，创建会话目录: {}", path.display());
    std::fs::create_dir_all(path).map_err(|source| ConfigError::SessionDirFailed {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_session_dir_creates_nested_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("profiles").join("xhs");
        ensure_session_dir(&dir).unwrap();
        assert!(dir.is_dir());
        // 已存在时不报错
        ensure_session_dir(&dir).unwrap();
    }

    #[test]
    fn test_ensure_session_dir_fails_on_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ensure_session_dir(&file.path().join("child")).unwrap_err();
        assert!(err.to_string().contains("无法创建会话目录"));
    }
}
