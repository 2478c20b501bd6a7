use chromiumoxide::Browser;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::launcher::spawn_handler;
use crate::config::PublishConfig;
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::CdpDriver;

/// 连接到已开启远程调试的浏览器，并准备一个发布用的标签页
///
/// 已经打开发布页的标签页会被复用，否则新建一个空白标签页。
/// 会话状态由外部浏览器自己的用户数据目录决定。
pub async fn connect_to_browser(port: u16, config: &PublishConfig) -> AppResult<CdpDriver> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|source| {
        error!("连接浏览器失败: {}", source);
        BrowserError::ConnectionFailed { port, source }
    })?;
    debug!("浏览器连接成功");

    let handler_task = spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    for page in pages {
        if let Ok(Some(url)) = page.url().await {
            debug!("检查页面: {}", url);
            if url.starts_with(&config.publish_url) {
                info!("✓ 复用已打开的发布页");
                return Ok(CdpDriver::attached(browser, page, handler_task));
            }
        }
    }

    debug!("未找到发布页，创建新页面");
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;

    Ok(CdpDriver::attached(browser, page, handler_task))
}
