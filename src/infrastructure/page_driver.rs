//! 页面驱动抽象
//!
//! 发布流程只依赖 [`PageDriver`]，真实实现是 [`super::CdpDriver`]，
//! 测试里用记录调用序列的假驱动替换。
//!
//! 所有等待都是显式的"等待某个条件，超时即止"，见 [`wait_for_url`] 与 [`wait_for_element`]。

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::PublishConfig;
use crate::error::AppResult;
use crate::infrastructure::keys::Key;
use crate::infrastructure::locator::{Located, Locator, LocatorChain};

/// 对单个浏览器标签页的操作能力
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 元素句柄
    type Handle: Send + Sync;

    /// 导航到 `url`，超过 `timeout` 视为失败
    async fn goto(&self, url: &str, timeout: Duration) -> AppResult<()>;

    /// 当前页面地址
    async fn current_url(&self) -> AppResult<String>;

    /// 用单个策略查找元素
    async fn find(&self, locator: &Locator) -> AppResult<Option<Self::Handle>>;

    /// 点击元素
    async fn click(&self, target: &Self::Handle) -> AppResult<()>;

    /// 清空并填写输入框或可编辑区域
    async fn fill(&self, target: &Self::Handle, text: &str) -> AppResult<()>;

    /// 通过 `trigger` 打开文件选择框，一次性提交全部文件
    async fn upload_files(
        &self,
        trigger: &Self::Handle,
        files: &[PathBuf],
        chooser_timeout: Duration,
    ) -> AppResult<()>;

    /// 点击所有匹配 `selector` 的元素，返回点击数量
    async fn click_all(&self, selector: &str) -> AppResult<usize>;

    /// 在当前焦点上按键
    async fn press_key(&self, key: Key) -> AppResult<()>;

    /// 在当前焦点上逐字输入，每个字符之间等待 `delay`
    async fn type_text(&self, text: &str, delay: Duration) -> AppResult<()>;

    /// 关闭浏览器会话
    async fn close(&mut self) -> AppResult<()>;
}

/// 打开浏览器会话的能力
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Driver: PageDriver;

    async fn launch(&self, config: &PublishConfig) -> AppResult<Self::Driver>;
}

/// 按顺序尝试定位链中的每个策略，返回第一个命中
pub async fn locate<D>(driver: &D, chain: &LocatorChain) -> AppResult<Located<D::Handle>>
where
    D: PageDriver + ?Sized,
{
    for locator in &chain.locators {
        if let Some(handle) = driver.find(locator).await? {
            debug!("✓ {} 命中: {}", chain.label, locator);
            return Ok(Located::Found(handle));
        }
        debug!("{} 未命中: {}", chain.label, locator);
    }
    Ok(Located::NotFound)
}

/// 反复定位直到命中或超时
pub async fn wait_for_element<D>(
    driver: &D,
    chain: &LocatorChain,
    timeout: Duration,
    poll: Duration,
) -> AppResult<Located<D::Handle>>
where
    D: PageDriver + ?Sized,
{
    let deadline = deadline_after(timeout);
    loop {
        if let Located::Found(handle) = locate(driver, chain).await? {
            return Ok(Located::Found(handle));
        }
        if past_deadline(poll, deadline) {
            return Ok(Located::NotFound);
        }
        sleep(poll).await;
    }
}

/// 轮询当前地址直到 `predicate` 成立
///
/// 成立时返回当时的地址，超时返回 `None`。
/// 单次读取失败（例如页面正在跳转）不会中断等待。
pub async fn wait_for_url<D, F>(
    driver: &D,
    predicate: F,
    timeout: Duration,
    poll: Duration,
) -> AppResult<Option<String>>
where
    D: PageDriver + ?Sized,
    F: Fn(&str) -> bool + Send + Sync,
{
    let deadline = deadline_after(timeout);
    loop {
        match driver.current_url().await {
            Ok(url) if predicate(&url) => return Ok(Some(url)),
            Ok(_) => {}
            Err(e) => debug!("读取页面地址失败，继续等待: {}", e),
        }
        if past_deadline(poll, deadline) {
            return Ok(None);
        }
        sleep(poll).await;
    }
}

/// 超时配置过大时退化为一个很远的截止时间
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}

/// 再等一个轮询间隔是否会越过截止时间
fn past_deadline(poll: Duration, deadline: Instant) -> bool {
    Instant::now()
        .checked_add(poll)
        .map_or(true, |next| next > deadline)
}

/// 约 30 年
const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;
