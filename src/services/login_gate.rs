//! 登录检测服务 - 业务能力层
//!
//! 只负责"是否已登录"和"等待扫码登录"两种能力，不关心发布流程

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::PublishConfig;
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::{locate, wait_for_url, Located, Locator, LocatorChain, PageDriver};

/// 登录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// 会话有效，停留在发布页
    LoggedIn,
    /// 被重定向到了登录页
    NeedsLogin,
}

/// 登录检测服务
///
/// 只通过当前 URL 判断登录状态，不读取 cookie。
pub struct LoginGate {
    login_url_fragment: String,
    login_timeout: Duration,
    login_poll: Duration,
    qr_settle: Duration,
}

impl LoginGate {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            login_url_fragment: config.login_url_fragment.clone(),
            login_timeout: config.timing.login_timeout,
            login_poll: config.timing.login_poll,
            qr_settle: config.timing.qr_settle,
        }
    }

    /// URL 是否是登录页
    pub fn is_login_page(&self, url: &str) -> bool {
        url.contains(&self.login_url_fragment)
    }

    /// 检查当前页面的登录状态
    pub async fn check<D>(&self, driver: &D) -> AppResult<LoginState>
    where
        D: PageDriver + ?Sized,
    {
        let url = driver.current_url().await?;
        debug!("当前页面: {}", url);
        if self.is_login_page(&url) {
            Ok(LoginState::NeedsLogin)
        } else {
            Ok(LoginState::LoggedIn)
        }
    }

    /// 等待用户扫码登录
    ///
    /// 先尝试切换到二维码登录（失败只记录警告），然后每隔 `login_poll`
    /// 检查一次 URL，直到离开登录页。超过 `login_timeout` 返回
    /// [`BrowserError::LoginTimeout`]。
    pub async fn await_login<D>(&self, driver: &D) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        info!("🔐 需要登录，请使用小红书 App 扫描二维码");

        if let Err(e) = self.show_qr_code(driver).await {
            warn!("⚠️ 切换二维码登录失败，请手动操作: {}", e);
        }

        info!(
            "⏳ 等待扫码登录（最长 {} 秒）...",
            self.login_timeout.as_secs()
        );
        let landed = wait_for_url(
            driver,
            |url| !self.is_login_page(url),
            self.login_timeout,
            self.login_poll,
        )
        .await?;

        match landed {
            Some(url) => {
                info!("✅ 登录成功");
                debug!("登录后页面: {}", url);
                Ok(())
            }
            None => Err(BrowserError::LoginTimeout {
                secs: self.login_timeout.as_secs(),
            }
            .into()),
        }
    }

    /// 点击登录框右上角的二维码图标
    async fn show_qr_code<D>(&self, driver: &D) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        let chain = LocatorChain::new("二维码切换", vec![Locator::PointerImage]);
        match locate(driver, &chain).await? {
            Located::Found(toggle) => {
                driver.click(&toggle).await?;
                sleep(self.qr_settle).await;
                debug!("已切换到二维码登录");
            }
            Located::NotFound => debug!("未找到二维码切换图标，可能已显示二维码"),
        }
        Ok(())
    }
}
