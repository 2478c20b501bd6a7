//! 图文发布流程 - 流程层
//!
//! 核心职责：定义"发一篇图文笔记"的完整流程
//!
//! 流程顺序：
//! 1. 打开发布页 → 检查登录（必要时等待扫码）
//! 2. 切换到图文标签 → 上传图片（主入口失败时尝试一次备用入口）
//! 3. 关闭弹窗（尽力而为）
//! 4. 填写标题、正文 → 逐个输入话题
//! 5. 点击发布（dry-run 时只保留窗口）

use std::path::PathBuf;

use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{PublishConfig, Timing};
use crate::error::{AppError, AppResult, ConfigError};
use crate::infrastructure::{
    locate, wait_for_element, Key, Located, LocatorChain, PageDriver,
};
use crate::models::PublishRequest;
use crate::services::{LoginGate, LoginState};
use crate::utils::logging::truncate_text;
use crate::workflow::attempt;
use crate::workflow::selectors;
use crate::workflow::stage::{PublishOutcome, PublishStage};

/// 图文发布流程
///
/// - 不持有浏览器，只通过 [`PageDriver`] 操作页面
/// - 任何阶段出错都直接返回，关闭浏览器由调用方负责
pub struct PublishFlow {
    publish_url: String,
    success_pattern: Regex,
    login_gate: LoginGate,
    timing: Timing,
}

impl PublishFlow {
    /// 创建新的发布流程
    pub fn new(config: &PublishConfig) -> AppResult<Self> {
        let success_pattern =
            Regex::new(&config.success_url_pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: config.success_url_pattern.clone(),
                source,
            })?;

        Ok(Self {
            publish_url: config.publish_url.clone(),
            success_pattern,
            login_gate: LoginGate::new(config),
            timing: config.timing.clone(),
        })
    }

    pub async fn run<D>(&self, driver: &D, request: &PublishRequest) -> AppResult<PublishOutcome>
    where
        D: PageDriver + ?Sized,
    {
        self.open_publish_page(driver)
            .await
            .map_err(fail_at(PublishStage::Start))?;

        self.ensure_logged_in(driver).await?;

        self.upload_images(driver, &request.images)
            .await
            .map_err(fail_at(PublishStage::Upload))?;

        self.dismiss_popups(driver).await;

        self.fill_text(driver, request)
            .await
            .map_err(fail_at(PublishStage::Fill))?;

        self.add_tags(driver, &request.tags, request.content.is_some())
            .await
            .map_err(fail_at(PublishStage::Tags))?;

        self.submit(driver, request.dry_run)
            .await
            .map_err(fail_at(PublishStage::Submit))
    }

    /// 判断 URL 是否符合发布成功特征
    pub fn is_success_url(&self, url: &str) -> bool {
        self.success_pattern.is_match(url)
    }

    async fn open_publish_page<D>(&self, driver: &D) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        info!("🌐 [{}] {}", PublishStage::Start, self.publish_url);
        driver
            .goto(&self.publish_url, self.timing.navigation_timeout)
            .await?;
        sleep(self.timing.page_settle).await;
        Ok(())
    }

    async fn ensure_logged_in<D>(&self, driver: &D) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        let state = self
            .login_gate
            .check(driver)
            .await
            .map_err(fail_at(PublishStage::CheckLogin))?;

        match state {
            LoginState::LoggedIn => {
                info!("✓ 已登录（会话已恢复）");
                Ok(())
            }
            LoginState::NeedsLogin => {
                info!("📍 [{}]", PublishStage::AwaitLogin);
                self.login_gate
                    .await_login(driver)
                    .await
                    .map_err(fail_at(PublishStage::AwaitLogin))?;
                self.open_publish_page(driver)
                    .await
                    .map_err(fail_at(PublishStage::Start))
            }
        }
    }

    async fn upload_images<D>(&self, driver: &D, images: &[PathBuf]) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        info!("📍 [{}] 共 {} 张", PublishStage::Upload, images.len());

        match locate(driver, &selectors::image_tab()).await? {
            Located::Found(tab) => {
                attempt("切换图文标签", driver.click(&tab).await);
            }
            Located::NotFound => warn!("⚠️ 未找到图文标签，继续在当前标签上传"),
        }
        sleep(self.timing.tab_settle).await;

        let primary = selectors::upload_primary();
        let uploaded = match wait_for_element(
            driver,
            &primary,
            self.timing.upload_locate_timeout,
            self.timing.element_poll,
        )
        .await?
        {
            Located::Found(trigger) => attempt(
                "通过主入口上传",
                driver
                    .upload_files(&trigger, images, self.timing.file_chooser_timeout)
                    .await,
            )
            .is_some(),
            Located::NotFound => {
                warn!("⚠️ 未找到{}，尝试备用入口", primary.label);
                false
            }
        };

        if !uploaded {
            let fallback = selectors::upload_fallback();
            let trigger = require(driver, &fallback).await?;
            driver
                .upload_files(&trigger, images, self.timing.file_chooser_timeout)
                .await?;
        }

        info!("✓ 图片已上传");
        sleep(self.timing.upload_settle).await;
        Ok(())
    }

    async fn dismiss_popups<D>(&self, driver: &D)
    where
        D: PageDriver + ?Sized,
    {
        if let Some(count) = attempt(
            "关闭弹窗",
            driver.click_all(selectors::POPUP_SELECTOR).await,
        ) {
            debug!("[{}] 点击了 {} 个元素", PublishStage::DismissPopups, count);
        }
        sleep(self.timing.popup_settle).await;
    }

    async fn fill_text<D>(&self, driver: &D, request: &PublishRequest) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        if let Some(title) = &request.title {
            info!("✏️ 填写标题: {}", title);
            let input = self.wait_required(driver, &selectors::title_input()).await?;
            driver.fill(&input, title).await?;
            sleep(self.timing.fill_settle).await;
        }

        if let Some(content) = &request.content {
            info!("✏️ 填写正文: {}", truncate_text(content, 30));
            let editor = self.wait_required(driver, &selectors::content_box()).await?;
            driver.fill(&editor, content).await?;
            sleep(self.timing.fill_settle).await;
        }

        Ok(())
    }

    /// 逐个输入话题：End → `#tag` → 等下拉框 → Enter 选中第一项
    async fn add_tags<D>(&self, driver: &D, tags: &[String], content_focused: bool) -> AppResult<()>
    where
        D: PageDriver + ?Sized,
    {
        if tags.is_empty() {
            return Ok(());
        }
        info!("🏷️ [{}] 共 {} 个", PublishStage::Tags, tags.len());

        // 话题要落在正文里，没填正文时先把焦点移过去
        if !content_focused {
            let editor = self.wait_required(driver, &selectors::content_box()).await?;
            driver.click(&editor).await?;
        }

        for tag in tags {
            debug!("输入话题: #{}", tag);
            driver.press_key(Key::End).await?;
            sleep(self.timing.tag_cursor_delay).await;
            driver
                .type_text(&format!("#{}", tag), self.timing.key_delay)
                .await?;
            sleep(self.timing.tag_dropdown_delay).await;
            driver.press_key(Key::Enter).await?;
            sleep(self.timing.tag_settle).await;
        }

        info!("✓ 话题已添加");
        Ok(())
    }

    async fn submit<D>(&self, driver: &D, dry_run: bool) -> AppResult<PublishOutcome>
    where
        D: PageDriver + ?Sized,
    {
        if dry_run {
            info!("🧪 dry-run 模式：内容已填写，不会发布");
            info!(
                "请在浏览器中检查，{} 秒后自动关闭",
                self.timing.dry_run_hold.as_secs()
            );
            sleep(self.timing.dry_run_hold).await;
            return Ok(PublishOutcome::DryRun);
        }

        info!("📤 [{}]", PublishStage::Submit);
        let button = self.wait_required(driver, &selectors::submit_button()).await?;
        driver.click(&button).await?;
        sleep(self.timing.submit_settle).await;

        let url = driver.current_url().await?;
        if self.is_success_url(&url) {
            info!("🎉 发布成功");
            Ok(PublishOutcome::Published { url })
        } else {
            warn!("⚠️ 无法确认是否发布成功，请检查浏览器: {}", url);
            Ok(PublishOutcome::Unconfirmed { url })
        }
    }

    /// 等待控件出现，超时视为错误
    async fn wait_required<D>(&self, driver: &D, chain: &LocatorChain) -> AppResult<D::Handle>
    where
        D: PageDriver + ?Sized,
    {
        wait_for_element(
            driver,
            chain,
            self.timing.element_timeout,
            self.timing.element_poll,
        )
        .await?
        .found()
        .ok_or_else(|| AppError::element_not_found(chain.to_string()))
    }
}

/// 定位一次，找不到视为错误
async fn require<D>(driver: &D, chain: &LocatorChain) -> AppResult<D::Handle>
where
    D: PageDriver + ?Sized,
{
    locate(driver, chain)
        .await?
        .found()
        .ok_or_else(|| AppError::element_not_found(chain.to_string()))
}

fn fail_at(stage: PublishStage) -> impl FnOnce(AppError) -> AppError {
    move |e| {
        error!("❌ [{}] 失败: {}", stage, e);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_url_pattern() {
        let flow = PublishFlow::new(&PublishConfig::default()).unwrap();
        assert!(flow.is_success_url("https://creator.xiaohongshu.com/publish/success"));
        assert!(flow.is_success_url("https://creator.xiaohongshu.com/publish/publish?published=true"));
        assert!(!flow.is_success_url("https://creator.xiaohongshu.com/publish/publish"));
    }

    #[test]
    fn test_invalid_success_pattern_is_config_error() {
        let config = PublishConfig {
            success_url_pattern: "(unclosed".to_string(),
            ..PublishConfig::default()
        };
        let err = PublishFlow::new(&config).err().unwrap();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::InvalidPattern { .. })
        ));
    }
}
