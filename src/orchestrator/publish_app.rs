//! 发布应用 - 编排层
//!
//! 负责一次发布的完整生命周期：校验输入 → 启动浏览器 → 执行流程 → 关闭浏览器。
//! 浏览器只在这里打开和关闭，无论流程成功还是失败都恰好关闭一次。

use tracing::{debug, warn};

use crate::config::PublishConfig;
use crate::error::AppResult;
use crate::infrastructure::{PageDriver, SessionLauncher};
use crate::models::PublishRequest;
use crate::utils::{log_outcome, log_startup};
use crate::workflow::{PublishFlow, PublishOutcome};

/// 发布应用
pub struct PublishApp<L> {
    config: PublishConfig,
    launcher: L,
}

impl<L: SessionLauncher> PublishApp<L> {
    pub fn new(config: PublishConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    /// 执行一次发布
    ///
    /// 输入错误在启动浏览器之前返回。
    pub async fn run(&self, request: PublishRequest) -> AppResult<PublishOutcome> {
        request.validate()?;
        let images = request.absolute_images()?;
        let request = PublishRequest { images, ..request };
        let flow = PublishFlow::new(&self.config)?;

        log_startup(request.images.len(), request.dry_run, &self.config.user_data_dir);

        let mut driver = self.launcher.launch(&self.config).await?;
        let result = flow.run(&driver, &request).await;

        // 关闭失败不覆盖流程本身的结果
        match driver.close().await {
            Ok(()) => debug!("浏览器已关闭"),
            Err(e) => warn!("⚠️ 关闭浏览器失败: {}", e),
        }

        if let Ok(outcome) = &result {
            log_outcome(outcome);
        }
        result
    }
}
