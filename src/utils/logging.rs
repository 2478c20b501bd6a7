/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::workflow::PublishOutcome;

/// 日志输出位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// 发布工具：进度信息直接输出到终端
    Stdout,
    /// 搜索工具：stdout 留给搜索结果
    Stderr,
}

/// 初始化日志
///
/// 设置了 `RUST_LOG` 时以它为准；否则使用 `default_level`，
/// `verbose` 时本 crate 提升到 debug。
///
/// # 参数
/// - `default_level`: 默认日志级别，如 `"info"`
/// - `verbose`: 是否输出调试信息
/// - `target`: 输出位置
pub fn init(default_level: &str, verbose: bool, target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(format!("xhs_tools=debug,{}", default_level))
        } else {
            EnvFilter::new(default_level)
        }
    });

    let layer = fmt::layer().with_target(false);
    let result = match target {
        LogTarget::Stdout => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_writer(std::io::stdout))
            .try_init(),
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(layer.without_time().with_writer(std::io::stderr))
            .try_init(),
    };
    // 重复初始化（例如测试中）时保留已有的订阅者
    let _ = result;
}

/// 记录程序启动信息
///
/// # 参数
/// - `image_count`: 图片数量
/// - `dry_run`: 是否 dry-run
/// - `user_data_dir`: 会话目录
pub fn log_startup(image_count: usize, dry_run: bool, user_data_dir: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 小红书图文发布 - {}", now());
    info!("🖼️ 图片数量: {}", image_count);
    info!("📁 会话目录: {}", user_data_dir.display());
    if dry_run {
        info!("🧪 dry-run 模式：只填写，不发布");
    }
    info!("{}", "=".repeat(60));
}

/// 记录最终结果
pub fn log_outcome(outcome: &PublishOutcome) {
    info!("\n{}", "=".repeat(60));
    match outcome {
        PublishOutcome::Published { url } => info!("✅ {} ({})", outcome, url),
        PublishOutcome::Unconfirmed { url } => warn!("⚠️ {} ({})", outcome, url),
        PublishOutcome::DryRun => info!("✅ {}", outcome),
    }
    info!("完成时间: {}", now());
    info!("{}", "=".repeat(60));
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("温暖的光影", 2), "温暖...");
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exact", 5), "exact");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init("info", false, LogTarget::Stderr);
        init("warn", true, LogTarget::Stdout);
    }
}
