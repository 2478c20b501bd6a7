use std::fmt;

/// 发布流程的阶段
///
/// 只用于日志和错误上下文，流程本身是顺序执行的。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Start,
    CheckLogin,
    AwaitLogin,
    Upload,
    DismissPopups,
    Fill,
    Tags,
    Submit,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStage::Start => "打开发布页",
            PublishStage::CheckLogin => "检查登录",
            PublishStage::AwaitLogin => "等待扫码登录",
            PublishStage::Upload => "上传图片",
            PublishStage::DismissPopups => "关闭弹窗",
            PublishStage::Fill => "填写标题正文",
            PublishStage::Tags => "添加话题",
            PublishStage::Submit => "发布",
        };
        f.write_str(name)
    }
}

/// 发布结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// 点击发布后 URL 符合成功特征
    Published { url: String },
    /// 已点击发布，但无法从 URL 确认成功
    Unconfirmed { url: String },
    /// dry-run：内容已填写，未点击发布
    DryRun,
}

impl PublishOutcome {
    /// 是否确认发布成功
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Published { .. } => f.write_str("发布成功"),
            PublishOutcome::Unconfirmed { .. } => f.write_str("无法确认是否发布成功，请检查浏览器"),
            PublishOutcome::DryRun => f.write_str("dry-run：内容已填写，未发布"),
        }
    }
}
