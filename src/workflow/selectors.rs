//! 创作中心页面上各控件的定位链

use crate::infrastructure::{Locator, LocatorChain, Role};

/// 图文标签页的文字
pub const IMAGE_TAB_TEXT: &str = "上传图文";
/// 标题输入框的占位文字
pub const TITLE_PLACEHOLDER: &str = "填写标题会有更多赞哦";
/// 发布按钮的文字
pub const SUBMIT_TEXT: &str = "发布";
/// 需要关闭的弹窗、提示层
pub const POPUP_SELECTOR: &str = r#"[class*="close"], [class*="dismiss"], [class*="popover"] svg"#;

/// "上传图文" 标签
pub fn image_tab() -> LocatorChain {
    LocatorChain::new("图文标签", vec![Locator::exact_text("span, div", IMAGE_TAB_TEXT)])
}

/// 主上传入口
pub fn upload_primary() -> LocatorChain {
    LocatorChain::new(
        "上传入口",
        vec![
            Locator::contains_text("button", "上传图片"),
            Locator::css(r#"[class*="upload-wrapper"]"#),
            Locator::css(r#"[class*="upload-input"]"#),
        ],
    )
}

/// 主上传入口失败后的备用入口
pub fn upload_fallback() -> LocatorChain {
    LocatorChain::new(
        "备用上传入口",
        vec![
            Locator::css(r#"input[type="file"]"#),
            Locator::contains_text("button", "上传"),
        ],
    )
}

pub fn title_input() -> LocatorChain {
    LocatorChain::new(
        "标题输入框",
        vec![
            Locator::role(Role::Textbox, TITLE_PLACEHOLDER),
            Locator::css(r#"input[placeholder*="标题"]"#),
        ],
    )
}

/// 正文编辑区：页面上第二个文本框
pub fn content_box() -> LocatorChain {
    LocatorChain::new("正文编辑区", vec![Locator::role_nth(Role::Textbox, 1)])
}

pub fn submit_button() -> LocatorChain {
    LocatorChain::new("发布按钮", vec![Locator::role(Role::Button, SUBMIT_TEXT)])
}
