//! 元素定位策略
//!
//! 页面上的控件没有稳定的 id，只能靠可见文字、无障碍名称或 class 片段去找。
//! 一个 [`LocatorChain`] 是按优先级排列的若干 [`Locator`]，依次尝试，
//! 结果是 [`Located::Found`] 或 [`Located::NotFound`]。
//!
//! 每个 [`Locator`] 会生成一段 JS：找到目标后给它打上 `data-xhs-locator` 标记，
//! 驱动再用 CSS 选择器取回带标记的元素句柄。

use std::fmt;

use crate::infrastructure::js_executor::js_string;

/// 定位命中后写入的属性名
pub const MARK_ATTR: &str = "data-xhs-locator";

/// 无障碍角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Textbox,
    Button,
}

impl Role {
    /// 该角色对应的候选元素
    fn selector(self) -> &'static str {
        match self {
            Role::Textbox => {
                r#"input:not([type="hidden"]):not([type="checkbox"]):not([type="radio"]):not([type="file"]):not([type="button"]):not([type="submit"]), textarea, [contenteditable="true"], [contenteditable=""], [role="textbox"]"#
            }
            Role::Button => {
                r#"button, [role="button"], input[type="button"], input[type="submit"]"#
            }
        }
    }

    /// 计算无障碍名称的 JS 函数
    fn name_fn(self) -> &'static str {
        match self {
            Role::Textbox => {
                r#"(el) => (el.getAttribute('aria-label') || el.getAttribute('placeholder') || el.getAttribute('data-placeholder') || (el.querySelector('[data-placeholder]') || { getAttribute: () => '' }).getAttribute('data-placeholder') || el.getAttribute('title') || '').trim()"#
            }
            Role::Button => {
                r#"(el) => (el.getAttribute('aria-label') || el.innerText || el.value || el.getAttribute('title') || '').trim()"#
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Textbox => write!(f, "textbox"),
            Role::Button => write!(f, "button"),
        }
    }
}

/// 单个定位策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS 选择器，取第一个匹配
    Css(String),
    /// `scope` 范围内文字（去首尾空白后）完全等于 `text` 的第一个元素
    ExactText { scope: String, text: String },
    /// `scope` 范围内可见且文字包含 `text` 的第一个元素
    ContainsText { scope: String, text: String },
    /// 按角色和无障碍名称查找，完全匹配优先，其次包含匹配
    Role { role: Role, name: String },
    /// 页面上第 `index` 个（从 0 开始）可见的该角色元素
    RoleNth { role: Role, index: usize },
    /// 第一个鼠标样式为 pointer 的图片
    PointerImage,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn exact_text(scope: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::ExactText {
            scope: scope.into(),
            text: text.into(),
        }
    }

    pub fn contains_text(scope: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::ContainsText {
            scope: scope.into(),
            text: text.into(),
        }
    }

    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Locator::Role {
            role,
            name: name.into(),
        }
    }

    pub fn role_nth(role: Role, index: usize) -> Self {
        Locator::RoleNth { role, index }
    }

    /// 生成定位脚本，命中时把 `mark` 写入 [`MARK_ATTR`] 并返回 `true`
    pub fn script(&self, mark: &str) -> String {
        let body = match self {
            Locator::Css(selector) => {
                format!("return mark(document.querySelector({}));", js_string(selector))
            }
            Locator::ExactText { scope, text } => format!(
                "return mark(Array.from(document.querySelectorAll({})).find(el => (el.textContent || '').trim() === {}));",
                js_string(scope),
                js_string(text)
            ),
            Locator::ContainsText { scope, text } => format!(
                "return mark(Array.from(document.querySelectorAll({})).filter(visible).find(el => (el.textContent || '').includes({})));",
                js_string(scope),
                js_string(text)
            ),
            Locator::Role { role, name } => format!(
                "const nameOf = {}; const name = {}; const all = Array.from(document.querySelectorAll({})).filter(visible); \
                 return mark(all.find(el => nameOf(el) === name) || all.find(el => nameOf(el).includes(name)));",
                role.name_fn(),
                js_string(name),
                js_string(role.selector())
            ),
            Locator::RoleNth { role, index } => format!(
                "return mark(Array.from(document.querySelectorAll({})).filter(visible)[{}]);",
                js_string(role.selector()),
                index
            ),
            Locator::PointerImage => {
                "return mark(Array.from(document.querySelectorAll('img')).find(img => getComputedStyle(img).cursor === 'pointer'));"
                    .to_string()
            }
        };

        format!(
            r#"(() => {{
    const mark = (el) => {{ if (!el) return false; el.setAttribute({attr}, {mark}); return true; }};
    const visible = (el) => !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);
    {body}
}})()"#,
            attr = js_string(MARK_ATTR),
            mark = js_string(mark),
            body = body
        )
    }

    /// 取回带标记元素的 CSS 选择器
    pub fn marked_selector(mark: &str) -> String {
        format!("[{}={}]", MARK_ATTR, js_string(mark))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::ExactText { scope, text } => write!(f, "text={}:\"{}\"", scope, text),
            Locator::ContainsText { scope, text } => write!(f, "text*={}:\"{}\"", scope, text),
            Locator::Role { role, name } => write!(f, "role={}[name=\"{}\"]", role, name),
            Locator::RoleNth { role, index } => write!(f, "role={}[{}]", role, index),
            Locator::PointerImage => write!(f, "img[cursor=pointer]"),
        }
    }
}

/// 按优先级排列的定位策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorChain {
    /// 用于日志和错误信息的名称
    pub label: String,
    pub locators: Vec<Locator>,
}

impl LocatorChain {
    pub fn new(label: impl Into<String>, locators: Vec<Locator>) -> Self {
        Self {
            label: label.into(),
            locators,
        }
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.locators.iter().map(ToString::to_string).collect();
        write!(f, "{} [{}]", self.label, parts.join(" | "))
    }
}

/// 定位结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located<H> {
    Found(H),
    NotFound,
}

impl<H> Located<H> {
    pub fn found(self) -> Option<H> {
        match self {
            Located::Found(handle) => Some(handle),
            Located::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_script_marks_first_match() {
        let script = Locator::css(r#"input[type="file"]"#).script("xhs-1");
        assert!(script.contains(r#"document.querySelector("input[type=\"file\"]")"#));
        assert!(script.contains(r#"el.setAttribute("data-xhs-locator", "xhs-1")"#));
    }

    #[test]
    fn test_exact_text_script_compares_trimmed_text() {
        let script = Locator::exact_text("span, div", "上传图文").script("m");
        assert!(script.contains(r#"querySelectorAll("span, div")"#));
        assert!(script.contains(r#"(el.textContent || '').trim() === "上传图文""#));
    }

    #[test]
    fn test_role_script_prefers_exact_name() {
        let script = Locator::role(Role::Button, "发布").script("m");
        assert!(script.contains("all.find(el => nameOf(el) === name) || all.find(el => nameOf(el).includes(name))"));
        assert!(script.contains(r#"const name = "发布";"#));
    }

    #[test]
    fn test_role_nth_script_uses_index() {
        let script = Locator::role_nth(Role::Textbox, 1).script("m");
        assert!(script.contains(".filter(visible)[1]"));
    }

    #[test]
    fn test_marked_selector() {
        assert_eq!(Locator::marked_selector("xhs-7"), r#"[data-xhs-locator="xhs-7"]"#);
    }

    #[test]
    fn test_chain_display_keeps_order() {
        let chain = LocatorChain::new(
            "上传入口",
            vec![
                Locator::contains_text("button", "上传图片"),
                Locator::css(r#"[class*="upload-wrapper"]"#),
            ],
        );
        assert_eq!(
            chain.to_string(),
            r#"上传入口 [text*=button:"上传图片" | css=[class*="upload-wrapper"]]"#
        );
    }

    #[test]
    fn test_located_found() {
        let found: Located<u32> = Located::Found(3);
        assert_eq!(found.found(), Some(3));
        assert_eq!(Located::<u32>::NotFound.found(), None);
    }
}
