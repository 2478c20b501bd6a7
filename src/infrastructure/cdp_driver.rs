//! 基于 chromiumoxide 的页面驱动

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::{BackendNodeId, SetFileInputFilesParams};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    EventFileChooserOpened, SetInterceptFileChooserDialogParams,
};
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::js_executor::{js_string, JsExecutor};
use crate::infrastructure::keys::Key;
use crate::infrastructure::locator::Locator;
use crate::infrastructure::page_driver::PageDriver;

/// 全选输入框或可编辑区域的内容，随后的 insertText 会替换选区
const SELECT_ALL_FN: &str = r#"function() {
    this.focus();
    if (typeof this.select === 'function') {
        this.select();
        return;
    }
    const range = document.createRange();
    range.selectNodeContents(this);
    const selection = window.getSelection();
    selection.removeAllRanges();
    selection.addRange(range);
}"#;

/// 浏览器会话的归属
enum Ownership {
    /// 本进程启动的浏览器，结束时整体关闭
    Launched(Browser),
    /// 连接到外部浏览器，结束时只关闭自己的标签页
    Attached(Browser),
}

/// chromiumoxide 页面驱动
///
/// 持有浏览器、唯一的标签页和后台事件循环。
pub struct CdpDriver {
    ownership: Option<Ownership>,
    executor: JsExecutor,
    handler_task: Option<JoinHandle<()>>,
    next_mark: AtomicU64,
}

impl CdpDriver {
    pub(crate) fn launched(browser: Browser, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self::new(Ownership::Launched(browser), page, handler_task)
    }

    pub(crate) fn attached(browser: Browser, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self::new(Ownership::Attached(browser), page, handler_task)
    }

    fn new(ownership: Ownership, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self {
            ownership: Some(ownership),
            executor: JsExecutor::new(page),
            handler_task: Some(handler_task),
            next_mark: AtomicU64::new(1),
        }
    }

    fn page(&self) -> &Page {
        self.executor.page()
    }

    async fn dispatch_key(&self, key: Key) -> AppResult<()> {
        let def = key.definition();
        let mut cmd = DispatchKeyEventParams::builder()
            .key(def.key)
            .code(def.code)
            .windows_virtual_key_code(def.key_code)
            .native_virtual_key_code(def.key_code);
        let down_type = match def.text {
            Some(text) => {
                cmd = cmd.text(text);
                DispatchKeyEventType::KeyDown
            }
            None => DispatchKeyEventType::RawKeyDown,
        };

        let down = cmd
            .clone()
            .r#type(down_type)
            .build()
            .map_err(BrowserError::ConfigurationFailed)?;
        let up = cmd
            .r#type(DispatchKeyEventType::KeyUp)
            .build()
            .map_err(BrowserError::ConfigurationFailed)?;

        self.page().execute(down).await?;
        self.page().execute(up).await?;
        Ok(())
    }

    async fn type_char(&self, ch: char) -> AppResult<()> {
        let text = ch.to_string();
        if !ch.is_ascii() || ch.is_ascii_control() {
            // 键盘上没有的字符直接插入
            self.page().execute(InsertTextParams::new(text)).await?;
            return Ok(());
        }

        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key(text.clone())
            .text(text.clone())
            .build()
            .map_err(BrowserError::ConfigurationFailed)?;
        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(text)
            .build()
            .map_err(BrowserError::ConfigurationFailed)?;

        self.page().execute(down).await?;
        self.page().execute(up).await?;
        Ok(())
    }

    async fn set_files(&self, backend_node_id: BackendNodeId, files: Vec<String>) -> AppResult<()> {
        let params = SetFileInputFilesParams {
            files,
            node_id: None,
            backend_node_id: Some(backend_node_id),
            object_id: None,
        };
        self.page().execute(params).await?;
        Ok(())
    }

    async fn upload_through_chooser(
        &self,
        trigger: &Element,
        files: Vec<String>,
        chooser_timeout: Duration,
    ) -> AppResult<()> {
        let mut chooser = self.page().event_listener::<EventFileChooserOpened>().await?;
        trigger.click().await?;

        let event = timeout(chooser_timeout, chooser.next())
            .await
            .map_err(|_| BrowserError::FileChooserTimeout {
                secs: chooser_timeout.as_secs(),
            })?
            .ok_or_else(|| AppError::element_not_found("文件选择框事件流已关闭"))?;

        let backend_node_id = event
            .backend_node_id
            .clone()
            .ok_or_else(|| AppError::element_not_found("文件选择框对应的 input"))?;
        debug!("文件选择框已打开: {:?}", event.mode);

        self.set_files(backend_node_id, files).await
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    type Handle = Element;

    async fn goto(&self, url: &str, nav_timeout: Duration) -> AppResult<()> {
        debug!("导航到: {}", url);
        match timeout(nav_timeout, self.page().goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(AppError::navigation_failed(url, e)),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                secs: nav_timeout.as_secs(),
            }
            .into()),
        }
    }

    async fn current_url(&self) -> AppResult<String> {
        // 读取目标信息而不是在页面里执行脚本，跳转中的页面也能读到
        self.page()
            .url()
            .await?
            .ok_or_else(|| AppError::element_not_found("页面地址"))
    }

    async fn find(&self, locator: &Locator) -> AppResult<Option<Element>> {
        let mark = format!("xhs-{}", self.next_mark.fetch_add(1, Ordering::Relaxed));
        let found: bool = self.executor.eval_as(locator.script(&mark)).await?;
        if !found {
            return Ok(None);
        }
        let element = self.page().find_element(Locator::marked_selector(&mark)).await?;
        Ok(Some(element))
    }

    async fn click(&self, target: &Element) -> AppResult<()> {
        target.click().await?;
        Ok(())
    }

    async fn fill(&self, target: &Element, text: &str) -> AppResult<()> {
        target.click().await?;
        target.call_js_fn(SELECT_ALL_FN, false).await?;
        self.page().execute(InsertTextParams::new(text)).await?;
        Ok(())
    }

    async fn upload_files(
        &self,
        trigger: &Element,
        files: &[PathBuf],
        chooser_timeout: Duration,
    ) -> AppResult<()> {
        let files: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        // 直接定位到 <input type="file"> 时不需要文件选择框
        if target_is_file_input(trigger).await? {
            debug!("直接写入文件输入框");
            return self.set_files(trigger.backend_node_id.clone(), files).await;
        }

        self.page()
            .execute(SetInterceptFileChooserDialogParams::new(true))
            .await?;
        let result = self.upload_through_chooser(trigger, files, chooser_timeout).await;
        if let Err(e) = self
            .page()
            .execute(SetInterceptFileChooserDialogParams::new(false))
            .await
        {
            warn!("恢复文件选择框失败: {}", e);
        }
        result
    }

    async fn click_all(&self, selector: &str) -> AppResult<usize> {
        let script = format!(
            r#"(() => {{
    let clicked = 0;
    document.querySelectorAll({}).forEach(el => {{
        if (typeof el.click === 'function') {{ el.click(); clicked++; }}
    }});
    return clicked;
}})()"#,
            js_string(selector)
        );
        self.executor.eval_as::<usize>(script).await
    }

    async fn press_key(&self, key: Key) -> AppResult<()> {
        debug!("按键: {}", key);
        self.dispatch_key(key).await
    }

    async fn type_text(&self, text: &str, delay: Duration) -> AppResult<()> {
        for ch in text.chars() {
            self.type_char(ch).await?;
            sleep(delay).await;
        }
        Ok(())
    }

    async fn close(&mut self) -> AppResult<()> {
        let result = match self.ownership.take() {
            Some(Ownership::Launched(mut browser)) => {
                info!("🔒 正在关闭浏览器...");
                let closed = browser.close().await.map(|_| ());
                if let Err(e) = browser.wait().await {
                    debug!("等待浏览器进程退出失败: {}", e);
                }
                closed.map_err(AppError::from)
            }
            Some(Ownership::Attached(_browser)) => {
                info!("🔒 正在关闭标签页...");
                self.page().clone().close().await.map_err(AppError::from)
            }
            None => Ok(()),
        };

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        result
    }
}

async fn target_is_file_input(element: &Element) -> AppResult<bool> {
    let tag = element
        .call_js_fn("function() { return this.tagName; }", false)
        .await?
        .result
        .value
        .and_then(|v| v.as_str().map(str::to_ascii_lowercase));
    if tag.as_deref() != Some("input") {
        return Ok(false);
    }
    Ok(element.attribute("type").await?.as_deref() == Some("file"))
}
