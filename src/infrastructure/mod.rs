//! 基础设施层
//!
//! 只有这一层接触 chromiumoxide。上层通过 [`PageDriver`] 描述"我要对页面做什么"，
//! 不关心 CDP 命令的细节。

pub mod cdp_driver;
pub mod js_executor;
pub mod keys;
pub mod locator;
pub mod page_driver;

pub use cdp_driver::CdpDriver;
pub use js_executor::JsExecutor;
pub use keys::Key;
pub use locator::{Located, Locator, LocatorChain, Role};
pub use page_driver::{locate, wait_for_element, wait_for_url, PageDriver, SessionLauncher};
