//! Browser automation over the Chrome DevTools Protocol
//!
//! The page façade talks to a [`PageDriver`]. [`CdpBrowser`] provides the
//! real implementation: it launches (or attaches to) a Chromium instance with
//! chromiumoxide and opens one [`CdpPage`] per scenario. DOM reads go
//! through `Runtime.evaluate`; selector and value literals are embedded as
//! JSON strings so they are always valid JavaScript.

use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserSettings;
use crate::error::{E2eError, E2eResult};

/// Where the entries of a list live in the DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLayout {
    /// Matches the element holding each entry's text
    pub item_selector: String,
    /// Matches the action control inside an entry's parent element
    pub action_selector: String,
    /// Attribute carrying the system-assigned id, on the item or its parent
    pub id_attribute: String,
}

/// A list entry as rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub index: usize,
    pub text: String,
    pub id: Option<String>,
    pub visible: bool,
}

/// How to address a single list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKey {
    Id(String),
    Index(usize),
}

/// DOM reads and actions needed by the page façade
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Replace the value of the first element matching `selector`
    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> E2eResult<()>;

    async fn is_disabled(&self, selector: &str) -> E2eResult<bool>;

    async fn count(&self, selector: &str) -> E2eResult<usize>;

    async fn rows(&self, layout: &ListLayout) -> E2eResult<Vec<ListRow>>;

    async fn click_row_action(&self, layout: &ListLayout, key: &RowKey) -> E2eResult<()>;

    async fn close(&self) -> E2eResult<()>;
}

/// Opens a fresh page for each scenario
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn open(&self) -> E2eResult<Arc<dyn PageDriver>>;
}

/// A Chromium instance driven over CDP
pub struct CdpBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl CdpBrowser {
    /// Attach to `settings.cdp_url` if set, otherwise launch a local Chromium
    pub async fn start(settings: &BrowserSettings) -> E2eResult<Self> {
        let (browser, mut handler) = match &settings.cdp_url {
            Some(url) => {
                info!("Connecting to browser at {}", url);
                Browser::connect(url.as_str()).await?
            }
            None => {
                let mut builder = BrowserConfig::builder()
                    .window_size(settings.window_width, settings.window_height);
                if !settings.headless {
                    builder = builder.with_head();
                }
                let config = builder.build().map_err(E2eError::Browser)?;
                info!(
                    "Launching Chromium ({}x{}, headless: {})",
                    settings.window_width, settings.window_height, settings.headless
                );
                Browser::launch(config).await?
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler event error: {}", e);
                }
            }
        });

        Ok(Self { browser, handler })
    }

    pub async fn new_page(&self) -> E2eResult<CdpPage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(CdpPage { page })
    }

    /// Close the browser and stop the event handler
    pub async fn shutdown(mut self) -> E2eResult<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl DriverFactory for CdpBrowser {
    async fn open(&self) -> E2eResult<Arc<dyn PageDriver>> {
        Ok(Arc::new(self.new_page().await?))
    }
}

/// One browser tab
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> E2eResult<T> {
        let result = self.page.evaluate(script).await?;
        Ok(result.into_value()?)
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("goto {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        let found: bool = self.eval(fill_script(selector, value)?).await?;
        if found {
            Ok(())
        } else {
            Err(E2eError::ElementNotFound(selector.to_string()))
        }
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| E2eError::ElementNotFound(format!("{} ({})", selector, e)))?;
        element.click().await?;
        Ok(())
    }

    async fn is_disabled(&self, selector: &str) -> E2eResult<bool> {
        let result = self.page.evaluate(disabled_script(selector)?).await?;
        disabled_state(result.value())?
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        self.eval(count_script(selector)?).await
    }

    async fn rows(&self, layout: &ListLayout) -> E2eResult<Vec<ListRow>> {
        let json: String = self.eval(rows_script(layout)?).await?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn click_row_action(&self, layout: &ListLayout, key: &RowKey) -> E2eResult<()> {
        let clicked: bool = self.eval(row_action_script(layout, key)?).await?;
        if clicked {
            Ok(())
        } else {
            Err(E2eError::ElementNotFound(format!(
                "{} for row {:?}",
                layout.action_selector, key
            )))
        }
    }

    async fn close(&self) -> E2eResult<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}

/// JSON string literal, which is also a valid JavaScript literal
fn js(value: &str) -> E2eResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn fill_script(selector: &str, value: &str) -> E2eResult<String> {
    Ok(format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return false;
  const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value');
  if (desc && desc.set) {{ desc.set.call(el, {val}); }} else {{ el.value = {val}; }}
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()"#,
        sel = js(selector)?,
        val = js(value)?,
    ))
}

fn disabled_script(selector: &str) -> E2eResult<String> {
    Ok(format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return null;
  return !!el.disabled || el.getAttribute('aria-disabled') === 'true';
}})()"#,
        sel = js(selector)?,
    ))
}

/// `null` (or no value at all) from the disabled script means the element is missing
fn disabled_state(value: Option<&serde_json::Value>) -> E2eResult<Option<bool>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
    }
}

fn count_script(selector: &str) -> E2eResult<String> {
    Ok(format!("document.querySelectorAll({}).length", js(selector)?))
}

// Shared by the rows and row action scripts: id of an item element
const ROW_ID_FN: &str = "const rowId = (el, attr) => el.getAttribute(attr) \
    || (el.parentElement ? el.parentElement.getAttribute(attr) : null);";

fn rows_script(layout: &ListLayout) -> E2eResult<String> {
    Ok(format!(
        r#"(() => {{
  {row_id}
  const items = Array.from(document.querySelectorAll({items}));
  return JSON.stringify(items.map((el, index) => {{
    const style = window.getComputedStyle(el);
    const visible = style.display !== 'none'
      && style.visibility !== 'hidden'
      && el.getClientRects().length > 0;
    return {{ index, text: (el.textContent || '').trim(), id: rowId(el, {attr}), visible }};
  }}));
}})()"#,
        row_id = ROW_ID_FN,
        items = js(&layout.item_selector)?,
        attr = js(&layout.id_attribute)?,
    ))
}

fn row_action_script(layout: &ListLayout, key: &RowKey) -> E2eResult<String> {
    Ok(format!(
        r#"(() => {{
  {row_id}
  const items = Array.from(document.querySelectorAll({items}));
  const key = {key};
  const el = key.id !== undefined
    ? items.find((item) => rowId(item, {attr}) === key.id)
    : items[key.index];
  if (!el || !el.parentElement) return false;
  const action = el.parentElement.querySelector({action})
    || el.parentElement.querySelector('button');
  if (!action) return false;
  action.click();
  return true;
}})()"#,
        row_id = ROW_ID_FN,
        items = js(&layout.item_selector)?,
        attr = js(&layout.id_attribute)?,
        key = serde_json::to_string(key)?,
        action = js(&layout.action_selector)?,
    ))
}
