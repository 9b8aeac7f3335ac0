//! chromiumoxide による [`DomPage`] / [`DomElement`] 実装

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::{Element, Page};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{DomElement, DomPage};
use crate::error::ScraperError;

/// 親・兄弟要素を再検索するための目印属性
const REF_ATTR: &str = "data-gazette-ref";

static NEXT_REF: AtomicU64 = AtomicU64::new(1);

const TAG_JS: &str = "function() { return this.tagName.toLowerCase(); }";

const OWN_TEXT_JS: &str = r#"
function() {
    return Array.from(this.childNodes)
        .filter(n => n.nodeType === Node.TEXT_NODE)
        .map(n => n.textContent)
        .join('');
}
"#;

const DISPLAYED_JS: &str = r#"
function() {
    if (!this.isConnected) return false;
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') return false;
    const rect = this.getBoundingClientRect();
    return rect.width > 0 || rect.height > 0;
}
"#;

const CLICK_JS: &str = "function() { this.click(); return true; }";

#[derive(Debug, Clone)]
pub struct ChromePage {
    page: Arc<Page>,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self {
            page: Arc::new(page),
        }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    fn wrap(&self, elements: Vec<Element>) -> Vec<ChromeElement> {
        elements
            .into_iter()
            .map(|inner| ChromeElement {
                page: self.page.clone(),
                inner: Arc::new(inner),
            })
            .collect()
    }
}

#[async_trait]
impl DomPage for ChromePage {
    type Element = ChromeElement;

    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromeElement>, ScraperError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| ScraperError::Selector(format!("{}: {}", selector, e)))?;
        Ok(self.wrap(elements))
    }

    async fn source(&self) -> Result<String, ScraperError> {
        self.page
            .content()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    async fn title(&self) -> Result<Option<String>, ScraperError> {
        self.page
            .get_title()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ChromeElement {
    page: Arc<Page>,
    inner: Arc<Element>,
}

impl ChromeElement {
    /// 要素上で関数を実行し、戻り値をデシリアライズ
    async fn call<T: DeserializeOwned>(&self, function: &str) -> Result<T, ScraperError> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        if let Some(details) = returns.exception_details {
            return Err(ScraperError::JavaScript(details.text));
        }

        let value = returns.result.value.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    /// `relation`（例: `this.parentElement`）が指す要素に目印を付けて再検索する
    async fn related(&self, relation: &str) -> Result<Option<ChromeElement>, ScraperError> {
        let marker = NEXT_REF.fetch_add(1, Ordering::Relaxed);
        let function = format!(
            "function() {{ const el = {}; if (!el) return false; el.setAttribute('{}', '{}'); return true; }}",
            relation, REF_ATTR, marker
        );

        let found: bool = self.call(&function).await?;
        if !found {
            return Ok(None);
        }

        let selector = format!("[{}='{}']", REF_ATTR, marker);
        match self.page.find_element(selector.as_str()).await {
            Ok(inner) => Ok(Some(ChromeElement {
                page: self.page.clone(),
                inner: Arc::new(inner),
            })),
            Err(e) => {
                debug!("目印付き要素 {} の再検索に失敗: {}", marker, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl DomElement for ChromeElement {
    async fn text(&self) -> Result<String, ScraperError> {
        let text = self
            .inner
            .inner_text()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn own_text(&self) -> Result<String, ScraperError> {
        self.call(OWN_TEXT_JS).await
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ScraperError> {
        self.inner
            .attribute(name)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    async fn tag(&self) -> Result<String, ScraperError> {
        self.call(TAG_JS).await
    }

    async fn is_displayed(&self) -> Result<bool, ScraperError> {
        self.call(DISPLAYED_JS).await
    }

    async fn click(&self) -> Result<(), ScraperError> {
        // 見出しが画面外でも動くようにDOM側でクリックする
        let _: bool = self.call(CLICK_JS).await?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>, ScraperError> {
        let elements = self
            .inner
            .find_elements(selector)
            .await
            .map_err(|e| ScraperError::Selector(format!("{}: {}", selector, e)))?;

        Ok(elements
            .into_iter()
            .map(|inner| ChromeElement {
                page: self.page.clone(),
                inner: Arc::new(inner),
            })
            .collect())
    }

    async fn parent(&self) -> Result<Option<ChromeElement>, ScraperError> {
        self.related("this.parentElement").await
    }

    async fn next_sibling(&self) -> Result<Option<ChromeElement>, ScraperError> {
        self.related("this.nextElementSibling").await
    }
}
