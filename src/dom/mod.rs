//! レンダリング済みDOMへのアクセス層
//!
//! 抽出ロジックはこのトレイトだけに依存する。実ブラウザ実装は [`chrome`]、
//! テストでは静的HTMLを使う `fixture` を差し込む。

pub mod chrome;
#[cfg(test)]
pub(crate) mod fixture;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::ScraperError;

pub use chrome::{ChromeElement, ChromePage};

/// DOM要素ハンドル
#[async_trait]
pub trait DomElement: Clone + Send + Sync + 'static {
    /// 表示テキスト（子孫を含む）
    async fn text(&self) -> Result<String, ScraperError>;

    /// 直下のテキストノードのみ
    async fn own_text(&self) -> Result<String, ScraperError>;

    async fn attribute(&self, name: &str) -> Result<Option<String>, ScraperError>;

    /// 小文字のタグ名
    async fn tag(&self) -> Result<String, ScraperError>;

    async fn is_displayed(&self) -> Result<bool, ScraperError>;

    async fn click(&self) -> Result<(), ScraperError>;

    /// 子孫要素をCSSセレクタで検索（文書順）
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, ScraperError>;

    async fn parent(&self) -> Result<Option<Self>, ScraperError>;

    async fn next_sibling(&self) -> Result<Option<Self>, ScraperError>;

    async fn find_first(&self, selector: &str) -> Result<Option<Self>, ScraperError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }
}

/// ページハンドル
#[async_trait]
pub trait DomPage: Send + Sync {
    type Element: DomElement;

    async fn goto(&self, url: &str) -> Result<(), ScraperError>;

    /// ページ全体をCSSセレクタで検索（文書順）
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, ScraperError>;

    /// 現在のHTMLソース
    async fn source(&self) -> Result<String, ScraperError>;

    async fn title(&self) -> Result<Option<String>, ScraperError>;
}

/// `probe` が値を返すか `timeout` を過ぎるまで `interval` 間隔で繰り返す
pub async fn poll_until<T, F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }
        if start.elapsed() >= timeout {
            return None;
        }
        sleep(interval).await;
    }
}

/// セレクタに一致する要素が現れるまで待機
pub async fn wait_for_selector<P: DomPage>(
    page: &P,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<P::Element, ScraperError> {
    let found = poll_until(timeout, interval, || async move {
        match page.query_all(selector).await {
            Ok(elements) => elements.into_iter().next(),
            Err(e) => {
                debug!("'{}' の待機中の検索に失敗: {}", selector, e);
                None
            }
        }
    })
    .await;

    found.ok_or_else(|| {
        ScraperError::Timeout(format!(
            "'{}' が {:?} 以内に見つかりません",
            selector, timeout
        ))
    })
}
