//! Chromeを使ったGazetteスクレイパー

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::extractor::Extractor;
use super::schema::Dataset;
use crate::config::ScraperConfig;
use crate::dom::ChromePage;
use crate::error::ScraperError;
use crate::traits::Scraper;

pub struct GazetteScraper {
    config: ScraperConfig,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Option<ChromePage>,
}

impl GazetteScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            browser: None,
            handler: None,
            page: None,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    fn get_page(&self) -> Result<&ChromePage, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".to_string()))
    }

    /// デバッグ用にページ全体のスクリーンショットをログ出力
    async fn log_screenshot(&self, page: &ChromePage) {
        match page
            .inner()
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            Ok(screenshot) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
                debug!("ページのスクリーンショット: data:image/png;base64,{}", encoded);
            }
            Err(e) => debug!("スクリーンショット取得に失敗: {}", e),
        }
    }
}

#[async_trait]
impl Scraper for GazetteScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("ブラウザを初期化中...");

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .no_sandbox()
            .request_timeout(self.config.page_load_timeout.max(Duration::from_secs(30)))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser event error: {:?}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.handler = Some(handle);
        self.page = Some(ChromePage::new(page));

        info!("ブラウザ初期化完了");
        Ok(())
    }

    async fn scrape(&mut self) -> Result<Dataset, ScraperError> {
        let page = self.get_page()?.clone();

        let dataset = Extractor::new(&self.config).run(&page).await?;

        if dataset.is_empty() && self.config.debug {
            self.log_screenshot(&page).await;
        }
        Ok(dataset)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("ブラウザを終了中...");

        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("ブラウザの終了に失敗: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("ブラウザプロセスの終了待機に失敗: {}", e);
            }
        }
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }

        info!("ブラウザ終了完了");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gazette_scraper_new() {
        let scraper = GazetteScraper::new(ScraperConfig::default().with_headless(false));
        assert!(scraper.browser.is_none());
        assert!(scraper.page.is_none());
        assert!(!scraper.config().headless);
    }

    #[tokio::test]
    async fn test_scrape_before_initialize_fails() {
        let mut scraper = GazetteScraper::new(ScraperConfig::default());
        assert!(matches!(
            scraper.scrape().await,
            Err(ScraperError::BrowserInit(_))
        ));
        // 未初期化でも close は成功する
        assert!(scraper.close().await.is_ok());
    }

    #[tokio::test]
    #[ignore] // 実環境テスト用: cargo test test_live_scrape -- --ignored --nocapture
    async fn test_live_scrape() {
        tracing_subscriber::fmt()
            .with_env_filter("info,gazette_scraper=debug")
            .init();

        let mut scraper = GazetteScraper::new(ScraperConfig::from_env());
        let dataset = scraper.execute().await.expect("scrape failed");

        println!("Rows: {}, Columns: {}", dataset.len(), dataset.headers.len());
        assert!(!dataset.headers.is_empty());
    }
}
