use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::gazette::{Dataset, GazetteScraper};
use crate::output::save_csv;
use crate::traits::Scraper;

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub target_url: String,
    pub output_path: PathBuf,
    pub headless: bool,
}

impl ScrapeRequest {
    pub fn new(target_url: impl Into<String>) -> Self {
        let defaults = ScraperConfig::default();
        Self {
            target_url: target_url.into(),
            output_path: defaults.output_path,
            headless: defaults.headless,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl From<ScrapeRequest> for ScraperConfig {
    fn from(req: ScrapeRequest) -> Self {
        ScraperConfig {
            target_url: req.target_url,
            output_path: req.output_path,
            headless: req.headless,
            ..Default::default()
        }
    }
}

/// スクレイピング結果
#[derive(Debug)]
pub struct ScrapeResult {
    /// 書き出したCSV（データなしの場合は `None`）
    pub output_path: Option<PathBuf>,
    pub dataset: Dataset,
}

/// tower::Serviceを実装したスクレイパーサービス
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    /// リクエストに含まれない設定の既定値
    base_config: Option<ScraperConfig>,
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScraperConfig) -> Self {
        Self {
            base_config: Some(config),
        }
    }

    fn config_for(&self, req: ScrapeRequest) -> ScraperConfig {
        match &self.base_config {
            Some(base) => ScraperConfig {
                target_url: req.target_url,
                output_path: req.output_path,
                headless: req.headless,
                ..base.clone()
            },
            None => req.into(),
        }
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("スクレイピングリクエスト受信: url={}", req.target_url);
        let config = self.config_for(req);

        Box::pin(async move {
            let output_path = config.output_path.clone();
            let mut scraper = GazetteScraper::new(config);

            let dataset = scraper.execute().await?;
            let written = save_csv(&dataset, &output_path)?;

            info!(
                "スクレイピング完了: rows={}, columns={}",
                dataset.len(),
                dataset.headers.len()
            );

            Ok(ScrapeResult {
                output_path: written.then_some(output_path),
                dataset,
            })
        })
    }
}
