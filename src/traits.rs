use async_trait::async_trait;
use tracing::warn;

use crate::error::ScraperError;
use crate::gazette::Dataset;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// ページを読み込み、全セクションを抽出
    async fn scrape(&mut self) -> Result<Dataset, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → scrape → close）。失敗時も必ず close する
    async fn execute(&mut self) -> Result<Dataset, ScraperError> {
        let result = match self.initialize().await {
            Ok(()) => self.scrape().await,
            Err(e) => Err(e),
        };

        if let Err(e) = self.close().await {
            if result.is_ok() {
                return Err(e);
            }
            warn!("スクレイピング失敗後の終了処理にも失敗: {}", e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        fail_scrape: bool,
    }

    #[async_trait]
    impl Scraper for Recorder {
        async fn initialize(&mut self) -> Result<(), ScraperError> {
            self.calls.push("initialize");
            Ok(())
        }

        async fn scrape(&mut self) -> Result<Dataset, ScraperError> {
            self.calls.push("scrape");
            if self.fail_scrape {
                return Err(ScraperError::Navigation("unreachable".into()));
            }
            Ok(Dataset::default())
        }

        async fn close(&mut self) -> Result<(), ScraperError> {
            self.calls.push("close");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_execute_closes_after_success() {
        let mut scraper = Recorder::default();
        assert!(scraper.execute().await.is_ok());
        assert_eq!(scraper.calls, vec!["initialize", "scrape", "close"]);
    }

    #[tokio::test]
    async fn test_execute_closes_after_failure() {
        let mut scraper = Recorder {
            fail_scrape: true,
            ..Default::default()
        };

        let result = scraper.execute().await;

        assert!(matches!(result, Err(ScraperError::Navigation(_))));
        assert_eq!(scraper.calls, vec!["initialize", "scrape", "close"]);
    }
}
