use gazette_scraper::{ScrapeRequest, ScraperConfig, ScraperService};
use tower::Service;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ScraperConfig::from_env();
    let request = ScrapeRequest::new(config.target_url.clone())
        .with_output_path(config.output_path.clone())
        .with_headless(config.headless);

    let mut service = ScraperService::with_config(config);
    match service.call(request).await {
        Ok(result) => {
            match result.output_path {
                Some(path) => info!("スクレイピング完了: {}", path.display()),
                None => info!("スクレイピング完了 (データなし)"),
            }
            Ok(())
        }
        Err(e) => {
            error!("スクレイピング失敗: {}", e);
            Err(e.into())
        }
    }
}
