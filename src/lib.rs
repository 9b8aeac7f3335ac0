//! ASIC Gazette スクレイパーライブラリ
//!
//! 年ごとに折りたたまれたテーブルを持つページから全行を抽出し、
//! リンク数に応じて列を広げた1つのCSVにまとめる。
//!
//! # 使用例
//!
//! ```rust,ignore
//! use gazette_scraper::{ScraperService, ScrapeRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new("https://asic.gov.au/about-asic/corporate-publications/asic-gazette/asic-gazettes-2011-2020/")
//!         .with_output_path("./asic_gazettes.csv")
//!         .with_headless(true);
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("rows: {}", result.dataset.len());
//! }
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod gazette;
pub mod output;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use gazette::{Dataset, GazetteScraper, Record};
pub use service::{ScrapeRequest, ScrapeResult, ScraperService};
pub use traits::Scraper;
