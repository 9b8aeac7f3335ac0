//! ページ全体の抽出フロー
//!
//! ページ読み込み → 年セクション検出 → セクションごとに展開・テーブル特定・パース →
//! ヘッダ確定と正規化。セクションが1つも見つからない場合は表示中のテーブルを直接読む。

use tokio::time::sleep;
use tracing::{info, warn};

use super::locator::{expand, find_table_after_expand, locate_sections, Section};
use super::schema::{Collector, Dataset};
use super::table::parse_table;
use super::types::Record;
use crate::config::ScraperConfig;
use crate::dom::{wait_for_selector, DomElement, DomPage};
use crate::error::ScraperError;

/// 年セクションがないときに読むテーブル数の上限
pub const FALLBACK_TABLE_LIMIT: usize = 3;

pub struct Extractor<'a> {
    config: &'a ScraperConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a ScraperConfig) -> Self {
        Self { config }
    }

    /// 読み込みから正規化までを実行する。ページ読み込みの失敗のみエラーとして返す
    pub async fn run<P: DomPage>(&self, page: &P) -> Result<Dataset, ScraperError> {
        self.load(page).await?;
        let collector = self.collect(page).await;
        Ok(collector.finish())
    }

    pub async fn load<P: DomPage>(&self, page: &P) -> Result<(), ScraperError> {
        info!("スクレイピング開始: {}", self.config.target_url);

        tokio::time::timeout(
            self.config.page_load_timeout,
            page.goto(&self.config.target_url),
        )
        .await
        .map_err(|_| {
            ScraperError::Timeout(format!(
                "ページ読み込みが {:?} を超過: {}",
                self.config.page_load_timeout, self.config.target_url
            ))
        })??;

        wait_for_selector(
            page,
            "body",
            self.config.element_wait_timeout,
            self.config.poll_interval,
        )
        .await?;

        Ok(())
    }

    /// 収集フェーズ。個々のセクションやテーブルの失敗はログに残して読み飛ばす
    pub async fn collect<P: DomPage>(&self, page: &P) -> Collector {
        let sections = locate_sections(page, self.config).await;
        if sections.is_empty() {
            return self.collect_fallback(page).await;
        }

        let mut collector = Collector::new();
        let total = sections.len();
        for (i, section) in sections.iter().enumerate() {
            info!("年見出し {} を処理中: '{}'", i, section.year);
            collector.extend(self.collect_section(page, section).await);

            if i + 1 < total && !self.config.delay_between_years.is_zero() {
                sleep(self.config.delay_between_years).await;
            }
        }
        collector
    }

    async fn collect_section<P: DomPage>(
        &self,
        page: &P,
        section: &Section<P::Element>,
    ) -> Vec<Record> {
        info!("年を処理中: {}", section.year);

        let expanded = expand(&section.anchor, &section.year).await;
        let Some(table) =
            find_table_after_expand(page, &section.anchor, expanded, self.config).await
        else {
            warn!("{}年のテーブルが見つかりません", section.year);
            return Vec::new();
        };

        let records = parse_table(&table, &section.year, &self.config.base_url).await;
        info!("{1}年: {0}行を抽出", records.len(), section.year);
        records
    }

    async fn collect_fallback<P: DomPage>(&self, page: &P) -> Collector {
        warn!("年見出しが見つかりません。デバッグ用にページ構造を出力...");
        self.log_page_structure(page).await;

        let mut collector = Collector::new();
        let tables = match page.query_all("table").await {
            Ok(tables) => tables,
            Err(e) => {
                warn!("テーブル一覧の取得に失敗: {}", e);
                return collector;
            }
        };

        let mut visible = Vec::new();
        for table in tables.iter() {
            match table.is_displayed().await {
                Ok(true) => visible.push(table),
                Ok(false) => {}
                Err(e) => warn!("テーブルの表示状態の確認に失敗: {}", e),
            }
        }
        info!(
            "ページ上のテーブル: {}件 (表示中 {}件)",
            tables.len(),
            visible.len()
        );

        if !visible.is_empty() {
            info!("年の紐付けなしでテーブルを処理中...");
        }
        for (i, table) in visible.into_iter().take(FALLBACK_TABLE_LIMIT).enumerate() {
            let label = format!("Table_{}", i);
            collector.extend(parse_table(table, &label, &self.config.base_url).await);
        }
        collector
    }

    async fn log_page_structure<P: DomPage>(&self, page: &P) {
        match page.title().await {
            Ok(title) => info!("ページタイトル: {}", title.unwrap_or_default()),
            Err(e) => warn!("ページタイトルの取得に失敗: {}", e),
        }

        if let Ok(Some(body)) = page.query_all("body").await.map(|b| b.into_iter().next()) {
            match body.attribute("class").await {
                Ok(class) => info!("bodyのクラス: {}", class.unwrap_or_default()),
                Err(e) => warn!("bodyのクラス取得に失敗: {}", e),
            }
        }
    }
}
