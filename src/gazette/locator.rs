//! 年セクションの検出と、セクションに対応するテーブルの特定
//!
//! どちらも「先に結果を返した戦略が勝ち」のカスケードで、後段は前段が空のときだけ試す。

use std::ops::RangeInclusive;

use tracing::{debug, info, warn};

use super::text::clean_text;
use crate::config::ScraperConfig;
use crate::dom::{poll_until, DomElement, DomPage};
use crate::error::ScraperError;

/// 年見出しになりうる操作要素（アコーディオン、折りたたみトグル、ページ内リンク）
pub const TOGGLE_SELECTORS: [&str; 8] = [
    "button[aria-expanded]",
    ".accordion-button",
    ".year-header",
    "h2 button",
    "h3 button",
    "[data-bs-toggle='collapse']",
    "[data-toggle='collapse']",
    "a[href*='#']",
];

/// 展開後のコンテンツ領域
pub const CONTENT_SELECTORS: [&str; 4] = [
    "[id*='collapse']",
    "[class*='collapse']",
    "[class*='accordion-content']",
    "[class*='content']",
];

const STRUCTURE_KEYWORD: &str = "accordion";
const STRUCTURE_SELECTOR: &str = "[class*='accordion']";
const SIBLING_SCAN_LIMIT: usize = 5;

pub const UNKNOWN_YEAR: &str = "Unknown";

/// 年ラベル付きのセクション
#[derive(Debug, Clone)]
pub struct Section<E> {
    pub year: String,
    pub anchor: E,
}

/// 年見出しの検出戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// 操作要素のうち年トークンを含むもの
    ToggleSelectors,
    /// テキスト全体が範囲内の4桁の年である要素
    ExactYearText,
    /// アコーディオン構造内で "20" を含む要素
    StructuralKeyword,
}

impl AnchorStrategy {
    pub const CASCADE: [AnchorStrategy; 3] = [
        AnchorStrategy::ToggleSelectors,
        AnchorStrategy::ExactYearText,
        AnchorStrategy::StructuralKeyword,
    ];

    pub async fn discover<P: DomPage>(
        self,
        page: &P,
        config: &ScraperConfig,
    ) -> Result<Vec<P::Element>, ScraperError> {
        match self {
            AnchorStrategy::ToggleSelectors => by_toggle_selectors(page, config).await,
            AnchorStrategy::ExactYearText => by_exact_year_text(page, &config.year_scan_range).await,
            AnchorStrategy::StructuralKeyword => by_structural_keyword(page).await,
        }
    }
}

async fn by_toggle_selectors<P: DomPage>(
    page: &P,
    config: &ScraperConfig,
) -> Result<Vec<P::Element>, ScraperError> {
    let tokens = config.year_token_strings();

    for selector in TOGGLE_SELECTORS {
        let candidates = match page.query_all(selector).await {
            Ok(candidates) => candidates,
            Err(e) => {
                debug!("セレクタ '{}' の検索に失敗: {}", selector, e);
                continue;
            }
        };

        let mut matched = Vec::new();
        for element in candidates {
            let text = match element.text().await {
                Ok(text) => clean_text(&text),
                Err(e) => {
                    debug!("'{}' の要素を読み取れないためスキップ: {}", selector, e);
                    continue;
                }
            };
            if tokens.iter().any(|t| text.contains(t.as_str())) {
                matched.push(element);
            }
        }

        if !matched.is_empty() {
            info!(
                "年見出しを{}件検出 (セレクタ: {})",
                matched.len(),
                selector
            );
            return Ok(matched);
        }
    }

    Ok(Vec::new())
}

async fn by_exact_year_text<P: DomPage>(
    page: &P,
    range: &RangeInclusive<u16>,
) -> Result<Vec<P::Element>, ScraperError> {
    info!("クリック可能な年見出しなし、年テキストを検索中...");

    let mut matched = Vec::new();
    for element in page.query_all("body *").await? {
        // 直下にテキストを持つ要素だけを見る（親要素の重複ヒットを避ける）
        if clean_text(&element.own_text().await?).is_empty() {
            continue;
        }
        if is_year_in_range(&clean_text(&element.text().await?), range) {
            matched.push(element);
        }
    }

    info!("年テキストの要素を{}件検出", matched.len());
    Ok(matched)
}

async fn by_structural_keyword<P: DomPage>(page: &P) -> Result<Vec<P::Element>, ScraperError> {
    info!("ページソースからアコーディオン構造を検索中...");

    if !page.source().await?.to_lowercase().contains(STRUCTURE_KEYWORD) {
        return Ok(Vec::new());
    }

    let mut matched = Vec::new();
    for container in page.query_all(STRUCTURE_SELECTOR).await? {
        for element in container.find_all("*").await? {
            if element.own_text().await?.contains("20") {
                matched.push(element);
            }
        }
    }

    info!("アコーディオン内の要素を{}件検出", matched.len());
    Ok(matched)
}

/// 4桁の数字で、かつ範囲内の年か
pub fn is_year_in_range(text: &str, range: &RangeInclusive<u16>) -> bool {
    text.len() == 4
        && text.chars().all(|c| c.is_ascii_digit())
        && text.parse::<u16>().map(|y| range.contains(&y)).unwrap_or(false)
}

/// 見出しテキストに含まれる最初の年トークン。なければ `"Unknown"`
pub fn year_label(text: &str, tokens: &[String]) -> String {
    tokens
        .iter()
        .find(|t| text.contains(t.as_str()))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

/// 年見出しを検出し、それぞれに年ラベルを付ける
pub async fn locate_sections<P: DomPage>(
    page: &P,
    config: &ScraperConfig,
) -> Vec<Section<P::Element>> {
    let mut anchors = Vec::new();
    for strategy in AnchorStrategy::CASCADE {
        match strategy.discover(page, config).await {
            Ok(found) if !found.is_empty() => {
                debug!("見出し検出 {:?}: {}件", strategy, found.len());
                anchors = found;
                break;
            }
            Ok(_) => {}
            Err(e) => warn!("見出し検出 {:?} に失敗: {}", strategy, e),
        }
    }

    let tokens = config.year_token_strings();
    let mut sections = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        let text = match anchor.text().await {
            Ok(text) => clean_text(&text),
            Err(e) => {
                warn!("年見出しのテキスト取得に失敗: {}", e);
                String::new()
            }
        };
        sections.push(Section {
            year: year_label(&text, &tokens),
            anchor,
        });
    }
    sections
}

/// 折りたたまれている見出しをクリックする。クリックした場合 `true`
pub async fn expand<E: DomElement>(anchor: &E, year: &str) -> bool {
    match anchor.attribute("aria-expanded").await {
        Ok(Some(state)) if state == "false" => {
            info!("年セクションを展開: {}", year);
            match anchor.click().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("年見出しのクリックに失敗: {}", e);
                    false
                }
            }
        }
        Ok(_) => false,
        Err(e) => {
            warn!("展開状態の取得に失敗: {}", e);
            false
        }
    }
}

/// 見出しに対応するテーブルの探索戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStrategy {
    /// 親要素の子孫
    ParentContainer,
    /// 後続の兄弟要素
    NextSibling,
    /// 表示中の展開コンテンツ内
    ExpandedContent,
    /// ページ上で最初に表示されているテーブル
    FirstVisible,
}

impl TableStrategy {
    pub const CASCADE: [TableStrategy; 4] = [
        TableStrategy::ParentContainer,
        TableStrategy::NextSibling,
        TableStrategy::ExpandedContent,
        TableStrategy::FirstVisible,
    ];

    /// 見出しの位置に基づく戦略のみ
    pub const ANCHORED: [TableStrategy; 3] = [
        TableStrategy::ParentContainer,
        TableStrategy::NextSibling,
        TableStrategy::ExpandedContent,
    ];

    pub async fn find<P: DomPage>(
        self,
        page: &P,
        anchor: &P::Element,
    ) -> Result<Option<P::Element>, ScraperError> {
        match self {
            TableStrategy::ParentContainer => match anchor.parent().await? {
                Some(parent) => parent.find_first("table").await,
                None => Ok(None),
            },
            TableStrategy::NextSibling => {
                let mut current = anchor.clone();
                for _ in 0..SIBLING_SCAN_LIMIT {
                    current = match current.next_sibling().await? {
                        Some(next) => next,
                        None => break,
                    };
                    if current.tag().await? == "table" {
                        return Ok(Some(current));
                    }
                }
                Ok(None)
            }
            TableStrategy::ExpandedContent => {
                for selector in CONTENT_SELECTORS {
                    for area in page.query_all(selector).await? {
                        if !area.is_displayed().await? {
                            continue;
                        }
                        if let Some(table) = area.find_first("table").await? {
                            return Ok(Some(table));
                        }
                    }
                }
                Ok(None)
            }
            TableStrategy::FirstVisible => {
                for table in page.query_all("table").await? {
                    if table.is_displayed().await? {
                        return Ok(Some(table));
                    }
                }
                Ok(None)
            }
        }
    }
}

/// 指定した戦略を順に試し、最初に見つかったテーブルを返す
pub async fn find_table_with<P: DomPage>(
    page: &P,
    anchor: &P::Element,
    strategies: &[TableStrategy],
) -> Option<P::Element> {
    for strategy in strategies {
        match strategy.find(page, anchor).await {
            Ok(Some(table)) => {
                debug!("テーブル検出: {:?}", strategy);
                return Some(table);
            }
            Ok(None) => {}
            Err(e) => debug!("テーブル探索 {:?} に失敗: {}", strategy, e),
        }
    }
    None
}

pub async fn find_table<P: DomPage>(page: &P, anchor: &P::Element) -> Option<P::Element> {
    find_table_with(page, anchor, &TableStrategy::CASCADE).await
}

/// 展開直後は見出し基準の戦略でテーブルの出現を待ち、時間切れなら全戦略で1回探す
pub async fn find_table_after_expand<P: DomPage>(
    page: &P,
    anchor: &P::Element,
    expanded: bool,
    config: &ScraperConfig,
) -> Option<P::Element> {
    if expanded {
        let found = poll_until(config.expand_timeout, config.poll_interval, || {
            find_table_with(page, anchor, &TableStrategy::ANCHORED)
        })
        .await;
        if found.is_some() {
            return found;
        }
        debug!(
            "{:?} 以内に見出し付近のテーブルなし、全戦略で再探索",
            config.expand_timeout
        );
    }
    find_table(page, anchor).await
}
