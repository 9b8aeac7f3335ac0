//! セル内のテキストとリンクの抽出

use tracing::warn;

use super::text::{clean_text, resolve_url};
use super::types::{CellContent, Link};
use crate::dom::DomElement;
use crate::error::ScraperError;

/// セルのテキストとリンク一覧（文書順）を取得する。失敗時は空の結果を返す
pub async fn extract_cell<E: DomElement>(cell: &E, base_url: &str) -> CellContent {
    match try_extract_cell(cell, base_url).await {
        Ok(content) => content,
        Err(e) => {
            warn!("セル内容の抽出エラー: {}", e);
            CellContent::default()
        }
    }
}

async fn try_extract_cell<E: DomElement>(
    cell: &E,
    base_url: &str,
) -> Result<CellContent, ScraperError> {
    let text = clean_text(&cell.text().await?);

    let mut links = Vec::new();
    for anchor in cell.find_all("a").await? {
        let title = clean_text(&anchor.text().await?);
        let href = anchor.attribute("href").await?.unwrap_or_default();
        let url = resolve_url(&href, base_url);

        // 名前付きアンカーなど中身のないものは除外
        if title.is_empty() && url.is_empty() {
            continue;
        }
        links.push(Link { title, url });
    }

    Ok(CellContent { text, links })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fixture::FixturePage;
    use crate::dom::DomPage;

    const BASE: &str = "https://asic.gov.au";

    async fn first_cell(page: &FixturePage) -> crate::dom::fixture::FixtureElement {
        page.query_all("td").await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_extract_multiple_links() {
        let page = FixturePage::new(
            r#"<table><tr><td>
                <a href="/media/a01.pdf">A01/18</a>&nbsp;and
                <a href="https://other.example/a02.pdf"> A02/18 </a>
            </td></tr></table>"#,
        );
        let cell = first_cell(&page).await;

        let content = extract_cell(&cell, BASE).await;

        assert_eq!(content.text, "A01/18 and A02/18");
        assert_eq!(
            content.links,
            vec![
                Link::new("A01/18", "https://asic.gov.au/media/a01.pdf"),
                Link::new("A02/18", "https://other.example/a02.pdf"),
            ]
        );
    }

    #[tokio::test]
    async fn test_link_without_href() {
        let page = FixturePage::new(
            r#"<table><tr><td><a>Pending</a><a name="top"></a></td></tr></table>"#,
        );
        let cell = first_cell(&page).await;

        let content = extract_cell(&cell, BASE).await;

        assert_eq!(content.links, vec![Link::new("Pending", "")]);
        assert_eq!(content.urls().count(), 0);
    }

    #[tokio::test]
    async fn test_plain_text_cell() {
        let page = FixturePage::new("<table><tr><td>  No gazette\u{a0}published </td></tr></table>");
        let cell = first_cell(&page).await;

        let content = extract_cell(&cell, BASE).await;

        assert_eq!(content.text, "No gazette published");
        assert!(content.links.is_empty());
    }
}
