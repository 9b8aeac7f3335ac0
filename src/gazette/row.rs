//! テーブル行のパース
//!
//! 4列（日付, ASIC Gazette, Business Gazette, Notes）と
//! 5列（日付, ASIC Gazette, Business Gazette, Other, Notes）の両レイアウトに対応する。

use tracing::{error, warn};

use super::cell::extract_cell;
use super::text::clean_text;
use super::types::{CellContent, Link, Notes, Record};
use crate::dom::DomElement;
use crate::error::ScraperError;

/// データ行とみなす最小セル数
pub const MIN_CELLS: usize = 4;

/// Other と Notes を結合するときの区切り
const NOTES_SEPARATOR: &str = ". ";

/// 1行をレコードに変換する。データ行でない場合や失敗時は `None`
pub async fn parse_row<E: DomElement>(row: &E, year: &str, base_url: &str) -> Option<Record> {
    match try_parse_row(row, year, base_url).await {
        Ok(record) => record,
        Err(e) => {
            error!("行データの抽出エラー ({}年): {}", year, e);
            None
        }
    }
}

async fn try_parse_row<E: DomElement>(
    row: &E,
    year: &str,
    base_url: &str,
) -> Result<Option<Record>, ScraperError> {
    let cells = row.find_all("td").await?;
    if cells.len() < MIN_CELLS {
        warn!(
            "セル数が{}未満 ({}) のためスキップ",
            MIN_CELLS,
            cells.len()
        );
        return Ok(None);
    }

    let date = clean_text(&cells[0].text().await?);
    let asic = extract_cell(&cells[1], base_url).await;
    let business = extract_cell(&cells[2], base_url).await;

    let other_notes = if cells.len() == MIN_CELLS {
        single_notes(extract_cell(&cells[3], base_url).await)
    } else {
        let other = extract_cell(&cells[3], base_url).await;
        let notes = extract_cell(&cells[4], base_url).await;
        merged_notes(other, notes)
    };

    Ok(Some(Record {
        year: year.to_string(),
        date,
        asic_gazette: gazette_links(asic),
        business_gazette: gazette_links(business),
        other_notes,
    }))
}

/// Gazette列の出現一覧。リンクがなければセル全体のテキストを1件のタイトルとする（空でも1件）
pub fn gazette_links(cell: CellContent) -> Vec<Link> {
    if cell.links.is_empty() {
        vec![Link::new(cell.text, "")]
    } else {
        cell.links
    }
}

/// 4列レイアウトのNotes
pub fn single_notes(cell: CellContent) -> Notes {
    if cell.text.is_empty() {
        return Notes::default();
    }

    let mut urls: Vec<String> = cell.urls().map(str::to_string).collect();
    if urls.is_empty() {
        urls.push(String::new());
    }

    Notes {
        texts: vec![cell.text],
        urls,
    }
}

/// 5列レイアウトのOtherとNotesを1件にまとめる
pub fn merged_notes(other: CellContent, notes: CellContent) -> Notes {
    let texts: Vec<&str> = [other.text.as_str(), notes.text.as_str()]
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect();

    if texts.is_empty() {
        return Notes::default();
    }

    Notes {
        texts: vec![texts.join(NOTES_SEPARATOR)],
        urls: other.urls().chain(notes.urls()).map(str::to_string).collect(),
    }
}
