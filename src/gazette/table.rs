//! テーブル単位のパース

use tracing::{debug, error, warn};

use super::row::parse_row;
use super::types::Record;
use crate::dom::DomElement;
use crate::error::ScraperError;

/// テーブルの全データ行をパースする。失敗した行は読み飛ばし、テーブル自体の失敗は空を返す
pub async fn parse_table<E: DomElement>(table: &E, year: &str, base_url: &str) -> Vec<Record> {
    match try_parse_table(table, year, base_url).await {
        Ok(records) => records,
        Err(e) => {
            error!("{}年のテーブル抽出エラー: {}", year, e);
            Vec::new()
        }
    }
}

async fn try_parse_table<E: DomElement>(
    table: &E,
    year: &str,
    base_url: &str,
) -> Result<Vec<Record>, ScraperError> {
    let rows = data_rows(table).await?;
    debug!("{}年のテーブル: 候補行 {}件", year, rows.len());

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(record) = parse_row(row, year, base_url).await {
            records.push(record);
        }
    }
    Ok(records)
}

/// `tbody` があれば全 `tbody` の行、なければ `th` を含まない行
async fn data_rows<E: DomElement>(table: &E) -> Result<Vec<E>, ScraperError> {
    let bodies = table.find_all("tbody").await?;
    if !bodies.is_empty() {
        let mut rows = Vec::new();
        for tbody in &bodies {
            rows.extend(tbody.find_all("tr").await?);
        }
        return Ok(rows);
    }

    let mut rows = Vec::new();
    for row in table.find_all("tr").await? {
        match row.find_first("th").await {
            Ok(None) => rows.push(row),
            Ok(Some(_)) => {}
            Err(e) => warn!("テーブル行を確認できないためスキップ: {}", e),
        }
    }
    Ok(rows)
}
