//! 列スキーマの拡張と正規化
//!
//! 収集フェーズではレコードを溜めつつ論理列ごとの最大出現数だけを更新し、
//! 全件そろった後にヘッダを確定して各レコードを空文字で埋める。

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::info;

use super::types::{LogicalColumn, Record};

/// 論理列ごとの最大出現数（単調増加）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaState {
    max_occurrences: BTreeMap<LogicalColumn, usize>,
}

impl Default for SchemaState {
    fn default() -> Self {
        Self {
            max_occurrences: LogicalColumn::ALL.iter().map(|&c| (c, 1)).collect(),
        }
    }
}

impl SchemaState {
    pub fn observe(&mut self, record: &Record) {
        for column in LogicalColumn::ALL {
            let seen = self.max_occurrences.entry(column).or_insert(1);
            *seen = (*seen).max(record.occurrences(column));
        }
    }

    pub fn max_occurrences(&self, column: LogicalColumn) -> usize {
        self.max_occurrences.get(&column).copied().unwrap_or(1)
    }

    /// 確定ヘッダ: Year, Date, 以降は論理列ごとに 0..max の (タイトル, URL)
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["Year".to_string(), "Date".to_string()];
        for column in LogicalColumn::ALL {
            for i in 0..self.max_occurrences(column) {
                headers.push(column.title_field(i));
                headers.push(column.url_field(i));
            }
        }
        headers
    }
}

/// ヘッダ順の値列に変換する。欠けている列は空文字、ヘッダにない列は捨てる
pub fn normalize(record: &Record, headers: &[String]) -> Vec<String> {
    let fields: HashMap<String, String> = record.fields().into_iter().collect();
    headers
        .iter()
        .map(|h| fields.get(h).cloned().unwrap_or_default())
        .collect()
}

/// 収集フェーズの蓄積
#[derive(Debug, Default)]
pub struct Collector {
    records: Vec<Record>,
    schema: SchemaState,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.schema.observe(&record);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> &SchemaState {
        &self.schema
    }

    /// ヘッダを確定し、全レコードを正規化する
    pub fn finish(self) -> Dataset {
        info!("抽出行数: {}", self.records.len());
        info!(
            "最大リンク数 - ASIC: {}, Business: {}, Other: {}",
            self.schema.max_occurrences(LogicalColumn::AsicGazette),
            self.schema.max_occurrences(LogicalColumn::BusinessGazette),
            self.schema.max_occurrences(LogicalColumn::OtherNotes)
        );

        let headers = self.schema.headers();
        let rows = self
            .records
            .iter()
            .map(|record| normalize(record, &headers))
            .collect();
        Dataset { headers, rows }
    }
}

impl Extend<Record> for Collector {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// 確定済みのデータセット。各行はヘッダと同じ長さ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}
