//! Gazette 関連の型定義

use serde::Serialize;

/// 1行あたり複数回現れうる論理列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LogicalColumn {
    AsicGazette,
    BusinessGazette,
    OtherNotes,
}

impl LogicalColumn {
    /// 出力時の列順
    pub const ALL: [LogicalColumn; 3] = [
        LogicalColumn::AsicGazette,
        LogicalColumn::BusinessGazette,
        LogicalColumn::OtherNotes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LogicalColumn::AsicGazette => "ASIC Gazette",
            LogicalColumn::BusinessGazette => "Business Gazette",
            LogicalColumn::OtherNotes => "Other / Notes",
        }
    }

    /// `index` 番目の出現のタイトル列名（0番目は添字なし）
    pub fn title_field(self, index: usize) -> String {
        match (self, index) {
            (LogicalColumn::OtherNotes, 0) => self.label().to_string(),
            (_, 0) => format!("{}_title", self.label()),
            (_, i) => format!("{}_{}", self.label(), i),
        }
    }

    /// `index` 番目の出現のURL列名（0番目は添字なし）
    pub fn url_field(self, index: usize) -> String {
        let suffix = match self {
            LogicalColumn::OtherNotes => "URL",
            _ => "Url",
        };
        match index {
            0 => format!("{}_{}", self.label(), suffix),
            i => format!("{}_{}_{}", self.label(), suffix, i),
        }
    }
}

/// リンク（表示テキストと解決済みURL）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

impl Link {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// セルの抽出結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellContent {
    pub text: String,
    pub links: Vec<Link>,
}

impl CellContent {
    /// `href` を持つリンクのURLのみ
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .map(|l| l.url.as_str())
            .filter(|u| !u.is_empty())
    }
}

/// Other / Notes 列。テキストよりURLが多い場合、余ったURLはタイトルなしで残す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notes {
    pub texts: Vec<String>,
    pub urls: Vec<String>,
}

impl Notes {
    pub fn occurrences(&self) -> usize {
        self.texts.len().max(self.urls.len()).max(1)
    }
}

/// テーブル1行分のレコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub year: String,
    pub date: String,
    pub asic_gazette: Vec<Link>,
    pub business_gazette: Vec<Link>,
    pub other_notes: Notes,
}

impl Record {
    pub fn occurrences(&self, column: LogicalColumn) -> usize {
        match column {
            LogicalColumn::AsicGazette => self.asic_gazette.len(),
            LogicalColumn::BusinessGazette => self.business_gazette.len(),
            LogicalColumn::OtherNotes => self.other_notes.occurrences(),
        }
    }

    /// 列名→値の一覧（このレコードが持つ列のみ）
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("Year".to_string(), self.year.clone()),
            ("Date".to_string(), self.date.clone()),
        ];

        for (column, links) in [
            (LogicalColumn::AsicGazette, &self.asic_gazette),
            (LogicalColumn::BusinessGazette, &self.business_gazette),
        ] {
            for (i, link) in links.iter().enumerate() {
                fields.push((column.title_field(i), link.title.clone()));
                fields.push((column.url_field(i), link.url.clone()));
            }
        }

        let notes = LogicalColumn::OtherNotes;
        let Notes { texts, urls } = &self.other_notes;
        if texts.is_empty() {
            fields.push((notes.title_field(0), String::new()));
            fields.push((notes.url_field(0), String::new()));
        } else {
            for (i, text) in texts.iter().enumerate() {
                fields.push((notes.title_field(i), text.clone()));
                fields.push((notes.url_field(i), urls.get(i).cloned().unwrap_or_default()));
            }
            for (i, url) in urls.iter().enumerate().skip(texts.len()) {
                fields.push((notes.url_field(i), url.clone()));
            }
        }

        fields
    }
}
