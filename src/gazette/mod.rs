//! ASIC Gazette 年別テーブルの抽出
//!
//! 年ごとの折りたたみセクションに、列数（4/5列）やセル内リンク数が一定でない
//! テーブルが並ぶページを、1つの平坦な表にまとめる。

pub mod cell;
pub mod extractor;
pub mod locator;
pub mod row;
mod scraper;
pub mod schema;
pub mod table;
pub mod text;
mod types;

pub use extractor::Extractor;
pub use locator::{AnchorStrategy, Section, TableStrategy};
pub use schema::{Collector, Dataset, SchemaState};
pub use scraper::GazetteScraper;
pub use text::{clean_text, resolve_url};
pub use types::{CellContent, Link, LogicalColumn, Notes, Record};
