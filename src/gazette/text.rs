//! テキスト・URLの正規化

use tracing::debug;
use url::Url;

/// NBSP（文字・実体参照とも）を空白にし、連続する空白を1つにまとめて前後を除去する
pub fn clean_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 相対URLを `base_url` 基準の絶対URLにする。絶対URLはそのまま返す
pub fn resolve_url(url: &str, base_url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if Url::parse(url).is_ok() {
        return url.to_string();
    }

    match Url::parse(base_url).and_then(|base| base.join(url)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            debug!("'{}' を '{}' 基準で解決できません: {}", url, base_url, e);
            url.to_string()
        }
    }
}
