//! 静的HTMLによる [`DomPage`] 実装（テスト専用）
//!
//! `scraper::Html` は `Send` ではないため、文書はソース文字列として保持し、
//! 問い合わせのたびにパースする。要素は文書順の通し番号で識別する。
//! 折りたたみ（`collapse` クラス）は、対応するトグルがクリックされるまで非表示として扱う。
//! `data-fixture-error` 属性を持つ要素は、テキスト取得と子孫検索でエラーを返す。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::{DomElement, DomPage};
use crate::error::ScraperError;

#[derive(Debug, Default)]
struct FixtureState {
    visited: Vec<String>,
    clicked: HashSet<usize>,
    expanded_ids: HashSet<String>,
    goto_error: Option<String>,
    goto_delay: Option<Duration>,
}

#[derive(Debug)]
struct FixtureDoc {
    source: String,
    state: Mutex<FixtureState>,
}

impl FixtureDoc {
    fn with_html<R>(&self, f: impl FnOnce(&Html) -> R) -> R {
        let html = Html::parse_document(&self.source);
        f(&html)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FixtureState> {
        self.state.lock().expect("fixture state poisoned")
    }
}

fn elements(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    html.tree.root().descendants().filter_map(ElementRef::wrap)
}

fn element_at(html: &Html, ordinal: usize) -> ElementRef<'_> {
    elements(html)
        .nth(ordinal)
        .expect("fixture element ordinal out of range")
}

fn ordinal_of(html: &Html, element: ElementRef<'_>) -> usize {
    elements(html)
        .position(|e| e.id() == element.id())
        .expect("fixture element not in document")
}

const FAILURE_ATTR: &str = "data-fixture-error";

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector(format!("{}: {:?}", selector, e)))
}

#[derive(Debug, Clone)]
pub(crate) struct FixturePage {
    doc: Arc<FixtureDoc>,
}

impl FixturePage {
    pub(crate) fn new(source: &str) -> Self {
        Self {
            doc: Arc::new(FixtureDoc {
                source: source.to_string(),
                state: Mutex::new(FixtureState::default()),
            }),
        }
    }

    /// 遷移を常に失敗させる
    pub(crate) fn failing_goto(self, message: &str) -> Self {
        self.doc.state().goto_error = Some(message.to_string());
        self
    }

    /// 遷移の完了を遅らせる
    pub(crate) fn slow_goto(self, delay: Duration) -> Self {
        self.doc.state().goto_delay = Some(delay);
        self
    }

    pub(crate) fn visited(&self) -> Vec<String> {
        self.doc.state().visited.clone()
    }

    pub(crate) fn click_count(&self) -> usize {
        self.doc.state().clicked.len()
    }

    fn element(&self, ordinal: usize) -> FixtureElement {
        FixtureElement {
            doc: self.doc.clone(),
            ordinal,
        }
    }
}

#[async_trait]
impl DomPage for FixturePage {
    type Element = FixtureElement;

    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        let (delay, failure) = {
            let mut state = self.doc.state();
            state.visited.push(url.to_string());
            (state.goto_delay, state.goto_error.clone())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(message) => Err(ScraperError::Navigation(message)),
            None => Ok(()),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<FixtureElement>, ScraperError> {
        let selector = parse_selector(selector)?;
        let ordinals: Vec<usize> = self.doc.with_html(|html| {
            html.select(&selector)
                .map(|e| ordinal_of(html, e))
                .collect()
        });
        Ok(ordinals.into_iter().map(|o| self.element(o)).collect())
    }

    async fn source(&self) -> Result<String, ScraperError> {
        Ok(self.doc.source.clone())
    }

    async fn title(&self) -> Result<Option<String>, ScraperError> {
        let selector = parse_selector("title")?;
        Ok(self.doc.with_html(|html| {
            html.select(&selector)
                .next()
                .map(|t| t.text().collect::<String>())
        }))
    }
}

fn hidden_by_markup(element: ElementRef<'_>, expanded: &HashSet<String>) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    if let Some(style) = value.attr("style") {
        let style = style.replace(' ', "");
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return true;
        }
    }
    let collapsed = value.classes().any(|c| c == "collapse") && !value.classes().any(|c| c == "show");
    collapsed && !value.id().map(|id| expanded.contains(id)).unwrap_or(false)
}

#[derive(Debug, Clone)]
pub(crate) struct FixtureElement {
    doc: Arc<FixtureDoc>,
    ordinal: usize,
}

impl FixtureElement {
    fn handle(&self, ordinal: usize) -> FixtureElement {
        FixtureElement {
            doc: self.doc.clone(),
            ordinal,
        }
    }

    fn fail_if_marked(&self) -> Result<(), ScraperError> {
        let marked = self.doc.with_html(|html| {
            element_at(html, self.ordinal).value().attr(FAILURE_ATTR).is_some()
        });
        if marked {
            return Err(ScraperError::JavaScript(format!(
                "element {} is detached",
                self.ordinal
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DomElement for FixtureElement {
    async fn text(&self) -> Result<String, ScraperError> {
        self.fail_if_marked()?;
        Ok(self
            .doc
            .with_html(|html| element_at(html, self.ordinal).text().collect::<String>()))
    }

    async fn own_text(&self) -> Result<String, ScraperError> {
        self.fail_if_marked()?;
        Ok(self.doc.with_html(|html| {
            element_at(html, self.ordinal)
                .children()
                .filter_map(|child| {
                    child.value().as_text().map(|t| {
                        let text: &str = t;
                        text.to_owned()
                    })
                })
                .collect::<String>()
        }))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ScraperError> {
        if name == "aria-expanded" && self.doc.state().clicked.contains(&self.ordinal) {
            return Ok(Some("true".to_string()));
        }
        Ok(self.doc.with_html(|html| {
            element_at(html, self.ordinal)
                .value()
                .attr(name)
                .map(str::to_string)
        }))
    }

    async fn tag(&self) -> Result<String, ScraperError> {
        Ok(self.doc.with_html(|html| {
            element_at(html, self.ordinal).value().name().to_ascii_lowercase()
        }))
    }

    async fn is_displayed(&self) -> Result<bool, ScraperError> {
        let expanded = self.doc.state().expanded_ids.clone();
        Ok(self.doc.with_html(|html| {
            let mut current = Some(element_at(html, self.ordinal));
            while let Some(element) = current {
                if hidden_by_markup(element, &expanded) {
                    return false;
                }
                current = element.parent().and_then(ElementRef::wrap);
            }
            true
        }))
    }

    async fn click(&self) -> Result<(), ScraperError> {
        let target = self.doc.with_html(|html| {
            let value = element_at(html, self.ordinal).value();
            ["data-bs-target", "data-target", "href"]
                .iter()
                .filter_map(|name| value.attr(name))
                .find_map(|t| t.strip_prefix('#').map(str::to_string))
                .or_else(|| value.attr("aria-controls").map(str::to_string))
        });

        let mut state = self.doc.state();
        state.clicked.insert(self.ordinal);
        if let Some(id) = target {
            state.expanded_ids.insert(id);
        }
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FixtureElement>, ScraperError> {
        self.fail_if_marked()?;
        let selector = parse_selector(selector)?;
        let ordinals: Vec<usize> = self.doc.with_html(|html| {
            let scope = element_at(html, self.ordinal);
            scope
                .select(&selector)
                .filter(|e| e.id() != scope.id())
                .map(|e| ordinal_of(html, e))
                .collect()
        });
        Ok(ordinals.into_iter().map(|o| self.handle(o)).collect())
    }

    async fn parent(&self) -> Result<Option<FixtureElement>, ScraperError> {
        let ordinal = self.doc.with_html(|html| {
            element_at(html, self.ordinal)
                .parent()
                .and_then(ElementRef::wrap)
                .map(|p| ordinal_of(html, p))
        });
        Ok(ordinal.map(|o| self.handle(o)))
    }

    async fn next_sibling(&self) -> Result<Option<FixtureElement>, ScraperError> {
        let ordinal = self.doc.with_html(|html| {
            let mut node = element_at(html, self.ordinal).next_sibling();
            while let Some(current) = node {
                if let Some(element) = ElementRef::wrap(current) {
                    return Some(ordinal_of(html, element));
                }
                node = current.next_sibling();
            }
            None
        });
        Ok(ordinal.map(|o| self.handle(o)))
    }
}
