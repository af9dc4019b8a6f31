//! Debounced autocomplete bound to `.autocomplete` roots.
//!
//! Each root holds an `.ac-input` and an `.ac-panel`, and names its suggest
//! endpoint and row limit in `data-endpoint` / `data-limit`. Typing restarts
//! a 160 ms timer; when it fires the trimmed query is sent to the endpoint and
//! the answer is rendered as `.ac-item` rows, the first one active.
//!
//! Handlers spawn local tasks and must run inside a [`tokio::task::LocalSet`].

mod debounce;
mod source;
mod suggestion;

pub use debounce::{wait, Debouncer, DEBOUNCE_DELAY};
#[cfg(feature = "http")]
pub use source::HttpSuggestSource;
pub use source::{suggest_url, SuggestError, SuggestSource};
pub use suggestion::{parse_suggestions, Suggestion};

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::dom::{self, Document, Geometry, NodeId, SharedDocument};
use crate::event::Key;

pub const ROOT_CLASS: &str = "autocomplete";
pub const INPUT_CLASS: &str = "ac-input";
pub const PANEL_CLASS: &str = "ac-panel";
pub const ITEM_CLASS: &str = "ac-item";

pub const DEFAULT_LIMIT: usize = 6;
/// Delay before a blurred input hides its panel, so a row press lands first.
pub const BLUR_GRACE: Duration = Duration::from_millis(120);
/// Row height used to lay out rendered rows.
pub const ROW_HEIGHT: i32 = 36;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteConfig {
    pub endpoint: String,
    /// Maximum rows rendered; `None` renders every suggestion.
    pub limit: Option<usize>,
    pub row_height: i32,
}

impl AutocompleteConfig {
    /// Reads `data-endpoint` and `data-limit` from a root element.
    ///
    /// Returns `None` without an endpoint. See [`parse_limit`] for the limit.
    pub fn from_root(doc: &Document, root: NodeId) -> Option<Self> {
        let endpoint = doc.dataset(root, "endpoint")?.trim();
        if endpoint.is_empty() {
            return None;
        }
        let limit = parse_limit(doc.dataset(root, "limit"));
        Some(Self {
            endpoint: endpoint.to_string(),
            limit,
            row_height: ROW_HEIGHT,
        })
    }
}

/// Reads a `data-limit` value the way a browser coerces it to a number.
///
/// Missing or empty means [`DEFAULT_LIMIT`]. Zero, blank and non-numeric
/// values lift the limit; negative values render nothing; fractions truncate.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw.trim(),
        _ => return Some(DEFAULT_LIMIT),
    };
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_nan() || n == 0.0 || n == f64::INFINITY => None,
        Ok(n) if n < 0.0 => Some(0),
        Ok(n) => Some(n.trunc() as usize),
        Err(_) => None,
    }
}

#[derive(Debug, Default)]
struct State {
    debounce: Debouncer,
    /// Last query answered successfully.
    last_query: String,
}

struct Inner<S> {
    doc: SharedDocument,
    source: Rc<S>,
    index: usize,
    root: NodeId,
    input: NodeId,
    panel: NodeId,
    config: AutocompleteConfig,
    state: RefCell<State>,
}

/// One mounted autocomplete widget. Cloning shares the widget.
pub struct Autocomplete<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for Autocomplete<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

fn report(result: dom::Result<()>) {
    if let Err(_e) = result {
        #[cfg(feature = "tracing")]
        tracing::warn!("autocomplete DOM update failed: {}", _e);
    }
}

impl<S: SuggestSource + 'static> Autocomplete<S> {
    /// Mounts a widget on every complete `.autocomplete` root of the document.
    ///
    /// Roots without an input, a panel or an endpoint are skipped.
    pub fn attach_all(doc: &SharedDocument, source: Rc<S>) -> Vec<Self> {
        let document = doc.borrow();
        let mut widgets = Vec::new();
        for root in document.query_class(document.root(), ROOT_CLASS) {
            let input = document.first_by_class(root, INPUT_CLASS);
            let panel = document.first_by_class(root, PANEL_CLASS);
            let config = AutocompleteConfig::from_root(&document, root);
            let (Some(input), Some(panel), Some(config)) = (input, panel, config) else {
                #[cfg(feature = "tracing")]
                tracing::debug!("skipping incomplete autocomplete root {:?}", root);
                continue;
            };
            widgets.push(Self {
                inner: Rc::new(Inner {
                    doc: Rc::clone(doc),
                    source: Rc::clone(&source),
                    index: widgets.len(),
                    root,
                    input,
                    panel,
                    config,
                    state: RefCell::new(State::default()),
                }),
            });
        }
        widgets
    }

    /// Restarts the debounce timer; the query runs once typing pauses.
    ///
    /// The new timer also cancels a request still in flight for an older
    /// query, so a late answer never replaces the results of a newer one.
    pub fn on_input(&self) {
        let token = self.inner.state.borrow_mut().debounce.restart();
        let delay = self.inner.state.borrow().debounce.delay();
        let inner = Rc::clone(&self.inner);
        tokio::task::spawn_local(async move {
            if wait(delay, &token).await {
                inner.run_query(&token).await;
            }
        });
    }

    /// Hides the panel after [`BLUR_GRACE`].
    pub fn on_blur(&self) {
        let inner = Rc::clone(&self.inner);
        tokio::task::spawn_local(async move {
            tokio::time::sleep(BLUR_GRACE).await;
            report(inner.hide());
        });
    }
}

impl<S> Autocomplete<S> {
    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    pub fn input(&self) -> NodeId {
        self.inner.input
    }

    pub fn panel(&self) -> NodeId {
        self.inner.panel
    }

    pub fn config(&self) -> &AutocompleteConfig {
        &self.inner.config
    }

    /// Rendered suggestion rows, in order.
    pub fn rows(&self) -> Vec<NodeId> {
        self.inner.doc.borrow().query_class(self.inner.panel, ITEM_CLASS)
    }

    pub fn active_index(&self) -> Option<usize> {
        let doc = self.inner.doc.borrow();
        let active = self.inner.active_row(&doc)?;
        doc.query_class(self.inner.panel, ITEM_CLASS)
            .iter()
            .position(|row| *row == active)
    }

    pub fn is_open(&self) -> bool {
        !self.inner.doc.borrow().hidden(self.inner.panel).unwrap_or(true)
    }

    /// True when a mouse press on `target` lands inside the panel.
    pub fn contains(&self, doc: &Document, target: NodeId) -> bool {
        doc.is_descendant_of(target, self.inner.panel)
    }

    /// Handles a key press on the input. Returns whether the default action
    /// is prevented.
    pub fn on_keydown(&self, key: &Key) -> bool {
        match self.handle_key(key) {
            Ok(prevented) => prevented,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("autocomplete key handling failed: {}", _e);
                false
            }
        }
    }

    fn handle_key(&self, key: &Key) -> dom::Result<bool> {
        let inner = &self.inner;
        if matches!(key, Key::ArrowDown | Key::ArrowUp) {
            let mut doc = inner.doc.borrow_mut();
            if doc.hidden(inner.panel)? && !doc.children(inner.panel).is_empty() {
                doc.set_hidden(inner.panel, false)?;
            }
        }
        match key {
            Key::ArrowDown => {
                inner.move_active(1)?;
                Ok(true)
            }
            Key::ArrowUp => {
                inner.move_active(-1)?;
                Ok(true)
            }
            Key::Escape => {
                inner.hide()?;
                Ok(false)
            }
            Key::Enter => {
                let active = inner.active_row(&inner.doc.borrow());
                if let Some(row) = active {
                    inner.commit(row)?;
                }
                Ok(false)
            }
            Key::Other(_) => Ok(false),
        }
    }

    /// Commits the row under `target`, if any. Returns whether a row was hit.
    pub fn on_mousedown(&self, target: NodeId) -> bool {
        let row = {
            let doc = self.inner.doc.borrow();
            doc.closest_class(target, ITEM_CLASS)
                .filter(|row| doc.is_descendant_of(*row, self.inner.panel))
        };
        match row {
            Some(row) => {
                report(self.inner.commit(row));
                true
            }
            None => false,
        }
    }

    /// Shows the panel again if it still holds rows.
    pub fn on_focus(&self) {
        let inner = &self.inner;
        let mut doc = inner.doc.borrow_mut();
        if !doc.children(inner.panel).is_empty() {
            report(doc.set_hidden(inner.panel, false));
        }
    }
}

impl<S> Inner<S> {
    fn hide(&self) -> dom::Result<()> {
        self.doc.borrow_mut().set_hidden(self.panel, true)
    }

    fn clear_panel(&self) -> dom::Result<()> {
        let mut doc = self.doc.borrow_mut();
        doc.clear_children(self.panel)?;
        doc.set_hidden(self.panel, true)
    }

    fn active_row(&self, doc: &Document) -> Option<NodeId> {
        doc.query_class(self.panel, ITEM_CLASS)
            .into_iter()
            .find(|row| doc.attribute(*row, "aria-selected") == Some("true"))
    }

    fn render(&self, suggestions: &[Suggestion]) -> dom::Result<()> {
        let mut doc = self.doc.borrow_mut();
        doc.clear_children(self.panel)?;

        let max = self.config.limit.unwrap_or(suggestions.len());
        for (idx, suggestion) in suggestions.iter().take(max).enumerate() {
            let id = format!("ac-{}-{}", self.index, idx);
            let row = doc.append_element(
                self.panel,
                "div",
                &[
                    ("class", ITEM_CLASS),
                    ("role", "option"),
                    ("id", id.as_str()),
                    ("data-value", suggestion.value()),
                ],
            )?;
            doc.set_geometry(
                row,
                Geometry {
                    offset_top: idx as i32 * self.config.row_height,
                    offset_height: self.config.row_height,
                    ..Default::default()
                },
            )?;

            let body = doc.append_element(row, "div", &[])?;
            let label = doc.append_element(body, "div", &[("class", "ac-label")])?;
            doc.set_text_content(label, suggestion.label())?;
            if !suggestion.hint().is_empty() {
                let hint = doc.append_element(body, "div", &[("class", "ac-hint")])?;
                doc.set_text_content(hint, suggestion.hint())?;
            }
            if idx == 0 {
                doc.set_attribute(row, "aria-selected", "true")?;
            }
        }

        let mut geometry = doc.geometry(self.panel)?;
        geometry.scroll_top = 0;
        doc.set_geometry(self.panel, geometry)?;

        let empty = doc.children(self.panel).is_empty();
        doc.set_hidden(self.panel, empty)
    }

    /// Moves the active row by `step`, wrapping around, and scrolls it into view.
    fn move_active(&self, step: isize) -> dom::Result<()> {
        let mut doc = self.doc.borrow_mut();
        let rows = doc.query_class(self.panel, ITEM_CLASS);
        if rows.is_empty() {
            return Ok(());
        }
        let current = rows
            .iter()
            .position(|row| doc.attribute(*row, "aria-selected") == Some("true"));
        for row in &rows {
            doc.remove_attribute(*row, "aria-selected")?;
        }
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(rows.len() as isize) as usize,
            None if step < 0 => rows.len() - 1,
            None => 0,
        };
        doc.set_attribute(rows[next], "aria-selected", "true")?;
        doc.scroll_into_view(self.panel, rows[next])
    }

    /// Copies the row value into the input and hides the panel.
    ///
    /// An empty row value leaves the input untouched.
    fn commit(&self, row: NodeId) -> dom::Result<()> {
        let mut doc = self.doc.borrow_mut();
        let value = doc.dataset(row, "value").unwrap_or("").to_string();
        if !value.is_empty() {
            doc.set_value(self.input, &value)?;
        }
        doc.set_hidden(self.panel, true)
    }
}

impl<S: SuggestSource> Inner<S> {
    async fn run_query(&self, token: &CancellationToken) {
        let query = match self.doc.borrow().value(self.input) {
            Ok(value) => value.trim().to_string(),
            Err(_) => return,
        };

        if query.is_empty() || query == self.state.borrow().last_query {
            report(self.clear_panel());
            return;
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("suggest request superseded by newer input");
                return;
            }
            result = self.source.suggest(&self.config.endpoint, &query) => result,
        };

        match result {
            Ok(body) => {
                let suggestions = parse_suggestions(&body);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} suggestions from {}",
                    suggestions.len(),
                    self.config.endpoint
                );

                self.state.borrow_mut().last_query = query;
                report(self.render(&suggestions));
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("suggest request to {} failed: {}", self.config.endpoint, _e);
                report(self.hide());
            }
        }
    }
}
