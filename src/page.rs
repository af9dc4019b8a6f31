//! A loaded page: the document plus the widgets mounted on it.

use std::cell::Ref;
use std::rc::Rc;

use crate::autocomplete::{Autocomplete, SuggestSource};
use crate::dom::{self, Document, NodeId, SharedDocument};
use crate::event::{Event, EventKind, EventOutcome, Key};
use crate::meter::PasswordMeter;
use crate::multiselect::{MultiselectIds, MultiselectMirror};

fn report<T>(result: dom::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("widget DOM update failed: {}", _e);
            None
        }
    }
}

/// Routes DOM events to the widgets that own their targets.
///
/// Autocomplete handlers spawn local tasks, so a page with autocomplete
/// roots must be driven from inside a [`tokio::task::LocalSet`].
pub struct Page<S> {
    doc: SharedDocument,
    multiselect: Option<MultiselectMirror>,
    meter: Option<PasswordMeter>,
    autocompletes: Vec<Autocomplete<S>>,
}

impl<S: SuggestSource + 'static> Page<S> {
    /// Mounts every widget whose elements are present.
    pub fn load(document: Document, source: S) -> Self {
        Self::load_with(document, source, &MultiselectIds::default())
    }

    pub fn load_with(document: Document, source: S, ids: &MultiselectIds) -> Self {
        let doc = document.into_shared();
        let (multiselect, meter) = {
            let mut d = doc.borrow_mut();
            (
                report(MultiselectMirror::attach(&mut d, ids)).flatten(),
                report(PasswordMeter::attach(&mut d)).flatten(),
            )
        };
        let autocompletes = Autocomplete::attach_all(&doc, Rc::new(source));

        #[cfg(feature = "tracing")]
        tracing::info!(
            "page loaded: multiselect={}, password meter={}, autocomplete widgets={}",
            multiselect.is_some(),
            meter.is_some(),
            autocompletes.len()
        );

        Self {
            doc,
            multiselect,
            meter,
            autocompletes,
        }
    }

    pub fn dispatch(&self, event: &Event) -> EventOutcome {
        let target = event.target;
        let mut outcome = EventOutcome::default();
        match &event.kind {
            EventKind::Input => {
                if let Some(meter) = self.meter.filter(|m| m.input() == target) {
                    report(meter.update(&mut self.doc.borrow_mut()));
                }
                for widget in self.autocompletes.iter().filter(|w| w.input() == target) {
                    widget.on_input();
                }
            }
            EventKind::Change => {
                if let Some(mirror) = &self.multiselect {
                    let owned = mirror.handles_change(&self.doc.borrow(), target);
                    if owned {
                        report(mirror.sync_to_select(&mut self.doc.borrow_mut()));
                    }
                }
            }
            EventKind::Click => {
                if let Some(mirror) = &self.multiselect {
                    if mirror.is_select_all(target) {
                        report(mirror.select_all(&mut self.doc.borrow_mut()));
                    } else if mirror.is_clear_all(target) {
                        report(mirror.clear_all(&mut self.doc.borrow_mut()));
                    }
                }
            }
            EventKind::KeyDown(key) => {
                for widget in self.autocompletes.iter().filter(|w| w.input() == target) {
                    outcome.default_prevented |= widget.on_keydown(key);
                }
            }
            EventKind::MouseDown => {
                for widget in &self.autocompletes {
                    let inside = widget.contains(&self.doc.borrow(), target);
                    if inside {
                        widget.on_mousedown(target);
                    }
                }
            }
            EventKind::Focus => {
                for widget in self.autocompletes.iter().filter(|w| w.input() == target) {
                    widget.on_focus();
                }
            }
            EventKind::Blur => {
                for widget in self.autocompletes.iter().filter(|w| w.input() == target) {
                    widget.on_blur();
                }
            }
        }
        outcome
    }

    /// Sets the value of `node` and fires `input`.
    pub fn type_text(&self, node: NodeId, text: &str) -> dom::Result<EventOutcome> {
        self.doc.borrow_mut().set_value(node, text)?;
        Ok(self.dispatch(&Event::new(EventKind::Input, node)))
    }

    /// Sets the checked state of `node` and fires `change`.
    pub fn set_checked(&self, node: NodeId, checked: bool) -> dom::Result<EventOutcome> {
        self.doc.borrow_mut().set_checked(node, checked)?;
        Ok(self.dispatch(&Event::new(EventKind::Change, node)))
    }

    pub fn click(&self, node: NodeId) -> EventOutcome {
        self.dispatch(&Event::new(EventKind::Click, node))
    }

    pub fn press_key(&self, node: NodeId, key: Key) -> EventOutcome {
        self.dispatch(&Event::new(EventKind::KeyDown(key), node))
    }

    pub fn mouse_down(&self, node: NodeId) -> EventOutcome {
        self.dispatch(&Event::new(EventKind::MouseDown, node))
    }

    pub fn focus(&self, node: NodeId) -> EventOutcome {
        self.dispatch(&Event::new(EventKind::Focus, node))
    }

    pub fn blur(&self, node: NodeId) -> EventOutcome {
        self.dispatch(&Event::new(EventKind::Blur, node))
    }
}

impl<S> Page<S> {
    pub fn document(&self) -> Ref<'_, Document> {
        self.doc.borrow()
    }

    pub fn shared_document(&self) -> SharedDocument {
        Rc::clone(&self.doc)
    }

    pub fn multiselect(&self) -> Option<&MultiselectMirror> {
        self.multiselect.as_ref()
    }

    pub fn password_meter(&self) -> Option<&PasswordMeter> {
        self.meter.as_ref()
    }

    pub fn autocompletes(&self) -> &[Autocomplete<S>] {
        &self.autocompletes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::SuggestError;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::task::LocalSet;

    struct FixedSource(Value);

    impl SuggestSource for FixedSource {
        async fn suggest(&self, _endpoint: &str, _query: &str) -> Result<Value, SuggestError> {
            Ok(self.0.clone())
        }
    }

    fn sponsor_form() -> Document {
        let mut doc = Document::new();
        let body = doc.root();
        let form = doc.append_element(body, "form", &[]).unwrap();
        let select = doc
            .append_element(form, "select", &[("id", "sponsors"), ("multiple", "")])
            .unwrap();
        for (value, label) in [("1", "Acme Freight"), ("2", "Globex"), ("3", "Initech")] {
            let option = doc.append_element(select, "option", &[("value", value)]).unwrap();
            doc.set_text_content(option, label).unwrap();
        }
        doc.append_element(form, "button", &[("id", "select-all-sponsors")]).unwrap();
        doc.append_element(form, "button", &[("id", "clear-all-sponsors")]).unwrap();

        doc.append_element(form, "input", &[("id", "id_password1"), ("type", "password")])
            .unwrap();
        doc.append_element(form, "meter", &[("id", "meter"), ("max", "4")]).unwrap();
        doc.append_element(form, "span", &[("id", "meter-text")]).unwrap();

        let ac = doc
            .append_element(
                form,
                "div",
                &[
                    ("class", "autocomplete"),
                    ("data-endpoint", "/api/sponsors/suggest/"),
                    ("data-limit", "2"),
                ],
            )
            .unwrap();
        doc.append_element(ac, "input", &[("id", "sponsor-search"), ("class", "ac-input")])
            .unwrap();
        doc.append_element(ac, "div", &[("class", "ac-panel"), ("hidden", "")]).unwrap();
        doc
    }

    fn load() -> Page<FixedSource> {
        Page::load(sponsor_form(), FixedSource(json!(["Acme Freight", "Globex", "Initech"])))
    }

    fn selected(page: &Page<FixedSource>) -> Vec<String> {
        let doc = page.document();
        page.multiselect()
            .unwrap()
            .options(&doc)
            .unwrap()
            .into_iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect()
    }

    #[test]
    fn test_empty_page_mounts_nothing() {
        let page = Page::load(Document::new(), FixedSource(json!([])));
        assert!(page.multiselect().is_none());
        assert!(page.password_meter().is_none());
        assert!(page.autocompletes().is_empty());
    }

    #[test]
    fn test_load_mounts_every_widget() {
        let page = load();
        assert!(page.multiselect().is_some());
        assert!(page.password_meter().is_some());
        assert_eq!(page.autocompletes().len(), 1);
        let doc = page.document();
        assert_eq!(doc.text_content(doc.by_id("meter-text").unwrap()), "Very weak");
    }

    #[test]
    fn test_checkbox_changes_sync_select() {
        let page = load();
        let boxes = page.multiselect().unwrap().checkboxes().to_vec();

        page.set_checked(boxes[0], true).unwrap();
        page.set_checked(boxes[2], true).unwrap();
        assert_eq!(selected(&page), vec!["1", "3"]);

        page.set_checked(boxes[0], false).unwrap();
        assert_eq!(selected(&page), vec!["3"]);
    }

    #[test]
    fn test_bulk_buttons() {
        let page = load();
        let (select_all, clear_all) = {
            let doc = page.document();
            (
                doc.by_id("select-all-sponsors").unwrap(),
                doc.by_id("clear-all-sponsors").unwrap(),
            )
        };

        page.click(select_all);
        assert_eq!(selected(&page), vec!["1", "2", "3"]);

        page.click(clear_all);
        assert!(selected(&page).is_empty());
    }

    #[test]
    fn test_change_outside_wrapper_is_ignored() {
        let page = load();
        let password = page.document().by_id("id_password1").unwrap();
        let boxes = page.multiselect().unwrap().checkboxes().to_vec();
        page.shared_document().borrow_mut().set_checked(boxes[1], true).unwrap();

        page.set_checked(password, true).unwrap();
        assert!(selected(&page).is_empty());
    }

    #[test]
    fn test_typing_password_updates_meter() {
        let page = load();
        let input = page.document().by_id("id_password1").unwrap();

        page.type_text(input, "hunter2").unwrap();
        {
            let doc = page.document();
            assert_eq!(doc.meter_value(doc.by_id("meter").unwrap()).unwrap(), 2.0);
            assert_eq!(doc.text_content(doc.by_id("meter-text").unwrap()), "Okay");
        }

        page.type_text(input, "").unwrap();
        let doc = page.document();
        assert_eq!(doc.text_content(doc.by_id("meter-text").unwrap()), "Very weak");
    }

    #[tokio::test(start_paused = true)]
    async fn test_autocomplete_keyboard_flow() {
        LocalSet::new()
            .run_until(async {
                let page = load();
                let input = page.document().by_id("sponsor-search").unwrap();

                page.type_text(input, "ac").unwrap();
                tokio::time::sleep(Duration::from_millis(200)).await;
                let widget = &page.autocompletes()[0];
                assert_eq!(widget.rows().len(), 2);

                assert!(page.press_key(input, Key::ArrowDown).default_prevented);
                assert!(!page.press_key(input, Key::Enter).default_prevented);
                assert_eq!(page.document().value(input).unwrap(), "Globex");
                assert!(!widget.is_open());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_autocomplete_mouse_flow() {
        LocalSet::new()
            .run_until(async {
                let page = load();
                let input = page.document().by_id("sponsor-search").unwrap();

                page.focus(input);
                page.type_text(input, "ac").unwrap();
                tokio::time::sleep(Duration::from_millis(200)).await;

                let first = page.autocompletes()[0].rows()[0];
                page.mouse_down(first);
                page.blur(input);
                assert_eq!(page.document().value(input).unwrap(), "Acme Freight");

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert!(!page.autocompletes()[0].is_open());
            })
            .await;
    }

    #[test]
    fn test_keys_on_other_targets_are_ignored() {
        let page = load();
        let password = page.document().by_id("id_password1").unwrap();
        assert_eq!(page.press_key(password, Key::ArrowDown), EventOutcome::default());
    }
}
