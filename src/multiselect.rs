//! Checkbox list mirroring a hidden native multi-select.

use crate::dom::{Document, NodeId, Result};

pub const WRAPPER_CLASS: &str = "checkbox-multiselect-wrapper";

/// Element ids the mirror looks up on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiselectIds {
    pub select: String,
    pub select_all: String,
    pub clear_all: String,
}

impl Default for MultiselectIds {
    fn default() -> Self {
        Self {
            select: "sponsors".to_string(),
            select_all: "select-all-sponsors".to_string(),
            clear_all: "clear-all-sponsors".to_string(),
        }
    }
}

/// One option of the native select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiselectMirror {
    select: NodeId,
    wrapper: NodeId,
    checkboxes: Vec<NodeId>,
    select_all: Option<NodeId>,
    clear_all: Option<NodeId>,
}

impl MultiselectMirror {
    /// Hides the select and inserts the checkbox list right after it.
    ///
    /// Returns `Ok(None)` when the select is not on the page.
    pub fn attach(doc: &mut Document, ids: &MultiselectIds) -> Result<Option<Self>> {
        let Some(select) = doc.by_id(&ids.select) else {
            return Ok(None);
        };

        doc.set_style(select, "display", "none")?;

        let wrapper = doc.create_element("div");
        doc.set_attribute(wrapper, "class", WRAPPER_CLASS)?;
        for (property, value) in [
            ("max-height", "300px"),
            ("overflow-y", "auto"),
            ("border", "1px solid #ccc"),
            ("border-radius", "6px"),
            ("padding", "12px"),
            ("width", "400px"),
            ("background", "#fafafa"),
        ] {
            doc.set_style(wrapper, property, value)?;
        }

        let mut checkboxes = Vec::new();
        for option in select_options(doc, select)? {
            let row = doc.append_element(wrapper, "label", &[])?;
            doc.set_style(row, "display", "flex")?;
            doc.set_style(row, "align-items", "center")?;
            doc.set_style(row, "gap", "8px")?;
            doc.set_style(row, "cursor", "pointer")?;

            let checkbox = doc.append_element(
                row,
                "input",
                &[("type", "checkbox"), ("value", option.value.as_str())],
            )?;
            doc.set_dataset(checkbox, "option-value", &option.value)?;
            doc.set_checked(checkbox, option.selected)?;
            let text = doc.create_text(&option.label);
            doc.append_child(row, text)?;
            checkboxes.push(checkbox);
        }

        doc.insert_after(select, wrapper)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("multiselect mirror built with {} options", checkboxes.len());

        Ok(Some(Self {
            select,
            wrapper,
            checkboxes,
            select_all: doc.by_id(&ids.select_all),
            clear_all: doc.by_id(&ids.clear_all),
        }))
    }

    pub fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    pub fn checkboxes(&self) -> &[NodeId] {
        &self.checkboxes
    }

    /// True when a `change` on `target` belongs to this mirror.
    pub fn handles_change(&self, doc: &Document, target: NodeId) -> bool {
        target == self.wrapper || doc.is_descendant_of(target, self.wrapper)
    }

    pub fn is_select_all(&self, target: NodeId) -> bool {
        self.select_all == Some(target)
    }

    pub fn is_clear_all(&self, target: NodeId) -> bool {
        self.clear_all == Some(target)
    }

    /// Marks each option selected iff a checked box carries its value.
    pub fn sync_to_select(&self, doc: &mut Document) -> Result<()> {
        let mut checked_values = Vec::new();
        for checkbox in &self.checkboxes {
            if doc.checked(*checkbox)? {
                checked_values.push(doc.value(*checkbox)?.to_string());
            }
        }
        for option in doc.query_tag(self.select, "option") {
            let selected = {
                let value = doc.value(option)?;
                checked_values.iter().any(|v| *v == value)
            };
            doc.set_selected(option, selected)?;
        }
        Ok(())
    }

    pub fn select_all(&self, doc: &mut Document) -> Result<()> {
        self.set_all(doc, true)
    }

    pub fn clear_all(&self, doc: &mut Document) -> Result<()> {
        self.set_all(doc, false)
    }

    fn set_all(&self, doc: &mut Document, checked: bool) -> Result<()> {
        for checkbox in &self.checkboxes {
            doc.set_checked(*checkbox, checked)?;
        }
        self.sync_to_select(doc)
    }

    /// Current state of the native select.
    pub fn options(&self, doc: &Document) -> Result<Vec<SelectOption>> {
        select_options(doc, self.select)
    }
}

fn select_options(doc: &Document, select: NodeId) -> Result<Vec<SelectOption>> {
    doc.query_tag(select, "option")
        .into_iter()
        .map(|option| {
            Ok(SelectOption {
                value: doc.value(option)?.to_string(),
                label: doc.text_content(option),
                selected: doc.selected(option)?,
            })
        })
        .collect()
}
