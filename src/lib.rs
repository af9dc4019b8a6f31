//! Form enhancement widgets
//!
//! This library provides three independent widgets written against a small
//! document model:
//!
//! - a checkbox list mirroring a hidden multi-select (`#sponsors`),
//! - a password strength meter (`#id_password1` / `#id_new_password1`),
//! - a debounced autocomplete for every `.autocomplete` root.
//!
//! # Features
//!
//! - `http` (default): Enables the reqwest-backed [`HttpSuggestSource`]
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_POLICY_PATH`: Custom path to the password policy file
//!   (default: `./config/password_policy.toml`)
//!
//! # Example
//!
//! ```rust,no_run
//! use form_widgets::{Document, HttpSuggestSource, Page};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! let body = doc.root();
//! let field = doc.append_element(body, "input", &[("id", "id_password1")])?;
//! let label = doc.append_element(body, "span", &[("id", "meter-text")])?;
//!
//! let source = HttpSuggestSource::new("https://example.com")?;
//! let page = Page::load(doc, source);
//! page.type_text(field, "Tr0ub4dor&3")?;
//!
//! println!("Strength: {}", page.document().text_content(label));
//! # Ok(())
//! # }
//! ```

// Internal modules
mod evaluator;
mod policy;
mod sections;
mod types;

pub mod autocomplete;
pub mod dom;
pub mod event;
pub mod meter;
pub mod multiselect;
pub mod page;

// Public API
pub use autocomplete::{Autocomplete, AutocompleteConfig, SuggestError, SuggestSource, Suggestion};
#[cfg(feature = "http")]
pub use autocomplete::HttpSuggestSource;
pub use dom::{Document, DomError, NodeId, SharedDocument};
pub use evaluator::{evaluate_password, score_password};
pub use event::{Event, EventKind, EventOutcome, Key};
pub use meter::PasswordMeter;
pub use multiselect::{MultiselectIds, MultiselectMirror, SelectOption};
pub use page::Page;
pub use policy::{
    current_policy, get_policy_path, init_policy, init_policy_from_path, load_policy,
    PasswordPolicy, PolicyError,
};
pub use types::{PasswordEvaluation, PasswordScore, PasswordStrength, MAX_SCORE};
