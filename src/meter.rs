//! Password strength meter bound to a registration or password-change form.

use secrecy::SecretString;

use crate::dom::{Document, NodeId, Result};
use crate::evaluator::score_password;
use crate::types::PasswordScore;

/// Password inputs the meter binds to, in priority order.
pub const PASSWORD_FIELD_IDS: [&str; 2] = ["id_password1", "id_new_password1"];
pub const METER_ID: &str = "meter";
pub const METER_TEXT_ID: &str = "meter-text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordMeter {
    input: NodeId,
    meter: Option<NodeId>,
    meter_text: Option<NodeId>,
}

impl PasswordMeter {
    /// Binds to the first password field present and renders the initial score.
    ///
    /// Returns `Ok(None)` when the page has no password field.
    pub fn attach(doc: &mut Document) -> Result<Option<Self>> {
        let Some(input) = PASSWORD_FIELD_IDS.iter().find_map(|id| doc.by_id(id)) else {
            return Ok(None);
        };
        let meter = Self {
            input,
            meter: doc.by_id(METER_ID),
            meter_text: doc.by_id(METER_TEXT_ID),
        };
        meter.update(doc)?;
        Ok(Some(meter))
    }

    pub fn input(&self) -> NodeId {
        self.input
    }

    /// Rescores the current field value and refreshes the meter and its label.
    pub fn update(&self, doc: &mut Document) -> Result<PasswordScore> {
        let password = SecretString::new(doc.value(self.input)?.to_string().into());
        let score = score_password(&password);
        if let Some(meter) = self.meter {
            doc.set_meter_value(meter, f64::from(score.value()))?;
        }
        if let Some(text) = self.meter_text {
            doc.set_text_content(text, score.strength().label())?;
        }
        Ok(score)
    }
}
