//! Password policy sections
//!
//! Each section checks one requirement of the [`PasswordPolicy`](crate::PasswordPolicy)
//! and yields the message shown when the requirement is not met.

mod length;
mod variety;

pub use length::length_section;
pub use variety::{
    digit_section, has_digit, has_lower, has_symbol, has_upper, lowercase_section,
    symbol_section, uppercase_section,
};

/// Result type for section functions.
/// - `Some(reason)` - Requirement not met
/// - `None` - Section passed
pub type SectionResult = Option<String>;
