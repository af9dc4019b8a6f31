//! Character variety sections - uppercase, lowercase, digits, symbols.

use secrecy::{ExposeSecret, SecretString};
use super::SectionResult;
use crate::policy::PasswordPolicy;

/// Punctuation accepted as a symbol.
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:'\",.<>/?\\|`~";

pub fn has_upper(pwd: &str) -> bool {
    pwd.chars().any(|c| c.is_ascii_uppercase())
}

pub fn has_lower(pwd: &str) -> bool {
    pwd.chars().any(|c| c.is_ascii_lowercase())
}

pub fn has_digit(pwd: &str) -> bool {
    pwd.chars().any(|c| c.is_ascii_digit())
}

pub fn has_symbol(pwd: &str) -> bool {
    pwd.chars().any(|c| SYMBOLS.contains(c))
}

pub fn uppercase_section(password: &SecretString, policy: &PasswordPolicy) -> SectionResult {
    (policy.require_upper && !has_upper(password.expose_secret()))
        .then(|| "Include at least one uppercase letter.".to_string())
}

pub fn lowercase_section(password: &SecretString, policy: &PasswordPolicy) -> SectionResult {
    (policy.require_lower && !has_lower(password.expose_secret()))
        .then(|| "Include at least one lowercase letter.".to_string())
}

pub fn digit_section(password: &SecretString, policy: &PasswordPolicy) -> SectionResult {
    (policy.require_digit && !has_digit(password.expose_secret()))
        .then(|| "Include at least one number.".to_string())
}

pub fn symbol_section(password: &SecretString, policy: &PasswordPolicy) -> SectionResult {
    (policy.require_symbol && !has_symbol(password.expose_secret()))
        .then(|| "Include at least one symbol.".to_string())
}
