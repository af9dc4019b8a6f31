//! Length section - checks the policy minimum length.

use secrecy::{ExposeSecret, SecretString};
use super::SectionResult;
use crate::policy::PasswordPolicy;

/// Checks if the password meets the policy minimum length.
///
/// Length is counted in characters, not bytes.
pub fn length_section(password: &SecretString, policy: &PasswordPolicy) -> SectionResult {
    if password.expose_secret().chars().count() < policy.min_length {
        return Some(format!(
            "Password must be at least {} characters.",
            policy.min_length
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_section_too_short() {
        let pwd = SecretString::new("Short1!".to_string().into());
        let result = length_section(&pwd, &PasswordPolicy::default());
        assert_eq!(
            result,
            Some("Password must be at least 12 characters.".to_string())
        );
    }

    #[test]
    fn test_length_section_exactly_minimum() {
        let pwd = SecretString::new("123456789012".to_string().into());
        let result = length_section(&pwd, &PasswordPolicy::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_length_section_counts_chars() {
        let policy = PasswordPolicy { min_length: 4, ..Default::default() };
        let pwd = SecretString::new("éé".to_string().into());
        assert!(length_section(&pwd, &policy).is_some());
    }
}
