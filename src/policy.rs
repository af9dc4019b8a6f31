//! Password policy management module
//!
//! Handles loading the password policy and checking passwords against it.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::sections::{
    digit_section, length_section, lowercase_section, symbol_section, uppercase_section,
    SectionResult,
};

static CURRENT_POLICY: RwLock<Option<PasswordPolicy>> = RwLock::new(None);

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Policy file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read policy file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Policy file is empty")]
    EmptyFile,
    #[error("Invalid policy file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Requirements a password must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_upper: bool,
    pub require_lower: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            require_upper: true,
            require_lower: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    /// Returns one message per unmet requirement, in a stable order.
    pub fn validate(&self, password: &SecretString) -> Vec<String> {
        let sections: [fn(&SecretString, &PasswordPolicy) -> SectionResult; 5] = [
            length_section,
            uppercase_section,
            lowercase_section,
            digit_section,
            symbol_section,
        ];
        sections
            .iter()
            .filter_map(|section| section(password, self))
            .collect()
    }

    /// Human-readable summary of the policy, e.g. for a form field help text.
    pub fn help_text(&self) -> String {
        let mut parts = vec![format!("at least {} characters", self.min_length)];
        if self.require_upper {
            parts.push("an uppercase letter".to_string());
        }
        if self.require_lower {
            parts.push("a lowercase letter".to_string());
        }
        if self.require_digit {
            parts.push("a number".to_string());
        }
        if self.require_symbol {
            parts.push("a symbol".to_string());
        }
        format!("Your password must include {}.", parts.join(", "))
    }
}

/// Returns the policy file path.
///
/// Priority:
/// 1. Environment variable `PWD_POLICY_PATH`
/// 2. Default path `./config/password_policy.toml`
pub fn get_policy_path() -> PathBuf {
    std::env::var("PWD_POLICY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./config/password_policy.toml"))
}

/// Reads a policy file without touching the cached policy.
///
/// Keys missing from the file keep their default value.
pub fn load_policy<P: AsRef<std::path::Path>>(path: P) -> Result<PasswordPolicy, PolicyError> {
    let path = path.as_ref();

    if !path.exists() {
        #[cfg(feature = "tracing")]
        tracing::error!("Password policy load FAILED: FileNotFound {:?}", path);
        return Err(PolicyError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;

    if content.trim().is_empty() {
        #[cfg(feature = "tracing")]
        tracing::error!("Password policy load FAILED: Empty file {:?}", path);
        return Err(PolicyError::EmptyFile);
    }

    Ok(toml::from_str(&content)?)
}

/// Initializes the process-wide policy from the file named by `PWD_POLICY_PATH`.
///
/// # Errors
///
/// Returns error if the file does not exist, cannot be read, is empty or is
/// not a valid policy.
pub fn init_policy() -> Result<PasswordPolicy, PolicyError> {
    init_policy_from_path(get_policy_path())
}

/// Initializes the process-wide policy from a specific file path.
///
/// Idempotent: once a policy is loaded later calls return it unchanged.
pub fn init_policy_from_path<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<PasswordPolicy, PolicyError> {
    {
        let guard = CURRENT_POLICY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(policy) = guard.as_ref() {
            return Ok(policy.clone());
        }
    }

    let policy = load_policy(&path)?;
    {
        let mut guard = CURRENT_POLICY.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(policy.clone());
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Password policy initialized from {:?}: {:?}", path.as_ref(), policy);

    Ok(policy)
}

/// Returns the loaded policy, or the default one if none was initialized.
pub fn current_policy() -> PasswordPolicy {
    CURRENT_POLICY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_default()
}

/// Resets the cached policy for testing purposes.
#[cfg(test)]
pub fn reset_policy_for_testing() {
    let mut guard = CURRENT_POLICY.write().unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::set_var(key, value); }
    }

    /// Helper to safely remove env var in tests
    fn remove_env(key: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::remove_var(key); }
    }

    fn policy_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "{}", content).expect("Failed to write");
        temp_file
    }

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string().into())
    }

    #[test]
    #[serial]
    fn test_get_policy_path_default() {
        remove_env("PWD_POLICY_PATH");

        let path = get_policy_path();
        assert_eq!(path, PathBuf::from("./config/password_policy.toml"));
    }

    #[test]
    #[serial]
    fn test_get_policy_path_from_env() {
        let custom_path = "/custom/path/policy.toml";
        set_env("PWD_POLICY_PATH", custom_path);

        let path = get_policy_path();
        assert_eq!(path, PathBuf::from(custom_path));

        remove_env("PWD_POLICY_PATH");
    }

    #[test]
    #[serial]
    fn test_init_policy_file_not_found() {
        reset_policy_for_testing();
        set_env("PWD_POLICY_PATH", "/nonexistent/path/policy.toml");

        let result = init_policy();
        match result {
            Err(PolicyError::FileNotFound(_)) => {}
            _ => panic!("Expected FileNotFound error"),
        }
        assert_eq!(current_policy(), PasswordPolicy::default());

        remove_env("PWD_POLICY_PATH");
    }

    #[test]
    #[serial]
    fn test_init_policy_empty_file() {
        reset_policy_for_testing();
        let temp_file = policy_file("   \n");
        set_env("PWD_POLICY_PATH", temp_file.path().to_str().unwrap());

        let result = init_policy();
        assert!(matches!(result, Err(PolicyError::EmptyFile)));

        remove_env("PWD_POLICY_PATH");
    }

    #[test]
    #[serial]
    fn test_init_policy_invalid_file() {
        reset_policy_for_testing();
        let temp_file = policy_file("min_length = \"twelve\"\n");
        set_env("PWD_POLICY_PATH", temp_file.path().to_str().unwrap());

        let result = init_policy();
        assert!(matches!(result, Err(PolicyError::Parse(_))));

        remove_env("PWD_POLICY_PATH");
    }

    #[test]
    #[serial]
    fn test_init_policy_success_keeps_defaults_for_missing_keys() {
        reset_policy_for_testing();
        let temp_file = policy_file("min_length = 8\nrequire_symbol = false\n");
        set_env("PWD_POLICY_PATH", temp_file.path().to_str().unwrap());

        let policy = init_policy().expect("policy should load");
        assert_eq!(policy.min_length, 8);
        assert!(!policy.require_symbol);
        assert!(policy.require_upper);
        assert_eq!(current_policy(), policy);

        remove_env("PWD_POLICY_PATH");
        reset_policy_for_testing();
    }

    #[test]
    #[serial]
    fn test_init_policy_is_idempotent() {
        reset_policy_for_testing();
        let first = policy_file("min_length = 8\n");
        let second = policy_file("min_length = 20\n");

        init_policy_from_path(first.path()).expect("first load");
        let policy = init_policy_from_path(second.path()).expect("second load");
        assert_eq!(policy.min_length, 8);

        reset_policy_for_testing();
    }

    #[test]
    fn test_validate_lists_every_unmet_requirement() {
        let reasons = PasswordPolicy::default().validate(&secret("abc"));
        assert_eq!(
            reasons,
            vec![
                "Password must be at least 12 characters.".to_string(),
                "Include at least one uppercase letter.".to_string(),
                "Include at least one number.".to_string(),
                "Include at least one symbol.".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate_accepts_compliant_password() {
        let reasons = PasswordPolicy::default().validate(&secret("Correct-Horse-42"));
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_help_text() {
        assert_eq!(
            PasswordPolicy::default().help_text(),
            "Your password must include at least 12 characters, an uppercase letter, \
             a lowercase letter, a number, a symbol."
        );
        let relaxed = PasswordPolicy {
            min_length: 8,
            require_upper: false,
            require_lower: false,
            require_digit: false,
            require_symbol: false,
        };
        assert_eq!(relaxed.help_text(), "Your password must include at least 8 characters.");
    }
}
