//! Password strength evaluator - scoring and policy evaluation.

use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;

use crate::policy::PasswordPolicy;
use crate::sections::{has_digit, has_lower, has_symbol, has_upper};
use crate::types::{PasswordEvaluation, PasswordScore};

/// Length that earns the length point.
pub const LONG_PASSWORD: usize = 12;

/// Scores a password from 0 to 4.
///
/// One point each for: at least 12 characters, an uppercase letter, a
/// lowercase letter, a digit and a symbol. Five points are possible, the
/// result is capped at 4. The empty password scores 0.
pub fn score_password(password: &SecretString) -> PasswordScore {
    let pwd = password.expose_secret();
    if pwd.is_empty() {
        return PasswordScore::default();
    }

    let points = [
        pwd.chars().count() >= LONG_PASSWORD,
        has_upper(pwd),
        has_lower(pwd),
        has_digit(pwd),
        has_symbol(pwd),
    ]
    .iter()
    .filter(|&&met| met)
    .count();

    PasswordScore::new(points as u8)
}

/// Evaluates a password against a policy.
///
/// # Arguments
/// * `password` - The password to evaluate
/// * `policy` - Requirements reported as reasons
/// * `token` - Optional cancellation token
pub fn evaluate_password(
    password: &SecretString,
    policy: &PasswordPolicy,
    token: Option<CancellationToken>,
) -> PasswordEvaluation {
    if let Some(ref t) = token {
        if t.is_cancelled() {
            return PasswordEvaluation {
                score: None,
                reasons: vec!["Evaluation cancelled".to_string()],
            };
        }
    }

    PasswordEvaluation {
        score: Some(score_password(password)),
        reasons: policy.validate(password),
    }
}
