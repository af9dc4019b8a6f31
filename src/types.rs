//! Score and evaluation types shared by the evaluator and the meter.

use std::fmt;

/// Highest score a password can reach.
pub const MAX_SCORE: u8 = 4;

/// Heuristic password score in `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PasswordScore(u8);

impl PasswordScore {
    /// Creates a score, capping it at [`MAX_SCORE`].
    pub fn new(value: u8) -> Self {
        Self(value.min(MAX_SCORE))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn strength(&self) -> PasswordStrength {
        match self.0 {
            0 => PasswordStrength::VeryWeak,
            1 => PasswordStrength::Weak,
            2 => PasswordStrength::Okay,
            3 => PasswordStrength::Good,
            _ => PasswordStrength::Strong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordStrength {
    NotEvaluated,
    VeryWeak,
    Weak,
    Okay,
    Good,
    Strong,
}

impl PasswordStrength {
    /// Text shown next to the meter.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotEvaluated => "—",
            Self::VeryWeak => "Very weak",
            Self::Weak => "Weak",
            Self::Okay => "Okay",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score plus the policy requirements the password does not meet.
///
/// `score` is `None` when the evaluation was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasswordEvaluation {
    pub score: Option<PasswordScore>,
    pub reasons: Vec<String>,
}

impl PasswordEvaluation {
    pub fn strength(&self) -> PasswordStrength {
        self.score
            .map(|score| score.strength())
            .unwrap_or(PasswordStrength::NotEvaluated)
    }

    /// True when the password satisfies every policy requirement.
    pub fn is_acceptable(&self) -> bool {
        self.score.is_some() && self.reasons.is_empty()
    }
}
