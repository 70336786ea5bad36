//! Password strength scoring.
//!
//! Five boolean predicates (lowercase, uppercase, digit, special
//! character, length) counted into a score that maps onto three display
//! tiers. The same function runs at entry creation, on secret updates, and
//! for display-only re-evaluation; it performs no I/O.

use serde::{Deserialize, Serialize};

/// Special characters counted by the strength score. The generator draws
/// from the same set, so generated passwords always satisfy the predicate.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_-+=";

/// Strength tier of a stored secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    /// Get the tier as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score a candidate secret into a strength tier.
///
/// Each satisfied predicate adds one point: lowercase, uppercase, digit,
/// one of [`SPECIAL_CHARS`], length ≥ 8. A score of 2 or less is `Weak`,
/// 3–4 is `Medium`, all 5 is `Strong`. Empty input is `Weak`.
pub fn evaluate(secret: &str) -> Strength {
    if secret.is_empty() {
        return Strength::Weak;
    }

    let has_lower = secret.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = secret.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = secret.chars().any(|c| c.is_ascii_digit());
    let has_special = secret.chars().any(|c| SPECIAL_CHARS.contains(c));
    let long_enough = secret.chars().count() >= 8;

    let score = [has_lower, has_upper, has_digit, has_special, long_enough]
        .iter()
        .filter(|&&p| p)
        .count();

    match score {
        0..=2 => Strength::Weak,
        3..=4 => Strength::Medium,
        _ => Strength::Strong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_is_weak() {
        assert_eq!(evaluate(""), Strength::Weak);
    }

    #[test]
    fn test_two_predicates_is_weak() {
        // lowercase + length only
        assert_eq!(evaluate("password"), Strength::Weak);
        assert_eq!(evaluate("abcdefgh"), Strength::Weak);
        // digits only, long
        assert_eq!(evaluate("12345678"), Strength::Weak);
    }

    #[test]
    fn test_three_to_four_predicates_is_medium() {
        // lower + upper + length
        assert_eq!(evaluate("Abcdefgh"), Strength::Medium);
        // lower + upper + digit + length
        assert_eq!(evaluate("Password1"), Strength::Medium);
        // lower + upper + digit + special, short
        assert_eq!(evaluate("Ab1!"), Strength::Medium);
    }

    #[test]
    fn test_all_predicates_is_strong() {
        assert_eq!(evaluate("P@ssw0rd!"), Strength::Strong);
        assert_eq!(evaluate("Aa1!aaaa"), Strength::Strong);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(evaluate("P@ssw0rd!"), evaluate("P@ssw0rd!"));
    }

    #[test]
    fn test_serializes_as_display_label() {
        assert_eq!(serde_json::to_string(&Strength::Weak).unwrap(), "\"Weak\"");
        assert_eq!(
            serde_json::from_str::<Strength>("\"Strong\"").unwrap(),
            Strength::Strong
        );
    }
}
