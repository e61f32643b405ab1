//! Jurisdiction buckets for fee and routing policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse jurisdiction bucket driving fee percentage, hold days, and
/// provider routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Jurisdiction {
    /// Haiti: mobile-money rails, typically zero hold days.
    Haiti,
    /// United States and Canada: connected-account payout rails.
    UsCanada,
}

impl Jurisdiction {
    /// Resolves the jurisdiction bucket from an event's country code.
    ///
    /// `HT` / `HAITI` (case-insensitive) map to Haiti; everything else
    /// defaults to the US/Canada bucket.
    #[must_use]
    pub fn resolve(country_code: &str) -> Self {
        match country_code.trim().to_uppercase().as_str() {
            "HT" | "HAITI" => Self::Haiti,
            _ => Self::UsCanada,
        }
    }

    /// Returns the string representation of the bucket.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Haiti => "haiti",
            Self::UsCanada => "us-canada",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HT", Jurisdiction::Haiti)]
    #[case("ht", Jurisdiction::Haiti)]
    #[case("HAITI", Jurisdiction::Haiti)]
    #[case("haiti", Jurisdiction::Haiti)]
    #[case(" ht ", Jurisdiction::Haiti)]
    #[case("US", Jurisdiction::UsCanada)]
    #[case("CA", Jurisdiction::UsCanada)]
    #[case("FR", Jurisdiction::UsCanada)]
    #[case("", Jurisdiction::UsCanada)]
    fn test_resolve(#[case] code: &str, #[case] expected: Jurisdiction) {
        assert_eq!(Jurisdiction::resolve(code), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Jurisdiction::Haiti.to_string(), "haiti");
        assert_eq!(Jurisdiction::UsCanada.to_string(), "us-canada");
    }
}
