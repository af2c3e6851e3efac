//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A count or duration that must not be negative was.
    #[error("{field} cannot be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_string_id!(
    /// A validated tracked-item key.
    ///
    /// Keys must be non-blank (e.g., "PROJ-482"). Uniqueness is the issue
    /// tracker's concern, not ours.
    TicketKey, "ticket key"
);

/// A confidence score in the range \[0.0, 1.0\].
///
/// Produced by ticket matching. Raw scores are summed without a cap and
/// clamped once at the end, so construction goes through [`Confidence::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    /// Creates a confidence value, clamping to \[0.0, 1.0\].
    ///
    /// NaN values become 0.0. Values outside the range are clamped.
    #[must_use]
    pub const fn clamped(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else if value > 1.0 {
            Self(1.0)
        } else {
            Self(value)
        }
    }

    /// Returns the inner f64 value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Confidence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Ok(Self::clamped(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_key_rejects_blank() {
        assert!(TicketKey::new("").is_err());
        assert!(TicketKey::new("   ").is_err());
        assert!(TicketKey::new("PROJ-1").is_ok());
    }

    #[test]
    fn ticket_key_serde_rejects_empty() {
        let result: Result<TicketKey, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
        let key: TicketKey = serde_json::from_str("\"DEV-7\"").unwrap();
        assert_eq!(key.as_str(), "DEV-7");
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for boundary tests"
    )]
    fn confidence_clamped_handles_edge_cases() {
        assert_eq!(Confidence::clamped(-1.0).value(), 0.0);
        assert_eq!(Confidence::clamped(2.4).value(), 1.0);
        assert_eq!(Confidence::clamped(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::clamped(0.5).value(), 0.5);
    }

    #[test]
    fn confidence_displays_two_decimals() {
        assert_eq!(Confidence::clamped(0.55).to_string(), "0.55");
        assert_eq!(Confidence::clamped(3.0).to_string(), "1.00");
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for boundary tests"
    )]
    fn confidence_serde_clamps_out_of_range() {
        let parsed: Confidence = serde_json::from_str("1.5").unwrap();
        assert_eq!(parsed.value(), 1.0);

        let parsed: Confidence = serde_json::from_str("-0.5").unwrap();
        assert_eq!(parsed.value(), 0.0);
    }
}
