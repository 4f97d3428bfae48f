//! Customer name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CustomerName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerNameError {
    /// The input string is too long.
    #[error("customer name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The name written on a transaction.
///
/// Walk-in orders without a name are recorded under [`CustomerName::GENERAL`].
///
/// ## Examples
///
/// ```
/// use kasir_core::CustomerName;
///
/// assert_eq!(CustomerName::parse(Some("  budi ")).unwrap().as_str(), "budi");
/// assert_eq!(CustomerName::parse(None).unwrap().as_str(), "Umum");
/// assert_eq!(CustomerName::parse(Some("   ")).unwrap().as_str(), "Umum");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    /// Sentinel used when no name was given ("general").
    pub const GENERAL: &'static str = "Umum";

    /// Maximum length of a customer name, in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse an optional, untrimmed name.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is longer than
    /// [`CustomerName::MAX_LENGTH`] characters.
    pub fn parse(input: Option<&str>) -> Result<Self, CustomerNameError> {
        let trimmed = input.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Ok(Self::general());
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(CustomerNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The walk-in sentinel name.
    #[must_use]
    pub fn general() -> Self {
        Self(Self::GENERAL.to_owned())
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased form used in reports (`"budi santoso"` -> `"Budi Santoso"`).
    #[must_use]
    pub fn title_case(&self) -> String {
        self.0
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CustomerName {
    fn default() -> Self {
        Self::general()
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
