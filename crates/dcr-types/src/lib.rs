//! Validated primitive types shared across the DCR crates.
//!
//! These wrappers exist so that "a name is never blank" and "a phone number is
//! dialable" are enforced once, at construction, instead of being re-checked at
//! every call site.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a dialable phone number
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. Input is trimmed during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A phone number in international dialling form.
///
/// DCR sends appointment reminders through an external messaging gateway that
/// expects E.164-style numbers (`+` followed by 7 to 15 digits). Spaces and
/// hyphens are accepted on input and stripped; anything else is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses a phone number, normalising separators.
    ///
    /// # Errors
    ///
    /// Returns `TextError::InvalidPhone` if the normalised input is not a `+`
    /// followed by 7 to 15 digits.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let normalised: String = input
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        let digits = match normalised.strip_prefix('+') {
            Some(rest) => rest,
            None => {
                return Err(TextError::InvalidPhone(format!(
                    "must start with '+', got: '{}'",
                    input.as_ref()
                )))
            }
        };

        if !(7..=15).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TextError::InvalidPhone(format!(
                "expected 7-15 digits after '+', got: '{}'",
                input.as_ref()
            )));
        }

        Ok(Self(normalised))
    }

    /// Returns the normalised number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  hello  ").unwrap();
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn non_empty_text_rejects_whitespace_only() {
        let err = NonEmptyText::new("   ").unwrap_err();
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn phone_number_accepts_separators() {
        let phone = PhoneNumber::parse("+52 55 1234-5678").unwrap();
        assert_eq!(phone.as_str(), "+525512345678");
    }

    #[test]
    fn phone_number_requires_plus_prefix() {
        let err = PhoneNumber::parse("5512345678").unwrap_err();
        assert!(matches!(err, TextError::InvalidPhone(_)));
    }

    #[test]
    fn phone_number_rejects_letters() {
        let err = PhoneNumber::parse("+52abc45678").unwrap_err();
        assert!(matches!(err, TextError::InvalidPhone(_)));
    }

    #[test]
    fn phone_number_round_trips_through_serde() {
        let phone = PhoneNumber::parse("+525512345678").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+525512345678\"");
        let back: PhoneNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phone);
    }
}
