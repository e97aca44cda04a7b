//! Author-related types and functions.
//!
//! Every change to a clinic record is committed with the identity of the
//! clinician (or system job) that made it. This module holds that identity and
//! its validation.

use crate::error::{RecordError, RecordResult};
use dcr_types::NonEmptyText;

/// Represents an author of a commit or record operation.
#[derive(Clone, Debug)]
pub struct Author {
    /// The full name of the author.
    pub name: NonEmptyText,

    /// The professional role of the author (e.g., "Dentist", "Receptionist").
    pub role: NonEmptyText,

    /// The email address of the author.
    pub email: NonEmptyText,

    /// Professional registrations for the author (e.g., a cedula profesional).
    pub registrations: Vec<AuthorRegistration>,
}

/// A declared professional registration for an author.
///
/// Rendered in commit trailers as:
///
/// `Author-Registration: <authority> <number>`
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct AuthorRegistration {
    pub authority: NonEmptyText,
    pub number: NonEmptyText,
}

impl AuthorRegistration {
    pub fn new(authority: impl Into<String>, number: impl Into<String>) -> RecordResult<Self> {
        let authority_str = authority.into().trim().to_string();
        let number_str = number.into().trim().to_string();

        if authority_str.is_empty()
            || number_str.is_empty()
            || authority_str.chars().any(char::is_whitespace)
            || number_str.chars().any(char::is_whitespace)
        {
            return Err(RecordError::InvalidAuthorRegistration);
        }

        let authority = NonEmptyText::new(authority_str)
            .map_err(|_| RecordError::InvalidAuthorRegistration)?;
        let number =
            NonEmptyText::new(number_str).map_err(|_| RecordError::InvalidAuthorRegistration)?;

        Ok(Self { authority, number })
    }
}

impl Author {
    /// Validate that this author contains the mandatory commit author metadata.
    ///
    /// Intended to run before commit creation. Name, role, and email are
    /// guaranteed non-empty by `NonEmptyText`; registrations are re-validated
    /// because they may have been deserialised from external input.
    pub fn validate_commit_author(&self) -> RecordResult<()> {
        for reg in &self.registrations {
            AuthorRegistration::new(reg.authority.as_str(), reg.number.as_str())?;
        }

        Ok(())
    }

    /// The author identity used by background jobs (reminder dispatch).
    pub fn system(clinic_name: &NonEmptyText) -> Self {
        Self {
            name: NonEmptyText::new(format!("{} Reminder Service", clinic_name))
                .expect("clinic name is non-empty"),
            role: NonEmptyText::new("System").expect("literal is non-empty"),
            email: NonEmptyText::new("system@dcr.invalid").expect("literal is non-empty"),
            registrations: vec![],
        }
    }
}

#[cfg(test)]
mod author_tests {
    use super::*;

    fn base_author() -> Author {
        Author {
            name: NonEmptyText::new("Test Author").unwrap(),
            role: NonEmptyText::new("Dentist").unwrap(),
            email: NonEmptyText::new("test@example.com").unwrap(),
            registrations: vec![],
        }
    }

    #[test]
    fn registration_rejects_embedded_whitespace() {
        let err = AuthorRegistration::new("CED PROF", "12345").expect_err("expected failure");
        assert!(matches!(err, RecordError::InvalidAuthorRegistration));
    }

    #[test]
    fn validate_commit_author_accepts_valid_author() {
        let mut author = base_author();
        author.registrations =
            vec![AuthorRegistration::new("CedulaProfesional", "12345").expect("valid registration")];

        author
            .validate_commit_author()
            .expect("expected validation to succeed");
    }

    #[test]
    fn system_author_carries_clinic_name() {
        let author = Author::system(&NonEmptyText::new("Clinica Dental Sol").unwrap());
        assert_eq!(author.name.as_str(), "Clinica Dental Sol Reminder Service");
        assert_eq!(author.role.as_str(), "System");
    }
}
