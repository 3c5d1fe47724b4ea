use serde::Deserialize;
use validator::ValidateEmail;

use crate::escape_html;

/// Raw contact form payload as posted by the site.
///
/// Absent fields deserialize to empty strings so they fail the presence check
/// instead of the JSON decoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,

    #[error("Invalid email address.")]
    InvalidEmail,
}

/// A submission that passed validation, with its message HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Submission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Checks run in order and the first failure wins: presence, then email
    /// syntax. Sanitization never fails.
    pub fn into_inquiry(self) -> Result<Inquiry, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();

        if name.is_empty() || email.is_empty() || self.message.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }

        let email = email.to_owned();
        if !email.validate_email() || !is_routable_address(&email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(Inquiry {
            name: name.to_owned(),
            email,
            message: escape_html(&self.message),
        })
    }
}

/// Narrows the RFC 5321 rules to addresses a public relay can deliver to: the
/// local part is a dot-atom and the domain is a dotted host name whose last
/// label is alphabetic.
fn is_routable_address(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.split('.').any(str::is_empty) {
        return false;
    }

    let labels = domain.split('.').collect::<Vec<_>>();
    if labels.len() < 2
        || labels
            .iter()
            .any(|label| label.is_empty() || label.starts_with('-') || label.ends_with('-'))
    {
        return false;
    }

    let tld = labels[labels.len() - 1];
    tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
}
