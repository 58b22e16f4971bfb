use serde::{Deserialize, Serialize};

use super::relay::ContactError;

/// Contact form payload as posted by the site. Missing fields arrive empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub vorname: String,
    pub nachname: String,
    pub email: String,
    pub telefonnr: Option<String>,
    pub nachricht: String,
    pub date: Option<String>,
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
}

/// A submission whose required fields are present, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub date: Option<String>,
    pub source_url: Option<String>,
}

impl ValidatedContact {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(required)
}

impl ContactSubmission {
    /// Checks the required fields, naming every missing one.
    pub fn validate(self) -> Result<ValidatedContact, ContactError> {
        let checks = [
            ("vorname", required(&self.vorname)),
            ("nachname", required(&self.nachname)),
            ("email", required(&self.email)),
            ("nachricht", required(&self.nachricht)),
        ];

        let missing: Vec<&'static str> = checks
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ContactError::Validation(missing));
        }

        let [first_name, last_name, email, message] =
            checks.map(|(_, value)| value.unwrap_or_default());

        Ok(ValidatedContact {
            first_name,
            last_name,
            email,
            phone: optional(self.telefonnr),
            message,
            date: optional(self.date),
            source_url: optional(self.source_url),
        })
    }
}
