//! Application name validation and the Salesforce names derived from it

use crate::error::{ReactforceError, Result};
use serde::Serialize;
use std::fmt;

/// Longest accepted app name; leaves room for the `LtgCtrl` suffix under
/// the 40 character Apex class name limit.
pub const MAX_APP_NAME_LEN: usize = 33;

/// Check the Salesforce developer-name rules shared by classes, pages,
/// components and static resources.
pub fn validate_identifier(kind: &'static str, raw: &str) -> Result<()> {
    let invalid = |reason| ReactforceError::InvalidName {
        kind,
        name: raw.to_string(),
        reason,
    };

    let mut chars = raw.chars();
    match chars.next() {
        None => return Err(invalid("must not be empty")),
        Some(c) if !c.is_ascii_alphabetic() => return Err(invalid("must start with a letter")),
        Some(_) => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("may only contain letters, digits and underscores"));
    }
    if raw.contains("__") {
        return Err(invalid("must not contain consecutive underscores"));
    }
    if raw.ends_with('_') {
        return Err(invalid("must not end with an underscore"));
    }
    Ok(())
}

/// A validated application name, usable as an Apex identifier prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppName(String);

impl AppName {
    pub fn parse(raw: &str) -> Result<Self> {
        validate_identifier("app name", raw)?;
        if raw.len() > MAX_APP_NAME_LEN {
            return Err(ReactforceError::InvalidName {
                kind: "app name",
                name: raw.to_string(),
                reason: "must be at most 33 characters",
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name of the generated React app under `reactforce/`
    pub fn react_dir_name(&self) -> String {
        self.0.to_lowercase()
    }

    /// Apex controller backing the Visualforce page
    pub fn controller(&self) -> String {
        format!("{}Ctrl", self.0)
    }

    /// Apex controller backing the Lightning component
    pub fn lightning_controller(&self) -> String {
        format!("{}LtgCtrl", self.0)
    }

    pub fn visualforce_page(&self) -> String {
        format!("{}Vf", self.0)
    }

    /// Aura bundle and flexipage name
    pub fn lightning_component(&self) -> String {
        format!("{}Ltg", self.0)
    }

    pub fn static_resource(&self) -> String {
        self.0.clone()
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let name = AppName::parse("Acme").unwrap();
        assert_eq!(name.controller(), "AcmeCtrl");
        assert_eq!(name.lightning_controller(), "AcmeLtgCtrl");
        assert_eq!(name.visualforce_page(), "AcmeVf");
        assert_eq!(name.lightning_component(), "AcmeLtg");
        assert_eq!(name.static_resource(), "Acme");
        assert_eq!(name.react_dir_name(), "acme");
    }

    #[test]
    fn test_rejects_invalid_names() {
        for raw in ["", "1Acme", "Ac-me", "Ac me", "Ac__me", "Acme_", "Ácme"] {
            assert!(AppName::parse(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_accepts_underscores_and_digits() {
        assert!(AppName::parse("Customer_Portal2").is_ok());
    }

    #[test]
    fn test_error_names_the_kind() {
        let err = validate_identifier("static resource name", "my-assets").unwrap_err();
        assert!(err.to_string().starts_with("Invalid static resource name 'my-assets'"));
    }

    #[test]
    fn test_length_limit() {
        let ok = "A".repeat(MAX_APP_NAME_LEN);
        let too_long = "A".repeat(MAX_APP_NAME_LEN + 1);
        assert!(AppName::parse(&ok).is_ok());
        assert!(AppName::parse(&too_long).is_err());
    }
}
