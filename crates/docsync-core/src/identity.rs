//! Identity resolution
//!
//! The identity is the string that namespaces a user's documents on the
//! server. It comes either from an explicit name the user typed (sanitized)
//! or from the device name supplied by the calling shell.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while resolving an identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Neither the explicit name nor the device name yielded anything usable
    #[error("No usable identity: the user name and device name are both empty")]
    Empty,
}

/// Resolved identity used to namespace documents on the server
///
/// Never empty. Construct through [`resolve_identity`] or [`Identity::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Wrap an already-resolved identity string
    ///
    /// Returns an error if the value is empty or whitespace only.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self(value))
    }

    /// Get the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve the session identity
///
/// An explicit, non-empty name wins after sanitization. If sanitizing leaves
/// no ASCII alphanumeric character, the explicit name is ignored and the
/// device name is used instead.
pub fn resolve_identity(
    explicit: Option<&str>,
    device_name: &str,
) -> Result<Identity, IdentityError> {
    if let Some(raw) = explicit.filter(|s| !s.is_empty()) {
        let sanitized = sanitize_username(raw);
        if sanitized.chars().any(|c| c.is_ascii_alphanumeric()) {
            debug!("Using explicit identity {:?}", sanitized);
            return Ok(Identity(sanitized));
        }
        warn!(
            "User name {:?} has no ASCII letters or digits, falling back to device name",
            raw
        );
    }

    let from_device = user_from_device_name(device_name);
    debug!("Using identity {:?} from device name", from_device);
    Identity::new(from_device)
}

/// Sanitize a user-typed name
///
/// Spaces become hyphens; anything other than ASCII letters, digits and
/// hyphens is dropped.
pub fn sanitize_username(raw: &str) -> String {
    raw.replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Extract the owner from a device name of the form `iPad de <name>`
///
/// Returns the device name unchanged when it does not follow that pattern.
pub fn user_from_device_name(device_name: &str) -> &str {
    let mut tokens = device_name.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some("iPad"), Some("de"), Some(owner)) => owner,
        _ => device_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_name_pattern() {
        let id = resolve_identity(None, "iPad de Marta").unwrap();
        assert_eq!(id.as_str(), "Marta");

        // Only the first word after "de" is taken
        let id = resolve_identity(None, "iPad de Juan Carlos").unwrap();
        assert_eq!(id.as_str(), "Juan");
    }

    #[test]
    fn test_device_name_unchanged_when_not_ipad() {
        let id = resolve_identity(None, "iPhone de Juan Pérez").unwrap();
        assert_eq!(id.as_str(), "iPhone de Juan Pérez");
    }

    #[test]
    fn test_device_name_unchanged_when_too_short() {
        let id = resolve_identity(None, "Workstation-1").unwrap();
        assert_eq!(id.as_str(), "Workstation-1");

        let id = resolve_identity(None, "iPad de").unwrap();
        assert_eq!(id.as_str(), "iPad de");
    }

    #[test]
    fn test_explicit_name_is_sanitized() {
        let id = resolve_identity(Some("Juan Pérez"), "anything").unwrap();
        assert_eq!(id.as_str(), "Juan-Prez");

        let id = resolve_identity(Some("ana.maria@home"), "anything").unwrap();
        assert_eq!(id.as_str(), "anamariahome");
    }

    #[test]
    fn test_explicit_name_wins_over_device() {
        let id = resolve_identity(Some("bob"), "iPad de Marta").unwrap();
        assert_eq!(id.as_str(), "bob");
    }

    #[test]
    fn test_empty_explicit_uses_device() {
        let id = resolve_identity(Some(""), "iPad de Marta").unwrap();
        assert_eq!(id.as_str(), "Marta");
    }

    #[test]
    fn test_unusable_explicit_falls_back_to_device() {
        let id = resolve_identity(Some("Łódź"), "iPad de Marta").unwrap();
        // Only the plain "d" survives, which is still usable
        assert_eq!(id.as_str(), "d");

        let id = resolve_identity(Some("日本語"), "iPad de Marta").unwrap();
        assert_eq!(id.as_str(), "Marta");

        let id = resolve_identity(Some("   "), "Workstation-1").unwrap();
        assert_eq!(id.as_str(), "Workstation-1");
    }

    #[test]
    fn test_empty_everything_is_an_error() {
        assert_eq!(resolve_identity(None, ""), Err(IdentityError::Empty));
        assert_eq!(resolve_identity(Some("!!"), "  "), Err(IdentityError::Empty));
    }

    #[test]
    fn test_sanitized_output_shape() {
        let inputs = [
            "a",
            "Juan Pérez",
            "  leading and trailing  ",
            "tabs\tand\nnewlines 1",
            "semi;colon/slash\\back",
            "--x--",
        ];
        for input in inputs {
            let id = resolve_identity(Some(input), "device").unwrap();
            let s = id.as_str();
            assert!(!s.is_empty(), "{input:?}");
            assert!(!s.contains(' '), "{input:?}");
            assert!(
                s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'),
                "{input:?} -> {s:?}"
            );
        }
    }

    #[test]
    fn test_identity_new_rejects_blank() {
        assert!(Identity::new("").is_err());
        assert!(Identity::new(" \t").is_err());
        assert_eq!(Identity::new("x").unwrap().to_string(), "x");
    }
}
