//! Credential lookup behind a small trait.
//!
//! Provider adapters never read `std::env` directly. They ask a
//! [`CredentialSource`] instead, so tests can hand them fake keys (or no keys
//! at all) without mutating process-wide state.

use std::collections::HashMap;

/// A read-only source of named configuration values (API keys, base URLs).
pub trait CredentialSource: Send + Sync {
    /// Look up `key`. Implementations return `None` for absent values.
    fn get(&self, key: &str) -> Option<String>;

    /// Like [`CredentialSource::get`] but treats empty or whitespace-only
    /// values as absent.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }
}

/// Reads values from the process environment.
///
/// The CLI loads a `.env` file into the environment before any lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed in-memory set of values.
///
/// # Example
/// ```rust
/// use recipe_pdf2json::{CredentialSource, StaticCredentials};
///
/// let creds = StaticCredentials::new().with("OPENAI_API_KEY", "sk-test");
/// assert_eq!(creds.get("OPENAI_API_KEY").as_deref(), Some("sk-test"));
/// assert_eq!(creds.get("ANTHROPIC_API_KEY"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials_lookup() {
        let creds = StaticCredentials::new()
            .with("A", "1")
            .with("B", "2");
        assert_eq!(creds.get("A").as_deref(), Some("1"));
        assert_eq!(creds.get("B").as_deref(), Some("2"));
        assert_eq!(creds.get("C"), None);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let creds = StaticCredentials::new()
            .with("EMPTY", "")
            .with("SPACES", "   ")
            .with("SET", "x");
        assert_eq!(creds.get_non_empty("EMPTY"), None);
        assert_eq!(creds.get_non_empty("SPACES"), None);
        assert_eq!(creds.get_non_empty("SET").as_deref(), Some("x"));
    }

    #[test]
    fn env_credentials_missing_key() {
        assert_eq!(
            EnvCredentials.get("RECIPE_PDF2JSON_SURELY_UNSET_VARIABLE"),
            None
        );
    }
}
