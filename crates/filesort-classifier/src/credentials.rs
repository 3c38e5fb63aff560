//! API key lookup and keyring storage
//!
//! Resolution order:
//! 1. `FILESORT_API_KEY`, then `ANTHROPIC_API_KEY`
//! 2. `classifier.api_key` in the config file
//! 3. The system keyring (service `filesort`, user `anthropic`)

use tracing::{debug, info};

use filesort_core::config::ClassifierConfig;

use crate::ClassifierError;

/// Environment variables checked in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["FILESORT_API_KEY", "ANTHROPIC_API_KEY"];

/// Keyring service name
const KEYRING_SERVICE: &str = "filesort";

/// Keyring user the API key is stored under
const KEYRING_USER: &str = "anthropic";

/// Where a resolved key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment(&'static str),
    Config,
    Keyring,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Environment(var) => write!(f, "environment ({var})"),
            KeySource::Config => f.write_str("config file"),
            KeySource::Keyring => f.write_str("system keyring"),
        }
    }
}

/// Finds the API key using the process environment and the system keyring
///
/// # Errors
/// `ClassifierError::MissingCredentials` when no source has a key, or
/// `ClassifierError::Keyring` when the keyring cannot be queried.
pub fn resolve_api_key(config: &ClassifierConfig) -> Result<(String, KeySource), ClassifierError> {
    let store = KeyringCredentialStore::new();
    resolve_with(|var| std::env::var(var).ok(), config, || store.load())
}

/// Resolution with injectable environment and keyring lookups
pub fn resolve_with<E, K>(
    env: E,
    config: &ClassifierConfig,
    keyring: K,
) -> Result<(String, KeySource), ClassifierError>
where
    E: Fn(&str) -> Option<String>,
    K: FnOnce() -> Result<Option<String>, ClassifierError>,
{
    for var in API_KEY_ENV_VARS {
        if let Some(key) = env(var).filter(|k| !k.trim().is_empty()) {
            debug!(source = var, "API key found in environment");
            return Ok((key.trim().to_string(), KeySource::Environment(var)));
        }
    }

    if let Some(key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        debug!("API key found in config file");
        return Ok((key.trim().to_string(), KeySource::Config));
    }

    match keyring()? {
        Some(key) if !key.trim().is_empty() => {
            debug!("API key found in keyring");
            Ok((key.trim().to_string(), KeySource::Keyring))
        }
        _ => Err(ClassifierError::MissingCredentials),
    }
}

/// API key storage in the system keyring
#[derive(Debug, Clone, Default)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(&self) -> Result<keyring::Entry, ClassifierError> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|e| ClassifierError::Keyring(format!("failed to open entry: {e}")))
    }

    pub fn store(&self, api_key: &str) -> Result<(), ClassifierError> {
        self.entry()?
            .set_password(api_key.trim())
            .map_err(|e| ClassifierError::Keyring(format!("failed to write: {e}")))?;
        info!("API key stored in keyring");
        Ok(())
    }

    /// Returns `None` when no key has been stored
    pub fn load(&self) -> Result<Option<String>, ClassifierError> {
        match self.entry()?.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => {
                debug!("No API key in keyring");
                Ok(None)
            }
            Err(e) => Err(ClassifierError::Keyring(format!("failed to read: {e}"))),
        }
    }

    /// Removes the stored key; clearing an absent key succeeds
    pub fn clear(&self) -> Result<(), ClassifierError> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                info!("API key removed from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No API key to clear");
                Ok(())
            }
            Err(e) => Err(ClassifierError::Keyring(format!("failed to delete: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn config_with(key: Option<&str>) -> ClassifierConfig {
        ClassifierConfig {
            api_key: key.map(String::from),
            ..ClassifierConfig::default()
        }
    }

    #[test]
    fn test_filesort_env_wins() {
        let env = |var: &str| match var {
            "FILESORT_API_KEY" => Some("from-filesort".to_string()),
            "ANTHROPIC_API_KEY" => Some("from-anthropic".to_string()),
            _ => None,
        };
        let (key, source) =
            resolve_with(env, &config_with(Some("cfg")), || Ok(Some("kr".into()))).unwrap();
        assert_eq!(key, "from-filesort");
        assert_eq!(source, KeySource::Environment("FILESORT_API_KEY"));
    }

    #[test]
    fn test_anthropic_env_second() {
        let env = |var: &str| (var == "ANTHROPIC_API_KEY").then(|| "a".to_string());
        let (key, _) = resolve_with(env, &config_with(Some("cfg")), || Ok(None)).unwrap();
        assert_eq!(key, "a");
    }

    #[test]
    fn test_config_before_keyring() {
        let (key, source) = resolve_with(no_env, &config_with(Some(" cfg \n")), || {
            panic!("keyring must not be queried")
        })
        .unwrap();
        assert_eq!(key, "cfg");
        assert_eq!(source, KeySource::Config);
    }

    #[test]
    fn test_blank_values_skipped() {
        let env = |_: &str| Some("  ".to_string());
        let (key, source) =
            resolve_with(env, &config_with(Some("")), || Ok(Some("kr".into()))).unwrap();
        assert_eq!(key, "kr");
        assert_eq!(source, KeySource::Keyring);
    }

    #[test]
    fn test_nothing_found() {
        let err = resolve_with(no_env, &config_with(None), || Ok(None)).unwrap_err();
        assert!(matches!(err, ClassifierError::MissingCredentials));
    }

    #[test]
    fn test_keyring_failure_propagates() {
        let err = resolve_with(no_env, &config_with(None), || {
            Err(ClassifierError::Keyring("locked".into()))
        })
        .unwrap_err();
        assert!(matches!(err, ClassifierError::Keyring(_)));
    }
}
