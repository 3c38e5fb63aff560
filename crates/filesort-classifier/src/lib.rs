//! filesort classifier - LLM-backed file classification
//!
//! Implements the `IClassifier` port on top of the Anthropic Messages API.
//!
//! ## Modules
//!
//! - [`client`] - Messages API HTTP client
//! - [`credentials`] - API key lookup (environment, config, system keyring)
//! - [`prompt`] - Prompt construction from a file descriptor
//! - [`provider`] - `IClassifier` implementation
//! - [`response`] - Reply parsing into a `ClassificationResult`

pub mod client;
pub mod credentials;
pub mod prompt;
pub mod provider;
pub mod response;

pub use client::AnthropicClient;
pub use credentials::{resolve_api_key, KeySource, KeyringCredentialStore};
pub use provider::{LlmClassifier, OfflineClassifier};

use thiserror::Error;

/// Errors raised while setting up the classifier
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// No API key in the environment, the config file or the keyring
    #[error("No API key found; set FILESORT_API_KEY or run `filesort auth set-key`")]
    MissingCredentials,

    /// The system keyring could not be read or written
    #[error("Keyring error: {0}")]
    Keyring(String),
}
