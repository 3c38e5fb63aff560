//! `IClassifier` implementation backed by the Messages API

use async_trait::async_trait;
use tracing::{debug, instrument};

use filesort_core::config::ClassifierConfig;
use filesort_core::domain::{ClassificationResult, FileDescriptor};
use filesort_core::ports::{FolderHints, IClassifier, ProviderError};

use crate::client::AnthropicClient;
use crate::prompt::{system_prompt, user_prompt};
use crate::response::parse_classification;

/// Classifier that asks a hosted model where a file belongs
pub struct LlmClassifier {
    client: AnthropicClient,
    system_prompt: String,
    log_requests: bool,
}

impl LlmClassifier {
    pub fn new(client: AnthropicClient) -> Self {
        Self {
            client,
            system_prompt: system_prompt(),
            log_requests: false,
        }
    }

    /// Builds a classifier from the `classifier` config section
    pub fn from_config(config: &ClassifierConfig, api_key: impl Into<String>) -> Self {
        let client = AnthropicClient::with_base_url(api_key, &config.model, &config.base_url)
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature);
        Self::new(client).with_request_logging(config.log_requests)
    }

    /// Logs prompt sizes and file names of each request at debug level
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }
}

#[async_trait]
impl IClassifier for LlmClassifier {
    #[instrument(skip_all, fields(file = %descriptor.name()))]
    async fn classify(
        &self,
        descriptor: &FileDescriptor,
        hints: &FolderHints,
    ) -> Result<ClassificationResult, ProviderError> {
        let user = user_prompt(descriptor, hints);

        if self.log_requests {
            debug!(
                model = %self.client.model(),
                system_chars = self.system_prompt.len(),
                user_chars = user.len(),
                hints = hints.folders().len(),
                has_preview = descriptor.content_preview().is_some(),
                "Classification request"
            );
        }

        let reply = self.client.send_message(&self.system_prompt, &user).await?;
        let result = parse_classification(&reply)?;

        debug!(
            category = %result.category,
            path = %result.suggested_path,
            confidence = %result.confidence,
            "Classification received"
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

/// Classifier used when no API key is available
///
/// Every call fails with `MissingCredentials`, so callers fall back to the
/// extension and filename rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClassifier;

#[async_trait]
impl IClassifier for OfflineClassifier {
    async fn classify(
        &self,
        _descriptor: &FileDescriptor,
        _hints: &FolderHints,
    ) -> Result<ClassificationResult, ProviderError> {
        Err(ProviderError::MissingCredentials)
    }

    fn name(&self) -> &str {
        "offline"
    }
}
