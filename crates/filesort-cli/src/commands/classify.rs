//! Classify command - Ask where a file belongs, optionally move it there
//!
//! Without `--apply` the file is only classified and the decision the daemon
//! would make is printed. With `--apply` the file goes through the same
//! placement path as a watched arrival, including the audit record.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use filesort_audit::AuditLogger;
use filesort_classifier::{resolve_api_key, ClassifierError, LlmClassifier, OfflineClassifier};
use filesort_core::config::Config;
use filesort_core::domain::ClassificationResult;
use filesort_core::ports::IClassifier;
use filesort_organize::notifier::TracingNotifier;
use filesort_organize::{
    ConfidencePolicy, DestinationResolver, MetadataExtractor, PlacementEngine, PlacementOutcome,
};

use crate::context::CliContext;
use crate::output::OutputFormatter;

#[derive(Debug, Args)]
pub struct ClassifyCommand {
    /// File to classify
    pub file: PathBuf,

    /// Move the file if the classification is confident enough
    #[arg(long)]
    pub apply: bool,
}

impl ClassifyCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();

        if !self.file.is_file() {
            anyhow::bail!("Not a file: {}", self.file.display());
        }

        let config = ctx.load_config()?;
        let classifier = classifier_for(&config, &*fmt);
        let store = ctx.open_audit_store(&config).await?;
        let engine = build_engine(&config, classifier, Arc::new(AuditLogger::new(store)));

        if self.apply {
            let outcome = engine.place(&self.file).await;
            print_outcome(&outcome, ctx, &*fmt);
            if let PlacementOutcome::Errored { message, .. } = outcome {
                anyhow::bail!(message);
            }
            return Ok(());
        }

        let (descriptor, result) = engine.classify(&self.file).await;
        let auto_move = engine.policy().should_auto_move(&result);
        let threshold = engine.policy().threshold_for(result.category);
        let destination = config
            .placement
            .base_dir()
            .join(&result.suggested_path)
            .join(descriptor.name());

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "file": descriptor.name(),
                "classification": result,
                "threshold": threshold,
                "would_move": auto_move,
                "destination": destination.display().to_string(),
            }));
            return Ok(());
        }

        print_classification(&result, &*fmt);
        if auto_move {
            fmt.info(&format!("Decision:    would move to {}", destination.display()));
        } else {
            fmt.info(&format!(
                "Decision:    would leave for review (needs confidence above {threshold:.2})"
            ));
        }
        Ok(())
    }
}

/// LLM classifier when a key is available, otherwise the offline fallback
fn classifier_for(config: &Config, fmt: &dyn OutputFormatter) -> Arc<dyn IClassifier> {
    match resolve_api_key(&config.classifier) {
        Ok((key, _)) => Arc::new(LlmClassifier::from_config(&config.classifier, key)),
        Err(ClassifierError::MissingCredentials) => {
            fmt.warn("No API key configured; using filename rules only");
            Arc::new(OfflineClassifier)
        }
        Err(e) => {
            fmt.warn(&format!("{e}; using filename rules only"));
            Arc::new(OfflineClassifier)
        }
    }
}

fn build_engine(
    config: &Config,
    classifier: Arc<dyn IClassifier>,
    audit: Arc<AuditLogger>,
) -> PlacementEngine {
    PlacementEngine::new(
        classifier,
        audit,
        Arc::new(TracingNotifier::new()),
        DestinationResolver::new(config.placement.base_dir()),
    )
    .with_extractor(MetadataExtractor::from_privacy(&config.privacy))
    .with_policy(ConfidencePolicy::from_config(&config.placement))
    .with_classify_timeout(config.classifier.timeout())
    .with_folder_hints(
        config.placement.folder_hint_depth,
        config.placement.folder_hint_limit,
    )
    .exclude_from_hints(config.watch.directory())
}

fn print_classification(result: &ClassificationResult, fmt: &dyn OutputFormatter) {
    let source = if result.is_fallback() {
        "filename rules"
    } else {
        "classifier"
    };
    fmt.success(&format!(
        "{} / {} ({} confidence, from {})",
        result.category, result.subcategory, result.confidence, source
    ));
    fmt.info(&format!("Folder:      {}", result.suggested_path));
    if !result.reasoning.is_empty() {
        fmt.info(&format!("Reasoning:   {}", result.reasoning));
    }
}

fn print_outcome(outcome: &PlacementOutcome, ctx: &CliContext, fmt: &dyn OutputFormatter) {
    if ctx.is_json() {
        let value = match outcome {
            PlacementOutcome::Moved {
                from,
                to,
                classification,
            } => serde_json::json!({
                "outcome": "moved",
                "from": from.display().to_string(),
                "to": to.display().to_string(),
                "classification": classification,
            }),
            PlacementOutcome::LeftForReview { classification } => serde_json::json!({
                "outcome": "review",
                "classification": classification,
            }),
            PlacementOutcome::Errored { reason, message } => serde_json::json!({
                "outcome": "error",
                "reason": reason.to_string(),
                "message": message,
            }),
        };
        fmt.print_json(&value);
        return;
    }

    match outcome {
        PlacementOutcome::Moved {
            to, classification, ..
        } => {
            print_classification(classification, fmt);
            fmt.success(&format!("Moved to {}", to.display()));
        }
        PlacementOutcome::LeftForReview { classification } => {
            print_classification(classification, fmt);
            fmt.warn("Confidence too low; file left in place for review");
        }
        PlacementOutcome::Errored { .. } => {}
    }
}
