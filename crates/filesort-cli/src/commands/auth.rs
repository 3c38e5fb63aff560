//! Auth commands - Manage the classifier API key
//!
//! 1. `set-key` - Stores a key in the system keyring (read from stdin when
//!    not given on the command line)
//! 2. `clear`   - Removes the stored key
//! 3. `status`  - Reports which source the daemon would take its key from

use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Subcommand;
use filesort_classifier::{resolve_api_key, ClassifierError, KeyringCredentialStore};

use crate::context::CliContext;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store the API key in the system keyring
    SetKey {
        /// The key; read from stdin when omitted
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove the stored API key
    Clear,
    /// Show where the API key is resolved from
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            AuthCommand::SetKey { key } => self.execute_set_key(ctx, key.as_deref()),
            AuthCommand::Clear => self.execute_clear(ctx),
            AuthCommand::Status => self.execute_status(ctx),
        }
    }

    fn execute_set_key(&self, ctx: &CliContext, key: Option<&str>) -> Result<()> {
        let fmt = ctx.formatter();

        let key = match key {
            Some(k) => k.to_string(),
            None => {
                let mut line = String::new();
                std::io::stdin()
                    .lock()
                    .read_line(&mut line)
                    .context("Failed to read API key from stdin")?;
                line
            }
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("API key must not be empty");
        }

        KeyringCredentialStore::new().store(key)?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({ "success": true, "stored": "keyring" }));
        } else {
            fmt.success("API key stored in the system keyring");
        }
        Ok(())
    }

    fn execute_clear(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();
        KeyringCredentialStore::new().clear()?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({ "success": true }));
        } else {
            fmt.success("API key removed from the system keyring");
        }
        Ok(())
    }

    fn execute_status(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();
        let config = ctx.load_config()?;

        let resolved = resolve_api_key(&config.classifier);

        if ctx.is_json() {
            let value = match &resolved {
                Ok((key, source)) => serde_json::json!({
                    "configured": true,
                    "source": source.to_string(),
                    "key": mask_key(key),
                }),
                Err(e) => serde_json::json!({
                    "configured": false,
                    "error": e.to_string(),
                }),
            };
            fmt.print_json(&value);
            return Ok(());
        }

        match resolved {
            Ok((key, source)) => {
                fmt.success(&format!("API key configured ({})", mask_key(&key)));
                fmt.info(&format!("Source: {source}"));
            }
            Err(ClassifierError::MissingCredentials) => {
                fmt.warn("No API key configured; files will be sorted by filename rules only");
                fmt.info("Run 'filesort auth set-key' or set FILESORT_API_KEY.");
            }
            Err(e) => fmt.error(&e.to_string()),
        }
        Ok(())
    }
}

/// Shows only the last four characters of a key
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-ant-api03-abcdefWXYZ"), "****WXYZ");
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key(""), "****");
    }
}
