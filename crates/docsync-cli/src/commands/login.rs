//! Login command handler
//!
//! Picks the user name documents are fetched for and stores it in the
//! config file. The prompt is prefilled with the device name.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use docsync_core::{sanitize_username, Config};

use crate::output::Output;
use crate::prompt;

/// Choose a user name and save it
pub fn run(
    name: Option<String>,
    device_name: Option<String>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let raw = match name {
        Some(name) => name,
        None => {
            prompt::require_interactive(output, "Pass the name instead: docsync login <name>")?;
            let default = device_name.unwrap_or_default();
            let label = if default.is_empty() {
                "Name: ".to_string()
            } else {
                format!("Name [{}]: ", default)
            };
            let input = prompt::line(&label)?;
            if input.is_empty() {
                default
            } else {
                input
            }
        }
    };

    let username = username_from_input(&raw)?;

    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    config.username = Some(username.clone());

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Logged in as {}", username));
    Ok(())
}

/// Validate and sanitize a typed name
fn username_from_input(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        bail!("Please enter a name.");
    }

    let username = sanitize_username(raw);
    if !username.chars().any(|c| c.is_ascii_alphanumeric()) {
        bail!(
            "'{}' has no letters or digits that can be used as a user name.",
            raw
        );
    }
    Ok(username)
}
