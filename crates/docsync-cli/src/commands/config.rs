//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use docsync_core::{Config, Endpoint};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "server_url": config.server_url,
                    "timeout_secs": config.timeout_secs,
                    "username": config.username,
                    "device_name": config.device_name,
                    "documents_dir": config.documents_dir,
                    "preview_dir": config.preview_dir,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.server_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  server_url:    {}", config.server_url);
            println!("  timeout_secs:  {}", config.timeout_secs);
            println!(
                "  username:      {}",
                config.username.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  device_name:   {}",
                config.device_name.as_deref().unwrap_or("(not set)")
            );
            println!("  documents_dir: {}", config.documents_dir.display());
            println!("  preview_dir:   {}", config.preview_dir.display());
            println!(
                "  log_file:      {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "server_url" => {
            Endpoint::parse(value)?;
            config.server_url = value.to_string();
        }
        "timeout_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for timeout_secs. Use a whole number of seconds.")?;
            if secs == 0 {
                bail!("timeout_secs must be at least 1");
            }
            config.timeout_secs = secs;
        }
        "username" => {
            config.username = optional(value);
        }
        "device_name" => {
            config.device_name = optional(value);
        }
        "documents_dir" => {
            config.documents_dir = value.into();
        }
        "preview_dir" => {
            config.preview_dir = value.into();
        }
        "log_file" => {
            config.log_file = optional(value).map(PathBuf::from);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: server_url, timeout_secs, username, device_name, \
                 documents_dir, preview_dir, log_file",
                key
            );
        }
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}
