//! Whoami command handler

use anyhow::Result;

use docsync_core::{Config, Identity};

use crate::output::{Output, OutputFormat};

/// Show the resolved identity and where requests go
///
/// `device_name` is the one the identity was resolved from, after
/// `--device-name` and config have been applied.
pub fn show(
    identity: &Identity,
    device_name: Option<&str>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!("{}", summary(identity, device_name, config));
        }
        OutputFormat::Quiet => {
            println!("{}", identity);
        }
        OutputFormat::Human => {
            println!("Identity:    {}", identity);
            println!(
                "User name:   {}",
                config.username.as_deref().unwrap_or("(not set)")
            );
            println!("Device name: {}", device_name.unwrap_or("(unknown)"));
            println!("Server:      {}", config.server_url);
        }
    }

    Ok(())
}

fn summary(identity: &Identity, device_name: Option<&str>, config: &Config) -> serde_json::Value {
    serde_json::json!({
        "identity": identity.as_str(),
        "username": config.username,
        "device_name": device_name,
        "server_url": config.server_url
    })
}
