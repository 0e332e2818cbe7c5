//! Browse command handler
//!
//! Lists the documents, lets the user pick one, then offers to open it,
//! download it, or cancel.

use anyhow::{bail, Result};

use docsync_core::DocumentSyncClient;

use crate::commands::fetch;
use crate::output::Output;
use crate::prompt;

/// What to do with the selected document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Open,
    Download,
    Cancel,
}

/// Pick a document and act on it
pub async fn run(client: &DocumentSyncClient, output: &Output) -> Result<()> {
    prompt::require_interactive(output, "Use `docsync list` and `docsync open <name>` instead.")?;

    let names = client.list_documents().await?;
    output.print_documents(client.identity(), &names);
    if names.is_empty() {
        return Ok(());
    }

    println!();
    let input = prompt::line(&format!(
        "Select a document (1-{}, Enter to quit): ",
        names.len()
    ))?;
    let Some(index) = parse_selection(&input, names.len())? else {
        return Ok(());
    };
    let name = &names[index];

    println!();
    println!("Options for {}:", name);
    println!("  [1] Open");
    println!("  [2] Download");
    println!("  [3] Cancel");
    let input = prompt::line("> ")?;

    match parse_action(&input)? {
        Action::Open => fetch::open(client, name, true, output).await,
        Action::Download => fetch::download(client, name, output).await,
        Action::Cancel => {
            output.message("Cancelled.");
            Ok(())
        }
    }
}

/// Parse a 1-based document number; empty input means quit
fn parse_selection(input: &str, count: usize) -> Result<Option<usize>> {
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(Some(n - 1)),
        _ => bail!("Invalid choice '{}'. Enter a number from 1 to {}.", input, count),
    }
}

fn parse_action(input: &str) -> Result<Action> {
    match input.to_ascii_lowercase().as_str() {
        "1" | "o" | "open" => Ok(Action::Open),
        "2" | "d" | "download" => Ok(Action::Download),
        "" | "3" | "c" | "cancel" => Ok(Action::Cancel),
        _ => bail!("Invalid choice '{}'. Enter 1, 2 or 3.", input),
    }
}
