//! List command handler

use anyhow::Result;

use docsync_core::DocumentSyncClient;

use crate::output::Output;

/// List the documents available to the session identity
pub async fn run(client: &DocumentSyncClient, output: &Output) -> Result<()> {
    let names = client.list_documents().await?;
    output.print_documents(client.identity(), &names);
    Ok(())
}
