//! Open and download command handlers

use anyhow::{Context, Result};

use docsync_core::{DocumentSyncClient, DownloadMode};

use crate::output::Output;

/// Fetch a document into the preview cache and hand it to the system viewer
pub async fn open(
    client: &DocumentSyncClient,
    name: &str,
    launch: bool,
    output: &Output,
) -> Result<()> {
    let file = client.download_document(name, DownloadMode::Preview).await?;
    output.print_downloaded(&file);

    if launch {
        ::open::that(&file.path)
            .with_context(|| format!("Failed to open {:?} in a viewer", file.path))?;
    }

    Ok(())
}

/// Save a document to the documents directory, replacing any previous copy
pub async fn download(client: &DocumentSyncClient, name: &str, output: &Output) -> Result<()> {
    let file = client.download_document(name, DownloadMode::Save).await?;
    output.print_downloaded(&file);
    Ok(())
}
