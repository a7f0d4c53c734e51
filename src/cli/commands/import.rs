//! Import command implementation

use std::path::PathBuf;

use super::{import_source, load_store};
use crate::cli::error::CliError;

/// Import command arguments
#[derive(Debug, Clone)]
pub struct ImportArgs {
    /// URL, file path, or `-` for stdin
    pub source: String,
    /// Record name; `info.title` when absent
    pub name: Option<String>,
    /// Workspace directory holding the config and store
    pub workspace: PathBuf,
}

/// Import a spec and persist it
pub async fn handle_import(args: &ImportArgs) -> Result<(), CliError> {
    let imported = import_source(&args.workspace, &args.source).await?;
    let version = imported.document.version().to_string();
    let external_documents = imported.external_documents;

    let store = load_store(&args.workspace).await?;
    let record = store
        .save(imported.into_new_spec(args.name.as_deref())?)
        .await?;

    println!("Imported '{}' ({})", record.name, version);
    println!("  id: {}", record.id);
    if external_documents > 0 {
        println!("  external documents bundled: {}", external_documents);
    }
    Ok(())
}
