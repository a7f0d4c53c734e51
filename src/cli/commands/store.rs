//! Stored spec commands: list, show, delete

use std::path::{Path, PathBuf};

use super::{load_store, parse_id};
use crate::cli::error::CliError;
use crate::validation::input::sanitize_spec_name;

/// List stored specs, newest first
pub async fn handle_list(workspace: &Path) -> Result<(), CliError> {
    let store = load_store(workspace).await?;
    let summaries = store.list().await?;

    if summaries.is_empty() {
        println!("No specs stored ({} backend)", store.backend_type());
        return Ok(());
    }

    println!("{:<36}  {:<20}  NAME", "ID", "CREATED");
    for summary in summaries {
        println!(
            "{:<36}  {:<20}  {}",
            summary.id,
            summary.created_at.format("%Y-%m-%d %H:%M:%S"),
            summary.name
        );
    }
    Ok(())
}

/// Show command arguments
#[derive(Debug, Clone)]
pub struct ShowArgs {
    /// Record id
    pub id: String,
    /// Print the canonical YAML instead of the JSON content
    pub raw: bool,
    /// Also write the canonical YAML into this directory
    pub save: Option<PathBuf>,
    /// Workspace directory holding the config and store
    pub workspace: PathBuf,
}

/// Print one stored spec
pub async fn handle_show(args: &ShowArgs) -> Result<(), CliError> {
    let store = load_store(&args.workspace).await?;
    let record = store.get(parse_id(&args.id)?).await?;

    if args.raw {
        print!("{}", record.raw_content);
    } else {
        let tree = record
            .document_tree()
            .map_err(|e| CliError::InvalidArgument(format!("Stored content is not JSON: {}", e)))?;
        println!("# {} ({})", record.name, record.id);
        println!("# created {}", record.created_at.to_rfc3339());
        println!(
            "{}",
            serde_json::to_string_pretty(&tree)
                .map_err(|e| CliError::InvalidArgument(e.to_string()))?
        );
    }

    if let Some(dir) = &args.save {
        let path = dir.join(format!("{}.yaml", sanitize_spec_name(&record.name)));
        std::fs::write(&path, &record.raw_content)
            .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
        eprintln!("Saved {}", path.display());
    }
    Ok(())
}

/// Delete one stored spec
pub async fn handle_delete(workspace: &Path, id: &str) -> Result<(), CliError> {
    let store = load_store(workspace).await?;
    let id = parse_id(id)?;
    store.delete(id).await?;
    println!("Deleted {}", id);
    Ok(())
}
