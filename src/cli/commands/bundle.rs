//! Bundle command implementation

use std::path::PathBuf;

use super::import_source;
use crate::cli::error::CliError;
use crate::export::{CanonicalSerializer, OutputFormat};
use crate::resolve::dereference;

/// Bundle command arguments
#[derive(Debug, Clone)]
pub struct BundleArgs {
    /// URL, file path, or `-` for stdin
    pub source: String,
    /// Also replace internal refs with their targets
    pub dereference: bool,
    /// Output format
    pub format: OutputFormat,
    /// Write to this file instead of stdout
    pub output: Option<PathBuf>,
    /// Workspace directory holding the config
    pub workspace: PathBuf,
}

/// Print (or write) the bundled document
pub async fn handle_bundle(args: &BundleArgs) -> Result<(), CliError> {
    let imported = import_source(&args.workspace, &args.source).await?;

    let tree = if args.dereference {
        dereference(imported.document.tree())?
    } else {
        imported.document.into_tree()
    };
    let result = CanonicalSerializer.export(&tree, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &result.content)
                .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            eprintln!("Wrote {} output to {}", result.format, path.display());
        }
        None => {
            print!("{}", result.content);
            if !result.content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
