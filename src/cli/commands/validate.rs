//! Validate command implementation

use std::path::PathBuf;

use super::import_source;
use crate::cli::error::CliError;

/// Validate command arguments
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    /// URL, file path, or `-` for stdin
    pub source: String,
    /// Workspace directory holding the config
    pub workspace: PathBuf,
}

/// Run the import pipeline without persisting anything
pub async fn handle_validate(args: &ValidateArgs) -> Result<(), CliError> {
    let imported = import_source(&args.workspace, &args.source).await?;
    let document = &imported.document;

    println!("Validation successful");
    println!("  version: {}", document.version());
    println!("  title: {}", document.title().unwrap_or("(none)"));
    println!("  format: {}", imported.source_format);
    println!("  schemas: {}", document.schema_names().len());
    Ok(())
}
