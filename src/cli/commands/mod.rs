//! CLI command implementations

pub mod bundle;
pub mod deps;
pub mod import;
pub mod init;
pub mod store;
pub mod validate;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::error::CliError;
use crate::config::IngestConfig;
use crate::import::{FormatHint, ImportedSpec, RawSpecInput, SpecImporter};
use crate::storage::{SpecStore, open_store};
use crate::validation::input::validate_record_id;

/// Load the workspace configuration (defaults when no file exists)
pub fn load_config(workspace: &Path) -> Result<IngestConfig, CliError> {
    Ok(IngestConfig::load(workspace)?)
}

/// Open the store configured for `workspace`
pub async fn load_store(workspace: &Path) -> Result<Arc<dyn SpecStore>, CliError> {
    let config = load_config(workspace)?;
    Ok(open_store(&config, workspace).await?)
}

/// Run the import pipeline for a command-line source.
///
/// `source` is a URL, a file path, or `-` for stdin.
pub async fn import_source(workspace: &Path, source: &str) -> Result<ImportedSpec, CliError> {
    let config = load_config(workspace)?;
    let importer = SpecImporter::from_config(&config)?;

    let imported = if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        importer.import_text(&text, FormatHint::Auto).await?
    } else if RawSpecInput::is_remote_location(source) {
        importer.import_url(source).await?
    } else {
        importer.import_path(Path::new(source)).await?
    };
    Ok(imported)
}

/// Parse a record id argument
pub fn parse_id(id: &str) -> Result<Uuid, CliError> {
    validate_record_id(id).map_err(|e| CliError::InvalidArgument(e.to_string()))
}
