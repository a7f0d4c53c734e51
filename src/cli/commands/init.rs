//! Init command implementation

use std::path::Path;

use crate::cli::error::CliError;
use crate::config::{CONFIG_FILENAME, IngestConfig, sample_config};

/// Write the sample configuration into `workspace`
pub fn handle_init(workspace: &Path, force: bool) -> Result<(), CliError> {
    if IngestConfig::exists(workspace) && !force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists in {}. Use --force to overwrite.",
            CONFIG_FILENAME,
            workspace.display()
        )));
    }

    std::fs::create_dir_all(workspace)
        .map_err(|e| CliError::FileWriteError(workspace.to_path_buf(), e.to_string()))?;
    let path = workspace.join(CONFIG_FILENAME);
    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;

    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_parseable_config() {
        let dir = tempfile::tempdir().unwrap();
        handle_init(dir.path(), false).unwrap();
        let config = IngestConfig::load(dir.path()).unwrap();
        assert!(config.validation.meta_schema);

        assert!(handle_init(dir.path(), false).is_err());
        assert!(handle_init(dir.path(), true).is_ok());
    }
}
