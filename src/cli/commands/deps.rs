//! Dependency view command
//!
//! Prints, for every schema in a document, the operations and schemas that
//! use it. Schemas nothing uses are listed as "defined but not used" rather
//! than left out.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use super::{import_source, load_store, parse_id};
use crate::cli::error::CliError;
use crate::dependency::DependencyGraph;
use crate::session::SpecSession;

/// Output format for the dependency view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepsFormat {
    /// Human-readable listing
    #[default]
    Table,
    /// The usage map as JSON
    Json,
}

impl FromStr for DepsFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(DepsFormat::Table),
            "json" => Ok(DepsFormat::Json),
            _ => Err(format!("Invalid format: {}. Use 'table' or 'json'.", s)),
        }
    }
}

/// Where the document comes from
#[derive(Debug, Clone)]
pub enum DepsSource {
    /// Import on the fly (URL, path, or `-`)
    Import(String),
    /// A stored record id
    Stored(String),
}

/// Deps command arguments
#[derive(Debug, Clone)]
pub struct DepsArgs {
    /// Document to inspect
    pub source: DepsSource,
    /// Output format
    pub format: DepsFormat,
    /// Workspace directory holding the config and store
    pub workspace: PathBuf,
}

/// Print the dependency view of a document
pub async fn handle_deps(args: &DepsArgs) -> Result<(), CliError> {
    let mut session = SpecSession::new();
    match &args.source {
        DepsSource::Import(source) => {
            let imported = import_source(&args.workspace, source).await?;
            session.activate_imported(&imported);
        }
        DepsSource::Stored(id) => {
            let store = load_store(&args.workspace).await?;
            let record = store.get(parse_id(id)?).await?;
            session.activate(&record)?;
        }
    }

    let name = session
        .active()
        .map(|active| active.name.clone())
        .unwrap_or_default();
    let Some(graph) = session.dependency_graph() else {
        return Err(CliError::InvalidArgument("no document loaded".to_string()));
    };

    let output = match args.format {
        DepsFormat::Table => render_table(&name, graph),
        DepsFormat::Json => serde_json::to_string_pretty(graph.usage())
            .map_err(|e| CliError::InvalidArgument(format!("Failed to render JSON: {}", e)))?,
    };
    println!("{}", output);
    Ok(())
}

/// Render the dependency view as indented text
pub fn render_table(name: &str, graph: &DependencyGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dependency graph for {} ({})", name, graph.version());

    if graph.usage().is_empty() {
        let _ = writeln!(out, "\nNo schemas defined.");
        return out;
    }

    for (schema, usage) in graph.usage() {
        let _ = writeln!(out, "\n{}", schema);
        if usage.is_unused() {
            let _ = writeln!(out, "  defined but not used");
            continue;
        }
        if !usage.operations.is_empty() {
            let _ = writeln!(out, "  operations:");
            for op in &usage.operations {
                let _ = writeln!(
                    out,
                    "    {} {} ({})",
                    op.method.to_uppercase(),
                    op.path,
                    op.kind
                );
            }
        }
        if !usage.referenced_by_schemas.is_empty() {
            let _ = writeln!(
                out,
                "  referenced by schemas: {}",
                usage.referenced_by_schemas.join(", ")
            );
        }
    }

    let groups = graph.recursive_groups();
    if !groups.is_empty() {
        let _ = writeln!(out, "\nRecursive schemas:");
        for group in groups {
            let _ = writeln!(out, "  {}", group.join(" -> "));
        }
    }

    out
}
