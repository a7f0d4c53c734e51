//! CLI binary entry point for openapi-ingest

use anyhow::Context;
use clap::{Parser, Subcommand};
use openapi_ingest::cli::CliError;
use openapi_ingest::cli::commands::bundle::{BundleArgs, handle_bundle};
use openapi_ingest::cli::commands::deps::{DepsArgs, DepsFormat, DepsSource, handle_deps};
use openapi_ingest::cli::commands::import::{ImportArgs, handle_import};
use openapi_ingest::cli::commands::init::handle_init;
use openapi_ingest::cli::commands::store::{ShowArgs, handle_delete, handle_list, handle_show};
use openapi_ingest::cli::commands::validate::{ValidateArgs, handle_validate};
use openapi_ingest::export::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-ingest")]
#[command(about = "Import, bundle and inspect OpenAPI/Swagger documents")]
#[command(version)]
struct Cli {
    /// Workspace directory holding `.openapi-ingest.toml` and the spec store
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a spec (URL, file, or '-' for stdin) and store it
    Import {
        source: String,
        /// Record name (defaults to info.title)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Run the import pipeline without storing anything
    Validate { source: String },
    /// Print the bundled document
    Bundle {
        source: String,
        /// Also replace internal refs with their targets
        #[arg(long)]
        dereference: bool,
        /// Output format: yaml, json or json-pretty
        #[arg(short, long, default_value = "yaml")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show which operations and schemas use each schema
    Deps {
        /// Spec to import on the fly
        #[arg(required_unless_present = "id", conflicts_with = "id")]
        source: Option<String>,
        /// Stored spec id
        #[arg(long)]
        id: Option<String>,
        /// Output format: table or json
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// List stored specs, newest first
    List,
    /// Print a stored spec
    Show {
        id: String,
        /// Print the canonical YAML text
        #[arg(long)]
        raw: bool,
        /// Also save the canonical YAML into this directory
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Delete a stored spec
    Delete { id: String },
    /// Write a sample configuration file into the workspace
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let workspace = cli.workspace;

    match cli.command {
        Commands::Import { source, name } => {
            handle_import(&ImportArgs {
                source,
                name,
                workspace,
            })
            .await
        }
        Commands::Validate { source } => handle_validate(&ValidateArgs { source, workspace }).await,
        Commands::Bundle {
            source,
            dereference,
            format,
            output,
        } => {
            let format: OutputFormat = format.parse().map_err(CliError::InvalidArgument)?;
            handle_bundle(&BundleArgs {
                source,
                dereference,
                format,
                output,
                workspace,
            })
            .await
        }
        Commands::Deps { source, id, format } => {
            let format: DepsFormat = format.parse().map_err(CliError::InvalidArgument)?;
            let source = match (source, id) {
                (_, Some(id)) => DepsSource::Stored(id),
                (Some(source), None) => DepsSource::Import(source),
                (None, None) => {
                    return Err(CliError::InvalidArgument(
                        "either SOURCE or --id is required".to_string(),
                    ));
                }
            };
            handle_deps(&DepsArgs {
                source,
                format,
                workspace,
            })
            .await
        }
        Commands::List => handle_list(&workspace).await,
        Commands::Show { id, raw, save } => {
            handle_show(&ShowArgs {
                id,
                raw,
                save,
                workspace,
            })
            .await
        }
        Commands::Delete { id } => handle_delete(&workspace, &id).await,
        Commands::Init { force } => handle_init(&workspace, force),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("openapi_ingest=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
