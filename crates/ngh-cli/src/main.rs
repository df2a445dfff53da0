//! CLI entry point for the ngh compiler host.
//!
//! This binary exposes forward and reverse module resolution, metadata
//! loading, and resource reads over a project on disk.
//!
//! # Usage
//!
//! ```bash
//! ngh [OPTIONS] <COMMAND>
//!
//! # Resolve an import as seen from a file
//! ngh --project-root /work/app locate ./app.module --from /work/app/src/main.ts
//!
//! # The import a generated file should use
//! ngh --project-root /work/app --generated-root /work/app/gen \
//!     name-for /work/app/gen/src/app.ngfactory.ts /work/app/gen/src/main.ngfactory.ts
//!
//! # Export metadata of a declaration file
//! ngh --config ngh.json metadata /work/app/node_modules/rxjs/index.d.ts
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use ngh_core::{HostConfig, ModuleMetadata, normalize_path};
use ngh_host::{CompilerHost, NodeHostContext};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Resolve module names and files across project, generated, and vendor roots.
#[derive(Parser)]
#[command(name = "ngh", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file.
    ///
    /// Root flags given on the command line override values from this file.
    #[arg(short, long, global = true, env = "NGH_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Project (source) root. Defaults to the current directory.
    #[arg(short, long, global = true, env = "NGH_PROJECT_ROOT")]
    project_root: Option<Utf8PathBuf>,

    /// Generated-output root. Defaults to the project root.
    #[arg(short, long, global = true, env = "NGH_GENERATED_ROOT")]
    generated_root: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve a module name to a file.
    Locate {
        /// The module name, as written in an import.
        module: String,

        /// The importing file. Required for relative names.
        #[arg(short, long)]
        from: Option<Utf8PathBuf>,
    },

    /// Print the module name a file should use to import another.
    NameFor {
        /// The file being imported.
        imported: Utf8PathBuf,

        /// The file containing the import.
        containing: Utf8PathBuf,
    },

    /// Print the export metadata of a file.
    Metadata {
        /// The source or declaration file.
        file: Utf8PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = MetadataFormat::Json)]
        format: MetadataFormat,
    },

    /// Print a resource file (template, stylesheet).
    Resource {
        /// The resource path.
        file: Utf8PathBuf,
    },

    /// Print the declaration file emitted for a source file.
    OutputName {
        /// The source path.
        file: Utf8PathBuf,
    },
}

/// Metadata output format.
#[derive(Clone, Copy, ValueEnum)]
enum MetadataFormat {
    /// Pretty-printed records.
    Json,
    /// One line per exported symbol.
    Symbols,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default so that
/// command output stays clean. Logs go to stderr.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(level)
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`HostConfig`] from the config file and CLI flags.
///
/// Relative roots are resolved against the current directory.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or the current
/// directory is not valid UTF-8.
fn build_config(cli: &Cli) -> color_eyre::Result<HostConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            HostConfig::load(path).wrap_err_with(|| format!("Failed to load config {path}"))?
        }
        None => HostConfig::default(),
    };

    if let Some(root) = &cli.project_root {
        config.project_root.clone_from(root);
    }
    if let Some(root) = &cli.generated_root {
        config.generated_root.clone_from(root);
    }

    let cwd = current_dir()?;
    if config.project_root.as_str().is_empty() {
        config.project_root.clone_from(&cwd);
    }
    config.project_root = absolutize(&cwd, &config.project_root);
    config.generated_root = if config.generated_root.as_str().is_empty() {
        config.project_root.clone()
    } else {
        absolutize(&cwd, &config.generated_root)
    };

    debug!(
        project_root = %config.project_root,
        generated_root = %config.generated_root,
        "Configuration resolved"
    );
    Ok(config)
}

fn current_dir() -> color_eyre::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().wrap_err("Failed to read current directory")?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| eyre!("Current directory is not UTF-8: {}", path.display()))
}

fn absolutize(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        normalize_path(path.as_str())
    } else {
        normalize_path(cwd.join(path).as_str())
    }
}

/// Creates a [`CompilerHost`] over the real filesystem.
///
/// # Errors
///
/// Returns an error if the configured roots are invalid.
fn create_host(config: &HostConfig) -> color_eyre::Result<CompilerHost<NodeHostContext>> {
    CompilerHost::new(config, NodeHostContext::new())
        .map_err(|e| eyre!("Failed to create compiler host: {}", e))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Resolves `module` and prints the file.
///
/// # Errors
///
/// Returns an error for a relative name without `--from`, or if nothing
/// matches.
fn run_locate(
    host: &CompilerHost<NodeHostContext>,
    cwd: &Utf8Path,
    module: &str,
    from: Option<&Utf8Path>,
) -> color_eyre::Result<()> {
    let from = from.map(|file| absolutize(cwd, file));
    let resolved = host.locate(module, from.as_deref())?;

    let Some(path) = resolved else {
        return Err(eyre!("Cannot resolve module '{}'", module));
    };

    info!(module, path = %path, "Resolved");
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{path}")?;
    Ok(())
}

/// Prints the module name `containing` should import `imported` by.
fn run_name_for(
    host: &CompilerHost<NodeHostContext>,
    cwd: &Utf8Path,
    imported: &Utf8Path,
    containing: &Utf8Path,
) -> color_eyre::Result<()> {
    let name = host.name_for(&absolutize(cwd, imported), &absolutize(cwd, containing));

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{name}")?;
    Ok(())
}

/// Prints the metadata records of `file`.
///
/// # Errors
///
/// Returns an error if the file does not exist or its sidecar is malformed.
fn run_metadata(
    host: &CompilerHost<NodeHostContext>,
    cwd: &Utf8Path,
    file: &Utf8Path,
    format: MetadataFormat,
) -> color_eyre::Result<()> {
    let file = absolutize(cwd, file);
    let Some(records) = host.metadata_for(&file)? else {
        return Err(eyre!("No metadata for {}", file));
    };

    let content = match format {
        MetadataFormat::Json => serde_json::to_string_pretty(&*records)
            .map_err(|e| eyre!("Failed to serialize JSON: {}", e))?,
        MetadataFormat::Symbols => format_symbols(&records),
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{content}")?;
    Ok(())
}

/// Prints a resource file once its deferred read completes.
///
/// # Errors
///
/// Returns an error if the resource does not exist or cannot be read.
async fn run_resource(
    host: &CompilerHost<NodeHostContext>,
    cwd: &Utf8Path,
    file: &Utf8Path,
) -> color_eyre::Result<()> {
    let content = host.load_resource(&absolutize(cwd, file)).await?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{content}")?;
    Ok(())
}

/// Prints the emitted declaration path for `file`.
fn run_output_name(
    host: &CompilerHost<NodeHostContext>,
    cwd: &Utf8Path,
    file: &Utf8Path,
) -> color_eyre::Result<()> {
    let output = host.output_file_name(&absolutize(cwd, file));

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{output}")?;
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Formats records as `v<version> <symbol> <kind>` lines plus re-exports.
fn format_symbols(records: &[ModuleMetadata]) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for record in records {
        let version = record.version.map_or_else(|| "?".to_owned(), |v| v.to_string());
        for (name, descriptor) in &record.metadata {
            let kind = descriptor
                .get("__symbolic")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("-");
            let _ = writeln!(output, "v{version} {name} {kind}");
        }
        for export in record.exports.iter().flatten() {
            let _ = writeln!(output, "v{version} * from {}", export.from);
        }
    }
    output.truncate(output.trim_end().len());
    output
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Build the host
    let config = build_config(&cli)?;
    let host = create_host(&config)?;
    let cwd = current_dir()?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Locate { module, from } => run_locate(&host, &cwd, module, from.as_deref()),
        Commands::NameFor {
            imported,
            containing,
        } => run_name_for(&host, &cwd, imported, containing),
        Commands::Metadata { file, format } => run_metadata(&host, &cwd, file, *format),
        Commands::Resource { file } => run_resource(&host, &cwd, file).await,
        Commands::OutputName { file } => run_output_name(&host, &cwd, file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_absolutize() {
        let cwd = Utf8Path::new("/work");
        assert_eq!(absolutize(cwd, Utf8Path::new("app/./src")), "/work/app/src");
        assert_eq!(absolutize(cwd, Utf8Path::new("/abs/../x")), "/x");
    }

    #[test]
    fn test_format_symbols() {
        let records = ModuleMetadata::list_from_json(
            r#"{"__symbolic": "module", "version": 3,
                "exports": [{"from": "./ops"}],
                "metadata": {"A": {"__symbolic": "class"}, "b": 1}}"#,
        )
        .unwrap();
        assert_eq!(format_symbols(&records), "v3 A class\nv3 b -\nv3 * from ./ops");
    }
}
