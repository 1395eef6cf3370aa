use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use expref_core::{Config, ValidationReport};
use expref_corpus::{JsonSchemaLoader, SchemaCorpus, SchemaManifest};
use expref_engine::{
    AsciiReport, AsciiValidator, JsonFileSink, LinkValidator, MarkdownFileSink, ReportError,
    ReportSink, TextFileSink, ValidatorOptions,
};
use expref_links::{PathResolver, ResolutionResult};

/// expref - EXPRESS cross-reference validation for documentation collections
#[derive(Parser)]
#[command(name = "expref")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: expref.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents and schemas
    Validate {
        #[command(subcommand)]
        target: ValidateTarget,
    },

    /// Resolve individual reference paths
    Resolve {
        /// Schema manifest (YAML)
        schemas_file: PathBuf,

        /// Paths such as action_schema.action.name
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ValidateTarget {
    /// Extract and validate <<express:...>> links
    Links {
        /// Schema manifest (YAML)
        #[arg(default_value = "schemas-srl.yml")]
        schemas_file: PathBuf,

        /// Directory searched for documents (default from config)
        documents_path: Option<PathBuf>,

        /// Text report destination (default from config)
        output_file: Option<PathBuf>,

        /// Also write the JSON report
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also write a Markdown report
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Worker threads for scanning files
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Check EXPRESS files for non-ASCII characters
    Ascii {
        /// EXPRESS file or directory
        path: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Print results as YAML
        #[arg(short, long)]
        yaml: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new("expref.toml").exists() {
        Config::from_file(Path::new("expref.toml")).context("Failed to load expref.toml")?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    info!(
        documents_dir = %config.documents_dir.display(),
        jobs = config.jobs,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Validate {
            target:
                ValidateTarget::Links {
                    schemas_file,
                    documents_path,
                    output_file,
                    json,
                    markdown,
                    jobs,
                },
        } => {
            let args = LinksArgs {
                schemas_file,
                documents_path: documents_path
                    .unwrap_or_else(|| config.resolve_path(&config.documents_dir)),
                output_file: output_file
                    .unwrap_or_else(|| config.resolve_path(&config.output)),
                json,
                markdown,
                jobs: jobs.unwrap_or(config.jobs).max(1),
            };
            links_command(&config, &args, cli.verbose)
        }
        Commands::Validate { target: ValidateTarget::Ascii { path, recursive, yaml } } => {
            ascii_command(&path, recursive, yaml)
        }
        Commands::Resolve { schemas_file, paths } => {
            resolve_command(&config, &schemas_file, &paths)
        }
    }
}

struct LinksArgs {
    schemas_file: PathBuf,
    documents_path: PathBuf,
    output_file: PathBuf,
    json: Option<PathBuf>,
    markdown: Option<PathBuf>,
    jobs: usize,
}

/// Load the manifest and build the corpus; any failure is fatal
fn load_corpus(config: &Config, schemas_file: &Path) -> Result<(SchemaManifest, SchemaCorpus)> {
    let manifest = SchemaManifest::from_file(schemas_file)
        .with_context(|| format!("Error loading schemas file {}", schemas_file.display()))?;

    let loader = JsonSchemaLoader::with_extension(config.parsed_extension.clone());
    let corpus = SchemaCorpus::from_manifest(&manifest, &loader)
        .context("Error loading schemas")?;

    Ok((manifest, corpus))
}

/// Links command - extract and validate express links
fn links_command(config: &Config, args: &LinksArgs, verbose: bool) -> Result<ExitCode> {
    if verbose {
        eprintln!(
            "{} {}",
            "Extracting and validating express links using schemas from".cyan(),
            args.schemas_file.display()
        );
        eprintln!("{} {}", "Looking for documents in".cyan(), args.documents_path.display());
    }

    let (manifest, corpus) = load_corpus(config, &args.schemas_file)?;

    let documents = find_documents(config, &args.documents_path);
    let schema_files: Vec<PathBuf> = manifest
        .schema_paths()
        .into_iter()
        .map(|(_, path)| path)
        .collect();

    info!(
        documents = documents.len(),
        schema_files = schema_files.len(),
        schemas = corpus.len(),
        "Discovered files"
    );

    let files: Vec<PathBuf> = documents.into_iter().chain(schema_files).collect();

    let report = LinkValidator::new(&corpus)
        .with_options(ValidatorOptions { jobs: args.jobs })
        .validate_files(&files);

    let text_sink = TextFileSink::new(&args.output_file);
    match text_sink.deliver(&report) {
        Ok(()) => eprintln!(
            "{} {}",
            "Validation results written to".green(),
            args.output_file.display()
        ),
        Err(e) => {
            eprintln!("{} {}", "Error writing to output file:".red(), e);
            // Still print results to console as fallback
            println!("{}", report.to_text());
        }
    }

    let mut extra_sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    if let Some(path) = &args.json {
        extra_sinks.push(Box::new(JsonFileSink::new(path)));
    }
    if let Some(path) = &args.markdown {
        extra_sinks.push(Box::new(MarkdownFileSink::new(path, config.severity.clone())));
    }
    for sink in &extra_sinks {
        sink.deliver(&report)?;
    }

    ConsoleSummary.deliver(&report)?;

    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

/// Documents under `root` with a configured extension, in path order
fn find_documents(config: &Config, root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(walk_entry)
        .filter(|entry| entry.file_type().is_file() && config.is_document(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Keep readable walk entries, logging the rest
fn walk_entry(entry: walkdir::Result<walkdir::DirEntry>) -> Option<walkdir::DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(error = %e, "Skipping unreadable directory entry");
            None
        }
    }
}

/// Human summary on stdout
struct ConsoleSummary;

impl ReportSink for ConsoleSummary {
    fn deliver(&self, report: &ValidationReport) -> Result<(), ReportError> {
        println!("\n{}", "=".repeat(60).bright_blue());
        println!("{}", "Express Link Validation Report".bold().bright_blue());
        println!("{}", "=".repeat(60).bright_blue());
        println!();

        println!("Files scanned:  {}", report.summary.total_files);
        if report.summary.files_skipped > 0 {
            println!("Files skipped:  {}", report.summary.files_skipped.to_string().yellow());
        }
        println!("Links checked:  {}", report.summary.total_links_checked);

        if report.summary.unresolved > 0 {
            println!("Unresolved:     {}", report.summary.unresolved.to_string().red().bold());
        } else {
            println!("Unresolved:     {}", report.summary.unresolved.to_string().green());
        }
        println!();

        if report.is_clean() {
            println!("{}", "✓ All links resolved successfully!".green().bold());
        } else {
            let header = format!("✗ Found {} unresolved links:", report.unresolved.len());
            println!("{}", header.as_str().red().bold());
            for link in &report.unresolved {
                println!("  {}", link);
            }
        }

        for warning in &report.warnings {
            println!("  {} {}", "⚠ Warning:".yellow(), warning.message);
        }

        println!();
        println!("{}", "=".repeat(60).bright_blue());
        Ok(())
    }
}

/// Ascii command - report non-ASCII characters in EXPRESS files
fn ascii_command(path: &Path, recursive: bool, yaml: bool) -> Result<ExitCode> {
    let files: Vec<PathBuf> = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        let walker = WalkDir::new(path).sort_by_file_name();
        let walker = if recursive { walker } else { walker.max_depth(1) };
        walker
            .into_iter()
            .filter_map(walk_entry)
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry.path().extension().map_or(false, |ext| ext == "exp")
            })
            .map(|entry| entry.into_path())
            .collect()
    };

    if files.is_empty() {
        eprintln!("{} {}", "No EXPRESS files found in".yellow(), path.display());
    }

    let mut report = AsciiReport::new();
    for file in &files {
        match AsciiValidator::check_file(file) {
            Ok(violations) => report.add(violations),
            Err(e) => eprintln!("{} {}: {}", "⚠ Could not read".yellow(), file.display(), e),
        }
    }

    if yaml {
        print!("{}", report.to_yaml().context("Failed to serialize ASCII report")?);
    } else {
        for file in &report.files {
            println!("{} ({} violations)", file.file.bold(), file.violation_count());
            for ch in &file.characters {
                println!(
                    "  '{}' {} [{}] x{}  Replacement: ISO 10303-11: {}",
                    ch.character, ch.code_point, ch.utf8, ch.occurrence_count, ch.replacement
                );
            }
            for diag in file.to_diagnostics() {
                if let Some(loc) = &diag.location {
                    println!("    at {}", loc);
                }
            }
        }
        println!();
        println!(
            "Scanned {} files: {} with non-ASCII characters, {} violations",
            report.files_scanned,
            report.files_with_violations(),
            report.total_violations()
        );
    }

    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

/// Resolve command - check individual paths
fn resolve_command(config: &Config, schemas_file: &Path, paths: &[String]) -> Result<ExitCode> {
    let (_, corpus) = load_corpus(config, schemas_file)?;
    let resolver = PathResolver::new(&corpus);

    let mut failures = 0;
    for path in paths {
        match resolver.resolve(path) {
            ResolutionResult::Resolved => println!("{} {}", "OK".green().bold(), path),
            ResolutionResult::Unresolved { failing_segment_index, reason } => {
                failures += 1;
                println!(
                    "{} {} - {} (segment {})",
                    "FAIL".red().bold(),
                    path,
                    reason,
                    failing_segment_index
                );
            }
        }
    }

    Ok(if failures == 0 { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn links_defaults() {
        let cli = Cli::try_parse_from(["expref", "validate", "links"]).unwrap();
        match cli.command {
            Commands::Validate {
                target: ValidateTarget::Links { schemas_file, documents_path, jobs, .. },
            } => {
                assert_eq!(schemas_file, PathBuf::from("schemas-srl.yml"));
                assert!(documents_path.is_none());
                assert!(jobs.is_none());
            }
            _ => panic!("expected validate links"),
        }
    }

    #[test]
    fn resolve_requires_paths() {
        assert!(Cli::try_parse_from(["expref", "resolve", "schemas-srl.yml"]).is_err());
    }

    #[test]
    fn finds_documents_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sections")).unwrap();
        std::fs::write(dir.path().join("b.adoc"), "").unwrap();
        std::fs::write(dir.path().join("sections/a.adoc"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = find_documents(&Config::default(), dir.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["b.adoc".to_string(), "sections/a.adoc".to_string()]);
    }
}
