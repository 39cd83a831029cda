//! csvdedup CLI
//!
//! Removes rows whose value in a chosen column already appeared in an
//! earlier row, and reports which values were repeated.

mod config;
mod delivery;
mod progress;

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use csvdedup_core::{deduplicate, Deduplicated, ResultId, ResultStore, Table};
use csvdedup_formats::{detect_format, open_table, CsvOptions, CsvWriter, TableFormat};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{DedupConfig, OutputEncoding};
use delivery::{Delivered, Delivery};
use progress::Summary;

#[derive(Parser)]
#[command(name = "csvdedup")]
#[command(version, about = "Remove rows with a repeated key value from CSV files", long_about = None)]
#[command(author = "csvdedup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output reports in JSON format
    #[arg(long, global = true)]
    json: bool,
}

/// CSV reading flags shared by several commands
#[derive(clap::Args, Debug, Default)]
struct CsvArgs {
    /// Field delimiter (overrides the config file)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Keep every cell as text instead of parsing numbers and NA markers
    #[arg(long)]
    raw: bool,
}

impl CsvArgs {
    fn apply(&self, mut options: CsvOptions) -> CsvOptions {
        if let Some(delimiter) = self.delimiter {
            options.delimiter = delimiter;
        }
        if self.raw {
            options.infer_types = false;
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Remove rows whose key column value already appeared
    Dedup {
        /// Input file (CSV, TSV, optionally gzipped)
        #[arg(short, long)]
        input: PathBuf,

        /// Key column
        #[arg(short, long)]
        column: Option<String>,

        /// Output file (defaults to <stem>.deduped.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the cleaned file as base64 instead of writing it
        #[arg(long)]
        base64: bool,

        /// Write removed rows as JSON lines to this path
        #[arg(long, value_name = "PATH")]
        removed: Option<PathBuf>,

        /// Config file (YAML or TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        csv: CsvArgs,

        /// Show the report without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Deduplicate several files in parallel
    Batch {
        /// Input files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Key column
        #[arg(short, long)]
        column: Option<String>,

        /// Directory for cleaned files
        #[arg(long)]
        out_dir: PathBuf,

        /// Config file (YAML or TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        csv: CsvArgs,
    },

    /// Show the columns and first rows of a file
    Inspect {
        /// Path to the CSV file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        #[command(flatten)]
        csv: CsvArgs,
    },

    /// Count data rows in a file
    Count {
        /// Path to the CSV file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        csv: CsvArgs,
    },

    /// Write a config file with default settings
    InitConfig {
        /// Destination (.yaml, .yml or .toml)
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is kept for reports and payloads
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Dedup {
            input,
            column,
            output,
            base64,
            removed,
            config,
            csv,
            dry_run,
        } => {
            let config = DedupConfig::load_or_default(config.as_deref())?;
            let request = DedupRequest {
                column: column.or_else(|| config.key_column.clone()),
                output: output.or_else(|| config.output.path.as_ref().map(PathBuf::from)),
                base64: base64 || config.output.encoding == OutputEncoding::Base64,
                removed: removed.or_else(|| config.output.removed.as_ref().map(PathBuf::from)),
                csv: csv.apply(config.csv.clone()),
                dry_run,
            };
            dedup_file(input, request, &config, cli.json).await?;
        }
        Commands::Batch {
            inputs,
            column,
            out_dir,
            config,
            csv,
        } => {
            let config = DedupConfig::load_or_default(config.as_deref())?;
            let column = column.or_else(|| config.key_column.clone());
            let options = csv.apply(config.csv.clone());
            batch_dedup(inputs, column, out_dir, options, &config, cli.json).await?;
        }
        Commands::Inspect { input, limit, csv } => {
            inspect_table(input, limit, csv.apply(CsvOptions::default())).await?;
        }
        Commands::Count { input, csv } => {
            count_rows(input, csv.apply(CsvOptions::default()), cli.json).await?;
        }
        Commands::InitConfig { path } => {
            DedupConfig::default().save(&path)?;
            info!("Wrote default config to {:?}", path);
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Settings for one `dedup` run after merging flags and config
struct DedupRequest {
    column: Option<String>,
    output: Option<PathBuf>,
    base64: bool,
    removed: Option<PathBuf>,
    csv: CsvOptions,
    dry_run: bool,
}

/// Message shown to the user for an engine or decode failure
fn user_message(err: &csvdedup_core::Error) -> String {
    use csvdedup_core::Error;

    match err {
        Error::MissingKeyColumn => "Please specify the column name.".to_string(),
        Error::MissingColumn(name) => format!("CSV does not contain column '{}'.", name),
        Error::UpstreamDecode(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Key column from the request, rejected early when blank
fn require_column(column: Option<String>) -> Result<String> {
    match column {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Err(anyhow!(user_message(&csvdedup_core::Error::MissingKeyColumn))),
    }
}

/// Decode `input` and deduplicate it on `column`
fn load_and_dedup(input: &Path, column: &str, options: &CsvOptions) -> Result<Deduplicated> {
    let table = open_table(input, options)
        .map_err(|e| anyhow!(user_message(&csvdedup_core::Error::from(e))))?;
    deduplicate(&table, column).map_err(|e| anyhow!(user_message(&e)))
}

/// Writer options for the output path: `.tsv` outputs are tab separated
fn writer_for(output: &Path, options: &CsvOptions) -> CsvWriter {
    match detect_format(output) {
        Ok((TableFormat::Tsv, _)) => CsvWriter::new(CsvOptions::tsv()),
        _ => CsvWriter::new(options.clone()),
    }
}

/// Encode a cleaned table and stage it in the store
fn stage(store: &ResultStore, writer: &CsvWriter, output: &Path, table: &Table) -> Result<ResultId> {
    let bytes = writer.to_bytes(table)?;
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "deduped.csv".to_string());
    Ok(store.insert(name, bytes))
}

async fn dedup_file(
    input: PathBuf,
    request: DedupRequest,
    config: &DedupConfig,
    json_output: bool,
) -> Result<()> {
    let column = require_column(request.column)?;
    let output = request
        .output
        .unwrap_or_else(|| delivery::default_output(&input));
    let write_output = !request.dry_run;

    info!("Starting deduplication");
    info!("  Input: {:?}", input);
    if write_output && !request.base64 {
        info!("  Output: {:?}", output);
    }
    info!("  Key column: {}", column);

    let result = load_and_dedup(&input, &column, &request.csv)?;
    let report = result.duplicates.report();

    let mut delivered = None;
    let mut removed_output = None;
    if write_output {
        let store = ResultStore::new(config.store.to_store_config(1));
        let writer = writer_for(&output, &request.csv);
        let id = stage(&store, &writer, &output, &result.table)?;
        info!("  Staged cleaned file as {}", id);

        let target = if request.base64 {
            Delivery::Base64
        } else {
            Delivery::File(output.clone())
        };
        delivered = Some((id.clone(), delivery::deliver(&store, &id, &target)?));

        if let Some(path) = &request.removed {
            delivery::write_removals(path, &column, &result.removals)?;
            removed_output = Some(path.clone());
        }
    }

    let stats = &result.stats;
    if json_output {
        let (result_id, output_path, base64) = match &delivered {
            Some((id, Delivered::Written { path, .. })) => (
                Some(id.to_string()),
                Some(path.to_string_lossy().to_string()),
                None,
            ),
            Some((id, Delivered::Encoded(text))) => (Some(id.to_string()), None, Some(text.clone())),
            None => (None, None, None),
        };
        let report_json = serde_json::json!({
            "input": input.to_string_lossy().to_string(),
            "output": output_path,
            "removed_output": removed_output.map(|p| p.to_string_lossy().to_string()),
            "key_column": column,
            "total_rows": stats.total_seen,
            "unique_rows": stats.unique_count,
            "duplicates_removed": stats.duplicates_found,
            "deduplication_rate": stats.dedup_rate(),
            "duplicate_values": result.duplicates.display_strings(),
            "duplicates": report,
            "result_id": result_id,
            "csv_base64": base64,
            "dry_run": request.dry_run,
        });
        println!("{}", serde_json::to_string_pretty(&report_json)?);
        return Ok(());
    }

    let output_label = match &delivered {
        Some((_, Delivered::Written { path, .. })) => Some(path.to_string_lossy().to_string()),
        Some((_, Delivered::Encoded(_))) => Some("(base64 on stdout)".to_string()),
        None => None,
    };
    let summary = Summary {
        input: &input,
        output: output_label.as_deref(),
        key_column: &column,
        total: stats.total_seen,
        unique: stats.unique_count,
        duplicates: stats.duplicates_found,
        duplicate_report: &report,
    };

    if let Some((_, Delivered::Encoded(text))) = &delivered {
        // the payload owns stdout
        progress::print_summary_report(&mut io::stderr(), &summary)?;
        println!("{}", text);
    } else {
        progress::print_summary_report(&mut io::stdout(), &summary)?;
    }
    if let Some(path) = removed_output {
        println!(
            "  Removed rows: {:?} ({} rows with their duplicate_of_line)",
            path, stats.duplicates_found
        );
    }

    Ok(())
}

/// Outcome of one file in a batch run
struct BatchItem {
    input: PathBuf,
    output: PathBuf,
    outcome: Result<(ResultId, Deduplicated)>,
}

async fn batch_dedup(
    inputs: Vec<PathBuf>,
    column: Option<String>,
    out_dir: PathBuf,
    options: CsvOptions,
    config: &DedupConfig,
    json_output: bool,
) -> Result<()> {
    let column = require_column(column)?;
    std::fs::create_dir_all(&out_dir)?;

    info!("Starting batch deduplication");
    info!("  Files: {}", inputs.len());
    info!("  Output dir: {:?}", out_dir);
    info!("  Key column: {}", column);

    // every result must survive until it is delivered
    let store = ResultStore::new(config.store.to_store_config(inputs.len()));
    let bar = progress::batch_progress(inputs.len() as u64);

    // Parallel phase: decode, deduplicate, encode and stage each file
    let items: Vec<BatchItem> = inputs
        .par_iter()
        .map(|input| {
            let output = delivery::output_in_dir(&out_dir, input);
            let outcome = load_and_dedup(input, &column, &options).and_then(|result| {
                let writer = writer_for(&output, &options);
                let id = stage(&store, &writer, &output, &result.table)?;
                Ok((id, result))
            });
            bar.inc(1);
            BatchItem {
                input: input.clone(),
                output,
                outcome,
            }
        })
        .collect();
    bar.finish_and_clear();

    // Serial phase: deliver in input order
    let mut failures = 0;
    let mut reports = Vec::with_capacity(items.len());
    for item in items {
        match item.outcome {
            Ok((id, result)) => {
                delivery::deliver(&store, &id, &Delivery::File(item.output.clone()))?;
                reports.push(serde_json::json!({
                    "input": item.input.to_string_lossy().to_string(),
                    "output": item.output.to_string_lossy().to_string(),
                    "total_rows": result.stats.total_seen,
                    "duplicates_removed": result.stats.duplicates_found,
                    "duplicates": result.duplicates.report(),
                }));
                if !json_output {
                    println!(
                        "{} → {}: {} of {} rows removed; duplicates: {}",
                        item.input.display(),
                        item.output.display(),
                        result.stats.duplicates_found,
                        result.stats.total_seen,
                        result.duplicates
                    );
                }
            }
            Err(e) => {
                failures += 1;
                warn!("{}: {}", item.input.display(), e);
                reports.push(serde_json::json!({
                    "input": item.input.to_string_lossy().to_string(),
                    "error": e.to_string(),
                }));
                if !json_output {
                    println!("{}: failed: {}", item.input.display(), e);
                }
            }
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} files failed", failures, reports.len()));
    }
    Ok(())
}

async fn inspect_table(input: PathBuf, limit: usize, options: CsvOptions) -> Result<()> {
    info!("Inspecting table: {:?}", input);

    let table = open_table(&input, &options)?;
    println!("Columns ({}): {}", table.columns().len(), table.columns().join(", "));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for index in 0..table.len().min(limit) {
        let line = table.rows()[index].source_line;
        let fields: Vec<String> = table
            .row_entries(index)
            .into_iter()
            .flatten()
            .map(|(column, value)| format!("{}={}", column, value))
            .collect();
        writeln!(out, "Row #{} (line {}): {}", index + 1, line, fields.join(", "))?;
    }

    info!("Table has {} rows", table.len());
    Ok(())
}

async fn count_rows(input: PathBuf, options: CsvOptions, json_output: bool) -> Result<()> {
    info!("Counting rows in: {:?}", input);

    let table = open_table(&input, &options)?;

    if json_output {
        let report = serde_json::json!({
            "input": input.to_string_lossy().to_string(),
            "columns": table.columns(),
            "rows": table.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Total rows: {}", table.len());
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dedup_args() {
        let cli = Cli::try_parse_from([
            "csvdedup", "dedup", "-i", "in.csv", "-c", "id", "--base64", "-d", ";", "--raw",
        ])
        .unwrap();

        match cli.command {
            Commands::Dedup {
                input,
                column,
                base64,
                csv,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.csv"));
                assert_eq!(column.as_deref(), Some("id"));
                assert!(base64);
                let options = csv.apply(CsvOptions::default());
                assert_eq!(options.delimiter, ';');
                assert!(!options.infer_types);
            }
            _ => panic!("expected dedup command"),
        }
    }

    #[test]
    fn test_user_messages() {
        use csvdedup_core::Error;

        assert_eq!(
            user_message(&Error::MissingKeyColumn),
            "Please specify the column name."
        );
        assert_eq!(
            user_message(&Error::MissingColumn("email".to_string())),
            "CSV does not contain column 'email'."
        );
        assert_eq!(
            user_message(&Error::UpstreamDecode("No columns to parse from file".to_string())),
            "No columns to parse from file"
        );
    }

    #[test]
    fn test_require_column() {
        assert_eq!(require_column(Some("id".to_string())).unwrap(), "id");
        assert!(require_column(Some(" ".to_string())).is_err());
        assert!(require_column(None).is_err());
    }

    #[test]
    fn test_load_and_dedup_reports_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "id,name\n1,A\n").unwrap();

        let err = load_and_dedup(&path, "email", &CsvOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "CSV does not contain column 'email'.");
    }

    #[test]
    fn test_load_and_dedup_reports_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();

        let err = load_and_dedup(&path, "id", &CsvOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "No columns to parse from file");
    }

    #[tokio::test]
    async fn test_dedup_file_writes_output_and_log() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        std::fs::write(&input, "id,name\n1,A\n2,B\n1,C\n").unwrap();
        let output = dir.path().join("clean.csv");

        let request = DedupRequest {
            column: Some("id".to_string()),
            output: Some(output.clone()),
            base64: false,
            removed: Some(dir.path().join("dropped.jsonl")),
            csv: CsvOptions::default(),
            dry_run: false,
        };
        dedup_file(input, request, &DedupConfig::default(), true)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "id,name\n1,A\n2,B\n"
        );
        let log = std::fs::read_to_string(dir.path().join("dropped.jsonl")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn test_removed_flag_takes_a_path() {
        let cli = Cli::try_parse_from([
            "csvdedup", "dedup", "-i", "in.csv", "-c", "id", "--removed", "out/dropped.jsonl",
        ])
        .unwrap();
        match cli.command {
            Commands::Dedup { removed, .. } => {
                assert_eq!(removed, Some(PathBuf::from("out/dropped.jsonl")));
            }
            _ => panic!("expected dedup"),
        }

        assert!(Cli::try_parse_from(["csvdedup", "dedup", "-i", "in.csv", "--removed"]).is_err());
    }

    #[tokio::test]
    async fn test_dedup_file_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        std::fs::write(&input, "id\n1\n1\n").unwrap();

        let request = DedupRequest {
            column: Some("id".to_string()),
            output: None,
            base64: false,
            removed: None,
            csv: CsvOptions::default(),
            dry_run: true,
        };
        dedup_file(input, request, &DedupConfig::default(), true)
            .await
            .unwrap();

        assert!(!dir.path().join("people.deduped.csv").exists());
    }

    #[tokio::test]
    async fn test_batch_dedup() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.tsv");
        std::fs::write(&a, "id\n1\n1\n2\n").unwrap();
        std::fs::write(&b, "id\tname\nx\tA\ny\tB\nx\tC\n").unwrap();
        let out_dir = dir.path().join("out");

        batch_dedup(
            vec![a, b],
            Some("id".to_string()),
            out_dir.clone(),
            CsvOptions::default(),
            &DedupConfig::default(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(out_dir.join("a.deduped.csv")).unwrap(),
            "id\n1\n2\n"
        );
        assert_eq!(
            std::fs::read_to_string(out_dir.join("b.deduped.tsv")).unwrap(),
            "id\tname\nx\tA\ny\tB\n"
        );
    }

    #[tokio::test]
    async fn test_batch_dedup_reports_failures() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        std::fs::write(&good, "id\n1\n").unwrap();
        std::fs::write(&bad, "name\nA\n").unwrap();

        let result = batch_dedup(
            vec![good, bad],
            Some("id".to_string()),
            dir.path().join("out"),
            CsvOptions::default(),
            &DedupConfig::default(),
            true,
        )
        .await;

        assert!(result.is_err());
        assert!(dir.path().join("out").join("good.deduped.csv").exists());
    }
}
