//! Matrix CLI - Command-line interface for the solutions matrix
//!
//! Commands:
//! - build: Build the matrix output model from a tabular export
//! - render: Build the per-cell render model (normalized scores and colors)
//! - inspect: Report how rows and columns were classified
//! - config: Print the default configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use solutions_matrix::builder::MatrixBuilder;
use solutions_matrix::classifier::RowClassifier;
use solutions_matrix::encoder::RenderEncoder;
use solutions_matrix::normalizer::ScoreRange;
use solutions_matrix::sources::{CsvRowSource, JsonRowSource, RowSource};
use solutions_matrix::{build_matrix, MatrixConfig, MatrixError, MatrixView, RawRow};
use solutions_matrix::{MATRIX_VERSION, PRODUCER_NAME};
use tracing_subscriber::EnvFilter;

/// Matrix - relevance matrix of conservation projects vs. AI capabilities
#[derive(Parser)]
#[command(name = "matrix")]
#[command(version = MATRIX_VERSION)]
#[command(about = "Build the projects x capabilities relevance matrix", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the matrix output model
    Build {
        #[command(flatten)]
        input: InputArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Build the render model with normalized scores and cell colors
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Report how rows and columns were classified
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        /// Output report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

#[derive(clap::Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "csv")]
    format: InputFormat,

    /// Configuration file (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Tab-separated values with a header row
    Tsv,
    /// JSON array of row objects
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MatrixCliError> {
    match cli.command {
        Commands::Build {
            input,
            output,
            pretty,
        } => cmd_build(&input, &output, pretty),
        Commands::Render { input, output } => cmd_render(&input, &output),
        Commands::Inspect { input, json } => cmd_inspect(&input, json),
        Commands::Config => cmd_config(),
    }
}

fn cmd_build(input: &InputArgs, output: &Path, pretty: bool) -> Result<(), MatrixCliError> {
    let config = load_config(input.config.as_deref())?;
    let rows = read_rows(input)?;
    let matrix = build_matrix(&rows, &config)?;

    let view = MatrixView {
        matrix: Arc::new(matrix),
        is_loading: false,
        error: None,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    write_output(output, &json)
}

fn cmd_render(input: &InputArgs, output: &Path) -> Result<(), MatrixCliError> {
    let config = load_config(input.config.as_deref())?;
    let rows = read_rows(input)?;
    let matrix = build_matrix(&rows, &config)?;

    let json = RenderEncoder::new(config.color_scale).encode_to_json(&matrix)?;
    write_output(output, &json)
}

fn cmd_inspect(input: &InputArgs, json: bool) -> Result<(), MatrixCliError> {
    let config = load_config(input.config.as_deref())?;
    let rows = read_rows(input)?;
    let classified = RowClassifier::classify(&rows, &config)?;
    let matrix = MatrixBuilder::build(&classified, &config);
    let range = ScoreRange::from_grid(matrix.values());

    let report = InspectReport {
        producer: PRODUCER_NAME.to_string(),
        version: MATRIX_VERSION.to_string(),
        total_rows: rows.len(),
        data_rows: classified.data_rows.len(),
        dropped_rows: classified.dropped_rows,
        metadata_columns: classified
            .label_row
            .keys()
            .filter(|k| config.is_metadata_column(k))
            .map(str::to_string)
            .collect(),
        capabilities: matrix
            .capabilities()
            .iter()
            .map(|c| CapabilityReport {
                id: c.id.clone(),
                label: c.label.clone(),
            })
            .collect(),
        scored_cells: matrix.values().finite_values().count(),
        missing_cells: matrix.values().missing_count(),
        range,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Matrix Inspect Report");
        println!("=====================");
        println!("Producer: {} {}", report.producer, report.version);
        println!();
        println!("Rows:");
        println!("  total:   {}", report.total_rows);
        println!("  label:   1");
        println!("  data:    {}", report.data_rows);
        println!("  dropped: {}", report.dropped_rows);
        println!();
        println!("Metadata columns: {}", report.metadata_columns.join(", "));
        println!("Capabilities ({}):", report.capabilities.len());
        for capability in &report.capabilities {
            println!("  {} -> {}", capability.id, capability.label);
        }
        println!();
        println!(
            "Cells: {} scored, {} missing",
            report.scored_cells, report.missing_cells
        );
        println!("Range: [{}, {}]", report.range.min, report.range.max);
    }

    Ok(())
}

fn cmd_config() -> Result<(), MatrixCliError> {
    println!("{}", MatrixConfig::default().to_json()?);
    Ok(())
}

// Input / output helpers

fn load_config(path: Option<&Path>) -> Result<MatrixConfig, MatrixCliError> {
    match path {
        Some(path) => Ok(MatrixConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(MatrixConfig::default()),
    }
}

fn read_rows(input: &InputArgs) -> Result<Vec<RawRow>, MatrixCliError> {
    let content = if input.input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(MatrixCliError::StdinIsTerminal);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&input.input)?
    };

    let rows = match input.format {
        InputFormat::Csv => CsvRowSource::from_text(content).fetch()?,
        InputFormat::Tsv => CsvRowSource::from_text(content)
            .with_delimiter(b'\t')
            .fetch()?,
        InputFormat::Json => JsonRowSource::new(content).fetch()?,
    };
    Ok(rows)
}

fn write_output(output: &Path, data: &str) -> Result<(), MatrixCliError> {
    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum MatrixCliError {
    Io(io::Error),
    Matrix(MatrixError),
    Json(serde_json::Error),
    StdinIsTerminal,
}

impl From<io::Error> for MatrixCliError {
    fn from(e: io::Error) -> Self {
        MatrixCliError::Io(e)
    }
}

impl From<MatrixError> for MatrixCliError {
    fn from(e: MatrixError) -> Self {
        MatrixCliError::Matrix(e)
    }
}

impl From<serde_json::Error> for MatrixCliError {
    fn from(e: serde_json::Error) -> Self {
        MatrixCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MatrixCliError> for CliError {
    fn from(e: MatrixCliError) -> Self {
        match e {
            MatrixCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MatrixCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MatrixCliError::StdinIsTerminal => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is an interactive terminal".to_string(),
                hint: Some("Pipe a file into the command or pass --input <path>".to_string()),
            },
            MatrixCliError::Matrix(e) => {
                let (code, hint) = match &e {
                    MatrixError::EmptyDataset => ("EMPTY_DATASET", "Ensure the input has a label row and data rows"),
                    MatrixError::NoDataRows => ("NO_DATA_ROWS", "Check that data rows carry a value in the id column"),
                    MatrixError::InvalidConfig(_) => ("INVALID_CONFIG", "Run 'matrix config' for a valid starting point"),
                    MatrixError::Csv(_) => ("CSV_ERROR", "Check the delimiter and quoting of the input"),
                    MatrixError::JsonError(_) => ("JSON_ERROR", "Expected a JSON array of row objects"),
                    MatrixError::LoadFailure(_) => ("LOAD_FAILURE", "Check that the dataset is reachable"),
                    MatrixError::EncodingError(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct InspectReport {
    producer: String,
    version: String,
    total_rows: usize,
    data_rows: usize,
    dropped_rows: usize,
    metadata_columns: Vec<String>,
    capabilities: Vec<CapabilityReport>,
    scored_cells: usize,
    missing_cells: usize,
    range: ScoreRange,
}

#[derive(serde::Serialize)]
struct CapabilityReport {
    id: String,
    label: String,
}
