//! CircuitGen CLI - store, check and export circuit designs from the command line.

use anyhow::{Context, Result};
use circuitgen::{
    inspect, run_mock, CircuitDraft, CircuitPatch, CircuitReport, CircuitService, Config,
    SimulationRequest, SqliteStore,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;

const EXIT_OK: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Parser)]
#[command(name = "circuitgen")]
#[command(about = "Circuit design storage and validation tool", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new circuit from a JSON file
    Create {
        /// Circuit JSON (name, components, connections, ...)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List stored circuits
    List {
        /// Number of circuits to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of circuits to return
        #[arg(long)]
        limit: Option<usize>,

        /// Only list public circuits
        #[arg(long)]
        public_only: bool,
    },

    /// Show one stored circuit
    Show {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Apply a partial update from a JSON file
    Update {
        #[arg(value_name = "ID")]
        id: i64,

        /// Patch JSON; absent fields are left untouched
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a stored circuit
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Copy a circuit into a new private circuit
    Duplicate {
        #[arg(value_name = "ID")]
        id: i64,

        /// Name of the copy (defaults to "<name> (Copy)")
        #[arg(long)]
        name: Option<String>,
    },

    /// Export a circuit's design data
    Export {
        #[arg(value_name = "ID")]
        id: i64,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check a circuit file's connectivity without storing it
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Produce placeholder simulation values for a circuit file
    Simulate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Simulated interval in seconds
        #[arg(long)]
        time: Option<f64>,

        /// Time step in seconds
        #[arg(long)]
        step: Option<f64>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    Ok(match &cli.db {
        Some(db) => config.with_database_path(db),
        None => config,
    })
}

fn open_service(config: Config) -> Result<CircuitService<SqliteStore>> {
    let store = SqliteStore::new(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    Ok(CircuitService::new(store, config))
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Check { file, format } => handle_check(&file, format),
        Commands::Simulate { file, time, step } => handle_simulate(&file, time, step, &config),
        Commands::Create { file } => {
            let service = open_service(config)?;
            let draft: CircuitDraft = read_json(&file)?;
            let circuit = service.create(draft)?;
            print_json(&circuit)?;
            Ok(EXIT_OK)
        }
        Commands::List {
            offset,
            limit,
            public_only,
        } => {
            let service = open_service(config)?;
            print_json(&service.list(offset, limit, public_only)?)?;
            Ok(EXIT_OK)
        }
        Commands::Show { id } => {
            let service = open_service(config)?;
            found_or_exit(id, service.get(id)?, |circuit| print_json(&circuit))
        }
        Commands::Update { id, file } => {
            let service = open_service(config)?;
            let patch: CircuitPatch = read_json(&file)?;
            found_or_exit(id, service.update(id, patch)?, |circuit| print_json(&circuit))
        }
        Commands::Delete { id } => {
            let service = open_service(config)?;
            if service.delete(id)? {
                println!("Deleted circuit {}", id);
                Ok(EXIT_OK)
            } else {
                eprintln!("Error: Circuit {} not found", id);
                Ok(EXIT_NOT_FOUND)
            }
        }
        Commands::Duplicate { id, name } => {
            let service = open_service(config)?;
            found_or_exit(id, service.duplicate(id, name)?, |circuit| print_json(&circuit))
        }
        Commands::Export { id, output } => {
            let service = open_service(config)?;
            found_or_exit(id, service.export(id)?, |export| {
                let text = serde_json::to_string_pretty(&export)?;
                match &output {
                    Some(path) => std::fs::write(path, text)
                        .with_context(|| format!("Failed to write {}", path.display())),
                    None => {
                        println!("{}", text);
                        Ok(())
                    }
                }
            })
        }
    }
}

/// Run `on_found` for a present value, or report not-found with its own exit code.
fn found_or_exit<T>(id: i64, value: Option<T>, on_found: impl FnOnce(T) -> Result<()>) -> Result<i32> {
    match value {
        Some(v) => {
            on_found(v)?;
            Ok(EXIT_OK)
        }
        None => {
            eprintln!("Error: Circuit {} not found", id);
            Ok(EXIT_NOT_FOUND)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid circuit JSON in {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_check(file: &Path, format: OutputFormat) -> Result<i32> {
    let draft: CircuitDraft = read_json(file)?;
    let report = inspect(&draft.components, &draft.connections);

    match format {
        OutputFormat::Human => output_human(file, &draft.name, &report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(if report.valid { EXIT_OK } else { EXIT_ERROR })
}

fn output_human(file: &Path, name: &str, report: &CircuitReport) {
    println!("\nFile: {} ({})", file.display(), name);
    println!("{}", "─".repeat(60));

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("  No issues found");
    }

    if !report.errors.is_empty() {
        println!("\n  ERRORS:");
        for error in &report.errors {
            println!("    - {}", error);
        }
    }
    if !report.warnings.is_empty() {
        println!("\n  WARNINGS:");
        for warning in &report.warnings {
            println!("    - {}", warning);
        }
    }

    println!("\n  Summary:");
    println!("    Components:  {}", report.component_count);
    println!("    Connections: {}", report.connection_count);
    println!("    Valid:       {}", if report.valid { "yes" } else { "no" });
}

fn handle_simulate(file: &Path, time: Option<f64>, step: Option<f64>, config: &Config) -> Result<i32> {
    let mut request: SimulationRequest = read_json(file)?;
    if let Some(time) = time {
        request.simulation_time = time;
    }
    if let Some(step) = step {
        request.time_step = step;
    }

    let report = run_mock(&request, config)?;
    print_json(&report)?;
    Ok(EXIT_OK)
}
