//! Cherryload CLI - cadastral asset ETL
//!
//! # Main Commands
//!
//! ```bash
//! cherryload run                      # One full pipeline pass over the dataset dir
//! cherryload serve                    # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! cherryload extract assets           # Just parse one dataset to JSON
//! cherryload validate records.json    # Validate JSON against the output schema
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use cherryload::{
    extract_assets, extract_entities, extract_join, records_to_documents, run_pipeline,
    validate_output_record, Config, InMemoryStore, RecordStore,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cherryload")]
#[command(about = "Merge cadastral asset, entity, and ownership CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline once and print a run summary
    Run {
        /// Directory holding the three dataset files (default: from env)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Write the resulting records as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse one dataset file and output its rows as JSON
    Extract {
        /// Which dataset to parse
        dataset: Dataset,

        /// Input CSV file (default: the configured path for the dataset)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate JSON records against the flat output schema
    Validate {
        /// Input JSON file (array of records)
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: from env)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Dataset {
    Assets,
    Entities,
    Join,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { data_dir, output } => cmd_run(data_dir, output.as_deref()),

        Commands::Extract { dataset, input, output } => {
            cmd_extract(dataset, input.as_deref(), output.as_deref())
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    data_dir: Option<PathBuf>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }

    eprintln!("Processing datasets in {}", config.data_dir.display());

    let store = InMemoryStore::new();
    let report = run_pipeline(&config, &store)?;

    eprintln!();
    eprintln!("Run {} summary:", report.run_id);
    eprintln!(
        "   Extracted: {} assets, {} entities, {} joins",
        report.assets_extracted, report.entities_extracted, report.joins_extracted
    );
    eprintln!(
        "   Valid:     {} assets, {} entities, {} joins",
        report.assets_valid, report.entities_valid, report.joins_valid
    );
    eprintln!("   Persisted: {} records in '{}'", report.records_persisted, report.collection);
    if report.schema_invalid > 0 {
        eprintln!("   Schema:    {} valid, {} invalid", report.schema_valid, report.schema_invalid);
    }

    if let Some(path) = output {
        let records = store.fetch_all(&config.collection)?;
        let json = serde_json::to_string_pretty(&records_to_documents(&records))?;
        write_output(&json, Some(path))?;
    }

    Ok(())
}

fn cmd_extract(
    dataset: Dataset,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    let (default_path, label) = match dataset {
        Dataset::Assets => (config.assets_path(), "assets"),
        Dataset::Entities => (config.entities_path(), "entities"),
        Dataset::Join => (config.join_path(), "join"),
    };
    let path = input.unwrap_or(&default_path);

    eprintln!("Parsing {} dataset: {}", label, path.display());

    let (json, encoding, delimiter, count) = match dataset {
        Dataset::Assets => {
            let ex = extract_assets(path)?;
            (serde_json::to_string_pretty(&ex.records)?, ex.encoding, ex.delimiter, ex.records.len())
        }
        Dataset::Entities => {
            let ex = extract_entities(path)?;
            (serde_json::to_string_pretty(&ex.records)?, ex.encoding, ex.delimiter, ex.records.len())
        }
        Dataset::Join => {
            let ex = extract_join(path)?;
            (serde_json::to_string_pretty(&ex.records)?, ex.encoding, ex.delimiter, ex.records.len())
        }
    };

    eprintln!("   Encoding: {}", encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    eprintln!("Parsed {} rows", count);

    write_output(&json, output)?;

    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;

    let mut valid = 0;
    let mut invalid = 0;

    for (i, record) in records.iter().enumerate() {
        match validate_output_record(record) {
            Ok(()) => valid += 1,
            Err(errors) => {
                invalid += 1;
                if invalid <= 5 {
                    eprintln!("\nRecord {} invalid:", i);
                    for err in errors.iter().take(3) {
                        eprintln!("   - {}", err);
                    }
                }
            }
        }
    }

    eprintln!("\nResults: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    if let Some(port) = port {
        config.port = port;
    }

    let store = Arc::new(InMemoryStore::new());
    cherryload::server::start_server(config, store).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
