//! Supplychain CLI - dashboard analytics for supply-chain CSV files
//!
//! # Main Commands
//!
//! ```bash
//! supplychain serve                 # Start HTTP server (port 5000)
//! supplychain run data.csv          # Full dashboard payload as JSON
//! supplychain summary data.csv      # KPI block only
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! supplychain load data.csv         # Just parse the CSV to JSON records
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use supplychain::{
    build_dashboard, format_delimiter, load_dataset, summarize, Config, PipelineOptions, SkuJoin,
};

#[derive(Parser)]
#[command(name = "supplychain")]
#[command(about = "Supply-chain dashboard analytics from CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and output the dashboard payload
    Run {
        /// Input CSV file (default: $SUPPLY_CHAIN_DATA or data/raw/supply_chain_data.csv)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// How ABC classes are joined back: "rank" or "sku"
        #[arg(long, default_value = "rank")]
        join: SkuJoin,
    },

    /// Print the KPI summary only
    Summary {
        /// Input CSV file
        input: Option<PathBuf>,
    },

    /// Parse a CSV file and output its records as JSON
    Load {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $PORT or 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Source CSV served by /api/dashboard
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory of built dashboard assets
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// How ABC classes are joined back: "rank" or "sku"
        #[arg(long, default_value = "rank")]
        join: SkuJoin,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            compact,
            join,
        } => cmd_run(
            &config.with_data_path(input),
            output.as_deref(),
            compact,
            PipelineOptions { join },
        ),

        Commands::Summary { input } => cmd_summary(&config.with_data_path(input)),

        Commands::Load { input, output } => cmd_load(&input, output.as_deref()),

        Commands::Serve {
            port,
            data,
            static_dir,
            join,
        } => {
            let config = config
                .with_port(port)
                .with_data_path(data)
                .with_static_dir(static_dir);
            cmd_serve(config, PipelineOptions { join }).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    config: &Config,
    output: Option<&Path>,
    compact: bool,
    options: PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = build_dashboard(&config.data_path, options)?;

    let json = if compact {
        serde_json::to_string(&payload)?
    } else {
        serde_json::to_string_pretty(&payload)?
    };
    write_output(&json, output)?;

    Ok(())
}

fn cmd_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load_dataset(&config.data_path)?;
    let summary = summarize(&parsed.records)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_load(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = load_dataset(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(
    config: Config,
    options: PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    supplychain::server::start_server(config, options).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
