//! Reportload CLI - Reshape project CSV exports into reports
//!
//! ```bash
//! reportload serve                       # Start HTTP server (port 3000)
//! reportload handle event.json           # Process a storage notification
//! reportload transform input.csv         # Transform a local CSV file
//! reportload columns                     # Show the report schema
//! ```

use clap::{Parser, Subcommand};
use reportload::{
    parse_csv_file_auto, report_to_bytes, transform, transform_file, Handler, Settings,
    StorageEvent, StoreKind, OUTPUT_COLUMNS, REQUIRED_COLUMNS,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "reportload")]
#[command(about = "Reshape project CSV exports into reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for environment settings.
#[derive(clap::Args)]
struct StoreArgs {
    /// Object store backend (default: REPORTLOAD_STORE or s3)
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Root directory for the local store
    #[arg(long)]
    local_root: Option<PathBuf>,

    /// Directory for downloaded and generated files
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a local CSV file
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Process a storage notification payload (JSON file)
    Handle {
        /// Notification JSON file
        event: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show required input columns and the report schema
    Columns,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform { input, output } => cmd_transform(&input, output.as_deref()),
        Commands::Handle { event, store } => cmd_handle(&event, store).await,
        Commands::Serve { port, store } => cmd_serve(port, store).await,
        Commands::Columns => cmd_columns(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_settings(args: StoreArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::from_env()?;
    if let Some(store) = args.store {
        settings.store = store;
    }
    if let Some(root) = args.local_root {
        settings.local_root = root;
    }
    if let Some(dir) = args.work_dir {
        settings.work_dir = dir;
    }
    Ok(settings)
}

async fn build_handler(settings: &Settings) -> Handler {
    Handler::new(settings.build_store().await, settings.work_dir.clone())
}

fn cmd_transform(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Transforming: {}", input.display());

    match output {
        Some(path) => {
            let summary = transform_file(input, path)?;
            eprintln!("   Encoding: {}", summary.encoding);
            eprintln!("   Columns: {}", summary.headers.join(", "));
            if summary.truncated {
                eprintln!("   ⚠️  Columns differ in length, output cut to the shortest");
            }
            eprintln!("✅ {} rows written to {}", summary.output_rows, path.display());
        }
        None => {
            let parsed = parse_csv_file_auto(input)?;
            let report = transform(&parsed.table)?;
            let bytes = report_to_bytes(&report)?;
            std::io::stdout().write_all(&bytes)?;
            eprintln!("✅ {} rows", report.data_row_count());
        }
    }

    Ok(())
}

async fn cmd_handle(event_path: &Path, args: StoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(args)?;
    let event = StorageEvent::from_json(&fs::read_to_string(event_path)?)?;
    let handler = build_handler(&settings).await;

    let outcome = handler.handle_event(&event).await?;
    let (status, file_name, bucket) = outcome.as_tuple();
    println!("{}", serde_json::to_string(&(status, file_name, bucket))?);

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_serve(port: Option<u16>, args: StoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(args)?;
    let handler = build_handler(&settings).await;
    reportload::server::start_server(handler, port.unwrap_or(settings.port)).await?;
    Ok(())
}

fn cmd_columns() -> Result<(), Box<dyn std::error::Error>> {
    println!("Required input columns:");
    for name in REQUIRED_COLUMNS {
        println!("  {}", name);
    }
    println!("\nReport columns:");
    for (i, name) in OUTPUT_COLUMNS.iter().enumerate() {
        println!("  [{}] {}", i + 1, name);
    }
    Ok(())
}
