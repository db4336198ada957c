use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Use library instead of local modules
use momo_ledger::{
    insert_records, read_export, reset_database, setup_database, verify_count, write_invalid_log,
    Config, DuplicatePolicy, MessageParser,
};

#[derive(Parser)]
#[command(name = "momo-ledger")]
#[command(version, about = "Import mobile-money SMS exports into a transaction ledger", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, default_value = "momo-ledger.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every message in the export and store the accepted ones
    Import(ImportArgs),
}

#[derive(Args, Default)]
struct ImportArgs {
    /// SMS backup XML file (overrides config)
    #[arg(long)]
    export: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Invalid message log (overrides config)
    #[arg(long)]
    invalid_log: Option<PathBuf>,

    /// Keep existing rows and skip duplicates instead of recreating the table
    #[arg(long)]
    append: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,momo_ledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Some(Commands::Import(args)) => run_import(&config, args),
        None => run_import(&config, ImportArgs::default()),
    }
}

fn run_import(config: &Config, args: ImportArgs) -> Result<()> {
    let export_path = args.export.unwrap_or_else(|| config.paths.export.clone());
    let db_path = args.database.unwrap_or_else(|| config.paths.database.clone());
    let log_path = args.invalid_log.unwrap_or_else(|| config.paths.invalid_log.clone());

    println!("📥 MoMo Ledger - SMS export → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load export
    let messages = read_export(&export_path)?;

    // 2. Setup database
    let mut conn = Connection::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    if args.append {
        setup_database(&conn)?;
    } else {
        reset_database(&conn)?;
    }
    info!(path = %db_path.display(), append = args.append, "database ready");

    // 3. Classify
    let batch = MessageParser::new().parse_batch(&messages);

    // 4. Store accepted records
    let policy = if args.append {
        DuplicatePolicy::Skip
    } else {
        DuplicatePolicy::Keep
    };
    let stats = insert_records(&mut conn, &batch.accepted, policy)?;

    // 5. Log rejections
    if !batch.rejected.is_empty() {
        write_invalid_log(&log_path, &batch.rejected)?;
        warn!(
            count = batch.rejected.len(),
            path = %log_path.display(),
            "found invalid messages"
        );
    }

    let count = verify_count(&conn)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✓ Processed {} valid messages out of {} total messages",
        batch.accepted.len(),
        batch.total()
    );
    println!("✓ Inserted: {} (skipped duplicates: {})", stats.inserted, stats.duplicates);
    println!("✓ Database contains {} transactions", count);
    if !batch.rejected.is_empty() {
        println!("✓ {} invalid messages logged to {}", batch.rejected.len(), log_path.display());
    }

    Ok(())
}
