//! pg-blueprint CLI
//!
//! Compiles JSON schema blueprints to PostgreSQL DDL.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use pg_blueprint_cli::{Catalog, CliError, PgExecutor, compile_files, render_script};

/// Compile schema blueprints to PostgreSQL DDL.
#[derive(Parser)]
#[command(name = "pg-blueprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PostgreSQL connection string.
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the statements for the given blueprint files.
    Compile {
        /// Blueprint JSON files, compiled in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compile every file, then execute the statements in order.
    Apply {
        /// Blueprint JSON files, applied in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the catalog definition of an index.
    ShowIndex {
        /// Index name.
        name: String,
    },
}

async fn connect(database_url: Option<&str>) -> Result<PgPool, CliError> {
    let url = database_url.ok_or(CliError::MissingDatabaseUrl)?;
    let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Compile { files } => {
            let compiled = compile_files(&files)?;
            print!("{}", render_script(&compiled));
        }

        Commands::Apply { files, dry_run } => {
            let compiled = compile_files(&files)?;

            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                print!("{}", render_script(&compiled));
                return Ok(());
            }

            let pool = connect(cli.database_url.as_deref()).await?;
            let executor = PgExecutor::new(pool);
            executor.apply_all(&compiled).await?;
        }

        Commands::ShowIndex { name } => {
            let pool = connect(cli.database_url.as_deref()).await?;
            match Catalog::new(&pool).index_definition(&name).await? {
                Some(definition) => println!("{definition}"),
                None => info!(index = %name, "Index not found"),
            }
        }
    }

    Ok(())
}
