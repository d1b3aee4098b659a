//! Schema runner for the blog core.
//!
//! # Responsibility
//! - Create (`install`) and migrate (`upgrade`) a blog SQLite database.
//! - Report the schema version of an existing file (`status`).
//!
//! Configuration comes from flags or `BLOG_*` environment variables.

use anyhow::{bail, Context, Result};
use blog_core::db::migrations::{apply_migrations, current_version, latest_version};
use blog_core::db::open_db_unmigrated;
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

/// Blog database schema runner
#[derive(Parser, Debug)]
#[command(name = "blog", version, about = "Install and migrate the blog database schema")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "BLOG_DB_PATH", default_value = "blog.sqlite3")]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "BLOG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "BLOG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Create the blog schema in a new database file
    Install,
    /// Apply pending migrations to an existing database file
    Upgrade,
    /// Print the current and latest schema versions
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| blog_core::default_log_level());
        blog_core::init_logging(level, log_dir).context("failed to start logging")?;
    }

    match cli.command {
        Command::Install => install(&cli.db),
        Command::Upgrade => upgrade(&cli.db),
        Command::Status => status(&cli.db),
    }
}

fn install(path: &Path) -> Result<()> {
    let mut conn = open(path)?;
    let version = current_version(&conn)?;
    if version > 0 {
        bail!(
            "{} already holds blog schema version {version}; run `blog upgrade` instead",
            path.display()
        );
    }

    let applied = apply_migrations(&mut conn)
        .with_context(|| format!("failed to install schema into {}", path.display()))?;
    info!(
        "event=schema_install module=cli status=ok applied={} version={}",
        applied,
        latest_version()
    );
    println!(
        "installed blog schema version {} into {}",
        latest_version(),
        path.display()
    );
    Ok(())
}

fn upgrade(path: &Path) -> Result<()> {
    ensure_exists(path)?;
    let mut conn = open(path)?;
    let before = current_version(&conn)?;

    let applied = apply_migrations(&mut conn)
        .with_context(|| format!("failed to upgrade {}", path.display()))?;
    info!(
        "event=schema_upgrade module=cli status=ok from={} applied={}",
        before, applied
    );
    if applied == 0 {
        println!("{} is up to date at version {before}", path.display());
    } else {
        println!(
            "upgraded {} from version {before} to {} ({applied} migration(s))",
            path.display(),
            latest_version()
        );
    }
    Ok(())
}

fn status(path: &Path) -> Result<()> {
    ensure_exists(path)?;
    let conn = open(path)?;
    let current = current_version(&conn)?;
    let latest = latest_version();

    println!("database={}", path.display());
    println!("current_version={current}");
    println!("latest_version={latest}");
    println!("pending={}", latest.saturating_sub(current));
    println!("blog_core version={}", blog_core::core_version());
    Ok(())
}

fn open(path: &Path) -> Result<blog_core::db::Connection> {
    open_db_unmigrated(path).with_context(|| format!("failed to open {}", path.display()))
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!(
            "{} does not exist; run `blog install` first",
            path.display()
        );
    }
    Ok(())
}
