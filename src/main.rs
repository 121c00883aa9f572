//! NumberX CLI
//!
//! Command-line front end for the NumberX service:
//! - Operator login
//! - Rounds and their totals
//! - Entries, paged the same way the ledger pages them
//! - Wager limits
//! - Over-limit reports and CSV export

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use numberx::client::{ClientError, HttpClient, LotteryApi};
use numberx::config::{generate_default_config, Config, LoggingConfig};
use numberx::ledger::{EntryLedger, LedgerError, LedgerSnapshot};
use numberx::limits::{LimitBook, LimitError};
use numberx::report::{self, OverLimitReport, SummaryFilter};
use numberx::types::{EntryId, EntryPatch, NewEntry, NumberType, RoundId};
use numberx::validation;

#[derive(Parser)]
#[command(name = "numberx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record lottery entries, manage wager limits and print over-limit reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Service URL (overrides config and NUMBERX_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file (default: search the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an operator session
    Login {
        /// Name recorded on new entries
        name: String,
    },

    /// End the operator session
    Logout,

    /// Show the current operator
    Whoami,

    /// Manage rounds
    #[command(subcommand)]
    Rounds(RoundCommands),

    /// Manage entries of a round
    #[command(subcommand)]
    Entries(EntryCommands),

    /// Manage wager limits of a round
    #[command(subcommand)]
    Limits(LimitCommands),

    /// Print the over-limit report of a round
    Report {
        /// Round ID
        round: RoundId,
        /// Write over-limit rows as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Rows per exported page (default from config)
        #[arg(long)]
        rows_per_page: Option<usize>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RoundCommands {
    /// List rounds
    List,
    /// Create a round
    Create {
        /// Draw date (YYYY-MM-DD)
        draw_date: String,
    },
    /// Change a round's status
    Status {
        id: RoundId,
        /// New status (e.g. open, closed)
        status: String,
    },
    /// Delete a round with its entries and limits
    Delete { id: RoundId },
    /// Round totals and per-number summaries
    Summary {
        id: RoundId,
        /// Only this number type
        #[arg(short = 't', long = "type")]
        number_type: Option<NumberType>,
        /// Only numbers over their limit
        #[arg(long)]
        over_limit: bool,
    },
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// List entries, newest first
    List {
        round: RoundId,
        /// Keep loading pages until every entry is shown
        #[arg(long)]
        all: bool,
    },
    /// Record an entry
    Add {
        round: RoundId,
        /// Number (digits only)
        number: String,
        /// Price (digits only)
        price: String,
        #[arg(short = 't', long = "type", default_value = "2digit")]
        number_type: NumberType,
    },
    /// Change an entry
    Edit {
        id: EntryId,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(short = 't', long = "type")]
        number_type: Option<NumberType>,
    },
    /// Delete an entry
    Rm { id: EntryId },
}

#[derive(Subcommand)]
pub enum LimitCommands {
    /// List a round's limits
    List { round: RoundId },
    /// Set the limit for a number type
    Set {
        round: RoundId,
        number_type: NumberType,
        amount: f64,
    },
    /// Remove the limit for a number type
    Rm { round: RoundId, number_type: NumberType },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialise logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {}", describe(&e));
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("numberx={}", logging.level)));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            let writer = Mutex::new(file);
            if logging.is_json() {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            }
        }
        None if logging.is_json() => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        None => fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
    Ok(())
}

/// Operator-facing text for a failure
fn describe(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<LedgerError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<LimitError>() {
        e.user_message()
    } else if let Some(e) = err.downcast_ref::<ClientError>() {
        e.user_message()
    } else {
        format!("{:#}", err)
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let format = cli.format;
    let sessions = config.session.store();

    let command = match cli.command {
        Commands::Login { name } => {
            let session = sessions.save(&name, Utc::now())?;
            println!(
                "Logged in as {} until {}",
                session.name,
                session.expires_at.format("%Y-%m-%d %H:%M UTC")
            );
            return Ok(());
        }
        Commands::Logout => {
            sessions.clear()?;
            println!("Logged out");
            return Ok(());
        }
        Commands::Whoami => {
            match sessions.load(Utc::now())? {
                Some(session) => println!("{}", session.name),
                None => println!("Not logged in"),
            }
            return Ok(());
        }
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
            return Ok(());
        }
        other => other,
    };

    let api: Arc<dyn LotteryApi> = Arc::new(HttpClient::new(config.api.to_client_config())?);

    match command {
        Commands::Rounds(cmd) => rounds(api.as_ref(), cmd, format).await,
        Commands::Entries(cmd) => {
            let ledger = EntryLedger::new(Arc::clone(&api), config.ledger.clone());
            let operator = match sessions.load(Utc::now()) {
                Ok(session) => session.map(|s| s.name),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read operator session");
                    None
                }
            };
            entries(&ledger, operator, cmd, format).await
        }
        Commands::Limits(cmd) => limits(&LimitBook::new(api), cmd, format).await,
        Commands::Report {
            round,
            csv,
            rows_per_page,
        } => {
            let rows_per_page = rows_per_page.unwrap_or(config.report.rows_per_page);
            report_cmd(api.as_ref(), round, csv, rows_per_page, format).await
        }
        Commands::Login { .. } | Commands::Logout | Commands::Whoami | Commands::Config { .. } => {
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn rounds(api: &dyn LotteryApi, cmd: RoundCommands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RoundCommands::List => {
            let rounds = api.list_rounds().await?;
            if format == OutputFormat::Json {
                return print_json(&rounds);
            }
            if rounds.is_empty() {
                println!("No rounds yet.");
                println!();
                println!("Create one with:");
                println!("  numberx rounds create 2025-01-16");
                return Ok(());
            }
            println!("{:<6} {:<12} {:<10} {}", "ID", "Draw date", "Status", "Active");
            println!("{}", "-".repeat(40));
            for round in rounds {
                println!(
                    "{:<6} {:<12} {:<10} {}",
                    round.id,
                    round.draw_date,
                    round.status,
                    if round.is_active { "yes" } else { "no" }
                );
            }
        }
        RoundCommands::Create { draw_date } => {
            let date = validation::parse_draw_date(&draw_date)?;
            let round = api.create_round(date).await?;
            if format == OutputFormat::Json {
                return print_json(&round);
            }
            println!("Created round {} for {}", round.id, round.draw_date);
        }
        RoundCommands::Status { id, status } => {
            let round = api.update_round_status(id, status.trim()).await?;
            if format == OutputFormat::Json {
                return print_json(&round);
            }
            println!("Round {} is now {}", round.id, round.status);
        }
        RoundCommands::Delete { id } => {
            api.delete_round(id).await?;
            println!("Deleted round {}", id);
        }
        RoundCommands::Summary {
            id,
            number_type,
            over_limit,
        } => {
            let summary = api.round_summary(id).await?;
            let numbers = api.number_summary(id).await?;
            let filter = SummaryFilter {
                number_type,
                over_limit_only: over_limit,
            };
            let picked = filter.apply(&numbers);

            if format == OutputFormat::Json {
                return print_json(&serde_json::json!({
                    "round": summary,
                    "numbers": picked,
                }));
            }
            println!("Round {} ({}) - {}", summary.round_id, summary.draw_date, summary.status);
            println!("  Entries:    {}", summary.total_entries);
            println!("  Total:      {}", report::format_money(summary.total_amount));
            println!("  Over limit: {}", summary.over_limit_count);
            println!();
            print!("{}", report::render_summary_table(&picked));
        }
    }
    Ok(())
}

fn print_entries(snapshot: &LedgerSnapshot) {
    if snapshot.items.is_empty() {
        println!("No entries in this round.");
        return;
    }
    println!(
        "{:<8} {:<8} {:<8} {:>10} {:<12} {}",
        "ID", "Number", "Type", "Price", "Recorded by", "Flags"
    );
    println!("{}", "-".repeat(60));
    for item in &snapshot.items {
        let entry = &item.entry;
        println!(
            "{:<8} {:<8} {:<8} {:>10} {:<12} {}",
            entry.id,
            entry.number_value,
            entry.number_type.as_str(),
            report::format_money(entry.price),
            entry.recorded_by.as_deref().unwrap_or("-"),
            if entry.is_over_limit { "OVER LIMIT" } else { "" }
        );
    }
    println!();
    print!("Showing {} of {} entries", snapshot.items.len(), snapshot.total_count);
    if snapshot.has_more {
        println!(" (use --all to load the rest)");
    } else {
        println!();
    }
}

async fn entries(
    ledger: &EntryLedger,
    operator: Option<String>,
    cmd: EntryCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        EntryCommands::List { round, all } => {
            ledger.reset(round).await?;
            if all {
                let pages = ledger.load_all().await?;
                tracing::debug!(round_id = round, pages, "Loaded remaining pages");
            }
            let snapshot = ledger.snapshot().await;
            if format == OutputFormat::Json {
                return print_json(&snapshot.entries().collect::<Vec<_>>());
            }
            print_entries(&snapshot);
        }
        EntryCommands::Add {
            round,
            number,
            price,
            number_type,
        } => {
            let price = validation::parse_price(&price).map_err(LedgerError::from)?;
            let entry = NewEntry::new(round, number.trim(), price)
                .number_type(number_type)
                .recorded_by(operator);
            let created = ledger.create(entry).await?;
            if format == OutputFormat::Json {
                return print_json(&created);
            }
            println!(
                "Recorded {} ({}) for {} as entry {}",
                created.number_value,
                created.number_type.label(),
                report::format_money(created.price),
                created.id
            );
            if created.is_over_limit {
                println!("Warning: number {} is over its limit", created.number_value);
            }
        }
        EntryCommands::Edit {
            id,
            number,
            price,
            number_type,
        } => {
            let mut patch = EntryPatch::default();
            if let Some(number) = number {
                patch = patch.number_value(number.trim());
            }
            if let Some(price) = price {
                patch = patch.price(validation::parse_price(&price).map_err(LedgerError::from)?);
            }
            if let Some(number_type) = number_type {
                patch = patch.number_type(number_type);
            }

            let updated = ledger.edit(id, patch).await?;
            if format == OutputFormat::Json {
                return print_json(&updated);
            }
            println!(
                "Entry {} is now {} ({}) for {}",
                updated.id,
                updated.number_value,
                updated.number_type.label(),
                report::format_money(updated.price)
            );
        }
        EntryCommands::Rm { id } => {
            ledger.remove(id).await?;
            println!("Deleted entry {}", id);
        }
    }
    Ok(())
}

async fn limits(book: &LimitBook, cmd: LimitCommands, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        LimitCommands::List { round } => {
            let limits = book.list(round).await?;
            if format == OutputFormat::Json {
                return print_json(&limits);
            }
            if limits.is_empty() {
                println!("No limits set for round {}", round);
                return Ok(());
            }
            println!("{:<6} {:<10} {:>12}", "ID", "Type", "Limit");
            println!("{}", "-".repeat(30));
            for limit in limits {
                println!(
                    "{:<6} {:<10} {:>12}",
                    limit.id,
                    limit.number_type.label(),
                    report::format_money(limit.limit_amount)
                );
            }
        }
        LimitCommands::Set {
            round,
            number_type,
            amount,
        } => {
            let limit = book.set(round, number_type, amount).await?;
            if format == OutputFormat::Json {
                return print_json(&limit);
            }
            println!(
                "Limit for {} in round {} set to {}",
                limit.number_type.label(),
                round,
                report::format_money(limit.limit_amount)
            );
        }
        LimitCommands::Rm { round, number_type } => {
            if book.remove_type(round, number_type).await? {
                println!("Removed {} limit from round {}", number_type.label(), round);
            } else {
                println!("Round {} has no {} limit", round, number_type.label());
            }
        }
    }
    Ok(())
}

async fn report_cmd(
    api: &dyn LotteryApi,
    round: RoundId,
    csv: Option<PathBuf>,
    rows_per_page: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let summary = api.round_summary(round).await?;
    let numbers = api.number_summary(round).await?;
    let built = OverLimitReport::build(&summary, &numbers);

    if let Some(path) = csv {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        report::write_csv(&built, rows_per_page, file)?;
        let pages = built.pages(rows_per_page).len();
        println!("Report written to {} ({} page(s))", path.display(), pages);
        return Ok(());
    }

    if format == OutputFormat::Json {
        return print_json(&built);
    }
    print!("{}", report::render_report(&built));
    Ok(())
}
