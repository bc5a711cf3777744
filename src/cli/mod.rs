use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;

use crate::application::LedgerService;
use crate::domain::{AccountId, NewTransaction, format_cents, format_timestamp, parse_amount};
use crate::storage::StoreOptions;

/// Overdraft Ledger - per-account overdraft-limited ledger service
#[derive(Parser)]
#[command(name = "overdraft-ledger")]
#[command(about = "A small ledger that records credits and debits against overdraft-limited accounts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "ledger.db", global = true)]
    pub database: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and provision the default accounts
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        listen: SocketAddr,

        /// Database connection pool size
        #[arg(long, default_value_t = 4)]
        max_connections: u32,

        /// Seconds a request may wait for a pooled connection
        #[arg(long, default_value_t = 30)]
        acquire_timeout: u64,
    },

    /// Record a credit or debit
    Submit {
        /// Account id
        account: AccountId,

        /// Amount in cents (whole number)
        amount: String,

        /// "c" for credit, "d" for debit
        kind: String,

        /// Short description (1-10 characters)
        description: String,
    },

    /// Show an account statement
    Statement {
        /// Account id
        account: AccountId,
    },

    /// List provisioned accounts
    Accounts,

    /// Verify ledger integrity
    Check,

    /// Export data to CSV or JSON
    Export {
        /// Restrict the export to one account
        #[arg(long, conflicts_with = "balances")]
        account: Option<AccountId>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Export account balances instead of transactions (CSV only)
        #[arg(long)]
        balances: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        crate::telemetry::init(&self.log_level, self.log_json);

        match self.command {
            Commands::Init => {
                let service = LedgerService::init(&self.database, &StoreOptions::default()).await?;
                let accounts = service.list_accounts().await?;
                println!(
                    "Database initialized: {} ({} accounts)",
                    self.database,
                    accounts.len()
                );
            }

            Commands::Serve {
                listen,
                max_connections,
                acquire_timeout,
            } => {
                let options = StoreOptions {
                    max_connections,
                    acquire_timeout: Duration::from_secs(acquire_timeout),
                    ..StoreOptions::default()
                };
                let service = LedgerService::init(&self.database, &options).await?;
                let listener = TcpListener::bind(listen)
                    .await
                    .with_context(|| format!("Failed to bind {}", listen))?;

                let service = Arc::new(service);
                crate::api::serve(listener, service.clone()).await?;
                service.repository().close().await;
            }

            Commands::Submit {
                account,
                amount,
                kind,
                description,
            } => {
                let service = connect(&self.database).await?;
                let amount =
                    parse_amount(&amount).context("Invalid amount. Use a whole number of cents")?;
                let tx = NewTransaction::new(amount, &kind, description)?;
                let receipt = service.submit_transaction(account, tx).await?;

                println!(
                    "Recorded {} of {} on account {} (balance {}, limit {})",
                    receipt.record.kind.label(),
                    format_cents(receipt.record.amount),
                    account,
                    format_cents(receipt.balance),
                    format_cents(receipt.limit)
                );
            }

            Commands::Statement { account } => {
                let service = connect(&self.database).await?;
                run_statement_command(&service, account).await?;
            }

            Commands::Accounts => {
                let service = connect(&self.database).await?;
                let accounts = service.list_accounts().await?;
                println!("{:<6} {:>16} {:>16}", "ID", "LIMIT", "BALANCE");
                println!("{}", "-".repeat(40));
                for account in accounts {
                    println!(
                        "{:<6} {:>16} {:>16}",
                        account.id,
                        format_cents(account.limit),
                        format_cents(account.balance)
                    );
                }
            }

            Commands::Check => {
                let service = connect(&self.database).await?;
                run_check_command(&service).await?;
            }

            Commands::Export {
                account,
                format,
                balances,
                output,
            } => {
                let service = connect(&self.database).await?;
                run_export_command(&service, account, format, balances, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn connect(database: &str) -> Result<LedgerService> {
    LedgerService::connect(database, &StoreOptions::default())
        .await
        .with_context(|| format!("Failed to open {}. Run `init` first?", database))
}

async fn run_statement_command(service: &LedgerService, account: AccountId) -> Result<()> {
    let statement = service.get_statement(account).await?;

    println!("Account {}", statement.account.id);
    println!("  Balance:   {}", format_cents(statement.account.balance));
    println!("  Limit:     {}", format_cents(statement.account.limit));
    println!("  As of:     {}", format_timestamp(&statement.generated_at));
    println!();

    if statement.recent.is_empty() {
        println!("No transactions.");
        return Ok(());
    }

    println!(
        "{:<28} {:<4} {:>14} {:<10}",
        "OCCURRED AT", "KIND", "AMOUNT", "DESCRIPTION"
    );
    println!("{}", "-".repeat(60));
    for tx in &statement.recent {
        println!(
            "{:<28} {:<4} {:>14} {:<10}",
            format_timestamp(&tx.created_at),
            tx.kind.as_str(),
            format_cents(tx.amount),
            tx.description
        );
    }
    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    let report = service.check_integrity().await?;

    for account in &report.accounts {
        let status = if account.is_consistent() { "OK" } else { "FAIL" };
        println!(
            "[{}] account {}: balance {}, log sum {}, {} transactions",
            status,
            account.account_id,
            format_cents(account.balance),
            format_cents(account.computed_balance),
            account.transaction_count
        );
        for issue in &account.issues {
            println!("       - {}", issue);
        }
    }

    if report.is_healthy() {
        println!("Ledger is consistent.");
        Ok(())
    } else {
        anyhow::bail!("integrity check found {} issue(s)", report.issue_count())
    }
}

async fn run_export_command(
    service: &LedgerService,
    account: Option<AccountId>,
    format: ExportFormat,
    balances: bool,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match (format, balances) {
        (ExportFormat::Csv, true) => {
            let count = exporter.export_accounts_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} accounts", count);
            }
        }
        (ExportFormat::Csv, false) => {
            let count = exporter.export_transactions_csv(writer, account).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        (ExportFormat::Json, _) => {
            let snapshot = exporter.export_full_json(writer, account).await?;
            if output.is_some() {
                eprintln!(
                    "Exported {} accounts and {} transactions",
                    snapshot.accounts.len(),
                    snapshot.transactions.len()
                );
            }
        }
    }

    Ok(())
}
