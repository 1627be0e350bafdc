use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "financas",
    about = "Statement import, invoice lifecycle and budget engine for a personal ledger."
)]
pub struct Cli {
    /// Run against an empty in-memory ledger instead of the remote API.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a statement file.
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// List a card's invoice buckets with totals and open/closed state.
    Invoices {
        /// Card account name
        #[arg(long)]
        card: String,
    },
    /// Close one invoice bucket, creating its payment transaction.
    CloseInvoice {
        #[arg(long)]
        card: String,
        /// Bucket: MM/YYYY
        #[arg(long)]
        month: String,
    },
    /// Reopen a closed bucket by deleting its payment transaction.
    ReopenInvoice {
        #[arg(long)]
        card: String,
        /// Bucket: MM/YYYY
        #[arg(long)]
        month: String,
    },
    /// Planned vs. realized per category for one month.
    Budget {
        /// Month 1-12
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
    /// Move budget between categories: `reallocate --from Alimentação
    /// --month 3 --year 2025 "Lazer=100" "Saúde=50.50"`.
    Reallocate {
        /// Source category name
        #[arg(long)]
        from: String,
        /// Month 1-12
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        /// Targets as Category=amount
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Daily running balances for one calendar month.
    Calendar {
        /// Month 1-12
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        /// One BANK/INVESTMENT account; all banks when omitted
        #[arg(long)]
        account: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ImportCommands {
    /// Import an OFX export.
    Ofx {
        file: PathBuf,
        /// Destination account name
        #[arg(long)]
        account: String,
        /// First invoice bucket (MM/YYYY), required for card accounts
        #[arg(long)]
        invoice: Option<String>,
        /// Persist the selected entries (preview only without it)
        #[arg(long)]
        commit: bool,
    },
    /// Import a CSV file.
    Csv {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = CsvKind::Transactions)]
        kind: CsvKind,
        /// Destination account name (transactions kind only)
        #[arg(long)]
        account: Option<String>,
        /// First invoice bucket (MM/YYYY), required for card accounts
        #[arg(long)]
        invoice: Option<String>,
        #[arg(long)]
        commit: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CsvKind {
    Transactions,
    Categories,
    Accounts,
}
