mod cli;
mod commands;
mod config;

use clap::Parser;
use financas_import::KeywordTable;
use financas_storage::{LedgerStore, MemoryStore, RemoteStore};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CsvKind, ImportCommands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load()?;
    let keywords = config.keyword_table()?;

    if cli.dry_run {
        let store = MemoryStore::new();
        dispatch(&store, cli.command, &keywords).await
    } else {
        let store = RemoteStore::new(config.api_url.clone(), config.api_token.clone());
        dispatch(&store, cli.command, &keywords).await
    }
}

async fn dispatch<S: LedgerStore>(
    store: &S,
    command: Commands,
    keywords: &KeywordTable,
) -> anyhow::Result<()> {
    match command {
        Commands::Import { command } => match command {
            ImportCommands::Ofx {
                file,
                account,
                invoice,
                commit,
            } => {
                commands::import_ofx(store, &file, &account, invoice.as_deref(), commit, keywords)
                    .await
            }
            ImportCommands::Csv {
                file,
                kind,
                account,
                invoice,
                commit,
            } => match kind {
                CsvKind::Transactions => {
                    let account = account
                        .ok_or_else(|| anyhow::anyhow!("--account is required for transactions"))?;
                    commands::import_csv_transactions(
                        store,
                        &file,
                        &account,
                        invoice.as_deref(),
                        commit,
                        keywords,
                    )
                    .await
                }
                CsvKind::Categories => commands::import_csv_categories(store, &file, commit).await,
                CsvKind::Accounts => commands::import_csv_accounts(store, &file, commit).await,
            },
        },
        Commands::Invoices { card } => commands::invoices(store, &card).await,
        Commands::CloseInvoice { card, month } => {
            commands::close_invoice(store, &card, &month).await
        }
        Commands::ReopenInvoice { card, month } => {
            commands::reopen_invoice(store, &card, &month).await
        }
        Commands::Budget { month, year } => commands::budget_report(store, month, year).await,
        Commands::Reallocate {
            from,
            month,
            year,
            targets,
        } => commands::reallocate(store, &from, month, year, &targets).await,
        Commands::Calendar {
            month,
            year,
            account,
        } => commands::calendar(store, month, year, account.as_deref()).await,
    }
}
