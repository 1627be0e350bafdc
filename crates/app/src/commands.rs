use std::path::Path;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use comfy_table::Table;
use financas_core::{Account, InvoiceMonth, LedgerError, Money, TransactionType};
use financas_engine::{balance, budget, invoice};
use financas_import::{
    classify, csv, expand, ofx, ClassifiedEntry, Destination, EntryStatus, InvalidRow,
    KeywordTable, ParsedRows, StatementEntry,
};
use financas_storage::{LedgerStore, Snapshot};
use tracing::{info, warn};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_bucket(s: &str) -> anyhow::Result<InvoiceMonth> {
    Ok(s.parse()?)
}

fn month_of(month: u32, year: i32) -> anyhow::Result<InvoiceMonth> {
    InvoiceMonth::new(month, year).context("month must be between 1 and 12")
}

fn find_account<'a>(snapshot: &'a Snapshot, name: &str) -> anyhow::Result<&'a Account> {
    snapshot
        .accounts
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()).into())
}

/// Resolves the destination for an import, rejecting closed card
/// buckets so nothing new lands on an already-paid invoice.
fn resolve_destination(
    snapshot: &Snapshot,
    account: &Account,
    invoice_arg: Option<&str>,
) -> anyhow::Result<Destination> {
    if !account.is_credit_card() {
        return Ok(Destination::Bank {
            account_id: account.id.clone(),
        });
    }

    let bucket = invoice_arg
        .context("--invoice MM/YYYY is required for card accounts")
        .and_then(|s| parse_bucket(s))?;
    if invoice::is_closed(account, bucket, &snapshot.transactions) {
        return Err(LedgerError::InvoiceClosed(invoice::invoice_name(&account.name, bucket)).into());
    }
    Ok(Destination::Card {
        account_id: account.id.clone(),
        first_invoice: bucket,
    })
}

fn report_invalid(invalid: &[InvalidRow]) {
    for row in invalid {
        warn!(index = row.index, reason = %row.reason, "skipped row");
    }
    if !invalid.is_empty() {
        println!("{} row(s) skipped as invalid.", invalid.len());
    }
}

fn print_classification(items: &[ClassifiedEntry]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Description",
        "Amount",
        "Type",
        "Status",
        "Category",
        "Installments",
    ]);
    for item in items {
        let e = &item.entry;
        let status = match &item.status {
            EntryStatus::New => "NEW",
            EntryStatus::Duplicate => "DUPLICATE",
            EntryStatus::UpdateValue { .. } => "UPDATE_VALUE",
        };
        let hint = e
            .installments
            .map(|h| format!("{}/{}", h.current, h.total))
            .unwrap_or_default();
        table.add_row(vec![
            e.date.to_string(),
            e.description.clone(),
            e.amount.to_string(),
            match e.kind {
                TransactionType::Income => "INCOME".to_string(),
                TransactionType::Expense => "EXPENSE".to_string(),
            },
            status.to_string(),
            item.category.clone().unwrap_or_else(|| "-".to_string()),
            hint,
        ]);
    }
    println!("{table}");
}

/// Expands the selected entries and persists them: updates first (rows
/// overwriting an existing id), then creates, one batch each. A store
/// failure leaves the classification untouched so the same batch can be
/// retried.
async fn commit_classified<S: LedgerStore>(
    store: &S,
    items: &[ClassifiedEntry],
    destination: &Destination,
) -> anyhow::Result<()> {
    let mut creates = Vec::new();
    let mut updates = Vec::new();

    for item in items.iter().filter(|i| i.selected) {
        let mut rows = expand(item, destination, today());
        if matches!(item.status, EntryStatus::UpdateValue { .. }) && !rows.is_empty() {
            updates.push(rows.remove(0));
        }
        creates.append(&mut rows);
    }

    if !updates.is_empty() {
        store.update_transactions(&updates).await?;
    }
    if !creates.is_empty() {
        store.create_transactions(&creates).await?;
    }
    info!(created = creates.len(), updated = updates.len(), "import committed");
    println!(
        "Committed: {} created, {} updated.",
        creates.len(),
        updates.len()
    );
    Ok(())
}

async fn import_entries<S: LedgerStore>(
    store: &S,
    snapshot: &Snapshot,
    parsed: ParsedRows<StatementEntry>,
    account_name: &str,
    invoice_arg: Option<&str>,
    commit: bool,
    keywords: &KeywordTable,
) -> anyhow::Result<()> {
    report_invalid(&parsed.invalid);

    let account = find_account(snapshot, account_name)?;
    let destination = resolve_destination(snapshot, account, invoice_arg)?;

    let items = classify(parsed.rows, &snapshot.transactions, keywords);
    print_classification(&items);

    if commit {
        commit_classified(store, &items, &destination).await
    } else {
        println!("Preview only; re-run with --commit to persist the selected entries.");
        Ok(())
    }
}

pub async fn import_ofx<S: LedgerStore>(
    store: &S,
    file: &Path,
    account: &str,
    invoice_arg: Option<&str>,
    commit: bool,
    keywords: &KeywordTable,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let snapshot = store.snapshot().await?;
    let parsed = ofx::parse(&data);
    import_entries(store, &snapshot, parsed, account, invoice_arg, commit, keywords).await
}

pub async fn import_csv_transactions<S: LedgerStore>(
    store: &S,
    file: &Path,
    account: &str,
    invoice_arg: Option<&str>,
    commit: bool,
    keywords: &KeywordTable,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let snapshot = store.snapshot().await?;
    let parsed = csv::parse_transactions(&data, &snapshot.categories);
    import_entries(store, &snapshot, parsed, account, invoice_arg, commit, keywords).await
}

pub async fn import_csv_categories<S: LedgerStore>(
    store: &S,
    file: &Path,
    commit: bool,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let parsed = csv::parse_categories(&data);
    report_invalid(&parsed.invalid);

    for category in &parsed.rows {
        println!("{} ({:?}, {:?})", category.name, category.kind, category.subtype);
    }
    if !commit {
        println!("Preview only; re-run with --commit to persist.");
        return Ok(());
    }
    for category in &parsed.rows {
        store.create_category(category).await?;
    }
    println!("Created {} categories.", parsed.rows.len());
    Ok(())
}

pub async fn import_csv_accounts<S: LedgerStore>(
    store: &S,
    file: &Path,
    commit: bool,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let parsed = csv::parse_accounts(&data);
    report_invalid(&parsed.invalid);

    for account in &parsed.rows {
        println!("{} ({:?})", account.name, account.kind);
    }
    if !commit {
        println!("Preview only; re-run with --commit to persist.");
        return Ok(());
    }
    for account in &parsed.rows {
        store.create_account(account).await?;
    }
    println!("Created {} accounts.", parsed.rows.len());
    Ok(())
}

pub async fn invoices<S: LedgerStore>(store: &S, card_name: &str) -> anyhow::Result<()> {
    let snapshot = store.snapshot().await?;
    let card = find_account(&snapshot, card_name)?;
    if !card.is_credit_card() {
        return Err(LedgerError::NotACreditCard(card.name.clone()).into());
    }

    let mut table = Table::new();
    table.set_header(vec!["Invoice", "Total", "State"]);
    for bucket in invoice::list_buckets(&card.id, &snapshot.transactions, today()) {
        let total = invoice::invoice_total(&card.id, bucket, &snapshot.transactions);
        let closed = invoice::is_closed(card, bucket, &snapshot.transactions);
        if total.is_zero() && !closed {
            continue;
        }
        table.add_row(vec![
            bucket.to_string(),
            total.round2().to_string(),
            if closed { "CLOSED" } else { "OPEN" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn close_invoice<S: LedgerStore>(
    store: &S,
    card_name: &str,
    month: &str,
) -> anyhow::Result<()> {
    let bucket = parse_bucket(month)?;
    let snapshot = store.snapshot().await?;
    let card = find_account(&snapshot, card_name)?;

    let closed = invoice::close(card, bucket, &snapshot.transactions, &snapshot.categories)?;
    if let Some(category) = &closed.new_category {
        store.create_category(category).await?;
    }
    store.create_transaction(&closed.payment).await?;

    println!(
        "Closed {}: payment of {} due {}.",
        closed.payment.description, closed.payment.amount, closed.payment.date
    );
    Ok(())
}

pub async fn reopen_invoice<S: LedgerStore>(
    store: &S,
    card_name: &str,
    month: &str,
) -> anyhow::Result<()> {
    let bucket = parse_bucket(month)?;
    let snapshot = store.snapshot().await?;
    let card = find_account(&snapshot, card_name)?;

    let payment_id = invoice::reopen(card, bucket, &snapshot.transactions)?;
    store.delete_transaction(&payment_id).await?;

    println!("Reopened {}.", invoice::invoice_name(&card.name, bucket));
    Ok(())
}

pub async fn budget_report<S: LedgerStore>(
    store: &S,
    month: u32,
    year: i32,
) -> anyhow::Result<()> {
    let target = month_of(month, year)?;
    let snapshot = store.snapshot().await?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Planned", "Realized", "Remaining"]);
    for category in &snapshot.categories {
        if category.kind != TransactionType::Expense || !category.impacts_budget {
            continue;
        }
        let planned = budget::planned(&snapshot.budgets, &category.id, target);
        let realized = budget::realized(&snapshot.transactions, &category.name, target);
        table.add_row(vec![
            category.name.clone(),
            planned.to_string(),
            realized.to_string(),
            (planned - realized).to_string(),
        ]);
    }
    let (total_planned, total_realized) = budget::monthly_totals(
        &snapshot.budgets,
        &snapshot.transactions,
        &snapshot.categories,
        target,
    );
    table.add_row(vec![
        "TOTAL".to_string(),
        total_planned.to_string(),
        total_realized.to_string(),
        (total_planned - total_realized).to_string(),
    ]);
    println!("{table}");
    Ok(())
}

/// `targets` come as `Category=amount`. The source row is decremented by
/// the sum of deltas; each target gains its own. Exceeding the source's
/// unspent remainder is allowed but warned about.
pub async fn reallocate<S: LedgerStore>(
    store: &S,
    from: &str,
    month: u32,
    year: i32,
    targets: &[String],
) -> anyhow::Result<()> {
    let target_month = month_of(month, year)?;
    let snapshot = store.snapshot().await?;

    let category_id = |name: &str| -> anyhow::Result<String> {
        snapshot
            .categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.id.clone())
            .with_context(|| format!("unknown category: {name}"))
    };

    let source = snapshot
        .categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(from))
        .with_context(|| format!("unknown category: {from}"))?;

    let mut deltas: Vec<(String, Money)> = Vec::new();
    let mut moved = Money::zero();
    for spec in targets {
        let (name, raw_amount) = spec
            .split_once('=')
            .with_context(|| format!("expected Category=amount, got {spec:?}"))?;
        let amount: Money = raw_amount
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("invalid amount in {spec:?}"))?;
        deltas.push((category_id(name.trim())?, amount));
        moved = moved + amount;
    }

    let available = budget::unspent(
        &snapshot.budgets,
        &snapshot.transactions,
        source,
        target_month,
    );
    if moved > available {
        warn!(%moved, %available, "reallocation exceeds the source's unspent budget");
    }

    let mut adjustments = vec![(source.id.clone(), -moved)];
    adjustments.extend(deltas);
    let rows = budget::reallocate(&snapshot.budgets, &adjustments, target_month);
    store.upsert_budgets(&rows).await?;

    println!("Moved {} from {} across {} categories.", moved, source.name, targets.len());
    Ok(())
}

pub async fn calendar<S: LedgerStore>(
    store: &S,
    month: u32,
    year: i32,
    account_name: Option<&str>,
) -> anyhow::Result<()> {
    let period = month_of(month, year)?;
    let snapshot = store.snapshot().await?;

    let scope = match account_name {
        Some(name) => {
            let account = find_account(&snapshot, name)?;
            if account.is_credit_card() {
                return Err(LedgerError::NoCashBalance(account.name.clone()).into());
            }
            balance::BalanceScope::Account(account)
        }
        None => balance::BalanceScope::AllBanks,
    };

    let days = balance::project(scope, &snapshot.accounts, &snapshot.transactions, period);

    let mut table = Table::new();
    table.set_header(vec!["Date", "Start", "Income", "Expense", "End"]);
    for day in &days {
        table.add_row(vec![
            day.date.to_string(),
            day.start.round2().to_string(),
            day.income.round2().to_string(),
            day.expense.round2().to_string(),
            day.end.round2().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use financas_core::AccountKind;
    use financas_storage::MemoryStore;

    #[tokio::test]
    async fn calendar_rejects_cards_with_a_cash_balance_error() {
        let store = MemoryStore::with_snapshot(Snapshot {
            accounts: vec![Account {
                id: "c1".to_string(),
                name: "Visa".to_string(),
                kind: AccountKind::CreditCard,
                initial_balance: Money::zero(),
                closing_day: Some(3),
                due_day: Some(10),
            }],
            ..Snapshot::default()
        });

        let err = calendar(&store, 3, 2025, Some("Visa")).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no cash balance"), "got: {message}");
        assert!(!message.contains("not a credit card"), "got: {message}");
    }
}
