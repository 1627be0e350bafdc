use financas_core::{
    new_id, Account, AccountKind, Category, CategorySubtype, Money, SplitEntry, TransactionType,
};

use crate::entry::{EntrySource, ParsedRows, StatementEntry};

/// Placeholder category shown for rows that carry an inline split.
pub const SPLIT_CATEGORY_LABEL: &str = "Múltiplas Categorias";

const DEFAULT_DESCRIPTION: &str = "Sem descrição";

/// `;` when the header line contains one, else `,`. The export templates
/// use `;`; spreadsheets saved as plain CSV use `,`.
fn sniff_delimiter(data: &str) -> u8 {
    let header = data.lines().next().unwrap_or_default();
    if header.contains(';') {
        b';'
    } else {
        b','
    }
}

fn reader(data: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data.as_bytes())
}

fn clean(field: &str) -> String {
    field.trim().replace('"', "")
}

/// Positional schema: date; description; amount; type; category. The
/// category cell may be an inline split spec (`"Cat1: 100; Cat2: 50"`),
/// which the delimiter itself may have cut apart — everything from the
/// fifth column on is rejoined before interpretation.
pub fn parse_transactions(data: &str, known_categories: &[Category]) -> ParsedRows<StatementEntry> {
    let delimiter = sniff_delimiter(data);
    let mut out = ParsedRows::new();

    for (index, record) in reader(data, delimiter).records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                out.reject(index, e.to_string());
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < 3 {
            out.reject(index, "too few columns");
            continue;
        }

        let raw_date = record.get(0).unwrap_or_default().trim();
        let Ok(date) = chrono::NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") else {
            out.reject(index, "invalid date (expected YYYY-MM-DD)");
            continue;
        };

        let description = {
            let d = clean(record.get(1).unwrap_or_default());
            if d.is_empty() {
                DEFAULT_DESCRIPTION.to_string()
            } else {
                d
            }
        };

        let Ok(amount) = record.get(2).unwrap_or_default().parse::<Money>() else {
            out.reject(index, "invalid amount");
            continue;
        };

        let raw_type = record.get(3).unwrap_or_default().trim().to_uppercase();
        let kind = if raw_type == "RECEITA" || raw_type == "INCOME" {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };

        let raw_category = clean(
            &record
                .iter()
                .skip(4)
                .collect::<Vec<_>>()
                .join(&(delimiter as char).to_string()),
        );

        let (category, split) = interpret_category_cell(&raw_category, known_categories);

        let mut entry =
            StatementEntry::new(date, amount.abs(), kind, description, EntrySource::Csv);
        entry.category = category;
        entry.split = split;
        out.rows.push(entry);
    }

    out
}

/// A cell containing both `;` and `:` is an inline split spec; a spec
/// that yields a single part collapses to a plain category. Known
/// category names are matched case-insensitively so the canonical
/// casing is preserved.
fn interpret_category_cell(
    raw: &str,
    known: &[Category],
) -> (Option<String>, Option<Vec<SplitEntry>>) {
    if raw.contains(';') && raw.contains(':') {
        let mut splits = Vec::new();
        for part in raw.split(';') {
            let Some((name, value)) = part.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let Ok(amount) = value.trim().parse::<Money>() else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            splits.push(SplitEntry {
                category_name: canonical_name(name, known),
                amount,
            });
        }
        match splits.len() {
            0 => {}
            1 => return (Some(splits.remove(0).category_name), None),
            _ => return (Some(SPLIT_CATEGORY_LABEL.to_string()), Some(splits)),
        }
    }

    let raw = raw.trim();
    if raw.is_empty() {
        (None, None)
    } else {
        (Some(canonical_name(raw, known)), None)
    }
}

fn canonical_name(raw: &str, known: &[Category]) -> String {
    known
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(raw))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| raw.to_string())
}

/// Positional schema: name; type; subtype; impactsBudget; icon.
pub fn parse_categories(data: &str) -> ParsedRows<Category> {
    let delimiter = sniff_delimiter(data);
    let mut out = ParsedRows::new();

    for (index, record) in reader(data, delimiter).records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                out.reject(index, e.to_string());
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < 2 {
            out.reject(index, "too few columns");
            continue;
        }

        let name = clean(record.get(0).unwrap_or_default());
        if name.is_empty() {
            out.reject(index, "missing name");
            continue;
        }

        let raw_type = record.get(1).unwrap_or_default().trim().to_uppercase();
        let kind = if raw_type == "RECEITA" || raw_type == "INCOME" {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };

        let raw_subtype = record.get(2).unwrap_or_default().trim().to_uppercase();
        let subtype = if raw_subtype == "FIXA" || raw_subtype == "FIXED" {
            CategorySubtype::Fixed
        } else {
            CategorySubtype::Variable
        };

        let raw_impact = record.get(3).unwrap_or_default().trim().to_uppercase();
        let impacts_budget = matches!(raw_impact.as_str(), "SIM" | "YES" | "TRUE");

        let icon = record
            .get(4)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        out.rows.push(Category {
            id: new_id(),
            name,
            kind,
            subtype,
            impacts_budget,
            icon,
        });
    }

    out
}

/// Positional schema: name; type; initialBalance; closingDay; dueDay.
/// Card rows must carry valid statement-cycle days.
pub fn parse_accounts(data: &str) -> ParsedRows<Account> {
    let delimiter = sniff_delimiter(data);
    let mut out = ParsedRows::new();

    for (index, record) in reader(data, delimiter).records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                out.reject(index, e.to_string());
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < 2 {
            out.reject(index, "too few columns");
            continue;
        }

        let name = clean(record.get(0).unwrap_or_default());
        if name.is_empty() {
            out.reject(index, "missing name");
            continue;
        }

        let raw_type = record.get(1).unwrap_or_default().trim().to_uppercase();
        let kind = if raw_type == "CARTAO" || raw_type == "CREDIT_CARD" {
            AccountKind::CreditCard
        } else {
            AccountKind::Bank
        };

        let initial_balance = record
            .get(2)
            .and_then(|s| s.trim().parse::<Money>().ok())
            .unwrap_or_else(Money::zero);

        let day = |col: usize| {
            record
                .get(col)
                .and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|d| (1..=31).contains(d))
        };
        let closing_day = day(3);
        let due_day = day(4);

        if kind == AccountKind::CreditCard && (closing_day.is_none() || due_day.is_none()) {
            out.reject(index, "invalid closing/due day for card");
            continue;
        }

        out.rows.push(Account {
            id: new_id(),
            name,
            kind,
            initial_balance: if kind == AccountKind::Bank {
                initial_balance
            } else {
                Money::zero()
            },
            closing_day: if kind == AccountKind::CreditCard { closing_day } else { None },
            due_day: if kind == AccountKind::CreditCard { due_day } else { None },
        });
    }

    out
}
