use chrono::NaiveDate;
use financas_core::{Money, TransactionType};

use crate::entry::{EntrySource, ParsedRows, StatementEntry};

/// Fallback description when a block carries neither MEMO nor NAME.
const DEFAULT_DESCRIPTION: &str = "Movimentação OFX";

#[derive(Default)]
struct BuildingTrx {
    trn_type: Option<String>,
    date: Option<NaiveDate>,
    amount: Option<Money>,
    fitid: Option<String>,
    memo: Option<String>,
    name: Option<String>,
}

/// Parses the `<STMTTRN>` blocks of an OFX export into normalized
/// entries. Malformed blocks are recorded as invalid and skipped; an
/// INCOME block whose description contains "pagamento recebido" is a
/// card-payment receipt, not income, and is dropped silently.
pub fn parse(data: &str) -> ParsedRows<StatementEntry> {
    let mut out = ParsedRows::new();
    let mut in_stmttrn = false;
    let mut current: Option<BuildingTrx> = None;
    let mut block_index = 0usize;

    for line in data.lines() {
        let line = line.trim();
        let Some(tag) = line.strip_prefix('<') else {
            continue;
        };
        let (tag_name, value) = match tag.split_once('>') {
            Some((name, val)) => (name.trim(), Some(val.trim())),
            None => (tag.trim_end_matches(['>', '\r']), None),
        };

        match tag_name.to_uppercase().as_str() {
            "STMTTRN" => {
                in_stmttrn = true;
                current = Some(BuildingTrx::default());
            }
            "/STMTTRN" => {
                if let Some(trx) = current.take() {
                    finish_block(trx, block_index, &mut out);
                }
                in_stmttrn = false;
                block_index += 1;
            }
            other if in_stmttrn => {
                if let (Some(trx), Some(v)) = (current.as_mut(), value) {
                    if v.is_empty() {
                        continue;
                    }
                    match other {
                        "TRNTYPE" => trx.trn_type = Some(v.to_string()),
                        "DTPOSTED" => trx.date = parse_ofx_date(v),
                        "TRNAMT" => trx.amount = v.parse().ok(),
                        "FITID" => trx.fitid = Some(v.to_string()),
                        "MEMO" => trx.memo = Some(v.to_string()),
                        "NAME" => trx.name = Some(v.to_string()),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    out
}

fn finish_block(trx: BuildingTrx, index: usize, out: &mut ParsedRows<StatementEntry>) {
    let Some(date) = trx.date else {
        out.reject(index, "missing or invalid DTPOSTED");
        return;
    };
    let Some(amount) = trx.amount else {
        out.reject(index, "missing or invalid TRNAMT");
        return;
    };

    let description = trx
        .memo
        .or(trx.name)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let raw_type = trx.trn_type.unwrap_or_default().to_uppercase();
    let kind = if raw_type == "CREDIT" || raw_type == "DEP" || (!amount.is_negative() && !amount.is_zero()) {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };

    // Card-payment receipt mirrored into the statement; importing it
    // would double-count the invoice payment.
    if kind == TransactionType::Income
        && description.to_lowercase().contains("pagamento recebido")
    {
        return;
    }

    let mut entry = StatementEntry::new(date, amount.abs(), kind, description, EntrySource::Ofx);
    entry.fitid = trx.fitid.filter(|f| !f.is_empty());
    out.rows.push(entry);
}

fn parse_ofx_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() < 8 {
        return None;
    }
    let y: i32 = s.get(0..4)?.parse().ok()?;
    let m: u32 = s.get(4..6)?.parse().ok()?;
    let d: u32 = s.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}
