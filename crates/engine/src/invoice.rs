use chrono::NaiveDate;
use financas_core::{
    new_id, Account, Category, CategorySubtype, InvoiceMonth, LedgerError, Money, Transaction,
    TransactionType,
};

/// Category of invoice payment transactions, auto-created on first use.
pub const PAYMENT_CATEGORY: &str = "Pagamento Fatura";

/// The description-string convention that keys an invoice bucket. Its
/// existence in the ledger is the sole signal the bucket is closed.
pub fn invoice_name(card_name: &str, month: InvoiceMonth) -> String {
    format!("Fatura {card_name} - {month}")
}

pub fn is_closed(card: &Account, month: InvoiceMonth, history: &[Transaction]) -> bool {
    let name = invoice_name(&card.name, month);
    history.iter().any(|t| t.description == name)
}

/// Signed total of one bucket: expenses add, income subtracts. Card
/// refunds are stored as negative-amount expenses, so they subtract
/// naturally.
pub fn invoice_total(card_id: &str, month: InvoiceMonth, history: &[Transaction]) -> Money {
    history
        .iter()
        .filter(|t| {
            t.account_id.as_deref() == Some(card_id) && t.invoice_month == Some(month)
        })
        .map(|t| match t.kind {
            TransactionType::Expense => t.amount,
            TransactionType::Income => -t.amount,
        })
        .sum()
}

/// All buckets worth offering for one card: every invoiceMonth present
/// in history, extended to at least a year around today so near-future
/// buckets and old unclosed ones are both reachable. Ascending.
pub fn list_buckets(card_id: &str, history: &[Transaction], today: NaiveDate) -> Vec<InvoiceMonth> {
    let mut lo = InvoiceMonth::from_date(today).minus(12);
    let mut hi = InvoiceMonth::from_date(today).plus(12);

    for t in history {
        if t.account_id.as_deref() != Some(card_id) {
            continue;
        }
        if let Some(m) = t.invoice_month {
            lo = lo.min(m);
            hi = hi.max(m);
        }
    }

    let mut buckets = Vec::new();
    let mut m = lo;
    while m <= hi {
        buckets.push(m);
        m = m.plus(1);
    }
    buckets
}

/// Result of closing a bucket: the payment transaction to persist, and
/// the payment category to create first when the ledger lacks it.
#[derive(Debug, Clone)]
pub struct ClosedInvoice {
    pub payment: Transaction,
    pub new_category: Option<Category>,
}

/// Closes one bucket by materializing its payment transaction. Nothing
/// is written here; the caller persists `new_category` (if any) and then
/// `payment`, in that order.
pub fn close(
    card: &Account,
    month: InvoiceMonth,
    history: &[Transaction],
    categories: &[Category],
) -> Result<ClosedInvoice, LedgerError> {
    if !card.is_credit_card() {
        return Err(LedgerError::NotACreditCard(card.name.clone()));
    }
    let Some(due_day) = card.due_day else {
        return Err(LedgerError::MissingDueDay(card.name.clone()));
    };

    let name = invoice_name(&card.name, month);
    if history.iter().any(|t| t.description == name) {
        return Err(LedgerError::InvoiceClosed(name));
    }

    let total = invoice_total(&card.id, month, history).round2();

    let new_category = if categories.iter().any(|c| c.name == PAYMENT_CATEGORY) {
        None
    } else {
        Some(Category {
            id: new_id(),
            name: PAYMENT_CATEGORY.to_string(),
            kind: TransactionType::Expense,
            subtype: CategorySubtype::Fixed,
            impacts_budget: true,
            icon: None,
        })
    };

    let payment = Transaction {
        id: new_id(),
        description: name,
        amount: total,
        date: month.at_day(due_day),
        category: PAYMENT_CATEGORY.to_string(),
        kind: TransactionType::Expense,
        is_applied: false,
        ignore_in_budget: None,
        observations: None,
        account_id: None,
        fitid: None,
        split: None,
        invoice_month: None,
        batch_id: None,
        installment_number: None,
        total_installments: None,
    };

    Ok(ClosedInvoice {
        payment,
        new_category,
    })
}

/// Finds the payment transaction to delete when reopening a bucket.
/// Exact description match first; failing that, a fuzzy fallback over
/// "Pagamento Fatura" rows requiring both the card-name token and the
/// month token to appear. No side effects here; the caller deletes the
/// returned id.
pub fn reopen(
    card: &Account,
    month: InvoiceMonth,
    history: &[Transaction],
) -> Result<String, LedgerError> {
    let name = invoice_name(&card.name, month);

    if let Some(exact) = history.iter().find(|t| t.description == name) {
        return Ok(exact.id.clone());
    }

    let card_token = card
        .name
        .to_lowercase()
        .replace("fatura", " ")
        .trim()
        .to_string();
    let month_token = month.to_string();

    let fuzzy = history.iter().find(|t| {
        let desc = t.description.to_lowercase();
        t.category == PAYMENT_CATEGORY && desc.contains(&card_token) && desc.contains(&month_token)
    });

    match fuzzy {
        Some(t) => Ok(t.id.clone()),
        None => Err(LedgerError::PaymentNotFound(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financas_core::AccountKind;

    fn nubank() -> Account {
        Account {
            id: "card-nu".to_string(),
            name: "Nubank".to_string(),
            kind: AccountKind::CreditCard,
            initial_balance: Money::zero(),
            closing_day: Some(3),
            due_day: Some(10),
        }
    }

    fn m(s: &str) -> InvoiceMonth {
        s.parse().unwrap()
    }

    fn card_row(cents: i64, kind: TransactionType, month: InvoiceMonth) -> Transaction {
        Transaction {
            id: new_id(),
            description: "compra".to_string(),
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            category: "Outros".to_string(),
            kind,
            is_applied: true,
            ignore_in_budget: None,
            observations: None,
            account_id: Some("card-nu".to_string()),
            fitid: None,
            split: None,
            invoice_month: Some(month),
            batch_id: None,
            installment_number: None,
            total_installments: None,
        }
    }

    #[test]
    fn close_creates_the_payment_transaction() {
        let month = m("03/2025");
        let history = vec![
            card_row(100000, TransactionType::Expense, month),
            card_row(23456, TransactionType::Expense, month),
            // belongs to another bucket
            card_row(99999, TransactionType::Expense, m("04/2025")),
        ];
        let closed = close(&nubank(), month, &history, &[]).unwrap();

        let p = &closed.payment;
        assert_eq!(p.description, "Fatura Nubank - 03/2025");
        assert_eq!(p.amount, Money::from_cents(123456));
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(p.category, PAYMENT_CATEGORY);
        assert!(!p.is_applied);
        assert!(p.account_id.is_none());

        let cat = closed.new_category.unwrap();
        assert_eq!(cat.name, PAYMENT_CATEGORY);
        assert_eq!(cat.subtype, CategorySubtype::Fixed);
        assert!(cat.impacts_budget);
    }

    #[test]
    fn income_subtracts_from_the_total() {
        let month = m("03/2025");
        let history = vec![
            card_row(10000, TransactionType::Expense, month),
            card_row(3000, TransactionType::Income, month),
        ];
        assert_eq!(
            invoice_total("card-nu", month, &history),
            Money::from_cents(7000)
        );
    }

    #[test]
    fn due_day_is_clamped_to_month_end() {
        let mut card = nubank();
        card.due_day = Some(31);
        let closed = close(&card, m("02/2025"), &[], &[]).unwrap();
        assert_eq!(
            closed.payment.date,
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn existing_payment_category_is_not_recreated() {
        let categories = vec![Category {
            id: "c1".to_string(),
            name: PAYMENT_CATEGORY.to_string(),
            kind: TransactionType::Expense,
            subtype: CategorySubtype::Fixed,
            impacts_budget: true,
            icon: None,
        }];
        let closed = close(&nubank(), m("03/2025"), &[], &categories).unwrap();
        assert!(closed.new_category.is_none());
    }

    #[test]
    fn closing_twice_fails_without_side_effects() {
        let month = m("03/2025");
        let closed = close(&nubank(), month, &[], &[]).unwrap();
        let history = vec![closed.payment];
        assert!(is_closed(&nubank(), month, &history));
        assert!(matches!(
            close(&nubank(), month, &history, &[]),
            Err(LedgerError::InvoiceClosed(_))
        ));
    }

    #[test]
    fn close_rejects_non_card_accounts() {
        let mut bank = nubank();
        bank.kind = AccountKind::Bank;
        assert!(matches!(
            close(&bank, m("03/2025"), &[], &[]),
            Err(LedgerError::NotACreditCard(_))
        ));

        let mut no_due = nubank();
        no_due.due_day = None;
        assert!(matches!(
            close(&no_due, m("03/2025"), &[], &[]),
            Err(LedgerError::MissingDueDay(_))
        ));
    }

    #[test]
    fn reopen_finds_the_exact_payment() {
        let month = m("03/2025");
        let closed = close(&nubank(), month, &[], &[]).unwrap();
        let id = closed.payment.id.clone();
        let history = vec![closed.payment];
        assert_eq!(reopen(&nubank(), month, &history).unwrap(), id);
    }

    #[test]
    fn reopen_falls_back_to_fuzzy_match() {
        // a renamed payment stays findable through its category
        let month = m("03/2025");
        let mut renamed = card_row(123456, TransactionType::Expense, month);
        renamed.description = "Pgto Nubank ref. 03/2025".to_string();
        renamed.category = PAYMENT_CATEGORY.to_string();
        renamed.invoice_month = None;
        let id = renamed.id.clone();
        assert_eq!(reopen(&nubank(), month, &[renamed]).unwrap(), id);
    }

    #[test]
    fn reopen_never_deletes_an_ordinary_purchase() {
        // mentions the card and the month but is not a payment row
        let month = m("03/2025");
        let mut purchase = card_row(5000, TransactionType::Expense, month);
        purchase.description = "compra fatura nubank 03/2025".to_string();
        assert!(matches!(
            reopen(&nubank(), month, &[purchase]),
            Err(LedgerError::PaymentNotFound(_))
        ));
    }

    #[test]
    fn reopen_without_payment_fails_cleanly() {
        let err = reopen(&nubank(), m("03/2025"), &[]).unwrap_err();
        assert!(matches!(err, LedgerError::PaymentNotFound(_)));
    }

    #[test]
    fn buckets_cover_history_and_a_year_around_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let history = vec![card_row(100, TransactionType::Expense, m("01/2022"))];
        let buckets = list_buckets("card-nu", &history, today);
        assert_eq!(buckets.first().copied(), Some(m("01/2022")));
        assert_eq!(buckets.last().copied(), Some(m("06/2026")));
        // contiguous ascending
        assert!(buckets.windows(2).all(|w| w[0].plus(1) == w[1]));
    }
}
