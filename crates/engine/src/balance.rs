use chrono::NaiveDate;
use financas_core::{Account, AccountKind, InvoiceMonth, Money, Transaction, TransactionType};

/// Which cash accounts the projection covers.
#[derive(Debug, Clone)]
pub enum BalanceScope<'a> {
    /// One BANK or INVESTMENT account.
    Account(&'a Account),
    /// Every BANK account aggregated.
    AllBanks,
}

/// One day of the calendar view.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBalance {
    pub date: NaiveDate,
    pub start: Money,
    pub income: Money,
    pub expense: Money,
    pub end: Money,
}

/// Daily running balances for one calendar month. Opening balance is the
/// scoped accounts' initialBalance plus every matching transaction
/// strictly before the month; then a single left-to-right scan, each
/// day's end feeding the next day's start.
///
/// Credit-card activity never appears here; its cash effect only lands
/// through the accountless invoice payment rows, which the aggregate
/// view includes. The per-account view sticks to rows tagged with that
/// account.
pub fn project(
    scope: BalanceScope<'_>,
    accounts: &[Account],
    history: &[Transaction],
    period: InvoiceMonth,
) -> Vec<DayBalance> {
    let in_scope = |t: &Transaction| {
        if t.invoice_month.is_some() {
            return false;
        }
        match (&scope, t.account_id.as_deref()) {
            (BalanceScope::Account(a), Some(id)) => !a.is_credit_card() && a.id == id,
            (BalanceScope::Account(_), None) => false,
            (BalanceScope::AllBanks, Some(id)) => {
                !accounts.iter().any(|a| a.id == id && a.is_credit_card())
            }
            (BalanceScope::AllBanks, None) => true,
        }
    };

    let first = period.first_day();
    let initial: Money = match &scope {
        BalanceScope::Account(a) if !a.is_credit_card() => a.initial_balance,
        BalanceScope::Account(_) => Money::zero(),
        BalanceScope::AllBanks => accounts
            .iter()
            .filter(|a| a.kind == AccountKind::Bank)
            .map(|a| a.initial_balance)
            .sum(),
    };
    let mut balance: Money = initial
        + history
            .iter()
            .filter(|t| in_scope(t) && t.date < first)
            .map(|t| t.signed_amount())
            .sum::<Money>();

    let last = period.at_day(31);
    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day <= last {
        let mut income = Money::zero();
        let mut expense = Money::zero();
        for t in history.iter().filter(|t| in_scope(t) && t.date == day) {
            match t.kind {
                TransactionType::Income => income = income + t.amount,
                TransactionType::Expense => expense = expense + t.amount,
            }
        }
        let end = balance + income - expense;
        days.push(DayBalance {
            date: day,
            start: balance,
            income,
            expense,
            end,
        });
        balance = end;
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use financas_core::new_id;

    fn m(s: &str) -> InvoiceMonth {
        s.parse().unwrap()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    fn bank(id: &str, cents: i64) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            kind: AccountKind::Bank,
            initial_balance: Money::from_cents(cents),
            closing_day: None,
            due_day: None,
        }
    }

    fn row(account: &str, kind: TransactionType, cents: i64, on: NaiveDate) -> Transaction {
        Transaction {
            id: new_id(),
            description: "mov".to_string(),
            amount: Money::from_cents(cents),
            date: on,
            category: "Outros".to_string(),
            kind,
            is_applied: true,
            ignore_in_budget: None,
            observations: None,
            account_id: Some(account.to_string()),
            fitid: None,
            split: None,
            invoice_month: None,
            batch_id: None,
            installment_number: None,
            total_installments: None,
        }
    }

    #[test]
    fn running_balance_chains_day_to_day() {
        let account = bank("b1", 100000);
        let history = vec![
            // before the month, folds into the opening balance
            row("b1", TransactionType::Expense, 20000, date(2025, 2, 20)),
            row("b1", TransactionType::Income, 50000, date(2025, 3, 5)),
            row("b1", TransactionType::Expense, 10000, date(2025, 3, 5)),
            row("b1", TransactionType::Expense, 5000, date(2025, 3, 20)),
        ];
        let days = project(
            BalanceScope::Account(&account),
            &[],
            &history,
            m("03/2025"),
        );

        assert_eq!(days.len(), 31);
        assert_eq!(days[0].start, Money::from_cents(80000));

        let day5 = &days[4];
        assert_eq!(day5.income, Money::from_cents(50000));
        assert_eq!(day5.expense, Money::from_cents(10000));
        assert_eq!(day5.end, Money::from_cents(120000));
        // next day starts where this one ended
        assert_eq!(days[5].start, day5.end);

        assert_eq!(days[30].end, Money::from_cents(115000));
    }

    #[test]
    fn card_rows_never_enter_the_projection() {
        let account = bank("b1", 0);
        let mut card_purchase = row("b1", TransactionType::Expense, 30000, date(2025, 3, 4));
        card_purchase.invoice_month = Some(m("03/2025"));
        let days = project(
            BalanceScope::Account(&account),
            &[],
            &[card_purchase],
            m("03/2025"),
        );
        assert!(days.iter().all(|d| d.expense.is_zero()));
    }

    fn card(id: &str) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            kind: AccountKind::CreditCard,
            initial_balance: Money::zero(),
            closing_day: Some(3),
            due_day: Some(10),
        }
    }

    #[test]
    fn all_banks_aggregates_initial_balances() {
        let accounts = vec![bank("b1", 10000), bank("b2", 5000), card("c1")];
        let history = vec![
            row("b1", TransactionType::Expense, 1000, date(2025, 3, 1)),
            row("b2", TransactionType::Expense, 2000, date(2025, 3, 1)),
            // card-account row, out of the cash-flow view
            row("c1", TransactionType::Expense, 99999, date(2025, 3, 1)),
        ];
        let days = project(BalanceScope::AllBanks, &accounts, &history, m("03/2025"));
        assert_eq!(days[0].start, Money::from_cents(15000));
        assert_eq!(days[0].end, Money::from_cents(12000));
    }

    #[test]
    fn invoice_payment_lands_in_the_aggregate_cash_flow() {
        // invoice payments carry no accountId
        let mut payment = row("x", TransactionType::Expense, 123456, date(2025, 3, 10));
        payment.account_id = None;
        payment.description = "Fatura Nubank - 03/2025".to_string();
        let accounts = vec![bank("b1", 500000)];

        let days = project(BalanceScope::AllBanks, &accounts, &[payment.clone()], m("03/2025"));
        assert_eq!(days[9].expense, Money::from_cents(123456));
        assert_eq!(days[9].end, Money::from_cents(376544));

        // the single-account view only shows rows tagged with that account
        let account = bank("b1", 500000);
        let days = project(
            BalanceScope::Account(&account),
            &accounts,
            &[payment],
            m("03/2025"),
        );
        assert!(days[9].expense.is_zero());
    }

    #[test]
    fn credit_card_scope_yields_empty_selection() {
        let card = Account {
            id: "c1".to_string(),
            name: "Visa".to_string(),
            kind: AccountKind::CreditCard,
            initial_balance: Money::zero(),
            closing_day: Some(3),
            due_day: Some(10),
        };
        let history = vec![row("c1", TransactionType::Expense, 5000, date(2025, 3, 2))];
        let days = project(BalanceScope::Account(&card), &[], &history, m("03/2025"));
        assert!(days[0].start.is_zero());
        assert!(days.iter().all(|d| d.expense.is_zero()));
    }

    #[test]
    fn month_length_matches_the_calendar() {
        let account = bank("b1", 0);
        let feb = project(BalanceScope::Account(&account), &[], &[], m("02/2025"));
        assert_eq!(feb.len(), 28);
        let apr = project(BalanceScope::Account(&account), &[], &[], m("04/2025"));
        assert_eq!(apr.len(), 30);
    }
}
