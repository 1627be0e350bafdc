use chrono::{Datelike, NaiveDate};
use financas_core::{Budget, Category, InvoiceMonth, Money, Transaction, TransactionType};

/// Planned amount for one category in one month, 0 when no budget row
/// exists. Budget rows store 0-based months.
pub fn planned(budgets: &[Budget], category_id: &str, target: InvoiceMonth) -> Money {
    budgets
        .iter()
        .find(|b| {
            b.category_id == category_id && b.year == target.year && b.month + 1 == target.month
        })
        .map(|b| b.amount)
        .unwrap_or_else(Money::zero)
}

/// Realized spend for one category name in one month. The effective
/// month is the invoiceMonth when present, so card purchases land in
/// their invoice period rather than on the purchase date. Split rows
/// contribute only the matching split entries, never the full amount.
pub fn realized(history: &[Transaction], category_name: &str, target: InvoiceMonth) -> Money {
    history
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
        .filter(|t| t.ignore_in_budget != Some(true))
        .filter(|t| effective_month(t) == target)
        .map(|t| match &t.split {
            Some(entries) => entries
                .iter()
                .filter(|e| strip_amount_decoration(&e.category_name) == category_name)
                .map(|e| e.amount)
                .sum(),
            None if t.category == category_name => t.amount,
            None => Money::zero(),
        })
        .sum()
}

fn effective_month(t: &Transaction) -> InvoiceMonth {
    t.invoice_month.unwrap_or_else(|| InvoiceMonth::from_date(t.date))
}

/// Split category names sometimes arrive decorated as
/// "Alimentação: 100.00"; only the name part is the matching key.
fn strip_amount_decoration(name: &str) -> &str {
    if let Some((head, tail)) = name.rsplit_once(':') {
        if tail.trim().parse::<Money>().is_ok() {
            return head.trim();
        }
    }
    name.trim()
}

/// Unspent remainder of one category's budget, floored at zero. This is
/// what reallocation offers as the movable amount; the engine itself
/// does not enforce that deltas stay within it.
pub fn unspent(
    budgets: &[Budget],
    history: &[Transaction],
    category: &Category,
    target: InvoiceMonth,
) -> Money {
    let rest = planned(budgets, &category.id, target) - realized(history, &category.name, target);
    if rest.is_negative() {
        Money::zero()
    } else {
        rest
    }
}

/// Applies a list of `(categoryId, delta)` adjustments as budget
/// upserts: each target row becomes `currentPlanned + delta`.
pub fn reallocate(
    budgets: &[Budget],
    targets: &[(String, Money)],
    target: InvoiceMonth,
) -> Vec<Budget> {
    targets
        .iter()
        .map(|(category_id, delta)| {
            let current = planned(budgets, category_id, target);
            Budget::upsert(category_id, target.month - 1, target.year, current + *delta)
        })
        .collect()
}

/// Average monthly spend for one category over the elapsed months of
/// `today`'s year. Seed value for the bulk budget generator.
pub fn suggest_from_history(history: &[Transaction], category_name: &str, today: NaiveDate) -> Money {
    let months_elapsed = today.month().max(1);
    let total: Money = (1..=months_elapsed)
        .filter_map(|month| InvoiceMonth::new(month, today.year()))
        .map(|m| realized(history, category_name, m))
        .sum();
    Money::from_cents(total.round2().to_cents() / months_elapsed as i64)
}

/// One budget row per month of `year`, all at the same amount.
pub fn generate_year(category_id: &str, year: i32, amount: Money) -> Vec<Budget> {
    (0..12)
        .map(|month| Budget::upsert(category_id, month, year, amount))
        .collect()
}

/// Total planned vs. total realized for one month, across EXPENSE
/// categories that impact the budget.
pub fn monthly_totals(
    budgets: &[Budget],
    history: &[Transaction],
    categories: &[Category],
    target: InvoiceMonth,
) -> (Money, Money) {
    let mut total_planned = Money::zero();
    let mut total_realized = Money::zero();
    for category in categories {
        if category.kind != TransactionType::Expense || !category.impacts_budget {
            continue;
        }
        total_planned = total_planned + planned(budgets, &category.id, target);
        total_realized = total_realized + realized(history, &category.name, target);
    }
    (total_planned, total_realized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use financas_core::{new_id, CategorySubtype, SplitEntry};

    fn m(s: &str) -> InvoiceMonth {
        s.parse().unwrap()
    }

    fn expense(category: &str, cents: i64, date: NaiveDate) -> Transaction {
        Transaction {
            id: new_id(),
            description: format!("gasto {category}"),
            amount: Money::from_cents(cents),
            date,
            category: category.to_string(),
            kind: TransactionType::Expense,
            is_applied: true,
            ignore_in_budget: None,
            observations: None,
            account_id: None,
            fitid: None,
            split: None,
            invoice_month: None,
            batch_id: None,
            installment_number: None,
            total_installments: None,
        }
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    #[test]
    fn planned_matches_zero_based_month() {
        let budgets = vec![Budget::upsert("cat-1", 2, 2025, Money::from_cents(50000))];
        assert_eq!(
            planned(&budgets, "cat-1", m("03/2025")),
            Money::from_cents(50000)
        );
        assert_eq!(planned(&budgets, "cat-1", m("04/2025")), Money::zero());
        assert_eq!(planned(&budgets, "cat-2", m("03/2025")), Money::zero());
    }

    #[test]
    fn realized_honors_invoice_month_over_date() {
        // purchased in February, billed on the March invoice
        let mut t = expense("Alimentação", 10000, date(2025, 2, 25));
        t.invoice_month = Some(m("03/2025"));
        let history = vec![t, expense("Alimentação", 5000, date(2025, 3, 5))];

        assert_eq!(
            realized(&history, "Alimentação", m("03/2025")),
            Money::from_cents(15000)
        );
        assert_eq!(realized(&history, "Alimentação", m("02/2025")), Money::zero());
    }

    #[test]
    fn realized_counts_only_matching_split_entries() {
        let mut t = expense("Múltiplas Categorias", 20000, date(2025, 3, 10));
        t.split = Some(vec![
            SplitEntry {
                category_name: "Alimentação".to_string(),
                amount: Money::from_cents(12000),
            },
            SplitEntry {
                category_name: "Lazer: 80.00".to_string(),
                amount: Money::from_cents(8000),
            },
        ]);
        let history = vec![t];

        assert_eq!(
            realized(&history, "Alimentação", m("03/2025")),
            Money::from_cents(12000)
        );
        // decorated name still matches after the amount suffix is stripped
        assert_eq!(
            realized(&history, "Lazer", m("03/2025")),
            Money::from_cents(8000)
        );
        // the container category never contributes the full amount
        assert_eq!(
            realized(&history, "Múltiplas Categorias", m("03/2025")),
            Money::zero()
        );
    }

    #[test]
    fn ignored_and_income_rows_do_not_count() {
        let mut ignored = expense("Alimentação", 9999, date(2025, 3, 1));
        ignored.ignore_in_budget = Some(true);
        let mut income = expense("Alimentação", 5000, date(2025, 3, 2));
        income.kind = TransactionType::Income;
        let history = vec![ignored, income];
        assert_eq!(realized(&history, "Alimentação", m("03/2025")), Money::zero());
    }

    #[test]
    fn reallocate_upserts_current_plus_delta() {
        let budgets = vec![Budget::upsert("cat-food", 2, 2025, Money::from_cents(30000))];
        let targets = vec![
            ("cat-food".to_string(), Money::from_cents(-10000)),
            ("cat-fun".to_string(), Money::from_cents(10000)),
        ];
        let rows = reallocate(&budgets, &targets, m("03/2025"));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "cat-food-2-2025");
        assert_eq!(rows[0].amount, Money::from_cents(20000));
        // no existing row means current = 0
        assert_eq!(rows[1].amount, Money::from_cents(10000));
        assert_eq!(rows[1].month, 2);
        assert_eq!(rows[1].year, 2025);
    }

    #[test]
    fn unspent_floors_at_zero() {
        let category = Category {
            id: "cat-1".to_string(),
            name: "Alimentação".to_string(),
            kind: TransactionType::Expense,
            subtype: CategorySubtype::Variable,
            impacts_budget: true,
            icon: None,
        };
        let budgets = vec![Budget::upsert("cat-1", 2, 2025, Money::from_cents(10000))];
        let history = vec![expense("Alimentação", 25000, date(2025, 3, 5))];
        assert_eq!(unspent(&budgets, &history, &category, m("03/2025")), Money::zero());

        let light = vec![expense("Alimentação", 4000, date(2025, 3, 5))];
        assert_eq!(
            unspent(&budgets, &light, &category, m("03/2025")),
            Money::from_cents(6000)
        );
    }

    #[test]
    fn suggestion_averages_over_elapsed_months() {
        let history = vec![
            expense("Transporte", 30000, date(2025, 1, 10)),
            expense("Transporte", 15000, date(2025, 2, 10)),
            expense("Transporte", 15000, date(2025, 3, 10)),
        ];
        let today = date(2025, 3, 20);
        assert_eq!(
            suggest_from_history(&history, "Transporte", today),
            Money::from_cents(20000)
        );
    }

    #[test]
    fn generate_year_emits_twelve_upserts() {
        let rows = generate_year("cat-1", 2025, Money::from_cents(40000));
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].id, "cat-1-0-2025");
        assert_eq!(rows[11].id, "cat-1-11-2025");
        assert!(rows.iter().all(|b| b.amount == Money::from_cents(40000)));
    }

    #[test]
    fn monthly_totals_skip_non_budget_categories() {
        let categories = vec![
            Category {
                id: "cat-1".to_string(),
                name: "Alimentação".to_string(),
                kind: TransactionType::Expense,
                subtype: CategorySubtype::Variable,
                impacts_budget: true,
                icon: None,
            },
            Category {
                id: "cat-2".to_string(),
                name: "Investimentos".to_string(),
                kind: TransactionType::Expense,
                subtype: CategorySubtype::Fixed,
                impacts_budget: false,
                icon: None,
            },
        ];
        let budgets = vec![
            Budget::upsert("cat-1", 2, 2025, Money::from_cents(50000)),
            Budget::upsert("cat-2", 2, 2025, Money::from_cents(99900)),
        ];
        let history = vec![
            expense("Alimentação", 20000, date(2025, 3, 4)),
            expense("Investimentos", 99900, date(2025, 3, 4)),
        ];
        let (p, r) = monthly_totals(&budgets, &history, &categories, m("03/2025"));
        assert_eq!(p, Money::from_cents(50000));
        assert_eq!(r, Money::from_cents(20000));
    }
}
