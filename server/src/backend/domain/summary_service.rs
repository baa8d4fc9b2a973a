//! Dashboard, budget progress and ledger statistics.
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use shared::{
    currency_symbol, Account, BudgetCategoryStatus, BudgetOverview, Category, CategoryType,
    DailyFlow, DashboardSummary, DbStats, EntityCounts, StorageInfo, Transaction, TransactionType,
    DEFAULT_CURRENCY,
};
use std::sync::Arc;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::storage::{
    AccountStorage, CategoryStorage, RecurringPaymentStorage, Storage, TransactionStorage,
};

/// Limit assumed for expense categories without one
pub const DEFAULT_BUDGET_LIMIT: f64 = 500.0;
const NEAR_LIMIT_PERCENT: f64 = 85.0;
const RECENT_TRANSACTIONS: usize = 5;
const FLOW_DAYS: i64 = 7;

fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

fn sum_of(transactions: &[Transaction], kind: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == kind)
        .map(|t| t.amount)
        .sum()
}

fn total_balance(accounts: &[Account]) -> f64 {
    accounts.iter().map(|a| a.balance).sum()
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Dashboard figures for the month containing `today`.
///
/// `transactions` must be ordered newest first, as storage returns them.
pub fn build_dashboard(
    accounts: &[Account],
    transactions: &[Transaction],
    today: NaiveDate,
) -> DashboardSummary {
    let primary_currency = accounts
        .first()
        .map(|a| a.currency.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let this_month: Vec<Transaction> = transactions
        .iter()
        .filter(|t| in_month(t.date, today.year(), today.month()))
        .cloned()
        .collect();
    let monthly_income = sum_of(&this_month, TransactionType::Income);
    let monthly_expenses = sum_of(&this_month, TransactionType::Expense);
    let savings_rate = percentage(monthly_income - monthly_expenses, monthly_income);

    let daily_flow = (0..FLOW_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let on_day: Vec<Transaction> = transactions
                .iter()
                .filter(|t| t.date == date)
                .cloned()
                .collect();
            DailyFlow {
                date,
                income: sum_of(&on_day, TransactionType::Income),
                expenses: sum_of(&on_day, TransactionType::Expense),
            }
        })
        .collect();

    DashboardSummary {
        total_balance: total_balance(accounts),
        currency_symbol: currency_symbol(&primary_currency),
        primary_currency,
        monthly_income,
        monthly_expenses,
        savings_rate,
        daily_flow,
        recent_transactions: transactions.iter().take(RECENT_TRANSACTIONS).cloned().collect(),
    }
}

/// Progress of every expense category against its monthly limit
pub fn build_budget(
    categories: &[Category],
    transactions: &[Transaction],
    year: i32,
    month: u32,
) -> BudgetOverview {
    let month_expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense && in_month(t.date, year, month))
        .collect();

    let statuses: Vec<BudgetCategoryStatus> = categories
        .iter()
        .filter(|c| c.category_type == CategoryType::Expense)
        .map(|category| {
            // A zero or negative limit counts as unset
            let limit = category
                .budget_limit
                .filter(|limit| *limit > 0.0)
                .unwrap_or(DEFAULT_BUDGET_LIMIT);
            let spent: f64 = month_expenses
                .iter()
                .filter(|t| t.category_id.as_deref() == Some(category.id.as_str()))
                .map(|t| t.amount)
                .sum();
            let percent = percentage(spent, limit);
            BudgetCategoryStatus {
                category_id: category.id.clone(),
                name: category.name.clone(),
                color: category.color.clone(),
                limit,
                spent,
                percentage: percent,
                over_budget: percent > 100.0,
                near_limit: percent > NEAR_LIMIT_PERCENT && percent <= 100.0,
                remaining: limit - spent,
            }
        })
        .collect();

    let total_limit: f64 = statuses.iter().map(|s| s.limit).sum();
    let total_spent: f64 = statuses.iter().map(|s| s.spent).sum();

    BudgetOverview {
        year,
        month,
        total_percentage: percentage(total_spent, total_limit),
        categories: statuses,
        total_limit,
        total_spent,
    }
}

#[derive(Clone)]
pub struct SummaryService {
    storage: Arc<dyn Storage>,
}

impl SummaryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn dashboard(&self, family_id: &str, today: NaiveDate) -> DomainResult<DashboardSummary> {
        info!("📊 Building dashboard for family {}", family_id);
        let accounts = self.storage.list_accounts_by_family(family_id).await?;
        let transactions = self.storage.list_transactions_by_family(family_id).await?;
        Ok(build_dashboard(&accounts, &transactions, today))
    }

    pub async fn budget(&self, family_id: &str, year: i32, month: u32) -> DomainResult<BudgetOverview> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!("Invalid month: {}", month)));
        }
        info!("Building budget overview {}-{:02} for family {}", year, month, family_id);
        let categories = self.storage.list_categories_by_family(family_id).await?;
        let transactions = self.storage.list_transactions_by_family(family_id).await?;
        Ok(build_budget(&categories, &transactions, year, month))
    }

    pub async fn db_stats(&self, family_id: &str) -> DomainResult<DbStats> {
        let kind = self.storage.kind();
        let categories = self.storage.list_categories_by_family(family_id).await?;
        let accounts = self.storage.list_accounts_by_family(family_id).await?;
        let transactions = self.storage.list_transactions_by_family(family_id).await?;
        let payments = self.storage.list_recurring_payments_by_family(family_id).await?;

        Ok(DbStats {
            storage: StorageInfo {
                kind: kind.to_string(),
                is_database: kind.is_database(),
            },
            counts: EntityCounts {
                categories: categories.len(),
                accounts: accounts.len(),
                transactions: transactions.len(),
                recurring_payments: payments.len(),
            },
            total_balance: total_balance(&accounts),
            total_income: sum_of(&transactions, TransactionType::Income),
            total_expenses: sum_of(&transactions, TransactionType::Expense),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::AccountType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(balance: f64, currency: &str) -> Account {
        let now = Utc::now();
        Account {
            id: format!("acc-{}", balance),
            name: "Счет".to_string(),
            account_type: AccountType::Checking,
            balance,
            currency: currency.to_string(),
            family_id: "fam-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn tx(on: NaiveDate, kind: TransactionType, amount: f64, category: Option<&str>) -> Transaction {
        Transaction {
            id: format!("tx-{}-{}", on, amount),
            amount,
            date: on,
            description: "test".to_string(),
            transaction_type: kind,
            category_id: category.map(str::to_string),
            account_id: "acc-1".to_string(),
            created_by_id: "user-1".to_string(),
            family_id: "fam-1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn category(id: &str, kind: CategoryType, limit: Option<f64>) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_string(),
            category_type: kind,
            color: "#000000".to_string(),
            icon: "tag".to_string(),
            budget_limit: limit,
            family_id: "fam-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_dashboard_figures() {
        let today = date(2025, 6, 14);
        let accounts = vec![account(1000.0, "USD"), account(500.0, "RUB")];
        let transactions = vec![
            tx(date(2025, 6, 14), TransactionType::Expense, 200.0, None),
            tx(date(2025, 6, 10), TransactionType::Income, 1000.0, None),
            tx(date(2025, 6, 8), TransactionType::Transfer, 300.0, None),
            tx(date(2025, 5, 31), TransactionType::Expense, 999.0, None),
        ];

        let summary = build_dashboard(&accounts, &transactions, today);
        assert_eq!(summary.total_balance, 1500.0);
        assert_eq!(summary.primary_currency, "USD");
        assert_eq!(summary.currency_symbol, "$");
        assert_eq!(summary.monthly_income, 1000.0);
        assert_eq!(summary.monthly_expenses, 200.0);
        assert!((summary.savings_rate - 80.0).abs() < 1e-9);
        assert_eq!(summary.recent_transactions.len(), 4);

        assert_eq!(summary.daily_flow.len(), 7);
        assert_eq!(summary.daily_flow[0].date, date(2025, 6, 8));
        assert_eq!(summary.daily_flow[6].date, today);
        assert_eq!(summary.daily_flow[6].expenses, 200.0);
        assert_eq!(summary.daily_flow[2].income, 1000.0);
    }

    #[test]
    fn test_dashboard_without_data() {
        let summary = build_dashboard(&[], &[], date(2025, 1, 1));
        assert_eq!(summary.primary_currency, "RUB");
        assert_eq!(summary.currency_symbol, "₽");
        assert_eq!(summary.savings_rate, 0.0);
        assert!(summary.recent_transactions.is_empty());
    }

    #[test]
    fn test_budget_statuses() {
        let categories = vec![
            category("food", CategoryType::Expense, Some(100.0)),
            category("fun", CategoryType::Expense, Some(100.0)),
            category("misc", CategoryType::Expense, None),
            category("salary", CategoryType::Income, None),
        ];
        let transactions = vec![
            tx(date(2025, 6, 1), TransactionType::Expense, 120.0, Some("food")),
            tx(date(2025, 6, 2), TransactionType::Expense, 90.0, Some("fun")),
            tx(date(2025, 5, 2), TransactionType::Expense, 90.0, Some("fun")),
            tx(date(2025, 6, 3), TransactionType::Income, 5000.0, Some("salary")),
        ];

        let overview = build_budget(&categories, &transactions, 2025, 6);
        assert_eq!(overview.categories.len(), 3);

        let food = &overview.categories[0];
        assert!(food.over_budget);
        assert!(!food.near_limit);
        assert_eq!(food.remaining, -20.0);

        let fun = &overview.categories[1];
        assert!(fun.near_limit);
        assert!(!fun.over_budget);
        assert_eq!(fun.spent, 90.0);

        let misc = &overview.categories[2];
        assert_eq!(misc.limit, DEFAULT_BUDGET_LIMIT);
        assert_eq!(misc.percentage, 0.0);

        assert_eq!(overview.total_limit, 700.0);
        assert_eq!(overview.total_spent, 210.0);
        assert!((overview.total_percentage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_exactly_at_limit_is_near_not_over() {
        let categories = vec![category("food", CategoryType::Expense, Some(100.0))];
        let transactions = vec![tx(date(2025, 6, 1), TransactionType::Expense, 100.0, Some("food"))];
        let status = &build_budget(&categories, &transactions, 2025, 6).categories[0];
        assert!(status.near_limit);
        assert!(!status.over_budget);
    }

    #[test]
    fn test_zero_limit_uses_default() {
        let categories = vec![category("food", CategoryType::Expense, Some(0.0))];
        let transactions = vec![tx(date(2025, 6, 1), TransactionType::Expense, 50.0, Some("food"))];
        let overview = build_budget(&categories, &transactions, 2025, 6);

        let food = &overview.categories[0];
        assert_eq!(food.limit, DEFAULT_BUDGET_LIMIT);
        assert!((food.percentage - 10.0).abs() < 1e-9);
        assert!(!food.over_budget);
        assert_eq!(food.remaining, 450.0);
        assert_eq!(overview.total_limit, DEFAULT_BUDGET_LIMIT);
    }

    #[tokio::test]
    async fn test_db_stats_against_memory_storage() {
        use crate::backend::domain::test_utils::{seed_account, seed_family, test_storage};

        let storage = test_storage();
        let family = seed_family(&storage).await;
        seed_account(&storage, &family.id, 250.0).await;

        let stats = SummaryService::new(storage).db_stats(&family.id).await.unwrap();
        assert_eq!(stats.storage.kind, "In-memory");
        assert!(!stats.storage.is_database);
        assert_eq!(stats.counts.accounts, 1);
        assert_eq!(stats.total_balance, 250.0);
    }
}
