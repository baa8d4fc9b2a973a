//! Default categories of a new family and keyword based categorisation of
//! transactions that arrive without a category.
use shared::{Category, CategoryType, TransactionType};

pub const GROCERIES: &str = "Продукты";
pub const CAFES: &str = "Кафе и рестораны";
pub const HOUSING: &str = "Жилье";
pub const TRANSPORT: &str = "Транспорт";
pub const ENTERTAINMENT: &str = "Развлечения";
pub const UTILITIES: &str = "Коммуналка";
pub const SALARY: &str = "Зарплата";
pub const FREELANCE: &str = "Фриланс";

/// Template for a category seeded into every new family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultCategory {
    pub name: &'static str,
    pub category_type: CategoryType,
    pub color: &'static str,
    pub icon: &'static str,
    pub budget_limit: Option<f64>,
}

pub const DEFAULT_CATEGORIES: [DefaultCategory; 8] = [
    DefaultCategory {
        name: GROCERIES,
        category_type: CategoryType::Expense,
        color: "#ef4444",
        icon: "shopping-cart",
        budget_limit: Some(600.0),
    },
    DefaultCategory {
        name: CAFES,
        category_type: CategoryType::Expense,
        color: "#f97316",
        icon: "utensils",
        budget_limit: Some(300.0),
    },
    DefaultCategory {
        name: HOUSING,
        category_type: CategoryType::Expense,
        color: "#8b5cf6",
        icon: "home",
        budget_limit: Some(1500.0),
    },
    DefaultCategory {
        name: TRANSPORT,
        category_type: CategoryType::Expense,
        color: "#06b6d4",
        icon: "car",
        budget_limit: Some(200.0),
    },
    DefaultCategory {
        name: ENTERTAINMENT,
        category_type: CategoryType::Expense,
        color: "#ec4899",
        icon: "film",
        budget_limit: Some(150.0),
    },
    DefaultCategory {
        name: UTILITIES,
        category_type: CategoryType::Expense,
        color: "#6366f1",
        icon: "zap",
        budget_limit: Some(200.0),
    },
    DefaultCategory {
        name: SALARY,
        category_type: CategoryType::Income,
        color: "#10b981",
        icon: "briefcase",
        budget_limit: None,
    },
    DefaultCategory {
        name: FREELANCE,
        category_type: CategoryType::Income,
        color: "#34d399",
        icon: "laptop",
        budget_limit: None,
    },
];

struct KeywordRule {
    keywords: &'static [&'static str],
    category: &'static str,
    category_type: CategoryType,
}

// Checked in order, first match wins
const RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["кафе", "ресторан", "макдоналд", "бургер", "пицца"],
        category: CAFES,
        category_type: CategoryType::Expense,
    },
    KeywordRule {
        keywords: &["продукт", "магазин", "супермаркет", "пятерочка", "магнит"],
        category: GROCERIES,
        category_type: CategoryType::Expense,
    },
    KeywordRule {
        keywords: &["жкх", "коммунал", "электричество", "вода", "газ"],
        category: UTILITIES,
        category_type: CategoryType::Expense,
    },
    KeywordRule {
        keywords: &["транспорт", "метро", "автобус", "такси", "бензин"],
        category: TRANSPORT,
        category_type: CategoryType::Expense,
    },
    KeywordRule {
        keywords: &["развлечени", "кино", "концерт", "театр"],
        category: ENTERTAINMENT,
        category_type: CategoryType::Expense,
    },
    KeywordRule {
        keywords: &["жилье", "аренда", "ипотека"],
        category: HOUSING,
        category_type: CategoryType::Expense,
    },
    KeywordRule {
        keywords: &["зарплат", "salary"],
        category: SALARY,
        category_type: CategoryType::Income,
    },
    KeywordRule {
        keywords: &["фриланс", "freelance"],
        category: FREELANCE,
        category_type: CategoryType::Income,
    },
];

/// Name and type of the default category a description points at.
///
/// Without a keyword hit, income falls back to salary and expenses to
/// groceries; transfers get no suggestion.
pub fn suggest_category(
    description: &str,
    transaction_type: TransactionType,
) -> Option<(&'static str, CategoryType)> {
    let lowered = description.to_lowercase();
    let matched = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)));

    if let Some(rule) = matched {
        return Some((rule.category, rule.category_type));
    }

    match transaction_type {
        TransactionType::Income => Some((SALARY, CategoryType::Income)),
        TransactionType::Expense => Some((GROCERIES, CategoryType::Expense)),
        TransactionType::Transfer => None,
    }
}

/// Pick a category id from a family's categories for an uncategorised transaction
pub fn categorize(
    categories: &[Category],
    description: &str,
    transaction_type: TransactionType,
) -> Option<String> {
    let (name, category_type) = suggest_category(description, transaction_type)?;
    categories
        .iter()
        .find(|c| c.name == name && c.category_type == category_type)
        .map(|c| c.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn family_categories() -> Vec<Category> {
        DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, d)| Category {
                id: format!("c{}", i + 1),
                name: d.name.to_string(),
                category_type: d.category_type,
                color: d.color.to_string(),
                icon: d.icon.to_string(),
                budget_limit: d.budget_limit,
                family_id: "fam-1".to_string(),
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            suggest_category("Обед в КАФЕ", TransactionType::Expense),
            Some((CAFES, CategoryType::Expense))
        );
        assert_eq!(
            suggest_category("Пятерочка у дома", TransactionType::Expense),
            Some((GROCERIES, CategoryType::Expense))
        );
        assert_eq!(
            suggest_category("Такси до аэропорта", TransactionType::Expense),
            Some((TRANSPORT, CategoryType::Expense))
        );
        assert_eq!(
            suggest_category("Monthly SALARY", TransactionType::Income),
            Some((SALARY, CategoryType::Income))
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "пицца" (cafes) is checked before "магазин" (groceries)
        assert_eq!(
            suggest_category("Пицца из магазина", TransactionType::Expense),
            Some((CAFES, CategoryType::Expense))
        );
    }

    #[test]
    fn test_fallbacks_by_type() {
        assert_eq!(
            suggest_category("Что-то непонятное", TransactionType::Income),
            Some((SALARY, CategoryType::Income))
        );
        assert_eq!(
            suggest_category("Что-то непонятное", TransactionType::Expense),
            Some((GROCERIES, CategoryType::Expense))
        );
        assert_eq!(suggest_category("Перевод на карту", TransactionType::Transfer), None);
    }

    #[test]
    fn test_categorize_uses_family_categories() {
        let categories = family_categories();
        assert_eq!(
            categorize(&categories, "Фриланс проект", TransactionType::Income),
            Some("c8".to_string())
        );
        assert_eq!(
            categorize(&categories, "Аренда квартиры", TransactionType::Expense),
            Some("c3".to_string())
        );
        assert_eq!(categorize(&[], "Аренда квартиры", TransactionType::Expense), None);
    }

    #[test]
    fn test_default_categories_shape() {
        let expenses = DEFAULT_CATEGORIES
            .iter()
            .filter(|c| c.category_type == CategoryType::Expense)
            .count();
        assert_eq!(expenses, 6);
        assert!(DEFAULT_CATEGORIES
            .iter()
            .filter(|c| c.category_type == CategoryType::Income)
            .all(|c| c.budget_limit.is_none()));
    }
}
