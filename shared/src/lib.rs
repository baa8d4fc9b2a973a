use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted label does not name a known variant
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a closed set of labels shared by the JSON API and the database columns.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Role of a user inside their family
    UserRole, "user role" {
        Admin => "admin",
        Member => "member",
    }
);

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Member
    }
}

labelled_enum!(
    InvitationStatus, "invitation status" {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
);

labelled_enum!(
    CategoryType, "category type" {
        Expense => "expense",
        Income => "income",
    }
);

labelled_enum!(
    AccountType, "account type" {
        Checking => "checking",
        Savings => "savings",
        Credit => "credit",
        Cash => "cash",
        Investment => "investment",
    }
);

labelled_enum!(
    /// Direction of money movement for a transaction
    TransactionType, "transaction type" {
        Expense => "expense",
        Income => "income",
        Transfer => "transfer",
    }
);

impl TransactionType {
    /// The change a transaction of this type applies to its account balance.
    /// Transfers do not move money in or out of the family ledger.
    pub fn balance_effect(&self, amount: f64) -> f64 {
        match self {
            TransactionType::Expense => -amount,
            TransactionType::Income => amount,
            TransactionType::Transfer => 0.0,
        }
    }
}

labelled_enum!(
    /// How often a recurring payment falls due
    Frequency, "frequency" {
        Monthly => "monthly",
        SemiAnnual => "semi_annual",
        Annual => "annual",
    }
);

impl Frequency {
    /// Number of months between two occurrences
    pub fn interval_months(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::SemiAnnual => 6,
            Frequency::Annual => 12,
        }
    }
}

labelled_enum!(
    RecurringPaymentType, "recurring payment type" {
        Payment => "payment",
        Debt => "debt",
        Loan => "loan",
    }
);

/// Lenient date parsing for request bodies.
///
/// Clients send either a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp
/// (for example `2025-03-14T00:00:00.000Z`); only the calendar date is kept.
pub mod date_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer};

    pub fn parse(value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                trimmed
                    .get(..10)
                    .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| {
            parse(&value).ok_or_else(|| de::Error::custom(format!("invalid date: {}", value)))
        })
        .transpose()
    }
}

/// Display symbol for a currency code, falling back to the code itself
pub fn currency_symbol(currency: &str) -> String {
    match currency {
        "RUB" => "₽".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "CNY" => "¥".to_string(),
        other => other.to_string(),
    }
}

pub const DEFAULT_CURRENCY: &str = "RUB";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A user as exposed over the API. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub family_id: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInvitation {
    pub id: String,
    pub family_id: String,
    /// Address the invitation is meant for (`<username>@familyfinance.local`
    /// for named invitations)
    pub email: String,
    /// ID of the family member who issued the invitation
    pub invited_by: String,
    /// Six character code a new member types in to join
    pub invitation_code: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Hex color used by the client, e.g. `#ef4444`
    pub color: String,
    pub icon: String,
    /// Monthly spending limit for expense categories
    pub budget_limit: Option<f64>,
    pub family_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Running total maintained by transaction writes
    pub balance: f64,
    pub currency: String,
    pub family_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Always positive; the direction comes from `transaction_type`
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category_id: Option<String>,
    pub account_id: String,
    pub created_by_id: String,
    pub family_id: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed change this transaction applies to its account
    pub fn balance_effect(&self) -> f64 {
        self.transaction_type.balance_effect(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayment {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(rename = "type")]
    pub payment_type: RecurringPaymentType,
    pub color: Option<String>,
    pub family_id: String,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
}

/// A transaction together with the display name of its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub created_by_name: String,
}

/// A recurring payment together with the display name of its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPaymentView {
    #[serde(flatten)]
    pub payment: RecurringPayment,
    pub created_by_name: String,
}

// ---------------------------------------------------------------------------
// Users, login and family membership
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Name of a new family to create, ignored when `invitation_code` is set
    pub family_name: Option<String>,
    /// Code of a pending invitation to an existing family
    pub invitation_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by register, login, join and accept-invitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithFamilyResponse {
    pub user: PublicUser,
    pub family: Option<Family>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserAccountRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMembersResponse {
    pub family: Family,
    pub members: Vec<FamilyMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    /// Username of the person being invited
    pub username: String,
    pub invited_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvitationRequest {
    pub invited_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinFamilyRequest {
    pub user_id: String,
    pub invitation_code: String,
}

// ---------------------------------------------------------------------------
// Ledger requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub color: String,
    pub icon: String,
    pub budget_limit: Option<f64>,
    pub family_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub budget_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Opening balance
    #[serde(default)]
    pub balance: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub family_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    pub balance: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub amount: f64,
    #[serde(deserialize_with = "date_format::deserialize")]
    pub date: NaiveDate,
    pub description: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Left empty to let the server pick a category from the description
    pub category_id: Option<String>,
    pub account_id: String,
    pub created_by_id: String,
    pub family_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "date_format::deserialize_option")]
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
}

/// Optional filters for a family's transaction list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Case-insensitive substring of the description
    pub search: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringPaymentRequest {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    #[serde(deserialize_with = "date_format::deserialize")]
    pub start_date: NaiveDate,
    #[serde(rename = "type")]
    pub payment_type: RecurringPaymentType,
    pub color: Option<String>,
    pub family_id: String,
    pub created_by_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecurringPaymentRequest {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    #[serde(default, deserialize_with = "date_format::deserialize_option")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub payment_type: Option<RecurringPaymentType>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Type of calendar cell for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalendarDayType {
    /// Empty cell before the first day of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty cell completing the last week
    PaddingAfter,
}

/// A single calendar cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// Day of month, 0 for padding cells
    pub day: u32,
    pub day_type: CalendarDayType,
    pub date: Option<NaiveDate>,
    pub is_today: bool,
    /// Recurring payments falling due on this day
    pub scheduled: Vec<RecurringPayment>,
    /// Transactions booked on this day
    pub transactions: Vec<Transaction>,
}

/// A month laid out as a Sunday-first grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u32,
    pub days: Vec<CalendarDay>,
}

// ---------------------------------------------------------------------------
// Dashboard, budget and statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_balance: f64,
    pub primary_currency: String,
    pub currency_symbol: String,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    /// Share of this month's income that was not spent, in percent
    pub savings_rate: f64,
    /// Income and expenses for each of the last seven days, oldest first
    pub daily_flow: Vec<DailyFlow>,
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategoryStatus {
    pub category_id: String,
    pub name: String,
    pub color: String,
    pub limit: f64,
    pub spent: f64,
    pub percentage: f64,
    pub over_budget: bool,
    pub near_limit: bool,
    /// Negative when the limit was exceeded
    pub remaining: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub year: i32,
    pub month: u32,
    pub categories: Vec<BudgetCategoryStatus>,
    pub total_limit: f64,
    pub total_spent: f64,
    pub total_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub is_database: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
    pub categories: usize,
    pub accounts: usize,
    pub transactions: usize,
    pub recurring_payments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    pub storage: StorageInfo,
    pub counts: EntityCounts,
    pub total_balance: f64,
    pub total_income: f64,
    pub total_expenses: f64,
}
