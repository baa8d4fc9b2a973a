//! Calendar domain logic for the family budget.
//!
//! Lays a month out as a Sunday-first grid and places each family's
//! transactions and recurring payments on it. Recurring payments are
//! templates: they show up on every day that matches their schedule but are
//! never turned into transactions here.

use chrono::{Datelike, NaiveDate};
use log::info;
use shared::{CalendarDay, CalendarDayType, CalendarMonth, Frequency, RecurringPayment, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::storage::{RecurringPaymentStorage, Storage, TransactionStorage};

/// Whether a recurring payment falls due on `date`.
///
/// The day of month must equal the start date's, the date must not precede
/// the start date, and the month distance must fit the frequency. Payments
/// starting on the 29th to 31st skip months that are too short.
pub fn occurs_on(payment: &RecurringPayment, date: NaiveDate) -> bool {
    let start = payment.start_date;
    if date < start || date.day() != start.day() {
        return false;
    }

    let months_between =
        (date.year() - start.year()) * 12 + date.month() as i32 - start.month() as i32;
    match payment.frequency {
        Frequency::Monthly => true,
        Frequency::SemiAnnual => months_between % 6 == 0,
        Frequency::Annual => date.month() == start.month(),
    }
}

/// Number of days in a month, None for an invalid month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

fn padding(day_type: CalendarDayType) -> CalendarDay {
    CalendarDay {
        day: 0,
        day_type,
        date: None,
        is_today: false,
        scheduled: Vec::new(),
        transactions: Vec::new(),
    }
}

/// Build the grid for one month.
pub fn generate_calendar_month(
    year: i32,
    month: u32,
    today: NaiveDate,
    payments: &[RecurringPayment],
    transactions: &[Transaction],
) -> DomainResult<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::validation(format!("Invalid month: {}-{}", year, month)))?;
    let day_count = days_in_month(year, month)
        .ok_or_else(|| DomainError::validation(format!("Invalid month: {}-{}", year, month)))?;
    let first_day_of_week = first.weekday().num_days_from_sunday();

    let mut transactions_by_day: HashMap<u32, Vec<Transaction>> = HashMap::new();
    for transaction in transactions {
        if transaction.date.year() == year && transaction.date.month() == month {
            transactions_by_day
                .entry(transaction.date.day())
                .or_default()
                .push(transaction.clone());
        }
    }

    let mut days = Vec::with_capacity(42);
    for _ in 0..first_day_of_week {
        days.push(padding(CalendarDayType::PaddingBefore));
    }

    for day in 1..=day_count {
        let Some(date) = first.with_day(day) else {
            continue;
        };
        days.push(CalendarDay {
            day,
            day_type: CalendarDayType::MonthDay,
            date: Some(date),
            is_today: date == today,
            scheduled: payments
                .iter()
                .filter(|p| occurs_on(p, date))
                .cloned()
                .collect(),
            transactions: transactions_by_day.remove(&day).unwrap_or_default(),
        });
    }

    while days.len() % 7 != 0 {
        days.push(padding(CalendarDayType::PaddingAfter));
    }

    Ok(CalendarMonth {
        year,
        month,
        first_day_of_week,
        days,
    })
}

/// Calendar service that loads a family's ledger and lays it out by month
#[derive(Clone)]
pub struct CalendarService {
    storage: Arc<dyn Storage>,
}

impl CalendarService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn family_month(
        &self,
        family_id: &str,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> DomainResult<CalendarMonth> {
        info!("🗓️ Building calendar {}-{:02} for family {}", year, month, family_id);
        let payments = self.storage.list_recurring_payments_by_family(family_id).await?;
        let transactions = self.storage.list_transactions_by_family(family_id).await?;
        generate_calendar_month(year, month, today, &payments, &transactions)
    }
}
