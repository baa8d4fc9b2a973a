use chrono::Utc;
use log::{info, warn};
use shared::{
    CreateRecurringPaymentRequest, RecurringPayment, RecurringPaymentView,
    UpdateRecurringPaymentRequest,
};
use std::sync::Arc;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::new_id;
use crate::backend::domain::user_service::author_names;
use crate::backend::storage::{FamilyStorage, RecurringPaymentStorage, Storage, UserStorage};

/// Service for recurring payment templates shown on the calendar
#[derive(Clone)]
pub struct RecurringPaymentService {
    storage: Arc<dyn Storage>,
}

impl RecurringPaymentService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create_payment(&self, request: CreateRecurringPaymentRequest) -> DomainResult<RecurringPayment> {
        info!(
            "Creating {} recurring payment '{}' starting {}",
            request.frequency, request.name, request.start_date
        );

        let name = request.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Payment name cannot be empty"));
        }
        validate_amount(request.amount)?;
        if self.storage.get_family(&request.family_id).await?.is_none() {
            return Err(DomainError::not_found("Family not found"));
        }
        if self.storage.get_user(&request.created_by_id).await?.is_none() {
            return Err(DomainError::not_found("User not found"));
        }

        let payment = RecurringPayment {
            id: new_id(),
            name: name.to_string(),
            amount: request.amount,
            frequency: request.frequency,
            start_date: request.start_date,
            payment_type: request.payment_type,
            color: request.color,
            family_id: request.family_id,
            created_by_id: request.created_by_id,
            created_at: Utc::now(),
        };
        self.storage.store_recurring_payment(&payment).await?;

        info!("Created recurring payment {}", payment.id);
        Ok(payment)
    }

    pub async fn list_payments(&self, family_id: &str) -> DomainResult<Vec<RecurringPayment>> {
        Ok(self.storage.list_recurring_payments_by_family(family_id).await?)
    }

    /// Payments of a family with the display name of whoever added them
    pub async fn list_payment_views(&self, family_id: &str) -> DomainResult<Vec<RecurringPaymentView>> {
        let payments = self.list_payments(family_id).await?;
        let author_ids = payments.iter().map(|p| p.created_by_id.clone()).collect();
        let names = author_names(self.storage.as_ref(), author_ids).await?;

        Ok(payments
            .into_iter()
            .map(|payment| RecurringPaymentView {
                created_by_name: names.get(&payment.created_by_id).cloned().unwrap_or_default(),
                payment,
            })
            .collect())
    }

    pub async fn update_payment(
        &self,
        payment_id: &str,
        request: UpdateRecurringPaymentRequest,
    ) -> DomainResult<RecurringPayment> {
        info!("Updating recurring payment: {}", payment_id);
        let mut payment = self
            .storage
            .get_recurring_payment(payment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Recurring payment not found"))?;

        if let Some(name) = request.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("Payment name cannot be empty"));
            }
            payment.name = name.to_string();
        }
        if let Some(amount) = request.amount {
            validate_amount(amount)?;
            payment.amount = amount;
        }
        if let Some(frequency) = request.frequency {
            payment.frequency = frequency;
        }
        if let Some(start_date) = request.start_date {
            payment.start_date = start_date;
        }
        if let Some(payment_type) = request.payment_type {
            payment.payment_type = payment_type;
        }
        if request.color.is_some() {
            payment.color = request.color;
        }

        self.storage.update_recurring_payment(&payment).await?;
        Ok(payment)
    }

    pub async fn delete_payment(&self, payment_id: &str) -> DomainResult<()> {
        info!("Deleting recurring payment: {}", payment_id);
        if !self.storage.delete_recurring_payment(payment_id).await? {
            warn!("Recurring payment not found: {}", payment_id);
            return Err(DomainError::not_found("Recurring payment not found"));
        }
        Ok(())
    }
}

fn validate_amount(amount: f64) -> DomainResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DomainError::validation("Amount must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::test_utils::{seed_family, seed_user, test_storage};
    use chrono::NaiveDate;
    use shared::{Frequency, RecurringPaymentType, UserRole};

    fn request(family_id: &str, user_id: &str) -> CreateRecurringPaymentRequest {
        CreateRecurringPaymentRequest {
            name: "Ипотека".to_string(),
            amount: 35000.0,
            frequency: Frequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            payment_type: RecurringPaymentType::Loan,
            color: Some("#8b5cf6".to_string()),
            family_id: family_id.to_string(),
            created_by_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_with_author() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let mut user = seed_user(&storage, "anna", Some(&family.id), UserRole::Admin).await;
        user.first_name = Some("Анна".to_string());
        user.last_name = Some("Петрова".to_string());
        storage.update_user(&user).await.unwrap();
        let service = RecurringPaymentService::new(storage);

        service.create_payment(request(&family.id, &user.id)).await.unwrap();
        let views = service.list_payment_views(&family.id).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].created_by_name, "Анна Петрова");
        assert_eq!(views[0].payment.name, "Ипотека");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let user = seed_user(&storage, "anna", Some(&family.id), UserRole::Admin).await;
        let service = RecurringPaymentService::new(storage);

        let mut zero = request(&family.id, &user.id);
        zero.amount = 0.0;
        assert!(matches!(
            service.create_payment(zero).await.unwrap_err(),
            DomainError::Validation(_)
        ));

        let mut blank = request(&family.id, &user.id);
        blank.name = "".to_string();
        assert!(matches!(
            service.create_payment(blank).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let user = seed_user(&storage, "anna", Some(&family.id), UserRole::Admin).await;
        let service = RecurringPaymentService::new(storage);
        let payment = service.create_payment(request(&family.id, &user.id)).await.unwrap();

        let updated = service
            .update_payment(
                &payment.id,
                UpdateRecurringPaymentRequest {
                    frequency: Some(Frequency::Annual),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.frequency, Frequency::Annual);
        assert_eq!(updated.amount, 35000.0);

        service.delete_payment(&payment.id).await.unwrap();
        assert!(matches!(
            service.delete_payment(&payment.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }
}
