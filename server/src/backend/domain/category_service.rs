use chrono::Utc;
use log::{info, warn};
use shared::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use std::sync::Arc;

use crate::backend::domain::categorization::DEFAULT_CATEGORIES;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::new_id;
use crate::backend::storage::{CategoryStorage, FamilyStorage, Storage};

/// Service for a family's spending and income categories
#[derive(Clone)]
pub struct CategoryService {
    storage: Arc<dyn Storage>,
}

impl CategoryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> DomainResult<Category> {
        info!("Creating category '{}' for family {}", request.name, request.family_id);

        let name = request.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Category name cannot be empty"));
        }
        validate_budget_limit(request.budget_limit)?;
        if self.storage.get_family(&request.family_id).await?.is_none() {
            return Err(DomainError::not_found("Family not found"));
        }

        let category = Category {
            id: new_id(),
            name: name.to_string(),
            category_type: request.category_type,
            color: request.color,
            icon: request.icon,
            budget_limit: request.budget_limit,
            family_id: request.family_id,
            created_at: Utc::now(),
        };
        self.storage.store_category(&category).await?;

        info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn list_categories(&self, family_id: &str) -> DomainResult<Vec<Category>> {
        let categories = self.storage.list_categories_by_family(family_id).await?;
        info!("Found {} categories for family {}", categories.len(), family_id);
        Ok(categories)
    }

    pub async fn update_category(
        &self,
        category_id: &str,
        request: UpdateCategoryRequest,
    ) -> DomainResult<Category> {
        info!("Updating category: {}", category_id);

        let mut category = self
            .storage
            .get_category(category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category not found"))?;

        if let Some(name) = request.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("Category name cannot be empty"));
            }
            category.name = name.to_string();
        }
        if let Some(category_type) = request.category_type {
            category.category_type = category_type;
        }
        if let Some(color) = request.color {
            category.color = color;
        }
        if let Some(icon) = request.icon {
            category.icon = icon;
        }
        if request.budget_limit.is_some() {
            validate_budget_limit(request.budget_limit)?;
            category.budget_limit = request.budget_limit;
        }

        self.storage.update_category(&category).await?;
        Ok(category)
    }

    pub async fn delete_category(&self, category_id: &str) -> DomainResult<()> {
        info!("Deleting category: {}", category_id);
        if !self.storage.delete_category(category_id).await? {
            warn!("Category not found: {}", category_id);
            return Err(DomainError::not_found("Category not found"));
        }
        Ok(())
    }

    /// Store the default category set for a freshly created family
    pub async fn seed_default_categories(&self, family_id: &str) -> DomainResult<Vec<Category>> {
        let mut seeded = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for template in DEFAULT_CATEGORIES.iter() {
            let category = Category {
                id: new_id(),
                name: template.name.to_string(),
                category_type: template.category_type,
                color: template.color.to_string(),
                icon: template.icon.to_string(),
                budget_limit: template.budget_limit,
                family_id: family_id.to_string(),
                created_at: Utc::now(),
            };
            self.storage.store_category(&category).await?;
            seeded.push(category);
        }
        info!("Seeded {} default categories for family {}", seeded.len(), family_id);
        Ok(seeded)
    }
}

fn validate_budget_limit(limit: Option<f64>) -> DomainResult<()> {
    match limit {
        Some(value) if !value.is_finite() || value < 0.0 => Err(DomainError::validation(
            "Budget limit must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::test_utils::{seed_family, test_storage};
    use shared::CategoryType;

    fn request(family_id: &str, name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            category_type: CategoryType::Expense,
            color: "#123456".to_string(),
            icon: "gift".to_string(),
            budget_limit: Some(100.0),
            family_id: family_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_categories() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let service = CategoryService::new(storage);

        let created = service.create_category(request(&family.id, "  Подарки ")).await.unwrap();
        assert_eq!(created.name, "Подарки");

        let listed = service.list_categories(&family.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_category_validation() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let service = CategoryService::new(storage);

        let err = service.create_category(request(&family.id, "   ")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut negative = request(&family.id, "Подарки");
        negative.budget_limit = Some(-1.0);
        let err = service.create_category(negative).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service.create_category(request("missing", "Подарки")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let service = CategoryService::new(storage);
        let created = service.create_category(request(&family.id, "Подарки")).await.unwrap();

        let updated = service
            .update_category(
                &created.id,
                UpdateCategoryRequest {
                    budget_limit: Some(250.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Подарки");
        assert_eq!(updated.icon, "gift");
        assert_eq!(updated.budget_limit, Some(250.0));
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let service = CategoryService::new(test_storage());
        let err = service.delete_category("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seed_default_categories() {
        let storage = test_storage();
        let family = seed_family(&storage).await;
        let service = CategoryService::new(storage);

        service.seed_default_categories(&family.id).await.unwrap();
        let categories = service.list_categories(&family.id).await.unwrap();
        assert_eq!(categories.len(), 8);
        assert!(categories.iter().any(|c| c.name == "Продукты" && c.budget_limit == Some(600.0)));
    }
}
