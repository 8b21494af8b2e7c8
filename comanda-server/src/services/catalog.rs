//! Business directory
//!
//! Businesses and categories are owned by the ordering platform and pushed
//! here so that zones can be validated and devices can register by code.

use shared::error::ErrorCode;
use shared::models::{Business, BusinessUpsert, Category, CategoryUpsert};

use crate::printing::PrintStorage;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct CatalogService {
    storage: PrintStorage,
}

impl CatalogService {
    pub fn new(storage: PrintStorage) -> Self {
        Self { storage }
    }

    /// Insert or replace a business. Codes are unique.
    pub fn upsert_business(&self, id: i64, payload: BusinessUpsert) -> AppResult<Business> {
        validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

        let code = payload.code.trim().to_string();
        if let Some(existing) = self.storage.find_business_by_code(&code)?
            && existing.id != id
        {
            return Err(AppError::conflict(format!("Business code '{code}' already in use"))
                .with_detail("code", code));
        }

        let business = Business {
            id,
            code,
            name: payload.name.trim().to_string(),
        };
        self.storage.upsert_business(&business)?;
        tracing::info!(business_id = id, code = %business.code, "Business upserted");
        Ok(business)
    }

    pub fn get_business(&self, id: i64) -> AppResult<Business> {
        self.storage
            .get_business(id)?
            .ok_or_else(|| AppError::new(ErrorCode::BusinessNotFound).with_detail("business_id", id))
    }

    /// Insert or replace a category of an existing business
    pub fn upsert_category(&self, id: i64, payload: CategoryUpsert) -> AppResult<Category> {
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        self.get_business(payload.business_id)?;

        let category = Category {
            id,
            business_id: payload.business_id,
            name: payload.name.trim().to_string(),
        };
        self.storage.upsert_category(&category)?;
        tracing::debug!(category_id = id, business_id = category.business_id, "Category upserted");
        Ok(category)
    }
}
