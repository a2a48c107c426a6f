//! Category operations.

use assorti_core::validation::{validate_category_patch, validate_new_category};
use assorti_core::{
    Category, CategoryPayload, CategoryWithProducts, CoreError, Page, PageRequest,
};
use assorti_db::Database;
use tracing::{info, warn};

use super::in_use;
use crate::error::ApiResult;

pub async fn list(db: &Database, request: PageRequest) -> ApiResult<Page<Category>> {
    let window = request.normalize()?;
    Ok(db.categories().list(window).await?)
}

/// Category detail with every product in it.
pub async fn get(db: &Database, id: &str) -> ApiResult<CategoryWithProducts> {
    let category = db
        .categories()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::CategoryNotFound(id.to_string()))?;
    let products = db.products().all_in_category(id).await?;

    Ok(CategoryWithProducts { category, products })
}

pub async fn create(db: &Database, payload: &CategoryPayload) -> ApiResult<Category> {
    let category = validate_new_category(payload).inspect_err(|e| {
        warn!(error = %e, "Category rejected");
    })?;

    let category = db.categories().insert(&category).await?;
    info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok(category)
}

pub async fn update(db: &Database, id: &str, payload: &CategoryPayload) -> ApiResult<Category> {
    let patch = validate_category_patch(payload)?;
    let category = db.categories().update(id, &patch).await?;
    info!(category_id = %category.id, "Category updated");
    Ok(category)
}

pub async fn delete(db: &Database, id: &str) -> ApiResult<()> {
    db.categories().delete(id).await.map_err(in_use("Категория"))?;
    info!(category_id = %id, "Category deleted");
    Ok(())
}
