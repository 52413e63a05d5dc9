//! services/recall/src/cache/categories.rs

use recall_core::domain::Category;
use recall_core::ports::{NotesGateway, PortResult};
use recall_core::validate;
use std::sync::Arc;
use tracing::info;

use crate::cache::state::{remove_keyed, replace_keyed, upsert_keyed, CacheCell, CacheState};

pub struct CategoriesCache {
    gateway: Arc<dyn NotesGateway>,
    cell: CacheCell<Vec<Category>>,
}

impl CategoriesCache {
    pub fn new(gateway: Arc<dyn NotesGateway>) -> Self {
        Self {
            gateway,
            cell: CacheCell::new("categories"),
        }
    }

    pub async fn snapshot(&self) -> CacheState<Vec<Category>> {
        self.cell.snapshot().await
    }

    pub async fn fetch(&self) -> PortResult<Vec<Category>> {
        self.cell
            .track("fetch", self.gateway.list_categories(), |data, categories| {
                *data = categories.clone();
            })
            .await
    }

    pub async fn create(&self, name: &str) -> PortResult<Category> {
        validate::category_name(name)?;

        let category = self
            .cell
            .track("create", self.gateway.create_category(name), |data, category| {
                upsert_keyed(data, category.clone());
            })
            .await?;
        info!("Created category {} '{}'", category.id, category.name);
        Ok(category)
    }

    pub async fn update(&self, category_id: i64, name: &str) -> PortResult<Category> {
        validate::category_name(name)?;

        self.cell
            .track(
                "update",
                self.gateway.update_category(category_id, name),
                |data, category| {
                    replace_keyed(data, category.clone());
                },
            )
            .await
    }

    /// Deletes a category. A category still referenced by notes comes back as
    /// `PortError::Conflict` and stays in the cache.
    pub async fn remove(&self, category_id: i64) -> PortResult<()> {
        self.cell
            .track("remove", self.gateway.delete_category(category_id), |data, _| {
                remove_keyed(data, category_id);
            })
            .await?;
        info!("Deleted category {}", category_id);
        Ok(())
    }
}
