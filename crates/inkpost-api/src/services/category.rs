// Category service

use inkpost_core::{slugify, Category};
use inkpost_storage::{
    models::{CategoryRow, CreateCategoryRow},
    StorageBackend,
};

use crate::api::error::ApiError;

pub struct CategoryService {
    db: StorageBackend,
}

pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        let rows = self
            .db
            .list_categories()
            .await
            .map_err(ApiError::internal)?;
        Ok(rows.into_iter().map(row_to_category).collect())
    }

    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, ApiError> {
        if self
            .db
            .get_category_by_name(&input.name)
            .await
            .map_err(ApiError::internal)?
            .is_some()
        {
            return Err(ApiError::conflict("Category already exists"));
        }

        let slug = self.unique_slug(&input.name).await?;
        let row = self
            .db
            .create_category(CreateCategoryRow {
                name: input.name,
                slug,
                description: input.description,
                icon: input.icon,
                color: input.color,
            })
            .await
            .map_err(ApiError::internal)?;

        tracing::info!(category_id = %row.id, "category created");
        Ok(row_to_category(row))
    }

    async fn unique_slug(&self, name: &str) -> Result<String, ApiError> {
        let base = {
            let s = slugify(name);
            if s.is_empty() {
                "category".to_string()
            } else {
                s
            }
        };
        let mut slug = base.clone();
        let mut n = 2;
        while self
            .db
            .category_slug_exists(&slug)
            .await
            .map_err(ApiError::internal)?
        {
            slug = format!("{base}-{n}");
            n += 1;
        }
        Ok(slug)
    }
}

fn row_to_category(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
        slug: row.slug,
        description: row.description,
        icon: row.icon,
        color: row.color,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
