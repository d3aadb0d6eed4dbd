use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
};

use crate::entities::{categories, prelude::*};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<categories::Model>> {
        Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    pub async fn get(&self, id: i32) -> Result<Option<categories::Model>> {
        Categories::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query category by id")
    }

    pub async fn create(&self, name: &str) -> Result<categories::Model> {
        let model = categories::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert new category")
    }

    pub async fn update(&self, id: i32, name: &str) -> Result<bool> {
        let Some(category) = self.get(id).await? else {
            return Ok(false);
        };

        let mut active: categories::ActiveModel = category.into();
        active.name = Set(name.to_string());
        active
            .update(&self.conn)
            .await
            .context("Failed to update category")?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Categories::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete category")?;
        Ok(result.rows_affected > 0)
    }
}
