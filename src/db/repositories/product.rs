use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entities::{categories, prelude::*, products};

use super::ids;

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: i32,
}

#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: i32,
}

pub struct ProductRepository {
    conn: DatabaseConnection,
}

impl ProductRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List products with their category, optionally filtered by a substring
    /// of the product name or the category name. SQLite LIKE is
    /// case-insensitive for ASCII, which covers the catalog search contract.
    pub async fn list(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<(products::Model, Option<categories::Model>)>> {
        let mut query = Products::find()
            .find_also_related(Categories)
            .order_by_asc(products::Column::Id);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(products::Column::Name.contains(term))
                    .add(categories::Column::Name.contains(term)),
            );
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list products")
    }

    pub async fn get(&self, id: &str) -> Result<Option<products::Model>> {
        Products::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query product by id")
    }

    pub async fn get_with_category(
        &self,
        id: &str,
    ) -> Result<Option<(products::Model, Option<categories::Model>)>> {
        Products::find_by_id(id)
            .find_also_related(Categories)
            .one(&self.conn)
            .await
            .context("Failed to query product with category")
    }

    /// Insert a new product, assigning the next `Prod` id inside one
    /// transaction with the max-id scan.
    pub async fn create(&self, new_product: NewProduct) -> Result<products::Model> {
        let txn = self.conn.begin().await?;

        let id = ids::next_product_id(&txn).await?;

        let model = products::ActiveModel {
            id: Set(id),
            name: Set(new_product.name),
            description: Set(new_product.description),
            price: Set(new_product.price),
            stock: Set(new_product.stock),
            image_url: Set(new_product.image_url),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            category_id: Set(new_product.category_id),
        };

        let product = model
            .insert(&txn)
            .await
            .context("Failed to insert new product")?;

        txn.commit().await?;
        Ok(product)
    }

    pub async fn update(&self, id: &str, update: ProductUpdate) -> Result<bool> {
        let Some(product) = self.get(id).await? else {
            return Ok(false);
        };

        let mut active: products::ActiveModel = product.into();
        active.name = Set(update.name);
        active.description = Set(update.description);
        active.price = Set(update.price);
        active.stock = Set(update.stock);
        active.category_id = Set(update.category_id);
        if let Some(image) = update.image_url {
            active.image_url = Set(Some(image));
        }
        active
            .update(&self.conn)
            .await
            .context("Failed to update product")?;

        Ok(true)
    }

    /// Overwrite the stock counter. No delta tracking; the caller supplies
    /// the new absolute value.
    pub async fn update_stock(&self, id: &str, stock: i32) -> Result<bool> {
        let Some(product) = self.get(id).await? else {
            return Ok(false);
        };

        let mut active: products::ActiveModel = product.into();
        active.stock = Set(stock);
        active
            .update(&self.conn)
            .await
            .context("Failed to update product stock")?;

        Ok(true)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = Products::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete product")?;
        Ok(result.rows_affected > 0)
    }
}
