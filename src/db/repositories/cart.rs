use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entities::{cart_items, prelude::*, products};

use super::ids;

/// Rejections the add-to-cart flow can produce. Each maps to a distinct
/// user-visible message; none of them leave any state behind.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Product not found.")]
    ProductNotFound,

    #[error("Insufficient stock.")]
    InsufficientStock,

    #[error("Not enough stock to add more of this item.")]
    MergeExceedsStock,

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub struct CartRepository {
    conn: DatabaseConnection,
}

impl CartRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Add `quantity` of a product to a user's cart.
    ///
    /// Merges into an existing row for the same (user, product) pair or
    /// creates a new one, and decrements the product stock by the added
    /// quantity. The stock check, the merge and the decrement run inside one
    /// transaction, so two adds racing for the last unit serialize instead of
    /// overselling.
    ///
    /// Returns the user's cart row count after the add.
    pub async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<u64, CartError> {
        let txn = self.conn.begin().await?;

        let product = Products::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if product.stock < quantity {
            return Err(CartError::InsufficientStock);
        }

        let existing = CartItems::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        if let Some(row) = existing {
            if row.quantity + quantity > product.stock {
                return Err(CartError::MergeExceedsStock);
            }

            let merged = row.quantity + quantity;
            let mut active: cart_items::ActiveModel = row.into();
            active.quantity = Set(merged);
            active.update(&txn).await?;
        } else {
            let id = ids::next_cart_item_id(&txn).await?;
            let model = cart_items::ActiveModel {
                id: Set(id),
                user_id: Set(user_id.to_string()),
                product_id: Set(product_id.to_string()),
                quantity: Set(quantity),
            };
            model.insert(&txn).await?;
        }

        let remaining = product.stock - quantity;
        let mut active: products::ActiveModel = product.into();
        active.stock = Set(remaining);
        active.update(&txn).await?;

        let count = CartItems::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;

        txn.commit().await?;
        Ok(count)
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(cart_items::Model, Option<products::Model>)>> {
        CartItems::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .find_also_related(Products)
            .order_by_asc(cart_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list cart for user")
    }

    pub async fn list_all(
        &self,
    ) -> Result<Vec<(cart_items::Model, Option<products::Model>)>> {
        CartItems::find()
            .find_also_related(Products)
            .order_by_asc(cart_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list cart items")
    }

    pub async fn get(
        &self,
        id: &str,
    ) -> Result<Option<(cart_items::Model, Option<products::Model>)>> {
        CartItems::find_by_id(id)
            .find_also_related(Products)
            .one(&self.conn)
            .await
            .context("Failed to query cart item")
    }

    pub async fn count_for_user(&self, user_id: &str) -> Result<u64> {
        CartItems::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count cart items")
    }

    /// Admin-side quantity overwrite. Does not touch product stock; that is
    /// the add-to-cart flow's job.
    pub async fn update_quantity(&self, id: &str, quantity: i32) -> Result<bool> {
        let Some(item) = CartItems::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: cart_items::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active
            .update(&self.conn)
            .await
            .context("Failed to update cart item")?;

        Ok(true)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = CartItems::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete cart item")?;
        Ok(result.rows_affected > 0)
    }
}
