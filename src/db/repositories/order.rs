use anyhow::{Context, Result};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{cart_items, order_items, orders, prelude::*, products, users};

use super::ids;

/// Rejections the purchase flows can produce. The whole flow is one
/// transaction, so a rejection (or any mid-flight failure) leaves cart rows
/// and stock untouched.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Product not found.")]
    ProductNotFound,

    #[error("Product is out of stock.")]
    OutOfStock,

    #[error("Cart is empty.")]
    EmptyCart,

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Sort key for the admin order listing. Default is ascending by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    DateAsc,
    DateDesc,
    TotalAsc,
    TotalDesc,
}

impl OrderSort {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("date_desc") => Self::DateDesc,
            Some("total") => Self::TotalAsc,
            Some("total_desc") => Self::TotalDesc,
            _ => Self::DateAsc,
        }
    }
}

/// A fully loaded order: the row, its owner and every line with its product.
#[derive(Debug, Clone)]
pub struct OrderGraph {
    pub order: orders::Model,
    pub user: Option<users::Model>,
    pub items: Vec<(order_items::Model, Option<products::Model>)>,
}

pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl OrderRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Single-product "buy now": quantity fixed at 1, unit price snapshotted
    /// from the current product price. Stock check, decrement and the two
    /// inserts share one transaction.
    pub async fn direct_buy(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<orders::Model, OrderError> {
        let txn = self.conn.begin().await?;

        let product = Products::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or(OrderError::ProductNotFound)?;

        if product.stock <= 0 {
            return Err(OrderError::OutOfStock);
        }

        let remaining = product.stock - 1;
        let price = product.price;
        let mut active: products::ActiveModel = product.into();
        active.stock = Set(remaining);
        active.update(&txn).await?;

        let order_id = ids::next_order_id(&txn).await?;
        let order = orders::ActiveModel {
            id: Set(order_id.clone()),
            user_id: Set(user_id.to_string()),
            order_date: Set(chrono::Utc::now().to_rfc3339()),
            total_amount: Set(price),
        }
        .insert(&txn)
        .await?;

        let item_id = ids::next_order_item_id(&txn).await?;
        order_items::ActiveModel {
            id: Set(item_id),
            order_id: Set(order_id),
            product_id: Set(product_id.to_string()),
            quantity: Set(1),
            unit_price: Set(price),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(order)
    }

    /// Convert the user's cart into an order: one order row, one line per
    /// cart row with the current product price as the snapshot, then delete
    /// the consumed cart rows. All inside one transaction, so a failed
    /// checkout consumes nothing.
    pub async fn cart_checkout(&self, user_id: &str) -> Result<orders::Model, OrderError> {
        let txn = self.conn.begin().await?;

        let cart_rows = CartItems::find()
            .filter(cart_items::Column::UserId.eq(user_id))
            .find_also_related(Products)
            .all(&txn)
            .await?;

        if cart_rows.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut total = Decimal::ZERO;
        for (row, product) in &cart_rows {
            let product = product.as_ref().ok_or(OrderError::ProductNotFound)?;
            total += product.price * Decimal::from(row.quantity);
        }

        let order_id = ids::next_order_id(&txn).await?;
        let order = orders::ActiveModel {
            id: Set(order_id.clone()),
            user_id: Set(user_id.to_string()),
            order_date: Set(chrono::Utc::now().to_rfc3339()),
            total_amount: Set(total),
        }
        .insert(&txn)
        .await?;

        for (row, product) in &cart_rows {
            let product = product.as_ref().ok_or(OrderError::ProductNotFound)?;
            let item_id = ids::next_order_item_id(&txn).await?;
            order_items::ActiveModel {
                id: Set(item_id),
                order_id: Set(order_id.clone()),
                product_id: Set(row.product_id.clone()),
                quantity: Set(row.quantity),
                unit_price: Set(product.price),
            }
            .insert(&txn)
            .await?;
        }

        CartItems::delete_many()
            .filter(cart_items::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(order)
    }

    /// Admin listing: substring search over order id / user id, sortable by
    /// date or total, page-number pagination.
    pub async fn list(
        &self,
        search: Option<&str>,
        sort: OrderSort,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<(orders::Model, Option<users::Model>)>, u64, u64)> {
        let mut query = Orders::find().find_also_related(Users);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(orders::Column::Id.contains(term))
                    .add(orders::Column::UserId.contains(term)),
            );
        }

        query = match sort {
            OrderSort::DateAsc => query.order_by_asc(orders::Column::OrderDate),
            OrderSort::DateDesc => query.order_by_desc(orders::Column::OrderDate),
            OrderSort::TotalAsc => query.order_by_asc(orders::Column::TotalAmount),
            OrderSort::TotalDesc => query.order_by_desc(orders::Column::TotalAmount),
        };

        let paginator = query.paginate(&self.conn, page_size.max(1));
        let total_items = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows, total_pages, total_items))
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<orders::Model>> {
        Orders::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::OrderDate)
            .all(&self.conn)
            .await
            .context("Failed to list orders for user")
    }

    pub async fn get(&self, id: &str) -> Result<Option<orders::Model>> {
        Orders::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query order by id")
    }

    /// Load the full order graph for detail views and invoice rendering.
    pub async fn get_graph(&self, id: &str) -> Result<Option<OrderGraph>> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };

        let user = Users::find_by_id(&order.user_id).one(&self.conn).await?;

        let items = OrderItems::find()
            .filter(order_items::Column::OrderId.eq(id))
            .find_also_related(Products)
            .order_by_asc(order_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load order items")?;

        Ok(Some(OrderGraph { order, user, items }))
    }

    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        order_date: &str,
        total_amount: Decimal,
    ) -> Result<bool> {
        let Some(order) = self.get(id).await? else {
            return Ok(false);
        };

        let mut active: orders::ActiveModel = order.into();
        active.user_id = Set(user_id.to_string());
        active.order_date = Set(order_date.to_string());
        active.total_amount = Set(total_amount);
        active
            .update(&self.conn)
            .await
            .context("Failed to update order")?;

        Ok(true)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = Orders::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete order")?;
        Ok(result.rows_affected > 0)
    }

    // Order item admin surface

    pub async fn list_items(
        &self,
    ) -> Result<Vec<(order_items::Model, Option<products::Model>)>> {
        OrderItems::find()
            .find_also_related(Products)
            .order_by_asc(order_items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list order items")
    }

    pub async fn get_item(
        &self,
        id: &str,
    ) -> Result<Option<(order_items::Model, Option<products::Model>)>> {
        OrderItems::find_by_id(id)
            .find_also_related(Products)
            .one(&self.conn)
            .await
            .context("Failed to query order item")
    }

    pub async fn update_item(
        &self,
        id: &str,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<bool> {
        let Some((item, _)) = self.get_item(id).await? else {
            return Ok(false);
        };

        let mut active: order_items::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.unit_price = Set(unit_price);
        active
            .update(&self.conn)
            .await
            .context("Failed to update order item")?;

        Ok(true)
    }

    pub async fn delete_item(&self, id: &str) -> Result<bool> {
        let result = OrderItems::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete order item")?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_date_ascending() {
        assert_eq!(OrderSort::parse(None), OrderSort::DateAsc);
        assert_eq!(OrderSort::parse(Some("")), OrderSort::DateAsc);
        assert_eq!(OrderSort::parse(Some("garbage")), OrderSort::DateAsc);
    }

    #[test]
    fn sort_parses_known_keys() {
        assert_eq!(OrderSort::parse(Some("date_desc")), OrderSort::DateDesc);
        assert_eq!(OrderSort::parse(Some("total")), OrderSort::TotalAsc);
        assert_eq!(OrderSort::parse(Some("total_desc")), OrderSort::TotalDesc);
    }
}
