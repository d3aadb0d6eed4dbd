//! Sequential display-id generation.
//!
//! Each entity family carries a human-readable id such as `Prod001` or
//! `Cust0001`: a fixed prefix followed by a zero-padded counter. The next id
//! is derived from the current maximum id in the table. The scan and the
//! insert that consumes the id must share one transaction, which is why every
//! function here is generic over [`ConnectionTrait`].

use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, QuerySelect};

use crate::entities::{cart_items, order_items, orders, products, users};

pub const USER_PREFIX: &str = "Cust";
pub const PRODUCT_PREFIX: &str = "Prod";
pub const ORDER_PREFIX: &str = "Ord";
pub const ORDER_ITEM_PREFIX: &str = "OI";
pub const CART_ITEM_PREFIX: &str = "CI";

pub const USER_WIDTH: usize = 4;
pub const PRODUCT_WIDTH: usize = 3;
pub const ORDER_WIDTH: usize = 4;
pub const ORDER_ITEM_WIDTH: usize = 3;
pub const CART_ITEM_WIDTH: usize = 3;

/// Compute the successor of `last` in a `prefix` + zero-padded-counter
/// sequence. `None` starts the sequence at 1.
pub fn next_in_sequence(last: Option<&str>, prefix: &str, width: usize) -> Result<String> {
    let next = match last {
        None => 1,
        Some(id) => {
            let suffix = id
                .get(prefix.len()..)
                .with_context(|| format!("Id '{id}' is shorter than prefix '{prefix}'"))?;
            suffix
                .parse::<u64>()
                .with_context(|| format!("Id '{id}' has a non-numeric suffix"))?
                + 1
        }
    };

    Ok(format!("{prefix}{next:0width$}"))
}

pub async fn next_user_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    let last = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .order_by_desc(users::Column::Id)
        .into_tuple::<String>()
        .one(conn)
        .await
        .context("Failed to scan last user id")?;

    next_in_sequence(last.as_deref(), USER_PREFIX, USER_WIDTH)
}

pub async fn next_product_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    let last = products::Entity::find()
        .select_only()
        .column(products::Column::Id)
        .order_by_desc(products::Column::Id)
        .into_tuple::<String>()
        .one(conn)
        .await
        .context("Failed to scan last product id")?;

    next_in_sequence(last.as_deref(), PRODUCT_PREFIX, PRODUCT_WIDTH)
}

pub async fn next_order_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    let last = orders::Entity::find()
        .select_only()
        .column(orders::Column::Id)
        .order_by_desc(orders::Column::Id)
        .into_tuple::<String>()
        .one(conn)
        .await
        .context("Failed to scan last order id")?;

    next_in_sequence(last.as_deref(), ORDER_PREFIX, ORDER_WIDTH)
}

pub async fn next_order_item_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    let last = order_items::Entity::find()
        .select_only()
        .column(order_items::Column::Id)
        .order_by_desc(order_items::Column::Id)
        .into_tuple::<String>()
        .one(conn)
        .await
        .context("Failed to scan last order item id")?;

    next_in_sequence(last.as_deref(), ORDER_ITEM_PREFIX, ORDER_ITEM_WIDTH)
}

pub async fn next_cart_item_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    let last = cart_items::Entity::find()
        .select_only()
        .column(cart_items::Column::Id)
        .order_by_desc(cart_items::Column::Id)
        .into_tuple::<String>()
        .one(conn)
        .await
        .context("Failed to scan last cart item id")?;

    next_in_sequence(last.as_deref(), CART_ITEM_PREFIX, CART_ITEM_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_user_id_is_cust0001() {
        assert_eq!(
            next_in_sequence(None, USER_PREFIX, USER_WIDTH).unwrap(),
            "Cust0001"
        );
    }

    #[test]
    fn increments_product_suffix() {
        assert_eq!(
            next_in_sequence(Some("Prod009"), PRODUCT_PREFIX, PRODUCT_WIDTH).unwrap(),
            "Prod010"
        );
    }

    #[test]
    fn keeps_zero_padding_width() {
        assert_eq!(
            next_in_sequence(Some("Ord0041"), ORDER_PREFIX, ORDER_WIDTH).unwrap(),
            "Ord0042"
        );
        assert_eq!(
            next_in_sequence(Some("CI099"), CART_ITEM_PREFIX, CART_ITEM_WIDTH).unwrap(),
            "CI100"
        );
    }

    #[test]
    fn grows_past_the_padding() {
        assert_eq!(
            next_in_sequence(Some("Prod999"), PRODUCT_PREFIX, PRODUCT_WIDTH).unwrap(),
            "Prod1000"
        );
    }

    #[test]
    fn rejects_malformed_suffix() {
        assert!(next_in_sequence(Some("Prodxyz"), PRODUCT_PREFIX, PRODUCT_WIDTH).is_err());
        assert!(next_in_sequence(Some("Pr"), PRODUCT_PREFIX, PRODUCT_WIDTH).is_err());
    }
}
