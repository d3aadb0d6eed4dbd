use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{
    admins, cart_items, categories, order_items, orders, products, users,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BuyResponse {
    pub message: String,
    pub redirect_url: String,
}

/// Everything the UI needs about the signed-in account, kept in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAccount {
    pub role: String,
    pub name: String,
    pub email: String,
    pub user_image: Option<String>,
    pub cart_count: u64,
}

impl SessionAccount {
    pub const KEY: &'static str = "account";

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "Admin"
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: String,
    pub name: String,
    pub cart_count: u64,
}

/// `{id, name}` pair for the cascading country/state/city dropdowns.
#[derive(Debug, Serialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
}

impl From<categories::Model> for CategoryDto {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: String,
    pub category_id: i32,
    pub category_name: Option<String>,
}

impl ProductDto {
    #[must_use]
    pub fn from_row(product: products::Model, category: Option<categories::Model>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            image_url: product.image_url,
            created_at: product.created_at,
            category_id: product.category_id,
            category_name: category.map(|c| c.name),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemDto {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: i32,
    pub line_total: Option<Decimal>,
}

impl CartItemDto {
    #[must_use]
    pub fn from_row(item: cart_items::Model, product: Option<products::Model>) -> Self {
        let unit_price = product.as_ref().map(|p| p.price);
        let line_total = unit_price.map(|p| p * Decimal::from(item.quantity));
        Self {
            id: item.id,
            user_id: item.user_id,
            product_id: item.product_id,
            product_name: product.map(|p| p.name),
            unit_price,
            quantity: item.quantity,
            line_total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemDto>,
    pub cart_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub order_date: String,
    pub total_amount: Decimal,
}

impl OrderDto {
    #[must_use]
    pub fn from_row(order: orders::Model, user: Option<users::Model>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            user_name: user.map(|u| match u.last_name {
                Some(last) => format!("{} {}", u.first_name, last),
                None => u.first_name,
            }),
            order_date: order.order_date,
            total_amount: order.total_amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderDto>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItemDto {
    #[must_use]
    pub fn from_row(item: order_items::Model, product: Option<products::Model>) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            product_name: product.map(|p| p.name),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailDto {
    pub order: OrderDto,
    pub items: Vec<OrderItemDto>,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: String,
    pub email: String,
    pub image_path: Option<String>,
    pub date_of_birth: String,
    pub mobile: String,
    pub address: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
}

impl From<users::Model> for UserDto {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            gender: u.gender,
            email: u.email,
            image_path: u.image_path,
            date_of_birth: u.date_of_birth,
            mobile: u.mobile,
            address: u.address,
            country_id: u.country_id,
            state_id: u.state_id,
            city_id: u.city_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserDto>,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub country_name: Option<String>,
    pub state_name: Option<String>,
    pub city_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminProfileDto {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub created_at: String,
}

impl From<admins::Model> for AdminProfileDto {
    fn from(a: admins::Model) -> Self {
        Self {
            id: a.id,
            full_name: a.full_name,
            email: a.email,
            created_at: a.created_at,
        }
    }
}
