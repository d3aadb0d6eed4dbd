use anyhow::Result;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{
    admins, cart_items, categories, cities, countries, order_items, orders, products, states,
    users,
};

pub mod migrator;
pub mod repositories;

pub use repositories::cart::CartError;
pub use repositories::order::{OrderError, OrderGraph, OrderSort};
pub use repositories::product::{NewProduct, ProductUpdate};
pub use repositories::user::{NewUser, ProfileUpdate, UserFilter, UserWithGeography};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn product_repo(&self) -> repositories::product::ProductRepository {
        repositories::product::ProductRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    fn cart_repo(&self) -> repositories::cart::CartRepository {
        repositories::cart::CartRepository::new(self.conn.clone())
    }

    fn order_repo(&self) -> repositories::order::OrderRepository {
        repositories::order::OrderRepository::new(self.conn.clone())
    }

    fn location_repo(&self) -> repositories::location::LocationRepository {
        repositories::location::LocationRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn user_email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<users::Model> {
        self.user_repo().create(new_user).await
    }

    pub async fn get_user_with_geography(
        &self,
        email: &str,
    ) -> Result<Option<UserWithGeography>> {
        self.user_repo().get_with_geography(email).await
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<(Vec<users::Model>, u64)> {
        self.user_repo().list_filtered(filter).await
    }

    pub async fn update_user_profile(&self, id: &str, update: ProfileUpdate) -> Result<bool> {
        self.user_repo().update_profile(id, update).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // Admins

    pub async fn get_admin_by_email(&self, email: &str) -> Result<Option<admins::Model>> {
        self.admin_repo().get_by_email(email).await
    }

    pub async fn admin_email_exists(&self, email: &str) -> Result<bool> {
        self.admin_repo().email_exists(email).await
    }

    pub async fn create_admin(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<admins::Model> {
        self.admin_repo().create(full_name, email, password_hash).await
    }

    pub async fn update_admin_profile(&self, email: &str, full_name: &str) -> Result<bool> {
        self.admin_repo().update_profile(email, full_name).await
    }

    // Catalog

    pub async fn list_products(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<(products::Model, Option<categories::Model>)>> {
        self.product_repo().list(search).await
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<products::Model>> {
        self.product_repo().get(id).await
    }

    pub async fn get_product_with_category(
        &self,
        id: &str,
    ) -> Result<Option<(products::Model, Option<categories::Model>)>> {
        self.product_repo().get_with_category(id).await
    }

    pub async fn create_product(&self, new_product: NewProduct) -> Result<products::Model> {
        self.product_repo().create(new_product).await
    }

    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<bool> {
        self.product_repo().update(id, update).await
    }

    pub async fn update_product_stock(&self, id: &str, stock: i32) -> Result<bool> {
        self.product_repo().update_stock(id, stock).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<bool> {
        self.product_repo().delete(id).await
    }

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.category_repo().list().await
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<categories::Model>> {
        self.category_repo().get(id).await
    }

    pub async fn create_category(&self, name: &str) -> Result<categories::Model> {
        self.category_repo().create(name).await
    }

    pub async fn update_category(&self, id: i32, name: &str) -> Result<bool> {
        self.category_repo().update(id, name).await
    }

    pub async fn delete_category(&self, id: i32) -> Result<bool> {
        self.category_repo().delete(id).await
    }

    // Cart

    pub async fn add_to_cart(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<u64, CartError> {
        self.cart_repo().add_to_cart(user_id, product_id, quantity).await
    }

    pub async fn list_cart_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(cart_items::Model, Option<products::Model>)>> {
        self.cart_repo().list_for_user(user_id).await
    }

    pub async fn list_cart_items(
        &self,
    ) -> Result<Vec<(cart_items::Model, Option<products::Model>)>> {
        self.cart_repo().list_all().await
    }

    pub async fn get_cart_item(
        &self,
        id: &str,
    ) -> Result<Option<(cart_items::Model, Option<products::Model>)>> {
        self.cart_repo().get(id).await
    }

    pub async fn count_cart_for_user(&self, user_id: &str) -> Result<u64> {
        self.cart_repo().count_for_user(user_id).await
    }

    pub async fn update_cart_quantity(&self, id: &str, quantity: i32) -> Result<bool> {
        self.cart_repo().update_quantity(id, quantity).await
    }

    pub async fn delete_cart_item(&self, id: &str) -> Result<bool> {
        self.cart_repo().delete(id).await
    }

    // Orders

    pub async fn direct_buy(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<orders::Model, OrderError> {
        self.order_repo().direct_buy(user_id, product_id).await
    }

    pub async fn cart_checkout(&self, user_id: &str) -> Result<orders::Model, OrderError> {
        self.order_repo().cart_checkout(user_id).await
    }

    pub async fn list_orders(
        &self,
        search: Option<&str>,
        sort: OrderSort,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<(orders::Model, Option<users::Model>)>, u64, u64)> {
        self.order_repo().list(search, sort, page, page_size).await
    }

    pub async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<orders::Model>> {
        self.order_repo().list_for_user(user_id).await
    }

    pub async fn get_order_graph(&self, id: &str) -> Result<Option<OrderGraph>> {
        self.order_repo().get_graph(id).await
    }

    pub async fn update_order(
        &self,
        id: &str,
        user_id: &str,
        order_date: &str,
        total_amount: Decimal,
    ) -> Result<bool> {
        self.order_repo()
            .update(id, user_id, order_date, total_amount)
            .await
    }

    pub async fn delete_order(&self, id: &str) -> Result<bool> {
        self.order_repo().delete(id).await
    }

    pub async fn list_order_items(
        &self,
    ) -> Result<Vec<(order_items::Model, Option<products::Model>)>> {
        self.order_repo().list_items().await
    }

    pub async fn get_order_item(
        &self,
        id: &str,
    ) -> Result<Option<(order_items::Model, Option<products::Model>)>> {
        self.order_repo().get_item(id).await
    }

    pub async fn update_order_item(
        &self,
        id: &str,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<bool> {
        self.order_repo().update_item(id, quantity, unit_price).await
    }

    pub async fn delete_order_item(&self, id: &str) -> Result<bool> {
        self.order_repo().delete_item(id).await
    }

    // Geography

    pub async fn list_countries(&self) -> Result<Vec<countries::Model>> {
        self.location_repo().countries().await
    }

    pub async fn list_states(&self, country_id: i32) -> Result<Vec<states::Model>> {
        self.location_repo().states_by_country(country_id).await
    }

    pub async fn list_cities(&self, state_id: i32) -> Result<Vec<cities::Model>> {
        self.location_repo().cities_by_state(state_id).await
    }
}
