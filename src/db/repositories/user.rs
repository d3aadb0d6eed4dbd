use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{cities, countries, prelude::*, states, users};

use super::ids;

/// Field values accepted at registration; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: String,
    pub email: String,
    pub password_hash: String,
    pub image_path: Option<String>,
    pub date_of_birth: String,
    pub mobile: String,
    pub address: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
}

/// Profile fields a user may change about themselves. Email and password
/// stay fixed here; they move through dedicated flows.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: String,
    pub date_of_birth: String,
    pub mobile: String,
    pub address: String,
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
    pub image_path: Option<String>,
}

/// Admin-side listing filter (name substring, gender, sort, pagination).
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub sort_field: Option<String>,
    pub sort_desc: bool,
    pub page: u64,
    pub page_size: u64,
}

/// A user row joined with its geography names, for profile views.
#[derive(Debug, Clone)]
pub struct UserWithGeography {
    pub user: users::Model,
    pub country: Option<countries::Model>,
    pub state: Option<states::Model>,
    pub city: Option<cities::Model>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check user email uniqueness")?;
        Ok(count > 0)
    }

    /// Insert a new user, assigning the next `Cust` id. The id scan and the
    /// insert share one transaction so concurrent registrations serialize.
    pub async fn create(&self, new_user: NewUser) -> Result<users::Model> {
        let txn = self.conn.begin().await?;

        let id = ids::next_user_id(&txn).await?;

        let model = users::ActiveModel {
            id: Set(id),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            gender: Set(new_user.gender),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            image_path: Set(new_user.image_path),
            date_of_birth: Set(new_user.date_of_birth),
            mobile: Set(new_user.mobile),
            address: Set(new_user.address),
            country_id: Set(new_user.country_id),
            state_id: Set(new_user.state_id),
            city_id: Set(new_user.city_id),
        };

        let user = model
            .insert(&txn)
            .await
            .context("Failed to insert new user")?;

        txn.commit().await?;
        Ok(user)
    }

    pub async fn get_with_geography(&self, email: &str) -> Result<Option<UserWithGeography>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let country = Countries::find_by_id(user.country_id).one(&self.conn).await?;
        let state = States::find_by_id(user.state_id).one(&self.conn).await?;
        let city = Cities::find_by_id(user.city_id).one(&self.conn).await?;

        Ok(Some(UserWithGeography {
            user,
            country,
            state,
            city,
        }))
    }

    pub async fn list_filtered(&self, filter: &UserFilter) -> Result<(Vec<users::Model>, u64)> {
        let mut query = Users::find();

        if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(users::Column::FirstName.contains(name))
                    .add(users::Column::LastName.contains(name)),
            );
        }

        if let Some(gender) = filter.gender.as_deref().filter(|g| !g.is_empty()) {
            query = query.filter(users::Column::Gender.eq(gender));
        }

        let sort_column = match filter.sort_field.as_deref() {
            Some("email") => users::Column::Email,
            Some("name") => users::Column::FirstName,
            _ => users::Column::Id,
        };
        query = if filter.sort_desc {
            query.order_by_desc(sort_column)
        } else {
            query.order_by_asc(sort_column)
        };

        let paginator = query.paginate(&self.conn, filter.page_size.max(1));
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(filter.page.saturating_sub(1)).await?;

        Ok((items, total_pages))
    }

    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<bool> {
        let Some(user) = self.get_by_id(id).await? else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.first_name = Set(update.first_name);
        active.last_name = Set(update.last_name);
        active.gender = Set(update.gender);
        active.date_of_birth = Set(update.date_of_birth);
        active.mobile = Set(update.mobile);
        active.address = Set(update.address);
        active.country_id = Set(update.country_id);
        active.state_id = Set(update.state_id);
        active.city_id = Set(update.city_id);
        if let Some(image) = update.image_path {
            active.image_path = Set(Some(image));
        }
        active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(true)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;
        Ok(result.rows_affected > 0)
    }
}
