use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::entities::{admins, prelude::*};

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<admins::Model>> {
        Admins::find()
            .filter(admins::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query admin by email")
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = Admins::find()
            .filter(admins::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check admin email uniqueness")?;
        Ok(count > 0)
    }

    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<admins::Model> {
        let model = admins::ActiveModel {
            full_name: Set(full_name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert new admin")
    }

    pub async fn update_profile(&self, email: &str, full_name: &str) -> Result<bool> {
        let Some(admin) = self.get_by_email(email).await? else {
            return Ok(false);
        };

        let mut active: admins::ActiveModel = admin.into();
        active.full_name = Set(full_name.to_string());
        active
            .update(&self.conn)
            .await
            .context("Failed to update admin profile")?;

        Ok(true)
    }
}
