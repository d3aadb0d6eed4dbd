use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{cities, countries, prelude::*, states};

/// Read-only access to the country/state/city reference hierarchy.
pub struct LocationRepository {
    conn: DatabaseConnection,
}

impl LocationRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn countries(&self) -> Result<Vec<countries::Model>> {
        Countries::find()
            .order_by_asc(countries::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list countries")
    }

    pub async fn states_by_country(&self, country_id: i32) -> Result<Vec<states::Model>> {
        States::find()
            .filter(states::Column::CountryId.eq(country_id))
            .order_by_asc(states::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list states for country")
    }

    pub async fn cities_by_state(&self, state_id: i32) -> Result<Vec<cities::Model>> {
        Cities::find()
            .filter(cities::Column::StateId.eq(state_id))
            .order_by_asc(cities::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list cities for state")
    }
}
