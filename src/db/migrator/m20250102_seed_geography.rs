use crate::entities::prelude::*;
use crate::entities::{cities, countries, states};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Static address hierarchy used by the cascading country/state/city pickers.
/// Read-only at runtime; user rows reference these ids with restricted deletes.
const GEOGRAPHY: &[(&str, &[(&str, &[&str])])] = &[
    (
        "Pakistan",
        &[
            ("Punjab", &["Lahore", "Rawalpindi", "Faisalabad"]),
            ("Sindh", &["Karachi", "Hyderabad"]),
        ],
    ),
    (
        "United States",
        &[
            ("California", &["Los Angeles", "San Francisco"]),
            ("Texas", &["Houston", "Austin"]),
        ],
    ),
    (
        "United Kingdom",
        &[("England", &["London", "Manchester"])],
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut country_id = 0_i32;
        let mut state_id = 0_i32;

        for (country, state_list) in GEOGRAPHY {
            country_id += 1;

            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Countries)
                .columns([countries::Column::Id, countries::Column::Name])
                .values_panic([country_id.into(), (*country).into()])
                .to_owned();
            manager.exec_stmt(insert).await?;

            for (state, city_list) in *state_list {
                state_id += 1;

                let insert = sea_orm_migration::sea_query::Query::insert()
                    .into_table(States)
                    .columns([
                        states::Column::Id,
                        states::Column::Name,
                        states::Column::CountryId,
                    ])
                    .values_panic([state_id.into(), (*state).into(), country_id.into()])
                    .to_owned();
                manager.exec_stmt(insert).await?;

                for city in *city_list {
                    let insert = sea_orm_migration::sea_query::Query::insert()
                        .into_table(Cities)
                        .columns([cities::Column::Name, cities::Column::StateId])
                        .values_panic([(*city).into(), state_id.into()])
                        .to_owned();
                    manager.exec_stmt(insert).await?;
                }
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Cities)
            .to_owned();
        manager.exec_stmt(delete).await?;

        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(States)
            .to_owned();
        manager.exec_stmt(delete).await?;

        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Countries)
            .to_owned();
        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
