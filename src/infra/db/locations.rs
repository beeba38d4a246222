use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::Date;

use crate::{
    application::repos::{DropboxesRepo, PickupQueryFilter, PickupsRepo, RepoError},
    domain::entities::{DropboxRecord, PickupRecord},
};

use super::{PostgresRepositories, ilike_pattern, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct DropboxRow {
    id: i64,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
}

impl From<DropboxRow> for DropboxRecord {
    fn from(row: DropboxRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PickupRow {
    id: i64,
    district: String,
    scheduled_on: Date,
    note: Option<String>,
}

impl From<PickupRow> for PickupRecord {
    fn from(row: PickupRow) -> Self {
        Self {
            id: row.id,
            district: row.district,
            scheduled_on: row.scheduled_on,
            note: row.note,
        }
    }
}

#[async_trait]
impl DropboxesRepo for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<DropboxRecord>, RepoError> {
        let rows = sqlx::query_as::<_, DropboxRow>(
            "SELECT id, name, address, latitude, longitude FROM dropboxes \
             ORDER BY LOWER(name), id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DropboxRecord::from).collect())
    }
}

#[async_trait]
impl PickupsRepo for PostgresRepositories {
    async fn list_page(
        &self,
        filter: &PickupQueryFilter,
        skip: i64,
        take: i64,
    ) -> Result<Vec<PickupRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT id, district, scheduled_on, note FROM pickups WHERE 1=1 ",
        );

        Self::apply_pickup_filter(&mut qb, filter);

        qb.push(" ORDER BY scheduled_on, id ");
        qb.push(" LIMIT ");
        qb.push_bind(take);
        qb.push(" OFFSET ");
        qb.push_bind(skip);

        let rows = qb
            .build_query_as::<PickupRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PickupRecord::from).collect())
    }

    async fn count(&self, filter: &PickupQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM pickups WHERE 1=1 ");

        Self::apply_pickup_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}

impl PostgresRepositories {
    fn apply_pickup_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q PickupQueryFilter) {
        if let Some(district) = filter.district.as_ref() {
            qb.push(" AND district ILIKE ");
            qb.push_bind(ilike_pattern(district));
            qb.push(" ");
        }
    }
}
