use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    application::repos::{RepoError, WasteItemsRepo, WasteQueryFilter, WasteTypesRepo},
    domain::entities::{WasteItemWithType, WasteTypeRecord},
};

use super::{PostgresRepositories, ilike_pattern, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct WasteTypeRow {
    id: i64,
    name: String,
}

impl From<WasteTypeRow> for WasteTypeRecord {
    fn from(row: WasteTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// One joined row: item columns plus the category name.
#[derive(sqlx::FromRow)]
struct WasteItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    waste_type_id: i64,
    waste_type_name: String,
}

impl From<WasteItemRow> for WasteItemWithType {
    fn from(row: WasteItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            waste_type_id: row.waste_type_id,
            waste_type: WasteTypeRecord {
                id: row.waste_type_id,
                name: row.waste_type_name,
            },
        }
    }
}

#[async_trait]
impl WasteTypesRepo for PostgresRepositories {
    async fn list_types(&self) -> Result<Vec<WasteTypeRecord>, RepoError> {
        let rows = sqlx::query_as::<_, WasteTypeRow>(
            "SELECT id, name FROM waste_types ORDER BY LOWER(name), id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(WasteTypeRecord::from).collect())
    }
}

#[async_trait]
impl WasteItemsRepo for PostgresRepositories {
    async fn list_for_type(&self, type_id: i64) -> Result<Vec<WasteItemWithType>, RepoError> {
        let rows = sqlx::query_as::<_, WasteItemRow>(
            "SELECT w.id, w.name, w.description, w.waste_type_id, t.name AS waste_type_name \
             FROM waste_items w \
             INNER JOIN waste_types t ON t.id = w.waste_type_id \
             WHERE w.waste_type_id = $1 \
             ORDER BY LOWER(w.name), w.id",
        )
        .bind(type_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(WasteItemWithType::from).collect())
    }

    async fn list_page(
        &self,
        filter: &WasteQueryFilter,
        skip: i64,
        take: i64,
    ) -> Result<Vec<WasteItemWithType>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT w.id, w.name, w.description, w.waste_type_id, t.name AS waste_type_name \
             FROM waste_items w \
             INNER JOIN waste_types t ON t.id = w.waste_type_id \
             WHERE 1=1 ",
        );

        Self::apply_waste_filter(&mut qb, filter);

        qb.push(" ORDER BY LOWER(w.name), w.id ");
        qb.push(" LIMIT ");
        qb.push_bind(take);
        qb.push(" OFFSET ");
        qb.push_bind(skip);

        let rows = qb
            .build_query_as::<WasteItemRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(WasteItemWithType::from).collect())
    }

    async fn count(&self, filter: &WasteQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM waste_items w WHERE 1=1 ");

        Self::apply_waste_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn search_by_name(
        &self,
        name: &str,
        take: i64,
    ) -> Result<Vec<WasteItemWithType>, RepoError> {
        let rows = sqlx::query_as::<_, WasteItemRow>(
            "SELECT w.id, w.name, w.description, w.waste_type_id, t.name AS waste_type_name \
             FROM waste_items w \
             INNER JOIN waste_types t ON t.id = w.waste_type_id \
             WHERE w.name ILIKE $1 \
             ORDER BY LOWER(w.name), w.id \
             LIMIT $2",
        )
        .bind(ilike_pattern(name))
        .bind(take)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(WasteItemWithType::from).collect())
    }
}

impl PostgresRepositories {
    fn apply_waste_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q WasteQueryFilter) {
        if let Some(search) = filter.search.as_ref() {
            qb.push(" AND w.name ILIKE ");
            qb.push_bind(ilike_pattern(search));
            qb.push(" ");
        }
    }
}
