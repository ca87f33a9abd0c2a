// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// PostgreSQL backend implementation

use super::backend::{OrderStore, StoreResult};
use crate::config::PostgresConfig;
use crate::order::OrderRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info, warn};
use uuid::Uuid;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL,
    payload JSONB NOT NULL
)";

/// PostgreSQL-backed order store
///
/// The pool is created lazily, so construction never touches the network;
/// the first query (or `initialize`) establishes connections.
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(config: PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.url)
            .context("Invalid PostgreSQL connection URL")?;

        Ok(Self { pool })
    }

    fn row_to_order(row: &PgRow) -> Result<OrderRecord, sqlx::Error> {
        Ok(OrderRecord {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            payload: row.try_get("payload")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresBackend {
    async fn initialize(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        info!("orders table ready");
        Ok(())
    }

    async fn size_in_mb(&self) -> StoreResult<u64> {
        let size_bytes: i64 =
            sqlx::query_scalar("SELECT pg_database_size(current_database())")
                .fetch_one(&self.pool)
                .await?;

        Ok(size_bytes.max(0) as u64 / (1024 * 1024))
    }

    async fn insert_order(&self, order: &OrderRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO orders (id, created_at, payload) VALUES ($1, $2, $3)")
            .bind(order.id)
            .bind(order.created_at)
            .bind(&order.payload)
            .execute(&self.pool)
            .await?;

        debug!("inserted order {}", order.id);
        Ok(())
    }

    async fn query_orders_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<OrderRecord>> {
        let rows =
            sqlx::query("SELECT id, created_at, payload FROM orders WHERE created_at < $1")
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(Self::row_to_order(row)?);
        }
        Ok(orders)
    }

    async fn delete_orders(&self, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM orders WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_order_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>> {
        let row =
            sqlx::query("SELECT id, created_at, payload FROM orders WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(Self::row_to_order).transpose()?)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Health check error: {}", e);
                Ok(false)
            }
        }
    }

    fn backend_type(&self) -> &str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_connect() {
        // connect_lazy means construction succeeds without a server
        let config = PostgresConfig {
            url: "postgres://localhost:5432/orders_test".to_string(),
            max_connections: 5,
        };
        let backend = PostgresBackend::new(config).unwrap();
        assert_eq!(backend.backend_type(), "postgres");
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let config = PostgresConfig {
            url: "not a url".to_string(),
            max_connections: 5,
        };
        assert!(PostgresBackend::new(config).is_err());
    }
}
