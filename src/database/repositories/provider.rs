use async_trait::async_trait;
use chrono::NaiveDate;
use moka::future::Cache;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{Equipment, Provider, TeamMember};
use crate::database::repositories::ProviderDirectory;
use crate::database::types::ProviderRow;
use crate::error::SchedulingError;

/// Read-only provider directory over Postgres with a bounded, TTL-expiring
/// lookup cache. Availability checks hit the directory on every request;
/// roster edits go through a different subsystem, so a short TTL is the
/// staleness bound.
pub struct ProviderRepository {
    pool: PgPool,
    cache: Cache<Uuid, Provider>,
}

impl ProviderRepository {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.provider_cache_capacity)
            .time_to_live(config.provider_cache_ttl())
            .build();

        Self { pool, cache }
    }

    async fn load_provider(&self, id: Uuid) -> Result<Option<Provider>, SchedulingError> {
        let row = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id, kind, display_name,
                   monday_start_minutes, monday_end_minutes,
                   tuesday_start_minutes, tuesday_end_minutes,
                   wednesday_start_minutes, wednesday_end_minutes,
                   thursday_start_minutes, thursday_end_minutes,
                   friday_start_minutes, friday_end_minutes,
                   saturday_start_minutes, saturday_end_minutes,
                   sunday_start_minutes, sunday_end_minutes,
                   created_at, updated_at
            FROM providers WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let team_members = sqlx::query_as::<_, TeamMember>(
            "SELECT id, provider_id, name, role, is_active, created_at \
             FROM team_members WHERE provider_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let equipment = sqlx::query_as::<_, Equipment>(
            "SELECT id, provider_id, name, kind, is_available, created_at \
             FROM equipment WHERE provider_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let blackout_dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT blackout_date FROM provider_blackout_dates WHERE provider_id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_provider(team_members, equipment, blackout_dates)))
    }
}

#[async_trait]
impl ProviderDirectory for ProviderRepository {
    async fn get_provider(&self, id: Uuid) -> Result<Option<Provider>, SchedulingError> {
        if let Some(provider) = self.cache.get(&id).await {
            return Ok(Some(provider));
        }

        let provider = self.load_provider(id).await?;
        if let Some(provider) = &provider {
            self.cache.insert(id, provider.clone()).await;
        }

        Ok(provider)
    }
}
