//! Postgres implementation of the session store.
//!
//! Translates upserts into `ON CONFLICT (user_id) DO UPDATE` statements so
//! the semantics are insert-or-replace, never insert-or-error. Timestamps
//! are bound as civil-time text because the store keeps the literal format.

use async_trait::async_trait;
use chrono_tz::Tz;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::location::CurrentLocation;
use crate::models::session::Session;
use crate::repositories::session_store::SessionStore;
use crate::types::UserId;
use crate::utils::time::{format_civil, parse_civil};

pub struct PgSessionStore {
    pool: DbPool,
    time_zone: Tz,
}

impl PgSessionStore {
    pub fn new(pool: DbPool, time_zone: Tz) -> Self {
        Self { pool, time_zone }
    }

    fn session_from_row(&self, row: &PgRow) -> Result<Session, StoreError> {
        let user_id: Uuid = row.try_get("user_id")?;
        let username: String = row.try_get("username")?;
        let login_time: Option<String> = row.try_get("login_time")?;
        let logout_time: Option<String> = row.try_get("logout_time")?;
        let is_active: bool = row.try_get("is_active")?;

        let parse = |s: String| {
            parse_civil(&s, &self.time_zone).map_err(|e| StoreError::Malformed(e.to_string()))
        };

        Ok(Session {
            user_id: UserId::from_uuid(user_id),
            username,
            login_time: login_time.map(parse).transpose()?,
            logout_time: logout_time.map(parse).transpose()?,
            is_active,
        })
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        tracing::debug!(user_id = %session.user_id, is_active = session.is_active, "upserting session row");
        sqlx::query(
            r#"
            INSERT INTO sessions (user_id, username, login_time, logout_time, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET username = EXCLUDED.username,
                login_time = EXCLUDED.login_time,
                logout_time = EXCLUDED.logout_time,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(session.user_id)
        .bind(&session.username)
        .bind(session.login_time.as_ref().map(format_civil))
        .bind(session.logout_time.as_ref().map(format_civil))
        .bind(session.is_active)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn upsert_location(&self, location: &CurrentLocation) -> Result<(), StoreError> {
        tracing::debug!(user_id = %location.user_id, "upserting current-location row");
        sqlx::query(
            r#"
            INSERT INTO locations (user_id, latitude, longitude, timestamp)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                timestamp = EXCLUDED.timestamp
            "#,
        )
        .bind(location.user_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(format_civil(&location.timestamp))
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn delete_location(&self, user_id: UserId) -> Result<(), StoreError> {
        tracing::debug!(%user_id, "deleting current-location row");
        sqlx::query("DELETE FROM locations WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn latest_active_session(&self) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, login_time, logout_time, is_active
            FROM sessions
            WHERE is_active = TRUE
            ORDER BY login_time DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(|row| self.session_from_row(&row)).transpose()
    }
}
