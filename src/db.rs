use crate::i18n::LanguageCode;
use crate::store::LanguageStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::info;

/// PostgreSQL-backed language store.
///
/// The blacklist is mirrored in memory so `is_blacklisted` never waits on the
/// database. Writes go through [`Database::blacklist_chat`] and
/// [`Database::unblacklist_chat`], which update both.
pub struct Database {
    pool: PgPool,
    default_lang: LanguageCode,
    blacklist: RwLock<HashSet<i64>>,
}

impl Database {
    /// Connect, create tables and load the blacklist.
    pub async fn new(database_url: &str, default_lang: LanguageCode) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        Self::run_migrations(&pool).await?;

        let db = Self {
            pool,
            default_lang,
            blacklist: RwLock::new(HashSet::new()),
        };
        let count = db.reload_blacklist().await?;
        info!("Loaded {} blacklisted chats", count);

        Ok(db)
    }

    async fn run_migrations(pool: &PgPool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_languages (
                chat_id BIGINT PRIMARY KEY,
                lang_code TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(pool)
        .await
        .context("Failed to create chat_languages table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS blacklisted_chats (
                chat_id BIGINT PRIMARY KEY,
                added_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(pool)
        .await
        .context("Failed to create blacklisted_chats table")?;

        Ok(())
    }

    /// Assign a language to a chat, replacing any previous assignment.
    pub async fn set_lang(&self, chat_id: i64, code: &LanguageCode) -> Result<()> {
        sqlx::query(
            "INSERT INTO chat_languages (chat_id, lang_code, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (chat_id) DO UPDATE
             SET lang_code = EXCLUDED.lang_code, updated_at = EXCLUDED.updated_at",
        )
        .bind(chat_id)
        .bind(code.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to set chat language")?;

        Ok(())
    }

    /// Returns true if the chat was newly blacklisted.
    pub async fn blacklist_chat(&self, chat_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO blacklisted_chats (chat_id, added_at) VALUES ($1, $2)
             ON CONFLICT (chat_id) DO NOTHING",
        )
        .bind(chat_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to blacklist chat")?;

        self.write_blacklist().insert(chat_id);
        Ok(result.rows_affected() > 0)
    }

    /// Returns true if the chat was blacklisted before.
    pub async fn unblacklist_chat(&self, chat_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blacklisted_chats WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .context("Failed to remove chat from blacklist")?;

        self.write_blacklist().remove(&chat_id);
        Ok(result.rows_affected() > 0)
    }

    /// Replace the in-memory blacklist with the table contents.
    pub async fn reload_blacklist(&self) -> Result<usize> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT chat_id FROM blacklisted_chats")
            .fetch_all(&self.pool)
            .await
            .context("Failed to load blacklist")?;

        let count = ids.len();
        *self.write_blacklist() = ids.into_iter().collect();
        Ok(count)
    }

    /// Snapshot of blacklisted chat ids.
    pub fn blacklisted(&self) -> Vec<i64> {
        let set = self.blacklist.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<i64> = set.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn write_blacklist(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<i64>> {
        self.blacklist.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LanguageStore for Database {
    async fn get_lang(&self, chat_id: i64) -> Result<LanguageCode> {
        let code: Option<String> =
            sqlx::query_scalar("SELECT lang_code FROM chat_languages WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to read chat language")?;

        Ok(code
            .map(LanguageCode::from)
            .unwrap_or_else(|| self.default_lang.clone()))
    }

    fn is_blacklisted(&self, chat_id: i64) -> bool {
        self.blacklist
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&chat_id)
    }
}
