use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- Domain Operations --

    pub async fn insert_domain(&self, domain: &NewDomain) -> Result<DomainRow, sqlx::Error> {
        sqlx::query_as::<_, DomainRow>(
            r#"INSERT INTO domains (name, display_name, description, default_client_redirect)
               VALUES ($1, $2, $3, $4)
               RETURNING id, name, display_name, description, is_active, theme_config, default_client_redirect, created_at"#,
        )
        .bind(&domain.name)
        .bind(&domain.display_name)
        .bind(&domain.description)
        .bind(&domain.default_client_redirect)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_domains(&self, skip: i64, limit: i64) -> Result<Vec<DomainRow>, sqlx::Error> {
        sqlx::query_as::<_, DomainRow>(
            "SELECT id, name, display_name, description, is_active, theme_config, default_client_redirect, created_at
             FROM domains ORDER BY created_at ASC OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_domain(&self, name: &str) -> Result<Option<DomainRow>, sqlx::Error> {
        sqlx::query_as::<_, DomainRow>(
            "SELECT id, name, display_name, description, is_active, theme_config, default_client_redirect, created_at
             FROM domains WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn domain_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM domains WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    /// Apply the non-null fields of an update to a domain row.
    /// Returns the updated row, or None when the domain does not exist.
    pub async fn update_domain(
        &self,
        name: &str,
        update: &DomainUpdate,
    ) -> Result<Option<DomainRow>, sqlx::Error> {
        sqlx::query_as::<_, DomainRow>(
            r#"UPDATE domains SET
                 display_name = COALESCE($2, display_name),
                 description = COALESCE($3, description),
                 is_active = COALESCE($4, is_active),
                 default_client_redirect = COALESCE($5, default_client_redirect)
               WHERE name = $1
               RETURNING id, name, display_name, description, is_active, theme_config, default_client_redirect, created_at"#,
        )
        .bind(name)
        .bind(&update.display_name)
        .bind(&update.description)
        .bind(update.is_active)
        .bind(&update.default_client_redirect)
        .fetch_optional(&self.pool)
        .await
    }

    /// Replace a domain's stored theme configuration.
    /// Returns false when the domain does not exist.
    pub async fn update_theme_config(
        &self,
        name: &str,
        theme_config: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE domains SET theme_config = $2 WHERE name = $1")
            .bind(name)
            .bind(theme_config)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ── Row types ────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct DomainRow {
    pub id: i32,
    /// Keycloak realm name (unique)
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Theme preferences as JSON; None until first configured
    pub theme_config: Option<serde_json::Value>,
    pub default_client_redirect: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewDomain {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub default_client_redirect: Option<String>,
}

#[derive(Debug, Default)]
pub struct DomainUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub default_client_redirect: Option<String>,
}
