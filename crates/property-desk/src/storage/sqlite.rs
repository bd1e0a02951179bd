//! SQLite-backed implementation of every repository trait.
//!
//! Listings keep their editable fields as one JSON document next to the columns the store needs
//! to query on (`title_folded` for keyword search, `seq` for insertion order). Timestamps are
//! RFC 3339 text so that the database stays readable with the stock `sqlite3` shell.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use super::RepositoryError;
use crate::catalog::{Property, PropertyFields, PropertyFilter, PropertyId, PropertyRepository};
use crate::leads::{Inquiry, InquiryId, InquiryRepository, NewInquiry};
use crate::visits::{PageKey, VisitCounter, VisitRepository};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS properties (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        title_folded TEXT NOT NULL DEFAULT '',
        fields_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inquiries (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        property_id TEXT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS visits (
        page TEXT PRIMARY KEY,
        count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

// `title_folded` holds the Unicode lowercase title; SQLite's lower() only folds ASCII.
const KEYWORD_CLAUSE: &str = "(? IS NULL OR instr(title_folded, ?) > 0)";

const PROPERTY_COLUMNS: &str = "id, fields_json, created_at, updated_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`, creating the database file when it does not exist yet.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create any missing tables. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        // Databases created before keyword folding lack the column.
        let has_folded: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('properties') WHERE name = 'title_folded'",
        )
        .fetch_one(&self.pool)
        .await?;
        if !has_folded {
            sqlx::query("ALTER TABLE properties ADD COLUMN title_folded TEXT NOT NULL DEFAULT ''")
                .execute(&self.pool)
                .await?;
        }
        self.backfill_folded_titles().await
    }

    async fn backfill_folded_titles(&self) -> Result<(), RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, title FROM properties WHERE title_folded = '' AND title != ''",
        )
        .fetch_all(&self.pool)
        .await?;
        for (id, title) in rows {
            sqlx::query("UPDATE properties SET title_folded = ? WHERE id = ?")
                .bind(title.to_lowercase())
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

// Fixed-width text compares in time order, which the visit upsert relies on.
fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn decode_ts(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Corrupt(format!("timestamp `{raw}`: {err}")))
}

fn decode_uuid(raw: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(raw).map_err(|err| RepositoryError::Corrupt(format!("identifier `{raw}`: {err}")))
}

fn encode_fields(fields: &PropertyFields) -> Result<String, RepositoryError> {
    serde_json::to_string(fields).map_err(|err| RepositoryError::Corrupt(err.to_string()))
}

fn folded_keyword(filter: &PropertyFilter) -> Option<String> {
    filter.keyword().map(str::to_lowercase)
}

fn property_from_row(row: &SqliteRow) -> Result<Property, RepositoryError> {
    let id: String = row.try_get("id")?;
    let fields_json: String = row.try_get("fields_json")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let fields = serde_json::from_str(&fields_json)
        .map_err(|err| RepositoryError::Corrupt(format!("listing {id}: {err}")))?;
    Ok(Property {
        id: PropertyId(decode_uuid(&id)?),
        fields,
        created_at: decode_ts(&created_at)?,
        updated_at: decode_ts(&updated_at)?,
    })
}

fn inquiry_from_row(row: &SqliteRow) -> Result<Inquiry, RepositoryError> {
    let id: String = row.try_get("id")?;
    let property_id: Option<String> = row.try_get("property_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Inquiry {
        id: InquiryId(decode_uuid(&id)?),
        property_id: property_id
            .as_deref()
            .map(decode_uuid)
            .transpose()?
            .map(PropertyId),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        message: row.try_get("message")?,
        created_at: decode_ts(&created_at)?,
    })
}

fn count_from_db(raw: i64) -> Result<u64, RepositoryError> {
    u64::try_from(raw).map_err(|_| RepositoryError::Corrupt(format!("negative count {raw}")))
}

#[async_trait]
impl PropertyRepository for SqliteStore {
    async fn insert(&self, fields: PropertyFields) -> Result<Property, RepositoryError> {
        let now = now();
        let property = Property {
            id: PropertyId::generate(),
            fields,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO properties (id, title, title_folded, fields_json, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(property.id.to_string())
        .bind(&property.fields.title)
        .bind(property.fields.title.to_lowercase())
        .bind(encode_fields(&property.fields)?)
        .bind(encode_ts(property.created_at))
        .bind(encode_ts(property.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(property)
    }

    async fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(property_from_row).transpose()
    }

    async fn replace(
        &self,
        id: &PropertyId,
        fields: PropertyFields,
    ) -> Result<Option<Property>, RepositoryError> {
        // One statement so no read lock is held while waiting to write.
        let row = sqlx::query(&format!(
            "UPDATE properties SET title = ?, title_folded = ?, fields_json = ?, \
             updated_at = max(updated_at, ?) WHERE id = ? RETURNING {PROPERTY_COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(fields.title.to_lowercase())
        .bind(encode_fields(&fields)?)
        .bind(encode_ts(now()))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(property_from_row).transpose()
    }

    async fn remove(&self, id: &PropertyId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, filter: &PropertyFilter) -> Result<u64, RepositoryError> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM properties WHERE {KEYWORD_CLAUSE}"
        ))
        .bind(folded_keyword(filter))
        .bind(folded_keyword(filter))
        .fetch_one(&self.pool)
        .await?;
        count_from_db(total)
    }

    async fn page(
        &self,
        filter: &PropertyFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Property>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties \
             WHERE {KEYWORD_CLAUSE} ORDER BY seq LIMIT ? OFFSET ?"
        ))
        .bind(folded_keyword(filter))
        .bind(folded_keyword(filter))
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(property_from_row).collect()
    }
}

#[async_trait]
impl InquiryRepository for SqliteStore {
    async fn insert(&self, inquiry: NewInquiry) -> Result<Inquiry, RepositoryError> {
        let NewInquiry {
            property_id,
            name,
            email,
            phone,
            message,
        } = inquiry;
        let inquiry = Inquiry {
            id: InquiryId::generate(),
            property_id,
            name,
            email,
            phone,
            message,
            created_at: now(),
        };

        sqlx::query(
            "INSERT INTO inquiries (id, property_id, name, email, phone, message, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(inquiry.id.to_string())
        .bind(inquiry.property_id.map(|id| id.to_string()))
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.phone)
        .bind(&inquiry.message)
        .bind(encode_ts(inquiry.created_at))
        .execute(&self.pool)
        .await?;

        Ok(inquiry)
    }

    async fn all(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, property_id, name, email, phone, message, created_at FROM inquiries ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(inquiry_from_row).collect()
    }
}

#[async_trait]
impl VisitRepository for SqliteStore {
    async fn increment(&self, page: &PageKey) -> Result<u64, RepositoryError> {
        let now = encode_ts(now());
        // Single statement, so concurrent increments on the same page never lose an update.
        let count: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO visits (page, count, created_at, updated_at) VALUES (?, 1, ?, ?)
            ON CONFLICT(page) DO UPDATE SET
                count = count + 1,
                updated_at = max(updated_at, excluded.updated_at)
            RETURNING count
            "#,
        )
        .bind(page.as_str())
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        count_from_db(count)
    }

    async fn fetch(&self, page: &PageKey) -> Result<Option<VisitCounter>, RepositoryError> {
        let row = sqlx::query("SELECT count, created_at, updated_at FROM visits WHERE page = ?")
            .bind(page.as_str())
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let count: i64 = row.try_get("count")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        Ok(Some(VisitCounter {
            page: page.clone(),
            count: count_from_db(count)?,
            created_at: decode_ts(&created_at)?,
            updated_at: decode_ts(&updated_at)?,
        }))
    }
}
