use time::OffsetDateTime;
use ulid::Ulid;

use crate::Inquiry;

/// Archived copy of a submission whose notification was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "full", derive(sqlx::FromRow))]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: i64,
}

impl ContactRecord {
    pub fn new(inquiry: Inquiry) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: inquiry.name,
            email: inquiry.email,
            message: inquiry.message,
            created_at: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

/// Append-only archive of contact records.
#[async_trait::async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, record: &ContactRecord) -> anyhow::Result<()>;
}

#[cfg(feature = "full")]
mod sqlite {
    use folio_db::table;
    use sea_query::{Query, SqliteQueryBuilder};
    use sea_query_sqlx::SqlxBinder;
    use sqlx::SqlitePool;

    use super::{ContactRecord, ContactStore};

    #[derive(Clone)]
    pub struct SqliteContactStore(pub SqlitePool);

    impl SqliteContactStore {
        pub fn new(pool: SqlitePool) -> Self {
            Self(pool)
        }
    }

    #[async_trait::async_trait]
    impl ContactStore for SqliteContactStore {
        async fn insert(&self, record: &ContactRecord) -> anyhow::Result<()> {
            let statement = Query::insert()
                .into_table(table::ContactRecord::Table)
                .columns([
                    table::ContactRecord::Id,
                    table::ContactRecord::Name,
                    table::ContactRecord::Email,
                    table::ContactRecord::Message,
                    table::ContactRecord::CreatedAt,
                ])
                .values([
                    record.id.to_owned().into(),
                    record.name.to_owned().into(),
                    record.email.to_owned().into(),
                    record.message.to_owned().into(),
                    record.created_at.into(),
                ])?
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&self.0).await?;

            Ok(())
        }
    }
}

#[cfg(feature = "full")]
pub use sqlite::SqliteContactStore;
