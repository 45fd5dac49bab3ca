use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::{DateRange, NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence port for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::DuplicateEmail`] when the
    /// email is already taken, even if a concurrent insert won the race.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Users whose date of birth falls in `range`, newest-created first.
    async fn list(&self, range: DateRange) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone_number,
                   password_hash, date_of_birth, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, phone_number, password_hash, date_of_birth)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, phone_number,
                      password_hash, date_of_birth, created_at
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(user.date_of_birth)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(u) => Ok(u),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateEmail(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, range: DateRange) -> Result<Vec<User>, StoreError> {
        // NULL bounds are open, so one statement covers all four filter shapes.
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, phone_number,
                   password_hash, date_of_birth, created_at
            FROM users
            WHERE ($1::date IS NULL OR date_of_birth >= $1)
              AND ($2::date IS NULL OR date_of_birth <= $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// Runs against a live Postgres: `DATABASE_URL=... cargo test -- --ignored`.
/// Each test migrates into its own schema and drops it afterwards.
#[cfg(test)]
mod pg_tests {
    use std::time::Duration;

    use sqlx::{postgres::PgPoolOptions, Executor};
    use time::{macros::date, Date};
    use uuid::Uuid;

    use super::*;

    struct TestDb {
        pool: PgPool,
        admin: PgPool,
        schema: String,
    }

    impl TestDb {
        async fn new() -> Option<Self> {
            let url = std::env::var("DATABASE_URL").ok()?;
            let schema = format!("users_test_{}", Uuid::new_v4().simple());

            let admin = PgPoolOptions::new()
                .max_connections(1)
                .connect(&url)
                .await
                .expect("connect admin pool");
            admin
                .execute(format!(r#"CREATE SCHEMA "{schema}""#).as_str())
                .await
                .expect("create schema");

            let search_path = schema.clone();
            let pool = PgPoolOptions::new()
                .max_connections(2)
                .after_connect(move |conn, _meta| {
                    let search_path = search_path.clone();
                    Box::pin(async move {
                        conn.execute(format!(r#"SET search_path TO "{search_path}""#).as_str())
                            .await?;
                        Ok(())
                    })
                })
                .connect(&url)
                .await
                .expect("connect test pool");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("run migrations");

            Some(Self { pool, admin, schema })
        }

        fn store(&self) -> PgUserStore {
            PgUserStore::new(self.pool.clone())
        }

        async fn drop_schema(self) {
            self.pool.close().await;
            self.admin
                .execute(format!(r#"DROP SCHEMA "{}" CASCADE"#, self.schema).as_str())
                .await
                .expect("drop schema");
        }
    }

    fn new_user(email: &str, dob: Date) -> NewUser {
        NewUser {
            first_name: "Katherine".into(),
            last_name: "Johnson".into(),
            email: email.into(),
            phone_number: "555-0142".into(),
            password_hash: "$argon2id$v=19$fake".into(),
            date_of_birth: dob,
        }
    }

    /// Inserts in order with a short pause so `created_at` values differ.
    async fn seed(store: &PgUserStore, users: &[(&str, Date)]) {
        for (email, dob) in users {
            store.create(new_user(email, *dob)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn emails(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.email.as_str()).collect()
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL"]
    async fn unique_index_violation_is_duplicate_email() {
        let Some(db) = TestDb::new().await else { return };
        let store = db.store();

        let created = store
            .create(new_user("kj@example.com", date!(1918 - 08 - 26)))
            .await
            .unwrap();
        assert_eq!(created.date_of_birth, date!(1918 - 08 - 26));
        assert!(store.find_by_email("kj@example.com").await.unwrap().is_some());

        // Straight to insert, skipping the lookup, as a racing create would.
        let err = store
            .create(new_user("kj@example.com", date!(1950 - 01 - 01)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "kj@example.com"));
        assert_eq!(store.list(DateRange::default()).await.unwrap().len(), 1);

        db.drop_schema().await;
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL"]
    async fn list_filters_and_orders_newest_first() {
        let Some(db) = TestDb::new().await else { return };
        let store = db.store();
        seed(
            &store,
            &[
                ("before@example.com", date!(1989 - 12 - 31)),
                ("start@example.com", date!(1990 - 01 - 01)),
                ("end@example.com", date!(1999 - 12 - 31)),
                ("after@example.com", date!(2000 - 01 - 01)),
            ],
        )
        .await;

        let all = store.list(DateRange::default()).await.unwrap();
        assert_eq!(
            emails(&all),
            [
                "after@example.com",
                "end@example.com",
                "start@example.com",
                "before@example.com"
            ]
        );

        let nineties = store
            .list(DateRange {
                from: Some(date!(1990 - 01 - 01)),
                to: Some(date!(1999 - 12 - 31)),
            })
            .await
            .unwrap();
        assert_eq!(emails(&nineties), ["end@example.com", "start@example.com"]);

        let from_only = store
            .list(DateRange {
                from: Some(date!(1999 - 12 - 31)),
                to: None,
            })
            .await
            .unwrap();
        assert_eq!(emails(&from_only), ["after@example.com", "end@example.com"]);

        let to_only = store
            .list(DateRange {
                from: None,
                to: Some(date!(1990 - 01 - 01)),
            })
            .await
            .unwrap();
        assert_eq!(emails(&to_only), ["start@example.com", "before@example.com"]);

        let none = store
            .list(DateRange {
                from: Some(date!(2010 - 01 - 01)),
                to: None,
            })
            .await
            .unwrap();
        assert!(none.is_empty());

        db.drop_schema().await;
    }
}
