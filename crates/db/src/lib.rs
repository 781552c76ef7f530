use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Error, Pool, Sqlite,
};

pub mod models;
pub mod services;

#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Connect to the SQLite database at `database_url`, creating the file
    /// and running pending migrations if needed.
    pub async fn new(database_url: &str) -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(DBService { pool })
    }

    /// In-memory database for tests.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        Self::new("sqlite::memory:").await
    }
}
