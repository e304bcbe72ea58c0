//! Redis-backed snapshot repository.
//!
//! The whole record is one JSON string under a single key, replaced
//! wholesale on every save.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::StoreSnapshot;
use crate::ports::{SnapshotRepository, SnapshotRepositoryError};

/// Key holding the shared record.
pub const SNAPSHOT_KEY: &str = "revenue-desk-data";

/// Snapshot repository over a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisSnapshotRepository {
    conn: MultiplexedConnection,
    key: String,
}

impl RedisSnapshotRepository {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key: SNAPSHOT_KEY.to_string(),
        }
    }

    /// Connects to `url` and opens a multiplexed connection.
    ///
    /// # Errors
    /// Returns `Backend` if the URL is invalid or the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self, SnapshotRepositoryError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)?;
        Ok(Self::new(conn))
    }

    /// Stores the record under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

fn backend(e: redis::RedisError) -> SnapshotRepositoryError {
    SnapshotRepositoryError::Backend(e.to_string())
}

#[async_trait]
impl SnapshotRepository for RedisSnapshotRepository {
    async fn load(&self) -> Result<Option<StoreSnapshot>, SnapshotRepositoryError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&self.key).await.map_err(backend)?;

        raw.map(|text| {
            StoreSnapshot::from_json(&text)
                .map_err(|e| SnapshotRepositoryError::Corrupt(e.to_string()))
        })
        .transpose()
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotRepositoryError> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| SnapshotRepositoryError::Backend(e.to_string()))?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&self.key, json).await.map_err(backend)
    }

    async fn delete(&self) -> Result<(), SnapshotRepositoryError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&self.key).await.map_err(backend)
    }
}
