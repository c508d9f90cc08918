//! # Redis
//!
//! Document store for meal records.
//!
//! ## Connection
//!
//! - [`Database`] is built by the composition root and shared through the server state
//! - The first operation opens a connection manager, later operations reuse it
//! - Retries and the connection timeout come from [`RedisSettings`]
//! - No reconnect logic beyond what the connection manager already does
//!
//! ## Layout
//!
//! - `{prefix}:meals`: hash of id to meal record JSON
//! - `{prefix}:meals:order`: list of ids in insertion order
//!
//! The order list is what makes "first match" deterministic: a hash has no stable order,
//! so every scan walks the list and fetches documents in one `HMGET`.
//!
//! ## Commands
//!
//! Count stored meals.
//! ```sh
//! redis-cli HLEN mess:meals
//! ```
//!
//! Dump the natural store order.
//! ```sh
//! redis-cli LRANGE mess:meals:order 0 -1
//! ```
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{
    config::RedisSettings,
    models::MealRecord,
    store::{MealFilter, MealStore, StoreError},
};

pub struct Database {
    client: Client,
    connect_timeout: Duration,
    retries: usize,
    connection: OnceCell<ConnectionManager>,
}

impl Database {
    /// Parses the connection string. Does not touch the network.
    pub fn new(settings: &RedisSettings) -> Result<Self, StoreError> {
        let client = Client::open(settings.url.as_str())?;

        Ok(Self {
            client,
            connect_timeout: settings.connect_timeout,
            retries: settings.retries,
            connection: OnceCell::new(),
        })
    }

    /// Opens the connection on first use; a no-op returning the shared manager afterwards.
    pub async fn ensure_connected(&self) -> Result<ConnectionManager, StoreError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                info!("Connecting to Redis...");

                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(self.retries)
                    .set_connection_timeout(self.connect_timeout);

                let connection_manager = self
                    .client
                    .get_connection_manager_with_config(config)
                    .await?;

                info!("Redis connected");
                Ok::<_, StoreError>(connection_manager)
            })
            .await?;

        Ok(connection.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }
}

pub struct RedisStore {
    database: Arc<Database>,
    meals_key: String,
    order_key: String,
}

impl RedisStore {
    pub fn new(database: Arc<Database>, key_prefix: &str) -> Self {
        Self {
            database,
            meals_key: format!("{key_prefix}:meals"),
            order_key: format!("{key_prefix}:meals:order"),
        }
    }

    async fn load_all(&self) -> Result<Vec<MealRecord>, StoreError> {
        let mut connection = self.database.ensure_connected().await?;

        let ids: Vec<String> = connection.lrange(&self.order_key, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(&self.meals_key)
            .arg(&ids)
            .query_async(&mut connection)
            .await?;

        decode_documents(documents)
    }

    /// HSET of the document plus RPUSH onto the order list, as one MULTI/EXEC.
    fn insert_pipeline(&self, meal: &MealRecord) -> Result<redis::Pipeline, StoreError> {
        let document = serde_json::to_string(meal)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .hset(&self.meals_key, &meal.id, document)
            .ignore()
            .rpush(&self.order_key, &meal.id)
            .ignore();

        Ok(pipe)
    }
}

/// Decodes an `HMGET` reply in order-list order. An id without a document is skipped rather
/// than failing the scan.
fn decode_documents(documents: Vec<Option<String>>) -> Result<Vec<MealRecord>, StoreError> {
    documents
        .into_iter()
        .flatten()
        .map(|document| serde_json::from_str(&document).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl MealStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    fn is_connected(&self) -> bool {
        self.database.is_connected()
    }

    async fn find(&self, filter: &MealFilter) -> Result<Vec<MealRecord>, StoreError> {
        let meals: Vec<MealRecord> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|meal| filter.matches(meal))
            .collect();

        debug!(matched = meals.len(), "Scanned Redis store");
        Ok(meals)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MealRecord>, StoreError> {
        let mut connection = self.database.ensure_connected().await?;

        let document: Option<String> = connection.hget(&self.meals_key, id).await?;

        document
            .map(|document| serde_json::from_str(&document))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn insert(&self, meal: &MealRecord) -> Result<(), StoreError> {
        let mut connection = self.database.ensure_connected().await?;
        let pipe = self.insert_pipeline(meal)?;

        let () = pipe.query_async(&mut connection).await?;

        Ok(())
    }

    async fn replace(&self, meal: &MealRecord) -> Result<bool, StoreError> {
        let mut connection = self.database.ensure_connected().await?;

        let exists: bool = connection.hexists(&self.meals_key, &meal.id).await?;
        if !exists {
            return Ok(false);
        }

        let document = serde_json::to_string(meal)?;
        let _: () = connection.hset(&self.meals_key, &meal.id, document).await?;

        Ok(true)
    }
}
